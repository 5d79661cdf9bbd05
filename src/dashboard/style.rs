//! Styled text segments and their serialization to terminal escapes.
//!
//! Renderers only describe what to show; [`render_segments`] is the single
//! place that turns a segment into a `colored` string. Whether colour is
//! emitted at all follows `colored::control`.

use colored::{ColoredString, Colorize};

pub use colored::Color;

/// Clear from the cursor to the end of the line.
pub const CLEAR_TO_EOL: &str = "\x1b[K";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const RED: Rgb = Rgb::new(255, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for Color {
    fn from(Rgb { r, g, b }: Rgb) -> Self {
        Color::TrueColor { r, g, b }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyledSegment {
    pub text: String,
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub bold: bool,
    pub dim: bool,
}

impl StyledSegment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn fg(mut self, color: impl Into<Color>) -> Self {
        self.foreground = Some(color.into());
        self
    }

    pub fn bg(mut self, color: impl Into<Color>) -> Self {
        self.background = Some(color.into());
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn dim(mut self) -> Self {
        self.dim = true;
        self
    }

    fn to_colored(&self) -> ColoredString {
        let mut out = self.text.as_str().normal();
        if self.bold {
            out = out.bold();
        }
        if self.dim {
            out = out.dimmed();
        }
        if let Some(fg) = self.foreground {
            out = out.color(fg);
        }
        if let Some(bg) = self.background {
            out = out.on_color(bg);
        }
        out
    }
}

/// Serialize segments in order.
pub fn render_segments(segments: &[StyledSegment]) -> String {
    segments
        .iter()
        .map(|seg| seg.to_colored().to_string())
        .collect()
}

/// Text of a rendered string with SGR and erase sequences removed.
#[cfg(test)]
pub fn strip_escapes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_escape = false;
    for c in s.chars() {
        if in_escape {
            if c.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if c == '\x1b' {
            in_escape = true;
        } else {
            out.push(c);
        }
    }
    out
}

/// Tests only ever force colour on; plain output is covered end to end.
#[cfg(test)]
pub fn force_color() {
    colored::control::set_override(true);
}
