//! Per-cell gradient progress bar with an auto-compact marker.
//!
//! Every filled cell gets its own interpolated colour. The gradient is
//! anchored to the threshold cell rather than the bar's end, so it turns
//! fully red exactly where auto-compaction fires at any width.

use super::style::{Color, Rgb, StyledSegment};
use super::usage::COMPACT_THRESHOLD_PERCENT;

pub const DEFAULT_BAR_WIDTH: u16 = 50;
pub const MIN_BAR_WIDTH: u16 = 10;
pub const MAX_BAR_WIDTH: u16 = 100;

const FILLED_CHAR: &str = "\u{2588}"; // █
const EMPTY_CHAR: &str = "\u{2591}"; // ░
const MARKER_CHAR: &str = "\u{03DF}"; // ϟ

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarCell {
    Filled(Rgb),
    Empty,
    /// The auto-compact position. Unfilled markers are drawn alarm-red on a
    /// dark background.
    ThresholdMarker { filled: bool, color: Rgb },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradientBar {
    pub cells: Vec<BarCell>,
    pub filled_count: usize,
    pub threshold_position: usize,
    /// Colour of the highest filled non-marker cell, green when none is.
    pub rightmost_color: Rgb,
}

impl GradientBar {
    pub fn render(width: u16, usage_percent: u8) -> Self {
        let width = usize::from(width);
        let filled_count = (usize::from(usage_percent.min(100)) * width / 100).min(width);
        let threshold_position = threshold_position(width);

        let cells: Vec<BarCell> = (0..width)
            .map(|i| {
                let filled = i < filled_count;
                if i == threshold_position {
                    let color = if filled {
                        gradient(i, threshold_position)
                    } else {
                        Rgb::RED
                    };
                    BarCell::ThresholdMarker { filled, color }
                } else if filled {
                    if i > threshold_position {
                        BarCell::Filled(Rgb::RED)
                    } else {
                        BarCell::Filled(gradient(i, threshold_position))
                    }
                } else {
                    BarCell::Empty
                }
            })
            .collect();

        let rightmost_color = cells
            .iter()
            .rev()
            .find_map(|cell| match cell {
                BarCell::Filled(color) => Some(*color),
                _ => None,
            })
            .unwrap_or(Rgb::GREEN);

        Self {
            cells,
            filled_count,
            threshold_position,
            rightmost_color,
        }
    }

    /// The bracketed bar as styled segments.
    pub fn segments(&self) -> Vec<StyledSegment> {
        let mut out = Vec::with_capacity(self.cells.len() + 2);
        out.push(StyledSegment::plain("["));
        out.extend(self.cells.iter().map(|cell| match *cell {
            BarCell::Filled(color) => StyledSegment::plain(FILLED_CHAR).fg(color),
            BarCell::Empty => StyledSegment::plain(EMPTY_CHAR),
            BarCell::ThresholdMarker {
                filled: true,
                color,
            } => StyledSegment::plain(MARKER_CHAR)
                .fg(Color::White)
                .bg(color)
                .bold(),
            BarCell::ThresholdMarker {
                filled: false,
                color,
            } => StyledSegment::plain(MARKER_CHAR)
                .fg(color)
                .bg(Color::BrightBlack),
        }));
        out.push(StyledSegment::plain("]"));
        out
    }
}

/// Cell index of the auto-compact marker for a bar of `width` cells.
pub fn threshold_position(width: usize) -> usize {
    COMPACT_THRESHOLD_PERCENT as usize * width / 100
}

/// Green, through yellow at the midpoint, to red at the threshold cell.
pub fn gradient(index: usize, threshold_position: usize) -> Rgb {
    let t = if threshold_position > 0 {
        index as f64 / threshold_position as f64
    } else {
        0.0
    };
    let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;
    if t <= 0.5 {
        Rgb::new(channel(t * 2.0 * 255.0), 255, 0)
    } else {
        Rgb::new(255, channel((1.0 - t) * 2.0 * 255.0), 0)
    }
}

/// Accepts a raw `--width` value, returning it only when it is a valid
/// cell count.
pub fn parse_width(raw: &str) -> Option<u16> {
    raw.trim()
        .parse::<u16>()
        .ok()
        .filter(|w| (MIN_BAR_WIDTH..=MAX_BAR_WIDTH).contains(w))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers(bar: &GradientBar) -> Vec<usize> {
        bar.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, BarCell::ThresholdMarker { .. }))
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_filled_count_and_marker_for_all_widths() {
        for width in MIN_BAR_WIDTH..=MAX_BAR_WIDTH {
            for percent in 0..=100u8 {
                let bar = GradientBar::render(width, percent);
                let w = usize::from(width);
                assert_eq!(bar.cells.len(), w);
                assert_eq!(bar.filled_count, usize::from(percent) * w / 100);
                assert!(bar.filled_count <= w);
                assert_eq!(markers(&bar), vec![78 * w / 100], "width {} pct {}", width, percent);
            }
        }
    }

    #[test]
    fn test_gradient_endpoints() {
        for width in MIN_BAR_WIDTH..=MAX_BAR_WIDTH {
            let pos = threshold_position(usize::from(width));
            assert_eq!(gradient(0, pos), Rgb::GREEN);
            assert_eq!(gradient(pos, pos), Rgb::RED);
        }
    }

    #[test]
    fn test_gradient_midpoint_is_yellow() {
        assert_eq!(gradient(20, 40), Rgb::new(255, 255, 0));
        assert_eq!(gradient(10, 40), Rgb::new(128, 255, 0));
        assert_eq!(gradient(30, 40), Rgb::new(255, 128, 0));
    }

    #[test]
    fn test_gradient_zero_threshold_is_green() {
        assert_eq!(gradient(5, 0), Rgb::GREEN);
    }

    #[test]
    fn test_gradient_is_monotonic() {
        let pos = threshold_position(100);
        let mut prev = gradient(0, pos);
        for i in 1..=pos {
            let c = gradient(i, pos);
            assert!(c.r >= prev.r);
            assert!(c.g <= prev.g);
            assert_eq!(c.b, 0);
            prev = c;
        }
    }

    #[test]
    fn test_scenario_sixty_two_percent() {
        let bar = GradientBar::render(50, 62);
        assert_eq!(bar.filled_count, 31);
        assert_eq!(bar.threshold_position, 39);
        assert_eq!(
            bar.cells[39],
            BarCell::ThresholdMarker {
                filled: false,
                color: Rgb::RED
            }
        );
        assert_eq!(bar.cells[30], BarCell::Filled(gradient(30, 39)));
        assert_eq!(bar.cells[31], BarCell::Empty);
        assert_eq!(bar.rightmost_color, gradient(30, 39));
    }

    #[test]
    fn test_cells_past_threshold_are_red() {
        let bar = GradientBar::render(50, 90);
        assert_eq!(bar.filled_count, 45);
        assert_eq!(
            bar.cells[39],
            BarCell::ThresholdMarker {
                filled: true,
                color: Rgb::RED
            }
        );
        for i in 40..45 {
            assert_eq!(bar.cells[i], BarCell::Filled(Rgb::RED));
        }
        assert_eq!(bar.cells[45], BarCell::Empty);
        assert_eq!(bar.rightmost_color, Rgb::RED);
    }

    #[test]
    fn test_rightmost_color_skips_marker() {
        // 80% of 50 fills cells 0..40, the last of which is the marker.
        let bar = GradientBar::render(50, 80);
        assert_eq!(bar.filled_count, 40);
        assert!(matches!(
            bar.cells[39],
            BarCell::ThresholdMarker { filled: true, .. }
        ));
        assert_eq!(bar.rightmost_color, gradient(38, 39));
    }

    #[test]
    fn test_empty_bar_is_green() {
        let bar = GradientBar::render(50, 0);
        assert_eq!(bar.filled_count, 0);
        assert_eq!(bar.rightmost_color, Rgb::GREEN);
    }

    #[test]
    fn test_full_bar() {
        let bar = GradientBar::render(10, 100);
        assert_eq!(bar.filled_count, 10);
        assert!(!bar.cells.contains(&BarCell::Empty));
    }

    #[test]
    fn test_segments_are_bracketed() {
        let bar = GradientBar::render(20, 50);
        let segs = bar.segments();
        assert_eq!(segs.len(), 22);
        assert_eq!(segs[0].text, "[");
        assert_eq!(segs[21].text, "]");
        let text: String = segs.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(text.chars().filter(|c| *c == '\u{2588}').count(), 10);
        assert_eq!(text.chars().filter(|c| *c == '\u{03DF}').count(), 1);
        assert_eq!(text.chars().filter(|c| *c == '\u{2591}').count(), 9);
    }

    #[test]
    fn test_parse_width() {
        assert_eq!(parse_width("50"), Some(50));
        assert_eq!(parse_width(" 10 "), Some(10));
        assert_eq!(parse_width("100"), Some(100));
        assert_eq!(parse_width("9"), None);
        assert_eq!(parse_width("101"), None);
        assert_eq!(parse_width("wide"), None);
        assert_eq!(parse_width("-20"), None);
    }
}
