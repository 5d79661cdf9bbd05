//! Assembly of the two dashboard lines.
//!
//! Line 1: `🤖 Opus 4.5 ($12.41) │ [██████░░░ϟ░░] 124k/200k`
//! Line 2: `📁 project main ✓ → origin/main ↑11 ↓2`
//!
//! Absent values drop out together with their separator.

use std::path::Path;

use super::bar::GradientBar;
use super::input::StatusInput;
use super::style::{render_segments, Color, StyledSegment, CLEAR_TO_EOL};
use super::usage::UsageMetrics;
use super::version::UpdateNotice;
use crate::config::SegmentsConfig;
use crate::git::{GitState, StatusGlyph};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardLines {
    pub line1: String,
    pub line2: String,
}

impl DashboardLines {
    /// Both lines, each closed with an erase-to-end-of-line. Only the first
    /// is followed by a newline.
    pub fn to_output(&self) -> String {
        format!(
            "{}{}\n{}{}",
            self.line1, CLEAR_TO_EOL, self.line2, CLEAR_TO_EOL
        )
    }
}

pub struct LineComposer<'a> {
    pub input: &'a StatusInput,
    pub usage: &'a UsageMetrics,
    pub bar: &'a GradientBar,
    pub git: &'a GitState,
    pub update: Option<&'a UpdateNotice>,
    pub segments: &'a SegmentsConfig,
}

impl LineComposer<'_> {
    pub fn compose(&self) -> DashboardLines {
        DashboardLines {
            line1: render_segments(&self.line1()),
            line2: render_segments(&self.line2()),
        }
    }

    pub fn line1(&self) -> Vec<StyledSegment> {
        let mut parts: Vec<Vec<StyledSegment>> = Vec::new();

        if let Some(model) = &self.input.model_name {
            parts.push(vec![
                StyledSegment::plain("\u{1F916} "),
                StyledSegment::plain(model.as_str()).fg(Color::Cyan).bold(),
            ]);
        }

        if let Some(cost) = self.input.cost_usd {
            parts.push(vec![StyledSegment::plain(format!("(${})", format_cost(cost)))
                .fg(Color::Green)
                .bold()]);
        }

        parts.push(vec![StyledSegment::plain("\u{2502}").fg(Color::White).dim()]);
        parts.push(self.bar.segments());
        parts.push(vec![
            StyledSegment::plain(format_tokens_int(self.usage.used_tokens))
                .fg(self.bar.rightmost_color),
            StyledSegment::plain(format!("/{}", format_tokens_int(self.usage.max_tokens)))
                .fg(Color::Cyan)
                .bold(),
        ]);

        if self.segments.compact {
            parts.push(self.compact_indicator());
        }
        if self.segments.activity {
            let tools =
                self.input.skills_count + self.input.agents_count + self.input.mcp_tools_count;
            if tools > 0 {
                parts.push(vec![StyledSegment::plain(format!("\u{1F527} {}", tools))]);
            }
            if self.input.background_task_count > 0 {
                parts.push(vec![StyledSegment::plain(format!(
                    "\u{231B} {}",
                    self.input.background_task_count
                ))]);
            }
        }

        join_parts(parts)
    }

    pub fn line2(&self) -> Vec<StyledSegment> {
        let mut parts: Vec<Vec<StyledSegment>> = Vec::new();

        if let Some(project) = self.input.working_directory.as_deref().and_then(project_name) {
            parts.push(vec![
                StyledSegment::plain("\u{1F4C1} "),
                StyledSegment::plain(project).fg(Color::Cyan).bold(),
            ]);
        }

        if let Some(branch) = self.git.branch.as_deref().filter(|_| self.git.is_repository) {
            parts.push(git_segments(branch, self.git));
        }

        let mut line = join_parts(parts);
        if let Some(notice) = self.update {
            line.push(StyledSegment::plain(format!(
                "    |  {} {}>{}",
                notice.label, notice.installed, notice.latest
            )));
        }
        line
    }

    /// "⚡45.2k until compact (22%)", empty once the threshold is reached.
    fn compact_indicator(&self) -> Vec<StyledSegment> {
        let pct = self.usage.remaining_until_compact_percent;
        if pct <= 0.0 {
            return Vec::new();
        }
        vec![
            StyledSegment::plain(format!(
                "\u{26A1}{} until compact",
                format_tokens(self.usage.remaining_until_compact_tokens)
            ))
            .fg(compact_color(pct)),
            StyledSegment::plain(" "),
            StyledSegment::plain(format!("({}%)", pct)).dim(),
        ]
    }
}

fn git_segments(branch: &str, git: &GitState) -> Vec<StyledSegment> {
    let mut parts: Vec<Vec<StyledSegment>> = vec![vec![StyledSegment::plain(branch)
        .fg(Color::Magenta)
        .bold()]];

    if let Some(glyph) = git.status {
        parts.push(status_glyph(glyph));
    }

    parts.push(vec![StyledSegment::plain("\u{2192}").fg(Color::White).dim()]);

    match &git.upstream {
        Some(upstream) => {
            parts.push(vec![StyledSegment::plain(upstream.as_str())
                .fg(Color::Blue)
                .bold()]);
            if let Some(ahead) = git.ahead {
                parts.push(vec![
                    StyledSegment::plain(format!("\u{2191}{}", ahead)).fg(Color::Green)
                ]);
            }
            if let Some(behind) = git.behind {
                parts.push(vec![
                    StyledSegment::plain(format!("\u{2193}{}", behind)).fg(Color::Red)
                ]);
            }
        }
        None => parts.push(vec![StyledSegment::plain("(no upstream)")
            .fg(Color::White)
            .dim()]),
    }

    join_parts(parts)
}

fn status_glyph(glyph: StatusGlyph) -> Vec<StyledSegment> {
    let unstaged = || StyledSegment::plain("\u{25CF}").fg(Color::Yellow).bold();
    let staged = || StyledSegment::plain("\u{271A}").fg(Color::Green).bold();
    match glyph {
        StatusGlyph::Both => vec![unstaged(), staged()],
        StatusGlyph::UnstagedOnly => vec![unstaged()],
        StatusGlyph::StagedOnly => vec![staged()],
        StatusGlyph::Clean => vec![StyledSegment::plain("\u{2713}").fg(Color::Green).bold()],
    }
}

/// 256-colour step for the until-compact indicator.
fn compact_color(remaining_pct: f64) -> Color {
    let index = match remaining_pct {
        p if p >= 25.0 => 46,
        p if p >= 20.0 => 154,
        p if p >= 15.0 => 226,
        p if p >= 10.0 => 220,
        p if p >= 7.0 => 214,
        p if p >= 4.0 => 208,
        _ => 196,
    };
    Color::AnsiColor(index)
}

/// Concatenate non-empty parts with single spaces.
fn join_parts(parts: Vec<Vec<StyledSegment>>) -> Vec<StyledSegment> {
    let mut out = Vec::new();
    for part in parts.into_iter().filter(|p| !p.is_empty()) {
        if !out.is_empty() {
            out.push(StyledSegment::plain(" "));
        }
        out.extend(part);
    }
    out
}

fn project_name(dir: &str) -> Option<&str> {
    Path::new(dir).file_name().and_then(|n| n.to_str())
}

/// Two decimals, rounding the exact value. Exact ties (only possible for
/// multiples of 1/8) round away from zero.
fn format_cost(cost: f64) -> String {
    let eighths = cost * 8.0;
    if eighths.fract() != 0.0 || eighths % 2.0 == 0.0 {
        return format!("{:.2}", cost);
    }
    let cents = (cost * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    format!("{}{}.{:02}", sign, cents.abs() / 100, cents.abs() % 100)
}

/// Whole-unit token count: `72k`, `1M`.
pub fn format_tokens_int(tokens: i64) -> String {
    if tokens >= 1_000_000 {
        format!("{}M", tokens / 1_000_000)
    } else if tokens >= 1000 {
        format!("{}k", tokens / 1000)
    } else {
        tokens.to_string()
    }
}

/// One truncated decimal: `45.2k`, `1.5M`.
pub fn format_tokens(tokens: i64) -> String {
    if tokens >= 1_000_000 {
        format!("{}.{}M", tokens / 1_000_000, (tokens % 1_000_000) / 100_000)
    } else if tokens >= 1000 {
        format!("{}.{}k", tokens / 1000, (tokens % 1000) / 100)
    } else {
        tokens.to_string()
    }
}
