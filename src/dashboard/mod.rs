//! The rendering pipeline: normalized input, derived metrics, gradient bar,
//! git summary and composed lines. Every stage takes immutable values from
//! the one before it.

pub mod bar;
pub mod compose;
pub mod input;
pub mod style;
pub mod usage;
pub mod version;

use crate::config::SegmentsConfig;
use crate::git::GitState;

use bar::GradientBar;
use compose::{DashboardLines, LineComposer};
use usage::UsageMetrics;

pub use input::StatusInput;
pub use version::UpdateNotice;

/// Everything outside the payload that shapes one render.
pub struct RenderOptions<'a> {
    pub width: u16,
    pub segments: &'a SegmentsConfig,
}

/// Pure part of the pipeline: no process or filesystem access.
pub fn render(
    input: &StatusInput,
    git: &GitState,
    update: Option<&UpdateNotice>,
    options: &RenderOptions<'_>,
) -> DashboardLines {
    let usage = UsageMetrics::compute(input);
    let bar = GradientBar::render(options.width, usage.usage_percent);
    tracing::trace!(?usage, filled = bar.filled_count, "computed usage");

    LineComposer {
        input,
        usage: &usage,
        bar: &bar,
        git,
        update,
        segments: options.segments,
    }
    .compose()
}
