//! Token and percentage arithmetic.

use super::input::StatusInput;

/// Percentage of the window left free when Claude Code auto-compacts.
pub const AUTO_COMPACT_REMAINING: i64 = 22;

/// Usage percentage at which auto-compaction fires.
pub const COMPACT_THRESHOLD_PERCENT: i64 = 100 - AUTO_COMPACT_REMAINING;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageMetrics {
    pub used_tokens: i64,
    pub max_tokens: i64,
    /// Always within `0..=100`.
    pub usage_percent: u8,
    pub remaining_until_compact_percent: f64,
    pub remaining_until_compact_tokens: i64,
}

impl UsageMetrics {
    pub fn compute(input: &StatusInput) -> Self {
        let window = input.context_window_size;
        let raw_used = input
            .total_input_tokens
            .saturating_add(input.total_output_tokens)
            .saturating_add(input.cache_read_tokens);

        let (usage_percent, used_tokens) = match input.precalculated_percentage {
            // The host's own percentage wins over raw counts. Tokens are
            // derived before clamping; only the percentage is clamped.
            Some(pct) => {
                let pct = pct.trunc();
                (clamp_percent(pct as i64), scale(window, pct))
            }
            None => {
                let percent = if window > 0 {
                    (i128::from(raw_used) * 100 / i128::from(window))
                        .clamp(i128::from(i64::MIN), i128::from(i64::MAX))
                        as i64
                } else {
                    0
                };
                (clamp_percent(percent), raw_used)
            }
        };

        let remaining_until_compact_percent = input
            .until_compact
            .unwrap_or(input.remaining_percentage - AUTO_COMPACT_REMAINING as f64)
            .max(0.0);

        Self {
            used_tokens,
            max_tokens: window,
            usage_percent,
            remaining_until_compact_percent,
            remaining_until_compact_tokens: scale(window, remaining_until_compact_percent),
        }
    }
}

fn clamp_percent(percent: i64) -> u8 {
    percent.clamp(0, 100) as u8
}

/// `truncate(window * percent / 100)`.
fn scale(window: i64, percent: f64) -> i64 {
    (window as f64 * percent / 100.0).trunc() as i64
}
