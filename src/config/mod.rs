pub mod schema;

use std::path::PathBuf;

pub use schema::{SegmentsConfig, StatuslineConfig, UpdateConfig};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "STATUSLINE_CONFIG";

/// Load `statusline.toml`.
///
/// Checks `STATUSLINE_CONFIG` first, then falls back to
/// `~/.config/claude-statusline/statusline.toml` (platform-appropriate).
/// Returns defaults if the file is missing or unparseable.
pub fn load() -> StatuslineConfig {
    let config_path = std::env::var(CONFIG_ENV)
        .ok()
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::config_dir().map(|d| d.join("claude-statusline").join("statusline.toml")));

    match config_path {
        Some(path) if path.exists() => match std::fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::debug!(path = %path.display(), error = %e, "ignoring invalid config");
                StatuslineConfig::default()
            }),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "unreadable config");
                StatuslineConfig::default()
            }
        },
        _ => StatuslineConfig::default(),
    }
}

/// Claude Code's configuration directory: `CLAUDE_CONFIG_DIR` if set,
/// otherwise `~/.claude`.
pub fn claude_home() -> Option<PathBuf> {
    match std::env::var("CLAUDE_CONFIG_DIR") {
        Ok(dir) if !dir.is_empty() => Some(expand_tilde(&dir)),
        _ => dirs::home_dir().map(|h| h.join(".claude")),
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
