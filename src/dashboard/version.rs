//! Update notice for an externally tracked add-on.
//!
//! The installed version comes from a `VERSION` file in the project's or
//! the user's Claude directory; the latest known version from a JSON cache
//! written by some other hook. Neither file is required.

use std::path::{Path, PathBuf};

use crate::config::UpdateConfig;

const UNKNOWN: &str = "unknown";

/// Installed/latest pair, present only when an update is due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateNotice {
    pub label: String,
    pub installed: String,
    pub latest: String,
}

impl UpdateNotice {
    /// Check the project directory first, then `claude_home`.
    pub fn check(
        config: &UpdateConfig,
        project_dir: Option<&str>,
        claude_home: Option<&Path>,
    ) -> Option<Self> {
        let version_file = find_version_file(config, project_dir, claude_home)?;
        let installed = read_installed(&version_file);

        let cache_path = claude_home?.join(&config.cache_file);
        let latest = read_latest(&cache_path)?;

        if installed == UNKNOWN || latest == UNKNOWN || installed == latest {
            return None;
        }
        Some(Self {
            label: config.label.clone(),
            installed,
            latest,
        })
    }
}

fn find_version_file(
    config: &UpdateConfig,
    project_dir: Option<&str>,
    claude_home: Option<&Path>,
) -> Option<PathBuf> {
    let local = project_dir
        .filter(|d| !d.is_empty())
        .map(|d| Path::new(d).join(".claude").join(&config.version_dir).join("VERSION"));
    let global = claude_home.map(|h| h.join(&config.version_dir).join("VERSION"));

    local.into_iter().chain(global).find(|p| p.is_file())
}

/// An empty or unreadable file counts as `0.0.0`.
fn read_installed(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(contents) if !contents.trim().is_empty() => contents.trim().to_string(),
        Ok(_) => "0.0.0".to_string(),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "unreadable version file");
            "0.0.0".to_string()
        }
    }
}

/// The cache's `latest` field. A missing or malformed cache yields `None`.
fn read_latest(path: &Path) -> Option<String> {
    let contents = std::fs::read_to_string(path).ok()?;
    let cache: serde_json::Value = match serde_json::from_str(&contents) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "malformed update cache");
            return None;
        }
    };
    let latest = cache
        .get("latest")
        .and_then(version_text)
        .unwrap_or_else(|| UNKNOWN.to_string());
    Some(latest)
}

/// A version as written by the cache: a non-empty string or a non-zero
/// number. Anything else counts as unknown.
fn version_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => {
            Some(n.to_string())
        }
        _ => None,
    }
}
