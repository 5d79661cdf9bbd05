use serde::Deserialize;

/// User settings from `statusline.toml`. Every key has a default, and a
/// missing file is not an error.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct StatuslineConfig {
    /// Bar width used when `--width` is absent or invalid.
    pub width: u16,
    pub segments: SegmentsConfig,
    pub update: UpdateConfig,
}

impl Default for StatuslineConfig {
    fn default() -> Self {
        Self {
            width: 50,
            segments: SegmentsConfig::default(),
            update: UpdateConfig::default(),
        }
    }
}

/// Optional line-1 segments, off by default.
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct SegmentsConfig {
    /// "⚡45.2k until compact (22%)"
    pub compact: bool,
    /// Tool and background-task counters.
    pub activity: bool,
}

/// The add-on whose installed version is compared against a cached latest.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct UpdateConfig {
    pub label: String,
    /// Directory holding `VERSION`, under `.claude/` or the Claude home.
    pub version_dir: String,
    /// JSON cache with a `latest` field, relative to the Claude home.
    pub cache_file: String,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            label: "GSD".to_string(),
            version_dir: "get-shit-done".to_string(),
            cache_file: "cache/gsd-update-check.json".to_string(),
        }
    }
}
