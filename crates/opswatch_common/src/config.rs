//! User configuration
//!
//! Config file: `~/.config/opswatch/config.toml`. Every field is
//! optional; a missing or unreadable file falls back to defaults so the
//! tools stay usable with flags alone.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default number of frequency groups shown by the stats report.
const DEFAULT_TOP: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpswatchConfig {
    /// Directory holding CSV extracts and JSON day shards.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Directory JSON day shards are written to by `collect`.
    #[serde(default)]
    pub out_dir: Option<PathBuf>,

    /// Directory build summary CSVs are written to.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,

    /// Default top-N for the stats report.
    #[serde(default = "default_top")]
    pub top_default: usize,
}

fn default_top() -> usize {
    DEFAULT_TOP
}

impl Default for OpswatchConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            out_dir: None,
            export_dir: None,
            top_default: DEFAULT_TOP,
        }
    }
}

impl OpswatchConfig {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("opswatch").join("config.toml"))
    }

    /// Loads the user configuration, falling back to defaults when the
    /// file is absent or malformed.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(&path) {
            Ok(text) => Self::parse(&text, &path.display().to_string()),
            Err(e) => {
                warn!("Failed to read {}: {e}", path.display());
                Self::default()
            }
        }
    }

    fn parse(text: &str, origin: &str) -> Self {
        match toml::from_str(text) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to parse {origin}: {e}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = OpswatchConfig::parse(
            r#"
            log_dir = "/data/datadog"
            out_dir = "/data/datadog"
            export_dir = "/data/ci"
            top_default = 50
            "#,
            "test",
        );
        assert_eq!(config.log_dir, Some(PathBuf::from("/data/datadog")));
        assert_eq!(config.top_default, 50);
    }

    #[test]
    fn test_parse_partial_config_uses_defaults() {
        let config = OpswatchConfig::parse("log_dir = \"/data\"", "test");
        assert_eq!(config.log_dir, Some(PathBuf::from("/data")));
        assert_eq!(config.out_dir, None);
        assert_eq!(config.top_default, DEFAULT_TOP);
    }

    #[test]
    fn test_malformed_config_falls_back() {
        let config = OpswatchConfig::parse("log_dir = [not toml", "test");
        assert_eq!(config.top_default, DEFAULT_TOP);
        assert_eq!(config.log_dir, None);
    }
}
