//! Dashboard configuration
//!
//! Defaults cover a local backend. An optional TOML file can override any
//! subset of the keys; the binary layers CLI flags and environment on top.

use crate::activity::DEFAULT_MAX_VISIBLE_PAGES;
use crate::error::CoreError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default backend base URL
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// Activities shown per timeline page
pub const DEFAULT_ACTIVITIES_PER_PAGE: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Base URL of the caching backend (e.g. `http://localhost:5000/api`)
    pub api_base_url: String,

    /// Fixed page size of the activity timeline
    pub activities_per_page: usize,

    /// Page buttons shown before the navigation is compressed
    pub max_visible_pages: usize,

    /// Timeout applied by the HTTP fetch port to each request
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,

    /// Directory holding the persisted selection and filter
    pub state_dir: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            activities_per_page: DEFAULT_ACTIVITIES_PER_PAGE,
            max_visible_pages: DEFAULT_MAX_VISIBLE_PAGES,
            request_timeout: Duration::from_secs(30),
            state_dir: None,
        }
    }
}

impl DashboardConfig {
    /// Load from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Load from `path` when it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.activities_per_page == 0 {
            return Err(CoreError::invalid_config("activities_per_page must be at least 1").into());
        }
        if self.api_base_url.trim().is_empty() {
            return Err(CoreError::invalid_config("api_base_url must not be empty").into());
        }
        Ok(())
    }

    /// Effective state directory: configured, else `<config_dir>/boardwatch`
    pub fn resolved_state_dir(&self) -> Option<PathBuf> {
        self.state_dir
            .clone()
            .or_else(|| dirs::config_dir().map(|dir| dir.join("boardwatch")))
    }

    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("boardwatch").join("config.toml"))
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.activities_per_page, 50);
        assert_eq!(config.max_visible_pages, 5);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = DashboardConfig::from_toml(
            r#"
            api_base_url = "https://dash.example.com/api"
            request_timeout = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.api_base_url, "https://dash.example.com/api");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.activities_per_page, 50);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = DashboardConfig::from_toml("activities_per_page = 0").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempdir().unwrap();
        let config = DashboardConfig::load_or_default(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "state_dir = \"/tmp/boardwatch-state\"\n").unwrap();

        let config = DashboardConfig::load(&path).unwrap();
        assert_eq!(
            config.resolved_state_dir(),
            Some(PathBuf::from("/tmp/boardwatch-state"))
        );
    }
}
