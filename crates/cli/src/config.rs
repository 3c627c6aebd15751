//! Configuration management for the CLI

use anyhow::{Context, Result};
use oplang_lib::DataSourceSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend base URL
    pub url: Option<String>,
    /// API key sent as a bearer token
    pub api_key: Option<String>,
}

impl Config {
    /// Load configuration from the default location; a missing file is empty
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config file")
    }

    /// Get the configuration file path
    fn config_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("oplang").join("config.json"))
    }

    /// Data source settings with flag and environment values taking precedence
    pub fn settings(
        self,
        url: Option<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<DataSourceSettings> {
        let url = url
            .or(self.url)
            .context("No backend URL configured; pass --url or set OPLANG_URL")?;

        Ok(DataSourceSettings::new(url)
            .with_api_key(api_key.or(self.api_key))
            .with_timeout(timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert!(config.url.is_none());
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_file_values_fill_gaps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"url": "http://from-file:8000", "api_key": "file-key"}"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        let settings = config
            .clone()
            .settings(None, None, Duration::from_secs(30))
            .unwrap();
        assert_eq!(settings.url, "http://from-file:8000");
        assert_eq!(settings.api_key.as_deref(), Some("file-key"));

        let settings = config
            .settings(
                Some("http://flag:8000".to_string()),
                None,
                Duration::from_secs(5),
            )
            .unwrap();
        assert_eq!(settings.url, "http://flag:8000");
        assert_eq!(settings.api_key.as_deref(), Some("file-key"));
        assert_eq!(settings.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_url_required() {
        let err = Config::default()
            .settings(None, None, Duration::from_secs(30))
            .unwrap_err();
        assert!(err.to_string().contains("--url"));
    }

    #[test]
    fn test_invalid_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
