//! Application configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Address the web interface listens on
    pub bind_address: String,

    /// Download location; the platform Downloads folder when unset
    pub download_location: Option<PathBuf>,

    /// Container used when a request does not name one
    pub default_container: String,

    /// Attempts per network operation (extraction, media and image fetches)
    pub retry_attempts: usize,

    /// Base delay between attempts, scaled by the attempt number
    pub retry_base_delay_ms: u64,

    /// Timeout for plain HTTP fetches
    pub http_timeout_secs: u64,

    /// Explicit yt-dlp binary, skipping the PATH lookup
    pub ytdlp_path: Option<PathBuf>,

    /// Default tracing filter when `RUST_LOG` is not set
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8501".to_string(),
            download_location: None,
            default_container: "mp4".to_string(),
            retry_attempts: 3,
            retry_base_delay_ms: 1000,
            http_timeout_secs: 30,
            ytdlp_path: None,
            log_level: "info".to_string(),
        }
    }
}

impl AppSettings {
    /// File the settings come from: the explicit path, else the first
    /// default location that exists.
    pub fn config_source(explicit: Option<&Path>) -> Option<PathBuf> {
        match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::config_paths().into_iter().find(|p| p.exists()),
        }
    }

    /// Load settings from [`Self::config_source`], or fall back to defaults.
    ///
    /// Nothing is logged here; the caller may not have a subscriber yet.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match Self::config_source(explicit) {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(settings.normalized())
    }

    /// Enforce sane minimums
    pub fn normalized(mut self) -> Self {
        if self.retry_attempts == 0 {
            self.retry_attempts = 1;
        }
        if self.http_timeout_secs == 0 {
            self.http_timeout_secs = 1;
        }
        if self.default_container.trim().is_empty() {
            self.default_container = "mp4".to_string();
        }
        self
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("mediagrab.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("mediagrab").join("config.toml"));
        }

        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppSettings::default();
        assert!(config.retry_attempts > 0);
        assert!(config.http_timeout_secs > 0);
        assert_eq!(config.default_container, "mp4");
        assert!(config.download_location.is_none());
    }

    #[test]
    fn test_normalized_enforces_minimums() {
        let config = AppSettings {
            retry_attempts: 0,
            http_timeout_secs: 0,
            default_container: " ".to_string(),
            ..Default::default()
        }
        .normalized();

        assert_eq!(config.retry_attempts, 1);
        assert_eq!(config.http_timeout_secs, 1);
        assert_eq!(config.default_container, "mp4");
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = temp.path().join("mediagrab.toml");
        std::fs::write(
            &path,
            "bind_address = \"0.0.0.0:9000\"\nretry_attempts = 5\ndownload_location = \"/data/media\"\n",
        )
        .expect("write config");

        let config = AppSettings::load(Some(&path)).expect("load");
        assert_eq!(config.bind_address, "0.0.0.0:9000");
        assert_eq!(config.retry_attempts, 5);
        assert_eq!(config.download_location, Some(PathBuf::from("/data/media")));
        assert_eq!(config.http_timeout_secs, 30);
    }

    #[test]
    fn test_explicit_config_source_wins() {
        let path = PathBuf::from("/tmp/custom-mediagrab.toml");
        assert_eq!(AppSettings::config_source(Some(&path)), Some(path));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let temp = tempfile::tempdir().expect("temp dir");
        let result = AppSettings::load(Some(&temp.path().join("nope.toml")));
        assert!(result.is_err());
    }
}
