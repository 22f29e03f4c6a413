//! Configuration file management.
//!
//! The console reads `~/.config/verdant/config.toml` (or the platform
//! equivalent). Every field has a default, so a missing file or empty table
//! yields a working configuration pointed at localhost services.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the device registry service.
    #[serde(default = "default_registry_url")]
    pub registry_url: String,

    /// Base URL of the controller service (thresholds, averaged readings).
    #[serde(default = "default_controller_url")]
    pub controller_url: String,

    /// Base URL of the DB reader service (history records).
    #[serde(default = "default_history_url")]
    pub history_url: String,

    /// WebSocket URL of the streaming variant. When set, the dashboard
    /// consumes pushed sample batches instead of polling averaged readings.
    #[serde(default)]
    pub stream_url: Option<String>,

    /// Dashboard poll interval in seconds (chart data and thresholds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Default interval for `verdant watch`, in seconds.
    #[serde(default = "default_watch_interval")]
    pub watch_interval_secs: u64,

    /// Theme preference: "dark" or "light".
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_registry_url() -> String {
    "http://127.0.0.1:8081".to_string()
}

fn default_controller_url() -> String {
    "http://127.0.0.1:8082".to_string()
}

fn default_history_url() -> String {
    "http://127.0.0.1:8083".to_string()
}

fn default_poll_interval() -> u64 {
    1
}

fn default_watch_interval() -> u64 {
    5
}

fn default_theme() -> String {
    "dark".to_string()
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str("").expect("empty config must deserialize via defaults")
    }
}

impl Config {
    /// The default config file path (`~/.config/verdant/config.toml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("verdant").join("config.toml"))
    }

    /// Load configuration from a file, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Load from an explicit path, or from the default location.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(path) => Self::load(&path),
                None => Ok(Self::default()),
            },
        }
    }

    /// Write the configuration to a file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let raw = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, raw)
            .with_context(|| format!("Failed to write config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.registry_url, "http://127.0.0.1:8081");
        assert_eq!(config.controller_url, "http://127.0.0.1:8082");
        assert_eq!(config.history_url, "http://127.0.0.1:8083");
        assert_eq!(config.stream_url, None);
        assert_eq!(config.poll_interval_secs, 1);
        assert_eq!(config.theme, "dark");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config =
            toml::from_str("registry_url = \"http://greenhouse.local:9000\"\n").unwrap();
        assert_eq!(config.registry_url, "http://greenhouse.local:9000");
        assert_eq!(config.controller_url, "http://127.0.0.1:8082");
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.poll_interval_secs, 1);
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");

        let mut config = Config::default();
        config.stream_url = Some("ws://127.0.0.1:8084/ws/sensor".to_string());
        config.save(&path).unwrap();

        let reloaded = Config::load(&path).unwrap();
        assert_eq!(reloaded.stream_url, config.stream_url);
    }
}
