//! TOML-based application configuration.
//!
//! Stores:
//! - Backend server URL
//! - Rotation durations and tick cadence
//! - Poll intervals for the display and admin loops
//! - Placeholder text shown when the queue is empty
//!
//! Configuration is stored at `~/.config/signboard/config.toml`. Every
//! field has a default, so a missing file or a partial file both work.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::message::SignText;

/// Backend connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_url")]
    pub url: String,
}

/// Rotation timing configuration. Defaults match the physical board:
/// 25s per message in normal operation, 5s in fast (testing) mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationConfig {
    #[serde(default = "default_normal_secs")]
    pub normal_secs: u64,
    #[serde(default = "default_fast_secs")]
    pub fast_secs: u64,
    /// Progress update cadence for the display loop.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Delay between showing a fresh message and firing its celebration.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

/// Poll intervals for the reconciliation loops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_queue_secs")]
    pub queue_secs: u64,
    #[serde(default = "default_trigger_secs")]
    pub trigger_secs: u64,
    #[serde(default = "default_admin_secs")]
    pub admin_secs: u64,
}

/// Placeholder text for an empty queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_placeholder_line1")]
    pub placeholder_line1: String,
    #[serde(default = "default_placeholder_line2")]
    pub placeholder_line2: String,
    #[serde(default)]
    pub placeholder_line3: String,
    #[serde(default)]
    pub placeholder_line4: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/signboard/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub rotation: RotationConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

fn default_server_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_normal_secs() -> u64 {
    25
}
fn default_fast_secs() -> u64 {
    5
}
fn default_tick_ms() -> u64 {
    100
}
fn default_settle_ms() -> u64 {
    500
}
fn default_queue_secs() -> u64 {
    3
}
fn default_trigger_secs() -> u64 {
    1
}
fn default_admin_secs() -> u64 {
    2
}
fn default_placeholder_line1() -> String {
    "WELCOME".to_string()
}
fn default_placeholder_line2() -> String {
    "LEAVE A MSG".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
        }
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            normal_secs: default_normal_secs(),
            fast_secs: default_fast_secs(),
            tick_ms: default_tick_ms(),
            settle_ms: default_settle_ms(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            queue_secs: default_queue_secs(),
            trigger_secs: default_trigger_secs(),
            admin_secs: default_admin_secs(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            placeholder_line1: default_placeholder_line1(),
            placeholder_line2: default_placeholder_line2(),
            placeholder_line3: String::new(),
            placeholder_line4: String::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            rotation: RotationConfig::default(),
            poll: PollConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Config {
    /// Path to the configuration file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("signboard").join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when the file
    /// does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Save the configuration, creating the directory if needed.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::SaveFailed {
                path: path.clone(),
                message: e.to_string(),
            })?;
        }
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, raw).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// The synthetic text displayed when the queue is empty.
    pub fn placeholder(&self) -> SignText {
        SignText::new(
            &self.display.placeholder_line1,
            &self.display.placeholder_line2,
            &self.display.placeholder_line3,
            &self.display.placeholder_line4,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_board_timings() {
        let config = Config::default();
        assert_eq!(config.rotation.normal_secs, 25);
        assert_eq!(config.rotation.fast_secs, 5);
        assert_eq!(config.rotation.tick_ms, 100);
        assert_eq!(config.poll.queue_secs, 3);
        assert_eq!(config.poll.trigger_secs, 1);
        assert_eq!(config.poll.admin_secs, 2);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            url = "http://sign.local:8080"

            [rotation]
            fast_secs = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.server.url, "http://sign.local:8080");
        assert_eq!(config.rotation.fast_secs, 3);
        assert_eq!(config.rotation.normal_secs, 25);
        assert_eq!(config.display.placeholder_line1, "WELCOME");
    }

    #[test]
    fn round_trips_through_toml() {
        let config = Config::default();
        let raw = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&raw).unwrap();
        assert_eq!(back.server.url, config.server.url);
        assert_eq!(back.rotation.normal_secs, config.rotation.normal_secs);
    }
}
