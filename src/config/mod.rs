//! Configuration
//!
//! Loaded from a YAML file, then overridden from the environment:
//!
//! | variable           | field           |
//! |--------------------|-----------------|
//! | `GLOBALS_CHAT_LOG` | `chat_log_path` |
//! | `GLOBALS_PLAYER`   | `player_name`   |
//! | `GLOBALS_TEAM`     | `team_name`     |
//! | `GLOBALS_DB_PATH`  | `database_path` |
//! | `GLOBALS_PORT`     | `web_server_port` |

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::utils::atomic_write;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub app_name: String,
    pub database_path: PathBuf,
    pub player_name: String,
    pub team_name: String,
    /// Game chat log; empty until configured
    pub chat_log_path: PathBuf,
    pub enable_screenshots: bool,
    pub screenshot_directory: PathBuf,
    /// Seconds to wait after a global before capturing the window
    pub screenshot_delay: f64,
    pub game_window_title: String,
    pub enable_web_server: bool,
    pub web_server_port: u16,
    pub watch_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "globals-watch".to_string(),
            database_path: PathBuf::from("./data/db.yaml"),
            player_name: String::new(),
            team_name: String::new(),
            chat_log_path: PathBuf::new(),
            enable_screenshots: true,
            screenshot_directory: PathBuf::from("./data/screenshots"),
            screenshot_delay: 0.6,
            game_window_title: "Entropia Universe Client".to_string(),
            enable_web_server: false,
            web_server_port: 8080,
            watch_interval_ms: 1000,
        }
    }
}

impl Config {
    /// Read `path` (defaults if absent) and apply environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read `path` only; a missing file yields the defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Apply overrides from `lookup`, normally the process environment
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("GLOBALS_CHAT_LOG") {
            self.chat_log_path = PathBuf::from(path);
        }
        if let Some(player) = lookup("GLOBALS_PLAYER") {
            self.player_name = player;
        }
        if let Some(team) = lookup("GLOBALS_TEAM") {
            self.team_name = team;
        }
        if let Some(path) = lookup("GLOBALS_DB_PATH") {
            self.database_path = PathBuf::from(path);
        }
        if let Some(port) = lookup("GLOBALS_PORT") {
            self.web_server_port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "web_server_port",
                message: format!("`{port}` is not a port number"),
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.screenshot_delay.is_finite() || self.screenshot_delay < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "screenshot_delay",
                message: format!("{} is not a non-negative number of seconds", self.screenshot_delay),
            });
        }
        if self.watch_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "watch_interval_ms",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Write the configuration back as YAML
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_yaml::to_string(self)?;
        atomic_write(path, &content)?;
        Ok(())
    }

    /// Chat log path, required for ingestion
    pub fn require_chat_log(&self) -> Result<&Path, ConfigError> {
        if self.chat_log_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField("chat_log_path"));
        }
        Ok(&self.chat_log_path)
    }

    /// Player name, required for stats reporting
    pub fn require_player(&self) -> Result<&str, ConfigError> {
        self.player().ok_or(ConfigError::MissingField("player_name"))
    }

    pub fn player(&self) -> Option<&str> {
        non_blank(&self.player_name)
    }

    pub fn team(&self) -> Option<&str> {
        non_blank(&self.team_name)
    }

    pub fn screenshot_delay(&self) -> Duration {
        Duration::from_secs_f64(self.screenshot_delay)
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.watch_interval_ms)
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}
