//! Configuration management for chat-window
//!
//! Settings are read from `config.toml` in the platform config directory
//! (or an explicit path). Every section defaults, so a partial or missing
//! file is fine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::content::DEFAULT_REASONING_TITLE;
use crate::core::ConfigError;
use crate::tui::{FrameStyle, ThemePreset};

const APP_NAME: &str = "chat-window";
const CONFIG_FILE: &str = "config.toml";
const LOG_FILE: &str = "chat-window.log";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub reasoning: ReasoningConfig,
    pub theme: ThemeConfig,
    pub logging: LoggingConfig,
}

/// Chat window appearance and identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Header title
    pub title: String,
    /// Input placeholder
    pub placeholder: String,
    /// Id used to decide which messages are "own"
    pub current_user_id: String,
    /// Display name for messages sent from the input
    pub current_user_name: String,
    /// Outer frame style
    pub frame: FrameStyle,
    /// Maximum visible input lines before the input scrolls
    pub input_max_lines: u16,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Chat Window".to_string(),
            placeholder: "Type a message...".to_string(),
            current_user_id: "user-1".to_string(),
            current_user_name: "Current User".to_string(),
            frame: FrameStyle::Default,
            input_max_lines: 8,
        }
    }
}

/// Reasoning annotation rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasoningConfig {
    /// Title for reasoning blocks without a `title` attribute
    pub default_title: String,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            default_title: DEFAULT_REASONING_TITLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    pub preset: ThemePreset,
}

/// Log output for the interactive UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file used while the TUI owns the terminal
    pub file: Option<PathBuf>,
    /// `tracing` filter directive, e.g. `chat_window=debug`
    pub filter: Option<String>,
}

impl LoggingConfig {
    /// Configured log file, or `chat-window.log` in the data directory
    pub fn log_path(&self) -> PathBuf {
        if let Some(ref file) = self.file {
            return file.clone();
        }
        directories::ProjectDirs::from("", "", APP_NAME)
            .map(|dirs| dirs.data_dir().join(LOG_FILE))
            .unwrap_or_else(|| PathBuf::from(LOG_FILE))
    }
}

impl Config {
    /// Load configuration from the default location, or defaults if absent
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, or defaults if the file is absent
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Get the default configuration file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        directories::ProjectDirs::from("", "", APP_NAME)
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }
}
