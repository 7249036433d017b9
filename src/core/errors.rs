//! Domain error types
//!
//! Content extraction has no error path; these cover the stateful parts of
//! the widget and configuration loading.

use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the message list
#[derive(Debug, Error)]
pub enum MessageListError {
    /// No message with this id
    #[error("Message not found: {0}")]
    NotFound(Uuid),
}

/// Errors raised while loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No platform config directory could be determined
    #[error("Could not determine a configuration directory")]
    NoConfigDir,

    /// Reading or writing the file failed
    #[error("Config I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for the config schema
    #[error("Invalid config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The config could not be serialized
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}
