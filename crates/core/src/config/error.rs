//! Why `taskwatch.toml` could not be turned into a [`SyncConfig`].
//!
//! Every variant names the file involved; values that came from command
//! line overrides are reported against the file they were merged into.
//!
//! [`SyncConfig`]: tw_protocol::config_models::SyncConfig

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file exists but its contents could not be read.
    #[error("Cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not TOML, or a setting has the wrong type.
    #[error("Malformed TOML in {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A setting parsed but the engine cannot run with it.
    #[error("Invalid configuration in {path}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
