//! Configuration file loader for `taskwatch.toml`.
//!
//! A missing file is not an error: every setting has a default, and the
//! endpoint URLs can be supplied on the command line instead.

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use std::path::Path;
use tw_protocol::config_models::SyncConfig;
use url::Url;

/// Conventional file name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "taskwatch.toml";

/// Loads and validates the configuration at `path`.
///
/// # Returns
///
/// The parsed configuration, or [`SyncConfig::default`] when `path` does
/// not exist.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - The file exists but cannot be read
/// - The file is not valid TOML or has fields of the wrong type
/// - A value fails validation (see [`validate_config`])
///
/// # Example
///
/// ```rust,no_run
/// use tw_core::config::loader::load_config;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("taskwatch.toml"))?;
/// println!("polling every {} ms while empty", config.poll.empty_interval_ms);
/// # Ok(())
/// # }
/// ```
pub fn load_config(path: &Path) -> ConfigResult<SyncConfig> {
    if !path.exists() {
        return Ok(SyncConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let config: SyncConfig = toml::from_str(&content).map_err(|source| ConfigError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;

    validate_config(&config, path)?;

    Ok(config)
}

/// Checks the values the engine cannot work with.
///
/// `origin` is only used to label errors; pass the file the values came
/// from, or a placeholder such as `"<command line>"`.
///
/// # Errors
///
/// Returns `ConfigError::InvalidConfig` if an interval, the request timeout
/// or the event buffer is zero, or if a configured URL does not parse.
pub fn validate_config(config: &SyncConfig, origin: &Path) -> ConfigResult<()> {
    let invalid = |reason: String| ConfigError::InvalidConfig {
        path: origin.to_path_buf(),
        reason,
    };

    if config.poll.empty_interval_ms == 0 || config.poll.steady_interval_ms == 0 {
        return Err(invalid("poll intervals must be greater than zero".to_string()));
    }
    if config.push.reconnect_interval_ms == 0 {
        return Err(invalid(
            "push.reconnect_interval_ms must be greater than zero".to_string(),
        ));
    }
    if config.push.event_buffer == 0 {
        return Err(invalid("push.event_buffer must be greater than zero".to_string()));
    }
    if config.request_timeout_ms == 0 {
        return Err(invalid("request_timeout_ms must be greater than zero".to_string()));
    }

    for (field, value) in [
        ("snapshot_url", &config.snapshot_url),
        ("push_url", &config.push_url),
    ] {
        if let Some(raw) = value {
            Url::parse(raw).map_err(|e| invalid(format!("{field} {raw:?} is not a URL: {e}")))?;
        }
    }

    Ok(())
}
