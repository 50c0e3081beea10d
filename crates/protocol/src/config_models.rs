//! Configuration models for `taskwatch.toml`.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! usable configuration apart from the two endpoint URLs.

use serde::Deserialize;
use serde::Serialize;
use ts_rs::TS;

/// Top-level synchronization settings.
///
/// # Example
///
/// ```toml
/// snapshot_url = "https://engine.example.com/api/tasks/query"
/// push_url = "wss://engine.example.com/events"
/// include_history = false
///
/// [poll]
/// empty_interval_ms = 5000
/// steady_interval_ms = 30000
///
/// [push]
/// reconnect_interval_ms = 1000
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(default)]
pub struct SyncConfig {
    /// Endpoint receiving snapshot queries as JSON POST bodies.
    pub snapshot_url: Option<String>,

    /// Websocket base URL; the process instance id is appended as the last
    /// path segment.
    pub push_url: Option<String>,

    /// Ask snapshots to include already completed tasks.
    pub include_history: bool,

    /// Upper bound for a single snapshot request.
    pub request_timeout_ms: u64,

    pub poll: PollConfig,

    pub push: PushConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            snapshot_url: None,
            push_url: None,
            include_history: false,
            request_timeout_ms: 10_000,
            poll: PollConfig::default(),
            push: PushConfig::default(),
        }
    }
}

/// Adaptive snapshot polling.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(default)]
pub struct PollConfig {
    /// Delay before the next poll while the last snapshot was empty.
    pub empty_interval_ms: u64,

    /// Delay before the next poll once tasks have been observed.
    pub steady_interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            empty_interval_ms: 5_000,
            steady_interval_ms: 30_000,
        }
    }
}

/// Push channel supervision.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(default)]
pub struct PushConfig {
    /// Fixed delay between reconnect attempts. Retries never stop.
    pub reconnect_interval_ms: u64,

    /// Capacity of the per-channel fan-out buffer.
    pub event_buffer: usize,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            reconnect_interval_ms: 1_000,
            event_buffer: 256,
        }
    }
}
