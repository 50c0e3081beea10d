//! Process instance and push-channel state models.
//!
//! This module defines the states a watched process instance can report and
//! the connectivity states of the push channel feeding a subscription.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// State of a process instance as reported by an end event.
///
/// Only [`ProcessState::Completed`] and [`ProcessState::ExternallyTerminated`]
/// are terminal. Any state string the feed sends that is not listed here
/// decodes to [`ProcessState::Unknown`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessState {
    Active,
    Suspended,
    Completed,
    ExternallyTerminated,
    InternallyTerminated,

    /// Missing or unrecognized state.
    #[default]
    #[serde(other)]
    Unknown,
}

impl ProcessState {
    /// Whether no further transitions can occur from this state.
    pub fn is_terminal(self) -> bool {
        matches!(self, ProcessState::Completed | ProcessState::ExternallyTerminated)
    }
}

/// Connectivity of a shared push channel.
///
/// Diagnostic only: events are applied whenever they arrive, whatever the
/// reported status.
///
/// The channel moves through these states while supervised:
/// Uninitialized -> Connecting -> Open -> Closed -> Connecting -> ...
///
/// Closing is reported while a channel is being torn down.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// No connection attempt has been made yet.
    #[default]
    Uninitialized,

    /// A connection attempt is in flight.
    Connecting,

    /// Frames are being received.
    Open,

    /// The channel is shutting down.
    Closing,

    /// The connection is down; a retry is scheduled unless shut down.
    Closed,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ConnectionStatus::Uninitialized => "uninitialized",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Open => "open",
            ConnectionStatus::Closing => "closing",
            ConnectionStatus::Closed => "closed",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(ProcessState::Completed.is_terminal());
        assert!(ProcessState::ExternallyTerminated.is_terminal());
        assert!(!ProcessState::InternallyTerminated.is_terminal());
        assert!(!ProcessState::Active.is_terminal());
        assert!(!ProcessState::Unknown.is_terminal());
    }

    #[test]
    fn test_unrecognized_state_decodes_to_unknown() {
        let state: ProcessState = serde_json::from_str("\"SOMETHING_ELSE\"").unwrap();
        assert_eq!(state, ProcessState::Unknown);
    }

    #[test]
    fn test_connection_status_display_matches_wire_name() {
        for status in [
            ConnectionStatus::Uninitialized,
            ConnectionStatus::Connecting,
            ConnectionStatus::Open,
            ConnectionStatus::Closing,
            ConnectionStatus::Closed,
        ] {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, status.to_string());
        }
    }
}
