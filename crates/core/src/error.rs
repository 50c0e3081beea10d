//! Error types for the synchronization transports.
//!
//! None of these errors are fatal to a subscription: the snapshot poller and
//! the channel supervisor log them and carry on with their schedules.

use thiserror::Error;

/// Errors raised while talking to the snapshot source or the push channel.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("Snapshot request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The snapshot source answered with a non-success status.
    #[error("Snapshot source at {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// A response or frame could not be decoded.
    #[error("Failed to decode {what}: {reason}")]
    Decode { what: String, reason: String },

    /// An endpoint URL is malformed.
    #[error("Invalid endpoint URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    /// Opening the push channel failed.
    #[error("Failed to connect push channel at {url}: {reason}")]
    Connect { url: String, reason: String },

    /// The push channel failed after it was opened.
    #[error("Push channel error: {0}")]
    Stream(String),

    /// A required endpoint is not configured.
    #[error("Missing configuration: {0}")]
    MissingEndpoint(&'static str),
}

/// Type alias for Result with SyncError.
pub type SyncResult<T> = Result<T, SyncError>;
