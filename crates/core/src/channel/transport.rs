//! Push transport trait.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use std::pin::Pin;
use tokio_stream::Stream;

/// Text frames received over one open connection.
///
/// The stream ends when the connection closes; an `Err` item reports a
/// connection failure after which no more frames arrive.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String, SyncError>> + Send>>;

/// Opens push connections addressed by process instance id.
///
/// Implementations perform a single connection attempt per call. Retrying is
/// the supervisor's job.
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn connect(&self, process_instance_id: &str) -> SyncResult<FrameStream>;
}
