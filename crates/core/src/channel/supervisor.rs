//! Supervision of one shared push channel.
//!
//! A [`SharedChannel`] owns a background task that keeps a push connection
//! open for one process instance: connect, read frames until the connection
//! drops, wait the fixed retry interval, reconnect. There is no retry limit.
//!
//! Every frame is normalized once and fanned out to all subscribers through
//! a broadcast channel. Connectivity is published through a watch channel
//! for diagnostics only.

use super::transport::PushTransport;
use crate::normalizer::normalize_frame;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};
use tw_protocol::config_models::PushConfig;
use tw_protocol::event_models::NormalizedFrame;
use tw_protocol::process_models::ConnectionStatus;

/// Reconnect behaviour of a supervised channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Fixed delay between a disconnect (or failed attempt) and the next try.
    pub retry_interval: Duration,

    /// Number of normalized frames buffered per subscriber.
    pub buffer: usize,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from(&PushConfig::default())
    }
}

impl From<&PushConfig> for ReconnectPolicy {
    fn from(config: &PushConfig) -> Self {
        Self {
            retry_interval: Duration::from_millis(config.reconnect_interval_ms),
            buffer: config.event_buffer.max(1),
        }
    }
}

/// A supervised push connection for one process instance.
///
/// Dropping the channel stops its supervisor task.
pub struct SharedChannel {
    process_instance_id: String,
    frames_tx: broadcast::Sender<NormalizedFrame>,
    status_tx: Arc<watch::Sender<ConnectionStatus>>,
    supervisor: JoinHandle<()>,
    stopped: AtomicBool,
}

impl SharedChannel {
    /// Start supervising the channel for `process_instance_id`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(
        process_instance_id: impl Into<String>,
        transport: Arc<dyn PushTransport>,
        policy: ReconnectPolicy,
    ) -> Self {
        let process_instance_id = process_instance_id.into();
        let (frames_tx, _) = broadcast::channel(policy.buffer.max(1));
        let status_tx = Arc::new(watch::Sender::new(ConnectionStatus::Uninitialized));

        let supervisor = tokio::spawn(supervise(
            process_instance_id.clone(),
            transport,
            policy,
            frames_tx.clone(),
            Arc::clone(&status_tx),
        ));

        Self {
            process_instance_id,
            frames_tx,
            status_tx,
            supervisor,
            stopped: AtomicBool::new(false),
        }
    }

    pub fn process_instance_id(&self) -> &str {
        &self.process_instance_id
    }

    /// Receive every frame normalized from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<NormalizedFrame> {
        self.frames_tx.subscribe()
    }

    /// Follow connectivity changes.
    pub fn status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_tx.subscribe()
    }

    pub fn current_status(&self) -> ConnectionStatus {
        *self.status_tx.borrow()
    }

    /// Stop the supervisor and report the channel as closed.
    pub fn shutdown(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        self.status_tx.send_replace(ConnectionStatus::Closing);
        self.supervisor.abort();
        self.status_tx.send_replace(ConnectionStatus::Closed);
        info!(process_instance_id = %self.process_instance_id, "push channel shut down");
    }
}

impl Drop for SharedChannel {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn supervise(
    process_instance_id: String,
    transport: Arc<dyn PushTransport>,
    policy: ReconnectPolicy,
    frames_tx: broadcast::Sender<NormalizedFrame>,
    status_tx: Arc<watch::Sender<ConnectionStatus>>,
) {
    let mut attempt: u64 = 0;
    loop {
        attempt += 1;
        status_tx.send_replace(ConnectionStatus::Connecting);

        match transport.connect(&process_instance_id).await {
            Ok(mut frames) => {
                info!(%process_instance_id, attempt, "push channel open");
                status_tx.send_replace(ConnectionStatus::Open);

                while let Some(frame) = frames.next().await {
                    match frame {
                        Ok(text) => match normalize_frame(&text) {
                            // No receivers is fine: the channel outlives idle periods.
                            Some(normalized) => {
                                let _ = frames_tx.send(normalized);
                            }
                            None => debug!(%process_instance_id, "dropping unclassified frame"),
                        },
                        Err(e) => {
                            warn!(%process_instance_id, error = %e, "push channel failed");
                            break;
                        }
                    }
                }

                info!(%process_instance_id, "push channel closed");
            }
            Err(e) => {
                warn!(%process_instance_id, attempt, error = %e, "push channel connect failed");
            }
        }

        status_tx.send_replace(ConnectionStatus::Closed);
        tokio::time::sleep(policy.retry_interval).await;
    }
}
