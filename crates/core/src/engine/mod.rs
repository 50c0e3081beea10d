//! Subscription engine.
//!
//! The [`Synchronizer`] is the public entry point: it owns the snapshot
//! source and the shared push channel registry, and hands out one
//! [`Subscription`] per `subscribe` call. Each subscription runs its own
//! actor task (see [`subscription`]) that merges snapshots and push frames
//! into a private task store.

pub mod subscription;

use crate::channel::{ChannelRegistry, PushTransport, ReconnectPolicy, WebSocketTransport};
use crate::error::{SyncError, SyncResult};
use crate::snapshot::{HttpSnapshotSource, PollSchedule, SnapshotSource};
use std::sync::Arc;
use std::time::Duration;
use tw_protocol::config_models::SyncConfig;
use tw_protocol::event_models::ProcessEndEvent;
use tw_protocol::task_models::Viewer;

pub use subscription::Subscription;

/// Starts subscriptions that keep a viewer's task list in sync with a
/// process instance.
///
/// Subscriptions to the same process instance share one push channel.
pub struct Synchronizer {
    source: Arc<dyn SnapshotSource>,
    registry: ChannelRegistry,
    schedule: PollSchedule,
    include_history: bool,
    event_buffer: usize,
}

impl Synchronizer {
    /// Create a synchronizer over explicit transports.
    ///
    /// Intervals, buffer sizes and `include_history` are taken from `config`;
    /// its endpoint URLs are ignored.
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        transport: Arc<dyn PushTransport>,
        config: &SyncConfig,
    ) -> Self {
        Self {
            source,
            registry: ChannelRegistry::new(transport, ReconnectPolicy::from(&config.push)),
            schedule: PollSchedule::from(&config.poll),
            include_history: config.include_history,
            event_buffer: config.push.event_buffer.max(1),
        }
    }

    /// Create a synchronizer talking HTTP for snapshots and websockets for
    /// push frames.
    ///
    /// # Errors
    ///
    /// Returns an error if either endpoint is missing or malformed.
    pub fn from_config(config: &SyncConfig) -> SyncResult<Self> {
        let snapshot_url = config
            .snapshot_url
            .as_deref()
            .ok_or(SyncError::MissingEndpoint("snapshot_url"))?;
        let push_url = config
            .push_url
            .as_deref()
            .ok_or(SyncError::MissingEndpoint("push_url"))?;

        let source = HttpSnapshotSource::new(
            snapshot_url,
            Duration::from_millis(config.request_timeout_ms),
        )?;
        let transport = WebSocketTransport::new(push_url)?;

        Ok(Self::new(Arc::new(source), Arc::new(transport), config))
    }

    /// The shared push channel registry, for diagnostics.
    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    /// Start synchronizing the tasks of `process_instance_id` assigned to
    /// `viewer`.
    ///
    /// `on_complete` runs at most once, on the subscription task, when the
    /// process instance reaches a terminal end. It must not block.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn subscribe<F>(
        &self,
        process_instance_id: &str,
        viewer: Viewer,
        on_complete: F,
    ) -> Subscription
    where
        F: FnOnce(&ProcessEndEvent) + Send + 'static,
    {
        let lease = self.registry.acquire(process_instance_id);
        subscription::start(
            subscription::SubscriptionParams {
                process_instance_id: process_instance_id.to_string(),
                viewer,
                source: Arc::clone(&self.source),
                schedule: self.schedule,
                include_history: self.include_history,
                event_buffer: self.event_buffer,
            },
            lease,
            on_complete,
        )
    }
}
