//! Authoritative task snapshots.
//!
//! This module provides the `SnapshotSource` trait (one request/response
//! call returning the full task list for a filter), the HTTP implementation,
//! and the adaptive poller that drives it.
//!
//! The poller re-polls quickly while nothing has been observed and slows
//! down once tasks show up. A failed fetch is not retried early; the next
//! poll simply happens on schedule.

pub mod http;

use crate::error::SyncResult;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use tw_protocol::config_models::PollConfig;
use tw_protocol::task_models::{SnapshotQuery, Task};

pub use http::HttpSnapshotSource;

/// A source of authoritative task lists.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch every task matching `query`.
    async fn fetch(&self, query: &SnapshotQuery) -> SyncResult<Vec<Task>>;
}

/// Delays between snapshot polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    /// Used while the last successful snapshot was empty.
    pub empty_interval: Duration,

    /// Used once a snapshot returned at least one task.
    pub steady_interval: Duration,
}

impl PollSchedule {
    pub fn next_delay(&self, last_was_empty: bool) -> Duration {
        if last_was_empty {
            self.empty_interval
        } else {
            self.steady_interval
        }
    }
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self::from(&PollConfig::default())
    }
}

impl From<&PollConfig> for PollSchedule {
    fn from(config: &PollConfig) -> Self {
        Self {
            empty_interval: Duration::from_millis(config.empty_interval_ms),
            steady_interval: Duration::from_millis(config.steady_interval_ms),
        }
    }
}

/// Fetches snapshots for one subscription and tracks the adaptive interval.
pub struct SnapshotPoller {
    source: Arc<dyn SnapshotSource>,
    query: SnapshotQuery,
    schedule: PollSchedule,
    last_was_empty: bool,
}

impl SnapshotPoller {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        query: SnapshotQuery,
        schedule: PollSchedule,
    ) -> Self {
        Self {
            source,
            query,
            schedule,
            last_was_empty: true,
        }
    }

    pub fn query(&self) -> &SnapshotQuery {
        &self.query
    }

    /// Run one fetch.
    ///
    /// # Returns
    ///
    /// The fetched batch, or `None` if the fetch failed. Failures are logged
    /// and leave the current interval unchanged.
    pub async fn poll(&mut self) -> Option<Vec<Task>> {
        match self.source.fetch(&self.query).await {
            Ok(tasks) => {
                debug!(
                    process_instance_id = ?self.query.process_instance_id,
                    count = tasks.len(),
                    "snapshot fetched"
                );
                self.last_was_empty = tasks.is_empty();
                Some(tasks)
            }
            Err(e) => {
                warn!(
                    process_instance_id = ?self.query.process_instance_id,
                    error = %e,
                    "snapshot fetch failed; retrying on schedule"
                );
                None
            }
        }
    }

    /// Delay until the next poll, based on the last successful result.
    pub fn next_delay(&self) -> Duration {
        self.schedule.next_delay(self.last_was_empty)
    }
}
