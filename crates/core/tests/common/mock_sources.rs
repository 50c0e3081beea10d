//! In-memory snapshot source and push transport.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tw_core::channel::{FrameStream, PushTransport};
use tw_core::error::{SyncError, SyncResult};
use tw_core::snapshot::SnapshotSource;
use tw_protocol::task_models::{SnapshotQuery, Task};

/// Snapshot source returning whatever task list the test last set.
#[derive(Default)]
pub struct MockSnapshotSource {
    tasks: Mutex<Vec<Task>>,
    failing: AtomicBool,
    calls: AtomicUsize,
    queries: Mutex<Vec<SnapshotQuery>>,
}

#[allow(dead_code)]
impl MockSnapshotSource {
    pub fn new(tasks: Vec<Task>) -> Arc<Self> {
        Arc::new(Self {
            tasks: Mutex::new(tasks),
            ..Self::default()
        })
    }

    pub fn set_tasks(&self, tasks: Vec<Task>) {
        *self.tasks.lock().unwrap() = tasks;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<SnapshotQuery> {
        self.queries.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl SnapshotSource for MockSnapshotSource {
    async fn fetch(&self, query: &SnapshotQuery) -> SyncResult<Vec<Task>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());

        if self.failing.load(Ordering::SeqCst) {
            return Err(SyncError::Status {
                url: "mock://snapshot".to_string(),
                status: 503,
            });
        }
        Ok(self.tasks.lock().unwrap().clone())
    }
}

/// Push transport relaying frames the test pushes to every open connection.
///
/// Frames pushed while no connection is open are lost, like on a real
/// channel; wait for an `open` status before pushing.
pub struct MockPushTransport {
    frames: broadcast::Sender<String>,
    connects: AtomicUsize,
}

#[allow(dead_code)]
impl MockPushTransport {
    pub fn new() -> Arc<Self> {
        let (frames, _) = broadcast::channel(64);
        Arc::new(Self {
            frames,
            connects: AtomicUsize::new(0),
        })
    }

    /// Deliver a raw text frame. Returns the number of open connections.
    pub fn push(&self, frame: impl Into<String>) -> usize {
        self.frames.send(frame.into()).unwrap_or(0)
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PushTransport for MockPushTransport {
    async fn connect(&self, _process_instance_id: &str) -> SyncResult<FrameStream> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let mut rx = self.frames.subscribe();

        let frames = async_stream::stream! {
            loop {
                match rx.recv().await {
                    Ok(frame) => yield Ok::<String, SyncError>(frame),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        };
        Ok(Box::pin(frames))
    }
}
