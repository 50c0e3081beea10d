//! One viewer's live view of one process instance.
//!
//! A subscription is an actor: a spawned task that exclusively owns the
//! [`TaskStore`] and the [`CompletionDetector`], and reacts to three inputs:
//!
//! - the poll timer (first poll immediately, then the adaptive schedule)
//! - normalized frames from the shared push channel
//! - connectivity changes of that channel
//!
//! State leaves the actor through a `watch` channel carrying the full
//! [`TaskView`] and an `mpsc` channel of [`SyncEvent`] notifications. Both
//! are published only when something actually changed.

use crate::channel::ChannelLease;
use crate::snapshot::{PollSchedule, SnapshotPoller, SnapshotSource};
use crate::state::{CompletionDetector, Detection, EventOutcome, TaskStore};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};
use tw_protocol::event_models::{
    ActivitySignal, InboundEvent, NormalizedFrame, ProcessEndEvent, TaskLifecycleEvent,
};
use tw_protocol::ipc::SyncEvent;
use tw_protocol::process_models::ConnectionStatus;
use tw_protocol::task_models::{SnapshotQuery, Task, TaskView, Viewer};
use uuid::Uuid;

pub(crate) struct SubscriptionParams {
    pub process_instance_id: String,
    pub viewer: Viewer,
    pub source: Arc<dyn SnapshotSource>,
    pub schedule: PollSchedule,
    pub include_history: bool,
    pub event_buffer: usize,
}

/// Handle to a running subscription.
///
/// Dropping the handle (or calling [`Subscription::unsubscribe`]) stops the
/// poll timer, discards the task store and releases the shared push channel.
pub struct Subscription {
    id: Uuid,
    process_instance_id: String,
    viewer: Viewer,
    view_rx: watch::Receiver<TaskView>,
    events_rx: mpsc::Receiver<SyncEvent>,
    worker: JoinHandle<()>,
    _lease: ChannelLease,
}

pub(crate) fn start<F>(
    params: SubscriptionParams,
    lease: ChannelLease,
    on_complete: F,
) -> Subscription
where
    F: FnOnce(&ProcessEndEvent) + Send + 'static,
{
    let SubscriptionParams {
        process_instance_id,
        viewer,
        source,
        schedule,
        include_history,
        event_buffer,
    } = params;

    let id = Uuid::new_v4();
    let (view_tx, view_rx) = watch::channel(TaskView::default());
    let (events_tx, events_rx) = mpsc::channel(event_buffer);

    let query = SnapshotQuery::for_viewer(&process_instance_id, &viewer, include_history);
    let worker = Worker {
        id,
        store: TaskStore::new(viewer.clone()),
        detector: CompletionDetector::new(process_instance_id.clone(), on_complete),
        poller: SnapshotPoller::new(source, query, schedule),
        frames: lease.channel().subscribe(),
        status: lease.channel().status(),
        view_tx,
        events_tx,
    };

    info!(
        subscription_id = %id,
        %process_instance_id,
        %viewer,
        "subscription started"
    );

    Subscription {
        id,
        process_instance_id,
        viewer,
        view_rx,
        events_rx,
        worker: tokio::spawn(worker.run()),
        _lease: lease,
    }
}

impl Subscription {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn process_instance_id(&self) -> &str {
        &self.process_instance_id
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    /// Current task list, oldest first.
    pub fn tasks(&self) -> Vec<Task> {
        self.view_rx.borrow().tasks.clone()
    }

    pub fn current_activity(&self) -> Option<String> {
        self.view_rx.borrow().current_activity.clone()
    }

    /// Current tasks and activity, read together.
    pub fn view(&self) -> TaskView {
        self.view_rx.borrow().clone()
    }

    /// Wait until the view changes.
    ///
    /// Returns `false` once the subscription task has stopped.
    pub async fn changed(&mut self) -> bool {
        self.view_rx.changed().await.is_ok()
    }

    /// Next change notification, or `None` once the subscription task has
    /// stopped and every queued notification was taken.
    pub async fn next_event(&mut self) -> Option<SyncEvent> {
        self.events_rx.recv().await
    }

    /// Take a queued notification without waiting.
    ///
    /// Returns `None` when the queue is currently empty.
    pub fn try_next_event(&mut self) -> Option<SyncEvent> {
        self.events_rx.try_recv().ok()
    }

    /// Stop synchronizing.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.worker.abort();
        info!(
            subscription_id = %self.id,
            process_instance_id = %self.process_instance_id,
            "subscription stopped"
        );
    }
}

struct Worker {
    id: Uuid,
    store: TaskStore,
    detector: CompletionDetector,
    poller: SnapshotPoller,
    frames: broadcast::Receiver<NormalizedFrame>,
    status: watch::Receiver<ConnectionStatus>,
    view_tx: watch::Sender<TaskView>,
    events_tx: mpsc::Sender<SyncEvent>,
}

impl Worker {
    async fn run(mut self) {
        let status = *self.status.borrow_and_update();
        self.notify(SyncEvent::ConnectionStatusChanged { status });

        let mut next_poll = Instant::now();
        let mut frames_open = true;
        let mut status_open = true;

        loop {
            tokio::select! {
                _ = tokio::time::sleep_until(next_poll) => {
                    if let Some(batch) = self.poller.poll().await {
                        self.on_snapshot(batch);
                    }
                    next_poll = Instant::now() + self.poller.next_delay();
                }
                frame = self.frames.recv(), if frames_open => match frame {
                    Ok(frame) => self.on_frame(frame),
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(subscription_id = %self.id, skipped, "lagged behind push channel");
                    }
                    Err(RecvError::Closed) => frames_open = false,
                },
                changed = self.status.changed(), if status_open => match changed {
                    Ok(()) => {
                        let status = *self.status.borrow_and_update();
                        self.notify(SyncEvent::ConnectionStatusChanged { status });
                    }
                    Err(_) => status_open = false,
                },
            }
        }
    }

    fn on_snapshot(&mut self, batch: Vec<Task>) {
        if self.store.apply_snapshot(batch) > 0 {
            self.publish_tasks();
        }
    }

    fn on_frame(&mut self, frame: NormalizedFrame) {
        let (tasks_changed, ended) = match &frame.event {
            Some(InboundEvent::TaskLifecycle(event)) => (self.on_lifecycle(event), false),
            Some(InboundEvent::ProcessEnd(event)) => (false, self.on_end(event)),
            None => (false, false),
        };

        // A terminal end for the watched instance clears the activity even
        // when the frame carries no activity name. Discarded end events
        // leave it alone.
        let activity_changed = if ended {
            self.store.clear_current_activity()
        } else {
            match frame.activity {
                Some(ActivitySignal::Set(name)) => self.store.set_current_activity(name),
                Some(ActivitySignal::Clear) | None => false,
            }
        };

        if tasks_changed {
            self.publish_tasks();
        }
        if activity_changed {
            self.view_tx.send_replace(self.store.view());
            self.notify(SyncEvent::ActivityChanged {
                activity: self.store.current_activity().map(str::to_string),
            });
        }
    }

    fn on_lifecycle(&mut self, event: &TaskLifecycleEvent) -> bool {
        match self.store.apply_event(event) {
            EventOutcome::Applied => true,
            EventOutcome::Unchanged => false,
            EventOutcome::Rejected => {
                debug!(
                    subscription_id = %self.id,
                    task_id = %event.task_id,
                    "ignoring event for another assignee"
                );
                false
            }
        }
    }

    /// Returns whether the event ended the watched instance.
    fn on_end(&mut self, event: &ProcessEndEvent) -> bool {
        let detection = self.detector.observe(event);
        match detection {
            Detection::Fired => {
                info!(
                    subscription_id = %self.id,
                    process_instance_id = %event.process_instance_id,
                    state = ?event.state,
                    "process instance completed"
                );
                self.notify(SyncEvent::ProcessCompleted {
                    process_instance_id: event.process_instance_id.clone(),
                    state: event.state,
                });
            }
            Detection::Duplicate => {
                debug!(subscription_id = %self.id, "duplicate end event ignored");
            }
            Detection::OtherInstance | Detection::NonTerminal => {
                debug!(
                    subscription_id = %self.id,
                    process_instance_id = %event.process_instance_id,
                    state = ?event.state,
                    "end event discarded"
                );
            }
        }
        detection.is_end_of_watched_instance()
    }

    fn publish_tasks(&mut self) {
        self.view_tx.send_replace(self.store.view());
        self.notify(SyncEvent::TasksChanged {
            tasks: self.store.tasks().to_vec(),
        });
    }

    // The watch view stays authoritative when a slow consumer lets the
    // notification queue fill up.
    fn notify(&self, event: SyncEvent) {
        if let Err(mpsc::error::TrySendError::Full(_)) = self.events_tx.try_send(event) {
            debug!(subscription_id = %self.id, "notification queue full; dropping event");
        }
    }
}
