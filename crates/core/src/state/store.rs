//! Reconciliation store for one `(process instance, viewer)` subscription.
//!
//! Two update paths feed the same task list:
//!
//! - **Snapshots** only ever insert tasks the store has not seen. A known
//!   task is never overwritten by snapshot data, so a slow snapshot cannot
//!   regress a task that a push event already advanced.
//! - **Lifecycle events** are applied in four steps: assignee filter, create,
//!   delete, then update/complete. Delete and update act on the result of
//!   create, and delete runs before update so that a `deleted` reason always
//!   wins over an update carried by the same event.
//!
//! Both paths are idempotent and keep tasks ordered by creation time.
//! Nothing here suspends or locks: the store is owned by exactly one
//! subscription task.

use chrono::{DateTime, Utc};
use tw_protocol::event_models::{LifecycleEventType, TaskLifecycleEvent};
use tw_protocol::task_models::{Task, TaskState, TaskView, Viewer};

/// Result of applying a lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// The event is not assigned to this store's viewer and was discarded.
    Rejected,

    /// The event was accepted but left the task list as it was.
    Unchanged,

    /// The task list changed.
    Applied,
}

/// Deduplicated, creation-ordered task list plus the current activity label.
#[derive(Debug, Clone)]
pub struct TaskStore {
    viewer: Viewer,
    tasks: Vec<Task>,
    current_activity: Option<String>,
}

impl TaskStore {
    pub fn new(viewer: Viewer) -> Self {
        Self {
            viewer,
            tasks: Vec::new(),
            current_activity: None,
        }
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    /// Tasks ordered by `created`, oldest first.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn current_activity(&self) -> Option<&str> {
        self.current_activity.as_deref()
    }

    /// Copy of the consumer-visible state.
    pub fn view(&self) -> TaskView {
        TaskView {
            tasks: self.tasks.clone(),
            current_activity: self.current_activity.clone(),
        }
    }

    /// Insert every task of `batch` whose id is not yet known.
    ///
    /// Known tasks are left untouched, including when the batch carries
    /// different field values for them. Duplicate ids inside one batch keep
    /// their first occurrence.
    ///
    /// # Returns
    ///
    /// The number of inserted tasks.
    pub fn apply_snapshot<I>(&mut self, batch: I) -> usize
    where
        I: IntoIterator<Item = Task>,
    {
        let mut inserted = 0;
        for task in batch {
            if self.position(&task.id).is_none() {
                self.tasks.push(task);
                inserted += 1;
            }
        }

        if inserted > 0 {
            self.sort();
        }
        inserted
    }

    /// Apply a lifecycle event observed now.
    pub fn apply_event(&mut self, event: &TaskLifecycleEvent) -> EventOutcome {
        self.apply_event_at(event, Utc::now())
    }

    /// Apply a lifecycle event.
    ///
    /// `observed_at` becomes the creation time of a task created by an event
    /// that does not carry one.
    pub fn apply_event_at(
        &mut self,
        event: &TaskLifecycleEvent,
        observed_at: DateTime<Utc>,
    ) -> EventOutcome {
        if !self.viewer.matches(event.assignee.as_deref()) {
            return EventOutcome::Rejected;
        }

        let mut changed = false;

        if event.event_type == LifecycleEventType::Create && self.position(&event.task_id).is_none()
        {
            self.tasks
                .push(event.to_task(TaskState::Active, None, observed_at));
            changed = true;
        }

        if event.is_deletion() {
            let before = self.tasks.len();
            self.tasks.retain(|task| task.id != event.task_id);
            changed |= self.tasks.len() != before;
        }

        let next_state = match event.event_type {
            LifecycleEventType::Update => Some(TaskState::Active),
            LifecycleEventType::Complete => Some(TaskState::Completed),
            _ => None,
        };
        if let (Some(state), Some(index)) = (next_state, self.position(&event.task_id)) {
            let replacement = event.to_task(state, Some(&self.tasks[index]), observed_at);
            if replacement != self.tasks[index] {
                self.tasks[index] = replacement;
                changed = true;
            }
        }

        if changed {
            self.sort();
            EventOutcome::Applied
        } else {
            EventOutcome::Unchanged
        }
    }

    /// Record the latest in-flight activity. Returns whether the label changed.
    pub fn set_current_activity(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.current_activity.as_deref() == Some(name.as_str()) {
            return false;
        }
        self.current_activity = Some(name);
        true
    }

    /// Forget the current activity. Returns whether there was one.
    pub fn clear_current_activity(&mut self) -> bool {
        self.current_activity.take().is_some()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    // Stable, so equal timestamps keep arrival order.
    fn sort(&mut self) {
        self.tasks.sort_by_key(|task| task.created);
    }
}
