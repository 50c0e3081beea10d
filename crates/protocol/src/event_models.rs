//! Normalized push-event models.
//!
//! The push feed carries no reliable type discriminant, so frames are
//! classified structurally before they reach any of the types below. These
//! types describe the result of that classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::process_models::ProcessState;
use crate::task_models::{Task, TaskState};

/// Kind of task transition carried by a lifecycle event.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleEventType {
    Create,
    Update,
    Complete,
    Delete,

    /// Missing or unrecognized event type.
    #[default]
    #[serde(other)]
    Unknown,
}

/// Marker value of `deleteReason` for a task that was removed.
pub const DELETE_REASON_DELETED: &str = "deleted";

/// A create/update/complete/delete transition for exactly one task.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct TaskLifecycleEvent {
    pub process_instance_id: String,
    pub task_id: String,
    pub activity_instance_id: String,
    pub task_definition_key: String,

    #[serde(default)]
    pub event_type: LifecycleEventType,

    #[serde(default)]
    pub delete_reason: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub assignee: Option<String>,

    #[serde(default, with = "crate::timestamp::option")]
    #[ts(type = "string | null")]
    pub created: Option<DateTime<Utc>>,

    #[serde(default, with = "crate::timestamp::option")]
    #[ts(type = "string | null")]
    pub due: Option<DateTime<Utc>>,

    #[serde(default)]
    pub execution_id: Option<String>,

    #[serde(default)]
    pub process_definition_id: Option<String>,

    #[serde(default)]
    pub priority: Option<i64>,
}

impl TaskLifecycleEvent {
    /// Whether this event removes its task.
    pub fn is_deletion(&self) -> bool {
        self.delete_reason.as_deref() == Some(DELETE_REASON_DELETED)
    }

    /// Build the task this event describes.
    ///
    /// Fields the event leaves out are taken from `previous` (the currently
    /// known version of the same task) when there is one; otherwise they get
    /// empty defaults and the creation time falls back to `observed_at`.
    pub fn to_task(
        &self,
        state: TaskState,
        previous: Option<&Task>,
        observed_at: DateTime<Utc>,
    ) -> Task {
        Task {
            id: self.task_id.clone(),
            name: self
                .name
                .clone()
                .or_else(|| previous.map(|t| t.name.clone()))
                .unwrap_or_default(),
            description: self
                .description
                .clone()
                .or_else(|| previous.and_then(|t| t.description.clone())),
            assignee: self.assignee.clone(),
            created: self
                .created
                .or_else(|| previous.map(|t| t.created))
                .unwrap_or(observed_at),
            due: self.due.or_else(|| previous.and_then(|t| t.due)),
            execution_id: self
                .execution_id
                .clone()
                .or_else(|| previous.map(|t| t.execution_id.clone()))
                .unwrap_or_default(),
            process_definition_id: self
                .process_definition_id
                .clone()
                .or_else(|| previous.map(|t| t.process_definition_id.clone()))
                .unwrap_or_default(),
            process_instance_id: self.process_instance_id.clone(),
            task_definition_key: self.task_definition_key.clone(),
            priority: self
                .priority
                .or_else(|| previous.map(|t| t.priority))
                .unwrap_or_default(),
            state,
        }
    }
}

/// The watched process instance reached an end activity.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct ProcessEndEvent {
    #[serde(default)]
    pub process_instance_id: String,

    pub end_activity_id: String,

    #[serde(default)]
    pub state: ProcessState,
}

impl ProcessEndEvent {
    /// Whether this event can complete a watch on `process_instance_id`.
    pub fn is_actionable_for(&self, process_instance_id: &str) -> bool {
        self.state.is_terminal() && self.process_instance_id == process_instance_id
    }
}

/// A classified push event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    TaskLifecycle(TaskLifecycleEvent),
    ProcessEnd(ProcessEndEvent),
}

/// Best-effort "current activity" signal carried alongside a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivitySignal {
    /// An in-flight activity with this name was reported.
    Set(String),

    /// The frame was an end event; the current activity is over.
    Clear,
}

/// Everything a single push frame contributes after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedFrame {
    pub event: Option<InboundEvent>,
    pub activity: Option<ActivitySignal>,
}

impl NormalizedFrame {
    /// A frame with neither an event nor an activity signal carries nothing.
    pub fn is_empty(&self) -> bool {
        self.event.is_none() && self.activity.is_none()
    }
}
