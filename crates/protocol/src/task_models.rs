//! Task models shared between the synchronization core and its consumers.
//!
//! A [`Task`] is a unit of work inside a process instance. Tasks reach a
//! consumer through two paths (authoritative snapshots and push events), and
//! both paths converge on the same representation defined here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Lifecycle state of a task as seen by the viewer.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    /// The task is open and can be worked on.
    #[default]
    Active,

    /// The task has been completed.
    Completed,
}

/// A unit of work assigned to a viewer within a process instance.
///
/// `id` is the stable identity of the task. Two records with the same `id`
/// always describe the same task, possibly at different points in time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Identity of the viewer the task is assigned to, if any.
    #[serde(default)]
    pub assignee: Option<String>,

    /// Creation time; the ordering key of a task list.
    ///
    /// Accepts RFC 3339 strings or epoch milliseconds on input.
    #[serde(with = "crate::timestamp")]
    #[ts(type = "string")]
    pub created: DateTime<Utc>,

    #[serde(
        default,
        with = "crate::timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    #[ts(type = "string | null")]
    pub due: Option<DateTime<Utc>>,

    #[serde(default)]
    pub execution_id: String,

    #[serde(default)]
    pub process_definition_id: String,

    #[serde(default)]
    pub process_instance_id: String,

    #[serde(default)]
    pub task_definition_key: String,

    #[serde(default)]
    pub priority: i64,

    #[serde(default)]
    pub state: TaskState,
}

/// Filter sent to the snapshot source.
///
/// Serialized as the request body of a snapshot call:
/// ```json
/// { "processInstanceId": "p1", "assignee": "0xabc", "includeHistory": false }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_instance_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,

    /// Include already completed tasks in the result.
    #[serde(default)]
    pub include_history: bool,
}

impl SnapshotQuery {
    /// Query for the tasks of one process instance assigned to one viewer.
    pub fn for_viewer(process_instance_id: &str, viewer: &Viewer, include_history: bool) -> Self {
        Self {
            process_instance_id: Some(process_instance_id.to_string()),
            assignee: Some(viewer.as_str().to_string()),
            include_history,
        }
    }
}

/// Identity of the consumer whose tasks are being synchronized.
///
/// Identities are compared ASCII case-insensitively, so hex-encoded account
/// addresses match regardless of checksum casing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, TS)]
#[serde(transparent)]
pub struct Viewer(String);

impl Viewer {
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a task or event assignee refers to this viewer.
    ///
    /// An absent assignee never matches.
    pub fn matches(&self, assignee: Option<&str>) -> bool {
        assignee.is_some_and(|a| a.eq_ignore_ascii_case(&self.0))
    }
}

impl std::fmt::Display for Viewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The consumer-facing state of one subscription.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    /// Tasks ordered by creation time, oldest first.
    pub tasks: Vec<Task>,

    /// Name of the most recent in-flight activity, if any.
    pub current_activity: Option<String>,
}
