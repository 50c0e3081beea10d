//! Subscription notifications.
//!
//! A subscription publishes its full state through a watch channel; the
//! events defined here are change notifications sent alongside it, for
//! consumers that prefer a log of what happened (the CLI's `--json` mode
//! prints them one per line).
//!
//! Uses tagged enum serialization for TypeScript compatibility:
//! ```json
//! {
//!   "type": "connectionStatusChanged",
//!   "payload": { "status": "open" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::process_models::{ConnectionStatus, ProcessState};
use crate::task_models::Task;

/// Events sent from a subscription to its consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum SyncEvent {
    /// The task list changed; carries the full list, oldest first.
    TasksChanged { tasks: Vec<Task> },

    /// The current activity label changed.
    ActivityChanged { activity: Option<String> },

    /// The shared push channel changed connectivity.
    ConnectionStatusChanged { status: ConnectionStatus },

    /// The watched process instance ended. Sent at most once.
    #[serde(rename_all = "camelCase")]
    ProcessCompleted {
        process_instance_id: String,
        state: ProcessState,
    },
}
