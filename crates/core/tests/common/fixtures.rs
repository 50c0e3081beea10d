//! Test fixtures: tasks, raw push frames and configurations.

use serde_json::json;
use tw_protocol::config_models::SyncConfig;
use tw_protocol::task_models::Task;

pub const INSTANCE: &str = "p1";
pub const VIEWER: &str = "0xabc";

/// An active snapshot task of [`INSTANCE`].
#[allow(dead_code)]
pub fn task(id: &str, created_ms: i64, assignee: &str) -> Task {
    serde_json::from_value(json!({
        "id": id,
        "name": format!("Task {id}"),
        "assignee": assignee,
        "created": created_ms,
        "processInstanceId": INSTANCE,
        "taskDefinitionKey": "review",
        "state": "ACTIVE"
    }))
    .unwrap()
}

/// A task lifecycle frame as the push channel delivers it.
#[allow(dead_code)]
pub fn lifecycle_frame(event_type: &str, task_id: &str, assignee: &str, created_ms: i64) -> String {
    json!({
        "processInstanceId": INSTANCE,
        "taskId": task_id,
        "activityInstanceId": format!("act-{task_id}"),
        "taskDefinitionKey": "review",
        "eventType": event_type,
        "assignee": assignee,
        "name": format!("Task {task_id}"),
        "created": created_ms
    })
    .to_string()
}

/// A lifecycle frame carrying `deleteReason: "deleted"`.
#[allow(dead_code)]
pub fn deleted_frame(event_type: &str, task_id: &str, assignee: &str) -> String {
    json!({
        "processInstanceId": INSTANCE,
        "taskId": task_id,
        "activityInstanceId": format!("act-{task_id}"),
        "taskDefinitionKey": "review",
        "eventType": event_type,
        "assignee": assignee,
        "deleteReason": "deleted"
    })
    .to_string()
}

/// A process end frame without an activity name.
#[allow(dead_code)]
pub fn end_frame(process_instance_id: &str, state: &str) -> String {
    json!({
        "processInstanceId": process_instance_id,
        "endActivityId": "end",
        "state": state
    })
    .to_string()
}

/// A process end frame that also names the end activity.
#[allow(dead_code)]
pub fn named_end_frame(process_instance_id: &str, state: &str, activity: &str) -> String {
    json!({
        "processInstanceId": process_instance_id,
        "endActivityId": "end",
        "activityName": activity,
        "state": state
    })
    .to_string()
}

/// A frame that only reports the activity in flight.
#[allow(dead_code)]
pub fn activity_frame(name: &str) -> String {
    json!({ "activityName": name }).to_string()
}

/// Engine settings with the default schedules.
#[allow(dead_code)]
pub fn test_config() -> SyncConfig {
    SyncConfig::default()
}
