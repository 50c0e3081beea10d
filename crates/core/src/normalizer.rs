//! Structural classification of raw push payloads.
//!
//! The upstream feed does not reliably set a type discriminant, so payloads
//! are classified by which fields they carry. The checks form an ordered
//! chain; the first one that matches wins:
//!
//! 1. A non-empty `endActivityId` makes a [`ProcessEndEvent`], whatever its
//!    `state` (actionability is decided later by the completion detector).
//! 2. `processInstanceId`, `taskId`, `activityInstanceId` and
//!    `taskDefinitionKey` all present make a [`TaskLifecycleEvent`]. Partial
//!    matches are rejected so unrelated scope events are never mistaken for
//!    task transitions.
//! 3. Anything else is unclassified.
//!
//! Independently of the chain, an `activityName` field yields an
//! [`ActivitySignal`]: the name itself, or a clear signal when the payload is
//! an end event.
//!
//! Everything here is pure. Payloads that fail classification are simply
//! reported as empty; they are expected traffic, not errors.

use serde_json::{Map, Value};
use tw_protocol::event_models::{
    ActivitySignal, InboundEvent, NormalizedFrame, ProcessEndEvent, TaskLifecycleEvent,
};

const END_ACTIVITY_ID: &str = "endActivityId";
const ACTIVITY_NAME: &str = "activityName";

/// Fields that must all be present for a task lifecycle event.
const LIFECYCLE_FIELDS: [&str; 4] = [
    "processInstanceId",
    "taskId",
    "activityInstanceId",
    "taskDefinitionKey",
];

/// Normalize a decoded payload.
pub fn normalize(raw: &Value) -> NormalizedFrame {
    let Some(fields) = raw.as_object() else {
        return NormalizedFrame::default();
    };

    let is_end = is_end_payload(fields);

    NormalizedFrame {
        event: classify(fields, is_end),
        activity: activity_signal(fields, is_end),
    }
}

/// Decode a JSON text frame and normalize it.
///
/// Returns `None` when the text is not JSON or when the payload carries
/// neither an event nor an activity signal.
pub fn normalize_frame(text: &str) -> Option<NormalizedFrame> {
    let raw: Value = serde_json::from_str(text).ok()?;
    let frame = normalize(&raw);
    (!frame.is_empty()).then_some(frame)
}

fn classify(fields: &Map<String, Value>, is_end: bool) -> Option<InboundEvent> {
    if is_end {
        return decode::<ProcessEndEvent>(fields).map(InboundEvent::ProcessEnd);
    }

    if LIFECYCLE_FIELDS.iter().all(|key| has_field(fields, key)) {
        return decode::<TaskLifecycleEvent>(fields).map(InboundEvent::TaskLifecycle);
    }

    None
}

fn activity_signal(fields: &Map<String, Value>, is_end: bool) -> Option<ActivitySignal> {
    let name = fields
        .get(ACTIVITY_NAME)
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())?;

    if is_end {
        Some(ActivitySignal::Clear)
    } else {
        Some(ActivitySignal::Set(name.to_string()))
    }
}

fn is_end_payload(fields: &Map<String, Value>) -> bool {
    fields
        .get(END_ACTIVITY_ID)
        .and_then(Value::as_str)
        .is_some_and(|id| !id.is_empty())
}

fn has_field(fields: &Map<String, Value>, key: &str) -> bool {
    fields.get(key).is_some_and(|value| !value.is_null())
}

/// Shape-matched payloads whose field types are wrong are dropped.
fn decode<T: serde::de::DeserializeOwned>(fields: &Map<String, Value>) -> Option<T> {
    serde_json::from_value(Value::Object(fields.clone())).ok()
}
