//! Waiting helpers and assertions on subscription state.
//!
//! Every wait is bounded by a virtual-time timeout so a broken expectation
//! fails the test instead of hanging it.

use std::time::Duration;
use tw_core::Subscription;
use tw_protocol::ipc::SyncEvent;
use tw_protocol::process_models::ConnectionStatus;
use tw_protocol::task_models::{Task, TaskState, TaskView};

const WAIT_LIMIT: Duration = Duration::from_secs(120);

/// Wait until the subscription's view satisfies `predicate`.
#[allow(dead_code)]
pub async fn wait_for_view<F>(subscription: &mut Subscription, predicate: F) -> TaskView
where
    F: Fn(&TaskView) -> bool,
{
    let wait = async {
        loop {
            let view = subscription.view();
            if predicate(&view) {
                return view;
            }
            assert!(subscription.changed().await, "subscription stopped");
        }
    };
    tokio::time::timeout(WAIT_LIMIT, wait)
        .await
        .expect("view never reached the expected state")
}

/// Consume notifications until the push channel reports `open`.
///
/// Returns the notifications consumed along the way, the `open` one last.
#[allow(dead_code)]
pub async fn wait_until_open(subscription: &mut Subscription) -> Vec<SyncEvent> {
    let wait = async {
        let mut seen = Vec::new();
        while let Some(event) = subscription.next_event().await {
            let open = matches!(
                event,
                SyncEvent::ConnectionStatusChanged {
                    status: ConnectionStatus::Open
                }
            );
            seen.push(event);
            if open {
                return seen;
            }
        }
        panic!("subscription stopped before the channel opened");
    };
    tokio::time::timeout(WAIT_LIMIT, wait)
        .await
        .expect("push channel never opened")
}

#[allow(dead_code)]
pub fn task_ids(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|task| task.id.as_str()).collect()
}

#[allow(dead_code)]
pub fn state_of(view: &TaskView, id: &str) -> Option<TaskState> {
    view.tasks.iter().find(|task| task.id == id).map(|task| task.state)
}

/// Assert that tasks are ordered by creation time, oldest first.
#[allow(dead_code)]
pub fn assert_creation_order(tasks: &[Task]) {
    for pair in tasks.windows(2) {
        assert!(
            pair[0].created <= pair[1].created,
            "{} (created {}) sorted before {} (created {})",
            pair[0].id,
            pair[0].created,
            pair[1].id,
            pair[1].created
        );
    }
}
