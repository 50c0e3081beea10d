//! Terminal rendering of subscription notifications.

use colored::Colorize;
use tw_protocol::event_models::ProcessEndEvent;
use tw_protocol::ipc::SyncEvent;
use tw_protocol::process_models::ConnectionStatus;
use tw_protocol::task_models::{Task, TaskState, Viewer};

pub struct Printer {
    json: bool,
    viewer: Viewer,
}

impl Printer {
    pub fn new(json: bool, viewer: Viewer) -> Self {
        Self { json, viewer }
    }

    pub fn event(&self, event: &SyncEvent) -> serde_json::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string(event)?);
        } else if let Some(text) = self.render(event) {
            println!("{text}");
        }
        Ok(())
    }

    /// In JSON mode the `processCompleted` notification already reported it.
    pub fn completed(&self, end: &ProcessEndEvent) {
        if !self.json {
            println!("{}", render_completion(end));
        }
    }

    fn render(&self, event: &SyncEvent) -> Option<String> {
        match event {
            SyncEvent::TasksChanged { tasks } => Some(render_tasks(&self.viewer, tasks)),
            SyncEvent::ActivityChanged { activity } => Some(render_activity(activity.as_deref())),
            SyncEvent::ConnectionStatusChanged { status } => Some(render_status(*status)),
            SyncEvent::ProcessCompleted { .. } => None,
        }
    }
}

fn render_tasks(viewer: &Viewer, tasks: &[Task]) -> String {
    let mut out = format!("{} ({viewer})", "Tasks".bold());
    if tasks.is_empty() {
        out.push_str(&format!("\n  {}", "none".dimmed()));
    }
    for task in tasks {
        out.push('\n');
        out.push_str(&render_task(task));
    }
    out
}

fn render_task(task: &Task) -> String {
    let state = match task.state {
        TaskState::Active => "ACTIVE".green(),
        TaskState::Completed => "COMPLETED".dimmed(),
    };
    let name = if task.name.is_empty() {
        task.task_definition_key.as_str()
    } else {
        task.name.as_str()
    };

    let mut line = format!("  [{state}] {name} {}", format!("({})", task.id).dimmed());
    if let Some(due) = task.due {
        line.push_str(&format!(" due {}", due.format("%Y-%m-%d %H:%M")));
    }
    line
}

fn render_activity(activity: Option<&str>) -> String {
    match activity {
        Some(name) => format!("{} {name}", "Current activity:".cyan()),
        None => "No activity in flight".cyan().to_string(),
    }
}

fn render_status(status: ConnectionStatus) -> String {
    let label = match status {
        ConnectionStatus::Open => status.to_string().green(),
        ConnectionStatus::Closed | ConnectionStatus::Closing => status.to_string().red(),
        ConnectionStatus::Uninitialized | ConnectionStatus::Connecting => {
            status.to_string().yellow()
        }
    };
    format!("push channel {label}")
}

fn render_completion(end: &ProcessEndEvent) -> String {
    format!(
        "{} {} ({:?})",
        "Process instance ended:".green().bold(),
        end.process_instance_id,
        end.state
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tw_protocol::process_models::ProcessState;

    fn task(json: serde_json::Value) -> Task {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_task_line_prefers_name() {
        colored::control::set_override(false);
        let line = render_task(&task(serde_json::json!({
            "id": "t1",
            "name": "Approve invoice",
            "taskDefinitionKey": "approve",
            "created": 0
        })));
        assert_eq!(line, "  [ACTIVE] Approve invoice (t1)");
    }

    #[test]
    fn test_task_line_falls_back_to_definition_key() {
        colored::control::set_override(false);
        let line = render_task(&task(serde_json::json!({
            "id": "t1",
            "taskDefinitionKey": "approve",
            "created": 0,
            "due": "2024-05-01T12:30:00Z",
            "state": "COMPLETED"
        })));
        assert_eq!(line, "  [COMPLETED] approve (t1) due 2024-05-01 12:30");
    }

    #[test]
    fn test_empty_task_list() {
        colored::control::set_override(false);
        let text = render_tasks(&Viewer::new("0xabc"), &[]);
        assert_eq!(text, "Tasks (0xabc)\n  none");
    }

    #[test]
    fn test_activity_and_status_lines() {
        colored::control::set_override(false);
        assert_eq!(render_activity(Some("Review")), "Current activity: Review");
        assert_eq!(render_activity(None), "No activity in flight");
        assert_eq!(render_status(ConnectionStatus::Open), "push channel open");
    }

    #[test]
    fn test_completion_line() {
        colored::control::set_override(false);
        let end = ProcessEndEvent {
            process_instance_id: "p1".to_string(),
            end_activity_id: "end".to_string(),
            state: ProcessState::Completed,
        };
        assert_eq!(
            render_completion(&end),
            "Process instance ended: p1 (Completed)"
        );
    }

    #[test]
    fn test_completion_is_not_rendered_twice() {
        let printer = Printer::new(false, Viewer::new("0xabc"));
        let event = SyncEvent::ProcessCompleted {
            process_instance_id: "p1".to_string(),
            state: ProcessState::Completed,
        };
        assert!(printer.render(&event).is_none());
    }
}
