//! Exactly-once detection of a watched process instance reaching its end.
//!
//! The detector is a two-state machine, `Watching -> Fired`. Fired is
//! terminal: push delivery is at-least-once, so the same end event may
//! arrive several times, and only the first one invokes the callback.

use std::fmt;
use tw_protocol::event_models::ProcessEndEvent;

/// Callback invoked when the watched instance ends.
pub type CompletionCallback = Box<dyn FnOnce(&ProcessEndEvent) + Send + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    Watching,
    Fired,
}

/// What the detector did with an end event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// First terminal end event for the watched instance; the callback ran.
    Fired,

    /// Terminal end event for the watched instance after the callback ran.
    Duplicate,

    /// The event belongs to another process instance.
    OtherInstance,

    /// The event's state is not terminal.
    NonTerminal,
}

impl Detection {
    /// Whether the event ended the watched instance (now or earlier).
    pub fn is_end_of_watched_instance(self) -> bool {
        matches!(self, Detection::Fired | Detection::Duplicate)
    }
}

pub struct CompletionDetector {
    process_instance_id: String,
    state: DetectorState,
    on_complete: Option<CompletionCallback>,
}

impl CompletionDetector {
    /// Watch `process_instance_id`, calling `on_complete` at most once.
    pub fn new<F>(process_instance_id: impl Into<String>, on_complete: F) -> Self
    where
        F: FnOnce(&ProcessEndEvent) + Send + 'static,
    {
        Self {
            process_instance_id: process_instance_id.into(),
            state: DetectorState::Watching,
            on_complete: Some(Box::new(on_complete)),
        }
    }

    pub fn process_instance_id(&self) -> &str {
        &self.process_instance_id
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    /// Feed an end event to the state machine.
    ///
    /// Events for other instances and events with a non-terminal state are
    /// discarded without any transition.
    pub fn observe(&mut self, event: &ProcessEndEvent) -> Detection {
        if event.process_instance_id != self.process_instance_id {
            return Detection::OtherInstance;
        }
        if !event.state.is_terminal() {
            return Detection::NonTerminal;
        }
        if self.state == DetectorState::Fired {
            return Detection::Duplicate;
        }

        self.state = DetectorState::Fired;
        if let Some(callback) = self.on_complete.take() {
            callback(event);
        }
        Detection::Fired
    }
}

impl fmt::Debug for CompletionDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionDetector")
            .field("process_instance_id", &self.process_instance_id)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
