//! Subscription state.
//!
//! This module provides:
//! - The reconciliation store merging snapshots and push events
//! - The completion detector for the watched process instance

pub mod detector;
pub mod store;

pub use detector::{CompletionCallback, CompletionDetector, Detection, DetectorState};
pub use store::{EventOutcome, TaskStore};
