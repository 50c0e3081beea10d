//! # tw-protocol
//!
//! Data models shared by the taskwatch synchronization core and its
//! consumers.
//!
//! ## Modules
//!
//! - [`task_models`]: Tasks, snapshot queries, viewer identity, task views
//! - [`event_models`]: Normalized push events and activity signals
//! - [`process_models`]: Process instance states and push channel status
//! - [`config_models`]: Settings loaded from `taskwatch.toml`
//! - [`ipc`]: Notifications sent from a subscription to its consumer
//! - [`timestamp`]: Serde helpers accepting both timestamp encodings
//!
//! ## Design Principles
//!
//! - Minimal dependencies: only serde, chrono and ts-rs
//! - TypeScript generation: wire types derive `TS` for presentation clients
//! - Independent compilation: no dependencies on other taskwatch crates

pub mod config_models;
pub mod event_models;
pub mod ipc;
pub mod process_models;
pub mod task_models;
pub mod timestamp;

// Re-export all public types for convenience
pub use config_models::*;
pub use event_models::*;
pub use ipc::*;
pub use process_models::*;
pub use task_models::*;
