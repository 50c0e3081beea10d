//! # tw-core
//!
//! Task list synchronization for workflow process instances.
//!
//! This crate provides:
//! - Configuration loading from `taskwatch.toml`
//! - Structural classification of raw push payloads
//! - Adaptive snapshot polling over HTTP
//! - Shared, self-reconnecting push channels with reference counting
//! - A reconciliation store merging snapshots and push events
//! - Exactly-once completion detection per subscription
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and validation
//! - [`error`]: Transport error types
//! - [`normalizer`]: Raw payload classification
//! - [`snapshot`]: Snapshot source trait, HTTP source and poller
//! - [`channel`]: Push transport, channel supervisor and registry
//! - [`state`]: Task store and completion detector
//! - [`engine`]: Synchronizer and subscriptions

pub mod channel;
pub mod config;
pub mod engine;
pub mod error;
pub mod normalizer;
pub mod snapshot;
pub mod state;

pub use engine::{Subscription, Synchronizer};
pub use error::{SyncError, SyncResult};
