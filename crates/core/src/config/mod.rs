//! Configuration loading.
//!
//! This module loads `taskwatch.toml` into a [`SyncConfig`] and validates
//! the values the synchronization engine relies on.
//!
//! [`SyncConfig`]: tw_protocol::config_models::SyncConfig

pub mod error;
pub mod loader;
