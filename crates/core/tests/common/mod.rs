//! Common test utilities for the synchronization integration tests.
//!
//! This module provides shared functionality across the integration tests:
//! - Fixtures (tasks, raw push frames, configs)
//! - Mock snapshot source and push transport
//! - Waiting helpers and assertions on subscription state

pub mod assertions;
pub mod fixtures;
pub mod mock_sources;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use mock_sources::*;
