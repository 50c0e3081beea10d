//! Shared push channels.
//!
//! One supervised connection per process instance, fanned out to every
//! subscription watching that instance.
//!
//! - [`transport`]: the `PushTransport` seam and its frame stream type
//! - [`websocket`]: websocket implementation of the transport
//! - [`supervisor`]: reconnect loop and broadcast fan-out for one channel
//! - [`registry`]: refcounted lookup so subscriptions share channels

pub mod registry;
pub mod supervisor;
pub mod transport;
pub mod websocket;

pub use registry::{ChannelLease, ChannelRegistry};
pub use supervisor::{ReconnectPolicy, SharedChannel};
pub use transport::{FrameStream, PushTransport};
pub use websocket::WebSocketTransport;
