//! The command link: one persistent WebSocket connection to the robot's
//! controller.
//!
//! [`CommandLink::spawn`] starts a background tokio task that owns the
//! socket and its whole lifecycle: connect, token handshake, telemetry
//! polling, request/reply correlation, and fixed-backoff reconnection.
//! Everything else in the stack holds a cheap clonable [`LinkHandle`] and
//! only ever sends commands or reads the last-published state.

mod config;
mod link;

pub use config::LinkConfig;
pub use link::{CommandLink, LinkError, LinkHandle};
