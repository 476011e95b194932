//! IPC module for daemon-client communication
//!
//! Landmark producers submit frames over a Unix socket; controllers
//! subscribe to the resulting control events.

mod protocol;
mod server;

pub use protocol::{DaemonStatus, FrameInput, Notification, Outbound, Request, Response};
pub use server::Server;
