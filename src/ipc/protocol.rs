//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian length.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::events::ControlEvent;
use crate::gesture::Gesture;
use crate::landmarks::{HandPose, Landmark};
use crate::pipeline::Frame;

/// One frame of detector output as sent by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameInput {
    /// Capture time in milliseconds
    pub timestamp_ms: f64,

    /// 21 landmarks, or null when no hand was detected
    #[serde(default)]
    pub landmarks: Option<Vec<Landmark>>,
}

impl FrameInput {
    /// Convert to a pipeline frame. A malformed pose is logged and treated
    /// as "no hand" for this frame.
    pub fn into_frame(self) -> Frame {
        let pose = self.landmarks.and_then(|points| match HandPose::new(points) {
            Ok(pose) => Some(pose),
            Err(e) => {
                warn!(%e, timestamp_ms = self.timestamp_ms, "rejected hand pose");
                None
            }
        });

        Frame::new(self.timestamp_ms, pose)
    }
}

/// Requests from clients to daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Request current daemon status
    GetStatus,

    /// Feed one frame of landmarks into the pipeline
    SubmitFrame { frame: FrameInput },

    /// Ping to check connectivity
    Ping,

    /// Subscribe to control event notifications
    Subscribe,
}

/// Responses from daemon to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Current daemon status
    Status(DaemonStatus),

    /// Frame queued for processing
    FrameAccepted,

    /// Pong response to ping
    Pong,

    /// Subscription confirmed
    Subscribed,

    /// Error response
    Error { code: String, message: String },
}

impl Response {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Response::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Push notification from daemon to subscribed clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// The pipeline emitted a control event
    ControlEvent { event: ControlEvent },
}

/// Anything the server writes to a client
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Outbound {
    Response(Response),
    Notification(Notification),
}

/// Full daemon status snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonStatus {
    /// Daemon version
    pub version: String,

    /// Last smoothed gesture
    pub gesture: Gesture,

    /// Whether a fist is currently held
    pub fist_closed: bool,

    /// Frames received from clients
    pub frames_received: u64,

    /// Uptime in seconds
    pub uptime_secs: u64,
}

impl Default for DaemonStatus {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            gesture: Gesture::Unknown,
            fist_closed: false,
            frames_received: 0,
            uptime_secs: 0,
        }
    }
}
