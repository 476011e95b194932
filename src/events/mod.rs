//! Events module for control output
//!
//! Structured events emitted by the pipeline for downstream consumers
//! (camera or object controllers). Every event is idempotent: receiving
//! the same value twice has no further effect.

use serde::{Deserialize, Serialize};

use crate::gesture::Gesture;
use crate::orientation::{Axis, Orientation};

/// Events emitted by the gesture pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlEvent {
    /// The smoothed gesture changed
    GestureChanged { gesture: Gesture },

    /// The smoothed orientation changed. All three angles are present or
    /// all three are absent.
    OrientationChanged {
        pitch: Option<f64>,
        yaw: Option<f64>,
        roll: Option<f64>,
    },

    /// The fist opened or closed
    FistChanged { closed: bool },

    /// Rotate about one axis for this frame
    Rotate {
        axis: Axis,
        /// Signed rotation in degrees, already clamped
        delta_deg: f64,
    },
}

impl ControlEvent {
    pub fn orientation(orientation: Option<Orientation>) -> Self {
        ControlEvent::OrientationChanged {
            pitch: orientation.map(|o| o.pitch),
            yaw: orientation.map(|o| o.yaw),
            roll: orientation.map(|o| o.roll),
        }
    }
}

impl std::fmt::Display for ControlEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlEvent::GestureChanged { gesture } => {
                write!(f, "GESTURE_CHANGED ({})", gesture)
            }
            ControlEvent::OrientationChanged {
                pitch: Some(pitch),
                yaw: Some(yaw),
                roll: Some(roll),
            } => write!(
                f,
                "ORIENTATION_CHANGED (pitch {:.1}, yaw {:.1}, roll {:.1})",
                pitch, yaw, roll
            ),
            ControlEvent::OrientationChanged { .. } => write!(f, "ORIENTATION_CHANGED (none)"),
            ControlEvent::FistChanged { closed } => {
                write!(f, "FIST_{}", if *closed { "CLOSED" } else { "OPENED" })
            }
            ControlEvent::Rotate { axis, delta_deg } => {
                write!(f, "ROTATE ({} {:+.1})", axis, delta_deg)
            }
        }
    }
}
