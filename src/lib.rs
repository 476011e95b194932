//! gesture-pilot: real-time hand-gesture recognition and control signals
//!
//! Turns a per-frame stream of 21 hand landmarks into:
//! - A stable discrete gesture (zoom in/out, up/down/left/right)
//! - A lightly filtered pitch/yaw/roll estimate while a fist is held
//! - At most one clamped rotation command per frame
//!
//! The core never touches rendering or I/O. The daemon binary wires it
//! to a Unix socket so landmark producers and controllers can attach.

pub mod config;
pub mod events;
pub mod features;
pub mod gesture;
pub mod ipc;
pub mod landmarks;
pub mod lifecycle;
pub mod orientation;
pub mod pipeline;
pub mod rotation;
pub mod smoothing;
