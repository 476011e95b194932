//! Temporal smoothing of gesture and orientation
//!
//! Turns the noisy per-frame classification into output stable enough
//! to drive continuous control:
//! - Zoom gestures clear the moment they stop being seen
//! - Directional gestures survive short dropouts within a grace window
//! - Orientation runs through a light per-axis exponential filter

mod smoother;

pub use smoother::{SmoothedFrame, SmoothedState, SmoothingConfig, TemporalSmoother};
