//! Hand orientation estimation
//!
//! Closed-form pitch/yaw/roll heuristics over the palm vectors produced
//! by the feature extractor. No iterative pose solving.

mod estimator;

pub use estimator::{
    angle_delta, normalize_angle, Axis, Orientation, OrientationConfig, OrientationEstimator,
};
