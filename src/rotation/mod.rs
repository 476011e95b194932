//! Rotation-axis disambiguation
//!
//! While a fist is held, picks at most one axis per frame that clearly
//! dominates the others and emits a clamped rotation delta for it.

mod disambiguator;

pub use disambiguator::{
    AxisDeltas, AxisDisambiguator, AxisLock, AxisThresholds, DominanceMargins, RotationCommand,
    RotationConfig,
};
