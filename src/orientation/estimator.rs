//! Pitch, yaw and roll from palm geometry
//!
//! Image y grows downward; every angle here is measured with y flipped so
//! that "up" on screen is positive.

use serde::{Deserialize, Serialize};

use crate::config::{ensure_in_range, ensure_non_negative, ConfigError};
use crate::features::HandFeatures;

/// Rotation axes, in the order the disambiguator evaluates them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Pitch,
    Yaw,
    Roll,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Pitch, Axis::Yaw, Axis::Roll];

    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Pitch => "pitch",
            Axis::Yaw => "yaw",
            Axis::Roll => "roll",
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hand orientation in degrees, each component in (-180, 180].
///
/// Either all three angles are known or the orientation is absent
/// altogether, so callers carry `Option<Orientation>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl Orientation {
    pub fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }

    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Pitch => self.pitch,
            Axis::Yaw => self.yaw,
            Axis::Roll => self.roll,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.pitch.is_finite() && self.yaw.is_finite() && self.roll.is_finite()
    }
}

/// Wrap an angle into (-180, 180].
///
/// Computes `((angle + 180) mod 360) - 180` with a Euclidean modulus and
/// folds the lone -180 onto 180. In-range and non-finite input pass
/// through untouched.
pub fn normalize_angle(degrees: f64) -> f64 {
    if !degrees.is_finite() || (degrees > -180.0 && degrees <= 180.0) {
        return degrees;
    }
    let wrapped = (degrees + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Shortest signed rotation from `from` to `to`, in degrees
pub fn angle_delta(from: f64, to: f64) -> f64 {
    normalize_angle(to - from)
}

/// Orientation heuristics tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationConfig {
    /// Added to the raw index↔pinky angle before wrapping
    pub roll_offset_deg: f64,
    /// Multiplier applied to the raw pitch before wrapping
    pub pitch_gain: f64,
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            roll_offset_deg: 100.0,
            pitch_gain: 1.5,
        }
    }
}

impl OrientationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_in_range("orientation.roll_offset_deg", self.roll_offset_deg, -360.0, 360.0)?;
        ensure_non_negative("orientation.pitch_gain", self.pitch_gain)
    }
}

#[derive(Debug, Clone)]
pub struct OrientationEstimator {
    config: OrientationConfig,
}

impl OrientationEstimator {
    pub fn new(config: OrientationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Estimate all three angles. Callers only invoke this while the fist
    /// is closed.
    pub fn estimate(&self, features: &HandFeatures) -> Orientation {
        Orientation {
            pitch: self.pitch(features),
            yaw: self.yaw(features),
            roll: self.roll(features),
        }
    }

    /// Palm normal projected onto the horizontal (x/z) plane
    fn yaw(&self, features: &HandFeatures) -> f64 {
        let [nx, _, nz] = features.palm_normal;
        normalize_angle(nx.atan2(nz).to_degrees())
    }

    /// Elevation of wrist→middle-tip above the horizontal plane
    fn pitch(&self, features: &HandFeatures) -> f64 {
        let [fx, fy, fz] = features.forward;
        let elevation = (-fy).atan2(fx.hypot(fz)).to_degrees();
        normalize_angle(elevation * self.config.pitch_gain)
    }

    /// Index↔pinky direction within the image plane
    fn roll(&self, features: &HandFeatures) -> f64 {
        let [cx, cy, _] = features.cross;
        normalize_angle((-cy).atan2(cx).to_degrees() + self.config.roll_offset_deg)
    }
}
