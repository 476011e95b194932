//! Priority-ordered gesture classifier

use serde::{Deserialize, Serialize};

use crate::config::{ensure_non_negative, ConfigError};
use crate::features::HandFeatures;
use crate::landmarks::index::{INDEX_TIP, WRIST};
use crate::landmarks::HandPose;

/// The closed set of recognised gestures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    /// Thumb tip pinched against the index tip
    ZoomIn,
    /// Open hand, all four fingers extended
    ZoomOut,
    Up,
    Down,
    Left,
    Right,
    /// Nothing recognised. A valid value, not an error.
    #[default]
    Unknown,
}

impl Gesture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gesture::ZoomIn => "zoom_in",
            Gesture::ZoomOut => "zoom_out",
            Gesture::Up => "up",
            Gesture::Down => "down",
            Gesture::Left => "left",
            Gesture::Right => "right",
            Gesture::Unknown => "unknown",
        }
    }

    pub fn is_zoom(&self) -> bool {
        matches!(self, Gesture::ZoomIn | Gesture::ZoomOut)
    }

    pub fn is_directional(&self) -> bool {
        matches!(
            self,
            Gesture::Up | Gesture::Down | Gesture::Left | Gesture::Right
        )
    }

    pub fn is_known(&self) -> bool {
        *self != Gesture::Unknown
    }
}

impl std::fmt::Display for Gesture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Thumb-to-index distance (normalized image units) below which the
    /// hand is pinching
    pub pinch_threshold: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            pinch_threshold: 0.05,
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_negative("classifier.pinch_threshold", self.pinch_threshold)
    }
}

/// Map a pointing angle in degrees (0 = right, 90 = up) to a direction.
///
/// The four ranges partition the circle: both ±45° and ±135° belong to
/// the vertical directions.
pub fn direction_from_angle(degrees: f64) -> Gesture {
    if (45.0..=135.0).contains(&degrees) {
        Gesture::Up
    } else if (-135.0..=-45.0).contains(&degrees) {
        Gesture::Down
    } else if degrees > -45.0 && degrees < 45.0 {
        Gesture::Right
    } else {
        Gesture::Left
    }
}

#[derive(Debug, Clone)]
pub struct GestureClassifier {
    config: ClassifierConfig,
}

impl GestureClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Classify one frame. First matching rule wins:
    /// open hand, pinch, lone index finger, otherwise unknown.
    pub fn classify(&self, pose: &HandPose, features: &HandFeatures) -> Gesture {
        if features.fingers.all_extended() {
            Gesture::ZoomOut
        } else if features.pinch_distance < self.config.pinch_threshold {
            Gesture::ZoomIn
        } else if features.fingers.only_index() {
            direction_from_angle(pointing_angle(pose))
        } else {
            Gesture::Unknown
        }
    }
}

/// Angle of wrist→index-tip with image y flipped upward
fn pointing_angle(pose: &HandPose) -> f64 {
    let wrist = pose.at(WRIST);
    let tip = pose.at(INDEX_TIP);
    let dx = tip.x - wrist.x;
    let dy = wrist.y - tip.y;
    dy.atan2(dx).to_degrees()
}
