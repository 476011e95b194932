//! Finger state and palm geometry from raw landmarks

use serde::{Deserialize, Serialize};

use crate::config::{ensure_in_range, ensure_non_negative, ConfigError};
use crate::landmarks::index::{
    FINGER_JOINTS, INDEX_MCP, INDEX_TIP, MIDDLE_TIP, PINKY_MCP, THUMB_TIP, WRIST,
};
use crate::landmarks::vector::{
    cosine_similarity2, cross3, distance2, normalize3, sub2, sub3, Vec2, Vec3,
};
use crate::landmarks::HandPose;

/// Feature extraction thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// A finger counts as extended when the cosine between MCP→PIP and
    /// PIP→TIP exceeds this value.
    pub extension_cosine: f64,
    /// Added to vector-length denominators to keep degenerate poses finite.
    pub epsilon: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            extension_cosine: 0.7,
            epsilon: 1e-6,
        }
    }
}

impl FeatureConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_in_range("features.extension_cosine", self.extension_cosine, -1.0, 1.0)?;
        ensure_non_negative("features.epsilon", self.epsilon)
    }
}

/// Extended/folded flags for the four tracked fingers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerState {
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerState {
    /// Build from flags ordered index, middle, ring, pinky
    pub fn from_flags(flags: [bool; 4]) -> Self {
        Self {
            index: flags[0],
            middle: flags[1],
            ring: flags[2],
            pinky: flags[3],
        }
    }

    pub fn all_extended(&self) -> bool {
        self.index && self.middle && self.ring && self.pinky
    }

    pub fn none_extended(&self) -> bool {
        !self.index && !self.middle && !self.ring && !self.pinky
    }

    /// Index finger extended, the other three folded
    pub fn only_index(&self) -> bool {
        self.index && !self.middle && !self.ring && !self.pinky
    }

    pub fn extended_count(&self) -> usize {
        [self.index, self.middle, self.ring, self.pinky]
            .iter()
            .filter(|&&extended| extended)
            .count()
    }
}

/// Everything later stages need from one pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandFeatures {
    pub fingers: FingerState,
    /// 2D distance between thumb tip and index tip
    pub pinch_distance: f64,
    /// Unit normal of the wrist / index-MCP / pinky-MCP plane
    pub palm_normal: Vec3,
    /// Wrist → middle fingertip
    pub forward: Vec3,
    /// Index MCP → pinky MCP
    pub cross: Vec3,
}

impl HandFeatures {
    /// A closed fist: no tracked finger extended
    pub fn fist_closed(&self) -> bool {
        self.fingers.none_extended()
    }
}

/// Straightness test for one finger, in the image plane.
///
/// Compares the direction of MCP→PIP with PIP→TIP, so a finger spread
/// sideways still counts as extended as long as it is straight.
pub fn finger_extended(mcp: Vec2, pip: Vec2, tip: Vec2, threshold: f64, epsilon: f64) -> bool {
    let proximal = sub2(pip, mcp);
    let distal = sub2(tip, pip);
    cosine_similarity2(proximal, distal, epsilon) > threshold
}

/// Pure function of a pose; holds only its thresholds.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    config: FeatureConfig,
}

impl FeatureExtractor {
    pub fn new(config: FeatureConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Extract all features from a pose
    pub fn extract(&self, pose: &HandPose) -> HandFeatures {
        let wrist = pose.at(WRIST).xyz();
        let index_mcp = pose.at(INDEX_MCP).xyz();
        let pinky_mcp = pose.at(PINKY_MCP).xyz();

        let palm_normal = normalize3(
            cross3(sub3(index_mcp, wrist), sub3(pinky_mcp, wrist)),
            self.config.epsilon,
        );

        HandFeatures {
            fingers: self.finger_state(pose),
            pinch_distance: distance2(pose.at(THUMB_TIP).xy(), pose.at(INDEX_TIP).xy()),
            palm_normal,
            forward: sub3(pose.at(MIDDLE_TIP).xyz(), wrist),
            cross: sub3(pinky_mcp, index_mcp),
        }
    }

    /// Extension flags for index, middle, ring and pinky
    pub fn finger_state(&self, pose: &HandPose) -> FingerState {
        let mut flags = [false; 4];
        for (flag, &(mcp, pip, tip)) in flags.iter_mut().zip(FINGER_JOINTS.iter()) {
            *flag = finger_extended(
                pose.at(mcp).xy(),
                pose.at(pip).xy(),
                pose.at(tip).xy(),
                self.config.extension_cosine,
                self.config.epsilon,
            );
        }
        FingerState::from_flags(flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::fixtures;
    use crate::landmarks::{HandPose, Landmark};

    fn extractor() -> FeatureExtractor {
        FeatureExtractor::new(FeatureConfig::default()).unwrap()
    }

    #[test]
    fn test_straight_finger_is_extended() {
        assert!(finger_extended([0.5, 0.6], [0.5, 0.5], [0.5, 0.4], 0.7, 1e-6));
    }

    #[test]
    fn test_curled_finger_is_folded() {
        assert!(!finger_extended([0.5, 0.6], [0.5, 0.55], [0.5, 0.59], 0.7, 1e-6));
        // Right angle at the PIP joint
        assert!(!finger_extended([0.5, 0.6], [0.5, 0.5], [0.6, 0.5], 0.7, 1e-6));
    }

    #[test]
    fn test_spread_finger_still_extended() {
        // Straight but leaning sideways
        assert!(finger_extended([0.5, 0.6], [0.45, 0.5], [0.4, 0.4], 0.7, 1e-6));
    }

    #[test]
    fn test_fist_features() {
        let features = extractor().extract(&fixtures::fist());
        assert!(features.fingers.none_extended());
        assert!(features.fist_closed());
        assert!(features.pinch_distance > 0.05);
        // Palm faces the camera
        assert!(features.palm_normal[2] > 0.99);
    }

    #[test]
    fn test_open_hand_features() {
        let features = extractor().extract(&fixtures::open_hand());
        assert!(features.fingers.all_extended());
        assert_eq!(features.fingers.extended_count(), 4);
        assert!(!features.fist_closed());
    }

    #[test]
    fn test_pointing_and_pinch_features() {
        let pointing = extractor().extract(&fixtures::pointing_up());
        assert!(pointing.fingers.only_index());

        let pinch = extractor().extract(&fixtures::pinch());
        assert!(pinch.pinch_distance < 0.05);
        assert!(!pinch.fingers.index);
    }

    #[test]
    fn test_degenerate_pose_stays_finite() {
        let pose = HandPose::new(vec![Landmark::new(0.5, 0.5, 0.0); 21]).unwrap();
        let features = extractor().extract(&pose);
        assert_eq!(features.palm_normal, [0.0, 0.0, 0.0]);
        assert!(features.fingers.none_extended());
        assert_eq!(features.pinch_distance, 0.0);
    }

    #[test]
    fn test_cosine_threshold_out_of_range() {
        let config = FeatureConfig {
            extension_cosine: 1.5,
            ..FeatureConfig::default()
        };
        assert!(FeatureExtractor::new(config).is_err());
    }
}
