//! Per-frame feature extraction
//!
//! Derives finger-extension flags, pinch distance and the palm vectors
//! used by orientation estimation from a single [`HandPose`].
//!
//! [`HandPose`]: crate::landmarks::HandPose

mod extractor;

pub use extractor::{finger_extended, FeatureConfig, FeatureExtractor, FingerState, HandFeatures};
