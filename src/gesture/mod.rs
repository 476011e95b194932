//! Discrete gesture classification
//!
//! Maps one frame's features to exactly one [`Gesture`] using a fixed
//! priority chain. Stateless.

mod classifier;

pub use classifier::{direction_from_angle, ClassifierConfig, Gesture, GestureClassifier};
