//! Hand landmark input types
//!
//! A [`HandPose`] is the 21-point landmark set delivered once per video
//! frame by the external detector. Construction sanitises the points, so
//! every later stage can assume 21 finite coordinates.

pub mod index;
mod pose;
pub mod vector;

#[cfg(test)]
pub(crate) mod fixtures;

pub use pose::{HandPose, Landmark, PoseError, LANDMARK_COUNT};
