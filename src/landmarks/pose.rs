//! Landmark and hand pose definitions

use serde::{Deserialize, Deserializer, Serialize};

use super::vector::{Vec2, Vec3};

/// Number of landmarks in a full hand pose
pub const LANDMARK_COUNT: usize = 21;

/// One tracked point on the hand.
///
/// `x` and `y` are normalized image coordinates (y grows downward),
/// `z` is relative depth and defaults to 0 when the detector omits it
/// or sends null.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default, deserialize_with = "depth_or_zero")]
    pub z: f64,
}

fn depth_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Check that every coordinate is a finite number
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Image-plane projection, ignoring depth
    pub fn xy(&self) -> Vec2 {
        [self.x, self.y]
    }

    pub fn xyz(&self) -> Vec3 {
        [self.x, self.y, self.z]
    }
}

/// Reasons an externally supplied pose is rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PoseError {
    #[error("expected {expected} landmarks, got {actual}")]
    WrongLandmarkCount { expected: usize, actual: usize },

    #[error("landmark {index} has a non-finite coordinate")]
    NonFinite { index: usize },
}

/// The full 21-point landmark set for one frame. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct HandPose {
    points: [Landmark; LANDMARK_COUNT],
}

impl HandPose {
    /// Build a pose from detector output, rejecting anything that is not
    /// exactly 21 finite points.
    pub fn new(points: Vec<Landmark>) -> Result<Self, PoseError> {
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(PoseError::NonFinite { index });
        }

        let points: [Landmark; LANDMARK_COUNT] =
            points
                .try_into()
                .map_err(|points: Vec<Landmark>| PoseError::WrongLandmarkCount {
                    expected: LANDMARK_COUNT,
                    actual: points.len(),
                })?;

        Ok(Self { points })
    }

    /// All landmarks in detector order
    pub fn landmarks(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }

    /// Landmark at `index`, or `None` past the end of the pose
    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.points.get(index)
    }

    /// Landmark at one of the constants in [`super::index`].
    pub(crate) fn at(&self, index: usize) -> Landmark {
        self.points[index]
    }
}

impl TryFrom<Vec<Landmark>> for HandPose {
    type Error = PoseError;

    fn try_from(points: Vec<Landmark>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pose_accepts_21_points() {
        let pose = HandPose::new(vec![Landmark::new(0.5, 0.5, 0.0); 21]).unwrap();
        assert_eq!(pose.landmarks().len(), LANDMARK_COUNT);
        assert!(pose.get(20).is_some());
        assert!(pose.get(21).is_none());
    }

    #[test]
    fn test_pose_rejects_wrong_count() {
        let err = HandPose::new(vec![Landmark::default(); 20]).unwrap_err();
        assert_eq!(
            err,
            PoseError::WrongLandmarkCount {
                expected: 21,
                actual: 20
            }
        );
    }

    #[test]
    fn test_pose_rejects_non_finite() {
        let mut points = vec![Landmark::new(0.5, 0.5, 0.0); 21];
        points[7].y = f64::NAN;
        assert_eq!(
            HandPose::new(points).unwrap_err(),
            PoseError::NonFinite { index: 7 }
        );

        let mut points = vec![Landmark::new(0.5, 0.5, 0.0); 21];
        points[3].z = f64::INFINITY;
        assert_eq!(
            HandPose::try_from(points).unwrap_err(),
            PoseError::NonFinite { index: 3 }
        );
    }

    #[test]
    fn test_landmark_depth_defaults_to_zero() {
        let landmark: Landmark = serde_json::from_str(r#"{"x":0.25,"y":0.75}"#).unwrap();
        assert_eq!(landmark, Landmark::new(0.25, 0.75, 0.0));

        let landmark: Landmark =
            serde_json::from_str(r#"{"x":0.25,"y":0.75,"z":null}"#).unwrap();
        assert_eq!(landmark, Landmark::new(0.25, 0.75, 0.0));

        let landmark: Landmark =
            serde_json::from_str(r#"{"x":0.25,"y":0.75,"z":-0.1}"#).unwrap();
        assert_eq!(landmark.z, -0.1);
    }
}
