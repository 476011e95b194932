//! Synthetic hand poses shared by the unit tests
//!
//! Poses are built upright: wrist at the bottom, knuckles in a row above
//! it, fingers pointing up the image. Extended fingers run straight up,
//! folded fingers double back toward the knuckle.

use super::index::*;
use super::{HandPose, Landmark};

const WRIST_POS: (f64, f64) = (0.5, 0.8);
const KNUCKLE_Y: f64 = 0.6;
const KNUCKLE_X: [f64; 4] = [0.44, 0.48, 0.52, 0.56];

fn build(extended: [bool; 4], thumb_tip: (f64, f64)) -> HandPose {
    let mut points = vec![Landmark::default(); 21];
    points[WRIST] = Landmark::new(WRIST_POS.0, WRIST_POS.1, 0.0);
    points[THUMB_CMC] = Landmark::new(0.44, 0.76, 0.0);
    points[THUMB_MCP] = Landmark::new(0.40, 0.72, 0.0);
    points[THUMB_IP] = Landmark::new(0.37, 0.68, 0.0);
    points[THUMB_TIP] = Landmark::new(thumb_tip.0, thumb_tip.1, 0.0);

    for (finger, &(mcp, pip, tip)) in FINGER_JOINTS.iter().enumerate() {
        let x = KNUCKLE_X[finger];
        let (pip_y, dip_y, tip_y) = if extended[finger] {
            (0.52, 0.48, 0.44)
        } else {
            (0.55, 0.57, 0.59)
        };
        points[mcp] = Landmark::new(x, KNUCKLE_Y, 0.0);
        points[pip] = Landmark::new(x, pip_y, 0.0);
        // DIP sits between PIP and TIP in the detector ordering
        points[pip + 1] = Landmark::new(x, dip_y, 0.0);
        points[tip] = Landmark::new(x, tip_y, 0.0);
    }

    HandPose::new(points).expect("fixture pose is valid")
}

/// All four fingers folded, thumb resting away from the index tip.
pub(crate) fn fist() -> HandPose {
    build([false; 4], (0.35, 0.64))
}

/// All four fingers extended.
pub(crate) fn open_hand() -> HandPose {
    build([true; 4], (0.35, 0.64))
}

/// Only the index finger extended, pointing up the image.
pub(crate) fn pointing_up() -> HandPose {
    build([true, false, false, false], (0.35, 0.64))
}

/// "OK" sign: thumb tip touching the folded index tip, other fingers up.
pub(crate) fn pinch() -> HandPose {
    build([false, true, true, true], (0.45, 0.58))
}

/// Rotate every landmark about the vertical axis through the wrist.
/// Positive angles turn the palm normal from +z toward +x.
pub(crate) fn rotated_about_vertical(pose: &HandPose, degrees: f64) -> HandPose {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let wrist = pose.at(WRIST);
    let points = pose
        .landmarks()
        .iter()
        .map(|p| {
            let dx = p.x - wrist.x;
            let dz = p.z - wrist.z;
            Landmark::new(
                wrist.x + dx * cos + dz * sin,
                p.y,
                wrist.z - dx * sin + dz * cos,
            )
        })
        .collect();
    HandPose::new(points).expect("rotated pose is valid")
}

/// Rotate every landmark counter-clockwise (as seen on screen) about the
/// wrist, within the image plane.
pub(crate) fn rotated_in_image(pose: &HandPose, degrees: f64) -> HandPose {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let wrist = pose.at(WRIST);
    let points = pose
        .landmarks()
        .iter()
        .map(|p| {
            let dx = p.x - wrist.x;
            let up = wrist.y - p.y;
            Landmark::new(
                wrist.x + dx * cos - up * sin,
                wrist.y - (dx * sin + up * cos),
                p.z,
            )
        })
        .collect();
    HandPose::new(points).expect("rotated pose is valid")
}
