//! Dead zones, dominance margins and clamping over orientation deltas

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::{ensure_margin, ensure_non_negative, ConfigError};
use crate::orientation::{angle_delta, Axis, Orientation};

/// One non-negative threshold per axis, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisThresholds {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl Default for AxisThresholds {
    fn default() -> Self {
        Self {
            pitch: 2.5,
            yaw: 3.5,
            roll: 3.0,
        }
    }
}

impl AxisThresholds {
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Pitch => self.pitch,
            Axis::Yaw => self.yaw,
            Axis::Roll => self.roll,
        }
    }
}

/// Factor by which a candidate axis must beat each competitor.
///
/// Yaw and roll are both twisting motions and get confused with each
/// other, so their mutual margins are wider than pitch's.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DominanceMargins {
    pub pitch_over_yaw: f64,
    pub pitch_over_roll: f64,
    pub yaw_over_pitch: f64,
    pub yaw_over_roll: f64,
    pub roll_over_pitch: f64,
    pub roll_over_yaw: f64,
}

impl Default for DominanceMargins {
    fn default() -> Self {
        Self {
            pitch_over_yaw: 1.3,
            pitch_over_roll: 1.3,
            yaw_over_pitch: 1.4,
            yaw_over_roll: 1.8,
            roll_over_pitch: 1.4,
            roll_over_yaw: 1.6,
        }
    }
}

impl DominanceMargins {
    /// Margin `candidate` needs over `other`
    pub fn over(&self, candidate: Axis, other: Axis) -> f64 {
        match (candidate, other) {
            (Axis::Pitch, Axis::Yaw) => self.pitch_over_yaw,
            (Axis::Pitch, Axis::Roll) => self.pitch_over_roll,
            (Axis::Yaw, Axis::Pitch) => self.yaw_over_pitch,
            (Axis::Yaw, Axis::Roll) => self.yaw_over_roll,
            (Axis::Roll, Axis::Pitch) => self.roll_over_pitch,
            (Axis::Roll, Axis::Yaw) => self.roll_over_yaw,
            _ => 1.0,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        ensure_margin("rotation.margins.pitch_over_yaw", self.pitch_over_yaw)?;
        ensure_margin("rotation.margins.pitch_over_roll", self.pitch_over_roll)?;
        ensure_margin("rotation.margins.yaw_over_pitch", self.yaw_over_pitch)?;
        ensure_margin("rotation.margins.yaw_over_roll", self.yaw_over_roll)?;
        ensure_margin("rotation.margins.roll_over_pitch", self.roll_over_pitch)?;
        ensure_margin("rotation.margins.roll_over_yaw", self.roll_over_yaw)
    }
}

/// Disambiguator tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Per-axis deltas at or below these are noise
    pub dead_zone: AxisThresholds,
    pub margins: DominanceMargins,
    /// Largest rotation emitted for a single frame, either direction
    pub clamp_deg: f64,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            dead_zone: AxisThresholds::default(),
            margins: DominanceMargins::default(),
            clamp_deg: 15.0,
        }
    }
}

impl RotationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_negative("rotation.dead_zone.pitch", self.dead_zone.pitch)?;
        ensure_non_negative("rotation.dead_zone.yaw", self.dead_zone.yaw)?;
        ensure_non_negative("rotation.dead_zone.roll", self.dead_zone.roll)?;
        self.margins.validate()?;
        ensure_non_negative("rotation.clamp_deg", self.clamp_deg)
    }
}

/// Frame-to-frame change per axis, in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisDeltas {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl AxisDeltas {
    pub fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Shortest signed change on each axis from `previous` to `current`
    pub fn between(previous: &Orientation, current: &Orientation) -> Self {
        Self {
            pitch: angle_delta(previous.pitch, current.pitch),
            yaw: angle_delta(previous.yaw, current.yaw),
            roll: angle_delta(previous.roll, current.roll),
        }
    }

    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Pitch => self.pitch,
            Axis::Yaw => self.yaw,
            Axis::Roll => self.roll,
        }
    }
}

/// Rotate by `delta_deg` about `axis` this frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationCommand {
    pub axis: Axis,
    pub delta_deg: f64,
}

/// Baseline sample for computing deltas. Empty whenever the fist is open.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisLock {
    last: Option<Orientation>,
}

impl AxisLock {
    pub fn last(&self) -> Option<Orientation> {
        self.last
    }

    /// Returns true if a baseline was dropped
    fn clear(&mut self) -> bool {
        self.last.take().is_some()
    }
}

pub struct AxisDisambiguator {
    config: RotationConfig,
    lock: AxisLock,
}

impl AxisDisambiguator {
    pub fn new(config: RotationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            lock: AxisLock::default(),
        })
    }

    pub fn lock(&self) -> &AxisLock {
        &self.lock
    }

    /// Feed one smoothed sample. Emits nothing until two consecutive
    /// fist-closed samples exist.
    pub fn update(
        &mut self,
        sample: Option<Orientation>,
        fist_closed: bool,
    ) -> Option<RotationCommand> {
        let current = match sample {
            Some(sample) if fist_closed => sample,
            _ => {
                if self.lock.clear() {
                    debug!("fist released, rotation baseline cleared");
                }
                return None;
            }
        };

        let previous = self.lock.last.replace(current)?;
        self.resolve(AxisDeltas::between(&previous, &current))
    }

    /// Select at most one dominant axis from a set of deltas
    pub fn resolve(&self, deltas: AxisDeltas) -> Option<RotationCommand> {
        let dead_zone = &self.config.dead_zone;
        let candidate = Axis::ALL
            .into_iter()
            .filter(|&axis| deltas.get(axis).abs() > dead_zone.get(axis))
            .max_by(|&a, &b| deltas.get(a).abs().total_cmp(&deltas.get(b).abs()))?;

        let magnitude = deltas.get(candidate).abs();
        let margins = &self.config.margins;
        let dominant = Axis::ALL
            .into_iter()
            .filter(|&other| other != candidate)
            .all(|other| magnitude >= deltas.get(other).abs() * margins.over(candidate, other));

        if !dominant {
            trace!(axis = %candidate, ?deltas, "no dominant axis");
            return None;
        }

        let clamp = self.config.clamp_deg;
        let command = RotationCommand {
            axis: candidate,
            delta_deg: deltas.get(candidate).clamp(-clamp, clamp),
        };
        trace!(axis = %command.axis, delta_deg = command.delta_deg, "rotation selected");
        Some(command)
    }
}
