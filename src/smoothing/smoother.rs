//! Gesture hysteresis and orientation filtering

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::{ensure_non_negative, ConfigError};
use crate::gesture::Gesture;
use crate::orientation::{angle_delta, normalize_angle, Orientation};

/// Smoother tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// How long a directional gesture is held through `Unknown` readings
    pub grace_window_ms: f64,
    /// Weight of the new sample in the exponential filter
    pub alpha: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            grace_window_ms: 100.0,
            alpha: 0.8,
        }
    }
}

impl SmoothingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_negative("smoothing.grace_window_ms", self.grace_window_ms)?;
        if self.alpha.is_finite() && self.alpha > 0.0 && self.alpha <= 1.0 {
            Ok(())
        } else {
            Err(ConfigError::SmoothingFactor(self.alpha))
        }
    }
}

/// Exponential filter over one angle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct AngleFilter {
    value: Option<f64>,
}

impl AngleFilter {
    /// The first sample passes straight through; a missing sample drops
    /// the filtered value instead of holding it.
    fn apply(&mut self, raw: Option<f64>, alpha: f64) -> Option<f64> {
        self.value = match (self.value, raw) {
            (_, None) => None,
            (None, Some(sample)) => Some(sample),
            // prev + α·Δ equals new·α + prev·(1-α), stepping the short
            // way around the ±180° seam
            (Some(prev), Some(sample)) => {
                Some(normalize_angle(prev + alpha * angle_delta(prev, sample)))
            }
        };
        self.value
    }
}

/// Everything the smoother remembers between frames
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SmoothedState {
    /// Gesture currently reported downstream
    pub accepted: Gesture,
    /// Raw gesture seen on the previous frame
    pub last_raw: Gesture,
    /// Timestamp of the last non-`Unknown` reading
    pub last_valid_ms: Option<f64>,
    /// Consecutive frames the current raw gesture has been seen
    pub match_count: u32,
    pitch: AngleFilter,
    yaw: AngleFilter,
    roll: AngleFilter,
}

/// Smoother output for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedFrame {
    pub gesture: Gesture,
    pub orientation: Option<Orientation>,
}

pub struct TemporalSmoother {
    config: SmoothingConfig,
    state: SmoothedState,
}

impl TemporalSmoother {
    pub fn new(config: SmoothingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state: SmoothedState::default(),
        })
    }

    pub fn state(&self) -> &SmoothedState {
        &self.state
    }

    pub fn gesture(&self) -> Gesture {
        self.state.accepted
    }

    /// Forget everything, as after losing the hand
    pub fn reset(&mut self) {
        if self.state != SmoothedState::default() {
            debug!("smoother state reset");
        }
        self.state = SmoothedState::default();
    }

    /// Feed one frame's raw readings
    pub fn update(
        &mut self,
        raw: Gesture,
        orientation: Option<Orientation>,
        now_ms: f64,
    ) -> SmoothedFrame {
        SmoothedFrame {
            gesture: self.update_gesture(raw, now_ms),
            orientation: self.update_orientation(orientation),
        }
    }

    fn update_gesture(&mut self, raw: Gesture, now_ms: f64) -> Gesture {
        let state = &mut self.state;

        if raw == Gesture::Unknown {
            state.last_raw = Gesture::Unknown;
            state.match_count = 0;

            let held = state.accepted;
            if held.is_zoom() {
                // Zoom must never outlive its hand shape
                debug!(gesture = %held, "zoom released");
                state.accepted = Gesture::Unknown;
            } else if held.is_known() {
                let elapsed_ms = state
                    .last_valid_ms
                    .map(|t| now_ms - t)
                    .unwrap_or(f64::INFINITY);

                if elapsed_ms > self.config.grace_window_ms {
                    debug!(gesture = %held, elapsed_ms, "grace window expired");
                    state.accepted = Gesture::Unknown;
                } else {
                    trace!(gesture = %held, elapsed_ms, "holding gesture through dropout");
                }
            }
            return state.accepted;
        }

        if raw == state.last_raw {
            state.match_count = state.match_count.saturating_add(1);
        } else {
            state.match_count = 1;
        }
        state.last_raw = raw;
        state.last_valid_ms = Some(now_ms);

        if state.accepted != raw {
            debug!(from = %state.accepted, to = %raw, "gesture accepted");
            state.accepted = raw;
        }
        state.accepted
    }

    fn update_orientation(&mut self, orientation: Option<Orientation>) -> Option<Orientation> {
        let alpha = self.config.alpha;
        let state = &mut self.state;

        let pitch = state.pitch.apply(orientation.map(|o| o.pitch), alpha);
        let yaw = state.yaw.apply(orientation.map(|o| o.yaw), alpha);
        let roll = state.roll.apply(orientation.map(|o| o.roll), alpha);

        match (pitch, yaw, roll) {
            (Some(pitch), Some(yaw), Some(roll)) => Some(Orientation { pitch, yaw, roll }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smoother() -> TemporalSmoother {
        TemporalSmoother::new(SmoothingConfig::default()).unwrap()
    }

    fn gesture_at(s: &mut TemporalSmoother, raw: Gesture, now_ms: f64) -> Gesture {
        s.update(raw, None, now_ms).gesture
    }

    #[test]
    fn test_known_gesture_accepted_immediately() {
        let mut s = smoother();
        assert_eq!(gesture_at(&mut s, Gesture::Up, 0.0), Gesture::Up);
        assert_eq!(s.state().match_count, 1);

        assert_eq!(gesture_at(&mut s, Gesture::Up, 33.0), Gesture::Up);
        assert_eq!(s.state().match_count, 2);

        assert_eq!(gesture_at(&mut s, Gesture::Left, 66.0), Gesture::Left);
        assert_eq!(s.state().match_count, 1);
    }

    #[test]
    fn test_zoom_clears_on_first_unknown() {
        for zoom in [Gesture::ZoomIn, Gesture::ZoomOut] {
            let mut s = smoother();
            gesture_at(&mut s, zoom, 0.0);
            assert_eq!(gesture_at(&mut s, Gesture::Unknown, 10.0), Gesture::Unknown);
        }
    }

    #[test]
    fn test_directional_held_within_grace_window() {
        let mut s = smoother();
        gesture_at(&mut s, Gesture::Down, 0.0);
        assert_eq!(gesture_at(&mut s, Gesture::Unknown, 40.0), Gesture::Down);
        assert_eq!(gesture_at(&mut s, Gesture::Unknown, 100.0), Gesture::Down);
        assert_eq!(gesture_at(&mut s, Gesture::Unknown, 140.0), Gesture::Unknown);
        // Stays cleared
        assert_eq!(gesture_at(&mut s, Gesture::Unknown, 150.0), Gesture::Unknown);
    }

    #[test]
    fn test_dropout_bridged_then_resumed() {
        let mut s = smoother();
        gesture_at(&mut s, Gesture::Right, 0.0);
        assert_eq!(gesture_at(&mut s, Gesture::Unknown, 33.0), Gesture::Right);
        assert_eq!(gesture_at(&mut s, Gesture::Right, 66.0), Gesture::Right);
        // Grace window restarts from the latest valid reading
        assert_eq!(gesture_at(&mut s, Gesture::Unknown, 150.0), Gesture::Right);
        assert_eq!(s.state().match_count, 0);
    }

    #[test]
    fn test_unknown_from_start_stays_unknown() {
        let mut s = smoother();
        assert_eq!(gesture_at(&mut s, Gesture::Unknown, 0.0), Gesture::Unknown);
    }

    #[test]
    fn test_first_orientation_passes_through() {
        let mut s = smoother();
        let sample = Orientation::new(10.0, -20.0, 30.0);
        let out = s.update(Gesture::Unknown, Some(sample), 0.0);
        assert_eq!(out.orientation, Some(sample));
    }

    #[test]
    fn test_orientation_filtered() {
        let mut s = smoother();
        s.update(Gesture::Unknown, Some(Orientation::new(0.0, 0.0, 0.0)), 0.0);
        let out = s
            .update(Gesture::Unknown, Some(Orientation::new(10.0, -10.0, 5.0)), 33.0)
            .orientation
            .unwrap();
        assert!((out.pitch - 8.0).abs() < 1e-9);
        assert!((out.yaw + 8.0).abs() < 1e-9);
        assert!((out.roll - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_orientation_filter_crosses_seam() {
        let mut s = smoother();
        s.update(Gesture::Unknown, Some(Orientation::new(0.0, 170.0, 0.0)), 0.0);
        let out = s
            .update(Gesture::Unknown, Some(Orientation::new(0.0, -170.0, 0.0)), 33.0)
            .orientation
            .unwrap();
        // 170 + 0.8 * 20 = 186, wrapped
        assert!((out.yaw + 174.0).abs() < 1e-9);
    }

    #[test]
    fn test_orientation_resets_when_unavailable() {
        let mut s = smoother();
        s.update(Gesture::Unknown, Some(Orientation::new(50.0, 50.0, 50.0)), 0.0);
        assert_eq!(s.update(Gesture::Unknown, None, 33.0).orientation, None);

        // No stale value leaks into the next sample
        let fresh = Orientation::new(-30.0, 0.0, 10.0);
        assert_eq!(
            s.update(Gesture::Unknown, Some(fresh), 66.0).orientation,
            Some(fresh)
        );
    }

    #[test]
    fn test_reset_clears_state() {
        let mut s = smoother();
        s.update(Gesture::Up, Some(Orientation::default()), 0.0);
        s.reset();
        assert_eq!(s.state(), &SmoothedState::default());
        assert_eq!(s.gesture(), Gesture::Unknown);
    }

    #[test]
    fn test_invalid_alpha_rejected() {
        let config = SmoothingConfig {
            alpha: 1.2,
            ..SmoothingConfig::default()
        };
        assert!(matches!(
            TemporalSmoother::new(config),
            Err(ConfigError::SmoothingFactor(_))
        ));
    }
}
