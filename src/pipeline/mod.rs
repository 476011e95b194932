//! Frame-driven gesture pipeline
//!
//! Runs once per video frame:
//! landmarks → features → {orientation, gesture} → smoothing → axis
//! disambiguation → control events. All per-session memory lives in the
//! smoother and disambiguator owned by [`GesturePipeline`].

mod engine;

pub use engine::{Frame, FrameOutput, GesturePipeline};
