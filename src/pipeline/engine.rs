//! Pipeline driver
//!
//! Deduplicates frames by timestamp, runs every stage synchronously and
//! publishes changes as [`ControlEvent`]s.

use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, trace, warn};

use crate::config::{ConfigError, Tuning};
use crate::events::ControlEvent;
use crate::features::FeatureExtractor;
use crate::gesture::{Gesture, GestureClassifier};
use crate::landmarks::HandPose;
use crate::orientation::{Orientation, OrientationEstimator};
use crate::rotation::{AxisDisambiguator, RotationCommand};
use crate::smoothing::TemporalSmoother;

/// One processed video frame. `pose` is `None` when no hand was detected.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Capture time in milliseconds, monotonically increasing
    pub timestamp_ms: f64,
    pub pose: Option<HandPose>,
}

impl Frame {
    pub fn new(timestamp_ms: f64, pose: Option<HandPose>) -> Self {
        Self { timestamp_ms, pose }
    }

    pub fn empty(timestamp_ms: f64) -> Self {
        Self::new(timestamp_ms, None)
    }
}

/// Everything the pipeline decided for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameOutput {
    pub gesture: Gesture,
    pub orientation: Option<Orientation>,
    pub fist_closed: bool,
    pub rotation: Option<RotationCommand>,
}

/// Unsmoothed readings for one frame
struct Observation {
    gesture: Gesture,
    orientation: Option<Orientation>,
    fist_closed: bool,
}

impl Observation {
    fn absent() -> Self {
        Self {
            gesture: Gesture::Unknown,
            orientation: None,
            fist_closed: false,
        }
    }
}

/// Last values published downstream, for change detection
#[derive(Debug, Default)]
struct Published {
    gesture: Gesture,
    orientation: Option<Orientation>,
    fist_closed: bool,
}

pub struct GesturePipeline {
    extractor: FeatureExtractor,
    estimator: OrientationEstimator,
    classifier: GestureClassifier,
    smoother: TemporalSmoother,
    disambiguator: AxisDisambiguator,
    last_timestamp_ms: Option<f64>,
    published: Published,
    frames_processed: u64,
    frames_skipped: u64,
    /// Channel for emitting control events
    event_tx: broadcast::Sender<ControlEvent>,
}

impl GesturePipeline {
    /// Build every stage. Invalid tunables are reported here and nowhere
    /// else.
    pub fn new(
        tuning: &Tuning,
        event_tx: broadcast::Sender<ControlEvent>,
    ) -> Result<Self, ConfigError> {
        tuning.validate()?;

        Ok(Self {
            extractor: FeatureExtractor::new(tuning.features.clone())?,
            estimator: OrientationEstimator::new(tuning.orientation.clone())?,
            classifier: GestureClassifier::new(tuning.classifier.clone())?,
            smoother: TemporalSmoother::new(tuning.smoothing.clone())?,
            disambiguator: AxisDisambiguator::new(tuning.rotation.clone())?,
            last_timestamp_ms: None,
            published: Published::default(),
            frames_processed: 0,
            frames_skipped: 0,
            event_tx,
        })
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn frames_skipped(&self) -> u64 {
        self.frames_skipped
    }

    /// Process frames until the sending side closes
    pub async fn run(&mut self, mut frame_rx: mpsc::Receiver<Frame>) {
        info!("gesture pipeline started");

        while let Some(frame) = frame_rx.recv().await {
            self.process(&frame);
        }

        info!(
            processed = self.frames_processed,
            skipped = self.frames_skipped,
            "gesture pipeline stopped"
        );
    }

    /// Run one frame through every stage.
    ///
    /// Returns `None` without touching any state when the frame is not
    /// newer than the last one processed.
    pub fn process(&mut self, frame: &Frame) -> Option<FrameOutput> {
        if !self.is_new_frame(frame.timestamp_ms) {
            self.frames_skipped += 1;
            trace!(timestamp_ms = frame.timestamp_ms, "duplicate frame skipped");
            return None;
        }
        self.last_timestamp_ms = Some(frame.timestamp_ms);
        self.frames_processed += 1;

        let observation = match &frame.pose {
            Some(pose) => self.observe(pose),
            None => Observation::absent(),
        };

        let smoothed = self.smoother.update(
            observation.gesture,
            observation.orientation,
            frame.timestamp_ms,
        );
        let rotation = self
            .disambiguator
            .update(smoothed.orientation, observation.fist_closed);

        if frame.pose.is_none() && smoothed.gesture == Gesture::Unknown {
            self.smoother.reset();
        }

        let output = FrameOutput {
            gesture: smoothed.gesture,
            orientation: smoothed.orientation,
            fist_closed: observation.fist_closed,
            rotation,
        };
        trace!(?output, "frame processed");

        self.publish(&output);
        Some(output)
    }

    fn is_new_frame(&self, timestamp_ms: f64) -> bool {
        if !timestamp_ms.is_finite() {
            warn!(timestamp_ms, "frame with invalid timestamp dropped");
            return false;
        }
        self.last_timestamp_ms.map_or(true, |last| timestamp_ms > last)
    }

    /// Raw per-frame readings from a detected hand
    fn observe(&self, pose: &HandPose) -> Observation {
        let features = self.extractor.extract(pose);
        let fist_closed = features.fist_closed();

        let orientation = if fist_closed {
            Some(self.estimator.estimate(&features)).filter(Orientation::is_finite)
        } else {
            None
        };

        Observation {
            gesture: self.classifier.classify(pose, &features),
            orientation,
            fist_closed,
        }
    }

    /// Emit events for whatever changed since the last frame
    fn publish(&mut self, output: &FrameOutput) {
        if output.gesture != self.published.gesture {
            self.published.gesture = output.gesture;
            self.emit(ControlEvent::GestureChanged {
                gesture: output.gesture,
            });
        }

        if output.fist_closed != self.published.fist_closed {
            self.published.fist_closed = output.fist_closed;
            self.emit(ControlEvent::FistChanged {
                closed: output.fist_closed,
            });
        }

        if output.orientation != self.published.orientation {
            self.published.orientation = output.orientation;
            self.emit(ControlEvent::orientation(output.orientation));
        }

        if let Some(command) = output.rotation {
            self.emit(ControlEvent::Rotate {
                axis: command.axis,
                delta_deg: command.delta_deg,
            });
        }
    }

    fn emit(&self, event: ControlEvent) {
        debug!(%event, "emitting control event");
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }
}
