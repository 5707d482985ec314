//! Live recognition session
//!
//! One call to [`Session::tick`] runs a whole sensor tick through the
//! pipeline:
//!
//! ```text
//! events ─▶ hand shapes ─▶ features ─▶ segmenter ─▶ quantize ─▶ ensemble ─▶ dispatch
//! ```
//!
//! Failures confined to one tick (a malformed line, a rejected patch, an
//! engine error on one window) are logged, counted in [`SessionStats`] and
//! skipped. I/O failures of the source end the session.

use super::events::{SensorTick, SkeletonSource, UserTracker};
use crate::classify::{ClassTally, ClassifierEnsemble, Decision, GestureClass, SequenceModelEngine};
use crate::dispatch::ActionDispatcher;
use crate::features::{FeatureExtractor, Frame, HandShape};
use crate::hand_shape::{HandPatch, HandShapeClassifier};
use crate::quantize::Codebook;
use crate::segmentation::{GestureSegmenter, SegmentEvent};
use crate::sequence::SequenceBuilder;
use crate::{Error, Result};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// What one tick amounted to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Source exhausted
    EndOfStream,
    /// Tick could not be read; skipped
    Skipped,
    /// No usable skeleton this tick
    NoUser,
    /// Waiting for hands to be raised
    Idle,
    /// Gesture window filling
    Recording { len: usize },
    /// Hands lowered before the window filled
    Aborted { discarded: usize },
    Recognized { class: GestureClass, score: f64 },
    /// Window classified, but no gesture cleared the decision rule
    Rejected,
    /// Window could not be classified
    Failed,
}

/// Running counters for a session
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionStats {
    pub ticks: u64,
    pub skipped_ticks: u64,
    pub invalid_frames: u64,
    pub aborted_windows: u64,
    pub classifier_errors: u64,
    pub window_errors: u64,
    pub dispatch_errors: u64,
    /// Decisions over every completed window
    pub decisions: ClassTally,
}

impl SessionStats {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Optional in-process hand-shape classifiers
#[derive(Default)]
pub struct HandClassifiers {
    pub right: Option<Box<dyn HandShapeClassifier>>,
    pub left: Option<Box<dyn HandShapeClassifier>>,
}

/// Owns every pipeline stage for one live run
pub struct Session<E, S, D> {
    codebook: Codebook,
    ensemble: ClassifierEnsemble<E>,
    source: S,
    dispatcher: D,
    extractor: FeatureExtractor,
    segmenter: GestureSegmenter,
    tracker: UserTracker,
    classifiers: HandClassifiers,
    stats: SessionStats,
}

impl<E, S, D> Session<E, S, D>
where
    E: SequenceModelEngine,
    S: SkeletonSource,
    D: ActionDispatcher,
{
    pub fn new(
        codebook: Codebook,
        ensemble: ClassifierEnsemble<E>,
        source: S,
        dispatcher: D,
        window_size: usize,
    ) -> Result<Self> {
        if codebook.is_empty() {
            return Err(Error::EmptyCodebook);
        }
        Ok(Self {
            codebook,
            ensemble,
            source,
            dispatcher,
            extractor: FeatureExtractor::new(),
            segmenter: GestureSegmenter::new(window_size)?,
            tracker: UserTracker::new(),
            classifiers: HandClassifiers::default(),
            stats: SessionStats::default(),
        })
    }

    pub fn with_extractor(mut self, extractor: FeatureExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_hand_classifiers(mut self, classifiers: HandClassifiers) -> Self {
        self.classifiers = classifiers;
        self
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn tracker(&self) -> &UserTracker {
        &self.tracker
    }

    pub fn segmenter(&self) -> &GestureSegmenter {
        &self.segmenter
    }

    pub fn ensemble(&self) -> &ClassifierEnsemble<E> {
        &self.ensemble
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Process one sensor tick
    pub fn tick(&mut self) -> Result<TickOutcome> {
        let tick = match self.source.next_tick() {
            Ok(Some(tick)) => tick,
            Ok(None) => return Ok(TickOutcome::EndOfStream),
            Err(Error::Sensor(msg)) => {
                warn!("Skipping sensor tick: {}", msg);
                self.stats.skipped_ticks += 1;
                return Ok(TickOutcome::Skipped);
            }
            Err(e) => return Err(e),
        };
        self.stats.ticks += 1;

        for event in &tick.events {
            self.tracker.apply(event);
        }

        let frame = self.frame_for(&tick);
        let outcome = match self.segmenter.push(&frame) {
            SegmentEvent::Ignored => TickOutcome::NoUser,
            SegmentEvent::Waiting => TickOutcome::Idle,
            SegmentEvent::Started | SegmentEvent::Appended { .. } => TickOutcome::Recording {
                len: self.segmenter.buffered(),
            },
            SegmentEvent::Aborted { discarded } => {
                self.stats.aborted_windows += 1;
                TickOutcome::Aborted { discarded }
            }
            SegmentEvent::Completed(window) => self.recognize(&window),
        };
        Ok(outcome)
    }

    /// Tick until the source ends or `stop` is set; an unfinished window is dropped
    pub fn run(&mut self, stop: &AtomicBool) -> Result<SessionStats> {
        info!("Session started (window {})", self.segmenter.window_size());

        while !stop.load(Ordering::SeqCst) {
            if self.tick()? == TickOutcome::EndOfStream {
                debug!("Sensor stream ended");
                break;
            }
        }

        if self.segmenter.buffered() > 0 {
            debug!("Discarding {} buffered frames", self.segmenter.buffered());
            self.segmenter.reset();
        }

        info!(
            "Session stopped after {} ticks, {} windows classified",
            self.stats.ticks,
            self.stats.decisions.total()
        );
        Ok(self.stats.clone())
    }

    fn frame_for(&mut self, tick: &SensorTick) -> Frame {
        let right = resolve_shape(
            self.classifiers.right.as_deref(),
            tick.right_patch.as_ref(),
            tick.right_shape,
            "right",
            &mut self.stats,
        );
        let left = resolve_shape(
            self.classifiers.left.as_deref(),
            tick.left_patch.as_ref(),
            tick.left_shape,
            "left",
            &mut self.stats,
        );

        match self.extractor.extract(tick.joints.as_ref(), right, left) {
            Ok(frame) => frame,
            Err(e) => {
                debug!("No frame this tick: {}", e);
                self.stats.invalid_frames += 1;
                Frame::no_user()
            }
        }
    }

    fn recognize(&mut self, window: &[Frame]) -> TickOutcome {
        let decision = SequenceBuilder::new(&self.codebook, window.len())
            .and_then(|builder| builder.build_realtime(window))
            .and_then(|sequence| self.ensemble.classify(&sequence));

        let decision = match decision {
            Ok(d) => d,
            Err(e) => {
                warn!("Could not classify gesture window: {}", e);
                self.stats.window_errors += 1;
                return TickOutcome::Failed;
            }
        };
        self.stats.decisions.record(&decision);

        match decision {
            Decision::Gesture { class, score } => {
                info!("Recognized {} (log-likelihood {:.2})", class, score);
                if let Err(e) = self.dispatcher.dispatch(class.action()) {
                    warn!("Dispatch of {:?} failed: {}", class.action(), e);
                    self.stats.dispatch_errors += 1;
                }
                TickOutcome::Recognized { class, score }
            }
            Decision::NoGesture { best } => {
                match best {
                    Some(b) => info!("No gesture: best was {} at {:.2}", b.class, b.score),
                    None => info!("No gesture: no models registered"),
                }
                TickOutcome::Rejected
            }
        }
    }
}

/// Classifier output when both a classifier and a patch exist, otherwise the
/// label shipped with the tick, otherwise `Undefined`
fn resolve_shape(
    classifier: Option<&dyn HandShapeClassifier>,
    patch: Option<&HandPatch>,
    supplied: Option<HandShape>,
    hand: &str,
    stats: &mut SessionStats,
) -> HandShape {
    match (classifier, patch) {
        (Some(classifier), Some(patch)) => match classifier.classify(patch) {
            Ok(shape) => shape,
            Err(e @ Error::ClassifierDimension { .. }) => {
                warn!("{} hand: {}", hand, e);
                stats.classifier_errors += 1;
                HandShape::Undefined
            }
            Err(e) => {
                warn!("{} hand classifier failed: {}", hand, e);
                stats.classifier_errors += 1;
                HandShape::Error
            }
        },
        _ => supplied.unwrap_or_default(),
    }
}
