//! Classifier Ensemble
//!
//! One model per gesture class. A sequence is scored against every model and
//! the highest log-likelihood wins; ties go to the class registered first.
//! An optional confidence floor turns a weak winner into "no gesture".

use super::engine::{ModelParameters, SequenceModelEngine};
use super::gesture::GestureClass;
use super::report::{ClassTally, ConfusionMatrix};
use crate::quantize::Symbol;
use crate::sequence::ObservationMatrix;
use crate::{Error, Result};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// A model slot that can be replaced while other threads score against it.
///
/// Readers take an `Arc` snapshot; [`SharedModel::publish`] swaps in a whole
/// new model, so a scorer never sees a half-updated one.
#[derive(Debug, Clone)]
pub struct SharedModel {
    inner: Arc<RwLock<Arc<ModelParameters>>>,
}

impl SharedModel {
    pub fn new(model: ModelParameters) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(model))),
        }
    }

    /// Current model
    pub fn snapshot(&self) -> Arc<ModelParameters> {
        Arc::clone(&self.inner.read())
    }

    /// Replace the model; returns the previous one
    pub fn publish(&self, model: ModelParameters) -> Arc<ModelParameters> {
        std::mem::replace(&mut *self.inner.write(), Arc::new(model))
    }
}

/// A class and its log-likelihood for one sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored {
    pub class: GestureClass,
    pub score: f64,
}

/// Outcome of classifying one sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    Gesture { class: GestureClass, score: f64 },
    /// No model registered, or the best score fell below the floor
    NoGesture { best: Option<Scored> },
}

impl Decision {
    pub fn class(&self) -> Option<GestureClass> {
        match self {
            Decision::Gesture { class, .. } => Some(*class),
            Decision::NoGesture { .. } => None,
        }
    }

    pub fn is_gesture(&self) -> bool {
        matches!(self, Decision::Gesture { .. })
    }
}

/// Per-class models plus the decision rule
pub struct ClassifierEnsemble<E> {
    engine: E,
    models: Vec<(GestureClass, SharedModel)>,
    confidence_floor: Option<f64>,
}

impl<E: SequenceModelEngine> ClassifierEnsemble<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            models: Vec::with_capacity(GestureClass::COUNT),
            confidence_floor: None,
        }
    }

    /// Enable (`Some`) or disable (`None`) the confidence floor
    pub fn with_confidence_floor(mut self, floor: Option<f64>) -> Self {
        self.confidence_floor = floor;
        self
    }

    pub fn confidence_floor(&self) -> Option<f64> {
        self.confidence_floor
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Add a class; registration order decides ties
    pub fn register(&mut self, class: GestureClass, model: ModelParameters) -> Result<SharedModel> {
        if self.models.iter().any(|(c, _)| *c == class) {
            return Err(Error::Config(format!("{} model already registered", class)));
        }
        let shared = SharedModel::new(model);
        self.models.push((class, shared.clone()));
        Ok(shared)
    }

    pub fn model(&self, class: GestureClass) -> Option<&SharedModel> {
        self.models
            .iter()
            .find(|(c, _)| *c == class)
            .map(|(_, m)| m)
    }

    /// Registered classes in order
    pub fn classes(&self) -> impl Iterator<Item = GestureClass> + '_ {
        self.models.iter().map(|(c, _)| *c)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Score `sequence` against every model, in registration order
    pub fn scores(&self, sequence: &[Symbol]) -> Result<Vec<Scored>> {
        self.models
            .iter()
            .map(|(class, model)| {
                let snapshot = model.snapshot();
                let score = self.engine.score(&snapshot, sequence)?;
                Ok(Scored {
                    class: *class,
                    score,
                })
            })
            .collect()
    }

    /// Argmax over the class scores, then the optional floor
    pub fn classify(&self, sequence: &[Symbol]) -> Result<Decision> {
        let scores = self.scores(sequence)?;
        for s in &scores {
            debug!("{}: {:.3}", s.class, s.score);
        }

        let best = scores
            .iter()
            .copied()
            .filter(|s| !s.score.is_nan())
            .reduce(|best, s| if s.score > best.score { s } else { best });

        Ok(match (best, self.confidence_floor) {
            (None, _) => Decision::NoGesture { best: None },
            (Some(b), Some(floor)) if !(b.score >= floor) => Decision::NoGesture { best: Some(b) },
            (Some(b), _) => Decision::Gesture {
                class: b.class,
                score: b.score,
            },
        })
    }

    /// Classify every row independently and tally the predictions
    pub fn evaluate_batch(&self, observations: &ObservationMatrix) -> Result<ClassTally> {
        let mut tally = ClassTally::default();
        for row in observations.rows() {
            tally.record(&self.classify(row)?);
        }
        Ok(tally)
    }

    /// Add one ground-truth row of a confusion matrix
    pub fn update_confusion(
        &self,
        confusion: &mut ConfusionMatrix,
        truth: GestureClass,
        observations: &ObservationMatrix,
    ) -> Result<ClassTally> {
        let tally = self.evaluate_batch(observations)?;
        confusion.add(truth, &tally);
        Ok(tally)
    }
}
