//! Gesture classification
//!
//! Per-class sequence models behind a capability trait, and the ensemble
//! decision rule that turns their log-likelihoods into a gesture (or none).

pub mod gesture;
pub mod engine;
pub mod frequency;
pub mod ensemble;
pub mod report;

pub use gesture::GestureClass;
pub use engine::{Matrix, ModelParameters, SequenceModelEngine};
pub use frequency::FrequencyEngine;
pub use ensemble::{ClassifierEnsemble, Decision, Scored, SharedModel};
pub use report::{ClassTally, ConfusionMatrix};
