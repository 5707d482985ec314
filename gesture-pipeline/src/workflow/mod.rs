//! Workflow Module
//!
//! Dataset-level operations: training and persisting the class models, and
//! evaluating them over feature-row files.

pub mod training;
pub mod evaluation;

pub use training::{build_ensemble, ModelSet, ModelStore, ModelTrainer};
pub use evaluation::{classify_file, confusion_matrix};
