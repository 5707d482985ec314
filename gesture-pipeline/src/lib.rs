//! # Gesture Pipeline
//!
//! Recognizes dynamic two-hand gestures from a stream of skeleton joints and
//! turns each one into a presentation-control action.
//!
//! ## Overview
//!
//! Every sensor tick yields a [`Frame`]: both hand positions relative to the
//! torso, normalized by the torso-head distance, plus a discrete hand shape
//! per hand. While either hand is raised above the torso the frames are
//! buffered; once a window of G frames is complete it is vector-quantized
//! against a codebook and the resulting symbol sequence is scored by one
//! sequence model per gesture. The best-scoring gesture is dispatched as an
//! [`InputAction`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use gesture_pipeline::classify::{FrequencyEngine, GestureClass};
//! use gesture_pipeline::quantize::Codebook;
//! use gesture_pipeline::sequence::SequenceBuilder;
//! use gesture_pipeline::workflow::{build_ensemble, ModelStore, ModelTrainer};
//! use std::path::Path;
//!
//! let codebook = Codebook::load(Path::new("Dataset/codebook16.txt"))?;
//! let builder = SequenceBuilder::new(&codebook, 40)?;
//! let engine = FrequencyEngine::new(codebook.len());
//!
//! let trainer = ModelTrainer::new(&engine, SequenceBuilder::new(&codebook, 40)?, "Dataset");
//! let models = ModelStore::new("Data").load_or_train(&trainer, false)?;
//! let ensemble = build_ensemble(engine.clone(), models, None)?;
//!
//! let windows = builder.build_from_file(Path::new("Dataset/testData.txt"))?;
//! let tally = ensemble.evaluate_batch(&windows)?;
//! println!("{}", tally.render());
//! # Ok::<(), gesture_pipeline::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`features`]: joint-to-frame feature extraction
//! - [`quantize`]: codebook and nearest-centroid quantization
//! - [`sequence`]: windowing into symbol sequences, LOOT augmentation
//! - [`segmentation`]: hands-raised gesture segmentation
//! - [`hand_shape`]: hand-shape classifier contract
//! - [`classify`]: sequence-model engines and the classifier ensemble
//! - [`dispatch`]: input actions for recognized gestures
//! - [`session`]: sensor ticks and the live per-tick loop
//! - [`workflow`]: training, persistence and batch evaluation
//! - [`app`]: CLI and configuration management
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │ Sensor Tick │───▶│  Features   │───▶│  Segmenter  │───▶│  Quantizer  │
//! │  (joints)   │    │  (Frame)    │    │ (G frames)  │    │ (symbols)   │
//! └─────────────┘    └─────────────┘    └─────────────┘    └─────────────┘
//!                                                                 │
//!                                                                 ▼
//!                                       ┌─────────────┐    ┌─────────────┐
//!                                       │  Dispatch   │◀───│  Ensemble   │
//!                                       │  (action)   │    │  (argmax)   │
//!                                       └─────────────┘    └─────────────┘
//! ```

pub mod features;
pub mod quantize;
pub mod sequence;
pub mod segmentation;
pub mod hand_shape;
pub mod classify;
pub mod dispatch;
pub mod session;
pub mod workflow;
pub mod app;

// Re-export commonly used types
pub use features::{FeatureExtractor, Frame, HandShape, JointReport, Point3};
pub use quantize::{Codebook, Symbol};
pub use sequence::{ObservationMatrix, SequenceBuilder};
pub use segmentation::GestureSegmenter;
pub use classify::{ClassifierEnsemble, Decision, GestureClass, SequenceModelEngine};
pub use dispatch::{ActionDispatcher, InputAction};
pub use session::Session;

/// Result type alias for the gesture pipeline
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the gesture pipeline
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Codebook is empty")]
    EmptyCodebook,

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Hand-shape classifier expects {expected} inputs, got {actual}")]
    ClassifierDimension { expected: usize, actual: usize },

    #[error("Model load error: {0}")]
    ModelLoad(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Sequence error: {0}")]
    Sequence(String),

    #[error("Training error: {0}")]
    Training(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Sensor error: {0}")]
    Sensor(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
