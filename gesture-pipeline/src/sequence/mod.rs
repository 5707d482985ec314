//! Observation sequences
//!
//! Windows of quantized frames, the N×G observation matrix exchanged with
//! the sequence-model engine, and leave-one-out trimming (LOOT) augmentation.

pub mod matrix;
pub mod builder;
pub mod loot;

pub use matrix::ObservationMatrix;
pub use builder::{SequenceBuilder, DEFAULT_WINDOW_SIZE};
pub use loot::{loot_matrix, loot_sequence};

/// One observation sequence
pub type Sequence = Vec<crate::quantize::Symbol>;
