//! Vector quantization
//!
//! Maps continuous 8-dimensional frame features onto the index of the
//! nearest entry in a fixed codebook.

pub mod codebook;

pub use codebook::{parse_feature_rows, Centroid, Codebook, Symbol};
