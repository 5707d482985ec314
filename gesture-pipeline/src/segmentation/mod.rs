//! Temporal segmentation
//!
//! Decides when a candidate gesture window starts and stops within the
//! continuous frame stream.

pub mod segmenter;

pub use segmenter::{GestureSegmenter, SegmentEvent, SegmenterState};
