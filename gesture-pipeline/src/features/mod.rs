//! Per-frame geometric features
//!
//! Turns one instant's joint positions into a translation- and
//! scale-invariant descriptor of both hands relative to the torso.

pub mod frame;
pub mod extractor;

pub use frame::{Frame, HandShape, JointReport, Point3, FEATURE_DIM};
pub use extractor::FeatureExtractor;
