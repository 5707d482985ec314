//! Hand-shape classification contract
//!
//! The per-hand shape label is produced by an external trained classifier.
//! This module defines how it is invoked: a binary image patch goes in, a
//! [`HandShape`] comes out, and a patch of the wrong size is rejected with
//! [`Error::ClassifierDimension`] instead of being scored.

use crate::features::frame::HandShape;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default top-score floor below which the shape is `Undefined`
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.97;

/// Pixel intensity above which a patch pixel counts as foreground
const BINARY_THRESHOLD: u8 = 128;

/// Depth-image patch centred on one hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandPatch {
    pub width: usize,
    pub height: usize,
    /// Row-major 8-bit intensities
    pub pixels: Vec<u8>,
}

impl HandPatch {
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self> {
        if pixels.len() != width * height {
            return Err(Error::Parse(format!(
                "patch of {}x{} needs {} pixels, got {}",
                width,
                height,
                width * height,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Number of classifier inputs this patch produces
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// 1.0 for foreground pixels, 0.0 otherwise
    pub fn binarized(&self) -> Vec<f32> {
        self.pixels
            .iter()
            .map(|&p| if p > BINARY_THRESHOLD { 1.0 } else { 0.0 })
            .collect()
    }
}

/// Anything that can label a hand patch
pub trait HandShapeClassifier {
    fn classify(&self, patch: &HandPatch) -> Result<HandShape>;
}

/// Raw output layer of a trained network
pub trait PatchScorer {
    /// Inputs the network was trained on
    fn input_len(&self) -> usize;

    /// One score per output, in [`HandShape::from_index`] order
    fn scores(&self, inputs: &[f32]) -> Vec<f32>;
}

/// Wraps a [`PatchScorer`] with the dimension check, argmax and confidence floor
pub struct ThresholdedClassifier<S> {
    scorer: S,
    min_confidence: f32,
}

impl<S: PatchScorer> ThresholdedClassifier<S> {
    pub fn new(scorer: S) -> Self {
        Self::with_min_confidence(scorer, DEFAULT_MIN_CONFIDENCE)
    }

    pub fn with_min_confidence(scorer: S, min_confidence: f32) -> Self {
        Self {
            scorer,
            min_confidence,
        }
    }
}

impl<S: PatchScorer> HandShapeClassifier for ThresholdedClassifier<S> {
    fn classify(&self, patch: &HandPatch) -> Result<HandShape> {
        let expected = self.scorer.input_len();
        if patch.len() != expected {
            return Err(Error::ClassifierDimension {
                expected,
                actual: patch.len(),
            });
        }

        let scores = self.scorer.scores(&patch.binarized());
        let best = scores
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f32)>, (i, &s)| match best {
                Some((_, top)) if s <= top => best,
                _ if s.is_nan() => best,
                _ => Some((i, s)),
            });

        Ok(match best {
            Some((index, score)) if score >= self.min_confidence => HandShape::from_index(index),
            _ => HandShape::Undefined,
        })
    }
}
