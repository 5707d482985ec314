//! Single-state reference engine
//!
//! The degenerate one-state case of a discrete hidden-Markov model: the
//! transition and initial matrices are `[[1.0]]` and the emission row is a
//! smoothed symbol histogram. Training is a closed-form count and the
//! log-likelihood of a sequence is the sum of its symbols' log emission
//! probabilities. Models it writes use the same persisted layout as a
//! multi-state engine.

use super::engine::{Matrix, ModelParameters, SequenceModelEngine};
use crate::quantize::Symbol;
use crate::sequence::ObservationMatrix;
use crate::{Error, Result};
use tracing::debug;

/// Default additive (Laplace) smoothing
pub const DEFAULT_SMOOTHING: f64 = 1.0;

/// Symbol-histogram engine over a fixed alphabet
#[derive(Debug, Clone)]
pub struct FrequencyEngine {
    /// Alphabet size (codebook length)
    pub symbol_count: usize,
    /// Pseudo-count added to every symbol
    pub smoothing: f64,
}

impl FrequencyEngine {
    pub fn new(symbol_count: usize) -> Self {
        Self::with_smoothing(symbol_count, DEFAULT_SMOOTHING)
    }

    pub fn with_smoothing(symbol_count: usize, smoothing: f64) -> Self {
        Self {
            symbol_count,
            smoothing,
        }
    }
}

impl SequenceModelEngine for FrequencyEngine {
    fn train(&self, sequences: &ObservationMatrix) -> Result<ModelParameters> {
        if self.symbol_count == 0 {
            return Err(Error::Training("alphabet is empty".to_string()));
        }
        if !(self.smoothing > 0.0) {
            return Err(Error::Training(format!(
                "smoothing must be > 0, got {}",
                self.smoothing
            )));
        }

        let mut counts = vec![0u64; self.symbol_count];
        for &symbol in sequences.as_slice() {
            let slot = counts.get_mut(symbol).ok_or_else(|| {
                Error::Training(format!(
                    "symbol {} outside alphabet of {}",
                    symbol, self.symbol_count
                ))
            })?;
            *slot += 1;
        }

        let total = sequences.as_slice().len() as f64 + self.smoothing * self.symbol_count as f64;
        let emission: Vec<f64> = counts
            .iter()
            .map(|&c| (c as f64 + self.smoothing) / total)
            .collect();

        debug!(
            "Trained frequency model on {} sequences ({} symbols)",
            sequences.row_count(),
            sequences.as_slice().len()
        );

        ModelParameters::new(
            Matrix::filled(1, 1, 1.0),
            Matrix::new(1, self.symbol_count, emission)?,
            Matrix::filled(1, 1, 1.0),
        )
    }

    fn score(&self, model: &ModelParameters, sequence: &[Symbol]) -> Result<f64> {
        if model.state_count() != 1 {
            return Err(Error::ModelLoad(format!(
                "frequency engine scores single-state models, got {} states",
                model.state_count()
            )));
        }

        let emission = model.emission.row(0).unwrap_or(&[]);
        let log_likelihood = sequence
            .iter()
            .map(|&symbol| match emission.get(symbol) {
                Some(&p) if p > 0.0 => p.ln(),
                _ => f64::NEG_INFINITY,
            })
            .sum();

        Ok(log_likelihood)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<usize>>) -> ObservationMatrix {
        ObservationMatrix::from_rows(rows).unwrap()
    }

    #[test]
    fn test_train_histogram() {
        let engine = FrequencyEngine::new(4);
        let model = engine.train(&matrix(vec![vec![0, 0, 1], vec![0, 2, 0]])).unwrap();

        assert_eq!(model.state_count(), 1);
        assert_eq!(model.symbol_count(), 4);
        // counts 4,1,1,0 plus one each, over 6 + 4
        assert_eq!(model.emission.as_slice(), &[0.5, 0.2, 0.2, 0.1]);
        let sum: f64 = model.emission.as_slice().iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_train_rejects_out_of_range_symbol() {
        let engine = FrequencyEngine::new(2);
        assert!(matches!(
            engine.train(&matrix(vec![vec![0, 5]])),
            Err(Error::Training(_))
        ));
    }

    #[test]
    fn test_train_rejects_bad_smoothing() {
        let engine = FrequencyEngine::with_smoothing(2, 0.0);
        assert!(engine.train(&matrix(vec![vec![0, 1]])).is_err());
    }

    #[test]
    fn test_score_prefers_training_distribution() {
        let engine = FrequencyEngine::new(4);
        let model = engine.train(&matrix(vec![vec![0, 0, 0, 1], vec![0, 0, 1, 1]])).unwrap();

        let familiar = engine.score(&model, &[0, 0, 1]).unwrap();
        let unfamiliar = engine.score(&model, &[3, 3, 2]).unwrap();
        assert!(familiar > unfamiliar);
        assert!(familiar < 0.0);
    }

    #[test]
    fn test_score_unknown_symbol() {
        let engine = FrequencyEngine::new(2);
        let model = engine.train(&matrix(vec![vec![0, 1]])).unwrap();
        assert_eq!(engine.score(&model, &[0, 9]).unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_score_rejects_multi_state_model() {
        let engine = FrequencyEngine::new(2);
        let model = ModelParameters::new(
            Matrix::filled(2, 2, 0.5),
            Matrix::filled(2, 2, 0.5),
            Matrix::filled(1, 2, 0.5),
        )
        .unwrap();
        assert!(matches!(engine.score(&model, &[0]), Err(Error::ModelLoad(_))));
    }
}
