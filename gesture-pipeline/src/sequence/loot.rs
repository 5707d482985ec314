//! Leave-One-Out Trimming (LOOT)
//!
//! Multiplies scarce training data: every full window of length G yields G
//! sub-sequences of length G-1, the i-th one missing position i. For an N×G
//! matrix the augmented matrix is (N·G)×(G-1) with
//! `augmented[r * G + i] == row r without element i`.

use super::matrix::ObservationMatrix;
use super::Sequence;
use crate::quantize::Symbol;
use crate::{Error, Result};

/// All single-deletion variants of `sequence`, in deletion-index order
pub fn loot_sequence(sequence: &[Symbol]) -> Vec<Sequence> {
    (0..sequence.len())
        .map(|skip| {
            let mut trimmed = Vec::with_capacity(sequence.len().saturating_sub(1));
            trimmed.extend_from_slice(&sequence[..skip]);
            trimmed.extend_from_slice(&sequence[skip + 1..]);
            trimmed
        })
        .collect()
}

/// Augment every row of `matrix`
pub fn loot_matrix(matrix: &ObservationMatrix) -> Result<ObservationMatrix> {
    let window = matrix.row_len();
    if window < 2 {
        return Err(Error::Sequence(format!(
            "LOOT needs windows of at least 2 symbols, got {}",
            window
        )));
    }

    let mut augmented = ObservationMatrix::with_capacity(window - 1, matrix.row_count() * window);
    for row in matrix.rows() {
        for trimmed in loot_sequence(row) {
            augmented.push_row(&trimmed)?;
        }
    }

    Ok(augmented)
}
