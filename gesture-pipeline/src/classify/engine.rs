//! Sequence-model engine contract and model persistence
//!
//! A model is three dense matrices (transition, emission, initial). On disk
//! each matrix is written as its row and column counts followed by every
//! value row-major, whitespace-separated:
//!
//! ```text
//! 9	9
//! 0.1	0.2	...
//! 9	16
//! ...
//! 1	9
//! ...
//! ```

use crate::quantize::Symbol;
use crate::sequence::ObservationMatrix;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

/// Train/score capability of a per-class sequence model engine
pub trait SequenceModelEngine {
    /// Fit a model to every row of `sequences`
    fn train(&self, sequences: &ObservationMatrix) -> Result<ModelParameters>;

    /// Log-likelihood of `sequence` under `model`
    fn score(&self, model: &ModelParameters, sequence: &[Symbol]) -> Result<f64>;
}

/// Dense row-major matrix of f64
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::ModelLoad(format!(
                "{}x{} matrix needs {} values, got {}",
                rows,
                cols,
                rows * cols,
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col).copied()
    }

    pub fn row(&self, row: usize) -> Option<&[f64]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.cols;
        self.data.get(start..start + self.cols)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    fn write_text(&self, out: &mut String) {
        let _ = writeln!(out, "{}\t{}", self.rows, self.cols);
        for value in &self.data {
            // Display for f64 is the shortest string that parses back to the same bits
            let _ = write!(out, "{}\t", value);
        }
        out.push('\n');
    }

    fn read_text<'a>(tokens: &mut impl Iterator<Item = &'a str>, name: &str) -> Result<Self> {
        let rows = next_dimension(tokens, name)?;
        let cols = next_dimension(tokens, name)?;
        let data = (0..rows * cols)
            .map(|i| {
                let token = tokens.next().ok_or_else(|| {
                    Error::ModelLoad(format!("{} matrix truncated at value {}", name, i))
                })?;
                token
                    .parse::<f64>()
                    .map_err(|e| Error::ModelLoad(format!("{} value {:?}: {}", name, token, e)))
            })
            .collect::<Result<Vec<f64>>>()?;
        Matrix::new(rows, cols, data)
    }
}

fn next_dimension<'a>(tokens: &mut impl Iterator<Item = &'a str>, name: &str) -> Result<usize> {
    let token = tokens
        .next()
        .ok_or_else(|| Error::ModelLoad(format!("{} matrix header missing", name)))?;
    token
        .parse::<usize>()
        .map_err(|e| Error::ModelLoad(format!("{} dimension {:?}: {}", name, token, e)))
}

/// Parameters of one gesture model, opaque to everything but the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    /// State-to-state transition probabilities (S×S)
    pub transition: Matrix,
    /// Per-state symbol emission probabilities (S×K)
    pub emission: Matrix,
    /// Initial state distribution (1×S)
    pub initial: Matrix,
}

impl ModelParameters {
    /// Assemble a model, checking that the three shapes agree
    pub fn new(transition: Matrix, emission: Matrix, initial: Matrix) -> Result<Self> {
        let states = transition.rows();
        if transition.cols() != states {
            return Err(Error::ModelLoad(format!(
                "transition matrix must be square, got {}x{}",
                transition.rows(),
                transition.cols()
            )));
        }
        if emission.rows() != states {
            return Err(Error::ModelLoad(format!(
                "emission matrix has {} rows for {} states",
                emission.rows(),
                states
            )));
        }
        if initial.rows() != 1 || initial.cols() != states {
            return Err(Error::ModelLoad(format!(
                "initial matrix must be 1x{}, got {}x{}",
                states,
                initial.rows(),
                initial.cols()
            )));
        }
        Ok(Self {
            transition,
            emission,
            initial,
        })
    }

    pub fn state_count(&self) -> usize {
        self.transition.rows()
    }

    pub fn symbol_count(&self) -> usize {
        self.emission.cols()
    }

    /// Render in the persisted text format
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.transition.write_text(&mut out);
        self.emission.write_text(&mut out);
        self.initial.write_text(&mut out);
        out
    }

    /// Parse the persisted text format
    pub fn parse(text: &str) -> Result<Self> {
        let mut tokens = text.split_whitespace();
        let transition = Matrix::read_text(&mut tokens, "transition")?;
        let emission = Matrix::read_text(&mut tokens, "emission")?;
        let initial = Matrix::read_text(&mut tokens, "initial")?;
        if let Some(extra) = tokens.next() {
            return Err(Error::ModelLoad(format!(
                "unexpected trailing data {:?}",
                extra
            )));
        }
        Self::new(transition, emission, initial)
    }

    /// Load a model file; a missing or corrupt file is a [`Error::ModelLoad`]
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ModelLoad(format!("{:?}: {}", path, e)))?;
        Self::parse(&content).map_err(|e| match e {
            Error::ModelLoad(msg) => Error::ModelLoad(format!("{:?}: {}", path, msg)),
            other => other,
        })
    }

    /// Write the model, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_text())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_model() -> ModelParameters {
        ModelParameters::new(
            Matrix::new(2, 2, vec![0.7, 0.3, 0.1 + 0.2, 1.0 / 3.0]).unwrap(),
            Matrix::new(2, 3, vec![0.5, 0.25, 0.25, 1e-300, 0.123456789012345678, 0.0]).unwrap(),
            Matrix::new(1, 2, vec![0.6, 0.4]).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_matrix_shape_checked() {
        assert!(Matrix::new(2, 2, vec![1.0; 3]).is_err());
        let m = Matrix::new(2, 3, (0..6).map(f64::from).collect()).unwrap();
        assert_eq!(m.get(1, 2), Some(5.0));
        assert_eq!(m.get(2, 0), None);
        assert_eq!(m.row(1), Some(&[3.0, 4.0, 5.0][..]));
    }

    #[test]
    fn test_model_shapes_checked() {
        let result = ModelParameters::new(
            Matrix::filled(2, 2, 0.5),
            Matrix::filled(3, 4, 0.25),
            Matrix::filled(1, 2, 0.5),
        );
        assert!(matches!(result, Err(Error::ModelLoad(_))));

        let result = ModelParameters::new(
            Matrix::filled(2, 2, 0.5),
            Matrix::filled(2, 4, 0.25),
            Matrix::filled(2, 1, 0.5),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_text_format_layout() {
        let text = sample_model().to_text();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("2\t2"));
        lines.next();
        assert_eq!(lines.next(), Some("2\t3"));
        lines.next();
        assert_eq!(lines.next(), Some("1\t2"));
        assert_eq!(lines.next(), Some("0.6\t0.4\t"));
    }

    #[test]
    fn test_roundtrip_is_bit_identical() {
        let model = sample_model();
        let parsed = ModelParameters::parse(&model.to_text()).unwrap();

        for (a, b) in [
            (&model.transition, &parsed.transition),
            (&model.emission, &parsed.emission),
            (&model.initial, &parsed.initial),
        ] {
            assert_eq!(a.rows(), b.rows());
            assert_eq!(a.cols(), b.cols());
            for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
                assert_eq!(x.to_bits(), y.to_bits());
            }
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("models").join("zoomIn.hmm");
        let model = sample_model();

        model.save(&path).unwrap();
        assert!(path.exists());
        assert_eq!(ModelParameters::load(&path).unwrap(), model);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = ModelParameters::load(&dir.path().join("missing.hmm"));
        assert!(matches!(result, Err(Error::ModelLoad(_))));
    }

    #[test]
    fn test_parse_corrupt() {
        assert!(ModelParameters::parse("").is_err());
        assert!(ModelParameters::parse("2 2 0.5 0.5 0.5").is_err());
        assert!(ModelParameters::parse("1 1 1.0 1 2 0.5 abc 1 1 1.0").is_err());

        let mut text = sample_model().to_text();
        text.push_str("42\n");
        assert!(matches!(ModelParameters::parse(&text), Err(Error::ModelLoad(_))));
    }
}
