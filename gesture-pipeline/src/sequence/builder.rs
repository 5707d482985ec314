//! Sequence Builder
//!
//! Two entry points over the same quantization core:
//! - batch: a flat run of feature rows cut into contiguous, non-overlapping
//!   windows of length G (a trailing partial window is dropped)
//! - real-time: exactly one buffered window of G frames

use super::matrix::ObservationMatrix;
use super::Sequence;
use crate::features::frame::Frame;
use crate::quantize::{parse_feature_rows, Centroid, Codebook};
use crate::{Error, Result};
use std::path::Path;
use tracing::debug;

/// Gesture window length of the reference configuration
pub const DEFAULT_WINDOW_SIZE: usize = 40;

/// Quantizes windows of features against a borrowed codebook
pub struct SequenceBuilder<'a> {
    codebook: &'a Codebook,
    window_size: usize,
}

impl<'a> SequenceBuilder<'a> {
    pub fn new(codebook: &'a Codebook, window_size: usize) -> Result<Self> {
        if window_size == 0 {
            return Err(Error::Sequence("window size must be > 0".to_string()));
        }
        Ok(Self {
            codebook,
            window_size,
        })
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Size of the symbol alphabet this builder emits
    pub fn symbol_count(&self) -> usize {
        self.codebook.len()
    }

    /// Cut `rows` into `rows.len() / G` windows and quantize each row
    pub fn build_batch(&self, rows: &[Centroid]) -> Result<ObservationMatrix> {
        if self.codebook.is_empty() {
            return Err(Error::EmptyCodebook);
        }

        let window_count = rows.len() / self.window_size;
        let used = window_count * self.window_size;
        if used < rows.len() {
            debug!(
                "Dropping {} trailing rows that do not fill a window of {}",
                rows.len() - used,
                self.window_size
            );
        }

        let symbols = self.codebook.quantize_batch(&rows[..used])?;
        let mut matrix = ObservationMatrix::with_capacity(self.window_size, window_count);
        for window in symbols.chunks_exact(self.window_size) {
            matrix.push_row(window)?;
        }

        Ok(matrix)
    }

    /// Parse a feature-row file and build its observation matrix
    pub fn build_from_file(&self, path: &Path) -> Result<ObservationMatrix> {
        let content = std::fs::read_to_string(path)?;
        let rows = parse_feature_rows(&content)?;
        let matrix = self.build_batch(&rows)?;
        debug!(
            "Built {} sequences from {} rows in {:?}",
            matrix.row_count(),
            rows.len(),
            path
        );
        Ok(matrix)
    }

    /// Quantize one complete real-time window, in arrival order
    pub fn build_realtime(&self, frames: &[Frame]) -> Result<Sequence> {
        if frames.len() != self.window_size {
            return Err(Error::Sequence(format!(
                "partial window: {} frames, expected {}",
                frames.len(),
                self.window_size
            )));
        }
        if frames.iter().any(|f| !f.is_valid()) {
            return Err(Error::InvalidFrame(
                "window contains a frame without a tracked user".to_string(),
            ));
        }

        self.codebook.quantize_frames(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FeatureExtractor, HandShape, JointReport, Point3};
    use crate::features::frame::FEATURE_DIM;

    fn codebook() -> Codebook {
        Codebook::from_centroids((0..4).map(|i| Centroid([i as f32 * 10.0; FEATURE_DIM])).collect())
    }

    fn row(v: f32) -> Centroid {
        Centroid([v; FEATURE_DIM])
    }

    #[test]
    fn test_zero_window_rejected() {
        let cb = codebook();
        assert!(SequenceBuilder::new(&cb, 0).is_err());
    }

    #[test]
    fn test_batch_windowing_drops_remainder() {
        let cb = codebook();
        let builder = SequenceBuilder::new(&cb, 40).unwrap();
        let rows: Vec<Centroid> = (0..100).map(|i| row((i / 40) as f32 * 10.0)).collect();

        let matrix = builder.build_batch(&rows).unwrap();
        assert_eq!(matrix.row_count(), 2);
        assert_eq!(matrix.row_len(), 40);
        assert!(matrix.row(0).unwrap().iter().all(|&s| s == 0));
        assert!(matrix.row(1).unwrap().iter().all(|&s| s == 1));
    }

    #[test]
    fn test_batch_preserves_row_order() {
        let cb = codebook();
        let builder = SequenceBuilder::new(&cb, 4).unwrap();
        let rows = vec![row(30.0), row(0.0), row(20.0), row(10.0), row(10.0), row(10.0), row(0.0), row(0.0)];

        let matrix = builder.build_batch(&rows).unwrap();
        assert_eq!(matrix.row(0), Some(&[3, 0, 2, 1][..]));
        assert_eq!(matrix.row(1), Some(&[1, 1, 0, 0][..]));
    }

    #[test]
    fn test_batch_shorter_than_window() {
        let cb = codebook();
        let builder = SequenceBuilder::new(&cb, 40).unwrap();
        let matrix = builder.build_batch(&vec![row(0.0); 39]).unwrap();
        assert!(matrix.is_empty());
    }

    #[test]
    fn test_batch_empty_codebook() {
        let cb = Codebook::default();
        let builder = SequenceBuilder::new(&cb, 2).unwrap();
        assert!(matches!(builder.build_batch(&[row(0.0), row(1.0)]), Err(Error::EmptyCodebook)));
    }

    #[test]
    fn test_build_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("rows.txt");
        let mut text = String::new();
        for i in 0..5 {
            let v = (i % 4) as f32 * 10.0;
            text.push_str(&format!("{v} {v} {v} {v} {v} {v} {v} {v}\n"));
        }
        std::fs::write(&path, text).unwrap();

        let cb = codebook();
        let builder = SequenceBuilder::new(&cb, 2).unwrap();
        let matrix = builder.build_from_file(&path).unwrap();
        assert_eq!(matrix.row_count(), 2);
        assert_eq!(matrix.as_slice(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_realtime_requires_full_window() {
        let cb = codebook();
        let builder = SequenceBuilder::new(&cb, 3).unwrap();
        let extractor = FeatureExtractor::new();
        let joints = JointReport {
            right_hand: Point3::new(0.0, 0.0, 0.0),
            left_hand: Point3::new(0.0, 0.0, 0.0),
            torso: Point3::new(0.0, 0.0, 0.0),
            head: Point3::new(0.0, -10.0, 0.0),
        };
        let frame = extractor
            .extract(Some(&joints), HandShape::Advance, HandShape::Advance)
            .unwrap();

        assert!(matches!(builder.build_realtime(&[frame, frame]), Err(Error::Sequence(_))));
        assert_eq!(builder.build_realtime(&[frame, frame, frame]).unwrap(), vec![0, 0, 0]);
        assert!(builder.build_realtime(&[frame, Frame::no_user(), frame]).is_err());
    }
}
