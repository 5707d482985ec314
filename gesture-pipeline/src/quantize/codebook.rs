//! Codebook and nearest-centroid search
//!
//! The codebook is loaded once and never mutated. Quantization is a linear
//! scan with strict `<`, so ties resolve to the lowest centroid index.

use crate::features::frame::{Frame, FEATURE_DIM};
use crate::{Error, Result};
use std::path::Path;
use tracing::debug;

/// Observation symbol: index of a centroid in the codebook
pub type Symbol = usize;

/// One codebook entry (also the layout of a training feature row):
/// right vector XYZ, right hand-shape code, left vector XYZ, left hand-shape code
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Centroid(pub [f32; FEATURE_DIM]);

impl Centroid {
    pub fn new(right: [f32; 3], right_shape: f32, left: [f32; 3], left_shape: f32) -> Self {
        Self([
            right[0],
            right[1],
            right[2],
            right_shape,
            left[0],
            left[1],
            left[2],
            left_shape,
        ])
    }

    /// Squared Euclidean distance over all eight features
    #[inline]
    pub fn squared_distance(&self, other: &Centroid) -> f32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }

    pub fn values(&self) -> &[f32; FEATURE_DIM] {
        &self.0
    }
}

impl From<&Frame> for Centroid {
    fn from(frame: &Frame) -> Self {
        Centroid(frame.feature_vector())
    }
}

/// Ordered, immutable set of reference centroids
#[derive(Debug, Clone, Default)]
pub struct Codebook {
    centroids: Vec<Centroid>,
}

impl Codebook {
    pub fn from_centroids(centroids: Vec<Centroid>) -> Self {
        Self { centroids }
    }

    /// Parse whitespace-separated centroid rows
    pub fn parse(text: &str) -> Result<Self> {
        Ok(Self::from_centroids(parse_feature_rows(text)?))
    }

    /// Load a codebook file. An empty file yields an empty codebook; callers
    /// decide whether that is fatal.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let codebook = Self::parse(&content)?;
        debug!("Loaded {} centroids from {:?}", codebook.len(), path);
        Ok(codebook)
    }

    pub fn len(&self) -> usize {
        self.centroids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }

    pub fn centroids(&self) -> &[Centroid] {
        &self.centroids
    }

    pub fn get(&self, index: Symbol) -> Option<&Centroid> {
        self.centroids.get(index)
    }

    /// Index of the centroid closest to `point`
    pub fn nearest(&self, point: &Centroid) -> Result<Symbol> {
        if self.centroids.is_empty() {
            return Err(Error::EmptyCodebook);
        }

        let mut best_index = 0;
        let mut best_distance = f32::INFINITY;
        for (index, centroid) in self.centroids.iter().enumerate() {
            let distance = centroid.squared_distance(point);
            if distance < best_distance {
                best_distance = distance;
                best_index = index;
            }
        }

        Ok(best_index)
    }

    /// Quantize every point independently, preserving order
    pub fn quantize_batch(&self, points: &[Centroid]) -> Result<Vec<Symbol>> {
        if self.centroids.is_empty() {
            return Err(Error::EmptyCodebook);
        }
        points.iter().map(|p| self.nearest(p)).collect()
    }

    /// Quantize a run of frames in arrival order
    pub fn quantize_frames(&self, frames: &[Frame]) -> Result<Vec<Symbol>> {
        let points: Vec<Centroid> = frames.iter().map(Centroid::from).collect();
        self.quantize_batch(&points)
    }
}

/// Parse a text stream of 8-value feature rows.
///
/// Values are read as a flat whitespace-separated token stream, eight per
/// row. A trailing partial row is a parse error.
pub fn parse_feature_rows(text: &str) -> Result<Vec<Centroid>> {
    let values = text
        .split_whitespace()
        .enumerate()
        .map(|(i, token)| {
            token
                .parse::<f32>()
                .map_err(|e| Error::Parse(format!("token {} ({:?}): {}", i, token, e)))
        })
        .collect::<Result<Vec<f32>>>()?;

    if values.len() % FEATURE_DIM != 0 {
        return Err(Error::Parse(format!(
            "{} values is not a whole number of {}-value rows",
            values.len(),
            FEATURE_DIM
        )));
    }

    Ok(values
        .chunks_exact(FEATURE_DIM)
        .map(|chunk| {
            let mut row = [0.0; FEATURE_DIM];
            row.copy_from_slice(chunk);
            Centroid(row)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(v: f32) -> Centroid {
        Centroid([v; FEATURE_DIM])
    }

    fn grid_codebook() -> Codebook {
        Codebook::from_centroids(vec![point(0.0), point(10.0), point(20.0), point(30.0)])
    }

    #[test]
    fn test_empty_codebook_is_an_error() {
        let codebook = Codebook::default();
        assert!(matches!(codebook.nearest(&point(1.0)), Err(Error::EmptyCodebook)));
        assert!(matches!(codebook.quantize_batch(&[]), Err(Error::EmptyCodebook)));
    }

    #[test]
    fn test_nearest_picks_closest() {
        let codebook = grid_codebook();
        assert_eq!(codebook.nearest(&point(1.0)).unwrap(), 0);
        assert_eq!(codebook.nearest(&point(12.0)).unwrap(), 1);
        assert_eq!(codebook.nearest(&point(26.0)).unwrap(), 3);
        assert_eq!(codebook.nearest(&point(500.0)).unwrap(), 3);
    }

    #[test]
    fn test_nearest_single_feature_offset() {
        let codebook = Codebook::from_centroids(vec![
            Centroid::new([0.0, 0.0, 0.0], 0.0, [0.0, 0.0, 0.0], 0.0),
            Centroid::new([0.0, 0.0, 0.0], 3.0, [0.0, 0.0, 0.0], 0.0),
        ]);
        let query = Centroid::new([0.0, 0.0, 0.0], 2.0, [0.0, 0.0, 0.0], 0.0);
        assert_eq!(codebook.nearest(&query).unwrap(), 1);
    }

    #[test]
    fn test_tie_breaks_to_lowest_index() {
        let codebook = Codebook::from_centroids(vec![point(30.0), point(0.0), point(10.0)]);
        // 5.0 is equidistant from 0.0 (index 1) and 10.0 (index 2)
        assert_eq!(codebook.nearest(&point(5.0)).unwrap(), 1);

        let duplicated = Codebook::from_centroids(vec![point(7.0), point(7.0)]);
        assert_eq!(duplicated.nearest(&point(7.0)).unwrap(), 0);
    }

    #[test]
    fn test_far_points_still_quantize() {
        let codebook = Codebook::from_centroids(vec![point(1.0e6), point(2.0e6)]);
        assert_eq!(codebook.nearest(&point(1.9e6)).unwrap(), 1);
    }

    #[test]
    fn test_quantize_batch_preserves_order() {
        let codebook = grid_codebook();
        let points = vec![point(29.0), point(0.5), point(11.0), point(19.0)];
        assert_eq!(codebook.quantize_batch(&points).unwrap(), vec![3, 0, 1, 2]);
    }

    #[test]
    fn test_parse_rows_across_lines() {
        let text = "0 0 0 1 0 0 0 -1\n0.5 -0.25 12 2 1 1 1 3\n";
        let rows = parse_feature_rows(text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], Centroid::new([0.5, -0.25, 12.0], 2.0, [1.0, 1.0, 1.0], 3.0));
    }

    #[test]
    fn test_parse_rejects_partial_row() {
        let text = "0 0 0 1 0 0 0 -1\n1 2 3\n";
        assert!(matches!(parse_feature_rows(text), Err(Error::Parse(_))));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_feature_rows("0 0 0 x 0 0 0 0").is_err());
    }

    #[test]
    fn test_parse_empty_text() {
        let codebook = Codebook::parse("  \n").unwrap();
        assert!(codebook.is_empty());
    }
}
