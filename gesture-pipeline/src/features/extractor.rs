//! Feature Extraction
//!
//! Normalizes hand positions against the torso so the descriptor does not
//! depend on where the user stands or how far they are from the sensor:
//!
//! - scale = |torso - head| on the image plane
//! - hand vector = (hand - torso), X/Y divided by scale, Z in raw depth units

use super::frame::{Frame, HandShape, JointReport, Point3};
use crate::{Error, Result};

/// Default smallest usable torso-head distance (projective pixels)
pub const DEFAULT_MIN_SCALE: f32 = 1.0;

/// Pure joint-to-frame transform
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    /// Scales below this are rejected as degenerate skeletons
    pub min_scale: f32,
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self {
            min_scale: DEFAULT_MIN_SCALE,
        }
    }

    pub fn with_min_scale(min_scale: f32) -> Self {
        Self { min_scale }
    }

    /// Build a frame from one tick's joints and hand shapes.
    ///
    /// Returns [`Error::InvalidFrame`] when no tracked user supplied joints,
    /// when a coordinate is not finite, or when the torso-head distance is too
    /// small to normalize by.
    pub fn extract(
        &self,
        joints: Option<&JointReport>,
        right_shape: HandShape,
        left_shape: HandShape,
    ) -> Result<Frame> {
        let joints = joints.ok_or_else(|| Error::InvalidFrame("no tracked user".to_string()))?;

        let all_finite = [joints.right_hand, joints.left_hand, joints.torso, joints.head]
            .iter()
            .all(Point3::is_finite);
        if !all_finite {
            return Err(Error::InvalidFrame("non-finite joint coordinate".to_string()));
        }

        let scale = image_plane_distance(&joints.torso, &joints.head);
        if scale < self.min_scale {
            return Err(Error::InvalidFrame(format!(
                "torso-head distance {:.3} below minimum {:.3}",
                scale, self.min_scale
            )));
        }

        let right_vector = normalize(joints.right_hand.sub(&joints.torso), scale);
        let left_vector = normalize(joints.left_hand.sub(&joints.torso), scale);

        Ok(Frame::new(
            *joints,
            scale,
            right_vector,
            left_vector,
            right_shape,
            left_shape,
        ))
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn image_plane_distance(a: &Point3, b: &Point3) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Depth is already in sensor units, so only X/Y are scaled
fn normalize(v: Point3, scale: f32) -> Point3 {
    Point3::new(v.x / scale, v.y / scale, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joints(right: (f32, f32, f32), left: (f32, f32, f32)) -> JointReport {
        JointReport {
            right_hand: Point3::new(right.0, right.1, right.2),
            left_hand: Point3::new(left.0, left.1, left.2),
            torso: Point3::new(320.0, 300.0, 2000.0),
            head: Point3::new(320.0, 200.0, 2000.0),
        }
    }

    #[test]
    fn test_no_user_is_invalid() {
        let extractor = FeatureExtractor::new();
        let result = extractor.extract(None, HandShape::Undefined, HandShape::Undefined);
        assert!(matches!(result, Err(Error::InvalidFrame(_))));
    }

    #[test]
    fn test_vectors_are_scaled_on_image_plane_only() {
        let extractor = FeatureExtractor::new();
        let report = joints((420.0, 250.0, 1800.0), (220.0, 350.0, 2100.0));

        let frame = extractor
            .extract(Some(&report), HandShape::Advance, HandShape::ZoomIn)
            .unwrap();

        assert!(frame.is_valid());
        assert_eq!(frame.scale, 100.0);
        assert_eq!(frame.right_vector, Point3::new(1.0, -0.5, -200.0));
        assert_eq!(frame.left_vector, Point3::new(-1.0, 0.5, 100.0));
        assert_eq!(frame.right_shape, HandShape::Advance);
    }

    #[test]
    fn test_translation_invariance() {
        let extractor = FeatureExtractor::new();
        let a = joints((420.0, 250.0, 1800.0), (220.0, 350.0, 2100.0));
        let mut b = a;
        for p in [&mut b.right_hand, &mut b.left_hand, &mut b.torso, &mut b.head] {
            p.x += 50.0;
            p.y -= 30.0;
        }

        let fa = extractor.extract(Some(&a), HandShape::Undefined, HandShape::Undefined).unwrap();
        let fb = extractor.extract(Some(&b), HandShape::Undefined, HandShape::Undefined).unwrap();
        assert_eq!(fa.feature_vector(), fb.feature_vector());
    }

    #[test]
    fn test_degenerate_scale_is_invalid() {
        let extractor = FeatureExtractor::new();
        let mut report = joints((420.0, 250.0, 1800.0), (220.0, 350.0, 2100.0));
        report.head = report.torso;

        let result = extractor.extract(Some(&report), HandShape::Undefined, HandShape::Undefined);
        assert!(matches!(result, Err(Error::InvalidFrame(_))));
    }

    #[test]
    fn test_non_finite_is_invalid() {
        let extractor = FeatureExtractor::new();
        let report = joints((f32::NAN, 250.0, 1800.0), (220.0, 350.0, 2100.0));

        let result = extractor.extract(Some(&report), HandShape::Undefined, HandShape::Undefined);
        assert!(result.is_err());
    }

    #[test]
    fn test_feature_vector_layout() {
        let extractor = FeatureExtractor::new();
        let report = joints((420.0, 250.0, 1800.0), (220.0, 350.0, 2100.0));
        let frame = extractor
            .extract(Some(&report), HandShape::Return, HandShape::Undefined)
            .unwrap();

        assert_eq!(
            frame.feature_vector(),
            [1.0, -0.5, -200.0, 1.0, -1.0, 0.5, 100.0, -1.0]
        );
    }

    #[test]
    fn test_hands_raised_trigger() {
        let extractor = FeatureExtractor::new();
        let raised = joints((420.0, 250.0, 1800.0), (220.0, 350.0, 2100.0));
        let lowered = joints((420.0, 350.0, 1800.0), (220.0, 300.0, 2100.0));

        let f = extractor.extract(Some(&raised), HandShape::Undefined, HandShape::Undefined).unwrap();
        assert!(f.hands_raised());
        let f = extractor.extract(Some(&lowered), HandShape::Undefined, HandShape::Undefined).unwrap();
        assert!(!f.hands_raised());
    }
}
