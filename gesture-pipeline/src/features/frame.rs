//! Frame and joint types
//!
//! A [`Frame`] is the immutable snapshot produced once per sensor tick.

use serde::{Deserialize, Serialize};

/// Number of features per frame (and per codebook centroid)
pub const FEATURE_DIM: usize = 8;

/// A joint position in sensor projective space (image X/Y, depth Z)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Component-wise difference `self - other`
    pub fn sub(&self, other: &Point3) -> Point3 {
        Point3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    /// Check that every component is finite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Discrete hand shape reported by the hand-shape classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HandShape {
    Advance,
    Return,
    ZoomIn,
    ZoomOut,
    /// Classifier was not confident enough, or no patch was available
    #[default]
    Undefined,
    /// Classifier rejected its input
    Error,
}

/// Shape, numeric feature code, display label
const HAND_SHAPE_TABLE: [(HandShape, f32, &str); 6] = [
    (HandShape::Advance, 0.0, "Advance"),
    (HandShape::Return, 1.0, "Return"),
    (HandShape::ZoomIn, 2.0, "Zoom-In"),
    (HandShape::ZoomOut, 3.0, "Zoom-Out"),
    (HandShape::Undefined, -1.0, "Undefined"),
    (HandShape::Error, -2.0, "Error"),
];

impl HandShape {
    /// Map a classifier output index to a shape. Indices past the four
    /// defined shapes are `Undefined`.
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => HandShape::Advance,
            1 => HandShape::Return,
            2 => HandShape::ZoomIn,
            3 => HandShape::ZoomOut,
            _ => HandShape::Undefined,
        }
    }

    /// Numeric code used as the hand-shape feature
    pub fn code(&self) -> f32 {
        self.entry().1
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        self.entry().2
    }

    fn entry(&self) -> &'static (HandShape, f32, &'static str) {
        // Every variant has exactly one row
        HAND_SHAPE_TABLE
            .iter()
            .find(|(shape, _, _)| shape == self)
            .unwrap_or(&HAND_SHAPE_TABLE[4])
    }
}

impl std::fmt::Display for HandShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Joint positions for one tracked user at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointReport {
    pub right_hand: Point3,
    pub left_hand: Point3,
    pub torso: Point3,
    pub head: Point3,
}

/// One instant's geometric snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Raw joint positions
    pub joints: JointReport,
    /// Torso-head distance on the image plane
    pub scale: f32,
    /// (right hand - torso), X/Y divided by `scale`
    pub right_vector: Point3,
    /// (left hand - torso), X/Y divided by `scale`
    pub left_vector: Point3,
    pub right_shape: HandShape,
    pub left_shape: HandShape,
    valid: bool,
}

impl Frame {
    pub(crate) fn new(
        joints: JointReport,
        scale: f32,
        right_vector: Point3,
        left_vector: Point3,
        right_shape: HandShape,
        left_shape: HandShape,
    ) -> Self {
        Self {
            joints,
            scale,
            right_vector,
            left_vector,
            right_shape,
            left_shape,
            valid: true,
        }
    }

    /// Placeholder for a tick with no tracked user
    pub fn no_user() -> Self {
        let origin = Point3::default();
        Self {
            joints: JointReport {
                right_hand: origin,
                left_hand: origin,
                torso: origin,
                head: origin,
            },
            scale: 0.0,
            right_vector: origin,
            left_vector: origin,
            right_shape: HandShape::Undefined,
            left_shape: HandShape::Undefined,
            valid: false,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Either hand is above (numerically less than) the torso on the image Y axis
    pub fn hands_raised(&self) -> bool {
        let torso_y = self.joints.torso.y;
        self.joints.right_hand.y < torso_y || self.joints.left_hand.y < torso_y
    }

    /// The 8-value feature vector in codebook layout
    pub fn feature_vector(&self) -> [f32; FEATURE_DIM] {
        [
            self.right_vector.x,
            self.right_vector.y,
            self.right_vector.z,
            self.right_shape.code(),
            self.left_vector.x,
            self.left_vector.y,
            self.left_vector.z,
            self.left_shape.code(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hand_shape_codes() {
        assert_eq!(HandShape::Advance.code(), 0.0);
        assert_eq!(HandShape::ZoomOut.code(), 3.0);
        assert_eq!(HandShape::Undefined.code(), -1.0);
        assert_eq!(HandShape::Error.code(), -2.0);
    }

    #[test]
    fn test_hand_shape_from_index() {
        assert_eq!(HandShape::from_index(2), HandShape::ZoomIn);
        assert_eq!(HandShape::from_index(4), HandShape::Undefined);
    }

    #[test]
    fn test_hand_shape_labels() {
        assert_eq!(HandShape::ZoomIn.to_string(), "Zoom-In");
        assert_eq!(HandShape::Undefined.label(), "Undefined");
    }

    #[test]
    fn test_hand_shape_serde() {
        let json = serde_json::to_string(&HandShape::ZoomOut).unwrap();
        assert_eq!(json, "\"zoom_out\"");
        let shape: HandShape = serde_json::from_str("\"advance\"").unwrap();
        assert_eq!(shape, HandShape::Advance);
    }

    #[test]
    fn test_no_user_frame_is_invalid() {
        let frame = Frame::no_user();
        assert!(!frame.is_valid());
        assert!(!frame.hands_raised());
    }
}
