//! Gesture classes and their metadata

use crate::dispatch::InputAction;
use serde::{Deserialize, Serialize};

/// The fixed set of recognized gestures, in registration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureClass {
    Advance,
    Return,
    ZoomIn,
    ZoomOut,
}

/// Everything keyed on a gesture class lives in one row here
struct GestureInfo {
    class: GestureClass,
    label: &'static str,
    slug: &'static str,
    model_file: &'static str,
    training_file: &'static str,
    action: InputAction,
}

const GESTURE_TABLE: [GestureInfo; 4] = [
    GestureInfo {
        class: GestureClass::Advance,
        label: "Advance",
        slug: "advance",
        model_file: "advance.hmm",
        training_file: "advanceDataTrain.txt",
        action: InputAction::NavigateNext,
    },
    GestureInfo {
        class: GestureClass::Return,
        label: "Return",
        slug: "return",
        model_file: "return.hmm",
        training_file: "returnDataTrain.txt",
        action: InputAction::NavigatePrevious,
    },
    GestureInfo {
        class: GestureClass::ZoomIn,
        label: "Zoom-In",
        slug: "zoom_in",
        model_file: "zoomIn.hmm",
        training_file: "zoomInDataTrain.txt",
        action: InputAction::ZoomIn,
    },
    GestureInfo {
        class: GestureClass::ZoomOut,
        label: "Zoom-Out",
        slug: "zoom_out",
        model_file: "zoomOut.hmm",
        training_file: "zoomOutDataTrain.txt",
        action: InputAction::ZoomOut,
    },
];

impl GestureClass {
    pub const ALL: [GestureClass; 4] = [
        GestureClass::Advance,
        GestureClass::Return,
        GestureClass::ZoomIn,
        GestureClass::ZoomOut,
    ];

    pub const COUNT: usize = 4;

    /// Position in [`GestureClass::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn label(&self) -> &'static str {
        self.info().label
    }

    pub fn slug(&self) -> &'static str {
        self.info().slug
    }

    /// File name of the persisted model
    pub fn model_file(&self) -> &'static str {
        self.info().model_file
    }

    /// File name of the per-gesture training rows
    pub fn training_file(&self) -> &'static str {
        self.info().training_file
    }

    /// Input action dispatched when this gesture is recognized
    pub fn action(&self) -> InputAction {
        self.info().action
    }

    fn info(&self) -> &'static GestureInfo {
        let info = &GESTURE_TABLE[self.index()];
        debug_assert_eq!(info.class, *self);
        info
    }
}

impl std::fmt::Display for GestureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
