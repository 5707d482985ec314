//! Action dispatch
//!
//! A recognized gesture becomes one abstract input action. Injecting the
//! corresponding key press into the OS is left to an [`ActionDispatcher`]
//! implementation.

use crate::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Abstract input action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputAction {
    NavigatePrevious,
    NavigateNext,
    ZoomIn,
    ZoomOut,
}

impl InputAction {
    /// Key chord a document viewer expects for this action
    pub fn key_chord(&self) -> &'static str {
        match self {
            InputAction::NavigatePrevious => "Left",
            InputAction::NavigateNext => "Right",
            InputAction::ZoomIn => "Ctrl+KP_Add",
            InputAction::ZoomOut => "Ctrl+KP_Subtract",
        }
    }
}

/// Receives actions for recognized gestures
pub trait ActionDispatcher {
    fn dispatch(&mut self, action: InputAction) -> Result<()>;
}

/// Logs each action instead of injecting it
#[derive(Debug, Default)]
pub struct LogDispatcher {
    dispatched: usize,
}

impl LogDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatched(&self) -> usize {
        self.dispatched
    }
}

impl ActionDispatcher for LogDispatcher {
    fn dispatch(&mut self, action: InputAction) -> Result<()> {
        self.dispatched += 1;
        info!("Input action {:?} ({})", action, action.key_chord());
        Ok(())
    }
}

/// Collects actions in memory
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    pub actions: Vec<InputAction>,
}

impl ActionDispatcher for RecordingDispatcher {
    fn dispatch(&mut self, action: InputAction) -> Result<()> {
        self.actions.push(action);
        Ok(())
    }
}
