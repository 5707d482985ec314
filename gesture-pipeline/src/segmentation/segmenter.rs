//! Gesture Segmenter
//!
//! Two-state machine driven by the "hands raised" trigger (either hand above
//! the torso on the image Y axis):
//!
//! ```text
//!            trigger                    trigger && len < G
//!   ┌──────┐ ───────▶ ┌───────────┐ ◀──────────────────┐
//!   │ Idle │          │ Recording │ ───────────────────┘
//!   └──────┘ ◀─────── └───────────┘
//!        !trigger (discard) | len == G (emit window)
//! ```
//!
//! The trigger is an instantaneous comparison with no debouncing, so a hand
//! hovering near torso height can cut a gesture short.

use crate::features::frame::Frame;
use crate::{Error, Result};
use tracing::debug;

/// Segmenter state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmenterState {
    Idle,
    Recording,
}

/// Result of feeding one frame to the segmenter
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentEvent {
    /// Frame had no tracked user; state unchanged
    Ignored,
    /// Idle and not triggered
    Waiting,
    /// Recording started with this frame
    Started,
    /// Frame appended; `len` frames buffered
    Appended { len: usize },
    /// Trigger dropped before the window filled; buffer discarded
    Aborted { discarded: usize },
    /// Window filled; exactly G frames in arrival order
    Completed(Vec<Frame>),
}

/// Hands-raised segmentation state machine
pub struct GestureSegmenter {
    window_size: usize,
    state: SegmenterState,
    buffer: Vec<Frame>,
}

impl GestureSegmenter {
    pub fn new(window_size: usize) -> Result<Self> {
        if window_size == 0 {
            return Err(Error::Sequence("window size must be > 0".to_string()));
        }
        Ok(Self {
            window_size,
            state: SegmenterState::Idle,
            buffer: Vec::with_capacity(window_size),
        })
    }

    pub fn state(&self) -> SegmenterState {
        self.state
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Number of frames currently buffered
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Advance the state machine by one frame
    pub fn push(&mut self, frame: &Frame) -> SegmentEvent {
        if !frame.is_valid() {
            return SegmentEvent::Ignored;
        }

        let triggered = frame.hands_raised();
        match (self.state, triggered) {
            (SegmenterState::Idle, false) => SegmentEvent::Waiting,
            (SegmenterState::Idle, true) => {
                debug!("Hands raised, recording gesture window");
                self.state = SegmenterState::Recording;
                self.buffer.clear();
                self.append(frame).unwrap_or(SegmentEvent::Started)
            }
            (SegmenterState::Recording, true) => {
                let len = self.buffer.len() + 1;
                self.append(frame).unwrap_or(SegmentEvent::Appended { len })
            }
            (SegmenterState::Recording, false) => {
                let discarded = self.buffer.len();
                debug!("Hands lowered after {} frames, discarding window", discarded);
                self.reset();
                SegmentEvent::Aborted { discarded }
            }
        }
    }

    /// Drop any in-flight window and return to `Idle`
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.state = SegmenterState::Idle;
    }

    /// Buffer `frame`; returns the completed window when it fills
    fn append(&mut self, frame: &Frame) -> Option<SegmentEvent> {
        self.buffer.push(*frame);
        if self.buffer.len() < self.window_size {
            return None;
        }

        let window = std::mem::replace(&mut self.buffer, Vec::with_capacity(self.window_size));
        self.state = SegmenterState::Idle;
        debug!("Gesture window complete ({} frames)", window.len());
        Some(SegmentEvent::Completed(window))
    }
}
