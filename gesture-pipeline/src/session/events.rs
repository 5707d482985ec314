//! Sensor ticks and user-tracking events
//!
//! A depth-sensor middleware reports user lifecycle events alongside the
//! per-tick skeleton. Ticks arrive here already decoded, one JSON object per
//! line:
//!
//! ```text
//! {"events":[{"type":"new_user","user":1}],"joints":null}
//! {"joints":{"right_hand":{"x":400,"y":150,"z":1900}, ...},"right_shape":"zoom_in"}
//! ```

use crate::features::{HandShape, JointReport};
use crate::hand_shape::HandPatch;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, info, warn};

/// Sensor-side user identifier
pub type UserId = u32;

/// User lifecycle notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SensorEvent {
    NewUser { user: UserId },
    LostUser { user: UserId },
    PoseDetected { user: UserId },
    CalibrationStarted { user: UserId },
    CalibrationCompleted { user: UserId, success: bool },
}

/// Everything the sensor delivered for one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorTick {
    #[serde(default)]
    pub events: Vec<SensorEvent>,
    /// Joints of the tracked user; `None` when nobody is tracked
    #[serde(default)]
    pub joints: Option<JointReport>,
    /// Shape labels supplied by an upstream classifier
    #[serde(default)]
    pub right_shape: Option<HandShape>,
    #[serde(default)]
    pub left_shape: Option<HandShape>,
    /// Raw patches for an in-process classifier
    #[serde(default)]
    pub right_patch: Option<HandPatch>,
    #[serde(default)]
    pub left_patch: Option<HandPatch>,
}

/// Pull-based source of sensor ticks
pub trait SkeletonSource {
    /// Next tick, or `None` at end of stream.
    ///
    /// A malformed tick is an [`Error::Sensor`]; the stream stays usable.
    fn next_tick(&mut self) -> Result<Option<SensorTick>>;
}

/// Reads one JSON-encoded [`SensorTick`] per line; blank lines are skipped
pub struct JsonLinesSource<R> {
    reader: R,
    line: Vec<u8>,
    line_number: usize,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            line_number: 0,
        }
    }

    /// Lines consumed so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl JsonLinesSource<std::io::BufReader<std::fs::File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| Error::Sensor(format!("{:?}: {}", path, e)))?;
        Ok(Self::new(std::io::BufReader::new(file)))
    }
}

impl<R: BufRead> SkeletonSource for JsonLinesSource<R> {
    fn next_tick(&mut self) -> Result<Option<SensorTick>> {
        loop {
            self.line.clear();
            if self.reader.read_until(b'\n', &mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let text = std::str::from_utf8(&self.line)
                .map_err(|e| Error::Sensor(format!("line {}: {}", self.line_number, e)))?;
            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }
            return serde_json::from_str(trimmed)
                .map(Some)
                .map_err(|e| Error::Sensor(format!("line {}: {}", self.line_number, e)));
        }
    }
}

/// Where a user is in the pose/calibration handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserState {
    AwaitingPose,
    Calibrating,
    Tracking,
}

/// Tracks users through detection, calibration and tracking
#[derive(Debug, Default)]
pub struct UserTracker {
    users: BTreeMap<UserId, UserState>,
}

impl UserTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &SensorEvent) {
        match *event {
            SensorEvent::NewUser { user } => {
                info!("New user {}", user);
                self.users.insert(user, UserState::AwaitingPose);
            }
            SensorEvent::LostUser { user } => {
                info!("Lost user {}", user);
                self.users.remove(&user);
            }
            SensorEvent::PoseDetected { user } => {
                debug!("Pose detected for user {}", user);
                self.users.insert(user, UserState::Calibrating);
            }
            SensorEvent::CalibrationStarted { user } => {
                debug!("Calibration started for user {}", user);
                self.users.insert(user, UserState::Calibrating);
            }
            SensorEvent::CalibrationCompleted { user, success: true } => {
                info!("Calibration complete, tracking user {}", user);
                self.users.insert(user, UserState::Tracking);
            }
            SensorEvent::CalibrationCompleted { user, success: false } => {
                warn!("Calibration failed for user {}", user);
                self.users.insert(user, UserState::AwaitingPose);
            }
        }
    }

    pub fn state(&self, user: UserId) -> Option<UserState> {
        self.users.get(&user).copied()
    }

    /// Users currently being tracked, ascending
    pub fn tracked_users(&self) -> Vec<UserId> {
        self.users
            .iter()
            .filter(|(_, s)| **s == UserState::Tracking)
            .map(|(u, _)| *u)
            .collect()
    }

    pub fn is_tracking(&self) -> bool {
        self.users.values().any(|s| *s == UserState::Tracking)
    }

    /// Users the sensor knows about in any state
    pub fn known_users(&self) -> usize {
        self.users.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_tracker_handshake() {
        let mut tracker = UserTracker::new();
        tracker.apply(&SensorEvent::NewUser { user: 1 });
        assert_eq!(tracker.state(1), Some(UserState::AwaitingPose));
        assert!(!tracker.is_tracking());

        tracker.apply(&SensorEvent::PoseDetected { user: 1 });
        tracker.apply(&SensorEvent::CalibrationStarted { user: 1 });
        assert_eq!(tracker.state(1), Some(UserState::Calibrating));

        tracker.apply(&SensorEvent::CalibrationCompleted {
            user: 1,
            success: true,
        });
        assert_eq!(tracker.tracked_users(), vec![1]);

        tracker.apply(&SensorEvent::LostUser { user: 1 });
        assert_eq!(tracker.state(1), None);
        assert_eq!(tracker.known_users(), 0);
    }

    #[test]
    fn test_failed_calibration_waits_for_pose() {
        let mut tracker = UserTracker::new();
        tracker.apply(&SensorEvent::NewUser { user: 3 });
        tracker.apply(&SensorEvent::CalibrationCompleted {
            user: 3,
            success: false,
        });
        assert_eq!(tracker.state(3), Some(UserState::AwaitingPose));
    }

    #[test]
    fn test_event_json_tag() {
        let json = serde_json::to_string(&SensorEvent::CalibrationCompleted {
            user: 2,
            success: true,
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"calibration_completed","user":2,"success":true}"#);
    }

    #[test]
    fn test_json_lines_source() {
        let input = concat!(
            r#"{"events":[{"type":"new_user","user":1}]}"#,
            "\n\n",
            r#"{"joints":{"right_hand":{"x":1,"y":2,"z":3},"left_hand":{"x":0,"y":0,"z":0},"torso":{"x":0,"y":0,"z":0},"head":{"x":0,"y":-1,"z":0}},"right_shape":"zoom_in"}"#,
            "\n",
        );
        let mut source = JsonLinesSource::new(Cursor::new(input));

        let first = source.next_tick().unwrap().unwrap();
        assert_eq!(first.events, vec![SensorEvent::NewUser { user: 1 }]);
        assert!(first.joints.is_none());

        let second = source.next_tick().unwrap().unwrap();
        assert_eq!(second.right_shape, Some(HandShape::ZoomIn));
        assert_eq!(second.joints.unwrap().right_hand.y, 2.0);
        assert_eq!(source.line_number(), 3);

        assert!(source.next_tick().unwrap().is_none());
    }

    #[test]
    fn test_malformed_line_is_recoverable() {
        let input = "{not json}\n{}\n";
        let mut source = JsonLinesSource::new(Cursor::new(input));

        assert!(matches!(source.next_tick(), Err(Error::Sensor(_))));
        assert_eq!(source.next_tick().unwrap(), Some(SensorTick::default()));
    }

    #[test]
    fn test_invalid_utf8_line_is_skipped() {
        let input: &[u8] = b"{}\n\xff\xfe\n{}\n";
        let mut source = JsonLinesSource::new(Cursor::new(input));

        assert_eq!(source.next_tick().unwrap(), Some(SensorTick::default()));
        match source.next_tick() {
            Err(Error::Sensor(msg)) => assert!(msg.starts_with("line 2:")),
            other => panic!("Expected a sensor error, got {:?}", other),
        }
        assert_eq!(source.next_tick().unwrap(), Some(SensorTick::default()));
        assert_eq!(source.next_tick().unwrap(), None);
        assert_eq!(source.line_number(), 3);
    }
}
