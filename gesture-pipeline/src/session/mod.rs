//! Live session: sensor input, per-tick pipeline, action output

pub mod events;
pub mod runtime;

pub use events::{JsonLinesSource, SensorEvent, SensorTick, SkeletonSource, UserId, UserState, UserTracker};
pub use runtime::{HandClassifiers, Session, SessionStats, TickOutcome};
