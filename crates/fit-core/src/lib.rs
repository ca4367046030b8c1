//! Fit-Core: Foundation types for repetition counting
//!
//! Pose landmarks, joint angle math and the per-session stage machine.

pub mod angle;
pub mod error;
pub mod event;
pub mod landmark;
pub mod stage;

pub use angle::{compute_angle, inclination_degrees, lean_from_vertical};
pub use error::{FitError, FitResult};
pub use event::RepEvent;
pub use landmark::{CoordinateUnits, Landmark, LandmarkFrame, Point2, LANDMARK_COUNT};
pub use stage::{update_stage, RepCounter, Stage, StageThresholds, StageUpdate};

/// Milliseconds since the UNIX epoch; 0 if the clock is before it
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
