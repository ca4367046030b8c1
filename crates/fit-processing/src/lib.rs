//! Fit-Processing: Exercise profiles and workout sessions
//!
//! Turns landmark frames into repetitions, sets and form feedback.

pub mod catalog;
pub mod config;
pub mod exercise;
pub mod session;

pub use catalog::{infer_group, weekly_plan, WorkoutCategory};
pub use config::{FrameSize, SessionConfig, DEFAULT_TARGET_REPS, DEFAULT_TARGET_SETS};
pub use exercise::{Exercise, ExerciseReading, FormFeedback, FormQuality};
pub use session::{SessionEvent, SessionSnapshot, SetRecord, WorkoutSession};
