//! Configuration management for workout sessions

use crate::exercise::Exercise;
use fit_core::{FitError, FitResult, StageThresholds};
use serde::{Deserialize, Serialize};

/// Default repetitions per set
pub const DEFAULT_TARGET_REPS: u32 = 12;
/// Default sets per workout
pub const DEFAULT_TARGET_SETS: u32 = 3;

/// Camera frame dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

/// Configuration of one exercise session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Configuration name/profile
    pub name: String,
    /// Tracked exercise
    pub exercise: Exercise,
    /// Overrides the exercise's own stage thresholds
    pub thresholds: Option<StageThresholds>,
    /// Repetitions that complete a set
    pub target_reps: u32,
    /// Sets that complete the workout
    pub target_sets: u32,
    /// Scale normalized frames to these pixel dimensions before measuring
    pub frame_size: Option<FrameSize>,
    /// Publish form feedback events when the message changes
    pub form_feedback: bool,
}

impl SessionConfig {
    /// Session for any exercise with its tuned thresholds
    pub fn for_exercise(exercise: Exercise) -> Self {
        SessionConfig {
            name: exercise.display_name().to_string(),
            exercise,
            thresholds: None,
            target_reps: DEFAULT_TARGET_REPS,
            target_sets: DEFAULT_TARGET_SETS,
            frame_size: None,
            form_feedback: true,
        }
    }

    /// Left elbow tracking on normalized coordinates, 160°/70°
    pub fn left_arm() -> Self {
        SessionConfig {
            name: "Left arm".to_string(),
            thresholds: Some(StageThresholds::default()),
            form_feedback: false,
            ..Self::for_exercise(Exercise::LeftArm)
        }
    }

    /// Left elbow tracking in camera pixels with a deep 30° flexion
    /// requirement
    pub fn left_arm_strict(width: u32, height: u32) -> Self {
        SessionConfig {
            name: "Left arm (strict)".to_string(),
            thresholds: Some(StageThresholds { high: 160.0, low: 30.0 }),
            frame_size: Some(FrameSize { width, height }),
            form_feedback: false,
            ..Self::for_exercise(Exercise::LeftArm)
        }
    }

    /// Look up a session by exercise name
    pub fn from_exercise_name(name: &str) -> FitResult<Self> {
        Ok(Self::for_exercise(Exercise::from_name(name)?))
    }

    /// Thresholds the stage machine runs with; `None` for holds
    pub fn effective_thresholds(&self) -> Option<StageThresholds> {
        if !self.exercise.counts_repetitions() {
            return None;
        }
        self.thresholds.or_else(|| self.exercise.default_thresholds())
    }

    /// Validate entire configuration
    pub fn validate(&self) -> FitResult<()> {
        if self.name.trim().is_empty() {
            return Err(FitError::InvalidConfig {
                reason: "Session name cannot be empty".to_string(),
            });
        }

        if self.target_reps == 0 {
            return Err(FitError::InvalidConfig {
                reason: "Target reps must be greater than 0".to_string(),
            });
        }

        if self.target_sets == 0 {
            return Err(FitError::InvalidConfig {
                reason: "Target sets must be greater than 0".to_string(),
            });
        }

        if let Some(thresholds) = &self.thresholds {
            thresholds.validate()?;
        }

        if let Some(size) = &self.frame_size {
            if size.width == 0 || size.height == 0 {
                return Err(FitError::InvalidFrameSize {
                    width: size.width,
                    height: size.height,
                });
            }
        }

        Ok(())
    }

    /// Export configuration to JSON
    pub fn to_json(&self) -> FitResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| FitError::SerializationError {
            reason: format!("Failed to serialize session configuration: {}", e),
        })
    }

    /// Import configuration from JSON
    pub fn from_json(json: &str) -> FitResult<Self> {
        serde_json::from_str(json).map_err(|e| FitError::SerializationError {
            reason: format!("Failed to deserialize session configuration: {}", e),
        })
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::left_arm()
    }
}
