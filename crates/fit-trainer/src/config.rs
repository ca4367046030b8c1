//! Trainer configuration: session, landmark source, voice cues and journal

use fit_core::{FitError, FitResult, StageThresholds};
use fit_processing::{Exercise, SessionConfig};
use fit_simulation::{MotionPattern, StreamConfig, TrackedJoint};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Voice cue settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceConfig {
    pub enabled: bool,
    /// Repetition cues closer together than this are dropped
    pub min_cue_interval_ms: u64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_cue_interval_ms: 800,
        }
    }
}

/// Complete trainer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub session: SessionConfig,
    pub stream: StreamConfig,
    pub voice: VoiceConfig,
    /// Append completed sets to this JSON-lines file
    pub journal: Option<PathBuf>,
    /// How often progress is logged
    pub status_interval_ms: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self::for_exercise(Exercise::LeftArm)
    }
}

impl TrainerConfig {
    /// Trainer for an exercise, with a simulated performer whose motion
    /// crosses that exercise's thresholds
    pub fn for_exercise(exercise: Exercise) -> Self {
        let session = if exercise == Exercise::LeftArm {
            SessionConfig::left_arm()
        } else {
            SessionConfig::for_exercise(exercise)
        };

        let mut stream = StreamConfig {
            max_frames: Some(30 * 60),
            ..Default::default()
        };
        stream.simulation.pattern = demo_pattern(session.effective_thresholds());
        stream.simulation.joint = match exercise {
            Exercise::BodyweightSquat => TrackedJoint::Knees,
            _ => TrackedJoint::Elbows,
        };

        TrainerConfig {
            session,
            stream,
            voice: VoiceConfig::default(),
            journal: None,
            status_interval_ms: 2000,
        }
    }

    /// Validate entire configuration
    pub fn validate(&self) -> FitResult<()> {
        self.session.validate()?;
        self.stream.simulation.validate()?;

        if self.stream.buffer_size == 0 {
            return Err(FitError::InvalidConfig {
                reason: "Stream buffer size must be greater than 0".to_string(),
            });
        }

        if self.voice.min_cue_interval_ms > 60_000 {
            return Err(FitError::InvalidConfig {
                reason: format!(
                    "Cue interval of {} ms is longer than a minute",
                    self.voice.min_cue_interval_ms
                ),
            });
        }

        if self.status_interval_ms == 0 {
            return Err(FitError::InvalidConfig {
                reason: "Status interval must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Export configuration to JSON
    pub fn to_json(&self) -> FitResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| FitError::SerializationError {
            reason: format!("Failed to serialize trainer configuration: {}", e),
        })
    }

    /// Import configuration from JSON
    pub fn from_json(json: &str) -> FitResult<Self> {
        serde_json::from_str(json).map_err(|e| FitError::SerializationError {
            reason: format!("Failed to deserialize trainer configuration: {}", e),
        })
    }

    /// Read and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> FitResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        config.validate()?;
        Ok(config)
    }
}

/// Repetitions that swing 15° past either threshold; a still hold for
/// exercises that are not counted
fn demo_pattern(thresholds: Option<StageThresholds>) -> MotionPattern {
    match thresholds {
        Some(t) => MotionPattern::Sinusoidal {
            period: 2.0,
            min_angle: (t.low - 15.0).max(0.0),
            max_angle: (t.high + 15.0).min(180.0),
        },
        None => MotionPattern::Hold { angle: 175.0 },
    }
}
