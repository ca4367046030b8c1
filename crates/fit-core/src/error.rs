//! Error handling for the workout engine
//!
//! Angle math and stage transitions never fail; everything around them
//! (landmark lookup, configuration, journaling, channels) reports through
//! [`FitError`].

use core::fmt;

/// Result type alias for workout engine operations
pub type FitResult<T> = Result<T, FitError>;

/// Error type for all workout engine operations
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum FitError {
    /// Invalid configuration value
    InvalidConfig {
        /// Description of the configuration error
        reason: String,
    },

    /// Stage thresholds are not ordered `low < high`
    InvalidThresholds {
        /// Threshold that switches the stage to up
        high: f64,
        /// Threshold that completes a repetition
        low: f64,
    },

    /// A landmark required by the exercise is absent from the frame
    MissingLandmark {
        /// Landmark name
        landmark: &'static str,
    },

    /// Frame dimensions cannot be used for coordinate scaling
    InvalidFrameSize {
        width: u32,
        height: u32,
    },

    /// Exercise name does not match any known profile
    UnknownExercise {
        name: String,
    },

    /// Serialization/deserialization error
    SerializationError {
        reason: String,
    },

    /// File system error while journaling
    IoError {
        reason: String,
    },

    /// A channel between pipeline tasks was closed
    ChannelClosed {
        /// Which channel closed
        channel: &'static str,
    },

    /// A task did not reach the expected state in time
    Timeout {
        operation: &'static str,
    },
}

impl fmt::Display for FitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitError::InvalidConfig { reason } => {
                write!(f, "Invalid configuration: {}", reason)
            }
            FitError::InvalidThresholds { high, low } => {
                write!(f, "Invalid stage thresholds: low {:.1}° must be below high {:.1}°",
                       low, high)
            }
            FitError::MissingLandmark { landmark } => {
                write!(f, "Landmark not present in frame: {}", landmark)
            }
            FitError::InvalidFrameSize { width, height } => {
                write!(f, "Invalid frame size: {}x{}", width, height)
            }
            FitError::UnknownExercise { name } => {
                write!(f, "Unknown exercise: {}", name)
            }
            FitError::SerializationError { reason } => {
                write!(f, "Serialization error: {}", reason)
            }
            FitError::IoError { reason } => {
                write!(f, "I/O error: {}", reason)
            }
            FitError::ChannelClosed { channel } => {
                write!(f, "Channel closed: {}", channel)
            }
            FitError::Timeout { operation } => {
                write!(f, "Timed out waiting for {}", operation)
            }
        }
    }
}

impl std::error::Error for FitError {}

impl From<std::io::Error> for FitError {
    fn from(error: std::io::Error) -> Self {
        FitError::IoError {
            reason: error.to_string(),
        }
    }
}

/// Convenience macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::error::FitError::InvalidConfig {
            reason: format!($($arg)*)
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = FitError::InvalidThresholds { high: 60.0, low: 70.0 };
        let display = format!("{}", error);
        assert!(display.contains("Invalid stage thresholds"));
        assert!(display.contains("70.0"));
        assert!(display.contains("60.0"));

        let error = FitError::Timeout { operation: "counting service start" };
        assert_eq!(error.to_string(), "Timed out waiting for counting service start");
    }

    #[test]
    fn test_config_error_macro() {
        let error = config_error!("target reps must be positive, got {}", 0);
        assert_eq!(
            error,
            FitError::InvalidConfig {
                reason: "target reps must be positive, got 0".to_string()
            }
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "journal missing");
        let error: FitError = io.into();
        assert!(matches!(error, FitError::IoError { .. }));
        assert!(error.to_string().contains("journal missing"));
    }
}
