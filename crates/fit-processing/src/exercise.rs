//! Exercise profiles: which joint metric drives the stage machine and
//! which form checks apply.

use fit_core::{
    compute_angle, inclination_degrees, lean_from_vertical, FitError, FitResult, Landmark,
    LandmarkFrame, StageThresholds,
};
use serde::{Deserialize, Serialize};

use crate::catalog::{infer_group, WorkoutCategory};

/// Supported exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exercise {
    /// Left shoulder/elbow/wrist angle only, no form checks
    LeftArm,
    PushUp,
    BodyweightSquat,
    BicepsCurl,
    Crunch,
    /// Isometric hold, never counts repetitions
    Plank,
}

/// Form assessment severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormQuality {
    Ok,
    Warn,
    Bad,
}

/// Coaching message for the current frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFeedback {
    pub message: String,
    pub quality: FormQuality,
}

impl FormFeedback {
    pub fn new(message: &str, quality: FormQuality) -> Self {
        FormFeedback {
            message: message.to_string(),
            quality,
        }
    }
}

/// What an exercise profile reads from one frame
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseReading {
    /// Value fed to the stage machine (degrees); `None` for holds
    pub metric: Option<f64>,
    pub feedback: Option<FormFeedback>,
}

// Form check limits, in normalized image units
const PUSH_UP_HIP_SAG: f64 = 0.08;
const SQUAT_GOOD_DEPTH: f64 = 75.0;
const SQUAT_MAX_LEAN: f64 = 30.0;
const CURL_SQUEEZE: f64 = 70.0;
const CURL_ELBOW_DRIFT: f64 = 0.12;
const PLANK_LINE_TOLERANCE: f64 = 0.06;

impl Exercise {
    pub const ALL: [Exercise; 6] = [
        Exercise::LeftArm,
        Exercise::PushUp,
        Exercise::BodyweightSquat,
        Exercise::BicepsCurl,
        Exercise::Crunch,
        Exercise::Plank,
    ];

    /// Resolve a user-facing exercise name ("Push Ups", "push-up", ...)
    pub fn from_name(name: &str) -> FitResult<Exercise> {
        let key: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "leftarm" | "arm" | "elbow" => Ok(Exercise::LeftArm),
            "pushup" | "pushups" => Ok(Exercise::PushUp),
            "squat" | "squats" | "bodyweightsquat" | "bodyweightsquats" => {
                Ok(Exercise::BodyweightSquat)
            }
            "curl" | "curls" | "bicepscurl" | "bicepscurls" | "bicepcurl" | "bicepcurls" => {
                Ok(Exercise::BicepsCurl)
            }
            "crunch" | "crunches" => Ok(Exercise::Crunch),
            "plank" | "planks" => Ok(Exercise::Plank),
            _ => Err(FitError::UnknownExercise {
                name: name.to_string(),
            }),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Exercise::LeftArm => "Left Arm",
            Exercise::PushUp => "Push-Up",
            Exercise::BodyweightSquat => "Bodyweight Squat",
            Exercise::BicepsCurl => "Biceps Curl",
            Exercise::Crunch => "Crunch",
            Exercise::Plank => "Plank",
        }
    }

    pub fn form_tip(&self) -> &'static str {
        match self {
            Exercise::LeftArm => "Keep the tracked arm in view of the camera.",
            Exercise::PushUp => "Body straight, hands under shoulders. Brace the core.",
            Exercise::BodyweightSquat => "Knees track toes; chest up; neutral spine.",
            Exercise::BicepsCurl => "Elbows pinned to sides. Control the tempo.",
            Exercise::Crunch => "Exhale on the way up; keep chin off chest.",
            Exercise::Plank => "Body in straight line; brace core; don't drop hips.",
        }
    }

    /// Workout category the exercise is logged under
    pub fn category(&self) -> WorkoutCategory {
        infer_group(self.display_name())
    }

    /// Whether the profile counts repetitions at all
    pub fn counts_repetitions(&self) -> bool {
        self.default_thresholds().is_some()
    }

    /// Stage thresholds tuned for the exercise metric
    pub fn default_thresholds(&self) -> Option<StageThresholds> {
        let (high, low) = match self {
            Exercise::LeftArm => (160.0, 70.0),
            Exercise::PushUp => (150.0, 85.0),
            Exercise::BodyweightSquat => (160.0, 85.0),
            Exercise::BicepsCurl => (150.0, 60.0),
            Exercise::Crunch => (75.0, 60.0),
            Exercise::Plank => return None,
        };
        Some(StageThresholds { high, low })
    }

    /// Read the tracked metric and form feedback from one frame.
    ///
    /// Angles are computed in the frame's own units; distance checks run
    /// on normalized coordinates.
    pub fn evaluate(&self, frame: &LandmarkFrame) -> FitResult<ExerciseReading> {
        match self {
            Exercise::LeftArm => Ok(ExerciseReading {
                metric: Some(Self::elbow_angle(frame, Side::Left)?),
                feedback: None,
            }),
            Exercise::PushUp => Self::evaluate_push_up(frame),
            Exercise::BodyweightSquat => Self::evaluate_squat(frame),
            Exercise::BicepsCurl => Self::evaluate_curl(frame),
            Exercise::Crunch => Self::evaluate_crunch(frame),
            Exercise::Plank => Self::evaluate_plank(frame),
        }
    }

    fn evaluate_push_up(frame: &LandmarkFrame) -> FitResult<ExerciseReading> {
        let elbow = (Self::elbow_angle(frame, Side::Left)? + Self::elbow_angle(frame, Side::Right)?) / 2.0;

        let normalized = frame.to_normalized()?;
        let hips = normalized.midpoint(Landmark::LeftHip, Landmark::RightHip)?;
        let shoulders = normalized.midpoint(Landmark::LeftShoulder, Landmark::RightShoulder)?;

        let feedback = if (hips.y - shoulders.y).abs() > PUSH_UP_HIP_SAG {
            FormFeedback::new("Brace core, no hip sag", FormQuality::Warn)
        } else {
            FormFeedback::new("Lower with control", FormQuality::Ok)
        };

        Ok(ExerciseReading {
            metric: Some(elbow),
            feedback: Some(feedback),
        })
    }

    fn evaluate_squat(frame: &LandmarkFrame) -> FitResult<ExerciseReading> {
        let knee = (Self::knee_angle(frame, Side::Left)? + Self::knee_angle(frame, Side::Right)?) / 2.0;

        let hips = frame.midpoint(Landmark::LeftHip, Landmark::RightHip)?;
        let shoulders = frame.midpoint(Landmark::LeftShoulder, Landmark::RightShoulder)?;
        let lean = lean_from_vertical(shoulders, hips);

        let feedback = if lean > SQUAT_MAX_LEAN {
            FormFeedback::new("Keep chest up, avoid collapsing", FormQuality::Bad)
        } else if knee < SQUAT_GOOD_DEPTH {
            FormFeedback::new("Great depth, drive through heels", FormQuality::Ok)
        } else {
            FormFeedback::new("Sit back and keep chest up", FormQuality::Warn)
        };

        Ok(ExerciseReading {
            metric: Some(knee),
            feedback: Some(feedback),
        })
    }

    fn evaluate_curl(frame: &LandmarkFrame) -> FitResult<ExerciseReading> {
        let elbow = Self::elbow_angle(frame, Side::Left)?.min(Self::elbow_angle(frame, Side::Right)?);

        let normalized = frame.to_normalized()?;
        let elbows = normalized.midpoint(Landmark::LeftElbow, Landmark::RightElbow)?;
        let hips = normalized.midpoint(Landmark::LeftHip, Landmark::RightHip)?;

        let feedback = if (elbows.x - hips.x).abs() > CURL_ELBOW_DRIFT {
            FormFeedback::new("Pin elbows, don't let them drift forward", FormQuality::Bad)
        } else if elbow < CURL_SQUEEZE {
            FormFeedback::new("Squeeze at top; control down", FormQuality::Ok)
        } else {
            FormFeedback::new("No swinging; keep elbows close", FormQuality::Warn)
        };

        Ok(ExerciseReading {
            metric: Some(elbow),
            feedback: Some(feedback),
        })
    }

    fn evaluate_crunch(frame: &LandmarkFrame) -> FitResult<ExerciseReading> {
        let hips = frame.midpoint(Landmark::LeftHip, Landmark::RightHip)?;
        let shoulders = frame.midpoint(Landmark::LeftShoulder, Landmark::RightShoulder)?;
        let torso = inclination_degrees(shoulders, hips).abs();

        Ok(ExerciseReading {
            metric: Some(torso),
            feedback: Some(FormFeedback::new("Slow controlled reps", FormQuality::Ok)),
        })
    }

    fn evaluate_plank(frame: &LandmarkFrame) -> FitResult<ExerciseReading> {
        let normalized = frame.to_normalized()?;
        let hips = normalized.midpoint(Landmark::LeftHip, Landmark::RightHip)?;
        let shoulders = normalized.midpoint(Landmark::LeftShoulder, Landmark::RightShoulder)?;

        let feedback = if (hips.y - shoulders.y).abs() < PLANK_LINE_TOLERANCE {
            FormFeedback::new("Nice straight line, hold!", FormQuality::Ok)
        } else {
            FormFeedback::new("Lift hips slightly; keep straight", FormQuality::Warn)
        };

        Ok(ExerciseReading {
            metric: None,
            feedback: Some(feedback),
        })
    }

    fn elbow_angle(frame: &LandmarkFrame, side: Side) -> FitResult<f64> {
        let (shoulder, elbow, wrist) = match side {
            Side::Left => (Landmark::LeftShoulder, Landmark::LeftElbow, Landmark::LeftWrist),
            Side::Right => (Landmark::RightShoulder, Landmark::RightElbow, Landmark::RightWrist),
        };
        Ok(compute_angle(frame.get(shoulder)?, frame.get(elbow)?, frame.get(wrist)?))
    }

    fn knee_angle(frame: &LandmarkFrame, side: Side) -> FitResult<f64> {
        let (hip, knee, ankle) = match side {
            Side::Left => (Landmark::LeftHip, Landmark::LeftKnee, Landmark::LeftAnkle),
            Side::Right => (Landmark::RightHip, Landmark::RightKnee, Landmark::RightAnkle),
        };
        Ok(compute_angle(frame.get(hip)?, frame.get(knee)?, frame.get(ankle)?))
    }
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

impl std::fmt::Display for Exercise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for Exercise {
    type Err = FitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Exercise::from_name(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fit_core::CoordinateUnits;

    /// Upright body with both arms bent to the given wrist offsets
    fn standing_frame(wrist_dx: f64, wrist_dy: f64) -> LandmarkFrame {
        LandmarkFrame::new(0, CoordinateUnits::Normalized)
            .with(Landmark::LeftShoulder, (0.40, 0.30))
            .with(Landmark::RightShoulder, (0.60, 0.30))
            .with(Landmark::LeftElbow, (0.40, 0.45))
            .with(Landmark::RightElbow, (0.60, 0.45))
            .with(Landmark::LeftWrist, (0.40 + wrist_dx, 0.45 + wrist_dy))
            .with(Landmark::RightWrist, (0.60 - wrist_dx, 0.45 + wrist_dy))
            .with(Landmark::LeftHip, (0.42, 0.60))
            .with(Landmark::RightHip, (0.58, 0.60))
            .with(Landmark::LeftKnee, (0.42, 0.75))
            .with(Landmark::RightKnee, (0.58, 0.75))
            .with(Landmark::LeftAnkle, (0.42, 0.90))
            .with(Landmark::RightAnkle, (0.58, 0.90))
    }

    #[test]
    fn test_from_name_aliases() {
        assert_eq!(Exercise::from_name("Push Ups").unwrap(), Exercise::PushUp);
        assert_eq!(Exercise::from_name("push-up").unwrap(), Exercise::PushUp);
        assert_eq!(Exercise::from_name("Bicep Curls").unwrap(), Exercise::BicepsCurl);
        assert_eq!(Exercise::from_name("Squats").unwrap(), Exercise::BodyweightSquat);
        assert_eq!("plank".parse::<Exercise>().unwrap(), Exercise::Plank);
        assert!(matches!(
            Exercise::from_name("Deadlift"),
            Err(FitError::UnknownExercise { .. })
        ));

        for exercise in Exercise::ALL {
            assert_eq!(Exercise::from_name(exercise.display_name()).unwrap(), exercise);
        }
    }

    #[test]
    fn test_thresholds_are_valid() {
        for exercise in Exercise::ALL {
            if let Some(thresholds) = exercise.default_thresholds() {
                assert!(thresholds.validate().is_ok(), "{} thresholds invalid", exercise);
            }
        }
        assert!(!Exercise::Plank.counts_repetitions());
        assert!(Exercise::LeftArm.counts_repetitions());
    }

    #[test]
    fn test_left_arm_angle() {
        // Forearm hanging straight down continues the upper arm
        let frame = standing_frame(0.0, 0.15);
        let reading = Exercise::LeftArm.evaluate(&frame).unwrap();
        assert!((reading.metric.unwrap() - 180.0).abs() < 1e-9);
        assert!(reading.feedback.is_none());

        // Forearm horizontal
        let frame = standing_frame(0.15, 0.0);
        let reading = Exercise::LeftArm.evaluate(&frame).unwrap();
        assert!((reading.metric.unwrap() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_curl_uses_tighter_arm() {
        let mut frame = standing_frame(0.0, 0.15);
        // Right wrist curled up towards the shoulder
        frame.set(Landmark::RightWrist, (0.62, 0.32));
        let reading = Exercise::BicepsCurl.evaluate(&frame).unwrap();
        let metric = reading.metric.unwrap();
        assert!(metric < CURL_SQUEEZE);
        assert_eq!(reading.feedback.unwrap().quality, FormQuality::Ok);
    }

    #[test]
    fn test_curl_elbow_drift() {
        let mut frame = standing_frame(0.0, 0.15);
        frame.set(Landmark::LeftElbow, (0.60, 0.45));
        frame.set(Landmark::RightElbow, (0.80, 0.45));
        let reading = Exercise::BicepsCurl.evaluate(&frame).unwrap();
        assert_eq!(reading.feedback.unwrap().quality, FormQuality::Bad);
    }

    #[test]
    fn test_squat_depth_and_lean() {
        let standing = standing_frame(0.0, 0.15);
        let reading = Exercise::BodyweightSquat.evaluate(&standing).unwrap();
        assert!((reading.metric.unwrap() - 180.0).abs() < 1e-9);
        assert_eq!(reading.feedback.unwrap().quality, FormQuality::Warn);

        let mut deep = standing.clone();
        deep.set(Landmark::LeftKnee, (0.30, 0.75));
        deep.set(Landmark::RightKnee, (0.70, 0.75));
        deep.set(Landmark::LeftAnkle, (0.42, 0.75));
        deep.set(Landmark::RightAnkle, (0.58, 0.75));
        let reading = Exercise::BodyweightSquat.evaluate(&deep).unwrap();
        assert!(reading.metric.unwrap() < SQUAT_GOOD_DEPTH);
        assert_eq!(reading.feedback.unwrap().quality, FormQuality::Ok);

        let mut leaning = standing;
        leaning.set(Landmark::LeftShoulder, (0.10, 0.50));
        leaning.set(Landmark::RightShoulder, (0.30, 0.50));
        let reading = Exercise::BodyweightSquat.evaluate(&leaning).unwrap();
        assert_eq!(reading.feedback.unwrap().quality, FormQuality::Bad);
    }

    #[test]
    fn test_push_up_hip_sag_in_pixels() {
        let frame = LandmarkFrame::new(0, CoordinateUnits::Normalized)
            .with(Landmark::LeftShoulder, (0.30, 0.40))
            .with(Landmark::RightShoulder, (0.32, 0.40))
            .with(Landmark::LeftElbow, (0.30, 0.50))
            .with(Landmark::RightElbow, (0.32, 0.50))
            .with(Landmark::LeftWrist, (0.30, 0.60))
            .with(Landmark::RightWrist, (0.32, 0.60))
            .with(Landmark::LeftHip, (0.60, 0.55))
            .with(Landmark::RightHip, (0.62, 0.55));

        let pixels = frame.to_pixels(1280, 720).unwrap();
        let reading = Exercise::PushUp.evaluate(&pixels).unwrap();
        assert!((reading.metric.unwrap() - 180.0).abs() < 1e-9);
        assert_eq!(
            reading.feedback.unwrap(),
            FormFeedback::new("Brace core, no hip sag", FormQuality::Warn)
        );
    }

    /// Side view of a torso with the hips fixed at (0.60, 0.60)
    fn crunch_frame(shoulders: (f64, f64)) -> LandmarkFrame {
        let (x, y) = shoulders;
        LandmarkFrame::new(0, CoordinateUnits::Normalized)
            .with(Landmark::LeftShoulder, (x, y - 0.01))
            .with(Landmark::RightShoulder, (x, y + 0.01))
            .with(Landmark::LeftHip, (0.60, 0.59))
            .with(Landmark::RightHip, (0.60, 0.61))
    }

    #[test]
    fn test_crunch_torso_inclination() {
        let thresholds = Exercise::Crunch.default_thresholds().unwrap();

        // Lying flat, head to the left of the hips
        let lying = Exercise::Crunch.evaluate(&crunch_frame((0.30, 0.60))).unwrap();
        let metric = lying.metric.unwrap();
        assert!(metric.abs() < 1e-9);
        assert!(metric < thresholds.low);

        // Sitting up, shoulders straight above the hips
        let sitting = Exercise::Crunch.evaluate(&crunch_frame((0.60, 0.30))).unwrap();
        let metric = sitting.metric.unwrap();
        assert!((metric - 90.0).abs() < 1e-9);
        assert!(metric > thresholds.high);
        assert_eq!(sitting.feedback.unwrap().quality, FormQuality::Ok);

        // The metric depends on facing: head to the right reads as 180
        let mirrored = Exercise::Crunch.evaluate(&crunch_frame((0.90, 0.60))).unwrap();
        assert!((mirrored.metric.unwrap() - 180.0).abs() < 1e-9);

        let missing = LandmarkFrame::new(0, CoordinateUnits::Normalized).with(Landmark::LeftShoulder, (0.60, 0.30));
        assert!(Exercise::Crunch.evaluate(&missing).is_err());
    }

    #[test]
    fn test_form_tips_present() {
        for exercise in Exercise::ALL {
            assert!(!exercise.form_tip().is_empty(), "{} has no form tip", exercise);
        }
    }

    #[test]
    fn test_plank_has_no_metric() {
        let frame = LandmarkFrame::new(0, CoordinateUnits::Normalized)
            .with(Landmark::LeftShoulder, (0.30, 0.50))
            .with(Landmark::RightShoulder, (0.30, 0.52))
            .with(Landmark::LeftHip, (0.60, 0.53))
            .with(Landmark::RightHip, (0.60, 0.55));

        let reading = Exercise::Plank.evaluate(&frame).unwrap();
        assert!(reading.metric.is_none());
        assert_eq!(reading.feedback.unwrap().quality, FormQuality::Ok);
    }

    #[test]
    fn test_missing_landmark_propagates() {
        let frame = LandmarkFrame::new(0, CoordinateUnits::Normalized)
            .with(Landmark::LeftShoulder, (0.4, 0.3));
        assert_eq!(
            Exercise::LeftArm.evaluate(&frame),
            Err(FitError::MissingLandmark { landmark: "left_elbow" })
        );
    }

    #[test]
    fn test_categories() {
        assert_eq!(Exercise::PushUp.category(), WorkoutCategory::Push);
        assert_eq!(Exercise::BodyweightSquat.category(), WorkoutCategory::Legs);
        assert_eq!(Exercise::BicepsCurl.category(), WorkoutCategory::BicepsTriceps);
        assert_eq!(Exercise::Crunch.category(), WorkoutCategory::Abs);
        assert_eq!(Exercise::Plank.category(), WorkoutCategory::Abs);
    }
}
