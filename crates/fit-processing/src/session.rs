//! Workout session: one exercise, its repetition counter and set tracking

use crate::config::SessionConfig;
use crate::exercise::{Exercise, ExerciseReading, FormFeedback, FormQuality};
use chrono::{DateTime, Utc};
use fit_core::{FitError, FitResult, LandmarkFrame, RepCounter, RepEvent, Stage};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// A finished set, ready to be journaled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRecord {
    pub session_id: Uuid,
    /// Category key, e.g. `"push"`
    pub workout_type: String,
    pub exercise: String,
    /// 1-based set number within the session
    pub set_number: u32,
    /// Sets represented by this record (always 1)
    pub sets: u32,
    pub reps: u32,
    pub completed_at: DateTime<Utc>,
}

/// Everything a session reports while processing frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    StageChanged {
        from: Stage,
        to: Stage,
        angle: f64,
    },
    Repetition {
        event: RepEvent,
        set_number: u32,
        reps_in_set: u32,
    },
    FormFeedback(FormFeedback),
    NoPersonDetected,
    SetComplete(SetRecord),
    WorkoutComplete {
        session_id: Uuid,
        sets_completed: u32,
        total_reps: u32,
    },
}

impl SessionEvent {
    /// Text to speak for this event, if any
    pub fn announcement(&self) -> Option<String> {
        match self {
            SessionEvent::Repetition { event, .. } => Some(event.announcement()),
            SessionEvent::SetComplete(record) => Some(format!("Set {} complete", record.set_number)),
            SessionEvent::WorkoutComplete { .. } => Some("Workout complete. Great job.".to_string()),
            _ => None,
        }
    }
}

/// Point-in-time view of a session for overlays and status output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub exercise: Exercise,
    pub stage: Stage,
    pub total_reps: u32,
    pub reps_in_set: u32,
    pub current_set: u32,
    pub target_reps: u32,
    pub target_sets: u32,
    pub last_angle: Option<f64>,
    pub frames_processed: u64,
    /// Frames the exercise could not be measured on
    pub frames_without_person: u64,
    pub workout_complete: bool,
}

impl SessionSnapshot {
    /// One-line heads-up display text
    pub fn hud_line(&self) -> String {
        format!(
            "{} | Set {}/{} | Reps {}/{}",
            self.exercise, self.current_set, self.target_sets, self.reps_in_set, self.target_reps
        )
    }
}

/// State of one exercise session.
///
/// The total repetition count never decreases; per-set counts are derived
/// from where the current set started.
pub struct WorkoutSession {
    config: SessionConfig,
    counter: RepCounter,
    counts_reps: bool,
    set_started_at: u32,
    current_set: u32,
    sets_completed: u32,
    workout_complete: bool,
    frames_processed: u64,
    frames_without_person: u64,
    last_feedback: Option<FormFeedback>,
}

impl WorkoutSession {
    /// Create a session from a validated configuration
    pub fn new(config: SessionConfig) -> FitResult<Self> {
        config.validate()?;

        let thresholds = config.effective_thresholds();
        let counts_reps = thresholds.is_some();
        let counter = RepCounter::new(thresholds.unwrap_or_default());

        info!(
            session_id = %counter.session_id(),
            exercise = %config.exercise,
            target_reps = config.target_reps,
            target_sets = config.target_sets,
            "Workout session started"
        );

        Ok(WorkoutSession {
            config,
            counter,
            counts_reps,
            set_started_at: 0,
            current_set: 1,
            sets_completed: 0,
            workout_complete: false,
            frames_processed: 0,
            frames_without_person: 0,
            last_feedback: None,
        })
    }

    /// Feed one frame and collect the resulting events
    pub fn process_frame(&mut self, frame: &LandmarkFrame) -> Vec<SessionEvent> {
        self.frames_processed += 1;
        let mut events = Vec::new();

        let reading = match self.measure(frame) {
            Ok(reading) => reading,
            Err(e) => {
                debug!(frame = frame.frame_index, error = %e, "Frame skipped");
                self.frames_without_person += 1;
                let feedback = FormFeedback::new(
                    "No person detected. Step back & fit in frame.",
                    FormQuality::Warn,
                );
                if self.last_feedback.as_ref() != Some(&feedback) {
                    self.last_feedback = Some(feedback);
                    events.push(SessionEvent::NoPersonDetected);
                }
                return events;
            }
        };

        if let (Some(metric), true) = (reading.metric, self.counts_reps) {
            let update = self.counter.update(metric);

            if update.stage_changed() {
                events.push(SessionEvent::StageChanged {
                    from: update.previous,
                    to: update.stage,
                    angle: update.angle,
                });
            }

            if let Some(rep) = update.repetition {
                self.on_repetition(rep, &mut events);
            }
        }

        if let Some(feedback) = reading.feedback {
            if self.config.form_feedback && self.last_feedback.as_ref() != Some(&feedback) {
                events.push(SessionEvent::FormFeedback(feedback.clone()));
            }
            self.last_feedback = Some(feedback);
        } else {
            self.last_feedback = None;
        }

        events
    }

    fn measure(&self, frame: &LandmarkFrame) -> FitResult<ExerciseReading> {
        if frame.is_empty() {
            return Err(FitError::MissingLandmark { landmark: "any" });
        }

        match self.config.frame_size {
            Some(size) => self
                .config
                .exercise
                .evaluate(&frame.to_pixels(size.width, size.height)?),
            None => self.config.exercise.evaluate(frame),
        }
    }

    fn on_repetition(&mut self, rep: RepEvent, events: &mut Vec<SessionEvent>) {
        let total = rep.repetition;
        let reps_in_set = total - self.set_started_at;
        debug!(
            repetition = total,
            set = self.current_set,
            reps_in_set,
            angle = rep.angle,
            "Repetition counted"
        );

        events.push(SessionEvent::Repetition {
            event: rep,
            set_number: self.current_set,
            reps_in_set,
        });

        if reps_in_set < self.config.target_reps {
            return;
        }

        let record = SetRecord {
            session_id: self.counter.session_id(),
            workout_type: self.config.exercise.category().key().to_string(),
            exercise: self.config.exercise.display_name().to_string(),
            set_number: self.current_set,
            sets: 1,
            reps: reps_in_set,
            completed_at: Utc::now(),
        };
        info!(set = record.set_number, reps = record.reps, "Set complete");
        events.push(SessionEvent::SetComplete(record));

        self.sets_completed += 1;
        self.current_set += 1;
        self.set_started_at = total;

        if !self.workout_complete && self.sets_completed >= self.config.target_sets {
            self.workout_complete = true;
            info!(
                sets = self.sets_completed,
                total_reps = total,
                "Workout complete"
            );
            events.push(SessionEvent::WorkoutComplete {
                session_id: self.counter.session_id(),
                sets_completed: self.sets_completed,
                total_reps: total,
            });
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.counter.session_id(),
            exercise: self.config.exercise,
            stage: self.counter.stage(),
            total_reps: self.counter.count(),
            reps_in_set: self.counter.count() - self.set_started_at,
            current_set: self.current_set,
            target_reps: self.config.target_reps,
            target_sets: self.config.target_sets,
            last_angle: self.counter.last_angle(),
            frames_processed: self.frames_processed,
            frames_without_person: self.frames_without_person,
            workout_complete: self.workout_complete,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.counter.session_id()
    }

    /// Frames skipped because a tracked landmark was missing.
    /// `NoPersonDetected` fires once per dropout; this counts every frame.
    pub fn frames_without_person(&self) -> u64 {
        self.frames_without_person
    }

    pub fn total_reps(&self) -> u32 {
        self.counter.count()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_complete(&self) -> bool {
        self.workout_complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fit_core::{CoordinateUnits, Landmark};

    /// Left arm frame with the given elbow angle (degrees)
    fn arm_frame(index: u64, angle_deg: f64) -> LandmarkFrame {
        let elbow = (0.5, 0.5);
        let shoulder = (0.5, 0.3);
        // Upper arm points straight up from the elbow; rotate the forearm
        let theta = (-90.0 + angle_deg).to_radians();
        let wrist = (elbow.0 + 0.2 * theta.cos(), elbow.1 + 0.2 * theta.sin());
        LandmarkFrame::new(index, CoordinateUnits::Normalized)
            .with(Landmark::LeftShoulder, shoulder)
            .with(Landmark::LeftElbow, elbow)
            .with(Landmark::LeftWrist, wrist)
    }

    fn run(session: &mut WorkoutSession, angles: &[f64]) -> Vec<SessionEvent> {
        angles
            .iter()
            .enumerate()
            .flat_map(|(i, a)| session.process_frame(&arm_frame(i as u64, *a)))
            .collect()
    }

    #[test]
    fn test_arm_frame_geometry() {
        for angle in [30.0, 90.0, 170.0] {
            let reading = Exercise::LeftArm.evaluate(&arm_frame(0, angle)).unwrap();
            assert!((reading.metric.unwrap() - angle).abs() < 1e-6);
        }
    }

    #[test]
    fn test_counts_repetitions() {
        let mut session = WorkoutSession::new(SessionConfig::left_arm()).unwrap();
        let events = run(&mut session, &[170.0, 120.0, 50.0, 110.0, 170.0, 50.0]);

        let reps: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Repetition { event, .. } => Some(event.repetition),
                _ => None,
            })
            .collect();
        assert_eq!(reps, vec![1, 2]);
        assert_eq!(session.total_reps(), 2);
        assert_eq!(session.snapshot().stage, Stage::Down);

        let stage_changes = events
            .iter()
            .filter(|e| matches!(e, SessionEvent::StageChanged { .. }))
            .count();
        assert_eq!(stage_changes, 4);
    }

    #[test]
    fn test_set_and_workout_completion() {
        let mut config = SessionConfig::left_arm();
        config.target_reps = 2;
        config.target_sets = 2;
        let mut session = WorkoutSession::new(config).unwrap();

        let cycle = [170.0, 40.0];
        let mut events = Vec::new();
        for _ in 0..5 {
            events.extend(run(&mut session, &cycle));
        }

        let sets: Vec<&SetRecord> = events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::SetComplete(record) => Some(record),
                _ => None,
            })
            .collect();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].set_number, 1);
        assert_eq!(sets[0].reps, 2);
        assert_eq!(sets[0].sets, 1);
        assert_eq!(sets[0].workout_type, "push");
        assert_eq!(sets[1].set_number, 2);

        let completions = events
            .iter()
            .filter(|e| matches!(e, SessionEvent::WorkoutComplete { .. }))
            .count();
        assert_eq!(completions, 1);

        let snapshot = session.snapshot();
        assert!(snapshot.workout_complete);
        assert_eq!(snapshot.total_reps, 5);
        assert_eq!(snapshot.current_set, 3);
        assert_eq!(snapshot.reps_in_set, 1);
    }

    #[test]
    fn test_missing_person_is_reported_once() {
        let mut session = WorkoutSession::new(SessionConfig::left_arm()).unwrap();
        let empty = LandmarkFrame::new(0, CoordinateUnits::Normalized);

        assert_eq!(session.process_frame(&empty), vec![SessionEvent::NoPersonDetected]);
        assert!(session.process_frame(&empty).is_empty());

        // Detection resumes, then drops again
        run(&mut session, &[170.0]);
        assert_eq!(session.process_frame(&empty), vec![SessionEvent::NoPersonDetected]);
        assert_eq!(session.snapshot().frames_processed, 4);
        assert_eq!(session.total_reps(), 0);
        assert_eq!(session.frames_without_person(), 3);

        // Visible but untracked joints are skipped too, silently after the first
        let face_only = LandmarkFrame::new(5, CoordinateUnits::Normalized).with(Landmark::Nose, (0.5, 0.2));
        assert!(session.process_frame(&face_only).is_empty());
        assert_eq!(session.snapshot().frames_without_person, 4);
    }

    #[test]
    fn test_crunch_counts_on_lowering() {
        let mut config = SessionConfig::for_exercise(Exercise::Crunch);
        config.target_reps = 10;
        let mut session = WorkoutSession::new(config).unwrap();

        // Hips fixed at (0.6, 0.6); shoulders left of them when lying flat
        let torso = |index: u64, shoulders: (f64, f64)| {
            LandmarkFrame::new(index, CoordinateUnits::Normalized)
                .with(Landmark::LeftShoulder, shoulders)
                .with(Landmark::RightShoulder, shoulders)
                .with(Landmark::LeftHip, (0.60, 0.60))
                .with(Landmark::RightHip, (0.60, 0.60))
        };
        let lying = (0.30, 0.60);
        let sitting = (0.60, 0.30);

        let events: Vec<SessionEvent> = [lying, sitting, lying, lying]
            .into_iter()
            .enumerate()
            .flat_map(|(i, shoulders)| session.process_frame(&torso(i as u64, shoulders)))
            .collect();

        let reps = events
            .iter()
            .filter(|e| matches!(e, SessionEvent::Repetition { .. }))
            .count();
        assert_eq!(reps, 1);
        assert_eq!(session.total_reps(), 1);
        assert_eq!(session.snapshot().stage, Stage::Down);
        assert_eq!(session.frames_without_person(), 0);
    }

    #[test]
    fn test_plank_never_counts() {
        let mut session = WorkoutSession::new(SessionConfig::for_exercise(Exercise::Plank)).unwrap();
        let frame = LandmarkFrame::new(0, CoordinateUnits::Normalized)
            .with(Landmark::LeftShoulder, (0.30, 0.50))
            .with(Landmark::RightShoulder, (0.30, 0.52))
            .with(Landmark::LeftHip, (0.60, 0.53))
            .with(Landmark::RightHip, (0.60, 0.55));

        let events = session.process_frame(&frame);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], SessionEvent::FormFeedback(_)));

        // Same feedback is not repeated
        assert!(session.process_frame(&frame).is_empty());
        assert_eq!(session.total_reps(), 0);
        assert_eq!(session.snapshot().stage, Stage::Unset);
    }

    #[test]
    fn test_pixel_scaling_session() {
        let mut session = WorkoutSession::new(SessionConfig::left_arm_strict(640, 640)).unwrap();
        let events = run(&mut session, &[170.0, 50.0, 25.0]);
        let reps = events
            .iter()
            .filter(|e| matches!(e, SessionEvent::Repetition { .. }))
            .count();
        // 50° is not deep enough for the 30° preset, 25° is
        assert_eq!(reps, 1);
    }

    #[test]
    fn test_announcements() {
        let mut session = WorkoutSession::new(SessionConfig::left_arm()).unwrap();
        let events = run(&mut session, &[170.0, 50.0]);
        let spoken: Vec<String> = events.iter().filter_map(SessionEvent::announcement).collect();
        assert_eq!(spoken, vec!["Good! Repetition 1".to_string()]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SessionConfig::left_arm();
        config.target_reps = 0;
        assert!(WorkoutSession::new(config).is_err());
    }
}
