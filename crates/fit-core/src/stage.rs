//! Repetition stage machine
//!
//! Polarity: a joint above the high threshold is extended (`Up`); dropping
//! below the low threshold while `Up` flexes it (`Down`) and completes one
//! repetition. Every exercise in the workspace uses this same semantic.

use crate::angle::compute_angle;
use crate::error::{FitError, FitResult};
use crate::event::RepEvent;
use crate::landmark::Point2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default angle above which the joint counts as extended
pub const DEFAULT_HIGH_THRESHOLD: f64 = 160.0;
/// Default angle below which an extended joint completes a repetition
pub const DEFAULT_LOW_THRESHOLD: f64 = 70.0;

/// Phase of the tracked motion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Stage {
    /// No qualifying angle seen yet this session
    #[default]
    Unset,
    /// Joint extended
    Up,
    /// Joint flexed
    Down,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Unset => write!(f, "unset"),
            Stage::Up => write!(f, "up"),
            Stage::Down => write!(f, "down"),
        }
    }
}

/// Angle thresholds driving the stage machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageThresholds {
    /// Angle (degrees) above which the stage becomes `Up`
    pub high: f64,
    /// Angle (degrees) below which `Up` turns into `Down`
    pub low: f64,
}

impl StageThresholds {
    pub fn new(high: f64, low: f64) -> FitResult<Self> {
        let thresholds = StageThresholds { high, low };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> FitResult<()> {
        let in_range = |v: f64| v.is_finite() && (0.0..=180.0).contains(&v);
        if !in_range(self.high) || !in_range(self.low) || self.low >= self.high {
            return Err(FitError::InvalidThresholds {
                high: self.high,
                low: self.low,
            });
        }
        Ok(())
    }
}

impl Default for StageThresholds {
    fn default() -> Self {
        StageThresholds {
            high: DEFAULT_HIGH_THRESHOLD,
            low: DEFAULT_LOW_THRESHOLD,
        }
    }
}

/// Advance the stage machine by one frame.
///
/// Returns the new stage and counter. The counter grows by exactly one on
/// an `Up → Down` transition and is otherwise unchanged.
pub fn update_stage(
    angle: f64,
    stage: Stage,
    counter: u32,
    thresholds: &StageThresholds,
) -> (Stage, u32) {
    let mut stage = stage;
    let mut counter = counter;

    if angle > thresholds.high {
        stage = Stage::Up;
    }
    if angle < thresholds.low && stage == Stage::Up {
        stage = Stage::Down;
        counter = counter.saturating_add(1);
    }

    (stage, counter)
}

/// Outcome of feeding one angle to a [`RepCounter`]
#[derive(Debug, Clone, PartialEq)]
pub struct StageUpdate {
    pub angle: f64,
    pub previous: Stage,
    pub stage: Stage,
    pub counter: u32,
    /// Present when this frame completed a repetition
    pub repetition: Option<RepEvent>,
}

impl StageUpdate {
    pub fn stage_changed(&self) -> bool {
        self.previous != self.stage
    }
}

/// Per-session repetition counter.
///
/// Holds the stage and count for one exercise session; a new session
/// starts from a fresh counter.
#[derive(Debug, Clone)]
pub struct RepCounter {
    session_id: Uuid,
    thresholds: StageThresholds,
    stage: Stage,
    counter: u32,
    last_angle: Option<f64>,
}

impl RepCounter {
    pub fn new(thresholds: StageThresholds) -> Self {
        RepCounter {
            session_id: Uuid::new_v4(),
            thresholds,
            stage: Stage::Unset,
            counter: 0,
            last_angle: None,
        }
    }

    /// Feed the joint angle of one frame
    pub fn update(&mut self, angle: f64) -> StageUpdate {
        let previous = self.stage;
        let (stage, counter) = update_stage(angle, self.stage, self.counter, &self.thresholds);

        let repetition = (counter > self.counter).then(|| RepEvent::new(self.session_id, counter, angle));

        self.stage = stage;
        self.counter = counter;
        self.last_angle = Some(angle);

        StageUpdate {
            angle,
            previous,
            stage,
            counter,
            repetition,
        }
    }

    /// Compute the angle at `elbow` and feed it
    pub fn update_joints(&mut self, shoulder: Point2, elbow: Point2, wrist: Point2) -> StageUpdate {
        self.update(compute_angle(shoulder, elbow, wrist))
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn count(&self) -> u32 {
        self.counter
    }

    pub fn last_angle(&self) -> Option<f64> {
        self.last_angle
    }
}

impl Default for RepCounter {
    fn default() -> Self {
        Self::new(StageThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_stage_sequence() {
        let t = StageThresholds::default();

        let (stage, counter) = update_stage(170.0, Stage::Unset, 0, &t);
        assert_eq!((stage, counter), (Stage::Up, 0));

        let (stage, counter) = update_stage(50.0, stage, counter, &t);
        assert_eq!((stage, counter), (Stage::Down, 1));

        let (stage, counter) = update_stage(170.0, stage, counter, &t);
        assert_eq!((stage, counter), (Stage::Up, 1));

        // Repeated high angle does not count twice
        let (stage, counter) = update_stage(175.0, stage, counter, &t);
        assert_eq!((stage, counter), (Stage::Up, 1));
    }

    #[test]
    fn test_low_angle_without_extension_does_not_count() {
        let t = StageThresholds::default();
        let (stage, counter) = update_stage(40.0, Stage::Unset, 0, &t);
        assert_eq!((stage, counter), (Stage::Unset, 0));

        let (stage, counter) = update_stage(40.0, Stage::Down, 3, &t);
        assert_eq!((stage, counter), (Stage::Down, 3));
    }

    #[test]
    fn test_between_thresholds_holds_stage() {
        let t = StageThresholds::default();
        for stage in [Stage::Unset, Stage::Up, Stage::Down] {
            assert_eq!(update_stage(110.0, stage, 2, &t), (stage, 2));
        }
    }

    #[test]
    fn test_threshold_boundaries_are_exclusive() {
        let t = StageThresholds::default();
        assert_eq!(update_stage(160.0, Stage::Unset, 0, &t), (Stage::Unset, 0));
        assert_eq!(update_stage(70.0, Stage::Up, 0, &t), (Stage::Up, 0));
    }

    #[test]
    fn test_counter_never_decreases() {
        let mut counter = RepCounter::default();
        let mut previous = 0;
        let mut rng = StdRng::seed_from_u64(0x2545_F491);
        for _ in 0..5000 {
            let angle = rng.gen_range(0.0..=180.0);
            let update = counter.update(angle);
            assert!(update.counter >= previous);
            assert!(update.counter - previous <= 1);
            previous = update.counter;
        }
        assert!(counter.count() > 0);
    }

    #[test]
    fn test_rep_counter_emits_event() {
        let mut counter = RepCounter::new(StageThresholds::new(150.0, 60.0).unwrap());

        let update = counter.update(165.0);
        assert!(update.stage_changed());
        assert!(update.repetition.is_none());

        let update = counter.update(45.0);
        let event = update.repetition.expect("repetition should complete");
        assert_eq!(event.repetition, 1);
        assert_eq!(event.session_id, counter.session_id());
        assert_eq!(event.announcement(), "Good! Repetition 1");

        let update = counter.update(40.0);
        assert!(update.repetition.is_none());
        assert!(!update.stage_changed());
        assert_eq!(counter.count(), 1);
        assert_eq!(counter.last_angle(), Some(40.0));
    }

    #[test]
    fn test_update_joints() {
        let mut counter = RepCounter::default();
        // Straight arm
        counter.update_joints(Point2::new(0.0, 0.0), Point2::new(0.5, 0.0), Point2::new(1.0, 0.0));
        assert_eq!(counter.stage(), Stage::Up);
        // Right angle at the elbow
        let update = counter.update_joints(Point2::new(0.0, 0.0), Point2::new(0.5, 0.0), Point2::new(0.5, 0.01));
        assert_eq!(update.stage, Stage::Up);
        // Tightly flexed
        let update = counter.update_joints(Point2::new(0.0, 0.0), Point2::new(0.5, 0.0), Point2::new(0.1, 0.1));
        assert_eq!(update.stage, Stage::Down);
        assert_eq!(update.counter, 1);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(StageThresholds::new(160.0, 70.0).is_ok());
        assert!(StageThresholds::new(70.0, 160.0).is_err());
        assert!(StageThresholds::new(90.0, 90.0).is_err());
        assert!(StageThresholds::new(f64::NAN, 30.0).is_err());
        assert!(StageThresholds::new(200.0, 30.0).is_err());
    }
}
