//! Workout categories and the exercises offered under each

use fit_core::{config_error, FitResult};
use serde::{Deserialize, Serialize};

/// Workout category a set is logged under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutCategory {
    Push,
    Pull,
    Legs,
    BicepsTriceps,
    Abs,
}

impl WorkoutCategory {
    pub const ALL: [WorkoutCategory; 5] = [
        WorkoutCategory::Push,
        WorkoutCategory::Pull,
        WorkoutCategory::Legs,
        WorkoutCategory::BicepsTriceps,
        WorkoutCategory::Abs,
    ];

    /// Stable key used in logs and selection forms
    pub fn key(&self) -> &'static str {
        match self {
            WorkoutCategory::Push => "push",
            WorkoutCategory::Pull => "pull",
            WorkoutCategory::Legs => "legs",
            WorkoutCategory::BicepsTriceps => "biceps_triceps",
            WorkoutCategory::Abs => "abs",
        }
    }

    pub fn from_key(key: &str) -> FitResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.key() == key.trim())
            .ok_or_else(|| config_error!("unknown workout category '{}'", key))
    }

    /// Exercises listed for the category
    pub fn exercises(&self) -> &'static [&'static str] {
        match self {
            WorkoutCategory::Push => &["Push Ups", "Bench Press", "Shoulder Press"],
            WorkoutCategory::Pull => &["Pull Ups", "Barbell Rows", "Deadlift"],
            WorkoutCategory::Legs => &["Squats", "Lunges", "Leg Press"],
            WorkoutCategory::BicepsTriceps => &["Bicep Curls", "Tricep Dips", "Hammer Curls"],
            WorkoutCategory::Abs => &["Plank", "Crunches", "Leg Raises"],
        }
    }
}

impl std::fmt::Display for WorkoutCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Guess the category of a free-form exercise name. Unrecognised names
/// fall back to `Push`.
pub fn infer_group(name: &str) -> WorkoutCategory {
    let s = name.to_lowercase();
    if s.contains("push") {
        WorkoutCategory::Push
    } else if s.contains("squat") || s.contains("lunge") || s.contains("leg") {
        WorkoutCategory::Legs
    } else if s.contains("curl") {
        WorkoutCategory::BicepsTriceps
    } else if s.contains("plank") || s.contains("crunch") || s.contains("abs") {
        WorkoutCategory::Abs
    } else {
        WorkoutCategory::Push
    }
}

/// Five-day split shown as the recommended plan
pub fn weekly_plan() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Day 1", "Push - Bench Press, Push Ups, Shoulder Press"),
        ("Day 2", "Pull - Pull Ups, Rows, Deadlifts"),
        ("Day 3", "Legs - Squats, Lunges, Leg Press"),
        ("Day 4", "Arms - Bicep Curls, Tricep Dips, Hammer Curls"),
        ("Day 5", "Abs - Plank, Crunches, Leg Raises"),
    ]
}
