//! Pre-defined joint motion patterns for landmark simulation

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Joint angle trajectory over time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MotionPattern {
    /// Joint held at a fixed angle
    Hold { angle: f64 },
    /// Continuous repetitions, starting extended at `max_angle`
    Sinusoidal {
        period: f64,
        min_angle: f64,
        max_angle: f64,
    },
    /// Linear change from one angle to another, then held
    Ramp {
        start_angle: f64,
        end_angle: f64,
        duration: f64,
    },
    /// Repetitions for `active` seconds, then rest extended for `rest`
    Interval {
        period: f64,
        active: f64,
        rest: f64,
        min_angle: f64,
        max_angle: f64,
    },
}

impl MotionPattern {
    /// Joint angle (degrees, clamped to `[0, 180]`) at the given time
    pub fn angle_at_time(&self, time: f64) -> f64 {
        let angle = match *self {
            MotionPattern::Hold { angle } => angle,

            MotionPattern::Sinusoidal { period, min_angle, max_angle } => {
                cycle(time, period, min_angle, max_angle)
            }

            MotionPattern::Ramp { start_angle, end_angle, duration } => {
                if duration <= 0.0 || time >= duration {
                    end_angle
                } else {
                    start_angle + (end_angle - start_angle) * (time / duration)
                }
            }

            MotionPattern::Interval { period, active, rest, min_angle, max_angle } => {
                let phase = time % (active + rest);
                if phase < active {
                    cycle(phase, period, min_angle, max_angle)
                } else {
                    max_angle
                }
            }
        };

        angle.clamp(0.0, 180.0)
    }

    /// Full repetitions the pattern performs within `duration` seconds
    pub fn expected_repetitions(&self, duration: f64) -> u32 {
        match *self {
            MotionPattern::Hold { .. } | MotionPattern::Ramp { .. } => 0,
            MotionPattern::Sinusoidal { period, .. } => completed_cycles(duration, period),
            MotionPattern::Interval { period, active, rest, .. } => {
                let block = active + rest;
                let full_blocks = (duration / block).floor();
                let remainder = duration - full_blocks * block;
                full_blocks as u32 * completed_cycles(active, period)
                    + completed_cycles(remainder.min(active), period)
            }
        }
    }

    /// Get pattern description
    pub fn description(&self) -> &'static str {
        match self {
            MotionPattern::Hold { .. } => "Static hold",
            MotionPattern::Sinusoidal { .. } => "Continuous repetitions",
            MotionPattern::Ramp { .. } => "Gradual ramp",
            MotionPattern::Interval { .. } => "Work/rest intervals",
        }
    }

    /// Create common preset patterns
    pub fn presets() -> Vec<(&'static str, MotionPattern)> {
        vec![
            ("Rest", MotionPattern::Hold { angle: 175.0 }),
            ("Half Rep Hold", MotionPattern::Hold { angle: 100.0 }),
            ("Steady Curls", MotionPattern::Sinusoidal {
                period: 2.0, min_angle: 40.0, max_angle: 175.0
            }),
            ("Fast Curls", MotionPattern::Sinusoidal {
                period: 1.0, min_angle: 45.0, max_angle: 170.0
            }),
            ("Partial Reps", MotionPattern::Sinusoidal {
                period: 1.5, min_angle: 90.0, max_angle: 170.0
            }),
            ("Slow Lowering", MotionPattern::Ramp {
                start_angle: 175.0, end_angle: 30.0, duration: 5.0
            }),
            ("Sets With Rest", MotionPattern::Interval {
                period: 2.0, active: 10.0, rest: 5.0, min_angle: 40.0, max_angle: 175.0
            }),
        ]
    }
}

impl Default for MotionPattern {
    fn default() -> Self {
        MotionPattern::Sinusoidal {
            period: 2.0,
            min_angle: 40.0,
            max_angle: 175.0,
        }
    }
}

/// Cosine cycle between the two angles, extended at phase zero
fn cycle(time: f64, period: f64, min_angle: f64, max_angle: f64) -> f64 {
    if period <= 0.0 {
        return max_angle;
    }
    let mid = (max_angle + min_angle) / 2.0;
    let amplitude = (max_angle - min_angle) / 2.0;
    mid + amplitude * (2.0 * PI * time / period).cos()
}

/// Flexions reached within `duration`; the flexed point sits at half a period
fn completed_cycles(duration: f64, period: f64) -> u32 {
    if period <= 0.0 || duration < 0.0 {
        return 0;
    }
    ((duration + period / 2.0) / period).floor() as u32
}
