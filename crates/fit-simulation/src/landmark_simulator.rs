//! Synthetic pose landmarks for exercising the counter without a camera

use crate::motion_patterns::MotionPattern;
use fit_core::{CoordinateUnits, FitError, FitResult, Landmark, LandmarkFrame, Point2};
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Which joints follow the motion pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackedJoint {
    /// Both elbows flex; legs stay straight
    Elbows,
    /// Both knees flex; arms hang straight
    Knees,
}

/// Configuration for landmark simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Joint angle trajectory
    pub pattern: MotionPattern,
    /// Joints driven by the pattern
    pub joint: TrackedJoint,
    /// Frames per second
    pub frame_rate: f64,
    /// Gaussian jitter standard deviation (normalized units)
    pub jitter_std: f64,
    /// Probability that a frame has no detected person
    pub dropout_prob: f64,
    /// Units of the generated coordinates
    pub units: CoordinateUnits,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            pattern: MotionPattern::default(),
            joint: TrackedJoint::Elbows,
            frame_rate: 30.0,
            jitter_std: 0.002,
            dropout_prob: 0.0,
            units: CoordinateUnits::Normalized,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> FitResult<()> {
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0 && self.frame_rate <= 240.0) {
            return Err(FitError::InvalidConfig {
                reason: format!("Frame rate must be in (0, 240] fps, got {}", self.frame_rate),
            });
        }

        if !(self.jitter_std.is_finite() && self.jitter_std >= 0.0) {
            return Err(FitError::InvalidConfig {
                reason: format!("Jitter must be a non-negative number, got {}", self.jitter_std),
            });
        }

        if !(0.0..=1.0).contains(&self.dropout_prob) {
            return Err(FitError::InvalidConfig {
                reason: format!("Dropout probability must be within [0, 1], got {}", self.dropout_prob),
            });
        }

        if let CoordinateUnits::Pixel { width, height } = self.units {
            if width == 0 || height == 0 {
                return Err(FitError::InvalidFrameSize { width, height });
            }
        }

        Ok(())
    }
}

// Standing skeleton in normalized image coordinates (y grows downwards)
const LEFT_SHOULDER: Point2 = Point2::new(0.40, 0.30);
const RIGHT_SHOULDER: Point2 = Point2::new(0.60, 0.30);
const LEFT_HIP: Point2 = Point2::new(0.43, 0.60);
const RIGHT_HIP: Point2 = Point2::new(0.57, 0.60);
const UPPER_ARM: f64 = 0.15;
const FOREARM: f64 = 0.14;
const THIGH: f64 = 0.16;
const SHIN: f64 = 0.16;

/// Pose landmark simulator
pub struct LandmarkSimulator {
    config: SimulationConfig,
    rng: rand::rngs::StdRng,
    jitter: Normal<f64>,
    frame_index: u64,
}

impl LandmarkSimulator {
    /// Create new landmark simulator with configuration
    pub fn new(config: SimulationConfig) -> FitResult<Self> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(fit_core::now_millis);
        let jitter = Self::jitter_distribution(config.jitter_std)?;

        Ok(LandmarkSimulator {
            config,
            rng: rand::rngs::StdRng::seed_from_u64(seed),
            jitter,
            frame_index: 0,
        })
    }

    fn jitter_distribution(std_dev: f64) -> FitResult<Normal<f64>> {
        Normal::new(0.0, std_dev).map_err(|e| FitError::InvalidConfig {
            reason: format!("Failed to create jitter distribution: {}", e),
        })
    }

    /// Generate the next frame in the sequence
    pub fn next_frame(&mut self) -> FitResult<LandmarkFrame> {
        let index = self.frame_index;
        self.frame_index += 1;

        let mut frame = LandmarkFrame::new(index, CoordinateUnits::Normalized);

        let dropped = self.config.dropout_prob > 0.0 && self.rng.gen::<f64>() < self.config.dropout_prob;
        if !dropped {
            let angle = self.config.pattern.angle_at_time(self.time_of(index));
            self.place_skeleton(&mut frame, angle);
        }

        match self.config.units {
            CoordinateUnits::Normalized => Ok(frame),
            CoordinateUnits::Pixel { width, height } => frame.to_pixels(width, height),
        }
    }

    /// Generate `count` consecutive frames
    pub fn generate(&mut self, count: usize) -> FitResult<Vec<LandmarkFrame>> {
        (0..count).map(|_| self.next_frame()).collect()
    }

    fn time_of(&self, frame_index: u64) -> f64 {
        frame_index as f64 / self.config.frame_rate
    }

    fn place_skeleton(&mut self, frame: &mut LandmarkFrame, angle: f64) {
        let (elbow_angle, knee_angle) = match self.config.joint {
            TrackedJoint::Elbows => (angle, 180.0),
            TrackedJoint::Knees => (180.0, angle),
        };

        // Upper limb segments hang straight down; the lower segment rotates
        // by (180 - angle) away from the line, mirrored on the right side.
        let bend = (180.0 - elbow_angle).to_radians();
        let left_elbow = offset(LEFT_SHOULDER, 0.0, UPPER_ARM);
        let right_elbow = offset(RIGHT_SHOULDER, 0.0, UPPER_ARM);
        let left_wrist = offset(left_elbow, FOREARM * bend.sin(), FOREARM * bend.cos());
        let right_wrist = offset(right_elbow, -FOREARM * bend.sin(), FOREARM * bend.cos());

        let bend = (180.0 - knee_angle).to_radians();
        let left_knee = offset(LEFT_HIP, 0.0, THIGH);
        let right_knee = offset(RIGHT_HIP, 0.0, THIGH);
        let left_ankle = offset(left_knee, -SHIN * bend.sin(), SHIN * bend.cos());
        let right_ankle = offset(right_knee, SHIN * bend.sin(), SHIN * bend.cos());

        let points = [
            (Landmark::Nose, Point2::new(0.50, 0.18)),
            (Landmark::LeftShoulder, LEFT_SHOULDER),
            (Landmark::RightShoulder, RIGHT_SHOULDER),
            (Landmark::LeftElbow, left_elbow),
            (Landmark::RightElbow, right_elbow),
            (Landmark::LeftWrist, left_wrist),
            (Landmark::RightWrist, right_wrist),
            (Landmark::LeftHip, LEFT_HIP),
            (Landmark::RightHip, RIGHT_HIP),
            (Landmark::LeftKnee, left_knee),
            (Landmark::RightKnee, right_knee),
            (Landmark::LeftAnkle, left_ankle),
            (Landmark::RightAnkle, right_ankle),
        ];

        for (landmark, point) in points {
            let jittered = Point2::new(
                point.x + self.jitter.sample(&mut self.rng),
                point.y + self.jitter.sample(&mut self.rng),
            );
            frame.set(landmark, jittered);
        }
    }

    /// Restart the pattern from time zero
    pub fn reset_time(&mut self) {
        self.frame_index = 0;
    }

    /// Get current configuration
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Update configuration
    pub fn update_config(&mut self, config: SimulationConfig) -> FitResult<()> {
        config.validate()?;
        self.jitter = Self::jitter_distribution(config.jitter_std)?;
        self.config = config;
        Ok(())
    }

    pub fn set_pattern(&mut self, pattern: MotionPattern) {
        self.config.pattern = pattern;
    }
}

fn offset(origin: Point2, dx: f64, dy: f64) -> Point2 {
    Point2::new(origin.x + dx, origin.y + dy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fit_core::compute_angle;

    fn exact(pattern: MotionPattern) -> SimulationConfig {
        SimulationConfig {
            pattern,
            jitter_std: 0.0,
            seed: Some(7),
            ..Default::default()
        }
    }

    fn left_elbow_angle(frame: &LandmarkFrame) -> f64 {
        compute_angle(
            frame.get(Landmark::LeftShoulder).unwrap(),
            frame.get(Landmark::LeftElbow).unwrap(),
            frame.get(Landmark::LeftWrist).unwrap(),
        )
    }

    #[test]
    fn test_frames_follow_pattern() {
        let pattern = MotionPattern::Sinusoidal { period: 2.0, min_angle: 40.0, max_angle: 170.0 };
        let mut simulator = LandmarkSimulator::new(exact(pattern)).unwrap();

        let frames = simulator.generate(61).unwrap();
        assert_eq!(frames.len(), 61);
        assert_eq!(frames[60].frame_index, 60);

        for frame in &frames {
            let t = frame.frame_index as f64 / 30.0;
            assert!((left_elbow_angle(frame) - pattern.angle_at_time(t)).abs() < 1e-6);
        }

        // Right arm mirrors the left
        let frame = &frames[15];
        let right = compute_angle(
            frame.get(Landmark::RightShoulder).unwrap(),
            frame.get(Landmark::RightElbow).unwrap(),
            frame.get(Landmark::RightWrist).unwrap(),
        );
        assert!((right - left_elbow_angle(frame)).abs() < 1e-6);
    }

    #[test]
    fn test_knee_tracking() {
        let mut config = exact(MotionPattern::Hold { angle: 90.0 });
        config.joint = TrackedJoint::Knees;
        let mut simulator = LandmarkSimulator::new(config).unwrap();
        let frame = simulator.next_frame().unwrap();

        let knee = compute_angle(
            frame.get(Landmark::LeftHip).unwrap(),
            frame.get(Landmark::LeftKnee).unwrap(),
            frame.get(Landmark::LeftAnkle).unwrap(),
        );
        assert!((knee - 90.0).abs() < 1e-6);
        assert!((left_elbow_angle(&frame) - 180.0).abs() < 1e-6);
    }

    #[test]
    fn test_seeded_jitter_is_reproducible() {
        let config = SimulationConfig {
            jitter_std: 0.01,
            seed: Some(42),
            ..Default::default()
        };
        let a = LandmarkSimulator::new(config.clone()).unwrap().generate(5).unwrap();
        let b = LandmarkSimulator::new(config).unwrap().generate(5).unwrap();

        for (fa, fb) in a.iter().zip(b.iter()) {
            assert_eq!(fa.points, fb.points);
        }
    }

    #[test]
    fn test_full_dropout() {
        let config = SimulationConfig {
            dropout_prob: 1.0,
            seed: Some(1),
            ..Default::default()
        };
        let mut simulator = LandmarkSimulator::new(config).unwrap();
        for frame in simulator.generate(10).unwrap() {
            assert!(frame.is_empty());
        }
    }

    #[test]
    fn test_pixel_output() {
        let mut config = exact(MotionPattern::Hold { angle: 170.0 });
        config.units = CoordinateUnits::Pixel { width: 640, height: 480 };
        let mut simulator = LandmarkSimulator::new(config).unwrap();

        let frame = simulator.next_frame().unwrap();
        assert_eq!(frame.units, CoordinateUnits::Pixel { width: 640, height: 480 });
        let shoulder = frame.get(Landmark::LeftShoulder).unwrap();
        assert!((shoulder.x - 256.0).abs() < 1e-9);
        assert!((shoulder.y - 144.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_and_validation() {
        let mut simulator = LandmarkSimulator::new(exact(MotionPattern::default())).unwrap();
        simulator.generate(3).unwrap();
        simulator.reset_time();
        assert_eq!(simulator.next_frame().unwrap().frame_index, 0);

        let mut bad = SimulationConfig::default();
        bad.frame_rate = 0.0;
        assert!(LandmarkSimulator::new(bad.clone()).is_err());
        assert!(simulator.update_config(bad).is_err());

        let mut bad = SimulationConfig::default();
        bad.dropout_prob = 1.5;
        assert!(bad.validate().is_err());
    }
}
