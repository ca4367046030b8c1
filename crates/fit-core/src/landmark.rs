//! Pose landmarks: the per-frame joint coordinates produced by an external
//! pose estimator.

use crate::error::{FitError, FitResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of landmarks in the pose topology
pub const LANDMARK_COUNT: usize = 33;

/// A 2-D joint coordinate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point halfway between `self` and `other`
    pub fn midpoint(&self, other: &Point2) -> Point2 {
        Point2 {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }
}

impl From<(f64, f64)> for Point2 {
    fn from((x, y): (f64, f64)) -> Self {
        Point2 { x, y }
    }
}

/// Named landmarks of the 33-point pose topology, indexed as the pose
/// estimator reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Landmark {
    Nose,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl Landmark {
    /// All landmarks in index order
    pub const ALL: [Landmark; LANDMARK_COUNT] = [
        Landmark::Nose,
        Landmark::LeftEyeInner,
        Landmark::LeftEye,
        Landmark::LeftEyeOuter,
        Landmark::RightEyeInner,
        Landmark::RightEye,
        Landmark::RightEyeOuter,
        Landmark::LeftEar,
        Landmark::RightEar,
        Landmark::MouthLeft,
        Landmark::MouthRight,
        Landmark::LeftShoulder,
        Landmark::RightShoulder,
        Landmark::LeftElbow,
        Landmark::RightElbow,
        Landmark::LeftWrist,
        Landmark::RightWrist,
        Landmark::LeftPinky,
        Landmark::RightPinky,
        Landmark::LeftIndex,
        Landmark::RightIndex,
        Landmark::LeftThumb,
        Landmark::RightThumb,
        Landmark::LeftHip,
        Landmark::RightHip,
        Landmark::LeftKnee,
        Landmark::RightKnee,
        Landmark::LeftAnkle,
        Landmark::RightAnkle,
        Landmark::LeftHeel,
        Landmark::RightHeel,
        Landmark::LeftFootIndex,
        Landmark::RightFootIndex,
    ];

    /// Index of this landmark in the estimator output
    pub fn index(self) -> usize {
        self as usize
    }

    /// Landmark at the given estimator index
    pub fn from_index(index: usize) -> Option<Landmark> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Landmark::Nose => "nose",
            Landmark::LeftEyeInner => "left_eye_inner",
            Landmark::LeftEye => "left_eye",
            Landmark::LeftEyeOuter => "left_eye_outer",
            Landmark::RightEyeInner => "right_eye_inner",
            Landmark::RightEye => "right_eye",
            Landmark::RightEyeOuter => "right_eye_outer",
            Landmark::LeftEar => "left_ear",
            Landmark::RightEar => "right_ear",
            Landmark::MouthLeft => "mouth_left",
            Landmark::MouthRight => "mouth_right",
            Landmark::LeftShoulder => "left_shoulder",
            Landmark::RightShoulder => "right_shoulder",
            Landmark::LeftElbow => "left_elbow",
            Landmark::RightElbow => "right_elbow",
            Landmark::LeftWrist => "left_wrist",
            Landmark::RightWrist => "right_wrist",
            Landmark::LeftPinky => "left_pinky",
            Landmark::RightPinky => "right_pinky",
            Landmark::LeftIndex => "left_index",
            Landmark::RightIndex => "right_index",
            Landmark::LeftThumb => "left_thumb",
            Landmark::RightThumb => "right_thumb",
            Landmark::LeftHip => "left_hip",
            Landmark::RightHip => "right_hip",
            Landmark::LeftKnee => "left_knee",
            Landmark::RightKnee => "right_knee",
            Landmark::LeftAnkle => "left_ankle",
            Landmark::RightAnkle => "right_ankle",
            Landmark::LeftHeel => "left_heel",
            Landmark::RightHeel => "right_heel",
            Landmark::LeftFootIndex => "left_foot_index",
            Landmark::RightFootIndex => "right_foot_index",
        }
    }
}

impl std::fmt::Display for Landmark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Units the frame coordinates are expressed in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CoordinateUnits {
    /// Coordinates in `[0, 1]` relative to the image
    Normalized,
    /// Coordinates scaled to image pixels
    Pixel { width: u32, height: u32 },
}

/// One video frame worth of pose landmarks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Unique identifier for this frame
    pub id: Uuid,
    /// Position of the frame in its capture sequence
    pub frame_index: u64,
    /// Landmark coordinates indexed by [`Landmark::index`]
    pub points: Vec<Option<Point2>>,
    /// Units of `points`
    pub units: CoordinateUnits,
    /// Capture timestamp (ms since UNIX epoch)
    pub captured_at: u64,
}

impl LandmarkFrame {
    /// Create a frame with no detected landmarks
    pub fn new(frame_index: u64, units: CoordinateUnits) -> Self {
        LandmarkFrame {
            id: Uuid::new_v4(),
            frame_index,
            points: vec![None; LANDMARK_COUNT],
            units,
            captured_at: crate::now_millis(),
        }
    }

    /// Builder-style landmark insertion
    pub fn with(mut self, landmark: Landmark, point: impl Into<Point2>) -> Self {
        self.set(landmark, point);
        self
    }

    pub fn set(&mut self, landmark: Landmark, point: impl Into<Point2>) {
        if self.points.len() < LANDMARK_COUNT {
            self.points.resize(LANDMARK_COUNT, None);
        }
        self.points[landmark.index()] = Some(point.into());
    }

    pub fn contains(&self, landmark: Landmark) -> bool {
        matches!(self.points.get(landmark.index()), Some(Some(_)))
    }

    /// True when the estimator detected no landmark at all
    pub fn is_empty(&self) -> bool {
        self.points.iter().all(Option::is_none)
    }

    /// Coordinates of a landmark
    pub fn get(&self, landmark: Landmark) -> FitResult<Point2> {
        self.points
            .get(landmark.index())
            .copied()
            .flatten()
            .ok_or(FitError::MissingLandmark {
                landmark: landmark.name(),
            })
    }

    /// Midpoint between two landmarks, e.g. the hip center
    pub fn midpoint(&self, a: Landmark, b: Landmark) -> FitResult<Point2> {
        Ok(self.get(a)?.midpoint(&self.get(b)?))
    }

    /// Scale a normalized frame to pixel units. Frames already in pixels
    /// are returned unchanged.
    pub fn to_pixels(&self, width: u32, height: u32) -> FitResult<LandmarkFrame> {
        if width == 0 || height == 0 {
            return Err(FitError::InvalidFrameSize { width, height });
        }

        match self.units {
            CoordinateUnits::Pixel { .. } => Ok(self.clone()),
            CoordinateUnits::Normalized => {
                let points = self
                    .points
                    .iter()
                    .map(|p| {
                        p.map(|p| Point2 {
                            x: p.x * width as f64,
                            y: p.y * height as f64,
                        })
                    })
                    .collect();

                Ok(LandmarkFrame {
                    id: self.id,
                    frame_index: self.frame_index,
                    points,
                    units: CoordinateUnits::Pixel { width, height },
                    captured_at: self.captured_at,
                })
            }
        }
    }

    /// Inverse of [`to_pixels`](Self::to_pixels): express the frame in
    /// normalized coordinates.
    pub fn to_normalized(&self) -> FitResult<LandmarkFrame> {
        match self.units {
            CoordinateUnits::Normalized => Ok(self.clone()),
            CoordinateUnits::Pixel { width, height } => {
                if width == 0 || height == 0 {
                    return Err(FitError::InvalidFrameSize { width, height });
                }
                let points = self
                    .points
                    .iter()
                    .map(|p| {
                        p.map(|p| Point2 {
                            x: p.x / width as f64,
                            y: p.y / height as f64,
                        })
                    })
                    .collect();

                Ok(LandmarkFrame {
                    id: self.id,
                    frame_index: self.frame_index,
                    points,
                    units: CoordinateUnits::Normalized,
                    captured_at: self.captured_at,
                })
            }
        }
    }
}
