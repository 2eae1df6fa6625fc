//! Pose boundary: typed landmarks in, joint angles out
//!
//! Pose estimation and the angle geometry live outside this crate. This module
//! fixes the contract they have to meet:
//! - `Landmarks`: named joint coordinates, independent of any pose library
//! - `AngleEstimator`: landmarks → tracked angles
//! - `AngleSource`: anything that yields one angle frame at a time

pub mod simulate;

pub use simulate::SimulatedSource;

use crate::angles::{AngleMap, AngleName};

/// Number of named joints
pub const JOINT_COUNT: usize = 8;

/// Joints the angle layer reads
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Joint {
    ShoulderLeft,
    ShoulderRight,
    ElbowLeft,
    ElbowRight,
    WristLeft,
    WristRight,
    HipLeft,
    HipRight,
}

impl Joint {
    pub const ALL: [Joint; JOINT_COUNT] = [
        Joint::ShoulderLeft,
        Joint::ShoulderRight,
        Joint::ElbowLeft,
        Joint::ElbowRight,
        Joint::WristLeft,
        Joint::WristRight,
        Joint::HipLeft,
        Joint::HipRight,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Joint::ShoulderLeft => "shoulder_left",
            Joint::ShoulderRight => "shoulder_right",
            Joint::ElbowLeft => "elbow_left",
            Joint::ElbowRight => "elbow_right",
            Joint::WristLeft => "wrist_left",
            Joint::WristRight => "wrist_right",
            Joint::HipLeft => "hip_left",
            Joint::HipRight => "hip_right",
        }
    }
}

/// Normalized image-space position with detector confidence
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// 0.0-1.0
    pub visibility: f64,
}

/// One detected pose, keyed by joint
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Landmarks {
    points: [Option<Keypoint>; JOINT_COUNT],
}

impl Landmarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, joint: Joint, point: Keypoint) {
        self.points[joint.index()] = Some(point);
    }

    pub fn get(&self, joint: Joint) -> Option<Keypoint> {
        self.points[joint.index()]
    }

    /// Joint position only if the detector is at least `min_visibility` sure of it
    pub fn visible(&self, joint: Joint, min_visibility: f64) -> Option<Keypoint> {
        self.get(joint).filter(|p| p.visibility >= min_visibility)
    }
}

/// Angle geometry implemented by the pose layer
pub trait AngleEstimator {
    /// Angles that could be computed; joints that are not visible leave
    /// their angles out of the map
    fn estimate(&self, landmarks: &Landmarks) -> AngleMap<f64>;
}

/// Frame-by-frame angle producer
pub trait AngleSource {
    /// Next frame of angles, `None` once the stream has ended
    fn next_angles(&mut self) -> Option<AngleMap<f64>>;

    /// Angles flagged with a critical event (a fall, leaving the frame) in the
    /// frame last returned by `next_angles`
    fn critical_events(&self) -> &[AngleName] {
        &[]
    }
}

/// Adapts a stream of landmarks and an estimator into an `AngleSource`
pub struct EstimatedSource<I, E> {
    landmarks: I,
    estimator: E,
}

impl<I, E> EstimatedSource<I, E>
where
    I: Iterator<Item = Landmarks>,
    E: AngleEstimator,
{
    pub fn new(landmarks: I, estimator: E) -> Self {
        EstimatedSource {
            landmarks,
            estimator,
        }
    }
}

impl<I, E> AngleSource for EstimatedSource<I, E>
where
    I: Iterator<Item = Landmarks>,
    E: AngleEstimator,
{
    fn next_angles(&mut self) -> Option<AngleMap<f64>> {
        let landmarks = self.landmarks.next()?;
        Some(self.estimator.estimate(&landmarks))
    }
}
