// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Keypoint and pose types.
//!
//! MoveNet emits 17 body landmarks per detected person in a fixed COCO
//! ordering. [`KeypointIndex`] makes that ordering an explicit enumeration so
//! body parts are addressed by name rather than by bare array position.

use std::fmt;

use crate::error::{PoseError, Result};

/// The 17 MoveNet keypoint indices, in COCO output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum KeypointIndex {
    /// Nose.
    Nose = 0,
    /// Left eye.
    LeftEye = 1,
    /// Right eye.
    RightEye = 2,
    /// Left ear.
    LeftEar = 3,
    /// Right ear.
    RightEar = 4,
    /// Left shoulder.
    LeftShoulder = 5,
    /// Right shoulder.
    RightShoulder = 6,
    /// Left elbow.
    LeftElbow = 7,
    /// Right elbow.
    RightElbow = 8,
    /// Left wrist.
    LeftWrist = 9,
    /// Right wrist.
    RightWrist = 10,
    /// Left hip.
    LeftHip = 11,
    /// Right hip.
    RightHip = 12,
    /// Left knee.
    LeftKnee = 13,
    /// Right knee.
    RightKnee = 14,
    /// Left ankle.
    LeftAnkle = 15,
    /// Right ankle.
    RightAnkle = 16,
}

impl KeypointIndex {
    /// Number of keypoints per pose.
    pub const COUNT: usize = 17;

    /// Look up a keypoint index from its numeric position.
    ///
    /// # Returns
    ///
    /// * `Some` variant for `0..=16`, otherwise `None`.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Nose),
            1 => Some(Self::LeftEye),
            2 => Some(Self::RightEye),
            3 => Some(Self::LeftEar),
            4 => Some(Self::RightEar),
            5 => Some(Self::LeftShoulder),
            6 => Some(Self::RightShoulder),
            7 => Some(Self::LeftElbow),
            8 => Some(Self::RightElbow),
            9 => Some(Self::LeftWrist),
            10 => Some(Self::RightWrist),
            11 => Some(Self::LeftHip),
            12 => Some(Self::RightHip),
            13 => Some(Self::LeftKnee),
            14 => Some(Self::RightKnee),
            15 => Some(Self::LeftAnkle),
            16 => Some(Self::RightAnkle),
            _ => None,
        }
    }

    /// Human-readable keypoint name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "left_eye",
            Self::RightEye => "right_eye",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }
}

impl fmt::Display for KeypointIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single detected body landmark in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Keypoint {
    /// X pixel coordinate.
    pub x: f32,
    /// Y pixel coordinate.
    pub y: f32,
    /// Detection confidence (0.0 to 1.0).
    pub score: f32,
}

impl Keypoint {
    /// Create a new keypoint.
    #[must_use]
    pub const fn new(x: f32, y: f32, score: f32) -> Self {
        Self { x, y, score }
    }

    /// Whether the keypoint's confidence meets a threshold.
    #[must_use]
    pub fn is_valid(&self, threshold: f32) -> bool {
        self.score >= threshold
    }
}

/// One detected body: exactly 17 keypoints in [`KeypointIndex`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    keypoints: [Keypoint; KeypointIndex::COUNT],
}

impl Pose {
    /// Create a pose from a fixed-size keypoint array.
    #[must_use]
    pub const fn new(keypoints: [Keypoint; KeypointIndex::COUNT]) -> Self {
        Self { keypoints }
    }

    /// Create a pose from a keypoint slice.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::InvalidInput`] unless the slice holds exactly
    /// 17 keypoints.
    pub fn from_keypoints(keypoints: &[Keypoint]) -> Result<Self> {
        let keypoints: [Keypoint; KeypointIndex::COUNT] =
            keypoints.try_into().map_err(|_| {
                PoseError::InvalidInput(format!(
                    "expected {} keypoints, got {}",
                    KeypointIndex::COUNT,
                    keypoints.len()
                ))
            })?;
        Ok(Self { keypoints })
    }

    /// Get a keypoint by its named index.
    #[must_use]
    pub fn get(&self, index: KeypointIndex) -> &Keypoint {
        &self.keypoints[index as usize]
    }

    /// All 17 keypoints in [`KeypointIndex`] order.
    #[must_use]
    pub const fn keypoints(&self) -> &[Keypoint; KeypointIndex::COUNT] {
        &self.keypoints
    }

    /// The `(x, y)` landmark grid consumed by the normalizer.
    #[must_use]
    pub fn landmarks(&self) -> [[f32; 2]; KeypointIndex::COUNT] {
        let mut out = [[0.0; 2]; KeypointIndex::COUNT];
        for (dst, kp) in out.iter_mut().zip(self.keypoints.iter()) {
            *dst = [kp.x, kp.y];
        }
        out
    }

    /// Mean keypoint confidence across the pose.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn score(&self) -> f32 {
        let sum: f32 = self.keypoints.iter().map(|k| k.score).sum();
        sum / KeypointIndex::COUNT as f32
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            keypoints: [Keypoint::default(); KeypointIndex::COUNT],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypoint_index_count() {
        assert_eq!(KeypointIndex::COUNT, 17);
    }

    #[test]
    fn test_keypoint_index_from_index() {
        assert_eq!(KeypointIndex::from_index(0), Some(KeypointIndex::Nose));
        assert_eq!(
            KeypointIndex::from_index(16),
            Some(KeypointIndex::RightAnkle)
        );
        assert_eq!(KeypointIndex::from_index(17), None);
    }

    #[test]
    fn test_keypoint_index_as_str() {
        assert_eq!(KeypointIndex::LeftHip.as_str(), "left_hip");
        assert_eq!(KeypointIndex::Nose.to_string(), "nose");
    }

    #[test]
    fn test_keypoint_is_valid() {
        let kp = Keypoint::new(10.0, 20.0, 0.7);
        assert!(kp.is_valid(0.5));
        assert!(!kp.is_valid(0.8));
    }

    #[test]
    fn test_pose_get() {
        let mut keypoints = [Keypoint::default(); KeypointIndex::COUNT];
        keypoints[KeypointIndex::Nose as usize] = Keypoint::new(320.0, 120.0, 0.9);

        let pose = Pose::new(keypoints);
        let nose = pose.get(KeypointIndex::Nose);
        assert!((nose.x - 320.0).abs() < f32::EPSILON);
        assert!((nose.y - 120.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_pose_from_keypoints_rejects_wrong_count() {
        let short = vec![Keypoint::default(); 16];
        let result = Pose::from_keypoints(&short);
        assert!(matches!(result, Err(PoseError::InvalidInput(_))));

        let exact = vec![Keypoint::default(); 17];
        assert!(Pose::from_keypoints(&exact).is_ok());
    }

    #[test]
    fn test_pose_landmarks_order() {
        let mut keypoints = [Keypoint::default(); KeypointIndex::COUNT];
        keypoints[KeypointIndex::LeftHip as usize] = Keypoint::new(100.0, 200.0, 1.0);

        let pose = Pose::new(keypoints);
        let landmarks = pose.landmarks();
        assert_eq!(landmarks.len(), 17);
        assert!((landmarks[11][0] - 100.0).abs() < f32::EPSILON);
        assert!((landmarks[11][1] - 200.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_pose_score() {
        let keypoints = [Keypoint::new(0.0, 0.0, 0.5); KeypointIndex::COUNT];
        let pose = Pose::new(keypoints);
        assert!((pose.score() - 0.5).abs() < 0.001);
    }
}
