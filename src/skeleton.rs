// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// MoveNet skeleton structure (pairs of keypoint indices)
/// Defines which keypoints connect to form the pose skeleton
pub const SKELETON: [[usize; 2]; 16] = [
    [0, 1],   // nose to left eye
    [0, 2],   // nose to right eye
    [1, 3],   // left eye to left ear
    [2, 4],   // right eye to right ear
    [5, 6],   // left shoulder to right shoulder
    [6, 8],   // right shoulder to right elbow
    [8, 10],  // right elbow to right wrist
    [5, 7],   // left shoulder to left elbow
    [7, 9],   // left elbow to left wrist
    [6, 12],  // right shoulder to right hip
    [12, 14], // right hip to right knee
    [14, 16], // right knee to right ankle
    [5, 11],  // left shoulder to left hip
    [11, 13], // left hip to left knee
    [13, 15], // left knee to left ankle
    [11, 12], // left hip to right hip
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypoint::KeypointIndex;

    #[test]
    fn test_skeleton_shape() {
        assert_eq!(SKELETON.len(), 16);
        for pair in &SKELETON {
            assert!(pair[0] < KeypointIndex::COUNT);
            assert!(pair[1] < KeypointIndex::COUNT);
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn test_skeleton_connects_hips() {
        assert!(SKELETON.contains(&[
            KeypointIndex::LeftHip as usize,
            KeypointIndex::RightHip as usize
        ]));
    }
}
