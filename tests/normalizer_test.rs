// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Integration tests for landmark normalization and the pose types around it.

use movenet_inference::{
    EMBEDDING_LEN, Keypoint, KeypointIndex, Pose, SKELETON, landmarks_to_embedding,
};

/// A rough standing figure, hips 40px apart, torso 100px tall.
fn standing_landmarks() -> [[f32; 2]; 17] {
    [
        [120.0, 60.0],  // nose
        [110.0, 50.0],  // left eye
        [130.0, 50.0],  // right eye
        [100.0, 55.0],  // left ear
        [140.0, 55.0],  // right ear
        [100.0, 100.0], // left shoulder
        [140.0, 100.0], // right shoulder
        [90.0, 150.0],  // left elbow
        [150.0, 150.0], // right elbow
        [85.0, 200.0],  // left wrist
        [155.0, 200.0], // right wrist
        [100.0, 200.0], // left hip
        [140.0, 200.0], // right hip
        [100.0, 280.0], // left knee
        [140.0, 280.0], // right knee
        [100.0, 360.0], // left ankle
        [140.0, 360.0], // right ankle
    ]
}

#[test]
fn test_pose_landmarks_feed_the_normalizer() {
    let mut keypoints = [Keypoint::default(); KeypointIndex::COUNT];
    for (kp, src) in keypoints.iter_mut().zip(standing_landmarks().iter()) {
        *kp = Keypoint::new(src[0], src[1], 0.9);
    }
    let pose = Pose::new(keypoints);

    let embedding = landmarks_to_embedding(&pose.landmarks()).unwrap();
    assert_eq!(embedding.len(), EMBEDDING_LEN);

    // Hip center is the origin: left and right hip y-coordinates are zero.
    let lh = KeypointIndex::LeftHip as usize;
    let rh = KeypointIndex::RightHip as usize;
    assert!(embedding[lh * 2 + 1].abs() < 1e-6);
    assert!(embedding[rh * 2 + 1].abs() < 1e-6);

    // Hips are symmetric about the center.
    assert!((embedding[lh * 2] + embedding[rh * 2]).abs() < 1e-6);
}

#[test]
fn test_embedding_invariant_under_similarity_transform() {
    let base = landmarks_to_embedding(&standing_landmarks()).unwrap();

    // Shift and uniformly scale about the hip center (120, 200).
    let mut moved = standing_landmarks();
    for p in &mut moved {
        p[0] = (p[0] - 120.0) * 2.0 + 120.0 + 500.0;
        p[1] = (p[1] - 200.0) * 2.0 + 200.0 - 75.0;
    }
    let transformed = landmarks_to_embedding(&moved).unwrap();

    for (a, b) in base.iter().zip(transformed.iter()) {
        assert!((a - b).abs() < 1e-5, "{a} != {b}");
    }
}

#[test]
fn test_embedding_distinguishes_poses() {
    let standing = landmarks_to_embedding(&standing_landmarks()).unwrap();

    // Raise both wrists above the head.
    let mut arms_up = standing_landmarks();
    arms_up[KeypointIndex::LeftWrist as usize] = [100.0, 20.0];
    arms_up[KeypointIndex::RightWrist as usize] = [140.0, 20.0];
    let raised = landmarks_to_embedding(&arms_up).unwrap();

    let diff: f32 = standing
        .iter()
        .zip(raised.iter())
        .map(|(a, b)| (a - b).abs())
        .sum();
    assert!(diff > 0.1, "different poses should embed differently");
}

#[test]
fn test_skeleton_indices_address_valid_keypoints() {
    let pose = Pose::default();
    for [a, b] in &SKELETON {
        // Indexing through the enum must succeed for every skeleton pair.
        let ia = KeypointIndex::from_index(*a).unwrap();
        let ib = KeypointIndex::from_index(*b).unwrap();
        let _ = pose.get(ia);
        let _ = pose.get(ib);
    }
}
