// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Landmark normalization for pose classification.
//!
//! The pose classifier was trained on landmarks that were centered on the
//! hips and scaled by body size, so raw pixel coordinates must go through the
//! same transform before inference. The resulting embedding is invariant
//! under uniform translation and scaling of the source pose.

use crate::error::{PoseError, Result};
use crate::keypoint::KeypointIndex;

/// Length of a flattened pose embedding (17 keypoints x 2 coordinates).
pub const EMBEDDING_LEN: usize = 34;

/// Expected ratio of full body extent to torso length. Keeps the scale
/// reference from collapsing when all limbs are folded near the hips.
pub const TORSO_SIZE_MULTIPLIER: f32 = 2.5;

/// Midpoint of two landmarks.
fn center_point(landmarks: &[[f32; 2]], left: KeypointIndex, right: KeypointIndex) -> [f32; 2] {
    let l = landmarks[left as usize];
    let r = landmarks[right as usize];
    [(l[0] + r[0]) * 0.5, (l[1] + r[1]) * 0.5]
}

/// Scale reference for a hip-centered pose: the larger of the torso length
/// scaled by [`TORSO_SIZE_MULTIPLIER`] and the farthest keypoint distance
/// from the hip center.
fn pose_size(landmarks: &[[f32; 2]]) -> f32 {
    // Landmarks are already hip-centered, so the shoulder center's norm is
    // the torso length and each keypoint's norm is its distance from center.
    let shoulders_center = center_point(
        landmarks,
        KeypointIndex::LeftShoulder,
        KeypointIndex::RightShoulder,
    );
    let torso_size = (shoulders_center[0].powi(2) + shoulders_center[1].powi(2)).sqrt();

    let max_dist = landmarks
        .iter()
        .map(|p| (p[0].powi(2) + p[1].powi(2)).sqrt())
        .fold(0.0_f32, f32::max);

    (torso_size * TORSO_SIZE_MULTIPLIER).max(max_dist)
}

/// Normalize 17 pose landmarks into a flat 34-element embedding.
///
/// The transform centers the landmarks on the hip midpoint, divides by the
/// pose size from [`pose_size`], and flattens keypoint-major
/// (`x0, y0, x1, y1, ...`). It is a pure function with no retained state.
///
/// A fully degenerate pose (every landmark on the hip center) has pose size
/// zero and the division yields NaN, matching the reference preprocessing
/// that the classifier was trained against. No epsilon clamp is applied.
///
/// # Arguments
///
/// * `landmarks` - Exactly 17 `[x, y]` pairs in [`KeypointIndex`] order,
///   pixel coordinates.
///
/// # Returns
///
/// * The 34-element embedding.
///
/// # Errors
///
/// Returns [`PoseError::InvalidInput`] if `landmarks` does not hold exactly
/// 17 entries.
pub fn landmarks_to_embedding(landmarks: &[[f32; 2]]) -> Result<[f32; EMBEDDING_LEN]> {
    if landmarks.len() != KeypointIndex::COUNT {
        return Err(PoseError::InvalidInput(format!(
            "expected {} landmarks, got {}",
            KeypointIndex::COUNT,
            landmarks.len()
        )));
    }

    // Translate so the hip center becomes the origin.
    let pose_center = center_point(landmarks, KeypointIndex::LeftHip, KeypointIndex::RightHip);
    let mut centered = [[0.0_f32; 2]; KeypointIndex::COUNT];
    for (dst, src) in centered.iter_mut().zip(landmarks.iter()) {
        dst[0] = src[0] - pose_center[0];
        dst[1] = src[1] - pose_center[1];
    }

    // Uniform scale: both coordinates divided by the same scalar.
    let size = pose_size(&centered);

    let mut embedding = [0.0_f32; EMBEDDING_LEN];
    for (i, point) in centered.iter().enumerate() {
        embedding[i * 2] = point[0] / size;
        embedding[i * 2 + 1] = point[1] / size;
    }

    Ok(embedding)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-5;

    /// Synthetic upright pose with hips at (100,200)/(140,200) and shoulders
    /// at (100,100)/(140,100).
    fn synthetic_pose() -> [[f32; 2]; 17] {
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

    fn assert_close(a: &[f32], b: &[f32]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < TOLERANCE, "{x} != {y}");
        }
    }

    #[test]
    fn test_embedding_shape() {
        let embedding = landmarks_to_embedding(&synthetic_pose()).unwrap();
        assert_eq!(embedding.len(), EMBEDDING_LEN);
    }

    #[test]
    fn test_rejects_wrong_landmark_count() {
        let short = [[0.0_f32; 2]; 16];
        assert!(matches!(
            landmarks_to_embedding(&short),
            Err(PoseError::InvalidInput(_))
        ));
        let long = [[0.0_f32; 2]; 18];
        assert!(matches!(
            landmarks_to_embedding(&long),
            Err(PoseError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_concrete_scenario() {
        // hip_center = (120, 200); translated shoulder_center = (0, -100);
        // torso_size = 100; max_dist = ankles at (+-20, 160) -> ~161.245;
        // pose_size = max(250, 161.245) = 250.
        let embedding = landmarks_to_embedding(&synthetic_pose()).unwrap();

        // Left shoulder: (100-120, 100-200) / 250 = (-0.08, -0.4).
        assert!((embedding[10] - (-0.08)).abs() < TOLERANCE);
        assert!((embedding[11] - (-0.4)).abs() < TOLERANCE);

        // Left hip: (100-120, 200-200) / 250 = (-0.08, 0.0).
        assert!((embedding[22] - (-0.08)).abs() < TOLERANCE);
        assert!(embedding[23].abs() < TOLERANCE);

        // Nose: (120-120, 60-200) / 250 = (0.0, -0.56).
        assert!(embedding[0].abs() < TOLERANCE);
        assert!((embedding[1] - (-0.56)).abs() < TOLERANCE);

        // Right ankle: (140-120, 360-200) / 250 = (0.08, 0.64).
        assert!((embedding[32] - 0.08).abs() < TOLERANCE);
        assert!((embedding[33] - 0.64).abs() < TOLERANCE);
    }

    #[test]
    fn test_translation_invariance() {
        let base = landmarks_to_embedding(&synthetic_pose()).unwrap();

        let mut shifted = synthetic_pose();
        for p in &mut shifted {
            p[0] += 313.0;
            p[1] -= 97.5;
        }
        let moved = landmarks_to_embedding(&shifted).unwrap();

        assert_close(&base, &moved);
    }

    #[test]
    fn test_scale_invariance() {
        let base = landmarks_to_embedding(&synthetic_pose()).unwrap();

        // Scale about the hip center (120, 200) by 3.5.
        let mut scaled = synthetic_pose();
        for p in &mut scaled {
            p[0] = (p[0] - 120.0) * 3.5 + 120.0;
            p[1] = (p[1] - 200.0) * 3.5 + 200.0;
        }
        let grown = landmarks_to_embedding(&scaled).unwrap();

        assert_close(&base, &grown);
    }

    #[test]
    fn test_determinism() {
        let a = landmarks_to_embedding(&synthetic_pose()).unwrap();
        let b = landmarks_to_embedding(&synthetic_pose()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_degenerate_pose_is_nan() {
        // All keypoints coincident: torso_size = 0, max_dist = 0,
        // pose_size = 0 and the unguarded division produces NaN.
        let collapsed = [[42.0_f32, 42.0]; 17];
        let embedding = landmarks_to_embedding(&collapsed).unwrap();
        assert!(embedding.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_folded_limbs_use_torso_scale() {
        // Keypoints near the hip center but a full torso: pose_size must
        // come from torso_size * 2.5, not the tiny max_dist.
        let mut pose = [[120.0_f32, 200.0]; 17];
        pose[KeypointIndex::LeftShoulder as usize] = [100.0, 100.0];
        pose[KeypointIndex::RightShoulder as usize] = [140.0, 100.0];
        pose[KeypointIndex::LeftHip as usize] = [100.0, 200.0];
        pose[KeypointIndex::RightHip as usize] = [140.0, 200.0];

        let embedding = landmarks_to_embedding(&pose).unwrap();
        // pose_size = max(100 * 2.5, 101.98...) = 250.
        let ls_y = embedding[KeypointIndex::LeftShoulder as usize * 2 + 1];
        assert!((ls_y - (-0.4)).abs() < TOLERANCE);
    }
}
