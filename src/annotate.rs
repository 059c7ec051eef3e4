// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Skeleton overlay rendering.
//!
//! Draws detected poses onto a frame: one circle per keypoint plus the
//! line segments defined by [`SKELETON`].

use image::{DynamicImage, Rgb};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut};

use crate::keypoint::Pose;
use crate::skeleton::SKELETON;

/// Keypoint marker radius in pixels.
const KEYPOINT_RADIUS: i32 = 5;

/// Overlay color for keypoints and skeleton segments.
const OVERLAY_COLOR: Rgb<u8> = Rgb([128, 128, 128]);

/// Annotate an image with pose keypoints and skeleton lines.
///
/// Every keypoint is drawn regardless of its confidence; filtering is the
/// detector's job, not the renderer's.
///
/// # Arguments
///
/// * `image` - The frame the poses were detected on.
/// * `poses` - Detected poses in the frame's pixel coordinates.
///
/// # Returns
///
/// * A new annotated image; the input is not modified.
#[must_use]
pub fn annotate_image(image: &DynamicImage, poses: &[Pose]) -> DynamicImage {
    let mut img = image.to_rgb8();

    for pose in poses {
        let keypoints = pose.keypoints();

        for kp in keypoints {
            #[allow(clippy::cast_possible_truncation)]
            let (cx, cy) = (kp.x.round() as i32, kp.y.round() as i32);
            draw_filled_circle_mut(&mut img, (cx, cy), KEYPOINT_RADIUS, OVERLAY_COLOR);
            draw_hollow_circle_mut(&mut img, (cx, cy), KEYPOINT_RADIUS, OVERLAY_COLOR);
        }

        for [a, b] in &SKELETON {
            let from = &keypoints[*a];
            let to = &keypoints[*b];
            draw_line_segment_mut(&mut img, (from.x, from.y), (to.x, to.y), OVERLAY_COLOR);
        }
    }

    DynamicImage::ImageRgb8(img)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypoint::{Keypoint, KeypointIndex};

    fn spread_pose() -> Pose {
        let mut keypoints = [Keypoint::default(); KeypointIndex::COUNT];
        for (i, kp) in keypoints.iter_mut().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let offset = i as f32 * 10.0;
            *kp = Keypoint::new(50.0 + offset, 40.0 + offset, 0.9);
        }
        Pose::new(keypoints)
    }

    #[test]
    fn test_annotate_changes_pixels() {
        let blank = DynamicImage::new_rgb8(320, 240);
        let annotated = annotate_image(&blank, &[spread_pose()]);

        let buf = annotated.to_rgb8();
        let drawn = buf.pixels().filter(|p| p.0 != [0, 0, 0]).count();
        assert!(drawn > 0, "overlay should draw something");
    }

    #[test]
    fn test_annotate_preserves_dimensions() {
        let blank = DynamicImage::new_rgb8(320, 240);
        let annotated = annotate_image(&blank, &[spread_pose()]);
        assert_eq!(annotated.width(), 320);
        assert_eq!(annotated.height(), 240);
    }

    #[test]
    fn test_annotate_no_poses_is_identity() {
        let blank = DynamicImage::new_rgb8(64, 64);
        let annotated = annotate_image(&blank, &[]);
        assert_eq!(blank.to_rgb8().as_raw(), annotated.to_rgb8().as_raw());
    }

    #[test]
    fn test_annotate_handles_out_of_bounds_keypoints() {
        // Keypoints outside the frame must not panic, just clip.
        let mut keypoints = [Keypoint::default(); KeypointIndex::COUNT];
        keypoints[0] = Keypoint::new(-50.0, -50.0, 0.9);
        keypoints[1] = Keypoint::new(1000.0, 1000.0, 0.9);
        let pose = Pose::new(keypoints);

        let blank = DynamicImage::new_rgb8(64, 64);
        let annotated = annotate_image(&blank, &[pose]);
        assert_eq!(annotated.width(), 64);
    }
}
