// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Result types for pose estimation and classification output.
//!
//! This module groups everything one processed frame produced: the detected
//! poses, the optional classifier scores, and per-stage timing.

use crate::classifier::ClassScores;
use crate::keypoint::Pose;

/// Timing information for inference operations (in milliseconds).
#[derive(Debug, Clone, Default)]
pub struct Speed {
    /// Time spent on preprocessing.
    pub preprocess: Option<f64>,
    /// Time spent on model inference.
    pub inference: Option<f64>,
    /// Time spent on postprocessing (decoding and classification).
    pub postprocess: Option<f64>,
}

impl Speed {
    /// Create a new Speed instance with all timings.
    ///
    /// # Arguments
    ///
    /// * `preprocess` - Time in milliseconds.
    /// * `inference` - Time in milliseconds.
    /// * `postprocess` - Time in milliseconds.
    ///
    /// # Returns
    ///
    /// * A new `Speed` instance.
    #[must_use]
    pub const fn new(preprocess: f64, inference: f64, postprocess: f64) -> Self {
        Self {
            preprocess: Some(preprocess),
            inference: Some(inference),
            postprocess: Some(postprocess),
        }
    }

    /// Get total inference time.
    ///
    /// # Returns
    ///
    /// * Sum of preprocess, inference, and postprocess times in milliseconds.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.preprocess.unwrap_or(0.0)
            + self.inference.unwrap_or(0.0)
            + self.postprocess.unwrap_or(0.0)
    }
}

/// Results container for one processed frame.
#[derive(Debug, Clone)]
pub struct Results {
    /// Detected poses in source-image pixel coordinates.
    pub poses: Vec<Pose>,
    /// Classification scores for the first detected pose, when a classifier
    /// ran on this frame.
    pub scores: Option<ClassScores>,
    /// Original frame shape (height, width).
    pub orig_shape: (u32, u32),
    /// Inference timing information.
    pub speed: Speed,
    /// Path to the source image/video.
    pub path: String,
}

impl Results {
    /// Create a new Results instance.
    ///
    /// # Arguments
    ///
    /// * `poses` - Detected poses.
    /// * `scores` - Optional classification scores.
    /// * `orig_shape` - Frame shape (height, width).
    /// * `speed` - Timing information.
    /// * `path` - Path to the source image/video.
    ///
    /// # Returns
    ///
    /// * A new `Results` instance.
    #[must_use]
    pub const fn new(
        poses: Vec<Pose>,
        scores: Option<ClassScores>,
        orig_shape: (u32, u32),
        speed: Speed,
        path: String,
    ) -> Self {
        Self {
            poses,
            scores,
            orig_shape,
            speed,
            path,
        }
    }

    /// Get the number of detected poses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    /// Check if no poses were detected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Get the original frame shape (height, width).
    #[must_use]
    pub const fn orig_shape(&self) -> (u32, u32) {
        self.orig_shape
    }

    /// Generate a verbose log string describing the results.
    ///
    /// # Returns
    ///
    /// * A string summary (e.g., `"1 pose, Tree 99.12, "`).
    #[must_use]
    pub fn verbose(&self) -> String {
        if self.is_empty() {
            return "(no poses), ".to_string();
        }

        let suffix = if self.len() > 1 { "s" } else { "" };
        let mut out = format!("{} pose{suffix}, ", self.len());

        if let Some(ref scores) = self.scores {
            out.push_str(&format!("{scores}, "));
        }

        out
    }

    /// Save the annotated result to a file.
    ///
    /// # Arguments
    ///
    /// * `image` - The frame the poses were detected on.
    /// * `path` - The path to save the image to.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be saved or if the format is unsupported.
    #[cfg(feature = "annotate")]
    pub fn save<P: AsRef<std::path::Path>>(
        &self,
        image: &image::DynamicImage,
        path: P,
    ) -> crate::error::Result<()> {
        let annotated = crate::annotate::annotate_image(image, &self.poses);
        annotated
            .save(path)
            .map_err(|e| crate::error::PoseError::ImageError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::PoseClass;

    #[test]
    fn test_speed_total() {
        let speed = Speed::new(10.0, 20.0, 5.0);
        assert!((speed.total() - 35.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_results_verbose() {
        let results = Results::new(
            Vec::new(),
            None,
            (480, 640),
            Speed::default(),
            "test.jpg".to_string(),
        );
        assert!(results.is_empty());
        assert_eq!(results.verbose(), "(no poses), ");
    }

    #[test]
    fn test_results_verbose_with_scores() {
        let scores = ClassScores::new([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.99, 0.01]);
        assert_eq!(scores.top1().0, PoseClass::Tree);

        let results = Results::new(
            vec![Pose::default()],
            Some(scores),
            (480, 640),
            Speed::default(),
            "test.jpg".to_string(),
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results.verbose(), "1 pose, Tree 99.00, ");
    }

    #[test]
    fn test_results_verbose_plural() {
        let results = Results::new(
            vec![Pose::default(), Pose::default()],
            None,
            (480, 640),
            Speed::default(),
            "crowd.jpg".to_string(),
        );
        assert_eq!(results.verbose(), "2 poses, ");
    }
}
