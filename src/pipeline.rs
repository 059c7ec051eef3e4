// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! End-to-end pose estimation and classification pipeline.
//!
//! A [`Pipeline`] ties a [`MoveNetDetector`] to an optional
//! [`PoseClassifier`]: each frame goes through detection, landmark
//! normalization, and classification in a single synchronous call. One frame
//! in flight at a time; the next frame is only processed once the previous
//! call has returned.

use std::time::Instant;

use image::DynamicImage;

use crate::classifier::PoseClassifier;
use crate::detector::MoveNetDetector;
use crate::embedding::landmarks_to_embedding;
use crate::error::Result;
use crate::results::{Results, Speed};

/// Detection plus optional classification over single frames.
///
/// # Example
///
/// ```no_run
/// use movenet_inference::{ModelVariant, MoveNetDetector, Pipeline, PoseClassifier};
///
/// let detector =
///     MoveNetDetector::load("movenet-singlepose-lightning.onnx", ModelVariant::SinglePoseLightning)?;
/// let classifier = PoseClassifier::load("pose-classifier.onnx")?;
/// let mut pipeline = Pipeline::new(detector).with_classifier(classifier);
///
/// let img = image::open("tree-pose.jpg")?;
/// let results = pipeline.process_frame(&img, "tree-pose.jpg")?;
/// if let Some(scores) = &results.scores {
///     println!("{}", scores);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Pipeline {
    detector: MoveNetDetector,
    classifier: Option<PoseClassifier>,
}

impl Pipeline {
    /// Create a detection-only pipeline.
    #[must_use]
    pub const fn new(detector: MoveNetDetector) -> Self {
        Self {
            detector,
            classifier: None,
        }
    }

    /// Attach a pose classifier to run after detection.
    #[must_use]
    pub fn with_classifier(mut self, classifier: PoseClassifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Whether this pipeline classifies detected poses.
    #[must_use]
    pub const fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    /// Access the underlying detector.
    #[must_use]
    pub const fn detector(&self) -> &MoveNetDetector {
        &self.detector
    }

    /// Process a single frame: detect poses, then classify the first one.
    ///
    /// When the classifier is attached and at least one pose was detected,
    /// the first pose's landmarks are normalized and classified; its scores
    /// land in [`Results::scores`]. A frame with no detected poses yields an
    /// empty `Results` rather than an error, so callers can keep iterating
    /// over a stream.
    ///
    /// # Arguments
    ///
    /// * `image` - The frame to process.
    /// * `path` - Source path or identifier, recorded in the results.
    ///
    /// # Errors
    ///
    /// Returns an error if detection or classification inference fails.
    pub fn process_frame(&mut self, image: &DynamicImage, path: &str) -> Result<Results> {
        let detect_start = Instant::now();
        let poses = self.detector.estimate_poses(image)?;
        let inference_ms = detect_start.elapsed().as_secs_f64() * 1000.0;

        let classify_start = Instant::now();
        let scores = match (&mut self.classifier, poses.first()) {
            (Some(classifier), Some(pose)) => {
                let embedding = landmarks_to_embedding(&pose.landmarks())?;
                Some(classifier.classify(&embedding)?)
            }
            _ => None,
        };
        let postprocess_ms = classify_start.elapsed().as_secs_f64() * 1000.0;

        let speed = Speed {
            preprocess: None,
            inference: Some(inference_ms),
            postprocess: Some(postprocess_ms),
        };

        Ok(Results::new(
            poses,
            scores,
            (image.height(), image.width()),
            speed,
            path.to_string(),
        ))
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("detector", &self.detector)
            .field("has_classifier", &self.has_classifier())
            .finish()
    }
}
