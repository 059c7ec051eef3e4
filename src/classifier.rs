// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Yoga pose classification from normalized landmark embeddings.
//!
//! The classifier is a small fully-connected ONNX model that maps a
//! 34-element embedding (see [`crate::embedding`]) to confidence scores over
//! eight yoga pose classes.

use std::fmt;
use std::path::Path;

use ndarray::Array2;
use ort::session::Session;
use ort::value::TensorRef;

use crate::config::InferenceConfig;
use crate::embedding::EMBEDDING_LEN;
use crate::error::{PoseError, Result};

/// Confidence a class must reach before it is reported as a detection.
pub const CLASSIFICATION_THRESHOLD: f32 = 0.97;

/// The yoga pose classes the classifier was trained on, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum PoseClass {
    /// Chair pose (Utkatasana).
    Chair = 0,
    /// Cobra pose (Bhujangasana).
    Cobra = 1,
    /// Downward dog pose (Adho Mukha Svanasana).
    Dog = 2,
    /// No recognizable pose.
    NoPose = 3,
    /// Shoulder stand pose (Sarvangasana).
    Shoulderstand = 4,
    /// Triangle pose (Trikonasana).
    Triangle = 5,
    /// Tree pose (Vrikshasana).
    Tree = 6,
    /// Warrior pose (Virabhadrasana).
    Warrior = 7,
}

impl PoseClass {
    /// Number of pose classes.
    pub const COUNT: usize = 8;

    /// Look up a class from its output index.
    ///
    /// # Returns
    ///
    /// * `Some` variant for `0..=7`, otherwise `None`.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Chair),
            1 => Some(Self::Cobra),
            2 => Some(Self::Dog),
            3 => Some(Self::NoPose),
            4 => Some(Self::Shoulderstand),
            5 => Some(Self::Triangle),
            6 => Some(Self::Tree),
            7 => Some(Self::Warrior),
            _ => None,
        }
    }

    /// Class label exactly as it appears in the training data.
    ///
    /// `Triangle` deliberately maps to the misspelled `"Traingle"`: that is
    /// the label the model was trained with, and renaming it here would break
    /// comparisons against the model's own label set.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Chair => "Chair",
            Self::Cobra => "Cobra",
            Self::Dog => "Dog",
            Self::NoPose => "No_Pose",
            Self::Shoulderstand => "Shoulderstand",
            Self::Triangle => "Traingle",
            Self::Tree => "Tree",
            Self::Warrior => "Warrior",
        }
    }
}

impl fmt::Display for PoseClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-class confidence scores from one classifier run.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassScores([f32; PoseClass::COUNT]);

impl ClassScores {
    /// Wrap a raw score vector in output order.
    #[must_use]
    pub const fn new(scores: [f32; PoseClass::COUNT]) -> Self {
        Self(scores)
    }

    /// Confidence for a given class.
    #[must_use]
    pub fn score(&self, class: PoseClass) -> f32 {
        self.0[class as usize]
    }

    /// All scores in [`PoseClass`] output order.
    #[must_use]
    pub const fn as_slice(&self) -> &[f32; PoseClass::COUNT] {
        &self.0
    }

    /// The highest-confidence class and its score.
    #[must_use]
    pub fn top1(&self) -> (PoseClass, f32) {
        let mut best = 0;
        for (i, &s) in self.0.iter().enumerate() {
            if s > self.0[best] {
                best = i;
            }
        }
        // best is always in 0..COUNT.
        let class = PoseClass::from_index(best).unwrap_or(PoseClass::NoPose);
        (class, self.0[best])
    }

    /// The top class if its confidence clears [`CLASSIFICATION_THRESHOLD`].
    ///
    /// A detection is only reported when the model is highly certain; below
    /// the threshold this returns `None` and callers should treat the frame
    /// as unclassified.
    #[must_use]
    pub fn confident(&self) -> Option<(PoseClass, f32)> {
        let (class, score) = self.top1();
        (score > CLASSIFICATION_THRESHOLD).then_some((class, score))
    }
}

impl fmt::Display for ClassScores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (class, score) = self.top1();
        write!(f, "{class} {:.2}", score * 100.0)
    }
}

/// Yoga pose classifier.
///
/// Wraps an ONNX Runtime session over the trained classification head. Input
/// is a `[1, 34]` embedding from [`crate::embedding::landmarks_to_embedding`],
/// output is `[1, 8]` class confidences.
///
/// # Example
///
/// ```no_run
/// use movenet_inference::{landmarks_to_embedding, PoseClassifier};
///
/// let mut classifier = PoseClassifier::load("pose-classifier.onnx")?;
/// let landmarks = [[0.0_f32; 2]; 17];
/// let embedding = landmarks_to_embedding(&landmarks)?;
/// let scores = classifier.classify(&embedding)?;
/// println!("{}", scores);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct PoseClassifier {
    /// ONNX Runtime session.
    session: Session,
    /// Input tensor name.
    input_name: String,
    /// Output tensor name.
    output_name: String,
}

impl PoseClassifier {
    /// Load the pose classifier from an ONNX file.
    ///
    /// # Errors
    ///
    /// Returns an error if the model file doesn't exist or can't be loaded.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_config(path, &InferenceConfig::default())
    }

    /// Load the pose classifier with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the model file doesn't exist or can't be loaded.
    pub fn load_with_config<P: AsRef<Path>>(path: P, config: &InferenceConfig) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(PoseError::ModelLoadError(format!(
                "Classifier file not found: {}",
                path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| {
                PoseError::ModelLoadError(format!("Failed to create session builder: {e}"))
            })?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)
            .map_err(|e| {
                PoseError::ModelLoadError(format!("Failed to set optimization level: {e}"))
            })?
            .with_intra_threads(config.num_threads)
            .map_err(|e| {
                PoseError::ModelLoadError(format!("Failed to set intra-thread count: {e}"))
            })?
            .commit_from_file(path)
            .map_err(|e| PoseError::ModelLoadError(format!("Failed to load classifier: {e}")))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "input".to_string());

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "output_0".to_string());

        Ok(Self {
            session,
            input_name,
            output_name,
        })
    }

    /// Classify one normalized pose embedding.
    ///
    /// # Arguments
    ///
    /// * `embedding` - 34-element embedding from
    ///   [`crate::embedding::landmarks_to_embedding`].
    ///
    /// # Returns
    ///
    /// * Per-class confidence scores.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails or the model output has an
    /// unexpected shape.
    pub fn classify(&mut self, embedding: &[f32; EMBEDDING_LEN]) -> Result<ClassScores> {
        let input = Array2::from_shape_vec((1, EMBEDDING_LEN), embedding.to_vec())
            .map_err(|e| PoseError::InvalidInput(format!("Failed to shape embedding: {e}")))?;

        let input_tensor = TensorRef::from_array_view(&input).map_err(|e| {
            PoseError::InferenceError(format!("Failed to create input tensor: {e}"))
        })?;

        let inputs = ort::inputs![&self.input_name => input_tensor];

        let outputs = self
            .session
            .run(inputs)
            .map_err(|e| PoseError::InferenceError(format!("Classification failed: {e}")))?;

        let output = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            PoseError::InferenceError(format!("Output '{}' not found", self.output_name))
        })?;

        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| PoseError::InferenceError(format!("Failed to extract output: {e}")))?;

        let scores: [f32; PoseClass::COUNT] = data.try_into().map_err(|_| {
            PoseError::InferenceError(format!(
                "unexpected classifier output length {}, expected {}",
                data.len(),
                PoseClass::COUNT
            ))
        })?;

        Ok(ClassScores::new(scores))
    }
}

impl fmt::Debug for PoseClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoseClassifier")
            .field("classes", &PoseClass::COUNT)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_labels() {
        assert_eq!(PoseClass::Chair.as_str(), "Chair");
        assert_eq!(PoseClass::NoPose.as_str(), "No_Pose");
        // The training data spells Triangle this way.
        assert_eq!(PoseClass::Triangle.as_str(), "Traingle");
        assert_eq!(PoseClass::COUNT, 8);
    }

    #[test]
    fn test_class_from_index() {
        assert_eq!(PoseClass::from_index(0), Some(PoseClass::Chair));
        assert_eq!(PoseClass::from_index(7), Some(PoseClass::Warrior));
        assert_eq!(PoseClass::from_index(8), None);
    }

    #[test]
    fn test_top1() {
        let scores = ClassScores::new([0.01, 0.02, 0.9, 0.01, 0.02, 0.01, 0.02, 0.01]);
        let (class, score) = scores.top1();
        assert_eq!(class, PoseClass::Dog);
        assert!((score - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_confident_requires_threshold() {
        let uncertain = ClassScores::new([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.96, 0.04]);
        assert!(uncertain.confident().is_none());

        // Exactly at the threshold is not enough; the comparison is strict.
        let boundary = ClassScores::new([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.97, 0.03]);
        assert!(boundary.confident().is_none());

        let certain = ClassScores::new([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.98, 0.02]);
        let (class, score) = certain.confident().unwrap();
        assert_eq!(class, PoseClass::Tree);
        assert!((score - 0.98).abs() < f32::EPSILON);
    }

    #[test]
    fn test_scores_display() {
        let scores = ClassScores::new([0.985, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.015]);
        assert_eq!(scores.to_string(), "Chair 98.50");
    }

    #[test]
    fn test_classifier_not_found() {
        let result = PoseClassifier::load("nonexistent.onnx");
        assert!(matches!(result, Err(PoseError::ModelLoadError(_))));
    }
}
