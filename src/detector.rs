// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! MoveNet model loading and pose estimation.
//!
//! This module provides the main [`MoveNetDetector`] struct for loading
//! MoveNet ONNX exports and running pose estimation on images.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use image::{DynamicImage, imageops::FilterType};
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;

use crate::config::InferenceConfig;
use crate::error::{PoseError, Result};
use crate::keypoint::{Keypoint, KeypointIndex, Pose};

/// Values per keypoint in MoveNet output (y, x, score).
const KEYPOINT_STRIDE: usize = 3;

/// Values per person in multi-pose output: 17 keypoints plus
/// [ymin, xmin, ymax, xmax, score].
const MULTIPOSE_STRIDE: usize = KeypointIndex::COUNT * KEYPOINT_STRIDE + 5;

/// Pretrained MoveNet model variants.
///
/// Each variant fixes the square input resolution and whether the model
/// detects one body or up to six.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelVariant {
    /// Single-pose Lightning: fastest, 192x192 input.
    SinglePoseLightning,
    /// Single-pose Thunder: more accurate, 256x256 input.
    SinglePoseThunder,
    /// Multi-pose Lightning: up to 6 bodies, 256x256 input.
    MultiPoseLightning,
}

impl ModelVariant {
    /// Square input resolution expected by this variant.
    #[must_use]
    pub const fn input_size(&self) -> usize {
        match self {
            Self::SinglePoseLightning => 192,
            Self::SinglePoseThunder | Self::MultiPoseLightning => 256,
        }
    }

    /// Whether this variant detects multiple bodies per frame.
    #[must_use]
    pub const fn is_multi_pose(&self) -> bool {
        matches!(self, Self::MultiPoseLightning)
    }

    /// Returns the string representation used in CLI arguments and filenames.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SinglePoseLightning => "singlepose-lightning",
            Self::SinglePoseThunder => "singlepose-thunder",
            Self::MultiPoseLightning => "multipose-lightning",
        }
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ModelVariant {
    type Err = VariantParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "singlepose-lightning" | "lightning" => Ok(Self::SinglePoseLightning),
            "singlepose-thunder" | "thunder" => Ok(Self::SinglePoseThunder),
            "multipose-lightning" | "multipose" => Ok(Self::MultiPoseLightning),
            _ => Err(VariantParseError(s.to_string())),
        }
    }
}

impl Default for ModelVariant {
    fn default() -> Self {
        Self::SinglePoseLightning
    }
}

/// Error returned when parsing an invalid model variant string.
#[derive(Debug, Clone)]
pub struct VariantParseError(String);

impl fmt::Display for VariantParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid model variant '{}', expected one of: singlepose-lightning, singlepose-thunder, multipose-lightning",
            self.0
        )
    }
}

impl std::error::Error for VariantParseError {}

/// MoveNet pose detector.
///
/// Wraps an ONNX Runtime session and provides pose estimation over single
/// frames. One call per frame, one asynchronous-free result per call.
///
/// # Example
///
/// ```no_run
/// use movenet_inference::{ModelVariant, MoveNetDetector};
///
/// let mut detector =
///     MoveNetDetector::load("movenet-singlepose-lightning.onnx", ModelVariant::SinglePoseLightning)?;
/// let img = image::open("person.jpg")?;
/// let poses = detector.estimate_poses(&img)?;
/// println!("Found {} pose(s)", poses.len());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct MoveNetDetector {
    /// ONNX Runtime session.
    session: Session,
    /// Which pretrained variant is loaded.
    variant: ModelVariant,
    /// Input tensor name.
    input_name: String,
    /// Output tensor name.
    output_name: String,
    /// Inference configuration.
    config: InferenceConfig,
    /// Whether the model has been warmed up.
    warmed_up: bool,
}

impl MoveNetDetector {
    /// Load a MoveNet model from an ONNX file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the ONNX model file.
    /// * `variant` - Which pretrained variant the file contains.
    ///
    /// # Errors
    ///
    /// Returns an error if the model file doesn't exist or can't be loaded.
    pub fn load<P: AsRef<Path>>(path: P, variant: ModelVariant) -> Result<Self> {
        Self::load_with_config(path, variant, InferenceConfig::default())
    }

    /// Load a MoveNet model with custom configuration.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the ONNX model file.
    /// * `variant` - Which pretrained variant the file contains.
    /// * `config` - Custom inference configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the model file doesn't exist or can't be loaded.
    pub fn load_with_config<P: AsRef<Path>>(
        path: P,
        variant: ModelVariant,
        config: InferenceConfig,
    ) -> Result<Self> {
        let path = path.as_ref();

        if !(0.0..=1.0).contains(&config.score_threshold) {
            return Err(PoseError::ConfigError(format!(
                "score_threshold must be in 0.0..=1.0, got {}",
                config.score_threshold
            )));
        }

        if !path.exists() {
            return Err(PoseError::ModelLoadError(format!(
                "Model file not found: {}",
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
            .map_err(|e| PoseError::ModelLoadError(format!("Failed to load model: {e}")))?;

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
            variant,
            input_name,
            output_name,
            config,
            warmed_up: false,
        })
    }

    /// Warm up the model by running inference with a dummy input.
    ///
    /// This pre-allocates memory and optimizes the execution graph for faster
    /// subsequent inferences. Warmup is automatically called on first
    /// `estimate_poses`.
    ///
    /// # Errors
    ///
    /// Returns an error if the dummy inference fails.
    pub fn warmup(&mut self) -> Result<()> {
        if self.warmed_up {
            return Ok(());
        }

        let size = self.variant.input_size();
        let dummy_input = Array4::<f32>::zeros((1, size, size, 3));
        let _ = self.run_inference(&dummy_input)?;

        self.warmed_up = true;
        Ok(())
    }

    /// Estimate poses on a single frame.
    ///
    /// The frame is resized to the variant's square input resolution, run
    /// through the model, and the detected keypoints are mapped back to the
    /// frame's pixel coordinates.
    ///
    /// # Arguments
    ///
    /// * `image` - The source frame.
    ///
    /// # Returns
    ///
    /// * Detected poses: exactly one in single-pose mode, up to
    ///   `config.max_poses` in multi-pose mode.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails or the model output has an
    /// unexpected shape.
    pub fn estimate_poses(&mut self, image: &DynamicImage) -> Result<Vec<Pose>> {
        if !self.warmed_up {
            self.warmup()?;
        }

        let input = self.preprocess(image);
        let (data, shape) = self.run_inference(&input)?;

        #[allow(clippy::cast_precision_loss)]
        let (width, height) = (image.width() as f32, image.height() as f32);

        if self.variant.is_multi_pose() {
            self.decode_multi_pose(&data, &shape, width, height)
        } else {
            Self::decode_single_pose(&data, &shape, width, height).map(|pose| vec![pose])
        }
    }

    /// Resize a frame to the model's square input and lay it out as an
    /// NHWC f32 tensor with values in 0..=255 (MoveNet takes raw RGB).
    fn preprocess(&self, image: &DynamicImage) -> Array4<f32> {
        let size = self.variant.input_size();
        #[allow(clippy::cast_possible_truncation)]
        let resized = image
            .resize_exact(size as u32, size as u32, FilterType::Triangle)
            .to_rgb8();

        let mut tensor = Array4::<f32>::zeros((1, size, size, 3));
        for (x, y, pixel) in resized.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            tensor[[0, y, x, 0]] = f32::from(pixel[0]);
            tensor[[0, y, x, 1]] = f32::from(pixel[1]);
            tensor[[0, y, x, 2]] = f32::from(pixel[2]);
        }

        tensor
    }

    /// Run the ONNX model inference.
    fn run_inference(&mut self, input: &Array4<f32>) -> Result<(Vec<f32>, Vec<usize>)> {
        let input_contiguous = input.as_standard_layout();

        let input_tensor = TensorRef::from_array_view(&input_contiguous).map_err(|e| {
            PoseError::InferenceError(format!("Failed to create input tensor: {e}"))
        })?;

        let inputs = ort::inputs![&self.input_name => input_tensor];

        let outputs = self
            .session
            .run(inputs)
            .map_err(|e| PoseError::InferenceError(format!("Inference failed: {e}")))?;

        let output = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            PoseError::InferenceError(format!("Output '{}' not found", self.output_name))
        })?;

        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| PoseError::InferenceError(format!("Failed to extract output: {e}")))?;

        let shape_vec: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
        let data_vec: Vec<f32> = data.to_vec();

        Ok((data_vec, shape_vec))
    }

    /// Decode a single-pose output tensor of shape [1, 1, 17, 3].
    ///
    /// Each keypoint row is (y, x, score) with coordinates normalized to the
    /// input square; they are rescaled to source pixels here.
    fn decode_single_pose(data: &[f32], shape: &[usize], width: f32, height: f32) -> Result<Pose> {
        let expected = KeypointIndex::COUNT * KEYPOINT_STRIDE;
        if data.len() != expected {
            return Err(PoseError::InferenceError(format!(
                "unexpected single-pose output shape {shape:?}, expected [1, 1, 17, 3]"
            )));
        }

        let mut keypoints = [Keypoint::default(); KeypointIndex::COUNT];
        for (i, kp) in keypoints.iter_mut().enumerate() {
            let base = i * KEYPOINT_STRIDE;
            let y = data[base];
            let x = data[base + 1];
            let score = data[base + 2];
            *kp = Keypoint::new(x * width, y * height, score);
        }

        Ok(Pose::new(keypoints))
    }

    /// Decode a multi-pose output tensor of shape [1, N, 56].
    ///
    /// Each person row holds 17 (y, x, score) triples followed by
    /// [ymin, xmin, ymax, xmax, score]; people below the configured score
    /// threshold are discarded.
    fn decode_multi_pose(
        &self,
        data: &[f32],
        shape: &[usize],
        width: f32,
        height: f32,
    ) -> Result<Vec<Pose>> {
        if data.is_empty() || data.len() % MULTIPOSE_STRIDE != 0 {
            return Err(PoseError::InferenceError(format!(
                "unexpected multi-pose output shape {shape:?}, expected [1, N, 56]"
            )));
        }

        let candidates = data.len() / MULTIPOSE_STRIDE;
        let mut poses = Vec::new();

        for person in 0..candidates {
            let base = person * MULTIPOSE_STRIDE;
            let pose_score = data[base + MULTIPOSE_STRIDE - 1];
            if pose_score < self.config.score_threshold {
                continue;
            }

            let mut keypoints = [Keypoint::default(); KeypointIndex::COUNT];
            for (i, kp) in keypoints.iter_mut().enumerate() {
                let offset = base + i * KEYPOINT_STRIDE;
                let y = data[offset];
                let x = data[offset + 1];
                let score = data[offset + 2];
                *kp = Keypoint::new(x * width, y * height, score);
            }

            poses.push(Pose::new(keypoints));
            if poses.len() >= self.config.max_poses {
                break;
            }
        }

        Ok(poses)
    }

    /// Get the loaded model variant.
    #[must_use]
    pub const fn variant(&self) -> ModelVariant {
        self.variant
    }

    /// Get the inference configuration.
    #[must_use]
    pub const fn config(&self) -> &InferenceConfig {
        &self.config
    }
}

impl fmt::Debug for MoveNetDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoveNetDetector")
            .field("variant", &self.variant)
            .field("input_size", &self.variant.input_size())
            .field("multi_pose", &self.variant.is_multi_pose())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_from_str() {
        assert_eq!(
            "singlepose-lightning".parse::<ModelVariant>().unwrap(),
            ModelVariant::SinglePoseLightning
        );
        assert_eq!(
            "thunder".parse::<ModelVariant>().unwrap(),
            ModelVariant::SinglePoseThunder
        );
        assert_eq!(
            "multipose".parse::<ModelVariant>().unwrap(),
            ModelVariant::MultiPoseLightning
        );
        assert!("turbo".parse::<ModelVariant>().is_err());
    }

    #[test]
    fn test_variant_properties() {
        assert_eq!(ModelVariant::SinglePoseLightning.input_size(), 192);
        assert_eq!(ModelVariant::SinglePoseThunder.input_size(), 256);
        assert_eq!(ModelVariant::MultiPoseLightning.input_size(), 256);
        assert!(ModelVariant::MultiPoseLightning.is_multi_pose());
        assert!(!ModelVariant::SinglePoseThunder.is_multi_pose());
    }

    #[test]
    fn test_variant_display() {
        assert_eq!(
            ModelVariant::SinglePoseLightning.to_string(),
            "singlepose-lightning"
        );
    }

    #[test]
    fn test_model_not_found() {
        let result = MoveNetDetector::load("nonexistent.onnx", ModelVariant::default());
        assert!(matches!(result, Err(PoseError::ModelLoadError(_))));
    }

    #[test]
    fn test_invalid_score_threshold() {
        let config = InferenceConfig::new().with_score_threshold(1.5);
        let result =
            MoveNetDetector::load_with_config("nonexistent.onnx", ModelVariant::default(), config);
        assert!(matches!(result, Err(PoseError::ConfigError(_))));
    }

    #[test]
    fn test_decode_single_pose() {
        // 17 keypoints, all at normalized (x=0.5, y=0.25) with score 0.9.
        let mut data = Vec::with_capacity(51);
        for _ in 0..KeypointIndex::COUNT {
            data.extend_from_slice(&[0.25, 0.5, 0.9]);
        }

        let pose =
            MoveNetDetector::decode_single_pose(&data, &[1, 1, 17, 3], 640.0, 480.0).unwrap();
        let nose = pose.get(KeypointIndex::Nose);
        assert!((nose.x - 320.0).abs() < 1e-4);
        assert!((nose.y - 120.0).abs() < 1e-4);
        assert!((nose.score - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_decode_single_pose_bad_shape() {
        let data = vec![0.0; 50];
        let result = MoveNetDetector::decode_single_pose(&data, &[1, 1, 17, 3], 640.0, 480.0);
        assert!(matches!(result, Err(PoseError::InferenceError(_))));
    }
}
