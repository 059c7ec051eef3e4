// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Inference configuration.
//!
//! This module defines the [`InferenceConfig`] struct, which controls pose
//! detection parameters such as the pose score threshold and ONNX Runtime
//! threading.

/// Configuration for MoveNet inference.
///
/// This struct is used to customize the behavior of the pose detector.
/// It uses a builder pattern for convenient construction.
///
/// # Example
///
/// ```rust
/// use movenet_inference::InferenceConfig;
///
/// let config = InferenceConfig::new()
///     .with_score_threshold(0.3)
///     .with_threads(4);
/// ```
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Pose score threshold (0.0 to 1.0). In multi-pose mode, detected
    /// bodies whose overall score falls below this value are discarded.
    pub score_threshold: f32,
    /// Maximum number of poses returned per frame in multi-pose mode.
    /// MoveNet multi-pose emits at most 6 candidates.
    pub max_poses: usize,
    /// Number of intra-op threads for ONNX Runtime.
    /// Setting this to `0` allows ONNX Runtime to choose the optimal number.
    pub num_threads: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            score_threshold: 0.25,
            max_poses: 6,
            num_threads: 0, // 0 = let ONNX Runtime decide
        }
    }
}

impl InferenceConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pose score threshold.
    ///
    /// Multi-pose detections with an overall score below this threshold will
    /// be filtered out. Single-pose mode always returns its one pose.
    ///
    /// # Arguments
    ///
    /// * `threshold` - The minimum pose score (0.0 to 1.0).
    ///
    /// # Returns
    ///
    /// * The modified `InferenceConfig`.
    #[must_use]
    pub const fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = threshold;
        self
    }

    /// Set the maximum number of poses returned per frame.
    ///
    /// # Arguments
    ///
    /// * `max` - The maximum number of poses.
    ///
    /// # Returns
    ///
    /// * The modified `InferenceConfig`.
    #[must_use]
    pub const fn with_max_poses(mut self, max: usize) -> Self {
        self.max_poses = max;
        self
    }

    /// Set the number of threads for inference.
    ///
    /// # Arguments
    ///
    /// * `threads` - The number of intra-op threads. Set to `0` for
    ///   auto-configuration.
    ///
    /// # Returns
    ///
    /// * The modified `InferenceConfig`.
    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = InferenceConfig::default();
        assert!((config.score_threshold - 0.25).abs() < f32::EPSILON);
        assert_eq!(config.max_poses, 6);
        assert_eq!(config.num_threads, 0);
    }

    #[test]
    fn test_config_builder() {
        let config = InferenceConfig::new()
            .with_score_threshold(0.5)
            .with_max_poses(3)
            .with_threads(8);

        assert!((config.score_threshold - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.max_poses, 3);
        assert_eq!(config.num_threads, 8);
    }
}
