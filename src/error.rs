// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the pose inference library.

use std::fmt;

/// Result type alias for pose inference operations.
pub type Result<T> = std::result::Result<T, PoseError>;

/// Main error type for the pose inference library.
#[derive(Debug)]
pub enum PoseError {
    /// Error loading an ONNX model.
    ModelLoadError(String),
    /// Error during model inference.
    InferenceError(String),
    /// Error processing images.
    ImageError(String),
    /// Invalid configuration provided.
    ConfigError(String),
    /// Input violates a precondition (wrong keypoint count, bad landmark shape).
    InvalidInput(String),
    /// Wrapped `std::io::Error`
    Io(std::io::Error),
    /// Visualizer error.
    VisualizerError(String),
    /// Video/stream processing error.
    VideoError(String),
    /// Feature not enabled.
    FeatureNotEnabled(String),
}

impl fmt::Display for PoseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelLoadError(msg) => write!(f, "Model load error: {msg}"),
            Self::InferenceError(msg) => write!(f, "Inference error: {msg}"),
            Self::ImageError(msg) => write!(f, "Image error: {msg}"),
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
            Self::VisualizerError(msg) => write!(f, "Visualizer error: {msg}"),
            Self::VideoError(msg) => write!(f, "Video error: {msg}"),
            Self::FeatureNotEnabled(msg) => write!(f, "Feature not enabled: {msg}"),
        }
    }
}

impl std::error::Error for PoseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PoseError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<image::ImageError> for PoseError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageError(err.to_string())
    }
}
