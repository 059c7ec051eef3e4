// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]

//! # MoveNet Inference Library
//!
//! Pose estimation and yoga pose classification in Rust, running Google's
//! MoveNet models and a trained classification head through ONNX Runtime.
//!
//! ## Features
//!
//! - **MoveNet variants** - Single-pose Lightning (fast, 192x192), single-pose
//!   Thunder (accurate, 256x256), and multi-pose Lightning (up to 6 bodies)
//! - **Pose classification** - Eight yoga pose classes over hip-centered,
//!   size-normalized landmark embeddings
//! - **Multiple sources** - Images, directories, image URLs, video files, and
//!   live cameras
//! - **Skeleton overlays** - Keypoint and skeleton rendering onto frames
//! - **Auto-download** - Known models and sample images are fetched on demand
//!
//! ## Quick Start (Library)
//!
//! ```no_run
//! use movenet_inference::{ModelVariant, MoveNetDetector, Pipeline, PoseClassifier};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let detector = MoveNetDetector::load(
//!         "movenet-singlepose-lightning.onnx",
//!         ModelVariant::SinglePoseLightning,
//!     )?;
//!     let classifier = PoseClassifier::load("pose-classifier.onnx")?;
//!     let mut pipeline = Pipeline::new(detector).with_classifier(classifier);
//!
//!     let img = image::open("tree-pose.jpg")?;
//!     let results = pipeline.process_frame(&img, "tree-pose.jpg")?;
//!
//!     for pose in &results.poses {
//!         println!("pose score {:.2}", pose.score());
//!     }
//!     if let Some(scores) = &results.scores
//!         && let Some((class, conf)) = scores.confident()
//!     {
//!         println!("{class} ({:.1}%)", conf * 100.0);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Run with defaults (auto-downloads model and sample images)
//! movenet-inference predict
//!
//! # Run on a specific image
//! movenet-inference predict --source person.jpg
//!
//! # More accurate single-pose model
//! movenet-inference predict --variant thunder --source person.jpg
//!
//! # Detect and classify a yoga pose
//! movenet-inference predict --classifier pose-classifier.onnx --source tree-pose.jpg
//!
//! # Live camera with display window (Linux, video feature)
//! movenet-inference predict --source 0 --show
//!
//! # Save annotated results
//! movenet-inference predict --source yoga.mp4 --save
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`detector`] | [`MoveNetDetector`] for loading models and estimating poses |
//! | [`classifier`] | [`PoseClassifier`] and the yoga pose class set |
//! | [`embedding`] | Landmark normalization into classifier embeddings |
//! | [`pipeline`] | [`Pipeline`] combining detection and classification |
//! | [`keypoint`] | [`Pose`], [`Keypoint`], and the keypoint index enum |
//! | [`skeleton`] | Keypoint connectivity for overlay rendering |
//! | [`results`] | Output types ([`Results`], [`Speed`]) |
//! | [`config`] | [`InferenceConfig`] for customizing inference settings |
//! | [`source`] | Input source handling ([`Source`], [`SourceIterator`]) |
//! | [`download`] | Model and sample image downloading |
//! | [`error`] | Error types ([`PoseError`], [`Result`]) |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `annotate` | Skeleton overlay rendering (default) |
//! | `visualize` | Real-time window display (default) |
//! | `video` | Video file and camera support |

// Modules
#[cfg(feature = "annotate")]
pub mod annotate;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod detector;
pub mod download;
pub mod embedding;
pub mod error;
pub mod keypoint;
pub mod pipeline;
pub mod results;
pub mod skeleton;
pub mod source;
#[cfg(feature = "visualize")]
pub mod viewer;

// Re-export main types for convenience
pub use classifier::{CLASSIFICATION_THRESHOLD, ClassScores, PoseClass, PoseClassifier};
pub use config::InferenceConfig;
pub use detector::{ModelVariant, MoveNetDetector};
pub use embedding::{EMBEDDING_LEN, TORSO_SIZE_MULTIPLIER, landmarks_to_embedding};
pub use error::{PoseError, Result};
pub use keypoint::{Keypoint, KeypointIndex, Pose};
pub use pipeline::Pipeline;
pub use results::{Results, Speed};
pub use skeleton::SKELETON;
pub use source::{Source, SourceIterator, SourceMeta};

#[cfg(feature = "visualize")]
pub use viewer::Viewer;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
