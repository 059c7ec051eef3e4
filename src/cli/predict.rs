// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::process;

use std::path::Path;

#[cfg(feature = "annotate")]
use std::fs;

#[cfg(feature = "visualize")]
use std::time::Duration;

#[cfg(feature = "annotate")]
use crate::annotate::annotate_image;
#[cfg(feature = "visualize")]
use crate::viewer::Viewer;

use crate::cli::args::PredictArgs;
use crate::source::{Source, SourceIterator};
use crate::{
    InferenceConfig, ModelVariant, MoveNetDetector, Pipeline, PoseClassifier, VERSION, download,
};
use crate::{error, verbose, warn};

/// Find the next available run directory (predict, predict2, predict3, etc.)
#[cfg(feature = "annotate")]
fn find_next_run_dir(base: &str, prefix: &str) -> String {
    let base_path = Path::new(base);

    // First try without number
    let first = base_path.join(prefix);
    if !first.exists() {
        return first.to_string_lossy().to_string();
    }

    // Try with incrementing numbers
    for i in 2.. {
        let numbered = base_path.join(format!("{prefix}{i}"));
        if !numbered.exists() {
            return numbered.to_string_lossy().to_string();
        }
    }

    // Fallback (should never reach here)
    base_path.join(prefix).to_string_lossy().to_string()
}

/// Run MoveNet pose estimation.
#[allow(
    clippy::too_many_lines,
    clippy::cast_precision_loss,
    clippy::missing_panics_doc
)]
pub fn run_prediction(args: &PredictArgs) {
    crate::cli::logging::set_verbose(args.verbose);

    let variant: ModelVariant = match args.variant.parse() {
        Ok(v) => v,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    // Resolve model path - use variant default if not specified
    let model_is_default = args.model.is_none();
    let model_path = args
        .model
        .clone()
        .unwrap_or_else(|| download::default_model_for(variant).to_string());

    if model_is_default && args.verbose {
        warn!("'model' argument is missing. Using default '--model={model_path}'.");
    }

    // Auto-download known models that aren't present locally
    if !Path::new(&model_path).exists() {
        if let Err(e) = download::try_download_model(&model_path) {
            error!("Error downloading model: {e}");
            process::exit(1);
        }
    }

    let config = InferenceConfig::new()
        .with_score_threshold(args.score)
        .with_max_poses(args.max_poses);

    let detector = match MoveNetDetector::load_with_config(&model_path, variant, config) {
        Ok(d) => d,
        Err(e) => {
            error!("Error loading model: {e}");
            process::exit(1);
        }
    };

    let mut pipeline = Pipeline::new(detector);

    if let Some(classifier_path) = &args.classifier {
        if !Path::new(classifier_path).exists() {
            if let Err(e) = download::try_download_model(classifier_path) {
                error!("Error downloading classifier: {e}");
                process::exit(1);
            }
        }
        match PoseClassifier::load(classifier_path) {
            Ok(c) => pipeline = pipeline.with_classifier(c),
            Err(e) => {
                error!("Error loading classifier: {e}");
                process::exit(1);
            }
        }
    }

    println!("movenet-inference {VERSION} 🚀 {variant} ONNX CPU");
    verbose!(
        "model summary: input ({0}, {0}), {1}",
        variant.input_size(),
        if variant.is_multi_pose() {
            "up to 6 poses per frame"
        } else {
            "1 pose per frame"
        }
    );
    verbose!("");

    // Determine sources - fall back to sample images if none given
    let sources: Vec<Source> = match &args.source {
        Some(s) => vec![Source::from(s.as_str())],
        None => {
            if args.verbose {
                warn!(
                    "'source' argument is missing. Using sample images: {}",
                    download::DEFAULT_IMAGES.join(", ")
                );
            }

            let downloaded = download::download_images(download::DEFAULT_IMAGES);
            if downloaded.is_empty() {
                error!("Failed to download any images");
                process::exit(1);
            }

            downloaded
                .iter()
                .map(|p| Source::Image(std::path::PathBuf::from(p)))
                .collect()
        }
    };

    let is_video = sources.iter().any(Source::is_video);
    #[cfg(not(feature = "video"))]
    if is_video {
        warn!(
            "Video source detected but 'video' feature is not enabled. Please compile with '--features video'"
        );
        process::exit(1);
    }

    #[cfg(feature = "annotate")]
    let save_dir = if args.save {
        let dir = find_next_run_dir("runs/pose", "predict");
        fs::create_dir_all(&dir).expect("Failed to create save directory");
        Some(std::path::PathBuf::from(dir))
    } else {
        None
    };

    #[cfg(not(feature = "annotate"))]
    if args.save {
        warn!(
            "--save requires the 'annotate' feature. Compile with --features annotate to enable saving."
        );
    }

    #[cfg(feature = "visualize")]
    let mut viewer: Option<Viewer> = None;

    let mut total_inference = 0.0;
    let mut total_postprocess = 0.0;
    let mut num_frames: usize = 0;

    'sources: for source in sources {
        let iter = match SourceIterator::new(source) {
            Ok(iter) => iter,
            Err(e) => {
                error!("Error initializing source: {e}");
                process::exit(1);
            }
        };

        for item in iter {
            let (img, meta) = match item {
                Ok(val) => val,
                Err(e) => {
                    error!("Error reading source: {e}");
                    break;
                }
            };

            // A failed frame is "no pose this cycle", not a fatal error
            let result = match pipeline.process_frame(&img, &meta.path) {
                Ok(r) => r,
                Err(e) => {
                    error!("Error processing frame: {e}");
                    continue;
                }
            };

            let total_frames_str = meta
                .total_frames
                .map_or_else(|| "?".to_string(), |n| n.to_string());

            if is_video {
                verbose!(
                    "video (frame {}/{}) {}: {}x{} {}{:.1}ms",
                    meta.frame_idx + 1,
                    total_frames_str,
                    meta.path,
                    img.width(),
                    img.height(),
                    result.verbose(),
                    result.speed.inference.unwrap_or(0.0)
                );
            } else {
                verbose!(
                    "image {}/{} {}: {}x{} {}{:.1}ms",
                    meta.frame_idx + 1,
                    total_frames_str,
                    meta.path,
                    img.width(),
                    img.height(),
                    result.verbose(),
                    result.speed.inference.unwrap_or(0.0)
                );
            }

            // Report classifications the model is highly certain about
            if let Some(scores) = &result.scores
                && let Some((class, score)) = scores.confident()
            {
                crate::success!("{class} detected ({:.2}%)", score * 100.0);
            }

            #[cfg(feature = "annotate")]
            if let Some(ref dir) = save_dir {
                let annotated = annotate_image(&img, &result.poses);
                let filename = if is_video {
                    format!("frame_{:05}.jpg", meta.frame_idx)
                } else {
                    Path::new(&meta.path)
                        .file_name()
                        .map_or_else(|| "result.jpg".to_string(), |n| n.to_string_lossy().to_string())
                };
                if let Err(e) = annotated.save(dir.join(filename)) {
                    error!("Failed to save result: {e}");
                }
            }

            #[cfg(feature = "visualize")]
            if args.show {
                let view_width = img.width() as usize;
                let view_height = img.height() as usize;

                if let Some(ref v) = viewer
                    && (v.width != view_width || v.height != view_height)
                {
                    viewer = None;
                }

                if viewer.is_none() {
                    viewer = Some(
                        Viewer::new("MoveNet Inference", view_width, view_height)
                            .expect("Failed to create viewer window"),
                    );
                }

                if let Some(ref mut v) = viewer {
                    #[cfg(feature = "annotate")]
                    let display = annotate_image(&img, &result.poses);
                    #[cfg(not(feature = "annotate"))]
                    let display = img.clone();

                    match v.update(&display) {
                        Ok(true) => {
                            if !is_video {
                                let _ = v.wait(Duration::from_millis(200));
                            }
                        }
                        // Window closed, stop processing entirely
                        Ok(false) => break 'sources,
                        Err(e) => {
                            error!("Viewer error: {e}");
                        }
                    }
                }
            }

            total_inference += result.speed.inference.unwrap_or(0.0);
            total_postprocess += result.speed.postprocess.unwrap_or(0.0);
            num_frames += 1;
        }
    }

    let denom = num_frames.max(1) as f64;
    verbose!(
        "Speed: {:.1}ms inference, {:.1}ms postprocess per frame at shape (1, {2}, {2}, 3)",
        total_inference / denom,
        total_postprocess / denom,
        variant.input_size()
    );

    #[cfg(feature = "annotate")]
    if let Some(ref dir) = save_dir {
        verbose!("Results saved to {}", dir.display());
    }
}
