// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::{Args, Parser, Subcommand};

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Predict Options:
    --model, -m <MODEL>          Path to MoveNet ONNX model file
    --variant <VARIANT>          Model variant (singlepose-lightning, singlepose-thunder, multipose-lightning)
    --classifier, -c <MODEL>     Path to pose classifier ONNX model file
    --source, -s <SOURCE>        Input source (image, directory, video, camera index, or URL)
    --score <SCORE>              Pose score threshold for multi-pose filtering [default: 0.25]
    --max-poses <N>              Maximum poses per frame in multi-pose mode [default: 6]
    --save                       Save annotated images to runs/pose/predict
    --show                       Display results in a window
    --verbose                    Show verbose output

Examples:
    movenet-inference predict --source person.jpg
    movenet-inference predict --variant thunder --source person.jpg
    movenet-inference predict --classifier pose-classifier.onnx --source tree-pose.jpg
    movenet-inference predict --variant multipose --source crowd.jpg --score 0.3
    movenet-inference predict -s yoga.mp4 --save --show
    movenet-inference predict -c pose-classifier.onnx -s 0 --show"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run pose estimation on an image, video, or camera
    Predict(PredictArgs),
}

/// Arguments for the predict command.
#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct PredictArgs {
    /// Path to MoveNet ONNX model file
    #[arg(short, long)]
    pub model: Option<String>,

    /// Model variant (singlepose-lightning, singlepose-thunder, multipose-lightning)
    #[arg(long, default_value = "singlepose-lightning")]
    pub variant: String,

    /// Path to pose classifier ONNX model file
    #[arg(short, long)]
    pub classifier: Option<String>,

    /// Input source (image, directory, video, camera index, or URL)
    #[arg(short, long)]
    pub source: Option<String>,

    /// Pose score threshold for multi-pose filtering
    #[arg(long, default_value_t = 0.25)]
    pub score: f32,

    /// Maximum poses per frame in multi-pose mode
    #[arg(long, default_value_t = 6)]
    pub max_poses: usize,

    /// Save annotated images to runs/pose/predict
    #[arg(long, default_value_t = false)]
    pub save: bool,

    /// Display results in a window
    #[arg(long, default_value_t = false)]
    pub show: bool,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_predict_args_defaults() {
        let args = Cli::parse_from(["app", "predict"]);
        match args.command {
            Commands::Predict(predict_args) => {
                assert!(predict_args.model.is_none());
                assert_eq!(predict_args.variant, "singlepose-lightning");
                assert!(predict_args.classifier.is_none());
                assert!(predict_args.source.is_none());
                assert!((predict_args.score - 0.25).abs() < f32::EPSILON);
                assert_eq!(predict_args.max_poses, 6);
                assert!(!predict_args.save);
                assert!(predict_args.verbose);
            }
        }
    }

    #[test]
    fn test_predict_args_custom() {
        let args = Cli::parse_from([
            "app",
            "predict",
            "--variant",
            "multipose",
            "--classifier",
            "pose-classifier.onnx",
            "--source",
            "test.jpg",
            "--score",
            "0.5",
            "--verbose",
            "false",
        ]);
        match args.command {
            Commands::Predict(predict_args) => {
                assert_eq!(predict_args.variant, "multipose");
                assert_eq!(
                    predict_args.classifier,
                    Some("pose-classifier.onnx".to_string())
                );
                assert_eq!(predict_args.source, Some("test.jpg".to_string()));
                assert!((predict_args.score - 0.5).abs() < f32::EPSILON);
                assert!(!predict_args.verbose);
            }
        }
    }
}
