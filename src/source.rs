// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Input source handling for pose estimation.
//!
//! This module provides abstractions for the input sources the pipeline can
//! consume: still images on disk or over HTTP, directories of images, video
//! files, and live cameras.

use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::error::{PoseError, Result};

/// Represents different input sources for pose estimation.
#[derive(Debug, Clone)]
pub enum Source {
    /// Path to an image file.
    Image(PathBuf),
    /// In-memory image.
    ImageBuffer(DynamicImage),
    /// HTTP/HTTPS URL to an image file.
    ImageUrl(String),
    /// Directory containing images.
    Directory(PathBuf),
    /// Path to a video file.
    Video(PathBuf),
    /// Camera device index.
    Webcam(u32),
}

impl Source {
    /// Check if this source is a single image.
    #[must_use]
    pub const fn is_image(&self) -> bool {
        matches!(
            self,
            Self::Image(_) | Self::ImageBuffer(_) | Self::ImageUrl(_)
        )
    }

    /// Check if this source is a video or camera.
    #[must_use]
    pub const fn is_video(&self) -> bool {
        matches!(self, Self::Video(_) | Self::Webcam(_))
    }

    /// Get the path if this source has one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Image(p) | Self::Video(p) | Self::Directory(p) => Some(p),
            _ => None,
        }
    }

    /// Check if a URL points to an image based on extension.
    fn is_image_url(url: &str) -> bool {
        let url_lower = url.to_lowercase();
        // Remove query parameters if present
        let path_part = url_lower.split('?').next().unwrap_or(&url_lower);
        path_part.ends_with(".jpg")
            || path_part.ends_with(".jpeg")
            || path_part.ends_with(".png")
            || path_part.ends_with(".bmp")
            || path_part.ends_with(".gif")
            || path_part.ends_with(".webp")
            || path_part.ends_with(".tiff")
            || path_part.ends_with(".tif")
    }
}

/// Convert from a string path to Source.
impl From<&str> for Source {
    fn from(s: &str) -> Self {
        // Bare integers select a camera, matching the usual CLI convention.
        if let Ok(idx) = s.parse::<u32>() {
            return Self::Webcam(idx);
        }

        if (s.starts_with("http://") || s.starts_with("https://")) && Self::is_image_url(s) {
            return Self::ImageUrl(s.to_string());
        }

        let path = PathBuf::from(s);

        if path.is_dir() {
            return Self::Directory(path);
        }

        if let Some(ext) = path.extension() {
            let ext = ext.to_string_lossy().to_lowercase();
            if matches!(
                ext.as_str(),
                "mp4" | "avi" | "mov" | "mkv" | "wmv" | "flv" | "webm" | "m4v" | "mpeg" | "mpg"
            ) {
                return Self::Video(path);
            }
        }

        // Default to image
        Self::Image(path)
    }
}

impl From<String> for Source {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Self::from(path.to_string_lossy().as_ref())
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Self::from(path.to_string_lossy().as_ref())
    }
}

impl From<DynamicImage> for Source {
    fn from(img: DynamicImage) -> Self {
        Self::ImageBuffer(img)
    }
}

impl From<u32> for Source {
    fn from(idx: u32) -> Self {
        Self::Webcam(idx)
    }
}

/// Metadata about a source frame.
#[derive(Debug, Clone)]
pub struct SourceMeta {
    /// Frame index (0 for single images).
    pub frame_idx: usize,
    /// Total frames (1 for single images, may be unknown for cameras).
    pub total_frames: Option<usize>,
    /// Source path or identifier.
    pub path: String,
    /// Frames per second (for video sources).
    pub fps: Option<f32>,
}

impl Default for SourceMeta {
    fn default() -> Self {
        Self {
            frame_idx: 0,
            total_frames: Some(1),
            path: String::new(),
            fps: None,
        }
    }
}

/// Iterator over frames from a source.
pub struct SourceIterator {
    source: Source,
    current_frame: usize,
    image_paths: Vec<PathBuf>,
    #[cfg(feature = "video")]
    decoder: Option<video_rs::decode::Decoder>,
    #[cfg(feature = "video")]
    total_frames: Option<usize>,
}

impl SourceIterator {
    /// Create a new source iterator.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be opened.
    pub fn new(source: Source) -> Result<Self> {
        let image_paths = match &source {
            Source::Directory(path) => Self::collect_images_from_dir(path)?,
            Source::Image(path) => vec![path.clone()],
            _ => vec![],
        };

        Ok(Self {
            source,
            current_frame: 0,
            image_paths,
            #[cfg(feature = "video")]
            decoder: None,
            #[cfg(feature = "video")]
            total_frames: None,
        })
    }

    /// Collect image paths from a directory.
    fn collect_images_from_dir(dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(PoseError::ImageError(format!(
                "Not a directory: {}",
                dir.display()
            )));
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(PoseError::Io)?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| Self::is_image_file(path))
            .collect();

        paths.sort();
        Ok(paths)
    }

    /// Check if a path is an image file based on extension.
    fn is_image_file(path: &Path) -> bool {
        path.extension().is_some_and(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            matches!(
                ext.as_str(),
                "jpg" | "jpeg" | "png" | "bmp" | "gif" | "webp" | "tiff" | "tif"
            )
        })
    }

    /// Download an image from a URL.
    fn download_image(url: &str) -> Result<DynamicImage> {
        let mut response = ureq::get(url)
            .call()
            .map_err(|e| PoseError::ImageError(format!("Failed to download {url}: {e}")))?
            .into_body();

        let bytes = response.read_to_vec().map_err(|e| {
            PoseError::ImageError(format!("Failed to read response from {url}: {e}"))
        })?;

        image::load_from_memory(&bytes)
            .map_err(|e| PoseError::ImageError(format!("Failed to decode image from {url}: {e}")))
    }

    /// Get the next image from a URL.
    fn next_image_url(&mut self, url: &str) -> Option<Result<(DynamicImage, SourceMeta)>> {
        if self.current_frame > 0 {
            return None;
        }

        self.current_frame = 1;
        let meta = SourceMeta {
            frame_idx: 0,
            total_frames: Some(1),
            path: url.to_string(),
            fps: None,
        };

        match Self::download_image(url) {
            Ok(img) => Some(Ok((img, meta))),
            Err(e) => Some(Err(e)),
        }
    }

    /// Get the next image from the source.
    fn next_image(&mut self) -> Option<Result<(DynamicImage, SourceMeta)>> {
        if self.current_frame >= self.image_paths.len() {
            return None;
        }

        let path = &self.image_paths[self.current_frame];
        let meta = SourceMeta {
            frame_idx: self.current_frame,
            total_frames: Some(self.image_paths.len()),
            path: path.to_string_lossy().to_string(),
            fps: None,
        };

        self.current_frame += 1;

        match image::open(path) {
            Ok(img) => Some(Ok((img, meta))),
            Err(e) => Some(Err(PoseError::ImageError(format!(
                "Failed to load {}: {e}",
                path.display()
            )))),
        }
    }

    /// Resolve the decoder input location for a video source.
    ///
    /// Cameras map to V4L2 device nodes, so live capture is Linux-only.
    #[cfg(feature = "video")]
    fn video_location(&self) -> Option<PathBuf> {
        match &self.source {
            Source::Video(path) => Some(path.clone()),
            Source::Webcam(idx) => Some(PathBuf::from(format!("/dev/video{idx}"))),
            _ => None,
        }
    }

    /// Get the next video or camera frame.
    #[cfg(feature = "video")]
    fn next_video_frame(&mut self) -> Option<Result<(DynamicImage, SourceMeta)>> {
        if self.decoder.is_none() {
            let location = self.video_location()?;
            match video_rs::decode::Decoder::new(location.as_path()) {
                Ok(d) => {
                    // Live cameras have no duration; leave total unknown.
                    if matches!(self.source, Source::Video(_))
                        && let Ok(duration) = d.duration()
                    {
                        let fps = d.frame_rate();
                        let duration_seconds = duration.as_secs_f64();
                        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                        {
                            self.total_frames = Some((duration_seconds * f64::from(fps)) as usize);
                        }
                    }
                    self.decoder = Some(d);
                }
                Err(e) => {
                    return Some(Err(PoseError::VideoError(format!(
                        "Failed to open {}: {e}",
                        location.display()
                    ))));
                }
            }
        }

        if let Some(decoder) = &mut self.decoder {
            match decoder.decode() {
                Ok((_ts, frame)) => {
                    let fps = decoder.frame_rate();
                    let meta = SourceMeta {
                        frame_idx: self.current_frame,
                        total_frames: self.total_frames,
                        path: self
                            .video_location()
                            .map(|p| p.to_string_lossy().to_string())
                            .unwrap_or_default(),
                        fps: Some(fps),
                    };
                    self.current_frame += 1;

                    match video_frame_to_image(&frame) {
                        Ok(img) => Some(Ok((img, meta))),
                        Err(e) => Some(Err(e)),
                    }
                }
                // Decode errors signal end of stream.
                Err(_e) => None,
            }
        } else {
            None
        }
    }

    #[cfg(not(feature = "video"))]
    fn next_video_frame(&mut self) -> Option<Result<(DynamicImage, SourceMeta)>> {
        Some(Err(PoseError::FeatureNotEnabled(
            "Video and camera support requires 'video' feature".to_string(),
        )))
    }
}

impl Iterator for SourceIterator {
    type Item = Result<(DynamicImage, SourceMeta)>;

    fn next(&mut self) -> Option<Self::Item> {
        match &self.source {
            Source::Image(_) | Source::Directory(_) => self.next_image(),
            Source::ImageUrl(url) => {
                let url = url.clone();
                self.next_image_url(&url)
            }
            Source::ImageBuffer(img) => {
                if self.current_frame == 0 {
                    self.current_frame = 1;
                    let meta = SourceMeta::default();
                    Some(Ok((img.clone(), meta)))
                } else {
                    None
                }
            }
            Source::Video(_) | Source::Webcam(_) => self.next_video_frame(),
        }
    }
}

/// Convert a `video_rs` Frame (ndarray 0.16) to `DynamicImage`.
#[cfg(feature = "video")]
fn video_frame_to_image(arr: &video_rs::Frame) -> Result<DynamicImage> {
    let shape = arr.shape();
    let height = u32::try_from(shape[0])
        .map_err(|_| PoseError::ImageError("Image height exceeds u32::MAX".to_string()))?;
    let width = u32::try_from(shape[1])
        .map_err(|_| PoseError::ImageError("Image width exceeds u32::MAX".to_string()))?;

    let mut rgb_data = Vec::with_capacity((height * width * 3) as usize);
    for y in 0..height as usize {
        for x in 0..width as usize {
            rgb_data.push(arr[[y, x, 0]]);
            rgb_data.push(arr[[y, x, 1]]);
            rgb_data.push(arr[[y, x, 2]]);
        }
    }

    let img_buffer = image::RgbImage::from_raw(width, height, rgb_data).ok_or_else(|| {
        PoseError::ImageError("Failed to create image from video frame".to_string())
    })?;

    Ok(DynamicImage::ImageRgb8(img_buffer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_from_string() {
        assert!(matches!(Source::from("person.jpg"), Source::Image(_)));
        assert!(matches!(Source::from("yoga.mp4"), Source::Video(_)));
        assert!(matches!(Source::from("0"), Source::Webcam(0)));
        assert!(matches!(Source::from("2"), Source::Webcam(2)));
        assert!(matches!(
            Source::from("https://example.com/pose.jpg"),
            Source::ImageUrl(_)
        ));
    }

    #[test]
    fn test_source_checks() {
        let img = Source::Image(PathBuf::from("test.jpg"));
        assert!(img.is_image());
        assert!(!img.is_video());

        let cam = Source::Webcam(0);
        assert!(!cam.is_image());
        assert!(cam.is_video());
    }

    #[test]
    fn test_image_buffer_yields_once() {
        let img = DynamicImage::new_rgb8(8, 8);
        let mut iter = SourceIterator::new(Source::from(img)).unwrap();
        assert!(iter.next().is_some());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_is_image_file() {
        assert!(SourceIterator::is_image_file(Path::new("a.PNG")));
        assert!(SourceIterator::is_image_file(Path::new("b.jpeg")));
        assert!(!SourceIterator::is_image_file(Path::new("c.mp4")));
        assert!(!SourceIterator::is_image_file(Path::new("noext")));
    }
}
