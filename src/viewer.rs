// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Window viewer for displaying annotated frames.

use image::DynamicImage;
use minifb::{Key, Window, WindowOptions};

use crate::error::{PoseError, Result};

/// A simple image viewer using minifb.
pub struct Viewer {
    window: Window,
    pub width: usize,
    pub height: usize,
    buffer: Vec<u32>,
}

impl Viewer {
    /// Create a new viewer window.
    ///
    /// # Errors
    ///
    /// Returns an error if the window cannot be created.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let mut window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| PoseError::VisualizerError(format!("Failed to create window: {e}")))?;

        // Limit update rate
        window.limit_update_rate(Some(std::time::Duration::from_micros(16600)));

        Ok(Self {
            window,
            width,
            height,
            buffer: Vec::new(),
        })
    }

    /// Update the window with a new frame.
    ///
    /// # Returns
    ///
    /// * `false` when the window was closed or Escape/Q was pressed.
    ///
    /// # Errors
    ///
    /// Returns an error if the window buffer cannot be updated.
    pub fn update(&mut self, image: &DynamicImage) -> Result<bool> {
        if !self.window.is_open()
            || self.window.is_key_down(Key::Escape)
            || self.window.is_key_down(Key::Q)
        {
            return Ok(false);
        }

        let (img_width, img_height) = (image.width() as usize, image.height() as usize);

        // Resize buffer if needed
        let num_pixels = img_width * img_height;
        if self.buffer.len() != num_pixels {
            self.buffer.resize(num_pixels, 0);
        }

        // Pack pixels as 0x00RRGGBB, the u32 layout minifb expects
        let rgb = image.to_rgb8();
        for (i, pixel) in rgb.pixels().enumerate() {
            let r = u32::from(pixel[0]);
            let g = u32::from(pixel[1]);
            let b = u32::from(pixel[2]);
            self.buffer[i] = (r << 16) | (g << 8) | b;
        }

        // Update dimensions if changed
        if self.width != img_width || self.height != img_height {
            self.width = img_width;
            self.height = img_height;
        }

        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)
            .map_err(|e| PoseError::VisualizerError(format!("Failed to update window: {e}")))?;

        Ok(true)
    }

    /// Wait for a specified duration while keeping the window responsive.
    ///
    /// # Returns
    ///
    /// * `false` when the window was closed or Escape/Q was pressed.
    ///
    /// # Errors
    ///
    /// Currently infallible; kept as `Result` for parity with [`Self::update`].
    pub fn wait(&mut self, duration: std::time::Duration) -> Result<bool> {
        // Nothing displayed yet, nothing to keep alive
        if self.buffer.is_empty() {
            return Ok(true);
        }

        let start = std::time::Instant::now();
        while start.elapsed() < duration {
            if !self.window.is_open()
                || self.window.is_key_down(Key::Escape)
                || self.window.is_key_down(Key::Q)
            {
                return Ok(false);
            }
            // Re-present the current buffer; limit_update_rate keeps this
            // loop from spinning flat out.
            let _ = self
                .window
                .update_with_buffer(&self.buffer, self.width, self.height);
        }
        Ok(true)
    }
}
