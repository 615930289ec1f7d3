//! Image transformer - scaled, re-encoded copies
//!
//! Produces the compressed copy offered as the default photo send and the small
//! composer thumbnail. The source is decoded, oriented, scaled and encoded in one
//! blocking task; the decoded pixels are dropped as soon as the copy is encoded.

use crate::compression::{ImageCompressor, OutputFormat};
use crate::image::orientation::ImageOrientation;
use crate::traits::ImageTranscoder;
use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use image::imageops::FilterType;
use image::GenericImageView;
use std::io::Cursor;

const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Image transformer backed by the `image` crate
pub struct ImageTransformer {
    jpeg_quality: u8,
}

impl Default for ImageTransformer {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl ImageTransformer {
    pub fn new(jpeg_quality: u8) -> Self {
        Self { jpeg_quality }
    }

    /// Target dimensions after scaling; never upscales and never collapses a side to 0.
    pub fn scaled_dimensions(width: u32, height: u32, scale: f64) -> (u32, u32) {
        let scale = if scale.is_finite() {
            scale.clamp(0.0, 1.0)
        } else {
            1.0
        };
        let scale_side =
            |side: u32| ((f64::from(side) * scale).round() as u32).clamp(1, side.max(1));
        (scale_side(width), scale_side(height))
    }

    /// Decode, orient, scale and encode synchronously.
    pub fn resize_blocking(
        data: &[u8],
        scale: f64,
        format: OutputFormat,
        jpeg_quality: u8,
    ) -> Result<Bytes, anyhow::Error> {
        let cursor = Cursor::new(data);
        let img = image::ImageReader::new(cursor)
            .with_guessed_format()?
            .decode()
            .context("Failed to decode image")?;

        let orientation = ImageOrientation::read_exif_orientation(data);
        let img = ImageOrientation::apply_orientation(img, orientation);

        let (width, height) = img.dimensions();
        let (target_width, target_height) = Self::scaled_dimensions(width, height, scale);
        let resized = if (target_width, target_height) == (width, height) {
            img
        } else {
            img.resize_exact(target_width, target_height, FilterType::Lanczos3)
        };

        ImageCompressor::encode(&resized, format, jpeg_quality)
            .with_context(|| format!("Failed to encode {}", format.to_mime_type()))
    }
}

#[async_trait]
impl ImageTranscoder for ImageTransformer {
    #[tracing::instrument(skip(self, data), fields(size_bytes = data.len()))]
    async fn resize(
        &self,
        data: Bytes,
        scale: f64,
        target_mime_type: &str,
    ) -> Result<Bytes, anyhow::Error> {
        let format = OutputFormat::from_mime_type(target_mime_type)?;
        let jpeg_quality = self.jpeg_quality;

        // CPU-bound decode and encode
        let output = tokio::task::spawn_blocking(move || {
            Self::resize_blocking(&data, scale, format, jpeg_quality)
        })
        .await
        .context("Image resize task failed")??;

        tracing::debug!(output_bytes = output.len(), "Image resize completed");
        Ok(output)
    }
}
