//! Image processor - dimension probing

use crate::image::orientation::ImageOrientation;
use crate::metadata::ImageMetadata;
use anyhow::Context;
use bytes::Bytes;
use image::ImageReader;
use std::io::Cursor;

pub struct ImageProcessor;

impl ImageProcessor {
    /// Read format and displayed dimensions without decoding pixel data.
    pub fn extract_metadata(data: &[u8]) -> Result<ImageMetadata, anyhow::Error> {
        let cursor = Cursor::new(data);
        let reader = ImageReader::new(cursor)
            .with_guessed_format()
            .context("Failed to read image header")?;
        let format = reader
            .format()
            .map(|f| format!("{:?}", f))
            .unwrap_or_else(|| "unknown".to_string());
        let (stored_width, stored_height) = reader
            .into_dimensions()
            .context("Failed to read image dimensions")?;

        let exif_orientation = ImageOrientation::read_exif_orientation(data);
        let (width, height) = if ImageOrientation::swaps_dimensions(exif_orientation) {
            (stored_height, stored_width)
        } else {
            (stored_width, stored_height)
        };

        Ok(ImageMetadata {
            width,
            height,
            format,
            exif_orientation: if exif_orientation != 1 {
                Some(exif_orientation)
            } else {
                None
            },
        })
    }

    /// Probe off the async pool; header parsing can still touch the whole payload.
    #[tracing::instrument(skip(data), fields(size_bytes = data.len()))]
    pub async fn probe(data: Bytes) -> Result<ImageMetadata, anyhow::Error> {
        let metadata = tokio::task::spawn_blocking(move || Self::extract_metadata(&data))
            .await
            .context("Image probe task failed")??;

        tracing::debug!(
            width = metadata.width,
            height = metadata.height,
            format = %metadata.format,
            "Image probe completed"
        );
        Ok(metadata)
    }
}
