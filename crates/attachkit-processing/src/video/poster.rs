//! Poster frame extraction via ffmpeg

use crate::tool::{ensure_jpeg, run_tool, stage_payload, validate_tool_path};
use anyhow::{Context, Result};
use bytes::Bytes;

/// Grabs the first frame of a video as a JPEG still
pub struct PosterExtractor {
    ffmpeg_path: String,
}

impl PosterExtractor {
    pub fn new(ffmpeg_path: String) -> Result<Self> {
        validate_tool_path(&ffmpeg_path).context("Invalid ffmpeg_path")?;
        Ok(Self { ffmpeg_path })
    }

    #[tracing::instrument(skip(self, data), fields(
        process.executable.name = "ffmpeg",
        ffmpeg.operation = "poster",
        payload.size = data.len()
    ))]
    pub async fn extract(&self, data: Bytes) -> Result<Bytes> {
        let staged = stage_payload(&self.ffmpeg_path, &data).await?;
        let stdout = run_tool(
            &self.ffmpeg_path,
            &["-v", "error", "-i"],
            staged.path(),
            &[
                "-frames:v",
                "1",
                "-f",
                "image2pipe",
                "-vcodec",
                "mjpeg",
                "pipe:1",
            ],
        )
        .await?;

        let poster = ensure_jpeg(&self.ffmpeg_path, stdout)?;
        tracing::debug!(poster_size = poster.len(), "Poster frame extracted");
        Ok(poster)
    }
}
