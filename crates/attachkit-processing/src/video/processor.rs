//! Video processor - metadata extraction via ffprobe

use crate::metadata::VideoMetadata;
use crate::tool::{run_tool, stage_payload, validate_tool_path};
use anyhow::{anyhow, Context, Result};
use bytes::Bytes;

pub struct VideoProcessor {
    ffprobe_path: String,
}

impl VideoProcessor {
    pub fn new(ffprobe_path: String) -> Result<Self> {
        validate_tool_path(&ffprobe_path).context("Invalid ffprobe_path")?;
        Ok(Self { ffprobe_path })
    }

    /// Probe the first video stream of a payload
    #[tracing::instrument(skip(self, data), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe",
        payload.size = data.len()
    ))]
    pub async fn probe(&self, data: Bytes) -> Result<VideoMetadata> {
        let start = std::time::Instant::now();

        let staged = stage_payload(&self.ffprobe_path, &data).await?;
        let stdout = run_tool(
            &self.ffprobe_path,
            &[
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                "-select_streams",
                "v:0",
            ],
            staged.path(),
            &[],
        )
        .await?;

        let metadata = parse_probe_output(&stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            video_duration = metadata.duration,
            width = metadata.width,
            height = metadata.height,
            codec = %metadata.codec,
            "Video probe completed"
        );

        Ok(metadata)
    }
}

/// Parse `ffprobe -print_format json` output for a single video stream.
///
/// The container duration is preferred; the stream duration is used when the format
/// section omits it (common for WebM). A stream with no duration at all reports 0.
pub(crate) fn parse_probe_output(stdout: &[u8]) -> Result<VideoMetadata> {
    let probe_data: serde_json::Value =
        serde_json::from_slice(stdout).context("Failed to parse ffprobe output")?;

    let stream = probe_data["streams"]
        .get(0)
        .ok_or_else(|| anyhow!("No video stream found"))?;

    let format = &probe_data["format"];

    let duration = format["duration"]
        .as_str()
        .or_else(|| stream["duration"].as_str())
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .unwrap_or_else(|| {
            tracing::debug!("Video stream reports no duration, using 0");
            0.0
        });

    let width = stream["width"]
        .as_u64()
        .and_then(|w| u32::try_from(w).ok())
        .ok_or_else(|| anyhow!("Could not parse width"))?;

    let height = stream["height"]
        .as_u64()
        .and_then(|h| u32::try_from(h).ok())
        .ok_or_else(|| anyhow!("Could not parse height"))?;

    let codec = stream["codec_name"]
        .as_str()
        .unwrap_or("unknown")
        .to_string();

    Ok(VideoMetadata {
        duration,
        width,
        height,
        codec,
    })
}
