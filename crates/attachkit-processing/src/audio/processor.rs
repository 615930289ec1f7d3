//! Audio processor - duration, tags and cover art via ffprobe / ffmpeg

use crate::metadata::{AudioMetadata, CoverArt};
use crate::tool::{ensure_jpeg, run_tool, stage_payload, validate_tool_path};
use anyhow::{Context, Result};
use bytes::Bytes;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct FFprobeOutput {
    format: Option<FFprobeFormat>,
    streams: Option<Vec<FFprobeStream>>,
}

#[derive(Debug, Deserialize)]
struct FFprobeFormat {
    duration: Option<String>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct FFprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    duration: Option<String>,
    #[serde(default)]
    disposition: HashMap<String, i64>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

impl FFprobeStream {
    fn is_attached_picture(&self) -> bool {
        self.disposition.get("attached_pic").copied() == Some(1)
    }
}

/// Parsed probe result, before cover art is pulled out
#[derive(Debug, PartialEq)]
pub(crate) struct AudioProbe {
    pub duration: Option<f64>,
    pub title: Option<String>,
    pub performer: Option<String>,
    pub codec: Option<String>,
    pub has_cover: bool,
}

pub struct AudioProcessor {
    ffprobe_path: String,
    ffmpeg_path: String,
}

impl AudioProcessor {
    pub fn new(ffprobe_path: String, ffmpeg_path: String) -> Result<Self> {
        validate_tool_path(&ffprobe_path).context("Invalid ffprobe_path")?;
        validate_tool_path(&ffmpeg_path).context("Invalid ffmpeg_path")?;
        Ok(Self {
            ffprobe_path,
            ffmpeg_path,
        })
    }

    /// Probe an audio payload. Cover art extraction is best effort.
    #[tracing::instrument(skip(self, data), fields(service = "audio", payload.size = data.len()))]
    pub async fn probe(&self, data: Bytes) -> Result<AudioMetadata> {
        let staged = stage_payload(&self.ffprobe_path, &data).await?;
        let stdout = run_tool(
            &self.ffprobe_path,
            &[
                "-v",
                "error",
                "-show_format",
                "-show_streams",
                "-of",
                "json",
            ],
            staged.path(),
            &[],
        )
        .await?;

        let probe = parse_probe_output(&stdout)?;

        let cover = if probe.has_cover {
            match self.extract_cover(staged.path()).await {
                Ok(data) => Some(CoverArt {
                    data,
                    mime_type: "image/jpeg".to_string(),
                }),
                Err(e) => {
                    warn!(error = %e, "Failed to extract audio cover art");
                    None
                }
            }
        } else {
            None
        };

        info!(
            duration = ?probe.duration,
            codec = ?probe.codec,
            has_cover = cover.is_some(),
            "Audio probe completed"
        );

        Ok(AudioMetadata {
            duration: probe.duration,
            title: probe.title,
            performer: probe.performer,
            codec: probe.codec,
            cover,
        })
    }

    async fn extract_cover(&self, input: &Path) -> Result<Bytes> {
        let stdout = run_tool(
            &self.ffmpeg_path,
            &["-v", "error", "-i"],
            input,
            &[
                "-an",
                "-map",
                "0:v:0",
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
        Ok(ensure_jpeg(&self.ffmpeg_path, stdout)?)
    }
}

fn tag<'a>(tags: &'a HashMap<String, String>, names: &[&str]) -> Option<&'a str> {
    names.iter().find_map(|name| {
        tags.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    })
}

pub(crate) fn parse_probe_output(stdout: &[u8]) -> Result<AudioProbe> {
    let probe: FFprobeOutput =
        serde_json::from_slice(stdout).context("Failed to parse ffprobe output")?;

    let streams = probe.streams.unwrap_or_default();
    let audio_stream = streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"));

    let empty = HashMap::new();
    let format_tags = probe.format.as_ref().map_or(&empty, |f| &f.tags);
    let stream_tags = audio_stream.map_or(&empty, |s| &s.tags);

    let duration = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or_else(|| audio_stream.and_then(|s| s.duration.as_deref()))
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0);

    let title = tag(format_tags, &["title"])
        .or_else(|| tag(stream_tags, &["title"]))
        .map(str::to_string);
    let performer = tag(format_tags, &["artist", "performer", "album_artist"])
        .or_else(|| tag(stream_tags, &["artist", "performer"]))
        .map(str::to_string);

    Ok(AudioProbe {
        duration,
        title,
        performer,
        codec: audio_stream.and_then(|s| s.codec_name.clone()),
        has_cover: streams.iter().any(FFprobeStream::is_attached_picture),
    })
}
