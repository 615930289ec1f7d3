//! Configuration module
//!
//! Attachment preparation is driven by an explicit [`AttachConfig`] value handed to the
//! builder: the supported mime-type sets, the quick-preview ceilings and the external
//! tool paths. `AttachConfig::default()` carries the stock values; `from_env` overlays
//! `ATTACH_*` environment variables (and a `.env` file when present).

use std::collections::HashSet;
use std::env;

use serde::{Deserialize, Serialize};

use crate::constants::{
    GIF_MIME_TYPE, MAX_ASPECT_RATIO, MAX_HIGH_QUALITY_IMG_SIZE, MAX_STANDARD_QUALITY_IMG_SIZE,
    MAX_THUMB_IMG_SIZE, QUICK_PREVIEW_MIME_TYPE,
};
use crate::error::AttachmentError;

const DEFAULT_PHOTO_TYPES: &[&str] = &["image/png", "image/gif", "image/jpeg"];
const DEFAULT_VIDEO_TYPES: &[&str] = &["video/mp4", "video/quicktime", "video/webm"];
const DEFAULT_AUDIO_TYPES: &[&str] = &[
    "audio/mp3",
    "audio/mpeg",
    "audio/ogg",
    "audio/wav",
    "audio/x-wav",
    "audio/flac",
    "audio/aac",
    "audio/mp4",
    "audio/x-m4a",
];

/// Which builder branch a mime type is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaClass {
    Photo,
    Video,
    Audio,
    Other,
}

/// Supported mime-type sets, read-only and shared across concurrent builds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaTypesConfig {
    pub photo: HashSet<String>,
    pub video: HashSet<String>,
    pub audio: HashSet<String>,
    /// Animated image type that is never re-encoded.
    pub animated_image: String,
}

impl Default for MediaTypesConfig {
    fn default() -> Self {
        Self {
            photo: to_set(DEFAULT_PHOTO_TYPES),
            video: to_set(DEFAULT_VIDEO_TYPES),
            audio: to_set(DEFAULT_AUDIO_TYPES),
            animated_image: GIF_MIME_TYPE.to_string(),
        }
    }
}

impl MediaTypesConfig {
    /// Route a mime type to its branch. Matching ignores case and parameters
    /// (`image/JPEG; q=1` classifies as a photo).
    pub fn classify(&self, mime_type: &str) -> MediaClass {
        let normalized = normalize_mime(mime_type);
        if self.photo.contains(&normalized) {
            MediaClass::Photo
        } else if self.video.contains(&normalized) {
            MediaClass::Video
        } else if self.audio.contains(&normalized) {
            MediaClass::Audio
        } else {
            MediaClass::Other
        }
    }

    pub fn is_animated_image(&self, mime_type: &str) -> bool {
        normalize_mime(mime_type) == self.animated_image
    }
}

/// What to do when a video poster frame cannot be derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PosterFailurePolicy {
    /// Abort the build with `AttachmentError::PosterDerivation`.
    #[default]
    Propagate,
    /// Keep building and leave the preview unset.
    Skip,
}

impl PosterFailurePolicy {
    pub fn parse(s: &str) -> Result<Self, AttachmentError> {
        match s.trim().to_lowercase().as_str() {
            "propagate" | "fail" => Ok(PosterFailurePolicy::Propagate),
            "skip" | "ignore" => Ok(PosterFailurePolicy::Skip),
            other => Err(AttachmentError::Config(format!(
                "Invalid poster failure policy: {}",
                other
            ))),
        }
    }
}

/// Attachment builder configuration
#[derive(Clone, Debug)]
pub struct AttachConfig {
    pub media_types: MediaTypesConfig,
    pub max_standard_quality_size: u32,
    pub max_high_quality_size: u32,
    pub max_thumb_size: u32,
    pub max_aspect_ratio: f64,
    /// Encoding of compressed copies and thumbnails.
    pub quick_preview_mime_type: String,
    /// JPEG quality (1-100) of compressed copies and thumbnails.
    pub jpeg_quality: u8,
    pub poster_failure: PosterFailurePolicy,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
}

impl Default for AttachConfig {
    fn default() -> Self {
        Self {
            media_types: MediaTypesConfig::default(),
            max_standard_quality_size: MAX_STANDARD_QUALITY_IMG_SIZE,
            max_high_quality_size: MAX_HIGH_QUALITY_IMG_SIZE,
            max_thumb_size: MAX_THUMB_IMG_SIZE,
            max_aspect_ratio: MAX_ASPECT_RATIO,
            quick_preview_mime_type: QUICK_PREVIEW_MIME_TYPE.to_string(),
            jpeg_quality: 85,
            poster_failure: PosterFailurePolicy::default(),
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
        }
    }
}

impl AttachConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let media_types = MediaTypesConfig {
            photo: env_list("ATTACH_PHOTO_TYPES").unwrap_or(defaults.media_types.photo),
            video: env_list("ATTACH_VIDEO_TYPES").unwrap_or(defaults.media_types.video),
            audio: env_list("ATTACH_AUDIO_TYPES").unwrap_or(defaults.media_types.audio),
            animated_image: env::var("ATTACH_ANIMATED_IMAGE_TYPE")
                .map(|s| normalize_mime(&s))
                .unwrap_or(defaults.media_types.animated_image),
        };

        let poster_failure = match env::var("ATTACH_POSTER_FAILURE") {
            Ok(value) => PosterFailurePolicy::parse(&value)?,
            Err(_) => defaults.poster_failure,
        };

        let config = Self {
            media_types,
            max_standard_quality_size: env_parse(
                "ATTACH_MAX_STANDARD_QUALITY_SIZE",
                defaults.max_standard_quality_size,
            )?,
            max_high_quality_size: env_parse(
                "ATTACH_MAX_HIGH_QUALITY_SIZE",
                defaults.max_high_quality_size,
            )?,
            max_thumb_size: env_parse("ATTACH_MAX_THUMB_SIZE", defaults.max_thumb_size)?,
            max_aspect_ratio: env_parse("ATTACH_MAX_ASPECT_RATIO", defaults.max_aspect_ratio)?,
            quick_preview_mime_type: defaults.quick_preview_mime_type,
            jpeg_quality: env_parse("ATTACH_JPEG_QUALITY", defaults.jpeg_quality)?,
            poster_failure,
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or(defaults.ffmpeg_path),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or(defaults.ffprobe_path),
        };

        config.validate()?;

        tracing::debug!(
            photo_types = config.media_types.photo.len(),
            video_types = config.media_types.video.len(),
            audio_types = config.media_types.audio.len(),
            poster_failure = ?config.poster_failure,
            "Attachment configuration loaded"
        );
        Ok(config)
    }

    /// Reject values that would make the builder misbehave.
    pub fn validate(&self) -> Result<(), AttachmentError> {
        if self.max_standard_quality_size == 0 || self.max_high_quality_size == 0 {
            return Err(AttachmentError::Config(
                "Quick preview ceilings must be greater than zero".to_string(),
            ));
        }
        if self.max_high_quality_size < self.max_standard_quality_size {
            return Err(AttachmentError::Config(format!(
                "High quality ceiling ({}) is below the standard ceiling ({})",
                self.max_high_quality_size, self.max_standard_quality_size
            )));
        }
        if self.max_thumb_size == 0 {
            return Err(AttachmentError::Config(
                "Thumbnail size must be greater than zero".to_string(),
            ));
        }
        if self.max_aspect_ratio < 1.0 || !self.max_aspect_ratio.is_finite() {
            return Err(AttachmentError::Config(format!(
                "Max aspect ratio must be a finite value >= 1, got {}",
                self.max_aspect_ratio
            )));
        }
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(AttachmentError::Config(format!(
                "JPEG quality must be within 1-100, got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }

    /// Longest side allowed for an inline photo in the requested quality.
    pub fn quick_size_ceiling(&self, high_quality: bool) -> u32 {
        if high_quality {
            self.max_high_quality_size
        } else {
            self.max_standard_quality_size
        }
    }
}

/// Lowercase and strip parameters from a mime type.
pub fn normalize_mime(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

fn to_set(values: &[&str]) -> HashSet<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn env_list(key: &str) -> Option<HashSet<String>> {
    let raw = env::var(key).ok()?;
    let set: HashSet<String> = raw
        .split(',')
        .map(normalize_mime)
        .filter(|s| !s.is_empty())
        .collect();
    Some(set)
}

fn env_parse<T>(key: &str, default: T) -> Result<T, anyhow::Error>
where
    T: std::str::FromStr,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got '{}'", key, raw)),
        Err(_) => Ok(default),
    }
}
