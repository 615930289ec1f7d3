use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::payload::PayloadRef;

static UNIQUE_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Dimensions (and duration, for video) of media accepted for inline rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuickPreview {
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl QuickPreview {
    pub fn image(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            duration: None,
        }
    }

    pub fn video(width: u32, height: u32, duration: f64) -> Self {
        Self {
            width,
            height,
            duration: Some(duration),
        }
    }
}

/// Audio track details shown in the composer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioInfo {
    pub duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performer: Option<String>,
}

/// Voice-note details supplied by the recorder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceInfo {
    pub duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waveform: Option<Vec<u8>>,
}

/// Media-specific part of an attachment. At most one of quick preview and audio
/// details can exist, and only on the variant it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AttachmentMedia {
    Image { quick: QuickPreview },
    Video { quick: QuickPreview },
    Audio { audio: AudioInfo },
    File,
}

impl AttachmentMedia {
    pub fn kind(&self) -> &'static str {
        match self {
            AttachmentMedia::Image { .. } => "image",
            AttachmentMedia::Video { .. } => "video",
            AttachmentMedia::Audio { .. } => "audio",
            AttachmentMedia::File => "file",
        }
    }
}

/// Caller-supplied hints. Every value that is set overrides what the builder computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_send_in_high_quality: Option<bool>,
    /// Previously computed compressed copy; when present no new copy is produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compressed_ref: Option<PayloadRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_ref: Option<PayloadRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quick: Option<QuickPreview>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<VoiceInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_send_as_file: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_send_as_spoiler: Option<bool>,
}

impl AttachmentOptions {
    pub fn high_quality() -> Self {
        Self {
            should_send_in_high_quality: Some(true),
            ..Self::default()
        }
    }

    pub fn wants_high_quality(&self) -> bool {
        self.should_send_in_high_quality.unwrap_or(false)
    }
}

/// Immutable input to an attachment build.
#[derive(Debug, Clone)]
pub struct AttachmentInput {
    pub filename: String,
    pub payload: Bytes,
    pub size_bytes: u64,
    pub mime_type: String,
    pub options: AttachmentOptions,
}

impl AttachmentInput {
    pub fn new(
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        payload: impl Into<Bytes>,
    ) -> Self {
        let payload = payload.into();
        Self {
            filename: filename.into(),
            size_bytes: payload.len() as u64,
            payload,
            mime_type: mime_type.into(),
            options: AttachmentOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AttachmentOptions) -> Self {
        self.options = options;
        self
    }
}

/// A prepared attachment, ready for preview rendering and upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(skip)]
    pub payload: Bytes,
    pub payload_ref: PayloadRef,
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub media: AttachmentMedia,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_ref: Option<PayloadRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compressed_ref: Option<PayloadRef>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub should_send_as_file: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_send_in_high_quality: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_send_as_spoiler: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<VoiceInfo>,
    pub unique_id: String,
}

impl Attachment {
    pub fn quick(&self) -> Option<&QuickPreview> {
        match &self.media {
            AttachmentMedia::Image { quick } | AttachmentMedia::Video { quick } => Some(quick),
            _ => None,
        }
    }

    pub fn audio(&self) -> Option<&AudioInfo> {
        match &self.media {
            AttachmentMedia::Audio { audio } => Some(audio),
            _ => None,
        }
    }

    /// Audio tracks and voice notes are always delivered in their own message form.
    pub fn is_audio_or_voice(&self) -> bool {
        self.voice.is_some() || matches!(self.media, AttachmentMedia::Audio { .. })
    }

    /// Copy of this attachment delivered as a generic file. Quick previews are dropped
    /// because a file is never rendered inline.
    pub fn with_send_as_file(mut self) -> Self {
        if self.quick().is_some() {
            self.media = AttachmentMedia::File;
        }
        self.should_send_as_file = true;
        self
    }

    /// Copy of this attachment whose primary payload is `payload_ref`.
    pub fn with_payload_ref(mut self, payload_ref: PayloadRef) -> Self {
        self.payload_ref = payload_ref;
        self
    }

    /// Apply caller hints on top of computed values.
    pub fn with_options(mut self, options: &AttachmentOptions) -> Self {
        if let Some(filename) = &options.filename {
            self.filename = filename.clone();
        }
        if let Some(preview_ref) = &options.preview_ref {
            self.preview_ref = Some(preview_ref.clone());
        }
        if let Some(compressed_ref) = &options.compressed_ref {
            self.compressed_ref = Some(compressed_ref.clone());
        }
        if let Some(override_quick) = options.quick {
            match &mut self.media {
                AttachmentMedia::Image { quick } | AttachmentMedia::Video { quick } => {
                    *quick = override_quick;
                }
                _ => {}
            }
        }
        if let Some(override_audio) = &options.audio {
            if let AttachmentMedia::Audio { audio } = &mut self.media {
                *audio = override_audio.clone();
            }
        }
        if options.voice.is_some() {
            self.voice = options.voice.clone();
        }
        if options.should_send_in_high_quality.is_some() {
            self.should_send_in_high_quality = options.should_send_in_high_quality;
        }
        if options.should_send_as_spoiler.is_some() {
            self.should_send_as_spoiler = options.should_send_as_spoiler;
        }
        match options.should_send_as_file {
            Some(true) => self.with_send_as_file(),
            Some(false) => {
                self.should_send_as_file = false;
                self
            }
            None => self,
        }
    }

    /// Every payload handle this attachment references, without duplicates.
    pub fn handles(&self) -> Vec<&PayloadRef> {
        let mut handles = vec![&self.payload_ref];
        for handle in [&self.preview_ref, &self.compressed_ref].into_iter().flatten() {
            if !handles.contains(&handle) {
                handles.push(handle);
            }
        }
        handles
    }
}

/// Identifier unique across concurrent builds within the process.
pub fn generate_unique_id() -> String {
    let sequence = UNIQUE_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        sequence,
        Uuid::new_v4().simple()
    )
}
