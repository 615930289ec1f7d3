//! Core traits for attachment preparation
//!
//! The builder only talks to its collaborators through these traits, so probing and
//! transcoding backends can be swapped (or faked in tests) without touching the
//! decision logic.

use async_trait::async_trait;
use bytes::Bytes;

use attachkit_core::{Attachment, PayloadRef};

use crate::metadata::{AudioMetadata, ImageMetadata, VideoMetadata};
use crate::payload_store::StoredPayload;

/// Media prober trait - decodes payloads far enough to learn their shape
#[async_trait]
pub trait MediaProber: Send + Sync {
    /// Displayed dimensions of an image (EXIF orientation applied)
    async fn probe_image(&self, data: Bytes) -> Result<ImageMetadata, anyhow::Error>;

    /// Dimensions and duration of the first video stream
    async fn probe_video(&self, data: Bytes) -> Result<VideoMetadata, anyhow::Error>;

    /// Duration, tags and embedded cover art of an audio track
    async fn probe_audio(&self, data: Bytes) -> Result<AudioMetadata, anyhow::Error>;

    /// A single JPEG frame usable as the video's poster
    async fn video_poster(&self, data: Bytes) -> Result<Bytes, anyhow::Error>;
}

/// Image transcoder trait - produces resized copies in a target encoding
#[async_trait]
pub trait ImageTranscoder: Send + Sync {
    /// Scale both sides by `scale` (capped at 1.0) and encode as `target_mime_type`
    async fn resize(
        &self,
        data: Bytes,
        scale: f64,
        target_mime_type: &str,
    ) -> Result<Bytes, anyhow::Error>;
}

/// Payload store trait - hands out addressable handles to binary content
#[async_trait]
pub trait PayloadStore: Send + Sync {
    /// Keep `data` alive under a fresh handle
    async fn register(&self, data: Bytes, mime_type: &str) -> PayloadRef;

    /// Look up the content behind a handle
    async fn resolve(&self, handle: &PayloadRef) -> Option<StoredPayload>;

    /// Drop the content behind a handle; returns false for unknown handles
    async fn release(&self, handle: &PayloadRef) -> bool;

    /// Number of live handles
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Release every handle an attachment references; returns how many were live.
    ///
    /// Pass the record `build` returned. A normalized copy may have swapped `payload_ref`
    /// for the compressed copy, so it no longer names the original payload handle.
    async fn release_attachment(&self, attachment: &Attachment) -> usize {
        let mut released = 0;
        for handle in attachment.handles() {
            if self.release(handle).await {
                released += 1;
            }
        }
        released
    }
}
