//! Error types module
//!
//! Every failure that aborts an attachment build surfaces as an [`AttachmentError`].
//! Processing internals work with `anyhow::Error` and are wrapped into the variant that
//! names the failed step, so callers can decide how to notify the user.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like malformed input
    Debug,
    /// Warning level - for failures caused by the user's file
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be presented to the caller.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "IMAGE_PROBE_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same build could succeed
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// User-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    #[error("Failed to probe image: {0}")]
    ImageProbe(#[source] anyhow::Error),

    #[error("Failed to probe video: {0}")]
    VideoProbe(#[source] anyhow::Error),

    #[error("Failed to derive video poster: {0}")]
    PosterDerivation(#[source] anyhow::Error),

    #[error("Failed to probe audio: {0}")]
    AudioProbe(#[source] anyhow::Error),

    #[error("Failed to transcode image: {0}")]
    Transcode(#[source] anyhow::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Static metadata for each variant: (error_code, recoverable, suggested_action, log_level).
fn attachment_error_static_metadata(
    err: &AttachmentError,
) -> (&'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        AttachmentError::ImageProbe(_) => (
            "IMAGE_PROBE_FAILED",
            false,
            Some("Check the image format or send it as a file"),
            LogLevel::Warn,
        ),
        AttachmentError::VideoProbe(_) => (
            "VIDEO_PROBE_FAILED",
            false,
            Some("Send the video as a file"),
            LogLevel::Warn,
        ),
        AttachmentError::PosterDerivation(_) => (
            "POSTER_DERIVATION_FAILED",
            false,
            Some("Check the video file or send it as a file"),
            LogLevel::Warn,
        ),
        AttachmentError::AudioProbe(_) => (
            "AUDIO_PROBE_FAILED",
            false,
            Some("Check the audio file or send it as a file"),
            LogLevel::Warn,
        ),
        AttachmentError::Transcode(_) => (
            "TRANSCODE_FAILED",
            true,
            Some("Retry attaching the file"),
            LogLevel::Error,
        ),
        AttachmentError::Config(_) => (
            "INVALID_CONFIGURATION",
            false,
            Some("Fix the attachment configuration"),
            LogLevel::Error,
        ),
    }
}

impl ErrorMetadata for AttachmentError {
    fn error_code(&self) -> &'static str {
        attachment_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        attachment_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        attachment_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        attachment_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AttachmentError::ImageProbe(_) => "Could not read this image".to_string(),
            AttachmentError::VideoProbe(_) => "Could not read this video".to_string(),
            AttachmentError::PosterDerivation(_) => {
                "Could not create a preview for this video".to_string()
            }
            AttachmentError::AudioProbe(_) => "Could not read this audio file".to_string(),
            AttachmentError::Transcode(_) => "Could not compress this image".to_string(),
            AttachmentError::Config(ref msg) => msg.clone(),
        }
    }
}
