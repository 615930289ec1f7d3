//! Attachkit Core Library
//!
//! This crate provides the attachment domain models, error types, configuration, and
//! validation shared by the attachkit processing crate and its command-line front end.

pub mod config;
pub mod constants;
pub mod error;
pub mod links;
pub mod messages;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{AttachConfig, MediaClass, MediaTypesConfig, PosterFailurePolicy};
pub use error::{AttachmentError, ErrorMetadata, LogLevel};
pub use links::ensure_protocol;
pub use messages::collect_message_ids;
pub use models::{
    Attachment, AttachmentInput, AttachmentMedia, AttachmentOptions, AudioInfo, PayloadRef,
    QuickPreview, VoiceInfo,
};
pub use validation::validate_aspect_ratio;
