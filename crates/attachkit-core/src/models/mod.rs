//! Data models for attachment preparation

mod attachment;
mod payload;

pub use attachment::{
    generate_unique_id, Attachment, AttachmentInput, AttachmentMedia, AttachmentOptions,
    AudioInfo, QuickPreview, VoiceInfo,
};
pub use payload::PayloadRef;
