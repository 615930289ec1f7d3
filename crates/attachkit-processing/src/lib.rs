//! Attachkit Media Processing Library
//!
//! This crate prepares user-selected files for sending: it probes media, produces
//! compressed copies and thumbnails, and normalizes the resulting attachment records.

pub mod builder;
pub mod metadata;
pub mod normalize;
pub mod payload_store;
pub mod tool;
pub mod traits;
pub mod validator;

#[cfg(feature = "image")]
pub mod compression;
#[cfg(feature = "image")]
pub mod image;

#[cfg(feature = "video")]
pub mod video;

#[cfg(feature = "audio")]
pub mod audio;

#[cfg(all(feature = "image", feature = "video", feature = "audio"))]
pub mod prober;

// Re-export commonly used types
pub use builder::AttachmentBuilder;
pub use metadata::{AudioMetadata, CoverArt, ImageMetadata, VideoMetadata};
pub use normalize::prepare_attachments_to_send;
pub use payload_store::{InMemoryPayloadStore, StoredPayload};
pub use tool::ToolError;
pub use traits::{ImageTranscoder, MediaProber, PayloadStore};
pub use validator::{
    content_type_for_filename, content_type_matches_filename, extension_for_content_type,
    replace_extension,
};

#[cfg(feature = "image")]
pub use crate::compression::OutputFormat;
#[cfg(feature = "image")]
pub use crate::image::{ImageOrientation, ImageProcessor, ImageTransformer};

#[cfg(feature = "video")]
pub use video::{PosterExtractor, VideoProcessor};

#[cfg(feature = "audio")]
pub use audio::AudioProcessor;

#[cfg(all(feature = "image", feature = "video", feature = "audio"))]
pub use prober::FfmpegMediaProber;
