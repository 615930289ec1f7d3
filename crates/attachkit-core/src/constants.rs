//! Sizing constants used when preparing attachments.

/// Longest side (px) of an inline photo sent in standard quality.
pub const MAX_STANDARD_QUALITY_IMG_SIZE: u32 = 1280;

/// Longest side (px) of an inline photo sent in high quality.
pub const MAX_HIGH_QUALITY_IMG_SIZE: u32 = 2560;

/// Longest side (px) of the composer thumbnail.
pub const MAX_THUMB_IMG_SIZE: u32 = 40;

/// Largest accepted `max(w, h) / min(w, h)` for inline media.
pub const MAX_ASPECT_RATIO: f64 = 20.0;

/// Encoding every compressed copy and thumbnail is produced in.
pub const QUICK_PREVIEW_MIME_TYPE: &str = "image/jpeg";

pub const GIF_MIME_TYPE: &str = "image/gif";

/// Prefix of every payload handle handed out by a payload store.
pub const PAYLOAD_REF_PREFIX: &str = "blob:attachkit/";
