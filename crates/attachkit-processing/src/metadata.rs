//! Media metadata types produced by probers

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Image metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Displayed width, after EXIF orientation
    pub width: u32,
    /// Displayed height, after EXIF orientation
    pub height: u32,
    pub format: String,
    pub exif_orientation: Option<u8>,
}

impl ImageMetadata {
    pub fn long_side(&self) -> u32 {
        self.width.max(self.height)
    }
}

/// Video metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub duration: f64,
    pub width: u32,
    pub height: u32,
    pub codec: String,
}

/// Picture embedded in an audio file
#[derive(Debug, Clone, PartialEq)]
pub struct CoverArt {
    pub data: Bytes,
    pub mime_type: String,
}

/// Audio metadata
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AudioMetadata {
    /// `None` when the container does not state a duration
    pub duration: Option<f64>,
    pub title: Option<String>,
    pub performer: Option<String>,
    pub codec: Option<String>,
    pub cover: Option<CoverArt>,
}
