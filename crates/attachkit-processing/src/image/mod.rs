//! Image processing module
//!
//! - Dimension probing with EXIF orientation (processor)
//! - Orientation correction (orientation)
//! - Scaled, re-encoded copies for compressed sends and thumbnails (transformer)

pub mod orientation;
pub mod processor;
pub mod transformer;

pub use orientation::ImageOrientation;
pub use processor::ImageProcessor;
pub use transformer::ImageTransformer;
