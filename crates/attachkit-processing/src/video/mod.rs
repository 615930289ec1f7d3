//! Video probing and poster extraction

pub mod poster;
pub mod processor;

pub use poster::PosterExtractor;
pub use processor::VideoProcessor;
