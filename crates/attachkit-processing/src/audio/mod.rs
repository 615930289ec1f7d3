//! Audio probing

pub mod processor;

pub use processor::AudioProcessor;
