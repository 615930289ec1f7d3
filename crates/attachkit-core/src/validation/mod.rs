//! Validation modules

pub mod geometry;

pub use geometry::{aspect_ratio, validate_aspect_ratio, validate_aspect_ratio_with_limit};
