//! Geometric validation of media accepted for inline rendering.

use crate::constants::MAX_ASPECT_RATIO;

/// `max(w, h) / min(w, h)`, or `None` when either side is zero.
pub fn aspect_ratio(width: u32, height: u32) -> Option<f64> {
    let (long, short) = if width >= height {
        (width, height)
    } else {
        (height, width)
    };
    if short == 0 {
        return None;
    }
    Some(f64::from(long) / f64::from(short))
}

/// Whether media of this shape may be rendered inline.
pub fn validate_aspect_ratio(width: u32, height: u32) -> bool {
    validate_aspect_ratio_with_limit(width, height, MAX_ASPECT_RATIO)
}

pub fn validate_aspect_ratio_with_limit(width: u32, height: u32, max_ratio: f64) -> bool {
    aspect_ratio(width, height).is_some_and(|ratio| ratio <= max_ratio)
}
