use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::PAYLOAD_REF_PREFIX;

/// Addressable handle to binary content held by a payload store.
///
/// Handles are cheap to clone and compare; the bytes they point to live in the store
/// until the owner releases the handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PayloadRef(String);

impl PayloadRef {
    /// Allocate a fresh, never-before-seen handle.
    pub fn generate() -> Self {
        PayloadRef(format!("{}{}", PAYLOAD_REF_PREFIX, Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PayloadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
