//! Reference to an already stored image.

use serde::{Deserialize, Serialize};

/// Maximum size of a single image or avatar, in bytes
pub const MAX_IMAGE_SIZE: u64 = 5 * 1024 * 1024;

/// A stored image: its public url and size in bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    pub size: u64,
}

impl ImageRef {
    pub fn new(url: impl Into<String>, size: u64) -> Self {
        Self {
            url: url.into(),
            size,
        }
    }

    pub fn exceeds_max_size(&self) -> bool {
        self.size > MAX_IMAGE_SIZE
    }
}
