//! Declarative configuration for [`crate::context::Context`] construction,
//! bundling the cache-limit/expiration knobs section 6 exposes as runtime
//! setters plus backend selection.

use crate::resource::cache::{DEFAULT_CACHE_LIMIT_BYTES, DEFAULT_EXPIRATION_FRAMES};

#[derive(Debug, Clone, Copy)]
pub struct ContextOptions {
    pub cache_limit_bytes: u64,
    pub resource_expiration_frames: u64,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            cache_limit_bytes: DEFAULT_CACHE_LIMIT_BYTES,
            resource_expiration_frames: DEFAULT_EXPIRATION_FRAMES,
        }
    }
}

impl ContextOptions {
    pub fn with_cache_limit_bytes(mut self, bytes: u64) -> Self {
        self.cache_limit_bytes = bytes;
        self
    }

    pub fn with_resource_expiration_frames(mut self, frames: u64) -> Self {
        self.resource_expiration_frames = frames;
        self
    }
}
