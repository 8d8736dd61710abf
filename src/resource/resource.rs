//! The cached-resource envelope: a GPU object plus the bookkeeping the
//! resource cache needs to key, budget, and expire it.

use std::cell::Cell;

use crate::gpu::{buffer::GPUBuffer, render_target::RenderTarget, texture::GPUTexture};
use crate::resource::key::{ScratchKey, UniqueKey};

pub enum ResourceKind {
    Buffer(GPUBuffer),
    Texture(GPUTexture),
    RenderTarget(RenderTarget),
}

impl ResourceKind {
    pub fn byte_cost(&self) -> u64 {
        match self {
            Self::Buffer(b) => b.byte_cost(),
            Self::Texture(t) => t.byte_cost(),
            Self::RenderTarget(r) => r.byte_cost(),
        }
    }

    pub fn as_buffer(&self) -> Option<&GPUBuffer> {
        match self {
            Self::Buffer(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_texture(&self) -> Option<&GPUTexture> {
        match self {
            Self::Texture(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_render_target(&self) -> Option<&RenderTarget> {
        match self {
            Self::RenderTarget(r) => Some(r),
            _ => None,
        }
    }
}

/// A resource held in [`crate::resource::cache::ResourceCache`]. Shared via
/// `Rc`; the cache's own copy of the `Rc` is what keeps an otherwise
/// unreferenced resource alive while purgeable. A resource is purgeable
/// exactly when the cache's reference is the only strong reference left
/// (see `ResourceCache::process_unreferenced_resources`).
pub struct Resource {
    pub kind: ResourceKind,
    pub scratch_key: Option<ScratchKey>,
    pub unique_key: Option<UniqueKey>,
    pub(crate) byte_cost: u64,
    pub(crate) last_used_frame: Cell<u64>,
}

impl Resource {
    pub fn new(
        kind: ResourceKind,
        scratch_key: Option<ScratchKey>,
        unique_key: Option<UniqueKey>,
    ) -> Self {
        let byte_cost = kind.byte_cost();
        Self {
            kind,
            scratch_key,
            unique_key,
            byte_cost,
            last_used_frame: Cell::new(0),
        }
    }

    pub fn byte_cost(&self) -> u64 {
        self.byte_cost
    }

    pub fn touch(&self, frame: u64) {
        self.last_used_frame.set(frame);
    }

    pub fn last_used_frame(&self) -> u64 {
        self.last_used_frame.get()
    }
}
