//! Compiled-pipeline LRU, bounded at 128 entries (P2).
//!
//! The key is built from the geometry-processor kind, the ordered
//! fragment-processor chain's kinds, and the xfer processor's blend mode —
//! mirroring the upstream `ProgramCreator`'s three-part `BytesKey`
//! construction, so two draw ops with structurally identical processor
//! chains but different instance data hash to the same pipeline.

use std::num::NonZeroUsize;
use std::rc::Rc;

use lru::LruCache;

use crate::gpu::pipeline::{RenderPipeline, RenderPipelineDescriptor};
use crate::gpu::WgpuGpu;

pub const PROGRAM_CACHE_CAPACITY: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgramKey(Vec<u32>);

impl ProgramKey {
    pub fn new(geometry_processor_kind: u32, fragment_kinds: &[u32], blend_tag: u32) -> Self {
        let mut parts = Vec::with_capacity(fragment_kinds.len() + 2);
        parts.push(geometry_processor_kind);
        parts.extend_from_slice(fragment_kinds);
        parts.push(blend_tag);
        Self(parts)
    }
}

pub struct ProgramCache {
    lru: LruCache<ProgramKey, Rc<RenderPipeline>>,
}

impl Default for ProgramCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramCache {
    pub fn new() -> Self {
        Self {
            lru: LruCache::new(NonZeroUsize::new(PROGRAM_CACHE_CAPACITY).unwrap()),
        }
    }

    pub fn len(&self) -> usize {
        self.lru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lru.is_empty()
    }

    /// Returns the cached program for `key`, compiling and inserting it on
    /// a miss (section 4.6 step 2). Moves the entry to the front on a hit.
    pub fn get_or_compile(
        &mut self,
        gpu: &WgpuGpu,
        key: ProgramKey,
        descriptor: impl FnOnce() -> RenderPipelineDescriptor,
    ) -> Rc<RenderPipeline> {
        if let Some(found) = self.lru.get(&key) {
            return found.clone();
        }
        let desc = descriptor();
        let compiled = Rc::new(gpu.create_render_pipeline(&desc));
        tracing::debug!(cache_len = self.lru.len() + 1, "compiled new pipeline");
        self.lru.put(key, compiled.clone());
        compiled
    }

    pub fn contains(&self, key: &ProgramKey) -> bool {
        self.lru.contains(key)
    }
}
