//! Long-lived, shared GPU objects: compiled pipelines, shared index
//! buffers, gradient LUTs, and the uniform ring buffer. Distinct from
//! [`crate::resource::ResourceCache`], which handles frame-expiring,
//! content-keyed general resources.

pub mod gradient_cache;
pub mod index_buffers;
pub mod program_cache;
pub mod uniform_ring;

use std::collections::HashMap;
use std::rc::Rc;

use crate::gpu::WgpuGpu;
use crate::resource::{Resource, UniqueKey};

pub use gradient_cache::{GradientCache, GradientKey};
pub use index_buffers::IndexBuffers;
pub use program_cache::{ProgramCache, ProgramKey};
pub use uniform_ring::UniformRingBuffer;

/// Upstream tgfx keeps the shared index buffers as entries of a generic
/// `staticResources: ResourceKeyMap`, not a fourth parallel cache. This
/// crate follows that structure: `static_resources` holds anything else
/// addressed by a stable `UniqueKey` that should never expire, while the
/// index buffers themselves get dedicated fields since every context needs
/// exactly one of each.
pub struct GlobalCache {
    pub programs: ProgramCache,
    pub gradients: GradientCache,
    pub index_buffers: IndexBuffers,
    pub uniform_ring: UniformRingBuffer,
    static_resources: HashMap<UniqueKey, Rc<Resource>>,
}

impl GlobalCache {
    pub fn new(gpu: &WgpuGpu) -> Self {
        Self {
            programs: ProgramCache::new(),
            gradients: GradientCache::new(),
            index_buffers: IndexBuffers::new(gpu),
            uniform_ring: UniformRingBuffer::new(gpu, gpu.caps().uniform_buffer_offset_alignment),
            static_resources: HashMap::new(),
        }
    }

    pub fn find_static_resource(&self, key: &UniqueKey) -> Option<Rc<Resource>> {
        self.static_resources.get(key).cloned()
    }

    pub fn add_static_resource(&mut self, key: UniqueKey, resource: Rc<Resource>) {
        self.static_resources.insert(key, resource);
    }
}
