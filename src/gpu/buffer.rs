//! GPU buffer objects.

use crate::pixel::BufferUsage;

/// A GPU-resident, possibly CPU-mappable, block of memory.
///
/// `GPUBuffer` never outlives the `wgpu::Buffer` it wraps; the resource
/// cache owns the lifetime decision, this type is just the handle used by
/// draw ops and tasks.
#[derive(Debug)]
pub struct GPUBuffer {
    pub(crate) raw: wgpu::Buffer,
    pub(crate) size: u64,
    pub(crate) usage: BufferUsage,
}

impl GPUBuffer {
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    pub fn raw(&self) -> &wgpu::Buffer {
        &self.raw
    }

    /// Approximate byte cost for resource-cache accounting; buffers have no
    /// additional allocation overhead worth tracking separately.
    pub fn byte_cost(&self) -> u64 {
        self.size
    }
}

pub(crate) fn to_wgpu_usage(usage: BufferUsage) -> wgpu::BufferUsages {
    let mut out = wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::COPY_SRC;
    if usage.contains(BufferUsage::INDEX) {
        out |= wgpu::BufferUsages::INDEX;
    }
    if usage.contains(BufferUsage::VERTEX) {
        out |= wgpu::BufferUsages::VERTEX;
    }
    if usage.contains(BufferUsage::UNIFORM) {
        out |= wgpu::BufferUsages::UNIFORM;
    }
    if usage.contains(BufferUsage::READBACK) {
        out |= wgpu::BufferUsages::MAP_READ;
    }
    out
}
