//! Shared uniform ring buffer: each draw requests an aligned slice, writes
//! into it, and the whole region is reclaimed in one shot at flush end.

use crate::error::{CoreError, CoreResult};
use crate::gpu::buffer::GPUBuffer;
use crate::gpu::WgpuGpu;
use crate::pixel::BufferUsage;

const DEFAULT_RING_CAPACITY: u64 = 4 * 1024 * 1024;

pub struct UniformSlice {
    pub offset: u64,
    pub size: u64,
}

pub struct UniformRingBuffer {
    buffer: GPUBuffer,
    capacity: u64,
    cursor: u64,
    alignment: u64,
}

impl UniformRingBuffer {
    pub fn new(gpu: &WgpuGpu, alignment: u64) -> Self {
        let buffer = gpu
            .create_buffer(DEFAULT_RING_CAPACITY, BufferUsage::UNIFORM)
            .expect("uniform ring buffer allocation");
        Self {
            buffer,
            capacity: DEFAULT_RING_CAPACITY,
            cursor: 0,
            alignment: alignment.max(1),
        }
    }

    pub fn buffer(&self) -> &GPUBuffer {
        &self.buffer
    }

    fn align_up(&self, value: u64) -> u64 {
        let a = self.alignment;
        (value + a - 1) / a * a
    }

    /// Acquires a writable slice of at least `size` bytes, aligned to the
    /// backend's `uboOffsetAlignment`. Writes through `queue` immediately;
    /// the slice is valid until the next `reset`.
    pub fn acquire(
        &mut self,
        queue: &crate::gpu::command::CommandQueue,
        data: &[u8],
    ) -> CoreResult<UniformSlice> {
        let offset = self.align_up(self.cursor);
        let size = data.len() as u64;
        if offset + size > self.capacity {
            return Err(CoreError::AllocationTooLarge(size, self.capacity - offset));
        }
        if offset % self.alignment != 0 {
            return Err(CoreError::MisalignedUniformOffset {
                offset,
                alignment: self.alignment,
            });
        }
        queue.write_buffer(&self.buffer, offset, data);
        self.cursor = offset + size;
        Ok(UniformSlice { offset, size })
    }

    /// Reclaims the entire ring; called once at the end of every flush.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}
