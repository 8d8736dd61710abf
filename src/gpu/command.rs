//! Command encoding: render passes, copies, and queue submission.

use crate::error::{CoreError, CoreResult};
use crate::gpu::{
    buffer::GPUBuffer, pipeline::RenderPipeline, render_target::RenderTarget,
    semaphore::Semaphore, texture::GPUTexture,
};
use crate::px::PxRect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadAction {
    Load,
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    TriangleList,
    TriangleStrip,
}

impl PrimitiveTopology {
    fn to_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            Self::TriangleList => wgpu::PrimitiveTopology::TriangleList,
            Self::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    Uint16,
    Uint32,
}

impl IndexFormat {
    fn to_wgpu(self) -> wgpu::IndexFormat {
        match self {
            Self::Uint16 => wgpu::IndexFormat::Uint16,
            Self::Uint32 => wgpu::IndexFormat::Uint32,
        }
    }
}

pub struct RenderPassDescriptor<'a> {
    pub target: &'a RenderTarget,
    pub load: LoadAction,
    pub clear_value: crate::color::PremultipliedColor,
}

/// One active render pass on a [`CommandEncoder`]. At most one may be open
/// per encoder at a time (invariant I3); dropping without calling `end`
/// leaves the pass recorded as-is, matching wgpu's own drop semantics.
pub struct RenderPass<'enc> {
    inner: wgpu::RenderPass<'enc>,
    ended: bool,
    pass_active: &'enc mut bool,
}

impl<'enc> RenderPass<'enc> {
    pub fn set_pipeline(&mut self, pipeline: &RenderPipeline) {
        self.inner.set_pipeline(pipeline.raw());
    }

    pub fn set_bind_group(&mut self, group: &wgpu::BindGroup, dynamic_offsets: &[u32]) {
        self.inner.set_bind_group(0, group, dynamic_offsets);
    }

    pub fn set_vertex_buffer(&mut self, slot: u32, buffer: &GPUBuffer, offset: u64) {
        self.inner
            .set_vertex_buffer(slot, buffer.raw().slice(offset..));
    }

    pub fn set_index_buffer(&mut self, buffer: &GPUBuffer, format: IndexFormat) {
        self.inner
            .set_index_buffer(buffer.raw().slice(..), format.to_wgpu());
    }

    pub fn set_scissor_rect(&mut self, rect: PxRect) {
        self.inner.set_scissor_rect(
            rect.left().raw().max(0) as u32,
            rect.top().raw().max(0) as u32,
            rect.size.width.raw().max(0) as u32,
            rect.size.height.raw().max(0) as u32,
        );
    }

    pub fn draw(&mut self, primitive: PrimitiveTopology, vertex_count: u32, instance_count: u32) {
        let _ = primitive; // topology is fixed at pipeline-compile time in wgpu
        self.inner.draw(0..vertex_count, 0..instance_count);
    }

    pub fn draw_indexed(
        &mut self,
        primitive: PrimitiveTopology,
        index_count: u32,
        instance_count: u32,
    ) {
        let _ = primitive;
        self.inner.draw_indexed(0..index_count, 0, 0..instance_count);
    }

    pub fn end(mut self) {
        self.ended = true;
        *self.pass_active = false;
        // wgpu::RenderPass ends its pass on drop; consuming `self` here is
        // the contract's explicit `end()` step.
    }
}

impl Drop for RenderPass<'_> {
    fn drop(&mut self) {
        if !self.ended {
            *self.pass_active = false;
        }
    }
}

/// Records GPU commands for later submission. Only one [`RenderPass`] may
/// be open at a time; attempting a second `begin_render_pass` before `end`
/// returns [`CoreError::RenderPassAlreadyActive`].
pub struct CommandEncoder {
    inner: Option<wgpu::CommandEncoder>,
    pass_active: bool,
}

impl CommandEncoder {
    pub(crate) fn new(raw: wgpu::CommandEncoder) -> Self {
        Self {
            inner: Some(raw),
            pass_active: false,
        }
    }

    pub fn begin_render_pass<'a>(
        &'a mut self,
        desc: &RenderPassDescriptor<'_>,
    ) -> CoreResult<RenderPass<'a>> {
        if self.pass_active {
            return Err(CoreError::RenderPassAlreadyActive);
        }
        self.pass_active = true;
        let load = match desc.load {
            LoadAction::Load => wgpu::LoadOp::Load,
            LoadAction::Clear => wgpu::LoadOp::Clear(desc.clear_value.to_wgpu()),
        };
        let view = desc.target.color_view();
        let resolve_target = desc.target.resolve_view();
        // Disjoint field borrows: `inner` and `pass_active` are taken
        // separately so the returned `RenderPass` can hold a back-reference
        // into this encoder's flag without an `Rc<Cell<bool>>`.
        let Self { inner, pass_active } = self;
        let encoder = inner.as_mut().expect("encoder already finished");
        let inner = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("tgfx-core ops render pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        Ok(RenderPass {
            inner,
            ended: false,
            pass_active,
        })
    }

    pub fn copy_texture_to_texture(
        &mut self,
        src: &GPUTexture,
        src_origin: (u32, u32),
        dst: &GPUTexture,
        dst_origin: (u32, u32),
        size: (u32, u32),
    ) {
        let encoder = self.inner.as_mut().expect("encoder already finished");
        encoder.copy_texture_to_texture(
            wgpu::TexelCopyTextureInfo {
                texture: src.raw(),
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: src_origin.0,
                    y: src_origin.1,
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyTextureInfo {
                texture: dst.raw(),
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: dst_origin.0,
                    y: dst_origin.1,
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Like [`Self::copy_texture_to_texture`] but the source is a raw
    /// backend texture rather than a [`GPUTexture`] — used for
    /// `RenderTargetCopy`, whose source is a render target's color
    /// attachment rather than a cache-tracked texture resource.
    pub fn copy_texture_region_to_texture(
        &mut self,
        src: &wgpu::Texture,
        src_origin: (u32, u32),
        dst: &GPUTexture,
        dst_origin: (u32, u32),
        size: (u32, u32),
    ) {
        let encoder = self.inner.as_mut().expect("encoder already finished");
        encoder.copy_texture_to_texture(
            wgpu::TexelCopyTextureInfo {
                texture: src,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: src_origin.0,
                    y: src_origin.1,
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyTextureInfo {
                texture: dst.raw(),
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: dst_origin.0,
                    y: dst_origin.1,
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
        );
    }

    pub fn copy_texture_to_buffer(
        &mut self,
        src: &GPUTexture,
        dst: &GPUBuffer,
        bytes_per_row: u32,
        size: (u32, u32),
    ) {
        let encoder = self.inner.as_mut().expect("encoder already finished");
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: src.raw(),
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: dst.raw(),
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(size.1),
                },
            },
            wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Like [`Self::copy_texture_to_buffer`] but the source is a raw
    /// backend texture — used when reading back a render target's color
    /// attachment, which is not itself a cache-tracked [`GPUTexture`].
    pub fn copy_texture_region_to_buffer(
        &mut self,
        src: &wgpu::Texture,
        dst: &GPUBuffer,
        bytes_per_row: u32,
        size: (u32, u32),
    ) {
        let encoder = self.inner.as_mut().expect("encoder already finished");
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: src,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: dst.raw(),
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(size.1),
                },
            },
            wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
        );
    }

    pub fn finish(mut self) -> CommandBuffer {
        let encoder = self.inner.take().expect("encoder already finished");
        CommandBuffer {
            raw: encoder.finish(),
        }
    }
}

pub struct CommandBuffer {
    pub(crate) raw: wgpu::CommandBuffer,
}

/// The device's primary submission point.
pub struct CommandQueue {
    pub(crate) raw: wgpu::Queue,
    submission_counter: std::cell::Cell<u64>,
}

impl CommandQueue {
    pub(crate) fn new(raw: wgpu::Queue) -> Self {
        Self {
            raw,
            submission_counter: std::cell::Cell::new(0),
        }
    }

    pub fn write_buffer(&self, buffer: &GPUBuffer, offset: u64, data: &[u8]) {
        self.raw.write_buffer(buffer.raw(), offset, data);
    }

    pub fn write_texture(
        &self,
        texture: &GPUTexture,
        rect: PxRect,
        pixels: &[u8],
        row_bytes: u32,
    ) {
        self.raw.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: texture.raw(),
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: rect.left().raw().max(0) as u32,
                    y: rect.top().raw().max(0) as u32,
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(row_bytes),
                rows_per_image: Some(rect.size.height.raw().max(0) as u32),
            },
            wgpu::Extent3d {
                width: rect.size.width.raw().max(0) as u32,
                height: rect.size.height.raw().max(0) as u32,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Submits a command buffer and returns a [`Semaphore`] tied to this
    /// submission's index, usable to sequence a later `wait_semaphore`.
    pub fn submit(&self, buffer: CommandBuffer) -> Semaphore {
        self.raw.submit(std::iter::once(buffer.raw));
        Semaphore::new(self.next_submission_index())
    }

    pub fn insert_semaphore(&self) -> Semaphore {
        Semaphore::new(self.next_submission_index())
    }

    fn next_submission_index(&self) -> u64 {
        let next = self.submission_counter.get() + 1;
        self.submission_counter.set(next);
        next
    }

    /// wgpu's queue submissions are already ordered by submission index; a
    /// "wait" on a semaphore from this same device is therefore a no-op
    /// beyond bookkeeping. Cross-device semaphore import is out of scope.
    pub fn wait_semaphore(&self, _semaphore: Semaphore) {}

    pub fn wait_until_completed(&self, device: &wgpu::Device) {
        let _ = device.poll(wgpu::Maintain::Wait);
    }

    pub fn raw(&self) -> &wgpu::Queue {
        &self.raw
    }
}
