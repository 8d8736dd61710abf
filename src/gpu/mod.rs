//! GPU abstraction layer: textures, buffers, render targets, command
//! encoders/queues, render passes, and pipelines with an identical
//! contract across backends. Only one concrete backend (wgpu, which
//! itself fans out to Vulkan/Metal/D3D12/GL) is wired up here; the
//! vocabulary is kept backend-neutral so a second backend can be added
//! beside [`WgpuGpu`] without touching callers.

pub mod buffer;
pub mod caps;
pub mod command;
pub mod pipeline;
pub mod render_target;
pub mod semaphore;
pub mod shaders;
pub mod texture;

use crate::error::{CoreError, CoreResult};
use crate::pixel::{BufferUsage, ImageOrigin, PixelFormat, TextureUsage};

use buffer::GPUBuffer;
use caps::ShaderCaps;
use command::{CommandEncoder, CommandQueue};
use pipeline::{RenderPipeline, RenderPipelineDescriptor};
use render_target::RenderTarget;
use texture::{GPUTexture, TextureView};

pub struct TextureDescriptor {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub mip_level_count: u32,
    pub sample_count: u32,
    pub usage: TextureUsage,
}

/// The backend factory: creates every GPU object kind and exposes the
/// primary command queue. `GPU` and everything it creates are
/// single-threaded cooperative (see the concurrency model); nothing here
/// implements `Send`/`Sync` on purpose.
pub struct WgpuGpu {
    device: wgpu::Device,
    queue: CommandQueue,
    caps: ShaderCaps,
}

impl WgpuGpu {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let caps = ShaderCaps::for_wgpu(&device.limits());
        Self {
            device,
            queue: CommandQueue::new(queue),
            caps,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn caps(&self) -> &ShaderCaps {
        &self.caps
    }

    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    pub fn create_buffer(&self, size: u64, usage: BufferUsage) -> CoreResult<GPUBuffer> {
        if size == 0 {
            return Err(CoreError::AllocationTooLarge(0, 0));
        }
        let raw = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tgfx-core buffer"),
            size,
            usage: buffer::to_wgpu_usage(usage),
            mapped_at_creation: false,
        });
        Ok(GPUBuffer { raw, size, usage })
    }

    pub fn create_texture(&self, desc: &TextureDescriptor) -> CoreResult<GPUTexture> {
        if desc.width == 0 || desc.height == 0 {
            return Err(CoreError::UnsupportedFormat(desc.format, desc.usage.bits()));
        }
        let raw = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("tgfx-core texture"),
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: desc.mip_level_count.max(1),
            sample_count: desc.sample_count.max(1),
            dimension: wgpu::TextureDimension::D2,
            format: texture::to_wgpu_format(desc.format),
            usage: texture::to_wgpu_usage(desc.usage),
            view_formats: &[],
        });
        Ok(GPUTexture {
            raw,
            width: desc.width,
            height: desc.height,
            format: desc.format,
            mip_level_count: desc.mip_level_count.max(1),
            sample_count: desc.sample_count.max(1),
            usage: desc.usage,
            adopted: false,
        })
    }

    /// Wraps a host-owned `wgpu::Texture` backend handle as a [`GPUTexture`]
    /// (section 4.1's `GPU::importExternalTexture`). When `adopted` is
    /// true, this crate takes over destruction: the backend texture is
    /// explicitly destroyed once the wrapping resource's last reference
    /// drops. When `false`, the host keeps ownership and is responsible
    /// for destroying the texture itself; this crate only ever reads it.
    pub fn import_external_texture(
        &self,
        raw: wgpu::Texture,
        width: u32,
        height: u32,
        format: PixelFormat,
        mip_level_count: u32,
        sample_count: u32,
        usage: TextureUsage,
        adopted: bool,
    ) -> GPUTexture {
        GPUTexture {
            raw,
            width,
            height,
            format,
            mip_level_count: mip_level_count.max(1),
            sample_count: sample_count.max(1),
            usage,
            adopted,
        }
    }

    pub fn create_texture_view(&self, texture: &GPUTexture, origin: ImageOrigin) -> TextureView {
        let raw = texture.raw().create_view(&wgpu::TextureViewDescriptor::default());
        TextureView { raw, origin }
    }

    pub fn create_render_target(
        &self,
        texture: &GPUTexture,
        origin: ImageOrigin,
    ) -> CoreResult<RenderTarget> {
        if !texture.usage().contains(TextureUsage::RENDER_ATTACHMENT) {
            return Err(CoreError::UnsupportedFormat(
                texture.format(),
                texture.usage().bits(),
            ));
        }
        let color_view = texture.raw().create_view(&wgpu::TextureViewDescriptor::default());
        Ok(RenderTarget {
            color_view,
            resolve_view: None,
            color_texture: Some(texture.raw().clone()),
            width: texture.width(),
            height: texture.height(),
            format: texture.format(),
            sample_count: texture.sample_count(),
            origin,
            externally_owned: false,
        })
    }

    /// Wraps a host-owned surface texture (e.g. a swapchain frame) as an
    /// externally-owned render target; the cache never purges these.
    pub fn wrap_external_render_target(
        &self,
        view: wgpu::TextureView,
        width: u32,
        height: u32,
        format: PixelFormat,
        origin: ImageOrigin,
    ) -> RenderTarget {
        RenderTarget {
            color_view: view,
            resolve_view: None,
            color_texture: None,
            width,
            height,
            format,
            sample_count: 1,
            origin,
            externally_owned: true,
        }
    }

    pub fn create_render_pipeline(&self, desc: &RenderPipelineDescriptor) -> RenderPipeline {
        pipeline::compile(&self.device, desc)
    }

    pub fn create_command_encoder(&self) -> CommandEncoder {
        let raw = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tgfx-core encoder"),
            });
        CommandEncoder::new(raw)
    }

    /// Synchronous copy-to-buffer-then-map readback of a raw backend
    /// texture (scenario 6's "round-trip pixmap upload"). Blocks the
    /// calling thread; not part of the deferred task graph since readback
    /// is inherently a synchronization point.
    pub fn read_texture_region(
        &self,
        texture: &wgpu::Texture,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> CoreResult<Vec<u8>> {
        let bytes_per_pixel = format.bytes_per_pixel();
        let unpadded_bytes_per_row = width * bytes_per_pixel;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_bytes_per_row = unpadded_bytes_per_row.div_ceil(align) * align;
        let buffer_size = padded_bytes_per_row as u64 * height as u64;

        let buffer = self.create_buffer(buffer_size, BufferUsage::READBACK)?;
        let mut encoder = self.create_command_encoder();
        encoder.copy_texture_region_to_buffer(texture, &buffer, padded_bytes_per_row, (width, height));
        self.queue.submit(encoder.finish());
        self.queue.wait_until_completed(&self.device);

        let slice = buffer.raw().slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|_| CoreError::MapFailed("map callback channel closed".to_string()))?
            .map_err(|e| CoreError::MapFailed(e.to_string()))?;

        let mapped = slice.get_mapped_range();
        let mut out = Vec::with_capacity((unpadded_bytes_per_row * height) as usize);
        for row in 0..height {
            let start = (row * padded_bytes_per_row) as usize;
            let end = start + unpadded_bytes_per_row as usize;
            out.extend_from_slice(&mapped[start..end]);
        }
        drop(mapped);
        buffer.raw().unmap();
        Ok(out)
    }
}
