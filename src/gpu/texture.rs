//! GPU texture objects and sampling views.

use crate::pixel::{ImageOrigin, PixelFormat, TextureUsage};

#[derive(Debug)]
pub struct GPUTexture {
    pub(crate) raw: wgpu::Texture,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) format: PixelFormat,
    pub(crate) mip_level_count: u32,
    pub(crate) sample_count: u32,
    pub(crate) usage: TextureUsage,
    /// True for an imported external texture whose destruction this crate
    /// has taken over (`GPU::importExternalTexture`'s `adopted` flag).
    /// Core-allocated textures are never adopted; their backend handle is
    /// freed by wgpu's own `Drop` impl without an explicit `destroy()`.
    pub(crate) adopted: bool,
}

impl GPUTexture {
    pub fn is_adopted(&self) -> bool {
        self.adopted
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn usage(&self) -> TextureUsage {
        self.usage
    }

    pub fn raw(&self) -> &wgpu::Texture {
        &self.raw
    }

    pub fn byte_cost(&self) -> u64 {
        let bpp = self.format.bytes_per_pixel() as u64;
        let mut total = 0u64;
        let (mut w, mut h) = (self.width as u64, self.height as u64);
        for _ in 0..self.mip_level_count.max(1) {
            total += w.max(1) * h.max(1) * bpp;
            w = (w / 2).max(1);
            h = (h / 2).max(1);
        }
        total * self.sample_count.max(1) as u64
    }
}

impl Drop for GPUTexture {
    fn drop(&mut self) {
        if self.adopted {
            self.raw.destroy();
        }
    }
}

/// A sampling view over a texture. Multi-plane YUV textures are represented
/// as several [`GPUTexture`]s plus a `TextureView` that addresses them
/// together (see [`crate::gpu::texture::YuvTextureView`]).
#[derive(Debug)]
pub struct TextureView {
    pub(crate) raw: wgpu::TextureView,
    pub(crate) origin: ImageOrigin,
}

impl TextureView {
    pub fn origin(&self) -> ImageOrigin {
        self.origin
    }

    pub fn raw(&self) -> &wgpu::TextureView {
        &self.raw
    }
}

/// A multi-plane YUV sampling view: one [`TextureView`] per plane, sampled
/// together by a color-conversion fragment processor.
#[derive(Debug)]
pub struct YuvTextureView {
    pub planes: Vec<TextureView>,
    pub format: crate::pixel::YuvFormat,
    pub color_space: crate::pixel::ColorSpace,
}

pub(crate) fn to_wgpu_format(format: PixelFormat) -> wgpu::TextureFormat {
    match format {
        PixelFormat::Alpha8 => wgpu::TextureFormat::R8Unorm,
        PixelFormat::Gray8 => wgpu::TextureFormat::R8Unorm,
        PixelFormat::Rg88 => wgpu::TextureFormat::Rg8Unorm,
        PixelFormat::Rgba8888 => wgpu::TextureFormat::Rgba8Unorm,
        PixelFormat::Bgra8888 => wgpu::TextureFormat::Bgra8Unorm,
        PixelFormat::Depth24Stencil8 => wgpu::TextureFormat::Depth24PlusStencil8,
    }
}

pub(crate) fn to_wgpu_usage(usage: TextureUsage) -> wgpu::TextureUsages {
    let mut out = wgpu::TextureUsages::COPY_DST | wgpu::TextureUsages::COPY_SRC;
    if usage.contains(TextureUsage::TEXTURE_BINDING) {
        out |= wgpu::TextureUsages::TEXTURE_BINDING;
    }
    if usage.contains(TextureUsage::RENDER_ATTACHMENT) {
        out |= wgpu::TextureUsages::RENDER_ATTACHMENT;
    }
    out
}
