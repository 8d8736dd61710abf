//! Mints proxies; the sole place new unique keys for deferred resources
//! are handed out, matching the upstream `Context::proxyProvider()`
//! accessor's role.

use std::rc::Rc;

use crate::gpu::render_target::RenderTarget;
use crate::gpu::texture::GPUTexture;
use crate::pixel::{BufferUsage, ImageOrigin, PixelFormat, TextureUsage};

use super::buffer_proxy::BufferProxy;
use super::render_target_proxy::RenderTargetProxy;
use super::texture_proxy::TextureProxy;

#[derive(Default)]
pub struct ProxyProvider;

impl ProxyProvider {
    pub fn new() -> Self {
        Self
    }

    pub fn create_texture_proxy(
        &self,
        width: u32,
        height: u32,
        format: PixelFormat,
        mip_level_count: u32,
        sample_count: u32,
        usage: TextureUsage,
    ) -> Rc<TextureProxy> {
        TextureProxy::new(width, height, format, mip_level_count, sample_count, usage)
    }

    pub fn create_buffer_proxy(&self, size: u64, usage: BufferUsage) -> Rc<BufferProxy> {
        BufferProxy::new(size, usage)
    }

    pub fn create_render_target_proxy(
        &self,
        width: u32,
        height: u32,
        format: PixelFormat,
        sample_count: u32,
        origin: ImageOrigin,
    ) -> Rc<RenderTargetProxy> {
        RenderTargetProxy::deferred(width, height, format, sample_count, origin)
    }

    /// Mints an offscreen render target proxy eligible for scratch-key
    /// reuse (P1, scenario 4): two proxies created with
    /// [`RenderTargetProxy::scratch_key_for`]'s matching output for the
    /// same dimensions/format/sample count may resolve to the same
    /// underlying resource once the first is unreferenced.
    pub fn create_cacheable_render_target_proxy(
        &self,
        width: u32,
        height: u32,
        format: PixelFormat,
        sample_count: u32,
        origin: ImageOrigin,
    ) -> Rc<RenderTargetProxy> {
        let scratch_key = RenderTargetProxy::scratch_key_for(width, height, format, sample_count);
        RenderTargetProxy::deferred_with_scratch_key(
            width,
            height,
            format,
            sample_count,
            origin,
            Some(scratch_key),
        )
    }

    pub fn wrap_external_render_target(&self, target: RenderTarget) -> Rc<RenderTargetProxy> {
        RenderTargetProxy::wrap_external(target)
    }

    /// Wraps an imported external texture (`WgpuGpu::import_external_texture`)
    /// as an immediately-resolved proxy.
    pub fn wrap_external_texture(&self, texture: GPUTexture) -> Rc<TextureProxy> {
        TextureProxy::wrap_external(texture)
    }
}
