//! Deferred resource creation/upload tasks. Each variant runs before any
//! render task that depends on its proxy (invariant I2); failures are
//! logged and leave the proxy unresolved so dependent draws are skipped
//! without aborting the flush (section 7).

use std::rc::Rc;

use crate::gpu::WgpuGpu;
use crate::pixel::TextureUsage;
use crate::proxy::{BufferProxy, RenderTargetProxy, TextureProxy};
use crate::px::PxRect;
use crate::resource::{Resource, ResourceCache, ResourceKind};

pub enum ResourceTask {
    TextureUpload {
        proxy: Rc<TextureProxy>,
        pixels: Vec<u8>,
        row_bytes: u32,
    },
    /// Creates (or reuses, via the proxy's scratch key) the backing
    /// texture + attachment view for an offscreen render target.
    RenderTargetCreate {
        proxy: Rc<RenderTargetProxy>,
    },
    GpuBufferUpload {
        proxy: Rc<BufferProxy>,
        data: Vec<u8>,
    },
    MeshVertexUpload {
        proxy: Rc<BufferProxy>,
        data: Vec<u8>,
    },
    MeshIndexUpload {
        proxy: Rc<BufferProxy>,
        data: Vec<u8>,
    },
    ReadbackBufferCreate {
        proxy: Rc<BufferProxy>,
    },
}

impl ResourceTask {
    /// Returns whether the task succeeded in binding its proxy to a live
    /// resource. The caller does not abort the flush on `false`.
    pub fn execute(&self, gpu: &WgpuGpu, cache: &mut ResourceCache) -> bool {
        match self {
            Self::TextureUpload {
                proxy,
                pixels,
                row_bytes,
            } => {
                let Ok(texture) = gpu.create_texture(&crate::gpu::TextureDescriptor {
                    width: proxy.width,
                    height: proxy.height,
                    format: proxy.format,
                    mip_level_count: proxy.mip_level_count,
                    sample_count: proxy.sample_count,
                    usage: proxy.usage,
                }) else {
                    tracing::warn!("texture upload task: allocation failed");
                    return false;
                };
                gpu.queue().write_texture(
                    &texture,
                    PxRect::from_ltwh(0, 0, proxy.width as i32, proxy.height as i32),
                    pixels,
                    *row_bytes,
                );
                let resource = cache.add_to_cache(Resource::new(
                    ResourceKind::Texture(texture),
                    None,
                    Some(proxy.unique_key.clone()),
                ));
                proxy.set_resolved(resource);
                true
            }
            Self::RenderTargetCreate { proxy } => {
                if proxy.try_reuse_from_scratch(cache).is_some() {
                    tracing::trace!("render target create task: reused scratch entry");
                    return true;
                }
                let Ok(texture) = gpu.create_texture(&crate::gpu::TextureDescriptor {
                    width: proxy.width,
                    height: proxy.height,
                    format: proxy.format,
                    mip_level_count: 1,
                    sample_count: proxy.sample_count,
                    usage: TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
                }) else {
                    tracing::warn!("render target create task: texture allocation failed");
                    return false;
                };
                let Ok(render_target) = gpu.create_render_target(&texture, proxy.origin) else {
                    tracing::warn!("render target create task: attachment creation failed");
                    return false;
                };
                let resource = cache.add_to_cache(Resource::new(
                    ResourceKind::RenderTarget(render_target),
                    proxy.scratch_key.clone(),
                    Some(proxy.unique_key.clone()),
                ));
                proxy.set_resolved(resource);
                true
            }
            Self::GpuBufferUpload { proxy, data } | Self::MeshVertexUpload { proxy, data }
            | Self::MeshIndexUpload { proxy, data } => {
                let Ok(buffer) = gpu.create_buffer(proxy.size.max(data.len() as u64), proxy.usage)
                else {
                    tracing::warn!("buffer upload task: allocation failed");
                    return false;
                };
                gpu.queue().write_buffer(&buffer, 0, data);
                let resource = cache.add_to_cache(Resource::new(
                    ResourceKind::Buffer(buffer),
                    None,
                    Some(proxy.unique_key.clone()),
                ));
                proxy.set_resolved(resource);
                true
            }
            Self::ReadbackBufferCreate { proxy } => {
                let Ok(buffer) = gpu.create_buffer(proxy.size, proxy.usage) else {
                    tracing::warn!("readback buffer creation failed");
                    return false;
                };
                let resource = cache.add_to_cache(Resource::new(
                    ResourceKind::Buffer(buffer),
                    None,
                    Some(proxy.unique_key.clone()),
                ));
                proxy.set_resolved(resource);
                true
            }
        }
    }
}
