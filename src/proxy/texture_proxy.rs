//! Deferred handle to a texture, resolved by its creating
//! [`crate::task::resource_task::ResourceTask`] at flush time.

use std::cell::RefCell;
use std::rc::Rc;

use crate::gpu::texture::GPUTexture;
use crate::pixel::{PixelFormat, TextureUsage};
use crate::resource::{Resource, ResourceCache, ResourceKind, UniqueKey};

pub struct TextureProxy {
    pub unique_key: UniqueKey,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub mip_level_count: u32,
    pub sample_count: u32,
    pub usage: TextureUsage,
    resolved: RefCell<Option<Rc<Resource>>>,
}

impl TextureProxy {
    pub fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
        mip_level_count: u32,
        sample_count: u32,
        usage: TextureUsage,
    ) -> Rc<Self> {
        Rc::new(Self {
            unique_key: UniqueKey::next(),
            width,
            height,
            format,
            mip_level_count,
            sample_count,
            usage,
            resolved: RefCell::new(None),
        })
    }

    /// Wraps an already-imported external texture (section 4.1's
    /// `GPU::importExternalTexture`) as an immediately-resolved proxy. Not
    /// scratch-key interchangeable, mirroring
    /// [`crate::proxy::RenderTargetProxy::wrap_external`].
    pub fn wrap_external(texture: GPUTexture) -> Rc<Self> {
        let width = texture.width();
        let height = texture.height();
        let format = texture.format();
        let sample_count = texture.sample_count();
        let usage = texture.usage();
        let resource = Rc::new(Resource::new(ResourceKind::Texture(texture), None, None));
        Rc::new(Self {
            unique_key: UniqueKey::next(),
            width,
            height,
            format,
            mip_level_count: 1,
            sample_count,
            usage,
            resolved: RefCell::new(Some(resource)),
        })
    }

    /// Resolves against the cache: returns the resource if a prior task has
    /// already bound one, otherwise attempts a unique-key lookup (invariant
    /// I2). Returns `None` if neither finds anything — the caller skips
    /// the dependent draw per the error-handling policy.
    pub fn resolve(&self, cache: &ResourceCache) -> Option<Rc<Resource>> {
        if let Some(r) = self.resolved.borrow().as_ref() {
            return Some(r.clone());
        }
        let found = cache.find_by_unique_key(&self.unique_key)?;
        *self.resolved.borrow_mut() = Some(found.clone());
        Some(found)
    }

    pub fn set_resolved(&self, resource: Rc<Resource>) {
        *self.resolved.borrow_mut() = Some(resource);
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.borrow().is_some()
    }
}
