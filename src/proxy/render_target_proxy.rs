//! Deferred handle to a render target. Externally-owned targets (e.g. a
//! swapchain frame) resolve immediately at construction since they are
//! never subject to the resource cache's lifetime management.

use std::cell::RefCell;
use std::rc::Rc;

use crate::gpu::render_target::RenderTarget;
use crate::pixel::{ImageOrigin, PixelFormat};
use crate::resource::{Resource, ResourceCache, ResourceKind, ScratchKey, UniqueKey};

pub struct RenderTargetProxy {
    pub unique_key: UniqueKey,
    /// Present for offscreen targets that may be satisfied by an
    /// unreferenced cache entry of identical dimensions/format (P1,
    /// scenario 4). Absent for wrapped externally-owned targets, which are
    /// never scratch-key interchangeable.
    pub scratch_key: Option<ScratchKey>,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub sample_count: u32,
    pub origin: ImageOrigin,
    resolved: RefCell<Option<Rc<Resource>>>,
}

impl RenderTargetProxy {
    pub fn deferred(
        width: u32,
        height: u32,
        format: PixelFormat,
        sample_count: u32,
        origin: ImageOrigin,
    ) -> Rc<Self> {
        Self::deferred_with_scratch_key(width, height, format, sample_count, origin, None)
    }

    /// An offscreen target that, once unreferenced, is eligible for reuse
    /// by a later target requesting the same `scratch_key` (section 5,
    /// P1).
    pub fn deferred_with_scratch_key(
        width: u32,
        height: u32,
        format: PixelFormat,
        sample_count: u32,
        origin: ImageOrigin,
        scratch_key: Option<ScratchKey>,
    ) -> Rc<Self> {
        Rc::new(Self {
            unique_key: UniqueKey::next(),
            scratch_key,
            width,
            height,
            format,
            sample_count,
            origin,
            resolved: RefCell::new(None),
        })
    }

    /// Builds the scratch key an offscreen target of these parameters is
    /// interchangeable under — type tag, width, height, format, sample
    /// count.
    pub fn scratch_key_for(
        width: u32,
        height: u32,
        format: PixelFormat,
        sample_count: u32,
    ) -> ScratchKey {
        ScratchKey::builder(1)
            .add_u32(width)
            .add_u32(height)
            .add_u32(format as u32)
            .add_u32(sample_count)
            .build()
    }

    pub fn wrap_external(target: RenderTarget) -> Rc<Self> {
        let width = target.width();
        let height = target.height();
        let format = target.format();
        let sample_count = target.sample_count();
        let origin = target.origin();
        let resource = Rc::new(Resource::new(ResourceKind::RenderTarget(target), None, None));
        Rc::new(Self {
            unique_key: UniqueKey::next(),
            scratch_key: None,
            width,
            height,
            format,
            sample_count,
            origin,
            resolved: RefCell::new(Some(resource)),
        })
    }

    pub fn resolve(&self, cache: &ResourceCache) -> Option<Rc<Resource>> {
        if let Some(r) = self.resolved.borrow().as_ref() {
            return Some(r.clone());
        }
        let found = cache.find_by_unique_key(&self.unique_key)?;
        *self.resolved.borrow_mut() = Some(found.clone());
        Some(found)
    }

    /// Resolution path a creating [`crate::task::ResourceTask::RenderTargetCreate`]
    /// uses: an unreferenced cache entry under this proxy's scratch key is
    /// reused in place of allocating a new render target (P1).
    pub fn try_reuse_from_scratch(&self, cache: &mut ResourceCache) -> Option<Rc<Resource>> {
        let key = self.scratch_key.as_ref()?;
        let found = cache.find(key)?;
        self.set_resolved(found.clone());
        Some(found)
    }

    pub fn set_resolved(&self, resource: Rc<Resource>) {
        *self.resolved.borrow_mut() = Some(resource);
    }

    pub fn bounds(&self) -> crate::px::PxRect {
        crate::px::PxRect::from_ltwh(0, 0, self.width as i32, self.height as i32)
    }
}
