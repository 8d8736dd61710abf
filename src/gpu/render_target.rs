//! Render target: the color (and optional depth/stencil) attachment set a
//! render pass draws into.

use crate::pixel::{ImageOrigin, PixelFormat};

#[derive(Debug)]
pub struct RenderTarget {
    pub(crate) color_view: wgpu::TextureView,
    pub(crate) resolve_view: Option<wgpu::TextureView>,
    /// The attachment's backing texture, when this crate owns it — absent
    /// for targets wrapping a host-owned surface. Lets a
    /// [`crate::task::drawing_manager::RenderTask::RenderTargetCopy`] issue
    /// a real `copy_texture_to_texture` without a full readback.
    pub(crate) color_texture: Option<wgpu::Texture>,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) format: PixelFormat,
    pub(crate) sample_count: u32,
    pub(crate) origin: ImageOrigin,
    /// True when this target wraps a host-owned surface texture (e.g. a
    /// swapchain image); the cache never evicts or destroys the underlying
    /// texture for these, only the wrapper.
    pub(crate) externally_owned: bool,
}

impl RenderTarget {
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

    pub fn origin(&self) -> ImageOrigin {
        self.origin
    }

    pub fn is_multisampled(&self) -> bool {
        self.sample_count > 1
    }

    pub fn externally_owned(&self) -> bool {
        self.externally_owned
    }

    pub fn color_view(&self) -> &wgpu::TextureView {
        &self.color_view
    }

    pub fn color_texture(&self) -> Option<&wgpu::Texture> {
        self.color_texture.as_ref()
    }

    pub fn resolve_view(&self) -> Option<&wgpu::TextureView> {
        self.resolve_view.as_ref()
    }

    pub fn bounds(&self) -> crate::px::PxRect {
        crate::px::PxRect::from_ltwh(0, 0, self.width as i32, self.height as i32)
    }

    pub fn byte_cost(&self) -> u64 {
        let bpp = self.format.bytes_per_pixel() as u64;
        (self.width as u64) * (self.height as u64) * bpp * self.sample_count.max(1) as u64
    }
}
