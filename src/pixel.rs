//! Pixel format, color space, and image-origin surface.
//!
//! Values here are bit-exact with the upstream tgfx C++ source
//! (`include/tgfx/gpu/PixelFormat.h` and friends) so that host code porting
//! constants across the FFI boundary does not need a translation table.

use bitflags::bitflags;

/// Supported single-plane and multi-plane pixel formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Alpha8,
    Gray8,
    Rg88,
    Rgba8888,
    Bgra8888,
    Depth24Stencil8,
}

impl PixelFormat {
    /// Bytes per pixel for single-plane formats. YUV formats are handled
    /// separately via [`YuvFormat`] since they are multi-plane.
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            Self::Alpha8 | Self::Gray8 => 1,
            Self::Rg88 => 2,
            Self::Rgba8888 | Self::Bgra8888 => 4,
            Self::Depth24Stencil8 => 4,
        }
    }

    pub fn is_color(self) -> bool {
        !matches!(self, Self::Depth24Stencil8)
    }
}

/// Multi-plane YUV pixel layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum YuvFormat {
    /// Three planes: full-resolution Y, then subsampled (1,1) U and V.
    I420,
    /// Two planes: full-resolution Y, then an interleaved subsampled (1,1) UV.
    Nv12,
}

impl YuvFormat {
    /// Number of planes this format is stored across.
    pub fn plane_count(self) -> usize {
        match self {
            Self::I420 => 3,
            Self::Nv12 => 2,
        }
    }

    /// Horizontal/vertical subsampling shift for plane `index` (0 is always
    /// the full-resolution luma plane, shift (0, 0)).
    pub fn subsampling_shift(self, index: usize) -> (u32, u32) {
        if index == 0 { (0, 0) } else { (1, 1) }
    }
}

/// Color space / transfer matrices applied during YUV-to-RGB conversion or
/// colorspace-aware blits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    Bt601Limited,
    Rec709,
    Rec2020,
    JpegFull,
}

/// Origin convention of a render target's backing storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageOrigin {
    /// Row 0 is the top row; matches most windowing-system swapchains.
    TopLeft,
    /// Row 0 is the bottom row; common for OpenGL default framebuffers.
    BottomLeft,
}

impl ImageOrigin {
    /// Whether geometry processors must flip the v coordinate for this
    /// origin. Per invariant I5, the flip always happens here, never as a
    /// post-hoc copy.
    pub fn needs_y_flip(self) -> bool {
        matches!(self, Self::BottomLeft)
    }
}

bitflags! {
    /// Buffer usage bitmask. Values are bit-exact with the upstream source.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        const INDEX    = 0x10;
        const VERTEX   = 0x20;
        const UNIFORM  = 0x40;
        const READBACK = 0x800;
    }

    /// Texture usage bitmask. Values are bit-exact with the upstream source.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        const TEXTURE_BINDING  = 0x04;
        const RENDER_ATTACHMENT = 0x10;
    }

    /// Per-draw render flags accepted by the ops compositor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RenderFlags: u32 {
        /// Bypass proxy/resource-cache reuse for this draw.
        const DISABLE_CACHE = 1 << 0;
        /// Force synchronous data-source evaluation on the calling thread.
        const DISABLE_ASYNC_TASK = 1 << 1;
    }
}
