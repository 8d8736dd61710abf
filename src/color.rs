//! Straight-alpha and premultiplied color representations.

/// A straight-alpha (non-premultiplied) RGBA color, components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    pub fn is_opaque(self) -> bool {
        self.a >= 1.0
    }

    pub fn premultiply(self) -> PremultipliedColor {
        PremultipliedColor {
            r: self.r * self.a,
            g: self.g * self.a,
            b: self.b * self.a,
            a: self.a,
        }
    }

    /// Value-equality used by [`crate::compositor::fill::Fill::compare`]; a
    /// plain derived `PartialEq` would do the same thing but this keeps the
    /// comparison rule documented at its one call site.
    pub fn equals(self, other: Self) -> bool {
        self == other
    }
}

/// A premultiplied-alpha RGBA color, the representation the GPU pipeline
/// actually blends in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PremultipliedColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl PremultipliedColor {
    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}
