//! Paint state attached to a pending or finished draw.

use crate::color::Color;
use crate::global_cache::GradientKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendMode {
    SrcOver,
    Src,
    Clear,
    Multiply,
    Screen,
    Darken,
    Lighten,
}

impl BlendMode {
    /// Blends that need the destination's current color and that the
    /// backend cannot serve via framebuffer fetch require a dedicated
    /// destination-texture copy (section 4.5).
    pub fn requires_dst_read(self, framebuffer_fetch_supported: bool) -> bool {
        if framebuffer_fetch_supported {
            return false;
        }
        matches!(self, Self::Multiply | Self::Screen | Self::Darken | Self::Lighten)
    }

    pub fn tag(self) -> u32 {
        match self {
            Self::SrcOver => 0,
            Self::Src => 1,
            Self::Clear => 2,
            Self::Multiply => 3,
            Self::Screen => 4,
            Self::Darken => 5,
            Self::Lighten => 6,
        }
    }
}

/// A shader source for a fill. Kept to the one case the global cache
/// actually materializes — a gradient LUT — since general shader/path
/// evaluation belongs to the (out-of-scope) collaborator that hands this
/// core already-built fills.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderSpec {
    SolidColor(Color),
    Gradient(GradientKey),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub shader: ShaderSpec,
    pub blend_mode: BlendMode,
    pub antialias: bool,
    pub color_filter: Option<Color>,
    pub mask_filter_tag: Option<u32>,
}

impl Fill {
    pub fn solid_color(color: Color) -> Self {
        Self {
            shader: ShaderSpec::SolidColor(color),
            blend_mode: BlendMode::SrcOver,
            antialias: false,
            color_filter: None,
            mask_filter_tag: None,
        }
    }

    /// Value-equality used by the batcher (P5) and the clear-fast-path
    /// check (P4): two fills are equivalent only when antialias, blend
    /// mode, and shader/color-filter/mask-filter are identical, per the
    /// upstream `CompareFill` rule.
    pub fn compare(a: &Self, b: &Self) -> bool {
        a.antialias == b.antialias
            && a.blend_mode == b.blend_mode
            && a.shader == b.shader
            && a.color_filter == b.color_filter
            && a.mask_filter_tag == b.mask_filter_tag
    }

    pub fn is_opaque_solid(&self) -> bool {
        matches!(self.shader, ShaderSpec::SolidColor(c) if c.is_opaque())
            && self.color_filter.is_none()
            && self.mask_filter_tag.is_none()
    }

    pub fn solid_color_value(&self) -> Option<Color> {
        match self.shader {
            ShaderSpec::SolidColor(c) => Some(c),
            _ => None,
        }
    }

    pub fn geometry_processor_kind(&self) -> u32 {
        match self.shader {
            ShaderSpec::SolidColor(_) => 0,
            ShaderSpec::Gradient(_) => 1,
        }
    }

    pub fn fragment_kinds(&self) -> Vec<u32> {
        let mut kinds = Vec::new();
        if let ShaderSpec::Gradient(_) = self.shader {
            kinds.push(10);
        }
        if self.color_filter.is_some() {
            kinds.push(20);
        }
        if let Some(tag) = self.mask_filter_tag {
            kinds.push(30 + tag);
        }
        kinds
    }
}
