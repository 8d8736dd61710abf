//! Clip representation classification.
//!
//! The compositor never rasterizes paths itself — a clip mask texture
//! arrives pre-rasterized from the (out-of-scope) path/canvas layer. Its
//! job is solely to pick the cheapest equivalent representation and to
//! cache mask textures by the caller's unique key so repeated draws
//! against the same clip reuse one.

use std::rc::Rc;

use crate::proxy::TextureProxy;
use crate::px::PxRect;

/// What the caller asked for.
#[derive(Clone)]
pub enum ClipRequest {
    None,
    Rect { rect: PxRect, pixel_aligned: bool },
    Mask { texture: Rc<TextureProxy>, bounds: PxRect, antialias: bool },
}

/// What the compositor actually binds for a draw.
#[derive(Clone)]
pub enum ClipRepresentation {
    NoClip,
    Scissor(PxRect),
    AARect(PxRect),
    Mask { texture: Rc<TextureProxy>, scissor: PxRect },
}

impl ClipRepresentation {
    pub fn scissor_rect(&self, target_bounds: PxRect) -> PxRect {
        match self {
            Self::NoClip => target_bounds,
            Self::Scissor(r) | Self::AARect(r) => *r,
            Self::Mask { scissor, .. } => *scissor,
        }
    }

    pub fn requires_coverage_processor(&self) -> bool {
        matches!(self, Self::AARect(_) | Self::Mask { .. })
    }
}

pub fn classify(request: &ClipRequest, target_bounds: PxRect) -> ClipRepresentation {
    match request {
        ClipRequest::None => ClipRepresentation::NoClip,
        ClipRequest::Rect { rect, pixel_aligned } => {
            let clipped = rect.intersect(target_bounds);
            if rect.covers(target_bounds) {
                ClipRepresentation::NoClip
            } else if *pixel_aligned {
                ClipRepresentation::Scissor(clipped)
            } else {
                ClipRepresentation::AARect(clipped)
            }
        }
        ClipRequest::Mask { texture, bounds, .. } => ClipRepresentation::Mask {
            texture: texture.clone(),
            scissor: bounds.intersect(target_bounds),
        },
    }
}

/// Two clip requests are batch-compatible when they would classify to the
/// same representation and, for masks, the same underlying texture.
pub fn requests_equivalent(a: &ClipRequest, b: &ClipRequest) -> bool {
    match (a, b) {
        (ClipRequest::None, ClipRequest::None) => true,
        (
            ClipRequest::Rect { rect: r1, pixel_aligned: p1 },
            ClipRequest::Rect { rect: r2, pixel_aligned: p2 },
        ) => r1 == r2 && p1 == p2,
        (
            ClipRequest::Mask { texture: t1, antialias: a1, .. },
            ClipRequest::Mask { texture: t2, antialias: a2, .. },
        ) => Rc::ptr_eq(t1, t2) && a1 == a2,
        _ => false,
    }
}
