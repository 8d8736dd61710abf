//! A single batched draw record, the unit an [`crate::task::OpsRenderTask`]
//! executes against a render pass (section 4.6).

use std::rc::Rc;

use crate::compositor::clip::ClipRepresentation;
use crate::compositor::fill::Fill;
use crate::global_cache::index_buffers::{
    AA_QUAD_INDICES_PER_QUAD, NON_AA_QUAD_INDICES_PER_QUAD, RRECT_FILL_INDICES_PER_RRECT,
};
use crate::proxy::{BufferProxy, TextureProxy};
use crate::px::PxRect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawOpKind {
    Rect,
    RRect,
    Image,
    Atlas,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum SharedIndexBuffer {
    NonAaQuad,
    AaQuad,
    RRectFill,
}

impl SharedIndexBuffer {
    pub fn indices_per_primitive(self) -> u32 {
        match self {
            Self::NonAaQuad => NON_AA_QUAD_INDICES_PER_QUAD,
            Self::AaQuad => AA_QUAD_INDICES_PER_QUAD,
            Self::RRectFill => RRECT_FILL_INDICES_PER_RRECT,
        }
    }
}

#[derive(Clone)]
pub struct DrawOp {
    pub kind: DrawOpKind,
    pub vertex_buffer: Rc<BufferProxy>,
    pub index_buffer: SharedIndexBuffer,
    pub primitive_count: u32,
    pub fill: Fill,
    pub clip: ClipRepresentation,
    pub scissor: PxRect,
    pub texture: Option<Rc<TextureProxy>>,
    /// Present only when the fill's blend mode needed a destination
    /// snapshot; bound as the xfer processor's extra sampler.
    pub dst_copy: Option<Rc<TextureProxy>>,
}

impl DrawOp {
    pub fn index_count(&self) -> u32 {
        self.primitive_count * self.index_buffer.indices_per_primitive()
    }

    pub fn program_key_parts(&self) -> (u32, Vec<u32>, u32) {
        (
            self.fill.geometry_processor_kind(),
            self.fill.fragment_kinds(),
            self.fill.blend_mode.tag(),
        )
    }
}
