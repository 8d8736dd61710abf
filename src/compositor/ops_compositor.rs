//! Per-render-target batching state machine (section 4.5).
//!
//! Consecutive draws of the same pending-op kind, with equivalent clip and
//! fill, are merged into one [`DrawOp`]. A shape draw is a terminal state:
//! it always flushes whatever is pending before it is recorded, and the
//! next draw of any kind starts a fresh batch after it.

use std::rc::Rc;

use crate::compositor::clip::{self, ClipRepresentation, ClipRequest};
use crate::compositor::draw_op::{DrawOp, DrawOpKind, SharedIndexBuffer};
use crate::compositor::fill::Fill;
use crate::pixel::RenderFlags;
use crate::proxy::{BufferProxy, RenderTargetProxy, TextureProxy};
use crate::px::PxRect;
use crate::resource::UniqueKey;

const MAX_PENDING_RECTS: usize = 2048;
const MAX_PENDING_RRECTS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingOpKind {
    Unknown,
    Rect,
    RRect,
    Image,
    Atlas,
}

struct PendingRect {
    bounds: PxRect,
    corner_radius: f32,
}

struct PendingImage {
    texture: Rc<TextureProxy>,
    src: PxRect,
    dst: PxRect,
}

enum PendingBatch {
    Rects(Vec<PendingRect>),
    Image(Vec<PendingImage>),
}

pub struct OpsCompositor {
    pub target: Rc<RenderTargetProxy>,
    render_flags: RenderFlags,
    clear_color: Option<crate::color::Color>,
    pending_kind: PendingOpKind,
    pending_clip: ClipRequest,
    pending_fill: Option<Fill>,
    pending_batch: PendingBatch,
    pending_texture: Option<Rc<TextureProxy>>,
    draw_ops: Vec<DrawOp>,
    resource_tasks: Vec<crate::task::ResourceTask>,
    closed: bool,
}

impl OpsCompositor {
    pub fn new(
        target: Rc<RenderTargetProxy>,
        render_flags: RenderFlags,
        clear_color: Option<crate::color::Color>,
    ) -> Self {
        Self {
            target,
            render_flags,
            clear_color,
            pending_kind: PendingOpKind::Unknown,
            pending_clip: ClipRequest::None,
            pending_fill: None,
            pending_batch: PendingBatch::Rects(Vec::new()),
            pending_texture: None,
            draw_ops: Vec::new(),
            resource_tasks: Vec::new(),
            closed: false,
        }
    }

    pub fn clear_color(&self) -> Option<crate::color::Color> {
        self.clear_color
    }

    pub fn draw_ops(&self) -> &[DrawOp] {
        &self.draw_ops
    }

    /// Drains the vertex-upload tasks this compositor generated while
    /// batching. The caller enqueues these ahead of the
    /// [`crate::task::OpsRenderTask`] so every draw op's vertex buffer is
    /// resolved by the time the render pass runs (invariant I2).
    pub fn take_resource_tasks(&mut self) -> Vec<crate::task::ResourceTask> {
        std::mem::take(&mut self.resource_tasks)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn discard_all(&mut self) {
        self.reset_pending();
        self.draw_ops.clear();
        self.clear_color = None;
    }

    /// Idempotent per P8: a second call after the compositor is already
    /// closed does nothing.
    pub fn make_closed(&mut self) {
        if self.closed {
            return;
        }
        self.flush_pending_ops();
        self.closed = true;
    }

    fn target_bounds(&self) -> PxRect {
        self.target.bounds()
    }

    fn can_append(&self, kind: PendingOpKind, clip: &ClipRequest, fill: &Fill) -> bool {
        self.pending_kind == kind
            && self
                .pending_fill
                .as_ref()
                .is_some_and(|f| Fill::compare(f, fill))
            && clip::requests_equivalent(&self.pending_clip, clip)
    }

    fn reset_pending(&mut self) {
        self.pending_kind = PendingOpKind::Unknown;
        self.pending_fill = None;
        self.pending_clip = ClipRequest::None;
        self.pending_texture = None;
        self.pending_batch = PendingBatch::Rects(Vec::new());
    }

    /// Drawing an opaque rectangle that exactly covers the target with no
    /// clip, while nothing else is pending, turns the op list into a
    /// single `LoadAction::Clear` (P4, scenario 2).
    fn try_draw_as_clear(&mut self, rect: PxRect, clip: &ClipRequest, fill: &Fill) -> bool {
        if !self.draw_ops.is_empty() || self.pending_kind != PendingOpKind::Unknown {
            return false;
        }
        if !matches!(clip, ClipRequest::None) {
            return false;
        }
        if !fill.is_opaque_solid() {
            return false;
        }
        if !rect.covers(self.target_bounds()) {
            return false;
        }
        self.clear_color = fill.solid_color_value();
        true
    }

    pub fn fill_rect(&mut self, rect: PxRect, clip: ClipRequest, fill: Fill) {
        if self.try_draw_as_clear(rect, &clip, &fill) {
            tracing::trace!("compositor: clear fast path taken");
            return;
        }
        if !self.can_append(PendingOpKind::Rect, &clip, &fill) {
            self.flush_pending_ops();
            self.pending_kind = PendingOpKind::Rect;
            self.pending_clip = clip;
            self.pending_fill = Some(fill);
            self.pending_batch = PendingBatch::Rects(Vec::new());
        }
        if let PendingBatch::Rects(rects) = &mut self.pending_batch {
            rects.push(PendingRect {
                bounds: rect,
                corner_radius: 0.0,
            });
            if rects.len() >= MAX_PENDING_RECTS {
                self.flush_pending_ops();
            }
        }
    }

    pub fn draw_rrect(&mut self, bounds: PxRect, corner_radius: f32, clip: ClipRequest, fill: Fill) {
        if !self.can_append(PendingOpKind::RRect, &clip, &fill) {
            self.flush_pending_ops();
            self.pending_kind = PendingOpKind::RRect;
            self.pending_clip = clip;
            self.pending_fill = Some(fill);
            self.pending_batch = PendingBatch::Rects(Vec::new());
        }
        if let PendingBatch::Rects(rects) = &mut self.pending_batch {
            rects.push(PendingRect {
                bounds,
                corner_radius,
            });
            if rects.len() >= MAX_PENDING_RRECTS {
                self.flush_pending_ops();
            }
        }
    }

    pub fn fill_image(
        &mut self,
        texture: Rc<TextureProxy>,
        src: PxRect,
        dst: PxRect,
        clip: ClipRequest,
        fill: Fill,
    ) {
        let same_texture = self
            .pending_texture
            .as_ref()
            .is_some_and(|t| Rc::ptr_eq(t, &texture));
        if !self.can_append(PendingOpKind::Image, &clip, &fill) || !same_texture {
            self.flush_pending_ops();
            self.pending_kind = PendingOpKind::Image;
            self.pending_clip = clip;
            self.pending_fill = Some(fill);
            self.pending_texture = Some(texture.clone());
            self.pending_batch = PendingBatch::Image(Vec::new());
        }
        if let PendingBatch::Image(images) = &mut self.pending_batch {
            images.push(PendingImage { texture, src, dst });
        }
    }

    pub fn fill_text_atlas(
        &mut self,
        texture: Rc<TextureProxy>,
        src: PxRect,
        dst: PxRect,
        clip: ClipRequest,
        fill: Fill,
    ) {
        let same_texture = self
            .pending_texture
            .as_ref()
            .is_some_and(|t| Rc::ptr_eq(t, &texture));
        if !self.can_append(PendingOpKind::Atlas, &clip, &fill) || !same_texture {
            self.flush_pending_ops();
            self.pending_kind = PendingOpKind::Atlas;
            self.pending_clip = clip;
            self.pending_fill = Some(fill);
            self.pending_texture = Some(texture.clone());
            self.pending_batch = PendingBatch::Image(Vec::new());
        }
        if let PendingBatch::Image(images) = &mut self.pending_batch {
            images.push(PendingImage { texture, src, dst });
        }
    }

    /// Draws a pre-tessellated shape directly from a caller-supplied vertex
    /// buffer. Always flushes whatever was pending first (design notes'
    /// terminal-state rule) and never participates in batching itself.
    pub fn draw_shape(
        &mut self,
        vertex_buffer: Rc<BufferProxy>,
        index_buffer: SharedIndexBuffer,
        primitive_count: u32,
        clip: ClipRequest,
        fill: Fill,
    ) {
        self.flush_pending_ops();
        let clip_rep = clip::classify(&clip, self.target_bounds());
        let scissor = clip_rep.scissor_rect(self.target_bounds());
        self.draw_ops.push(DrawOp {
            kind: DrawOpKind::Image,
            vertex_buffer,
            index_buffer,
            primitive_count,
            fill,
            clip: clip_rep,
            scissor,
            texture: None,
            dst_copy: None,
        });
    }

    fn flush_pending_ops(&mut self) {
        if self.pending_kind == PendingOpKind::Unknown {
            return;
        }
        let clip_rep = clip::classify(&self.pending_clip, self.target_bounds());
        let scissor = clip_rep.scissor_rect(self.target_bounds());
        let fill = self.pending_fill.take().expect("pending fill present");
        match (self.pending_kind, std::mem::replace(&mut self.pending_batch, PendingBatch::Rects(Vec::new()))) {
            (PendingOpKind::Rect, PendingBatch::Rects(rects)) if !rects.is_empty() => {
                let vertex_buffer = self.upload_rect_vertices(&rects, &fill, false);
                self.draw_ops.push(DrawOp {
                    kind: DrawOpKind::Rect,
                    vertex_buffer,
                    index_buffer: if fill.antialias {
                        SharedIndexBuffer::AaQuad
                    } else {
                        SharedIndexBuffer::NonAaQuad
                    },
                    primitive_count: rects.len() as u32,
                    fill,
                    clip: clip_rep,
                    scissor,
                    texture: None,
                    dst_copy: None,
                });
            }
            (PendingOpKind::RRect, PendingBatch::Rects(rects)) if !rects.is_empty() => {
                let vertex_buffer = self.upload_rect_vertices(&rects, &fill, true);
                self.draw_ops.push(DrawOp {
                    kind: DrawOpKind::RRect,
                    vertex_buffer,
                    index_buffer: SharedIndexBuffer::RRectFill,
                    primitive_count: rects.len() as u32,
                    fill,
                    clip: clip_rep,
                    scissor,
                    texture: None,
                    dst_copy: None,
                });
            }
            (PendingOpKind::Image, PendingBatch::Image(images)) if !images.is_empty() => {
                let texture = self.pending_texture.take();
                let vertex_buffer = self.upload_image_vertices(&images, &fill);
                self.draw_ops.push(DrawOp {
                    kind: DrawOpKind::Image,
                    vertex_buffer,
                    index_buffer: SharedIndexBuffer::NonAaQuad,
                    primitive_count: images.len() as u32,
                    fill,
                    clip: clip_rep,
                    scissor,
                    texture,
                    dst_copy: None,
                });
            }
            (PendingOpKind::Atlas, PendingBatch::Image(images)) if !images.is_empty() => {
                let texture = self.pending_texture.take();
                let vertex_buffer = self.upload_image_vertices(&images, &fill);
                self.draw_ops.push(DrawOp {
                    kind: DrawOpKind::Atlas,
                    vertex_buffer,
                    index_buffer: SharedIndexBuffer::NonAaQuad,
                    primitive_count: images.len() as u32,
                    fill,
                    clip: clip_rep,
                    scissor,
                    texture,
                    dst_copy: None,
                });
            }
            _ => {}
        }
        self.reset_pending();
    }

    /// `(x, y, r, g, b, a[, corner_radius])` per vertex, in top-left/
    /// top-right/bottom-right/bottom-left winding order so the shared quad
    /// index buffers (section 4.3) apply unmodified. Plain and rounded
    /// rects emit 4 vertices; antialiased plain rects route through
    /// `SharedIndexBuffer::AaQuad` (see `flush_pending_ops`) and so emit an
    /// extra 4-vertex outer ring, faded to zero alpha, matching
    /// `aa_quad_indices`'s 8-vertices-per-quad expectation.
    fn upload_rect_vertices(&mut self, rects: &[PendingRect], fill: &Fill, with_radius: bool) -> Rc<BufferProxy> {
        const AA_RING_WIDTH: f32 = 1.0;
        let floats_per_vertex = if with_radius { 7 } else { 6 };
        let emit_aa_ring = !with_radius && fill.antialias;
        let vertices_per_rect = if emit_aa_ring { 8 } else { 4 };
        let size = (rects.len() * vertices_per_rect * floats_per_vertex * 4) as u64;
        let proxy = BufferProxy::new(size, crate::pixel::BufferUsage::VERTEX);
        let color = fill.solid_color_value().unwrap_or(crate::color::Color::WHITE).premultiply();

        let mut data = Vec::with_capacity(size as usize);
        for rect in rects {
            let corners = [
                (rect.bounds.left(), rect.bounds.top()),
                (rect.bounds.right(), rect.bounds.top()),
                (rect.bounds.right(), rect.bounds.bottom()),
                (rect.bounds.left(), rect.bounds.bottom()),
            ];
            for (x, y) in corners {
                data.extend_from_slice(bytemuck::bytes_of(&(x.raw() as f32)));
                data.extend_from_slice(bytemuck::bytes_of(&(y.raw() as f32)));
                data.extend_from_slice(bytemuck::bytes_of(&color.r));
                data.extend_from_slice(bytemuck::bytes_of(&color.g));
                data.extend_from_slice(bytemuck::bytes_of(&color.b));
                data.extend_from_slice(bytemuck::bytes_of(&color.a));
                if with_radius {
                    data.extend_from_slice(bytemuck::bytes_of(&rect.corner_radius));
                }
            }
            if emit_aa_ring {
                let l = rect.bounds.left().raw() as f32 - AA_RING_WIDTH;
                let t = rect.bounds.top().raw() as f32 - AA_RING_WIDTH;
                let r = rect.bounds.right().raw() as f32 + AA_RING_WIDTH;
                let b = rect.bounds.bottom().raw() as f32 + AA_RING_WIDTH;
                let outer = [(l, t), (r, t), (r, b), (l, b)];
                for (x, y) in outer {
                    data.extend_from_slice(bytemuck::bytes_of(&x));
                    data.extend_from_slice(bytemuck::bytes_of(&y));
                    data.extend_from_slice(bytemuck::bytes_of(&color.r));
                    data.extend_from_slice(bytemuck::bytes_of(&color.g));
                    data.extend_from_slice(bytemuck::bytes_of(&color.b));
                    data.extend_from_slice(bytemuck::bytes_of(&0.0f32));
                }
            }
        }
        self.resource_tasks.push(crate::task::ResourceTask::MeshVertexUpload {
            proxy: proxy.clone(),
            data,
        });
        proxy
    }

    /// `(x, y, u, v, r, g, b, a)` per vertex, 4 vertices per image quad.
    fn upload_image_vertices(&mut self, images: &[PendingImage], fill: &Fill) -> Rc<BufferProxy> {
        let size = (images.len() * 4 * 8 * 4) as u64;
        let proxy = BufferProxy::new(size, crate::pixel::BufferUsage::VERTEX);
        let color = fill.solid_color_value().unwrap_or(crate::color::Color::WHITE).premultiply();

        let mut data = Vec::with_capacity(size as usize);
        for image in images {
            let positions = [
                (image.dst.left(), image.dst.top()),
                (image.dst.right(), image.dst.top()),
                (image.dst.right(), image.dst.bottom()),
                (image.dst.left(), image.dst.bottom()),
            ];
            let uvs = [
                (image.src.left(), image.src.top()),
                (image.src.right(), image.src.top()),
                (image.src.right(), image.src.bottom()),
                (image.src.left(), image.src.bottom()),
            ];
            for ((x, y), (u, v)) in positions.into_iter().zip(uvs) {
                data.extend_from_slice(bytemuck::bytes_of(&(x.raw() as f32)));
                data.extend_from_slice(bytemuck::bytes_of(&(y.raw() as f32)));
                data.extend_from_slice(bytemuck::bytes_of(&(u.raw() as f32)));
                data.extend_from_slice(bytemuck::bytes_of(&(v.raw() as f32)));
                data.extend_from_slice(bytemuck::bytes_of(&color.r));
                data.extend_from_slice(bytemuck::bytes_of(&color.g));
                data.extend_from_slice(bytemuck::bytes_of(&color.b));
                data.extend_from_slice(bytemuck::bytes_of(&color.a));
            }
        }
        self.resource_tasks.push(crate::task::ResourceTask::MeshVertexUpload {
            proxy: proxy.clone(),
            data,
        });
        proxy
    }

    pub fn clip_texture_unique_key(texture: &Rc<TextureProxy>) -> UniqueKey {
        texture.unique_key.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::pixel::ImageOrigin;

    fn target() -> Rc<RenderTargetProxy> {
        RenderTargetProxy::deferred(
            100,
            100,
            crate::pixel::PixelFormat::Rgba8888,
            1,
            ImageOrigin::TopLeft,
        )
    }

    #[test]
    fn clear_fast_path_empties_queue() {
        let mut compositor = OpsCompositor::new(target(), RenderFlags::empty(), None);
        compositor.fill_rect(
            PxRect::from_ltwh(0, 0, 100, 100),
            ClipRequest::None,
            Fill::solid_color(Color::from_rgba8(0, 0, 255, 255)),
        );
        compositor.make_closed();
        assert!(compositor.draw_ops().is_empty());
        assert_eq!(
            compositor.clear_color(),
            Some(Color::from_rgba8(0, 0, 255, 255))
        );
    }

    #[test]
    fn batches_consecutive_compatible_rects() {
        let mut compositor = OpsCompositor::new(target(), RenderFlags::empty(), None);
        let fill = Fill::solid_color(Color::from_rgba8(0, 255, 0, 255));
        for i in 0..8 {
            compositor.fill_rect(
                PxRect::from_ltwh(i * 10, 0, 10, 10),
                ClipRequest::None,
                fill.clone(),
            );
        }
        compositor.make_closed();
        assert_eq!(compositor.draw_ops().len(), 1);
        assert_eq!(compositor.draw_ops()[0].index_count(), 8 * 6);
    }

    #[test]
    fn antialiased_rects_route_through_aa_quad_with_8_vertices() {
        let mut compositor = OpsCompositor::new(target(), RenderFlags::empty(), None);
        let mut fill = Fill::solid_color(Color::from_rgba8(255, 0, 0, 255));
        fill.antialias = true;
        compositor.fill_rect(PxRect::from_ltwh(0, 0, 10, 10), ClipRequest::None, fill.clone());
        compositor.fill_rect(PxRect::from_ltwh(20, 0, 10, 10), ClipRequest::None, fill);
        compositor.make_closed();
        assert_eq!(compositor.draw_ops().len(), 1);
        let op = &compositor.draw_ops()[0];
        assert_eq!(op.index_buffer, SharedIndexBuffer::AaQuad);
        // 6 floats/vertex * 8 vertices/rect * 4 bytes/float * 2 rects
        assert_eq!(op.vertex_buffer.size, 6 * 8 * 4 * 2);
    }

    #[test]
    fn make_closed_is_idempotent() {
        let mut compositor = OpsCompositor::new(target(), RenderFlags::empty(), None);
        compositor.fill_rect(
            PxRect::from_ltwh(0, 0, 10, 10),
            ClipRequest::None,
            Fill::solid_color(Color::BLACK),
        );
        compositor.make_closed();
        let count_after_first = compositor.draw_ops().len();
        compositor.make_closed();
        assert_eq!(compositor.draw_ops().len(), count_after_first);
    }
}
