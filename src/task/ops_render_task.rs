//! Executes one render target's batched draw ops against a render pass
//! (section 4.6).

use std::rc::Rc;

use crate::color::{Color, PremultipliedColor};
use crate::compositor::{ClipRepresentation, DrawOp};
use crate::global_cache::{GlobalCache, ProgramKey};
use crate::gpu::command::{CommandEncoder, IndexFormat, LoadAction, PrimitiveTopology, RenderPassDescriptor};
use crate::gpu::pipeline::{
    RenderPipelineDescriptor, UniformBlockSlot, VertexAttribute, VertexBufferLayout, VertexFormat,
    VertexStepMode,
};
use crate::gpu::shaders::{RECT_FRAGMENT_SHADER, RECT_VERTEX_SHADER};
use crate::gpu::WgpuGpu;
use crate::proxy::RenderTargetProxy;
use crate::resource::ResourceCache;

pub struct OpsRenderTask {
    pub target: Rc<RenderTargetProxy>,
    pub clear_color: Option<Color>,
    pub ops: Vec<DrawOp>,
}

impl OpsRenderTask {
    /// Runs every op in source order (invariant I6) against one render
    /// pass. Returns whether the pass actually recorded any GPU work; an
    /// unresolved target causes the whole task to be skipped, logged, with
    /// no partial commit (section 7).
    pub fn execute(
        &self,
        encoder: &mut CommandEncoder,
        gpu: &WgpuGpu,
        global_cache: &mut GlobalCache,
        resource_cache: &mut ResourceCache,
    ) -> bool {
        let Some(target_resource) = self.target.resolve(resource_cache) else {
            tracing::warn!("ops render task: render target proxy unresolved, skipping");
            return false;
        };
        let Some(render_target) = target_resource.kind.as_render_target() else {
            tracing::warn!("ops render task: proxy did not resolve to a render target");
            return false;
        };

        let (load, clear_value) = match self.clear_color {
            Some(c) => (LoadAction::Clear, c.premultiply()),
            None => (
                LoadAction::Load,
                PremultipliedColor {
                    r: 0.0,
                    g: 0.0,
                    b: 0.0,
                    a: 0.0,
                },
            ),
        };

        let mut pass = match encoder.begin_render_pass(&RenderPassDescriptor {
            target: render_target,
            load,
            clear_value,
        }) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "ops render task: failed to begin render pass");
                return false;
            }
        };

        let bounds = render_target.bounds();
        let format = render_target.format();
        let sample_count = render_target.sample_count();
        let mut recorded_any = self.clear_color.is_some();
        for op in &self.ops {
            if execute_draw_op(
                &mut pass,
                gpu,
                global_cache,
                resource_cache,
                op,
                bounds,
                format,
                sample_count,
            ) {
                recorded_any = true;
            }
        }
        pass.end();
        recorded_any
    }
}

#[allow(clippy::too_many_arguments)]
fn execute_draw_op(
    pass: &mut crate::gpu::command::RenderPass<'_>,
    gpu: &WgpuGpu,
    global_cache: &mut GlobalCache,
    resource_cache: &mut ResourceCache,
    op: &DrawOp,
    target_bounds: crate::px::PxRect,
    color_format: crate::pixel::PixelFormat,
    sample_count: u32,
) -> bool {
    let Some(vertex_resource) = op.vertex_buffer.resolve(resource_cache) else {
        tracing::warn!("draw op: vertex buffer proxy unresolved, skipping");
        return false;
    };
    let Some(vertex_buffer) = vertex_resource.kind.as_buffer() else {
        return false;
    };

    let (geometry_kind, fragment_kinds, blend_tag) = op.program_key_parts();
    let key = ProgramKey::new(geometry_kind, &fragment_kinds, blend_tag);
    let pipeline = global_cache.programs.get_or_compile(gpu, key, || RenderPipelineDescriptor {
        label: "tgfx-core rect pipeline",
        vertex_shader_source: RECT_VERTEX_SHADER.to_string(),
        fragment_shader_source: RECT_FRAGMENT_SHADER.to_string(),
        vertex_buffers: vec![VertexBufferLayout {
            stride: 24,
            step_mode: VertexStepMode::PerVertex,
            attributes: vec![
                VertexAttribute {
                    format: VertexFormat::Float32x2,
                    offset: 0,
                    shader_location: 0,
                },
                VertexAttribute {
                    format: VertexFormat::Float32x4,
                    offset: 8,
                    shader_location: 1,
                },
            ],
        }],
        color_format,
        sample_count,
        blend: Some(crate::gpu::pipeline::BlendState::SRC_OVER),
        uniform_blocks: vec![UniformBlockSlot { binding: 0, size: 16 }],
        sampler_count: 0,
    });

    let viewport = [target_bounds.size.width.raw() as f32, target_bounds.size.height.raw() as f32, 0.0, 0.0];
    let uniform_bytes: &[u8] = bytemuck::cast_slice(&viewport);
    let Ok(slice) = global_cache.uniform_ring.acquire(gpu.queue(), uniform_bytes) else {
        tracing::warn!("draw op: uniform ring buffer exhausted, skipping");
        return false;
    };

    let bind_group = pipeline.uniform_bind_group(gpu.device(), global_cache.uniform_ring.buffer());

    pass.set_pipeline(&pipeline);
    pass.set_bind_group(&bind_group, &[slice.offset as u32]);
    pass.set_vertex_buffer(0, vertex_buffer, 0);

    let index_buffer = match op.index_buffer {
        crate::compositor::SharedIndexBuffer::NonAaQuad => &global_cache.index_buffers.non_aa_quad,
        crate::compositor::SharedIndexBuffer::AaQuad => &global_cache.index_buffers.aa_quad,
        crate::compositor::SharedIndexBuffer::RRectFill => &global_cache.index_buffers.rrect_fill,
    };
    pass.set_index_buffer(index_buffer, IndexFormat::Uint16);

    let scissor = match &op.clip {
        ClipRepresentation::NoClip => target_bounds,
        other => other.scissor_rect(target_bounds),
    };
    pass.set_scissor_rect(scissor);

    pass.draw_indexed(PrimitiveTopology::TriangleList, op.index_count(), 1);
    true
}
