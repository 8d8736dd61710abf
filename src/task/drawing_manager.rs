//! Proxy & task graph orchestrator. Tasks run in emission order; a flush
//! never aborts on a single task's failure and returns `true` as long as
//! at least one task produced GPU work (section 7).

use std::rc::Rc;

use crate::global_cache::GlobalCache;
use crate::gpu::command::CommandBuffer;
use crate::gpu::WgpuGpu;
use crate::proxy::TextureProxy;
use crate::px::PxRect;
use crate::resource::ResourceCache;

use super::ops_render_task::OpsRenderTask;
use super::resource_task::ResourceTask;

pub enum RenderTask {
    Resource(ResourceTask),
    OpsRender(OpsRenderTask),
    /// Resolves a multisampled texture into its single-sample counterpart.
    TextureResolve {
        msaa: Rc<TextureProxy>,
        resolve: Rc<TextureProxy>,
    },
    /// Copies a render target region into a texture, used ahead of blends
    /// that need to read the destination (section 4.5).
    RenderTargetCopy {
        src: Rc<crate::proxy::RenderTargetProxy>,
        region: PxRect,
        dst: Rc<TextureProxy>,
    },
}

#[derive(Default)]
pub struct DrawingManager {
    tasks: Vec<RenderTask>,
}

impl DrawingManager {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    pub fn push(&mut self, task: RenderTask) {
        self.tasks.push(task);
    }

    pub fn pending_task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Walks every queued task once, in the order it was appended, against
    /// one shared [`crate::gpu::command::CommandEncoder`]. Returns the
    /// finished command buffer if any task recorded work, `None`
    /// otherwise — matching `Context::flush`'s false-on-empty-flush
    /// contract (section 6).
    pub fn flush(
        &mut self,
        gpu: &WgpuGpu,
        global_cache: &mut GlobalCache,
        resource_cache: &mut ResourceCache,
    ) -> Option<CommandBuffer> {
        if self.tasks.is_empty() {
            return None;
        }
        let mut encoder = gpu.create_command_encoder();
        let mut produced_work = false;

        for task in self.tasks.drain(..) {
            match task {
                RenderTask::Resource(resource_task) => {
                    if resource_task.execute(gpu, resource_cache) {
                        produced_work = true;
                    }
                }
                RenderTask::OpsRender(ops_task) => {
                    if ops_task.execute(&mut encoder, gpu, global_cache, resource_cache) {
                        produced_work = true;
                    }
                }
                RenderTask::TextureResolve { msaa, resolve } => {
                    let (Some(src), Some(dst)) = (
                        msaa.resolve(resource_cache),
                        resolve.resolve(resource_cache),
                    ) else {
                        tracing::warn!("texture resolve task: unresolved proxy, skipping");
                        continue;
                    };
                    let (Some(src_tex), Some(dst_tex)) =
                        (src.kind.as_texture(), dst.kind.as_texture())
                    else {
                        continue;
                    };
                    encoder.copy_texture_to_texture(
                        src_tex,
                        (0, 0),
                        dst_tex,
                        (0, 0),
                        (dst_tex.width(), dst_tex.height()),
                    );
                    produced_work = true;
                }
                RenderTask::RenderTargetCopy { src, region, dst } => {
                    let (Some(src_resource), Some(dst_resource)) = (
                        src.resolve(resource_cache),
                        dst.resolve(resource_cache),
                    ) else {
                        tracing::warn!("render target copy task: unresolved proxy, skipping");
                        continue;
                    };
                    let (Some(render_target), Some(dst_tex)) =
                        (src_resource.kind.as_render_target(), dst_resource.kind.as_texture())
                    else {
                        continue;
                    };
                    let Some(src_tex) = render_target.color_texture() else {
                        tracing::warn!(
                            "render target copy task: source has no backing texture (externally owned), skipping"
                        );
                        continue;
                    };
                    let origin = (region.left().raw().max(0) as u32, region.top().raw().max(0) as u32);
                    let size = (
                        region.size.width.raw().max(0) as u32,
                        region.size.height.raw().max(0) as u32,
                    );
                    encoder.copy_texture_region_to_texture(src_tex, origin, dst_tex, (0, 0), size);
                    produced_work = true;
                }
            }
        }

        global_cache.uniform_ring.reset();

        if !produced_work {
            return None;
        }
        Some(encoder.finish())
    }
}
