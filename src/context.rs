//! The per-device root. Owns the resource cache, global cache, drawing
//! manager, and proxy provider; every operation on a `Context` and its
//! resources runs on the thread that locked the device (section 5).

use std::rc::Rc;
use std::time::Instant;

use crate::compositor::OpsCompositor;
use crate::config::ContextOptions;
use crate::global_cache::GlobalCache;
use crate::gpu::command::CommandBuffer;
use crate::gpu::semaphore::Semaphore;
use crate::gpu::WgpuGpu;
use crate::proxy::{ProxyProvider, RenderTargetProxy};
use crate::resource::ResourceCache;
use crate::task::{DrawingManager, OpsRenderTask, RenderTask};

static NEXT_CONTEXT_ID: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);

pub struct Context {
    unique_id: u64,
    gpu: WgpuGpu,
    resource_cache: ResourceCache,
    global_cache: GlobalCache,
    drawing_manager: DrawingManager,
    proxy_provider: ProxyProvider,
    pending_command_buffer: Option<CommandBuffer>,
}

impl Context {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, options: ContextOptions) -> Self {
        let gpu = WgpuGpu::new(device, queue);
        let global_cache = GlobalCache::new(&gpu);
        let mut resource_cache = ResourceCache::new();
        resource_cache.set_cache_limit(options.cache_limit_bytes);
        resource_cache.set_resource_expiration_frames(options.resource_expiration_frames);
        let unique_id = NEXT_CONTEXT_ID.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        Self {
            unique_id,
            gpu,
            resource_cache,
            global_cache,
            drawing_manager: DrawingManager::new(),
            proxy_provider: ProxyProvider::new(),
            pending_command_buffer: None,
        }
    }

    pub fn unique_id(&self) -> u64 {
        self.unique_id
    }

    pub fn gpu(&self) -> &WgpuGpu {
        &self.gpu
    }

    pub fn proxy_provider(&self) -> &ProxyProvider {
        &self.proxy_provider
    }

    pub fn resource_cache(&self) -> &ResourceCache {
        &self.resource_cache
    }

    pub fn global_cache(&self) -> &GlobalCache {
        &self.global_cache
    }

    pub fn drawing_manager_mut(&mut self) -> &mut DrawingManager {
        &mut self.drawing_manager
    }

    // --- cache controls (section 6) ---

    pub fn memory_usage(&self) -> u64 {
        self.resource_cache.memory_usage()
    }

    pub fn purgeable_bytes(&self) -> u64 {
        self.resource_cache.purgeable_bytes()
    }

    pub fn cache_limit(&self) -> u64 {
        self.resource_cache.cache_limit()
    }

    pub fn set_cache_limit(&mut self, bytes: u64) {
        self.resource_cache.set_cache_limit(bytes);
    }

    pub fn resource_expiration_frames(&self) -> u64 {
        self.resource_cache.resource_expiration_frames()
    }

    pub fn set_resource_expiration_frames(&mut self, frames: u64) {
        self.resource_cache.set_resource_expiration_frames(frames);
    }

    pub fn purge_resources_not_used_since(&mut self, time: Instant) {
        self.resource_cache.purge_not_used_since(time);
    }

    pub fn purge_resources_until_memory_to(&mut self, bytes_limit: u64) -> bool {
        self.resource_cache.purge_until_memory_to(bytes_limit)
    }

    // --- drawing entry points ---

    pub fn new_ops_compositor(
        &self,
        target: Rc<RenderTargetProxy>,
        render_flags: crate::pixel::RenderFlags,
        clear_color: Option<crate::color::Color>,
    ) -> OpsCompositor {
        OpsCompositor::new(target, render_flags, clear_color)
    }

    /// Closes `compositor` and enqueues its accumulated draw ops as one
    /// [`OpsRenderTask`]. The compositor is consumed; it cannot be reused
    /// after this call.
    pub fn submit_ops_compositor(&mut self, mut compositor: OpsCompositor) {
        compositor.make_closed();
        for resource_task in compositor.take_resource_tasks() {
            self.drawing_manager.push(RenderTask::Resource(resource_task));
        }
        let task = OpsRenderTask {
            target: compositor.target.clone(),
            clear_color: compositor.clear_color(),
            ops: compositor.draw_ops().to_vec(),
        };
        self.drawing_manager.push(RenderTask::OpsRender(task));
    }

    pub fn push_resource_task(&mut self, task: crate::task::ResourceTask) {
        self.drawing_manager.push(RenderTask::Resource(task));
    }

    /// Mints an offscreen render target proxy and enqueues the task that
    /// materializes it (creating a fresh texture, or reusing an
    /// unreferenced one under the same scratch key per P1) on the next
    /// flush.
    pub fn new_offscreen_render_target(
        &mut self,
        width: u32,
        height: u32,
        format: crate::pixel::PixelFormat,
        sample_count: u32,
        origin: crate::pixel::ImageOrigin,
        cacheable: bool,
    ) -> Rc<RenderTargetProxy> {
        let proxy = if cacheable {
            self.proxy_provider
                .create_cacheable_render_target_proxy(width, height, format, sample_count, origin)
        } else {
            self.proxy_provider
                .create_render_target_proxy(width, height, format, sample_count, origin)
        };
        self.push_resource_task(crate::task::ResourceTask::RenderTargetCreate {
            proxy: proxy.clone(),
        });
        proxy
    }

    pub fn push_task(&mut self, task: RenderTask) {
        self.drawing_manager.push(task);
    }

    /// Walks the task graph once. Returns `false` (and does not advance
    /// the expiration frame counter) when no task produced GPU work,
    /// matching the `Context::flush` contract in section 6.
    pub fn flush(&mut self) -> bool {
        let buffer = self.drawing_manager.flush(
            &self.gpu,
            &mut self.global_cache,
            &mut self.resource_cache,
        );
        match buffer {
            Some(buffer) => {
                self.pending_command_buffer = Some(buffer);
                self.resource_cache.advance_frame_and_purge();
                true
            }
            None => false,
        }
    }

    /// Submits whatever `flush` produced. `sync_cpu` blocks the calling
    /// thread until the GPU has finished executing the submission.
    pub fn submit(&mut self, sync_cpu: bool) -> Option<Semaphore> {
        let buffer = self.pending_command_buffer.take()?;
        let semaphore = self.gpu.queue().submit(buffer);
        if sync_cpu {
            self.gpu.queue().wait_until_completed(self.gpu.device());
        }
        Some(semaphore)
    }

    pub fn flush_and_submit(&mut self, sync_cpu: bool) -> bool {
        let flushed = self.flush();
        if flushed {
            self.submit(sync_cpu);
        }
        flushed
    }
}
