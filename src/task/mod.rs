//! Proxy & task graph: defers resource creation, uploads, and render
//! passes into a topologically ordered list flushed on demand.

pub mod drawing_manager;
pub mod ops_render_task;
pub mod resource_task;

pub use drawing_manager::{DrawingManager, RenderTask};
pub use ops_render_task::OpsRenderTask;
pub use resource_task::ResourceTask;
