//! Cross-backend GPU abstraction and rendering core.
//!
//! This crate turns an ordered stream of high-level 2D drawing calls into
//! minimized, batched GPU command sequences submitted through a uniform
//! backend interface. It does not parse paths, shape text, or expose a
//! public canvas API — those are external collaborators that hand this
//! core already-built fills, shapes, and images.
//!
//! ```text
//! draw calls → OpsCompositor → DrawingManager → RenderTask[]
//!                     │               │
//!                     │               ├── ResourceTask[]
//!                     │               └── OpsRenderTask[]
//!                     │
//!           GlobalCache (pipelines, common buffers)
//!                     │
//!           CommandEncoder → RenderPass
//!                     │
//!           CommandQueue (submit, semaphores)
//!                     │
//!           GPU backend
//!                     │
//!           ResourceCache (LRU, budget, scratch keys)
//! ```

pub mod color;
pub mod compositor;
pub mod config;
pub mod context;
pub mod error;
pub mod global_cache;
pub mod gpu;
pub mod pixel;
pub mod proxy;
pub mod px;
pub mod resource;
pub mod task;

pub use color::Color;
pub use config::ContextOptions;
pub use context::Context;
pub use error::{CoreError, CoreResult};
pub use pixel::{BufferUsage, ColorSpace, ImageOrigin, PixelFormat, RenderFlags, TextureUsage, YuvFormat};
pub use px::{Px, PxPosition, PxRect, PxSize};
