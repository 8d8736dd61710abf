//! Ops compositor: merges consecutive compatible draws into batched
//! [`draw_op::DrawOp`]s, classifies clips, and recognizes the
//! clear-as-draw fast path.

pub mod clip;
pub mod draw_op;
pub mod fill;
pub mod ops_compositor;

pub use clip::{ClipRepresentation, ClipRequest};
pub use draw_op::{DrawOp, DrawOpKind, SharedIndexBuffer};
pub use fill::{BlendMode, Fill, ShaderSpec};
pub use ops_compositor::OpsCompositor;
