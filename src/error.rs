//! Error types for the rendering core.
//!
//! Per the error-handling policy this crate follows: most fallible internal
//! operations are caught at the boundary that can fail (backend factory
//! calls) and converted to a logged `None`/skip rather than propagated as a
//! `Result` through the compositor or task graph. `CoreError` exists for the
//! small set of APIs allowed to surface failure — context/backend
//! construction, explicit readback — and for structured `tracing` output.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("no compatible GPU adapter was found for the requested backend")]
    NoAdapter,

    #[error("device request failed: {0}")]
    DeviceRequest(String),

    #[error("the device has been lost")]
    DeviceLost,

    #[error("unsupported pixel format/usage combination: {0:?} with usage {1:#x}")]
    UnsupportedFormat(crate::pixel::PixelFormat, u32),

    #[error("render pass already active on this encoder")]
    RenderPassAlreadyActive,

    #[error("uniform buffer offset {offset} is not aligned to {alignment}")]
    MisalignedUniformOffset { offset: u64, alignment: u64 },

    #[error("buffer map failed: {0}")]
    MapFailed(String),

    #[error("requested allocation of {0} bytes exceeds the cache limit of {1} bytes")]
    AllocationTooLarge(u64, u64),
}

pub type CoreResult<T> = Result<T, CoreError>;
