//! Darkroom GPU: wgpu fragment-shader implementation of the adjustment
//! pipeline.
//!
//! This crate owns all GPU resources. It exposes [`GpuAdjustmentPipeline`],
//! a [`FrameRenderer`](darkroom_core::FrameRenderer) in full mode, and
//! [`select_renderer`], which falls back to the reduced renderer when no
//! device can be created.

pub mod backend;
pub mod buffers;
pub mod context;
pub mod pipeline;
pub mod readback;
pub mod uniforms;

pub use backend::select_renderer;
pub use context::GpuContext;
pub use pipeline::GpuAdjustmentPipeline;

use darkroom_core::RenderError;

/// Failures while creating or driving the GPU pipeline.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("no compatible GPU adapter: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to create GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("image {width}x{height} exceeds the device texture limit of {limit}")]
    TooLarge { width: u32, height: u32, limit: u32 },
    #[error("frame readback needs {bytes} bytes, over the device buffer limit of {limit}")]
    ReadbackTooLarge { bytes: u64, limit: u64 },
    #[error("shader validation failed: {0}")]
    Shader(String),
    #[error("GPU readback failed: {0}")]
    Readback(String),
}

impl From<GpuError> for RenderError {
    fn from(err: GpuError) -> Self {
        RenderError::Backend(Box::new(err))
    }
}
