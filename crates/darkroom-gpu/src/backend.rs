//! Renderer selection with graceful fallback.

use darkroom_core::EngineConfig;
use darkroom_core::pipeline::{FrameRenderer, ReducedRenderer};

use crate::GpuError;
use crate::context::GpuContext;
use crate::pipeline::GpuAdjustmentPipeline;

fn create_gpu_pipeline() -> Result<GpuAdjustmentPipeline, GpuError> {
    GpuAdjustmentPipeline::new(GpuContext::new()?)
}

/// Pick the full GPU pipeline when a device and the shader are available,
/// otherwise the reduced renderer. Query [`FrameRenderer::mode`] on the
/// result to know which feature set is active.
pub fn select_renderer(config: &EngineConfig) -> Box<dyn FrameRenderer> {
    if config.force_fallback {
        tracing::info!("GPU pipeline disabled by configuration, using reduced renderer");
        return Box::new(ReducedRenderer::new());
    }
    match create_gpu_pipeline() {
        Ok(pipeline) => Box::new(pipeline),
        Err(err) => {
            tracing::warn!("GPU pipeline unavailable, falling back to reduced renderer: {err}");
            Box::new(ReducedRenderer::new())
        }
    }
}
