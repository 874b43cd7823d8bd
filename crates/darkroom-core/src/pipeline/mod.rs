//! The adjustment pipeline contract.
//!
//! A [`FrameRenderer`] turns a bound image plus an [`EditState`] into a
//! rendered frame. The GPU pipeline (full mode) and [`ReducedRenderer`]
//! both implement it, so callers render preview and export the same way
//! and can query which mode is active.

pub mod params;
pub mod reduced;
pub mod reference;

pub use params::PipelineParams;
pub use reduced::ReducedRenderer;

use crate::error::RenderError;
use crate::image::PhotoImage;
use crate::mask::CompositeLayer;
use crate::state::EditState;

/// Which feature set the active renderer supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Every pipeline stage, including curves, HSL, grading, effects and masks.
    Full,
    /// Exposure, contrast and saturation only.
    Reduced,
}

impl std::fmt::Display for RenderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Reduced => write!(f, "reduced"),
        }
    }
}

/// Inputs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameRequest<'a> {
    pub state: &'a EditState,
    /// Mask layers built at the bound image's resolution.
    pub layers: &'a [CompositeLayer],
    /// Grain seed. Fix it for reproducible output.
    pub seed: f32,
}

impl<'a> FrameRequest<'a> {
    /// Request without masks and with a zero seed.
    pub fn new(state: &'a EditState) -> Self {
        Self {
            state,
            layers: &[],
            seed: 0.0,
        }
    }

    pub fn with_layers(mut self, layers: &'a [CompositeLayer]) -> Self {
        self.layers = layers;
        self
    }

    pub fn with_seed(mut self, seed: f32) -> Self {
        self.seed = seed;
        self
    }
}

/// A renderer bound to at most one working image.
pub trait FrameRenderer {
    fn mode(&self) -> RenderMode;

    /// Bind a new image, releasing resources held for the previous one.
    fn bind_image(&mut self, image: &PhotoImage) -> Result<(), RenderError>;

    /// Render the bound image.
    fn render(&mut self, request: &FrameRequest<'_>) -> Result<PhotoImage, RenderError>;

    /// Free every resource. A released renderer refuses further work.
    fn release(&mut self);
}
