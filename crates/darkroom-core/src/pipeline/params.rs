//! Per-frame pipeline parameters resolved from an [`EditState`].

use crate::grading::curves::CurveLut;
use crate::grading::effects::{GrainParams, VignetteParams};
use crate::grading::wheels::GradingTints;
use crate::state::basic::BasicAdjustments;
use crate::state::color::HueBand;
use crate::state::EditState;

/// Everything the adjustment pipeline reads, in slider units.
///
/// Built once per frame; no string lookups happen past this point.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineParams {
    pub basic: BasicAdjustments,
    /// `[hue, saturation, luminance]` deltas per band, in band order.
    pub hsl_bands: [[f32; 3]; 8],
    /// `false` when every band is neutral; the HSL stage is skipped.
    pub hsl_active: bool,
    pub grading: GradingTints,
    pub vignette: VignetteParams,
    pub grain: GrainParams,
    /// `None` for the identity curve.
    pub curve: Option<CurveLut>,
}

impl PipelineParams {
    pub fn from_state(state: &EditState, seed: f32) -> Self {
        let hsl_bands = HueBand::ALL.map(|band| {
            let v = state.hsl.band(band);
            [v.hue, v.saturation, v.luminance]
        });
        let vignette = &state.effects.vignette;
        let grain = &state.effects.grain;
        Self {
            basic: state.basic,
            hsl_bands,
            hsl_active: !state.hsl.is_neutral(),
            grading: GradingTints::from_state(&state.color_grading),
            vignette: VignetteParams {
                amount: vignette.amount,
                midpoint: vignette.midpoint,
                roundness: vignette.roundness,
                feather: vignette.feather,
            },
            grain: GrainParams {
                amount: grain.amount,
                size: grain.size,
                seed,
            },
            curve: CurveLut::for_state(&state.tone_curve),
        }
    }
}
