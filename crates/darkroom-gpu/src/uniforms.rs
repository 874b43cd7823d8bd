//! Uniform buffer layout shared with `adjust.wgsl`.
//!
//! Every member is a `vec4` so the Rust and WGSL layouts agree without
//! manual padding.

use bytemuck::{Pod, Zeroable};
use darkroom_core::grading::wheels::WheelTint;
use darkroom_core::mask::{CompositeLayer, MAX_LOCAL_MASKS};
use darkroom_core::pipeline::PipelineParams;
use darkroom_core::state::basic::BasicAdjustments;

/// The basic sliders one pipeline stage reads.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct BasicGpu {
    /// exposure, contrast, highlights, shadows
    pub tone: [f32; 4],
    /// whites, blacks, clarity, dehaze
    pub presence: [f32; 4],
    /// temperature, tint, vibrance, saturation
    pub color: [f32; 4],
}

impl BasicGpu {
    pub fn from_adjustments(b: &BasicAdjustments) -> Self {
        Self {
            tone: [b.exposure, b.contrast, b.highlights, b.shadows],
            presence: [b.whites, b.blacks, b.clarity, b.dehaze],
            color: [b.temperature, b.tint, b.vibrance, b.saturation],
        }
    }
}

fn wheel(tint: &WheelTint) -> [f32; 4] {
    let [r, g, b] = tint.rgb;
    [r, g, b, if tint.active { 1.0 } else { 0.0 }]
}

/// GPU-side adjustment uniforms.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct AdjustUniformsGpu {
    pub base: BasicGpu,
    /// Local adjustments per mask layer, in composite order.
    pub local: [BasicGpu; MAX_LOCAL_MASKS],
    /// xyz = hue, saturation, luminance deltas per band.
    pub hsl: [[f32; 4]; 8],
    /// shadows, midtones, highlights, global; w = active flag.
    pub wheels: [[f32; 4]; 4],
    /// amount, midpoint, roundness, feather
    pub vignette: [f32; 4],
    /// amount, size, seed, unused
    pub grain: [f32; 4],
    /// width, height, grading balance, unused
    pub frame: [f32; 4],
    /// curve active, hsl active, layer count, unused
    pub flags: [u32; 4],
}

impl AdjustUniformsGpu {
    pub fn from_params(params: &PipelineParams, resolution: [u32; 2], layers: &[CompositeLayer]) -> Self {
        let layers = &layers[..layers.len().min(MAX_LOCAL_MASKS)];
        let mut local = [BasicGpu::default(); MAX_LOCAL_MASKS];
        for (slot, layer) in local.iter_mut().zip(layers) {
            *slot = BasicGpu::from_adjustments(&layer.adjustments);
        }

        let g = &params.grading;
        let v = &params.vignette;
        let grain = &params.grain;
        Self {
            base: BasicGpu::from_adjustments(&params.basic),
            local,
            hsl: params.hsl_bands.map(|[h, s, l]| [h, s, l, 0.0]),
            wheels: [
                wheel(&g.shadows),
                wheel(&g.midtones),
                wheel(&g.highlights),
                wheel(&g.global),
            ],
            vignette: [v.amount, v.midpoint, v.roundness, v.feather],
            grain: [grain.amount, grain.size, grain.seed, 0.0],
            frame: [resolution[0] as f32, resolution[1] as f32, g.balance, 0.0],
            flags: [
                params.curve.is_some() as u32,
                params.hsl_active as u32,
                layers.len() as u32,
                0,
            ],
        }
    }
}
