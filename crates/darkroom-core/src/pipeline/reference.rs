//! CPU evaluation of the adjustment pipeline.
//!
//! `adjust.wgsl` mirrors this stage for stage. The GPU integration tests
//! compare against it, and it renders directly when no GPU is present in
//! tests.

use super::params::PipelineParams;
use crate::grading::effects::{apply_grain, apply_vignette};
use crate::grading::hsl::{apply_hsl_bands, apply_saturation, apply_vibrance};
use crate::grading::sliders::{
    apply_clarity, apply_contrast, apply_dehaze, apply_exposure, apply_tone_zones,
    apply_white_balance,
};
use crate::grading::wheels::apply_color_grading;
use crate::grading::mix;
use crate::image::PhotoImage;
use crate::mask::CompositeLayer;
use crate::state::basic::BasicAdjustments;

/// Global stages 1 through 11: white balance to clarity.
pub fn evaluate_global(rgb: [f32; 3], params: &PipelineParams) -> [f32; 3] {
    let b = &params.basic;
    let mut color = apply_white_balance(rgb, b.temperature, b.tint);
    color = apply_exposure(color, b.exposure);
    color = apply_contrast(color, b.contrast);
    color = apply_tone_zones(color, b.highlights, b.shadows, b.whites, b.blacks);
    color = apply_dehaze(color, b.dehaze);
    if let Some(lut) = &params.curve {
        color = lut.apply(color);
    }
    if params.hsl_active {
        color = apply_hsl_bands(color, &params.hsl_bands);
    }
    color = apply_color_grading(color, &params.grading);
    color = apply_vibrance(color, b.vibrance);
    color = apply_saturation(color, b.saturation);
    apply_clarity(color, b.clarity)
}

/// The reduced basic stage a mask re-runs with its local adjustments.
pub fn evaluate_local(rgb: [f32; 3], b: &BasicAdjustments) -> [f32; 3] {
    let mut color = apply_white_balance(rgb, b.temperature, b.tint);
    color = apply_exposure(color, b.exposure);
    color = apply_contrast(color, b.contrast);
    color = apply_tone_zones(color, b.highlights, b.shadows, b.whites, b.blacks);
    color = apply_vibrance(color, b.vibrance);
    color = apply_saturation(color, b.saturation);
    apply_clarity(color, b.clarity)
}

/// Stages 12 through 14: vignette, grain and the final clamp.
pub fn finish(rgb: [f32; 3], uv: [f32; 2], resolution: [f32; 2], params: &PipelineParams) -> [f32; 3] {
    let aspect = resolution[0] / resolution[1].max(1.0);
    let color = apply_vignette(rgb, uv, aspect, &params.vignette);
    let color = apply_grain(color, uv, resolution, &params.grain);
    color.map(|c| c.clamp(0.0, 1.0))
}

/// Render one pixel, with `local` supplying each mask's adjustments and
/// blend weight at this pixel.
pub fn evaluate_pixel<'a>(
    rgb: [f32; 3],
    uv: [f32; 2],
    resolution: [f32; 2],
    params: &PipelineParams,
    local: impl IntoIterator<Item = (&'a BasicAdjustments, f32)>,
) -> [f32; 3] {
    let mut color = evaluate_global(rgb, params);
    for (adjustments, weight) in local {
        if weight > 0.0 {
            color = mix(color, evaluate_local(color, adjustments), weight);
        }
    }
    finish(color, uv, resolution, params)
}

/// Render a whole image. Alpha passes through unchanged.
pub fn render(image: &PhotoImage, params: &PipelineParams, layers: &[CompositeLayer]) -> PhotoImage {
    let width = image.width;
    let resolution = [image.width as f32, image.height as f32];
    let pixels = image
        .pixels
        .iter()
        .enumerate()
        .map(|(idx, px)| {
            let x = (idx % width as usize) as f32;
            let y = (idx / width as usize) as f32;
            let uv = [(x + 0.5) / resolution[0], (y + 0.5) / resolution[1]];
            let local = layers.iter().map(|l| (&l.adjustments, l.weight(idx)));
            let [r, g, b] = evaluate_pixel([px[0], px[1], px[2]], uv, resolution, params, local);
            [r, g, b, px[3]]
        })
        .collect();
    PhotoImage {
        width: image.width,
        height: image.height,
        pixels,
    }
}
