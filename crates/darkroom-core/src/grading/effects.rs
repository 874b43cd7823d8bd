//! Finishing effects: vignette and film grain.

use super::hsl::fract;
use super::smoothstep;

/// Vignette parameters in slider units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VignetteParams {
    pub amount: f32,
    pub midpoint: f32,
    pub roundness: f32,
    pub feather: f32,
}

/// Distance from the frame center, normalized so the corners reach 1.
///
/// `uv` is the normalized pixel position and `aspect` is width / height.
/// Roundness 0 is the plain radial distance in uv space (an ellipse that
/// follows the frame). Positive roundness blends toward a true circle;
/// negative roundness raises the superellipse exponent toward a rounded
/// rectangle.
pub fn vignette_distance(uv: [f32; 2], aspect: f32, roundness: f32) -> f32 {
    let x = (uv[0] - 0.5).abs() * 2.0;
    let y = (uv[1] - 0.5).abs() * 2.0;
    let r = roundness / 100.0;
    if r >= 0.0 {
        let ellipse = (x * x + y * y).sqrt() / std::f32::consts::SQRT_2;
        let (px, py) = (x * aspect, y);
        let circle = (px * px + py * py).sqrt() / (aspect * aspect + 1.0).sqrt();
        ellipse + (circle - ellipse) * r
    } else {
        let n = 2.0 - r * 6.0;
        (x.powf(n) + y.powf(n)).powf(1.0 / n) / 2.0_f32.powf(1.0 / n)
    }
}

/// Darken (positive amount) or lighten (negative) toward the edges.
pub fn apply_vignette(rgb: [f32; 3], uv: [f32; 2], aspect: f32, params: &VignetteParams) -> [f32; 3] {
    if params.amount.abs() <= 0.01 {
        return rgb;
    }
    let dist = vignette_distance(uv, aspect, params.roundness);
    let mid = params.midpoint / 100.0;
    let feather = (params.feather / 100.0).max(0.01);
    let vig = smoothstep(mid - feather, mid + feather, dist);
    let factor = 1.0 - params.amount / 100.0;
    rgb.map(|c| c + (c * factor - c) * vig)
}

/// Deterministic hash in [0, 1).
pub fn grain_hash(st: [f32; 2]) -> f32 {
    fract((st[0] * 12.9898 + st[1] * 78.233).sin() * 43758.547)
}

/// Grain parameters in slider units plus the per-frame seed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrainParams {
    pub amount: f32,
    pub size: f32,
    pub seed: f32,
}

/// Add zero-mean noise of amplitude `amount/100 × 0.15`.
///
/// `uv` is scaled to pixels and divided by `max(1, size)` so larger sizes
/// give coarser grain.
pub fn apply_grain(rgb: [f32; 3], uv: [f32; 2], resolution: [f32; 2], params: &GrainParams) -> [f32; 3] {
    if params.amount <= 0.01 {
        return rgb;
    }
    let scale = 1.0 / params.size.max(1.0);
    let st = [
        uv[0] * resolution[0] * scale + params.seed,
        uv[1] * resolution[1] * scale + params.seed,
    ];
    let noise = grain_hash(st) * 2.0 - 1.0;
    let delta = noise * params.amount / 100.0 * 0.15;
    rgb.map(|c| c + delta)
}
