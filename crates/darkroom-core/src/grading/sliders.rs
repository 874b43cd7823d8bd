//! Slider-based basic adjustments: white balance, exposure, contrast, tone
//! zones, dehaze and clarity.
//!
//! All inputs are in slider units (±100, exposure in stops).

use super::hsl::{hsl_to_rgb, rgb_to_hsl};
use super::{luminance, mix, smoothstep};

/// Shift red / blue by temperature and green / magenta by tint.
///
/// ```text
/// r += T/1000 + tint/4000
/// g -= tint/2000
/// b += -T/1000 + tint/4000
/// ```
pub fn apply_white_balance(rgb: [f32; 3], temperature: f32, tint: f32) -> [f32; 3] {
    let temp = temperature / 100.0;
    let tint = tint / 100.0;
    [
        rgb[0] + temp * 0.1 + tint * 0.025,
        rgb[1] - tint * 0.05,
        rgb[2] - temp * 0.1 + tint * 0.025,
    ]
}

/// Multiply by `2^stops`.
pub fn apply_exposure(rgb: [f32; 3], stops: f32) -> [f32; 3] {
    let factor = stops.exp2();
    rgb.map(|c| c * factor)
}

/// Scale around mid-gray.
///
/// ```text
/// out = (in − 0.5) × (1 + contrast/100) + 0.5
/// ```
pub fn apply_contrast(rgb: [f32; 3], contrast: f32) -> [f32; 3] {
    let k = 1.0 + contrast / 100.0;
    rgb.map(|c| (c - 0.5) * k + 0.5)
}

/// Luminance-masked tone controls.
///
/// Highlights and whites pull toward white, shadows scale the color, blacks
/// pull toward black. Each mask is a smoothstep over a luminance range
/// measured once before any of the four controls is applied.
pub fn apply_tone_zones(
    rgb: [f32; 3],
    highlights: f32,
    shadows: f32,
    whites: f32,
    blacks: f32,
) -> [f32; 3] {
    let l = luminance(rgb);
    let highlight = highlights / 100.0 * smoothstep(0.5, 1.0, l);
    let shadow = shadows / 100.0 * (1.0 - smoothstep(0.0, 0.5, l));
    let white = whites / 100.0 * smoothstep(0.75, 1.0, l);
    let black = blacks / 100.0 * (1.0 - smoothstep(0.0, 0.25, l));

    rgb.map(|c| {
        let c = c + highlight * (1.0 - c);
        let c = c + shadow * c;
        let c = c + white * (1.0 - c);
        c - black * c
    })
}

/// Threshold below which dehaze and clarity are skipped, in slider units.
pub const PRESENCE_EPSILON: f32 = 0.01;

/// Lift contrast outside the highlights and add a little saturation.
pub fn apply_dehaze(rgb: [f32; 3], amount: f32) -> [f32; 3] {
    if amount.abs() <= PRESENCE_EPSILON {
        return rgb;
    }
    let d = amount / 100.0;
    let mask = 1.0 - smoothstep(0.0, 0.8, luminance(rgb));
    let boosted = rgb.map(|c| c * (1.0 + d * 0.5));
    let color = mix(rgb, boosted, mask);
    let mut hsl = rgb_to_hsl(color);
    hsl[1] = (hsl[1] * (1.0 + d * 0.2)).clamp(0.0, 1.0);
    hsl_to_rgb(hsl)
}

/// Midtone-weighted contrast boost.
///
/// ```text
/// mask = 1 − 2|L − 0.5|
/// out  = mix(in, (in − 0.5)(1 + clarity/200) + 0.5, mask / 2)
/// ```
pub fn apply_clarity(rgb: [f32; 3], amount: f32) -> [f32; 3] {
    if amount.abs() <= PRESENCE_EPSILON {
        return rgb;
    }
    let k = amount / 100.0;
    let mask = 1.0 - (luminance(rgb) - 0.5).abs() * 2.0;
    let contrasted = rgb.map(|c| (c - 0.5) * (1.0 + k * 0.5) + 0.5);
    mix(rgb, contrasted, mask * 0.5)
}
