//! Stateless radial and linear gradient mask generators.
//!
//! Both return one `u8` alpha value per pixel, sampled at pixel centers.

use glam::{Mat2, Vec2};

use crate::state::mask::{LinearGradientData, RadialGradientData};

fn to_alpha(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn pixel_centers(width: u32, height: u32) -> impl Iterator<Item = Vec2> {
    (0..height).flat_map(move |y| (0..width).map(move |x| Vec2::new(x as f32 + 0.5, y as f32 + 0.5)))
}

/// Coverage of a radial gradient: opaque inside `inner_radius`, fading to
/// transparent at `outer_radius` (swapped when inverted).
///
/// Radii are fractions of `max(width, height)`. Rotation and aspect ratio
/// are applied as a transform about the center before measuring distance.
pub fn radial_mask(width: u32, height: u32, data: &RadialGradientData) -> Vec<u8> {
    let max_dim = width.max(height) as f32;
    let center = Vec2::new(data.center_x * width as f32, data.center_y * height as f32);
    let inner = data.inner_radius * max_dim;
    let outer = data.outer_radius * max_dim;
    let aspect = if data.aspect_ratio > 0.0 {
        data.aspect_ratio
    } else {
        1.0
    };
    // Inverse of translate(c) · rotate(θ) · scale(1, 1/aspect) · translate(-c).
    let to_gradient = Mat2::from_diagonal(Vec2::new(1.0, aspect))
        * Mat2::from_angle(-data.rotation.to_radians());

    pixel_centers(width, height)
        .map(|p| {
            let d = (to_gradient * (p - center)).length();
            let t = if outer > inner {
                ((d - inner) / (outer - inner)).clamp(0.0, 1.0)
            } else if d < inner {
                0.0
            } else {
                1.0
            };
            to_alpha(if data.inverted { t } else { 1.0 - t })
        })
        .collect()
}

/// Coverage of a linear gradient along start → end.
///
/// Transparent before the feather band, opaque after it (swapped when
/// inverted). The band is centered on the midpoint and spans `feather` of
/// the vector's length. A zero-length vector covers nothing.
pub fn linear_mask(width: u32, height: u32, data: &LinearGradientData) -> Vec<u8> {
    let size = Vec2::new(width as f32, height as f32);
    let start = Vec2::new(data.start_x, data.start_y) * size;
    let end = Vec2::new(data.end_x, data.end_y) * size;
    let dir = end - start;
    let len_sq = dir.length_squared();
    if len_sq <= f32::EPSILON {
        return vec![0; width as usize * height as usize];
    }

    let band_start = (0.5 - data.feather / 2.0).max(0.0);
    let band_end = (0.5 + data.feather / 2.0).min(1.0);

    pixel_centers(width, height)
        .map(|p| {
            let t = ((p - start).dot(dir) / len_sq).clamp(0.0, 1.0);
            let v = if band_end > band_start {
                ((t - band_start) / (band_end - band_start)).clamp(0.0, 1.0)
            } else if t < band_start {
                0.0
            } else {
                1.0
            };
            to_alpha(if data.inverted { 1.0 - v } else { v })
        })
        .collect()
}
