//! Crop, straighten and flip for export.
//!
//! Preview renders the full working image with the crop shown as an overlay;
//! only export bakes the geometry into pixels.

use glam::{Mat2, Vec2};

use crate::image::PhotoImage;
use crate::state::crop::CropState;

/// Bilinear sample at a continuous pixel position, clamped to the edges.
fn sample_bilinear(image: &PhotoImage, pos: Vec2) -> [f32; 4] {
    let max_x = (image.width - 1) as f32;
    let max_y = (image.height - 1) as f32;
    let p = (pos - Vec2::splat(0.5)).clamp(Vec2::ZERO, Vec2::new(max_x, max_y));
    let x0 = p.x.floor();
    let y0 = p.y.floor();
    let fx = p.x - x0;
    let fy = p.y - y0;
    let (x0, y0) = (x0 as u32, y0 as u32);
    let x1 = (x0 + 1).min(image.width - 1);
    let y1 = (y0 + 1).min(image.height - 1);

    let a = image.pixel(x0, y0);
    let b = image.pixel(x1, y0);
    let c = image.pixel(x0, y1);
    let d = image.pixel(x1, y1);
    std::array::from_fn(|i| {
        let top = a[i] + (b[i] - a[i]) * fx;
        let bottom = c[i] + (d[i] - c[i]) * fx;
        top + (bottom - top) * fy
    })
}

/// Output size in pixels of the crop rect over a `width` x `height` image.
pub fn crop_size(crop: &CropState, width: u32, height: u32) -> (u32, u32) {
    let w = (crop.width * width as f32).round().max(1.0) as u32;
    let h = (crop.height * height as f32).round().max(1.0) as u32;
    (w.min(width), h.min(height))
}

/// Bake `crop` into a new image.
///
/// The image is rotated by `crop.rotation` degrees (clockwise on screen)
/// about the crop center, the rect is cut out and the flips are applied to
/// the result. Samples falling outside the source repeat the edge.
pub fn apply_crop(image: &PhotoImage, crop: &CropState) -> PhotoImage {
    if crop.is_identity() || image.is_empty() {
        return image.clone();
    }
    let (out_w, out_h) = crop_size(crop, image.width, image.height);
    let size = Vec2::new(image.width as f32, image.height as f32);
    let origin = Vec2::new(crop.x, crop.y) * size;
    let center = origin + Vec2::new(out_w as f32, out_h as f32) * 0.5;
    let rotation = Mat2::from_angle(crop.rotation.to_radians());

    let mut pixels = Vec::with_capacity(out_w as usize * out_h as usize);
    for oy in 0..out_h {
        for ox in 0..out_w {
            let sx = if crop.flip_horizontal { out_w - 1 - ox } else { ox };
            let sy = if crop.flip_vertical { out_h - 1 - oy } else { oy };
            let pos = origin + Vec2::new(sx as f32 + 0.5, sy as f32 + 0.5);
            let src = center + rotation * (pos - center);
            pixels.push(sample_bilinear(image, src));
        }
    }
    PhotoImage {
        width: out_w,
        height: out_h,
        pixels,
    }
}
