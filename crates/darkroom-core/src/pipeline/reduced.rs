//! Degraded renderer used when the GPU backend is unavailable.
//!
//! Supports exposure, contrast and saturation only, applied as chained
//! multiplicative filters with CSS filter semantics. Tone curve, HSL,
//! grading, vignette, grain and masks are ignored.

use super::{FrameRenderer, FrameRequest, RenderMode};
use crate::error::RenderError;
use crate::image::PhotoImage;

/// `brightness(amount)`: scale each channel.
pub fn css_brightness(rgb: [f32; 3], amount: f32) -> [f32; 3] {
    rgb.map(|c| (c * amount).clamp(0.0, 1.0))
}

/// `contrast(amount)`: scale around mid-gray.
pub fn css_contrast(rgb: [f32; 3], amount: f32) -> [f32; 3] {
    rgb.map(|c| ((c - 0.5) * amount + 0.5).clamp(0.0, 1.0))
}

/// `saturate(amount)`: the Filter Effects saturate matrix.
pub fn css_saturate(rgb: [f32; 3], s: f32) -> [f32; 3] {
    let [r, g, b] = rgb;
    [
        (0.213 + 0.787 * s) * r + (0.715 - 0.715 * s) * g + (0.072 - 0.072 * s) * b,
        (0.213 - 0.213 * s) * r + (0.715 + 0.285 * s) * g + (0.072 - 0.072 * s) * b,
        (0.213 - 0.213 * s) * r + (0.715 - 0.715 * s) * g + (0.072 + 0.928 * s) * b,
    ]
    .map(|c| c.clamp(0.0, 1.0))
}

/// CPU renderer with the reduced feature set.
#[derive(Debug, Default)]
pub struct ReducedRenderer {
    image: Option<PhotoImage>,
    released: bool,
}

impl ReducedRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameRenderer for ReducedRenderer {
    fn mode(&self) -> RenderMode {
        RenderMode::Reduced
    }

    fn bind_image(&mut self, image: &PhotoImage) -> Result<(), RenderError> {
        if self.released {
            return Err(RenderError::Released);
        }
        if image.is_empty() {
            return Err(RenderError::EmptyImage);
        }
        self.image = Some(image.clone());
        Ok(())
    }

    fn render(&mut self, request: &FrameRequest<'_>) -> Result<PhotoImage, RenderError> {
        if self.released {
            return Err(RenderError::Released);
        }
        let image = self.image.as_ref().ok_or(RenderError::NoImage)?;
        let basic = &request.state.basic;
        let brightness = basic.exposure.exp2();
        let contrast = 1.0 + basic.contrast / 100.0;
        let saturate = 1.0 + basic.saturation / 100.0;

        let pixels = image
            .pixels
            .iter()
            .map(|px| {
                let rgb = css_brightness([px[0], px[1], px[2]], brightness);
                let rgb = css_contrast(rgb, contrast);
                let [r, g, b] = css_saturate(rgb, saturate);
                [r, g, b, px[3]]
            })
            .collect();
        Ok(PhotoImage {
            width: image.width,
            height: image.height,
            pixels,
        })
    }

    fn release(&mut self) {
        self.image = None;
        self.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::EditState;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_reports_reduced_mode() {
        assert_eq!(ReducedRenderer::new().mode(), RenderMode::Reduced);
    }

    #[test]
    fn test_exposure_brightens() {
        let mut renderer = ReducedRenderer::new();
        renderer
            .bind_image(&PhotoImage::filled(1, 1, [0.25, 0.25, 0.25, 1.0]))
            .unwrap();
        let mut state = EditState::default();
        state.basic.exposure = 1.0;
        let out = renderer.render(&FrameRequest::new(&state)).unwrap();
        assert!((out.pixels[0][0] - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_ignores_unsupported_adjustments() {
        let mut renderer = ReducedRenderer::new();
        let image = PhotoImage::filled(2, 2, [0.3, 0.5, 0.7, 1.0]);
        renderer.bind_image(&image).unwrap();
        let mut state = EditState::default();
        state.effects.vignette.amount = 100.0;
        state.hsl.blue.hue = 50.0;
        let out = renderer.render(&FrameRequest::new(&state)).unwrap();
        for (a, b) in image.pixels.iter().zip(&out.pixels) {
            for c in 0..3 {
                assert!((a[c] - b[c]).abs() < EPSILON);
            }
        }
    }

    #[test]
    fn test_saturate_zero_is_luma_gray() {
        let out = css_saturate([1.0, 0.0, 0.0], 0.0);
        assert!((out[0] - 0.213).abs() < EPSILON);
        assert!((out[1] - 0.213).abs() < EPSILON);
    }

    #[test]
    fn test_released_renderer_refuses_work() {
        let mut renderer = ReducedRenderer::new();
        renderer.release();
        let state = EditState::default();
        assert!(matches!(
            renderer.render(&FrameRequest::new(&state)),
            Err(RenderError::Released)
        ));
    }

    #[test]
    fn test_render_without_image_fails() {
        let mut renderer = ReducedRenderer::new();
        let state = EditState::default();
        assert!(matches!(
            renderer.render(&FrameRequest::new(&state)),
            Err(RenderError::NoImage)
        ));
    }
}
