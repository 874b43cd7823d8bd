//! Image buffers for editing and export.
//!
//! Pixels are stored as display-encoded RGBA `f32` in [0, 1]. The adjustment
//! math operates directly on these values, the same way the fragment shader
//! samples an 8-bit texture.

use std::path::Path;

use image::{DynamicImage, ImageBuffer, Rgba, Rgba32FImage, RgbaImage, imageops};

use crate::error::CoreError;

/// A decoded RGBA `f32` pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Row-major RGBA pixels, `width * height` entries.
    pub pixels: Vec<[f32; 4]>,
}

impl PhotoImage {
    /// Wrap an existing pixel buffer.
    ///
    /// Returns [`CoreError::RasterSize`] when `pixels.len() != width * height`.
    pub fn new(width: u32, height: u32, pixels: Vec<[f32; 4]>) -> Result<Self, CoreError> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(CoreError::RasterSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Uniformly filled image.
    pub fn filled(width: u32, height: u32, rgba: [f32; 4]) -> Self {
        Self {
            width,
            height,
            pixels: vec![rgba; width as usize * height as usize],
        }
    }

    /// Convert any decoded image into the `f32` representation.
    pub fn from_dynamic(img: &DynamicImage) -> Self {
        let rgba = img.to_rgba32f();
        let (width, height) = rgba.dimensions();
        let pixels = bytemuck::cast_slice::<f32, [f32; 4]>(rgba.as_raw()).to_vec();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// `true` when either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Longest edge in pixels.
    pub fn long_edge(&self) -> u32 {
        self.width.max(self.height)
    }

    /// Pixel at `(x, y)`. Coordinates are clamped to the image bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        let x = x.min(self.width.saturating_sub(1));
        let y = y.min(self.height.saturating_sub(1));
        self.pixels[(y * self.width + x) as usize]
    }

    /// Raw bytes of the pixel buffer for texture upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    fn to_rgba32f(&self) -> Rgba32FImage {
        let raw = bytemuck::cast_slice::<[f32; 4], f32>(&self.pixels).to_vec();
        ImageBuffer::from_raw(self.width, self.height, raw)
            .unwrap_or_else(|| ImageBuffer::new(self.width, self.height))
    }

    /// Quantize to 8-bit RGBA, clamping each channel to [0, 1].
    pub fn to_rgba8(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let p = self.pixels[(y * self.width + x) as usize];
            Rgba(p.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
        })
    }

    /// Return a copy whose long edge is at most `max_edge`.
    ///
    /// Images already within the bound are returned unchanged.
    pub fn downscaled(&self, max_edge: u32) -> Self {
        let long = self.long_edge();
        if long <= max_edge || self.is_empty() {
            return self.clone();
        }
        let scale = max_edge as f32 / long as f32;
        let width = ((self.width as f32 * scale).round() as u32).max(1);
        let height = ((self.height as f32 * scale).round() as u32).max(1);
        let resized = imageops::resize(
            &self.to_rgba32f(),
            width,
            height,
            imageops::FilterType::Triangle,
        );
        Self {
            width,
            height,
            pixels: bytemuck::cast_slice::<f32, [f32; 4]>(resized.as_raw()).to_vec(),
        }
    }

    /// Encode to disk. The format follows the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CoreError> {
        self.to_rgba8().save(path).map_err(CoreError::Encode)
    }
}

/// Decoded pixel buffers for one imported image.
///
/// The proxy is bounded for interactive editing; the full buffer is only
/// rendered on export.
#[derive(Debug, Clone)]
pub struct ImageSource {
    pub original_width: u32,
    pub original_height: u32,
    pub proxy: PhotoImage,
    pub full: PhotoImage,
}

impl ImageSource {
    /// Decode a file and build its proxy.
    pub fn load(path: impl AsRef<Path>, max_proxy_edge: u32) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let img = image::open(path).map_err(CoreError::Decode)?;
        tracing::info!(
            "Decoded {}: {}x{}",
            path.display(),
            img.width(),
            img.height()
        );
        Self::from_dynamic(&img, max_proxy_edge)
    }

    /// Build from an already decoded image.
    pub fn from_dynamic(img: &DynamicImage, max_proxy_edge: u32) -> Result<Self, CoreError> {
        Self::from_full(PhotoImage::from_dynamic(img), max_proxy_edge)
    }

    /// Build from a full-resolution buffer.
    pub fn from_full(full: PhotoImage, max_proxy_edge: u32) -> Result<Self, CoreError> {
        if full.is_empty() {
            return Err(CoreError::EmptyImage);
        }
        let proxy = full.downscaled(max_proxy_edge);
        tracing::debug!(
            "Proxy {}x{} for {}x{} source",
            proxy.width,
            proxy.height,
            full.width,
            full.height
        );
        Ok(Self {
            original_width: full.width,
            original_height: full.height,
            proxy,
            full,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_mismatched_length() {
        let err = PhotoImage::new(2, 2, vec![[0.0; 4]; 3]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::RasterSize {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_downscale_bounds_long_edge() {
        let img = PhotoImage::filled(400, 100, [0.5, 0.5, 0.5, 1.0]);
        let proxy = img.downscaled(200);
        assert_eq!((proxy.width, proxy.height), (200, 50));
        assert!((proxy.pixel(10, 10)[0] - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_downscale_keeps_small_images() {
        let img = PhotoImage::filled(64, 32, [0.1, 0.2, 0.3, 1.0]);
        assert_eq!(img.downscaled(2048), img);
    }

    #[test]
    fn test_source_from_full_builds_proxy() {
        let full = PhotoImage::filled(3000, 1500, [0.2; 4]);
        let source = ImageSource::from_full(full, 1000).unwrap();
        assert_eq!(source.original_width, 3000);
        assert_eq!(source.proxy.long_edge(), 1000);
        assert_eq!(source.full.width, 3000);
    }

    #[test]
    fn test_source_rejects_empty_image() {
        let full = PhotoImage::filled(0, 10, [0.0; 4]);
        assert!(matches!(
            ImageSource::from_full(full, 100),
            Err(CoreError::EmptyImage)
        ));
    }

    #[test]
    fn test_to_rgba8_clamps() {
        let img = PhotoImage::filled(1, 1, [1.5, -0.2, 0.5, 1.0]);
        let out = img.to_rgba8();
        assert_eq!(out.get_pixel(0, 0).0, [255, 0, 128, 255]);
    }
}
