//! Painted brush masks.
//!
//! A [`BrushEngine`] owns one 8-bit alpha raster at working resolution and
//! paints circular stamps into it. A stroke resamples the segment between
//! successive input points so fast pointer motion leaves no gaps.

use base64::{Engine as _, engine::general_purpose};
use glam::Vec2;
use image::{GrayImage, imageops};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::state::clamp_value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BrushMode {
    /// Additive ("lighter") compositing.
    #[default]
    Add,
    /// Destination-out erase.
    Subtract,
}

/// Brush tip parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushSettings {
    /// Diameter in pixels, 1..500.
    pub size: f32,
    /// Fraction of the radius painted at full flow, 0..100.
    pub hardness: f32,
    /// Per-stamp opacity, 1..100.
    pub flow: f32,
    pub mode: BrushMode,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            size: 100.0,
            hardness: 50.0,
            flow: 50.0,
            mode: BrushMode::Add,
        }
    }
}

impl BrushSettings {
    pub fn clamp_ranges(&mut self) {
        self.size = clamp_value(self.size, 1.0, 500.0);
        self.hardness = clamp_value(self.hardness, 0.0, 100.0);
        self.flow = clamp_value(self.flow, 1.0, 100.0);
    }

    /// Distance between resampled stamps along a stroke.
    pub fn spacing(&self) -> f32 {
        (self.size * 0.1).max(1.0)
    }

    /// Stamp coverage at distance `d` from the stamp center, 0 outside the
    /// radius.
    pub fn falloff(&self, d: f32) -> f32 {
        let radius = self.size / 2.0;
        if d > radius {
            return 0.0;
        }
        let alpha = self.flow / 100.0;
        if self.hardness >= 100.0 {
            return alpha;
        }
        let inner = self.hardness / 100.0 * radius;
        if d <= inner {
            alpha
        } else {
            alpha * (radius - d) / (radius - inner)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum StrokeState {
    Idle,
    Painting { last: Vec2 },
}

/// Persistent alpha raster for one brush mask.
#[derive(Debug, Clone, PartialEq)]
pub struct BrushEngine {
    width: u32,
    height: u32,
    data: Vec<u8>,
    stroke: StrokeState,
}

impl BrushEngine {
    /// Empty (fully transparent) raster.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize],
            stroke: StrokeState::Idle,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_painting(&self) -> bool {
        matches!(self.stroke, StrokeState::Painting { .. })
    }

    /// Begin a stroke and stamp at the start point.
    ///
    /// Starting while a stroke is active ends that stroke first: the last
    /// stroke wins.
    pub fn start_stroke(&mut self, x: f32, y: f32, settings: &BrushSettings) {
        if self.is_painting() {
            tracing::debug!("Brush stroke restarted at ({x}, {y})");
        }
        let point = Vec2::new(x, y);
        self.stroke = StrokeState::Painting { last: point };
        self.stamp(point, settings);
    }

    /// Stamp along the segment from the previous point to `(x, y)`.
    ///
    /// Ignored while idle.
    pub fn continue_stroke(&mut self, x: f32, y: f32, settings: &BrushSettings) {
        let StrokeState::Painting { last } = self.stroke else {
            return;
        };
        let target = Vec2::new(x, y);
        let delta = target - last;
        let steps = (delta.length() / settings.spacing()).ceil() as u32;
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            self.stamp(last + delta * t, settings);
        }
        self.stroke = StrokeState::Painting { last: target };
    }

    pub fn end_stroke(&mut self) {
        self.stroke = StrokeState::Idle;
    }

    fn stamp(&mut self, center: Vec2, settings: &BrushSettings) {
        let radius = settings.size / 2.0;
        if self.width == 0 || self.height == 0 {
            return;
        }
        let x0 = (center.x - radius).floor().max(0.0) as u32;
        let y0 = (center.y - radius).floor().max(0.0) as u32;
        let x1 = ((center.x + radius).ceil().max(0.0) as u32).min(self.width - 1);
        let y1 = ((center.y + radius).ceil().max(0.0) as u32).min(self.height - 1);
        if x0 > x1 || y0 > y1 {
            return;
        }

        for y in y0..=y1 {
            for x in x0..=x1 {
                let pixel = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let s = settings.falloff(pixel.distance(center));
                if s <= 0.0 {
                    continue;
                }
                let idx = (y * self.width + x) as usize;
                let dst = self.data[idx] as f32 / 255.0;
                let out = match settings.mode {
                    BrushMode::Add => (dst + s).min(1.0),
                    BrushMode::Subtract => dst * (1.0 - s),
                };
                self.data[idx] = (out * 255.0).round() as u8;
            }
        }
    }

    /// Raw row-major alpha bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Replace the raster, e.g. when restoring a persisted mask.
    pub fn set_data(&mut self, data: Vec<u8>) -> Result<(), CoreError> {
        let expected = self.data.len();
        if data.len() != expected {
            return Err(CoreError::RasterSize {
                expected,
                actual: data.len(),
            });
        }
        self.data = data;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// `true` when nothing has been painted.
    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&a| a == 0)
    }

    fn as_gray_image(&self) -> GrayImage {
        GrayImage::from_raw(self.width, self.height, self.data.clone())
            .unwrap_or_else(|| GrayImage::new(self.width, self.height))
    }

    /// Rescale existing content to a new size with bilinear filtering.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.data = if self.width == 0 || self.height == 0 || width == 0 || height == 0 {
            vec![0; width as usize * height as usize]
        } else {
            imageops::resize(&self.as_gray_image(), width, height, imageops::FilterType::Triangle)
                .into_raw()
        };
        self.width = width;
        self.height = height;
    }

    /// Coverage in 0..1 at the given output size.
    pub fn coverage(&self, width: u32, height: u32) -> Vec<f32> {
        if (width, height) == (self.width, self.height) {
            return self.data.iter().map(|&a| a as f32 / 255.0).collect();
        }
        let mut scaled = self.clone();
        scaled.resize(width, height);
        scaled.data.iter().map(|&a| a as f32 / 255.0).collect()
    }

    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.data)
    }

    pub fn from_base64(width: u32, height: u32, encoded: &str) -> Result<Self, CoreError> {
        let bytes = general_purpose::STANDARD.decode(encoded)?;
        let mut engine = Self::new(width, height);
        engine.set_data(bytes)?;
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hard(mode: BrushMode) -> BrushSettings {
        BrushSettings {
            size: 10.0,
            hardness: 100.0,
            flow: 100.0,
            mode,
        }
    }

    #[test]
    fn test_add_then_subtract_restores_blank_raster() {
        let mut engine = BrushEngine::new(64, 64);
        let path = [(10.0, 10.0), (30.0, 12.0), (50.0, 40.0)];

        for mode in [BrushMode::Add, BrushMode::Subtract] {
            let settings = hard(mode);
            engine.start_stroke(path[0].0, path[0].1, &settings);
            for &(x, y) in &path[1..] {
                engine.continue_stroke(x, y, &settings);
            }
            engine.end_stroke();
            if mode == BrushMode::Add {
                assert!(!engine.is_blank());
            }
        }
        assert!(engine.is_blank());
    }

    #[test]
    fn test_fast_motion_leaves_no_gaps() {
        let mut engine = BrushEngine::new(200, 20);
        let settings = hard(BrushMode::Add);
        engine.start_stroke(5.0, 10.0, &settings);
        engine.continue_stroke(195.0, 10.0, &settings);
        for x in 5..195 {
            assert_eq!(engine.data()[(10 * 200 + x) as usize], 255, "gap at x={x}");
        }
    }

    #[test]
    fn test_continue_while_idle_is_ignored() {
        let mut engine = BrushEngine::new(32, 32);
        engine.continue_stroke(16.0, 16.0, &hard(BrushMode::Add));
        assert!(engine.is_blank());
    }

    #[test]
    fn test_restart_while_painting_keeps_last_stroke() {
        let mut engine = BrushEngine::new(100, 20);
        let settings = hard(BrushMode::Add);
        engine.start_stroke(10.0, 10.0, &settings);
        engine.start_stroke(80.0, 10.0, &settings);
        engine.continue_stroke(90.0, 10.0, &settings);
        assert!(engine.is_painting());
        // No segment was drawn between the two start points.
        assert_eq!(engine.data()[10 * 100 + 45], 0);
        assert_eq!(engine.data()[10 * 100 + 85], 255);
    }

    #[test]
    fn test_soft_brush_falls_off_toward_edge() {
        let settings = BrushSettings {
            size: 20.0,
            hardness: 50.0,
            flow: 100.0,
            mode: BrushMode::Add,
        };
        assert_eq!(settings.falloff(2.0), 1.0);
        assert!((settings.falloff(7.5) - 0.5).abs() < 1e-6);
        assert_eq!(settings.falloff(11.0), 0.0);
    }

    #[test]
    fn test_flow_limits_single_stamp() {
        let mut engine = BrushEngine::new(16, 16);
        let settings = BrushSettings {
            flow: 50.0,
            ..hard(BrushMode::Add)
        };
        engine.start_stroke(8.0, 8.0, &settings);
        assert_eq!(engine.data()[8 * 16 + 8], 128);
    }

    #[test]
    fn test_resize_rescales_content() {
        let mut engine = BrushEngine::new(10, 10);
        engine.set_data(vec![255; 100]).unwrap();
        engine.resize(20, 5);
        assert_eq!((engine.width(), engine.height()), (20, 5));
        assert!(engine.data().iter().all(|&a| a == 255));
    }

    #[test]
    fn test_set_data_rejects_wrong_length() {
        let mut engine = BrushEngine::new(4, 4);
        assert!(engine.set_data(vec![0; 15]).is_err());
    }

    #[test]
    fn test_base64_restores_raster() {
        let mut engine = BrushEngine::new(8, 8);
        engine.start_stroke(4.0, 4.0, &hard(BrushMode::Add));
        let restored = BrushEngine::from_base64(8, 8, &engine.to_base64()).unwrap();
        assert_eq!(restored.data(), engine.data());
    }
}
