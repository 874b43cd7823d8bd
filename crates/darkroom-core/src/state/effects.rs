//! Vignette, grain, sharpening and noise reduction settings.

use serde::{Deserialize, Serialize};

use super::clamp_value;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VignetteSettings {
    pub amount: f32,
    pub midpoint: f32,
    pub roundness: f32,
    pub feather: f32,
}

impl Default for VignetteSettings {
    fn default() -> Self {
        Self {
            amount: 0.0,
            midpoint: 50.0,
            roundness: 0.0,
            feather: 50.0,
        }
    }
}

impl VignetteSettings {
    pub fn clamp_ranges(&mut self) {
        self.amount = clamp_value(self.amount, -100.0, 100.0);
        self.midpoint = clamp_value(self.midpoint, 0.0, 100.0);
        self.roundness = clamp_value(self.roundness, -100.0, 100.0);
        self.feather = clamp_value(self.feather, 0.0, 100.0);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrainSettings {
    pub amount: f32,
    pub size: f32,
    pub roughness: f32,
}

impl Default for GrainSettings {
    fn default() -> Self {
        Self {
            amount: 0.0,
            size: 25.0,
            roughness: 50.0,
        }
    }
}

impl GrainSettings {
    pub fn clamp_ranges(&mut self) {
        self.amount = clamp_value(self.amount, 0.0, 100.0);
        self.size = clamp_value(self.size, 0.0, 100.0);
        self.roughness = clamp_value(self.roughness, 0.0, 100.0);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsState {
    pub vignette: VignetteSettings,
    pub grain: GrainSettings,
}

impl EffectsState {
    pub fn clamp_ranges(&mut self) {
        self.vignette.clamp_ranges();
        self.grain.clamp_ranges();
    }
}

/// Sharpening parameters. Stored and persisted; not rendered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharpeningSettings {
    pub amount: f32,
    pub radius: f32,
    pub detail: f32,
    pub masking: f32,
}

impl Default for SharpeningSettings {
    fn default() -> Self {
        Self {
            amount: 0.0,
            radius: 1.0,
            detail: 25.0,
            masking: 0.0,
        }
    }
}

impl SharpeningSettings {
    pub fn clamp_ranges(&mut self) {
        self.amount = clamp_value(self.amount, 0.0, 150.0);
        self.radius = clamp_value(self.radius, 0.5, 3.0);
        self.detail = clamp_value(self.detail, 0.0, 100.0);
        self.masking = clamp_value(self.masking, 0.0, 100.0);
    }
}

/// Noise reduction parameters. Stored and persisted; not rendered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoiseReductionSettings {
    pub luminance: f32,
    pub luminance_detail: f32,
    pub color: f32,
    pub color_detail: f32,
}

impl Default for NoiseReductionSettings {
    fn default() -> Self {
        Self {
            luminance: 0.0,
            luminance_detail: 50.0,
            color: 25.0,
            color_detail: 50.0,
        }
    }
}

impl NoiseReductionSettings {
    pub fn clamp_ranges(&mut self) {
        self.luminance = clamp_value(self.luminance, 0.0, 100.0);
        self.luminance_detail = clamp_value(self.luminance_detail, 0.0, 100.0);
        self.color = clamp_value(self.color, 0.0, 100.0);
        self.color_detail = clamp_value(self.color_detail, 0.0, 100.0);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetailState {
    pub sharpening: SharpeningSettings,
    pub noise_reduction: NoiseReductionSettings,
}

impl DetailState {
    pub fn clamp_ranges(&mut self) {
        self.sharpening.clamp_ranges();
        self.noise_reduction.clamp_ranges();
    }
}
