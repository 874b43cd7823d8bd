//! Partial adjustment payloads and the built-in preset library.
//!
//! [`apply_preset`] is the single merge entry point. Built-in presets and
//! any external collaborator that proposes edits go through it the same way.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::state::basic::PartialBasic;
use crate::state::color::{ColorWheel, HslValues, HueBand, WheelKind};
use crate::state::tone_curve::{CurveChannel, CurvePoint};
use crate::state::EditState;

const BUILTIN_PRESETS: &str = include_str!("../presets/builtin.json");

fn merge(target: &mut f32, value: Option<f32>) {
    if let Some(v) = value {
        *target = v;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialHslValues {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hue: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturation: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub luminance: Option<f32>,
}

impl PartialHslValues {
    fn apply_to(&self, target: &mut HslValues) {
        merge(&mut target.hue, self.hue);
        merge(&mut target.saturation, self.saturation);
        merge(&mut target.luminance, self.luminance);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialHsl {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub red: Option<PartialHslValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orange: Option<PartialHslValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yellow: Option<PartialHslValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub green: Option<PartialHslValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aqua: Option<PartialHslValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blue: Option<PartialHslValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purple: Option<PartialHslValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magenta: Option<PartialHslValues>,
}

impl PartialHsl {
    pub fn band(&self, band: HueBand) -> Option<&PartialHslValues> {
        match band {
            HueBand::Red => self.red.as_ref(),
            HueBand::Orange => self.orange.as_ref(),
            HueBand::Yellow => self.yellow.as_ref(),
            HueBand::Green => self.green.as_ref(),
            HueBand::Aqua => self.aqua.as_ref(),
            HueBand::Blue => self.blue.as_ref(),
            HueBand::Purple => self.purple.as_ref(),
            HueBand::Magenta => self.magenta.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialColorWheel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hue: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturation: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub luminance: Option<f32>,
}

impl PartialColorWheel {
    fn apply_to(&self, target: &mut ColorWheel) {
        merge(&mut target.hue, self.hue);
        merge(&mut target.saturation, self.saturation);
        merge(&mut target.luminance, self.luminance);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialColorGrading {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadows: Option<PartialColorWheel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub midtones: Option<PartialColorWheel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<PartialColorWheel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global: Option<PartialColorWheel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blending: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<f32>,
}

impl PartialColorGrading {
    pub fn wheel(&self, kind: WheelKind) -> Option<&PartialColorWheel> {
        match kind {
            WheelKind::Shadows => self.shadows.as_ref(),
            WheelKind::Midtones => self.midtones.as_ref(),
            WheelKind::Highlights => self.highlights.as_ref(),
            WheelKind::Global => self.global.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialToneCurve {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rgb: Option<Vec<CurvePoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub red: Option<Vec<CurvePoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub green: Option<Vec<CurvePoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blue: Option<Vec<CurvePoint>>,
}

impl PartialToneCurve {
    pub fn channel(&self, channel: CurveChannel) -> Option<&[CurvePoint]> {
        match channel {
            CurveChannel::Rgb => self.rgb.as_deref(),
            CurveChannel::Red => self.red.as_deref(),
            CurveChannel::Green => self.green.as_deref(),
            CurveChannel::Blue => self.blue.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialVignette {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub midpoint: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roundness: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feather: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialGrain {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roughness: Option<f32>,
}

/// A sparse set of adjustments. Absent keys leave the target untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialAdjustments {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic: Option<PartialBasic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hsl: Option<PartialHsl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_grading: Option<PartialColorGrading>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone_curve: Option<PartialToneCurve>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vignette: Option<PartialVignette>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grain: Option<PartialGrain>,
}

impl PartialAdjustments {
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Merge `partial` into a clone of `current` and clamp the result.
///
/// Tone curves from the payload are normalized like edited curves.
pub fn apply_preset(current: &EditState, partial: &PartialAdjustments) -> EditState {
    let mut next = current.clone();

    if let Some(basic) = &partial.basic {
        basic.apply_to(&mut next.basic);
    }
    if let Some(hsl) = &partial.hsl {
        for band in HueBand::ALL {
            if let Some(values) = hsl.band(band) {
                values.apply_to(next.hsl.band_mut(band));
            }
        }
    }
    if let Some(grading) = &partial.color_grading {
        for kind in WheelKind::ALL {
            if let Some(wheel) = grading.wheel(kind) {
                wheel.apply_to(next.color_grading.wheel_mut(kind));
            }
        }
        merge(&mut next.color_grading.blending, grading.blending);
        merge(&mut next.color_grading.balance, grading.balance);
    }
    if let Some(curve) = &partial.tone_curve {
        for channel in [
            CurveChannel::Rgb,
            CurveChannel::Red,
            CurveChannel::Green,
            CurveChannel::Blue,
        ] {
            if let Some(points) = curve.channel(channel) {
                next.tone_curve.set_points(channel, points);
            }
        }
    }
    if let Some(vignette) = &partial.vignette {
        let target = &mut next.effects.vignette;
        merge(&mut target.amount, vignette.amount);
        merge(&mut target.midpoint, vignette.midpoint);
        merge(&mut target.roundness, vignette.roundness);
        merge(&mut target.feather, vignette.feather);
    }
    if let Some(grain) = &partial.grain {
        let target = &mut next.effects.grain;
        merge(&mut target.amount, grain.amount);
        merge(&mut target.size, grain.size);
        merge(&mut target.roughness, grain.roughness);
    }

    next.clamp_ranges();
    next
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetCategory {
    Cinema,
    Bw,
    Vintage,
    Custom,
}

/// A named, reusable [`PartialAdjustments`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: PresetCategory,
    pub adjustments: PartialAdjustments,
}

/// The presets shipped with the engine.
pub fn builtin_presets() -> Result<Vec<Preset>, CoreError> {
    Ok(serde_json::from_str(BUILTIN_PRESETS)?)
}

/// Look up a built-in preset by name, ignoring case.
pub fn find_builtin(name: &str) -> Result<Option<Preset>, CoreError> {
    Ok(builtin_presets()?
        .into_iter()
        .find(|p| p.name.eq_ignore_ascii_case(name.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_keys_are_untouched() {
        let mut current = EditState::default();
        current.basic.exposure = 1.25;
        current.hsl.red.hue = 12.0;
        let partial = PartialAdjustments::from_json(r#"{"basic":{"contrast":30}}"#).unwrap();

        let next = apply_preset(&current, &partial);
        assert_eq!(next.basic.contrast, 30.0);
        assert_eq!(next.basic.exposure, 1.25);
        assert_eq!(next.hsl.red.hue, 12.0);
        // The input is not modified.
        assert_eq!(current.basic.contrast, 0.0);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let partial = PartialAdjustments::from_json(
            r#"{"basic":{"exposure":12,"saturation":-500},"grain":{"amount":250}}"#,
        )
        .unwrap();
        let next = apply_preset(&EditState::default(), &partial);
        assert_eq!(next.basic.exposure, 5.0);
        assert_eq!(next.basic.saturation, -100.0);
        assert_eq!(next.effects.grain.amount, 100.0);
    }

    #[test]
    fn test_nested_keys_merge_individually() {
        let mut current = EditState::default();
        current.color_grading.shadows.luminance = 20.0;
        let partial = PartialAdjustments::from_json(
            r#"{"colorGrading":{"shadows":{"hue":200,"saturation":25},"balance":-10}}"#,
        )
        .unwrap();
        let next = apply_preset(&current, &partial);
        assert_eq!(next.color_grading.shadows.hue, 200.0);
        assert_eq!(next.color_grading.shadows.saturation, 25.0);
        assert_eq!(next.color_grading.shadows.luminance, 20.0);
        assert_eq!(next.color_grading.balance, -10.0);
        assert_eq!(next.color_grading.blending, 50.0);
    }

    #[test]
    fn test_builtin_presets_parse() {
        let presets = builtin_presets().unwrap();
        assert_eq!(presets.len(), 9);
        for name in ["Teal & Orange", "Kodak Portra", "Acros", "Monochrome"] {
            assert!(presets.iter().any(|p| p.name == name), "missing {name}");
        }
    }

    #[test]
    fn test_monochrome_desaturates_fully() {
        let preset = find_builtin("monochrome").unwrap().unwrap();
        let next = apply_preset(&EditState::default(), &preset.adjustments);
        assert_eq!(next.basic.saturation, -100.0);
        assert_eq!(next.basic.contrast, 15.0);
    }

    #[test]
    fn test_preset_tone_curve_is_applied() {
        let preset = find_builtin("Muted Film").unwrap().unwrap();
        let next = apply_preset(&EditState::default(), &preset.adjustments);
        assert_eq!(next.tone_curve.rgb.len(), 3);
        assert_eq!(next.tone_curve.rgb[0], CurvePoint::new(0.0, 0.08));
        assert!(!next.tone_curve.is_identity());
    }

    #[test]
    fn test_unknown_preset_is_none() {
        assert!(find_builtin("Velvia 100").unwrap().is_none());
    }
}
