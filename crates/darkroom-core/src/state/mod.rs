//! The edit-state data model.
//!
//! Every field is plain data and serializes to the camelCase JSON tree used
//! for persistence, presets and history snapshots. Values are clamped at the
//! model boundary (setters, [`EditState::clamp_ranges`], deserialization via
//! [`EditState::from_json`]); downstream stages assume validated ranges.

pub mod basic;
pub mod color;
pub mod crop;
pub mod effects;
pub mod mask;
pub mod tone_curve;

use serde::{Deserialize, Serialize};

pub use basic::{BasicAdjustments, BasicField, PartialBasic};
pub use color::{ColorGradingState, ColorWheel, HslAdjustments, HslValues, HueBand, WheelKind};
pub use crop::{AspectRatio, CropState};
pub use effects::{
    DetailState, EffectsState, GrainSettings, NoiseReductionSettings, SharpeningSettings,
    VignetteSettings,
};
pub use mask::{
    LinearGradientData, MaskId, MaskKind, MaskLayer, MaskUpdate, RadialGradientData,
};
pub use tone_curve::{CurveChannel, CurvePoint, ToneCurveState};

use crate::error::CoreError;

/// Clamp into `[min, max]`, mapping NaN to the in-range value nearest zero.
pub(crate) fn clamp_value(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        0.0_f32.clamp(min, max)
    } else {
        value.clamp(min, max)
    }
}

/// The full set of adjustment parameters for one image.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditState {
    pub basic: BasicAdjustments,
    pub tone_curve: ToneCurveState,
    pub hsl: HslAdjustments,
    pub color_grading: ColorGradingState,
    pub effects: EffectsState,
    pub detail: DetailState,
    pub crop: CropState,
    pub masks: Vec<MaskLayer>,
    pub active_mask_id: Option<MaskId>,
}

impl EditState {
    /// Clamp every field into its documented range.
    pub fn clamp_ranges(&mut self) {
        self.basic.clamp_ranges();
        self.tone_curve.clamp_ranges();
        self.hsl.clamp_ranges();
        self.color_grading.clamp_ranges();
        self.effects.clamp_ranges();
        self.detail.clamp_ranges();
        self.crop.clamp_ranges();
        for mask in &mut self.masks {
            mask.clamp_ranges();
        }
        if self.active_mask_id.is_some_and(|id| self.mask(id).is_none()) {
            self.active_mask_id = None;
        }
    }

    /// Parse and clamp.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let mut state: EditState = serde_json::from_str(json)?;
        state.clamp_ranges();
        Ok(state)
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn mask(&self, id: MaskId) -> Option<&MaskLayer> {
        self.masks.iter().find(|m| m.id == id)
    }

    pub fn mask_mut(&mut self, id: MaskId) -> Option<&mut MaskLayer> {
        self.masks.iter_mut().find(|m| m.id == id)
    }

    pub fn active_mask(&self) -> Option<&MaskLayer> {
        self.active_mask_id.and_then(|id| self.mask(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_round_trips_through_json() {
        let state = EditState::default();
        let json = state.to_json().unwrap();
        assert!(json.contains("\"toneCurve\""));
        assert!(json.contains("\"activeMaskId\":null"));
        assert_eq!(EditState::from_json(&json).unwrap(), state);
    }

    #[test]
    fn test_from_json_clamps_out_of_range_values() {
        let state = EditState::from_json(
            r#"{"basic":{"exposure":12,"saturation":-250},
                "effects":{"vignette":{"amount":180}}}"#,
        )
        .unwrap();
        assert_eq!(state.basic.exposure, 5.0);
        assert_eq!(state.basic.saturation, -100.0);
        assert_eq!(state.effects.vignette.amount, 100.0);
        assert_eq!(state.effects.vignette.midpoint, 50.0);
    }

    #[test]
    fn test_dangling_active_mask_is_cleared() {
        let mut state = EditState {
            active_mask_id: Some(MaskId::new()),
            ..Default::default()
        };
        state.clamp_ranges();
        assert_eq!(state.active_mask_id, None);
    }

    #[test]
    fn test_mask_lookup_by_id() {
        let layer = MaskLayer::new(MaskKind::Brush, "Mask 1");
        let id = layer.id;
        let state = EditState {
            masks: vec![layer],
            active_mask_id: Some(id),
            ..Default::default()
        };
        assert_eq!(state.active_mask().map(|m| m.name.as_str()), Some("Mask 1"));
        assert!(state.mask(MaskId::new()).is_none());
    }
}
