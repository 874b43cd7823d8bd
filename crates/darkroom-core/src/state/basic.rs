//! Global basic adjustments and their partial (mask / preset) form.

use serde::{Deserialize, Serialize};

use super::clamp_value;

/// The thirteen global tone and color sliders.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BasicAdjustments {
    pub exposure: f32,
    pub contrast: f32,
    pub highlights: f32,
    pub shadows: f32,
    pub whites: f32,
    pub blacks: f32,
    pub texture: f32,
    pub clarity: f32,
    pub dehaze: f32,
    pub temperature: f32,
    pub tint: f32,
    pub vibrance: f32,
    pub saturation: f32,
}

/// Closed set of addressable basic fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicField {
    Exposure,
    Contrast,
    Highlights,
    Shadows,
    Whites,
    Blacks,
    Texture,
    Clarity,
    Dehaze,
    Temperature,
    Tint,
    Vibrance,
    Saturation,
}

impl BasicField {
    pub const ALL: [BasicField; 13] = [
        Self::Exposure,
        Self::Contrast,
        Self::Highlights,
        Self::Shadows,
        Self::Whites,
        Self::Blacks,
        Self::Texture,
        Self::Clarity,
        Self::Dehaze,
        Self::Temperature,
        Self::Tint,
        Self::Vibrance,
        Self::Saturation,
    ];

    /// Inclusive `(min, max)` bound of the field.
    pub fn range(self) -> (f32, f32) {
        match self {
            Self::Exposure => (-5.0, 5.0),
            Self::Tint => (-150.0, 150.0),
            _ => (-100.0, 100.0),
        }
    }

    /// Clamp a raw value into the field's range. NaN maps to 0.
    pub fn clamp(self, value: f32) -> f32 {
        let (min, max) = self.range();
        clamp_value(value, min, max)
    }

    /// Serialized key of the field.
    pub fn key(self) -> &'static str {
        match self {
            Self::Exposure => "exposure",
            Self::Contrast => "contrast",
            Self::Highlights => "highlights",
            Self::Shadows => "shadows",
            Self::Whites => "whites",
            Self::Blacks => "blacks",
            Self::Texture => "texture",
            Self::Clarity => "clarity",
            Self::Dehaze => "dehaze",
            Self::Temperature => "temperature",
            Self::Tint => "tint",
            Self::Vibrance => "vibrance",
            Self::Saturation => "saturation",
        }
    }

    /// Look up a field by its serialized key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl BasicAdjustments {
    fn slot_mut(&mut self, field: BasicField) -> &mut f32 {
        match field {
            BasicField::Exposure => &mut self.exposure,
            BasicField::Contrast => &mut self.contrast,
            BasicField::Highlights => &mut self.highlights,
            BasicField::Shadows => &mut self.shadows,
            BasicField::Whites => &mut self.whites,
            BasicField::Blacks => &mut self.blacks,
            BasicField::Texture => &mut self.texture,
            BasicField::Clarity => &mut self.clarity,
            BasicField::Dehaze => &mut self.dehaze,
            BasicField::Temperature => &mut self.temperature,
            BasicField::Tint => &mut self.tint,
            BasicField::Vibrance => &mut self.vibrance,
            BasicField::Saturation => &mut self.saturation,
        }
    }

    pub fn get(&self, field: BasicField) -> f32 {
        match field {
            BasicField::Exposure => self.exposure,
            BasicField::Contrast => self.contrast,
            BasicField::Highlights => self.highlights,
            BasicField::Shadows => self.shadows,
            BasicField::Whites => self.whites,
            BasicField::Blacks => self.blacks,
            BasicField::Texture => self.texture,
            BasicField::Clarity => self.clarity,
            BasicField::Dehaze => self.dehaze,
            BasicField::Temperature => self.temperature,
            BasicField::Tint => self.tint,
            BasicField::Vibrance => self.vibrance,
            BasicField::Saturation => self.saturation,
        }
    }

    /// Set a field, clamping to its documented range.
    pub fn set(&mut self, field: BasicField, value: f32) {
        *self.slot_mut(field) = field.clamp(value);
    }

    pub fn clamp_ranges(&mut self) {
        for field in BasicField::ALL {
            let v = self.get(field);
            self.set(field, v);
        }
    }

    /// `true` when every field is zero.
    pub fn is_neutral(&self) -> bool {
        BasicField::ALL.iter().all(|&f| self.get(f) == 0.0)
    }
}

/// Basic adjustments where each key may be absent.
///
/// Used for mask-local adjustments and for preset / assistant payloads.
/// Absent keys are not serialized.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialBasic {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposure: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadows: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whites: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blacks: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texture: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clarity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dehaze: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tint: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vibrance: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturation: Option<f32>,
}

impl PartialBasic {
    fn slot_mut(&mut self, field: BasicField) -> &mut Option<f32> {
        match field {
            BasicField::Exposure => &mut self.exposure,
            BasicField::Contrast => &mut self.contrast,
            BasicField::Highlights => &mut self.highlights,
            BasicField::Shadows => &mut self.shadows,
            BasicField::Whites => &mut self.whites,
            BasicField::Blacks => &mut self.blacks,
            BasicField::Texture => &mut self.texture,
            BasicField::Clarity => &mut self.clarity,
            BasicField::Dehaze => &mut self.dehaze,
            BasicField::Temperature => &mut self.temperature,
            BasicField::Tint => &mut self.tint,
            BasicField::Vibrance => &mut self.vibrance,
            BasicField::Saturation => &mut self.saturation,
        }
    }

    pub fn get(&self, field: BasicField) -> Option<f32> {
        let mut copy = *self;
        *copy.slot_mut(field)
    }

    /// Set or clear a key. Present values are clamped.
    pub fn set(&mut self, field: BasicField, value: Option<f32>) {
        *self.slot_mut(field) = value.map(|v| field.clamp(v));
    }

    pub fn is_empty(&self) -> bool {
        BasicField::ALL.iter().all(|&f| self.get(f).is_none())
    }

    pub fn clamp_ranges(&mut self) {
        for field in BasicField::ALL {
            let v = self.get(field);
            self.set(field, v);
        }
    }

    /// Overwrite every present key on `target`.
    pub fn apply_to(&self, target: &mut BasicAdjustments) {
        for field in BasicField::ALL {
            if let Some(v) = self.get(field) {
                target.set(field, v);
            }
        }
    }

    /// Full adjustments with absent keys read as zero.
    pub fn resolve(&self) -> BasicAdjustments {
        let mut out = BasicAdjustments::default();
        self.apply_to(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_clamps_every_field_to_bounds() {
        let mut basic = BasicAdjustments::default();
        for field in BasicField::ALL {
            let (min, max) = field.range();
            basic.set(field, max + 1000.0);
            assert_eq!(basic.get(field), max, "{} upper", field.key());
            basic.set(field, min - 1000.0);
            assert_eq!(basic.get(field), min, "{} lower", field.key());
        }
    }

    #[test]
    fn test_exposure_and_tint_have_distinct_ranges() {
        assert_eq!(BasicField::Exposure.range(), (-5.0, 5.0));
        assert_eq!(BasicField::Tint.range(), (-150.0, 150.0));
        assert_eq!(BasicField::Dehaze.range(), (-100.0, 100.0));
    }

    #[test]
    fn test_nan_maps_to_zero() {
        let mut basic = BasicAdjustments::default();
        basic.set(BasicField::Contrast, f32::NAN);
        assert_eq!(basic.contrast, 0.0);
    }

    #[test]
    fn test_deserialized_values_clamp_on_request() {
        let mut basic: BasicAdjustments =
            serde_json::from_str(r#"{"exposure": 9.0, "tint": -400}"#).unwrap();
        basic.clamp_ranges();
        assert_eq!(basic.exposure, 5.0);
        assert_eq!(basic.tint, -150.0);
        assert_eq!(basic.contrast, 0.0);
    }

    #[test]
    fn test_partial_apply_overwrites_present_keys_only() {
        let mut basic = BasicAdjustments {
            contrast: 20.0,
            saturation: -10.0,
            ..Default::default()
        };
        let partial = PartialBasic {
            contrast: Some(150.0),
            exposure: Some(0.5),
            ..Default::default()
        };
        partial.apply_to(&mut basic);
        assert_eq!(basic.contrast, 100.0);
        assert_eq!(basic.exposure, 0.5);
        assert_eq!(basic.saturation, -10.0);
    }

    #[test]
    fn test_partial_skips_absent_keys_when_serialized() {
        let partial = PartialBasic {
            exposure: Some(1.0),
            ..Default::default()
        };
        let json = serde_json::to_string(&partial).unwrap();
        assert_eq!(json, r#"{"exposure":1.0}"#);
    }

    #[test]
    fn test_field_key_lookup() {
        assert_eq!(BasicField::from_key("dehaze"), Some(BasicField::Dehaze));
        assert_eq!(BasicField::from_key("gamma"), None);
    }
}
