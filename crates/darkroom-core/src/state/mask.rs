//! Mask layer descriptors.
//!
//! A layer's coverage comes from its [`MaskKind`]: a painted brush raster
//! (owned outside the edit state) or a gradient generated from the
//! descriptor carried by the variant.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::basic::PartialBasic;
use super::clamp_value;

/// Opaque, unique mask identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaskId(pub Uuid);

impl MaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Radial gradient in normalized image coordinates.
///
/// Radii are fractions of the image's longest edge. `aspect_ratio`
/// stretches the ellipse horizontally, `rotation` is in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RadialGradientData {
    pub center_x: f32,
    pub center_y: f32,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub aspect_ratio: f32,
    pub rotation: f32,
    pub inverted: bool,
}

impl Default for RadialGradientData {
    fn default() -> Self {
        Self {
            center_x: 0.5,
            center_y: 0.5,
            inner_radius: 0.1,
            outer_radius: 0.4,
            aspect_ratio: 1.0,
            rotation: 0.0,
            inverted: false,
        }
    }
}

impl RadialGradientData {
    pub fn clamp_ranges(&mut self) {
        self.center_x = clamp_value(self.center_x, 0.0, 1.0);
        self.center_y = clamp_value(self.center_y, 0.0, 1.0);
        self.inner_radius = clamp_value(self.inner_radius, 0.0, 2.0);
        self.outer_radius = clamp_value(self.outer_radius, self.inner_radius, 2.0);
        self.aspect_ratio = clamp_value(self.aspect_ratio, 0.1, 10.0);
        self.rotation = clamp_value(self.rotation, -360.0, 360.0);
    }
}

/// Linear gradient along the start → end vector.
///
/// `feather` is the transition width as a fraction of the vector length,
/// centered on its midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinearGradientData {
    pub start_x: f32,
    pub start_y: f32,
    pub end_x: f32,
    pub end_y: f32,
    pub feather: f32,
    pub inverted: bool,
}

impl Default for LinearGradientData {
    fn default() -> Self {
        Self {
            start_x: 0.3,
            start_y: 0.5,
            end_x: 0.7,
            end_y: 0.5,
            feather: 0.2,
            inverted: false,
        }
    }
}

impl LinearGradientData {
    pub fn clamp_ranges(&mut self) {
        self.start_x = clamp_value(self.start_x, 0.0, 1.0);
        self.start_y = clamp_value(self.start_y, 0.0, 1.0);
        self.end_x = clamp_value(self.end_x, 0.0, 1.0);
        self.end_y = clamp_value(self.end_y, 0.0, 1.0);
        self.feather = clamp_value(self.feather, 0.0, 1.0);
    }
}

/// Closed set of mask sources.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaskKind {
    Brush,
    RadialGradient(RadialGradientData),
    LinearGradient(LinearGradientData),
}

impl MaskKind {
    /// Serialized `type` tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Brush => "brush",
            Self::RadialGradient(_) => "radialGradient",
            Self::LinearGradient(_) => "linearGradient",
        }
    }

    pub fn same_variant(&self, other: &MaskKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// One local adjustment layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MaskLayerRepr", into = "MaskLayerRepr")]
pub struct MaskLayer {
    pub id: MaskId,
    pub name: String,
    pub kind: MaskKind,
    pub enabled: bool,
    /// Blend strength of the local adjustments, 0..1.
    pub opacity: f32,
    /// Edge softening, 0..100.
    pub feather: f32,
    pub inverted: bool,
    pub adjustments: PartialBasic,
}

impl MaskLayer {
    pub fn new(kind: MaskKind, name: impl Into<String>) -> Self {
        Self {
            id: MaskId::new(),
            name: name.into(),
            kind,
            enabled: true,
            opacity: 1.0,
            feather: 0.0,
            inverted: false,
            adjustments: PartialBasic::default(),
        }
    }

    pub fn clamp_ranges(&mut self) {
        self.opacity = clamp_value(self.opacity, 0.0, 1.0);
        self.feather = clamp_value(self.feather, 0.0, 100.0);
        self.adjustments.clamp_ranges();
        match &mut self.kind {
            MaskKind::Brush => {}
            MaskKind::RadialGradient(data) => data.clamp_ranges(),
            MaskKind::LinearGradient(data) => data.clamp_ranges(),
        }
    }

    /// Apply the present fields of `update`. A gradient payload of a
    /// different variant than the layer's own is ignored.
    pub fn apply_update(&mut self, update: &MaskUpdate) {
        if let Some(name) = &update.name {
            self.name.clone_from(name);
        }
        if let Some(enabled) = update.enabled {
            self.enabled = enabled;
        }
        if let Some(opacity) = update.opacity {
            self.opacity = opacity;
        }
        if let Some(feather) = update.feather {
            self.feather = feather;
        }
        if let Some(inverted) = update.inverted {
            self.inverted = inverted;
        }
        if let Some(adjustments) = update.adjustments {
            self.adjustments = adjustments;
        }
        if let Some(kind) = update.kind {
            if self.kind.same_variant(&kind) {
                self.kind = kind;
            } else {
                tracing::debug!(
                    "Ignoring {} payload for {} mask {}",
                    kind.tag(),
                    self.kind.tag(),
                    self.id
                );
            }
        }
        self.clamp_ranges();
    }
}

/// Partial update of a mask layer; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaskUpdate {
    pub name: Option<String>,
    pub enabled: Option<bool>,
    pub opacity: Option<f32>,
    pub feather: Option<f32>,
    pub inverted: Option<bool>,
    pub adjustments: Option<PartialBasic>,
    pub kind: Option<MaskKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum MaskType {
    Brush,
    RadialGradient,
    LinearGradient,
}

/// Flat wire form with a `type` tag and optional `gradientData`.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MaskLayerRepr {
    id: MaskId,
    name: String,
    #[serde(rename = "type")]
    mask_type: MaskType,
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default = "default_opacity")]
    opacity: f32,
    #[serde(default)]
    feather: f32,
    #[serde(default)]
    inverted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gradient_data: Option<serde_json::Value>,
    #[serde(default)]
    adjustments: PartialBasic,
}

fn default_true() -> bool {
    true
}

fn default_opacity() -> f32 {
    1.0
}

impl TryFrom<MaskLayerRepr> for MaskLayer {
    type Error = serde_json::Error;

    fn try_from(repr: MaskLayerRepr) -> Result<Self, Self::Error> {
        let kind = match repr.mask_type {
            MaskType::Brush => MaskKind::Brush,
            MaskType::RadialGradient => MaskKind::RadialGradient(match repr.gradient_data {
                Some(value) => serde_json::from_value(value)?,
                None => RadialGradientData::default(),
            }),
            MaskType::LinearGradient => MaskKind::LinearGradient(match repr.gradient_data {
                Some(value) => serde_json::from_value(value)?,
                None => LinearGradientData::default(),
            }),
        };
        Ok(Self {
            id: repr.id,
            name: repr.name,
            kind,
            enabled: repr.enabled,
            opacity: repr.opacity,
            feather: repr.feather,
            inverted: repr.inverted,
            adjustments: repr.adjustments,
        })
    }
}

/// Gradient payload for the wire form. Values are clamped first, so
/// non-finite coordinates are written as their clamped replacements.
fn gradient_value<T: Serialize>(id: MaskId, data: &T) -> Option<serde_json::Value> {
    match serde_json::to_value(data) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Dropping gradient data of mask {id}: {e}");
            None
        }
    }
}

impl From<MaskLayer> for MaskLayerRepr {
    fn from(layer: MaskLayer) -> Self {
        let (mask_type, gradient_data) = match layer.kind {
            MaskKind::Brush => (MaskType::Brush, None),
            MaskKind::RadialGradient(mut data) => {
                data.clamp_ranges();
                (MaskType::RadialGradient, gradient_value(layer.id, &data))
            }
            MaskKind::LinearGradient(mut data) => {
                data.clamp_ranges();
                (MaskType::LinearGradient, gradient_value(layer.id, &data))
            }
        };
        Self {
            id: layer.id,
            name: layer.name,
            mask_type,
            enabled: layer.enabled,
            opacity: layer.opacity,
            feather: layer.feather,
            inverted: layer.inverted,
            gradient_data,
            adjustments: layer.adjustments,
        }
    }
}
