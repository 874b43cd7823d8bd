//! Turning mask layers into per-pixel coverage for rendering.
//!
//! Every enabled layer with local adjustments is composited, in list order,
//! whichever layer is active. The active layer additionally provides the
//! editor overlay.

use image::{ImageBuffer, Luma, imageops};

use super::BrushRasters;
use super::gradient::{linear_mask, radial_mask};
use crate::state::basic::BasicAdjustments;
use crate::state::mask::{MaskId, MaskKind, MaskLayer};
use crate::state::EditState;

/// Most local layers a single frame renders.
pub const MAX_LOCAL_MASKS: usize = 8;

/// Feather blur sigma at feather 100, as a fraction of the long edge.
const FEATHER_SIGMA_SCALE: f32 = 0.01;

/// One mask ready for the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeLayer {
    pub id: MaskId,
    /// Local adjustments with absent keys read as zero.
    pub adjustments: BasicAdjustments,
    pub opacity: f32,
    /// Row-major coverage in 0..1 at render resolution.
    pub coverage: Vec<f32>,
}

impl CompositeLayer {
    /// Blend weight at pixel `idx`.
    pub fn weight(&self, idx: usize) -> f32 {
        self.coverage.get(idx).copied().unwrap_or(0.0) * self.opacity
    }
}

fn bytes_to_coverage(bytes: &[u8]) -> Vec<f32> {
    bytes.iter().map(|&a| a as f32 / 255.0).collect()
}

fn feather(coverage: Vec<f32>, width: u32, height: u32, amount: f32) -> Vec<f32> {
    let sigma = amount / 100.0 * FEATHER_SIGMA_SCALE * width.max(height) as f32;
    if sigma <= 0.0 {
        return coverage;
    }
    let Some(buffer) = ImageBuffer::<Luma<f32>, Vec<f32>>::from_raw(width, height, coverage.clone())
    else {
        return coverage;
    };
    imageops::blur(&buffer, sigma).into_raw()
}

/// Coverage of one layer after feathering and inversion.
///
/// A brush layer without a raster covers nothing.
pub fn layer_coverage(layer: &MaskLayer, brushes: &BrushRasters, width: u32, height: u32) -> Vec<f32> {
    let pixels = width as usize * height as usize;
    let raw = match &layer.kind {
        MaskKind::Brush => match brushes.get(&layer.id) {
            Some(engine) => engine.coverage(width, height),
            None => vec![0.0; pixels],
        },
        MaskKind::RadialGradient(data) => bytes_to_coverage(&radial_mask(width, height, data)),
        MaskKind::LinearGradient(data) => bytes_to_coverage(&linear_mask(width, height, data)),
    };
    let mut coverage = if layer.feather > 0.0 {
        feather(raw, width, height, layer.feather)
    } else {
        raw
    };
    if layer.inverted {
        for c in &mut coverage {
            *c = 1.0 - *c;
        }
    }
    coverage
}

/// Build the layers that contribute to a rendered frame.
///
/// Disabled layers, fully transparent layers and layers without local
/// adjustments are skipped. Layers beyond [`MAX_LOCAL_MASKS`] are dropped.
pub fn build_layers(
    state: &EditState,
    brushes: &BrushRasters,
    width: u32,
    height: u32,
) -> Vec<CompositeLayer> {
    let contributing: Vec<&MaskLayer> = state
        .masks
        .iter()
        .filter(|m| m.enabled && m.opacity > 0.0 && !m.adjustments.is_empty())
        .collect();
    if contributing.len() > MAX_LOCAL_MASKS {
        tracing::warn!(
            "{} masks enabled, only the first {MAX_LOCAL_MASKS} are rendered",
            contributing.len()
        );
    }
    contributing
        .into_iter()
        .take(MAX_LOCAL_MASKS)
        .map(|layer| CompositeLayer {
            id: layer.id,
            adjustments: layer.adjustments.resolve(),
            opacity: layer.opacity,
            coverage: layer_coverage(layer, brushes, width, height),
        })
        .collect()
}

/// Overlay alpha for the active mask, if any.
pub fn overlay_for_active(
    state: &EditState,
    brushes: &BrushRasters,
    width: u32,
    height: u32,
) -> Option<Vec<u8>> {
    let layer = state.active_mask()?;
    let coverage = layer_coverage(layer, brushes, width, height);
    Some(
        coverage
            .into_iter()
            .map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::brush::{BrushEngine, BrushMode, BrushSettings};
    use crate::state::basic::PartialBasic;
    use crate::state::mask::RadialGradientData;

    fn layer_with_exposure(kind: MaskKind) -> MaskLayer {
        let mut layer = MaskLayer::new(kind, "Mask");
        layer.adjustments = PartialBasic {
            exposure: Some(1.0),
            ..Default::default()
        };
        layer
    }

    #[test]
    fn test_disabled_and_empty_layers_are_skipped() {
        let mut disabled = layer_with_exposure(MaskKind::Brush);
        disabled.enabled = false;
        let empty = MaskLayer::new(MaskKind::Brush, "Empty");
        let live = layer_with_exposure(MaskKind::RadialGradient(RadialGradientData::default()));
        let live_id = live.id;
        let state = EditState {
            masks: vec![disabled, empty, live],
            ..Default::default()
        };
        let layers = build_layers(&state, &BrushRasters::new(), 16, 16);
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].id, live_id);
        assert_eq!(layers[0].adjustments.exposure, 1.0);
        assert_eq!(layers[0].adjustments.contrast, 0.0);
    }

    #[test]
    fn test_inactive_layers_still_render() {
        let a = layer_with_exposure(MaskKind::Brush);
        let b = layer_with_exposure(MaskKind::Brush);
        let state = EditState {
            active_mask_id: Some(b.id),
            masks: vec![a, b],
            ..Default::default()
        };
        assert_eq!(build_layers(&state, &BrushRasters::new(), 4, 4).len(), 2);
    }

    #[test]
    fn test_layer_count_is_capped() {
        let state = EditState {
            masks: (0..MAX_LOCAL_MASKS + 3)
                .map(|_| layer_with_exposure(MaskKind::Brush))
                .collect(),
            ..Default::default()
        };
        assert_eq!(
            build_layers(&state, &BrushRasters::new(), 4, 4).len(),
            MAX_LOCAL_MASKS
        );
    }

    #[test]
    fn test_layer_inversion_complements_coverage() {
        let mut layer = layer_with_exposure(MaskKind::Brush);
        let mut engine = BrushEngine::new(8, 8);
        engine.set_data(vec![255; 64]).unwrap();
        let mut brushes = BrushRasters::new();
        brushes.insert(layer.id, engine);
        assert!(layer_coverage(&layer, &brushes, 8, 8).iter().all(|&c| c == 1.0));
        layer.inverted = true;
        assert!(layer_coverage(&layer, &brushes, 8, 8).iter().all(|&c| c == 0.0));
    }

    #[test]
    fn test_feather_softens_hard_edge() {
        let mut layer = layer_with_exposure(MaskKind::Brush);
        let mut engine = BrushEngine::new(100, 1);
        engine.start_stroke(
            75.0,
            0.5,
            &BrushSettings {
                size: 50.0,
                hardness: 100.0,
                flow: 100.0,
                mode: BrushMode::Add,
            },
        );
        let mut brushes = BrushRasters::new();
        brushes.insert(layer.id, engine);
        let hard = layer_coverage(&layer, &brushes, 100, 1);
        layer.feather = 100.0;
        let soft = layer_coverage(&layer, &brushes, 100, 1);
        assert_eq!(hard[49], 0.0);
        assert!(soft[49] > 0.0 && soft[49] < 1.0, "{}", soft[49]);
    }

    #[test]
    fn test_overlay_follows_active_mask() {
        let layer = layer_with_exposure(MaskKind::RadialGradient(RadialGradientData::default()));
        let mut state = EditState {
            masks: vec![layer.clone()],
            ..Default::default()
        };
        assert!(overlay_for_active(&state, &BrushRasters::new(), 10, 10).is_none());
        state.active_mask_id = Some(layer.id);
        let overlay = overlay_for_active(&state, &BrushRasters::new(), 10, 10).unwrap();
        assert_eq!(overlay.len(), 100);
    }
}
