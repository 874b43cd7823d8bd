//! Mask engine: painted brush rasters, gradient generators and compositing.

pub mod brush;
pub mod composite;
pub mod gradient;

use std::collections::BTreeMap;

pub use brush::{BrushEngine, BrushMode, BrushSettings};
pub use composite::{CompositeLayer, MAX_LOCAL_MASKS, build_layers, overlay_for_active};
pub use gradient::{linear_mask, radial_mask};

use crate::state::mask::MaskId;

/// Brush rasters of one image, keyed by mask id.
pub type BrushRasters = BTreeMap<MaskId, BrushEngine>;
