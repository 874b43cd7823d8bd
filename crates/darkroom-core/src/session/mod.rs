//! The editor session: imported images and the one that is current.
//!
//! Edits go to a live [`EditState`] owned by the session. Switching images
//! flushes the live state, history and brush rasters back into the
//! outgoing [`ImageItem`] and copies the incoming item's into the live
//! slots, so edits never leak between images. Every mutation raises a
//! render request that the frame loop drains with
//! [`Session::take_render_request`].

pub mod item;
pub mod store;

use std::path::Path;

pub use item::{FlagFilter, FlagStatus, ImageId, ImageItem, MAX_RATING};
pub use store::{MemoryStore, PersistedBrush, PersistedImage, SessionMetadata, SessionStore};

use crate::config::EngineConfig;
use crate::error::{CoreError, RenderError};
use crate::geometry::apply_crop;
use crate::history::{History, StrokeSnapshot};
use crate::image::{ImageSource, PhotoImage};
use crate::mask::{BrushEngine, BrushRasters, BrushSettings, CompositeLayer, build_layers};
use crate::pipeline::{FrameRenderer, FrameRequest};
use crate::preset::{PartialAdjustments, apply_preset};
use crate::state::basic::{BasicAdjustments, BasicField};
use crate::state::color::{ColorGradingState, ColorWheel, HslAdjustments, HslValues, HueBand, WheelKind};
use crate::state::crop::CropState;
use crate::state::effects::{
    DetailState, EffectsState, GrainSettings, NoiseReductionSettings, SharpeningSettings,
    VignetteSettings,
};
use crate::state::mask::{MaskId, MaskKind, MaskLayer, MaskUpdate};
use crate::state::tone_curve::{CurveChannel, CurvePoint, ToneCurveState};
use crate::state::{EditState, clamp_value};

fn mask_label(kind: &MaskKind) -> &'static str {
    match kind {
        MaskKind::Brush => "brush",
        MaskKind::RadialGradient(_) => "radial gradient",
        MaskKind::LinearGradient(_) => "linear gradient",
    }
}

#[derive(Debug)]
pub struct Session {
    config: EngineConfig,
    items: Vec<ImageItem>,
    current: Option<usize>,
    live: EditState,
    history: History,
    brushes: BrushRasters,
    brush_settings: BrushSettings,
    painting: Option<MaskId>,
    /// Raster of the painted mask as it was when the stroke began.
    stroke_before: Option<Vec<u8>>,
    filter_flag: FlagFilter,
    filter_rating: u8,
    render_requested: bool,
}

impl Session {
    pub fn new(config: EngineConfig) -> Self {
        let history = History::new(config.max_history);
        Self {
            config,
            items: Vec::new(),
            current: None,
            live: EditState::default(),
            history,
            brushes: BrushRasters::new(),
            brush_settings: BrushSettings::default(),
            painting: None,
            stroke_before: None,
            filter_flag: FlagFilter::All,
            filter_rating: 0,
            render_requested: false,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── Images ──────────────────────────────────────────────────

    /// Decode a file, build its proxy and make it current.
    pub fn import_image(&mut self, path: impl AsRef<Path>) -> Result<ImageId, CoreError> {
        let path = path.as_ref();
        let source = ImageSource::load(path, self.config.max_proxy_edge)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(self.add_source(file_name, source))
    }

    /// Add already decoded buffers and make the new image current.
    pub fn add_source(&mut self, file_name: impl Into<String>, source: ImageSource) -> ImageId {
        let item = ImageItem::new(file_name, source, self.config.max_history);
        let id = item.id;
        tracing::info!("Imported {} ({id})", item.file_name);
        self.items.push(item);
        self.switch_to(self.items.len() - 1);
        id
    }

    /// Remove an image. Removing the current image makes its neighbor
    /// current. Returns `false` for an unknown index.
    pub fn remove_image(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        let removed = self.items.remove(index);
        tracing::debug!("Removed {} ({})", removed.file_name, removed.id);

        match self.current {
            Some(current) if current == index => {
                self.current = None;
                self.painting = None;
                self.stroke_before = None;
                if self.items.is_empty() {
                    self.live = EditState::default();
                    self.history = History::new(self.config.max_history);
                    self.brushes.clear();
                    self.render_requested = true;
                } else {
                    self.load(index.min(self.items.len() - 1));
                }
            }
            Some(current) if current > index => self.current = Some(current - 1),
            _ => {}
        }
        true
    }

    /// Make another image current. Returns `false` for an unknown index.
    pub fn switch_to(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        if self.current == Some(index) {
            return true;
        }
        self.flush();
        self.load(index);
        true
    }

    /// Copy the live state, history and brush rasters into the current item.
    pub fn flush(&mut self) {
        let Some(index) = self.current else {
            return;
        };
        if let Some(painting) = self.painting {
            tracing::debug!("Ending unfinished stroke on mask {painting}");
            self.end_stroke();
        }
        let item = &mut self.items[index];
        item.edit_state = self.live.clone();
        item.history = self.history.clone();
        item.brushes = self.brushes.clone();
    }

    fn load(&mut self, index: usize) {
        let item = &self.items[index];
        self.live = item.edit_state.clone();
        self.history = item.history.clone();
        self.brushes = item.brushes.clone();
        self.current = Some(index);
        self.painting = None;
        self.stroke_before = None;
        self.render_requested = true;
        tracing::debug!("Switched to {} ({})", item.file_name, item.id);
    }

    pub fn images(&self) -> &[ImageItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_item(&self) -> Option<&ImageItem> {
        self.current.map(|i| &self.items[i])
    }

    /// Edit state of any image, live for the current one.
    pub fn item_state(&self, index: usize) -> Option<&EditState> {
        if self.current == Some(index) {
            return Some(&self.live);
        }
        self.items.get(index).map(|item| &item.edit_state)
    }

    pub fn edit_state(&self) -> &EditState {
        &self.live
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn brushes(&self) -> &BrushRasters {
        &self.brushes
    }

    /// Returns and clears the pending render request.
    pub fn take_render_request(&mut self) -> bool {
        std::mem::take(&mut self.render_requested)
    }

    fn touch(&mut self) {
        self.render_requested = true;
    }

    // ── History ─────────────────────────────────────────────────

    /// Snapshot the live state under `label`.
    pub fn commit(&mut self, label: impl Into<String>) {
        self.history.push(&self.live, label);
    }

    /// Step back one entry. Undoing a brush stroke also puts the mask's
    /// raster back to how it was before the stroke.
    pub fn undo(&mut self) -> bool {
        if !self.history.can_undo() {
            return false;
        }
        let stroke = self.history.current().and_then(|e| e.stroke.clone());
        let changed = self.history.undo(&mut self.live);
        if changed {
            if let Some(stroke) = stroke {
                self.restore_raster(&stroke, &stroke.before);
            }
            self.touch();
        }
        changed
    }

    /// Step forward one entry, repainting the raster of a redone stroke.
    pub fn redo(&mut self) -> bool {
        let changed = self.history.redo(&mut self.live);
        if changed {
            if let Some(stroke) = self.history.current().and_then(|e| e.stroke.clone()) {
                self.restore_raster(&stroke, &stroke.after);
            }
            self.touch();
        }
        changed
    }

    fn restore_raster(&mut self, stroke: &StrokeSnapshot, bytes: &[u8]) {
        let mut engine = BrushEngine::new(stroke.width, stroke.height);
        if let Err(e) = engine.set_data(bytes.to_vec()) {
            tracing::warn!("Cannot restore raster of mask {}: {e}", stroke.mask_id);
            return;
        }
        if let Some(item) = self.current_item() {
            engine.resize(item.source.proxy.width, item.source.proxy.height);
        }
        self.brushes.insert(stroke.mask_id, engine);
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ── Adjustments ─────────────────────────────────────────────
    //
    // Setters do not push history; callers commit when an interaction ends.

    pub fn set_basic(&mut self, field: BasicField, value: f32) {
        self.live.basic.set(field, value);
        self.touch();
    }

    pub fn set_tone_curve(&mut self, channel: CurveChannel, points: &[CurvePoint]) {
        self.live.tone_curve.set_points(channel, points);
        self.touch();
    }

    pub fn set_hsl(&mut self, band: HueBand, mut values: HslValues) {
        values.clamp_ranges();
        *self.live.hsl.band_mut(band) = values;
        self.touch();
    }

    pub fn set_color_wheel(&mut self, kind: WheelKind, mut wheel: ColorWheel) {
        wheel.clamp_ranges();
        *self.live.color_grading.wheel_mut(kind) = wheel;
        self.touch();
    }

    pub fn set_grading_balance(&mut self, balance: f32) {
        self.live.color_grading.balance = clamp_value(balance, -100.0, 100.0);
        self.touch();
    }

    pub fn set_grading_blending(&mut self, blending: f32) {
        self.live.color_grading.blending = clamp_value(blending, 0.0, 100.0);
        self.touch();
    }

    pub fn set_vignette(&mut self, mut vignette: VignetteSettings) {
        vignette.clamp_ranges();
        self.live.effects.vignette = vignette;
        self.touch();
    }

    pub fn set_grain(&mut self, mut grain: GrainSettings) {
        grain.clamp_ranges();
        self.live.effects.grain = grain;
        self.touch();
    }

    pub fn set_sharpening(&mut self, mut sharpening: SharpeningSettings) {
        sharpening.clamp_ranges();
        self.live.detail.sharpening = sharpening;
        self.touch();
    }

    pub fn set_noise_reduction(&mut self, mut noise: NoiseReductionSettings) {
        noise.clamp_ranges();
        self.live.detail.noise_reduction = noise;
        self.touch();
    }

    /// Replace the crop, clamped and fitted to its aspect lock.
    pub fn set_crop(&mut self, mut crop: CropState) {
        crop.clamp_ranges();
        if let Some(item) = self.current_item() {
            crop.lock_aspect(item.source.original_width, item.source.original_height);
        }
        self.live.crop = crop;
        self.touch();
    }

    fn reset_section(&mut self, label: &str, reset: impl FnOnce(&mut EditState)) {
        reset(&mut self.live);
        self.commit(label);
        self.touch();
    }

    pub fn reset_basic(&mut self) {
        self.reset_section("Reset basic adjustments", |s| s.basic = BasicAdjustments::default());
    }

    pub fn reset_tone_curve(&mut self) {
        self.reset_section("Reset tone curve", |s| s.tone_curve = ToneCurveState::default());
    }

    pub fn reset_hsl(&mut self) {
        self.reset_section("Reset HSL", |s| s.hsl = HslAdjustments::default());
    }

    pub fn reset_color_grading(&mut self) {
        self.reset_section("Reset color grading", |s| {
            s.color_grading = ColorGradingState::default()
        });
    }

    pub fn reset_effects(&mut self) {
        self.reset_section("Reset effects", |s| s.effects = EffectsState::default());
    }

    pub fn reset_detail(&mut self) {
        self.reset_section("Reset detail", |s| s.detail = DetailState::default());
    }

    pub fn reset_crop(&mut self) {
        self.reset_section("Reset crop", |s| s.crop = CropState::default());
    }

    pub fn reset_all(&mut self) {
        self.reset_section("Reset all edits", |s| *s = EditState::default());
    }

    /// Merge a partial payload into the live state and commit it.
    pub fn apply_preset(&mut self, partial: &PartialAdjustments) {
        self.live = apply_preset(&self.live, partial);
        self.commit("Apply preset");
        self.touch();
    }

    /// Replace the whole live state, e.g. one pasted from another image,
    /// and commit it under `label`.
    pub fn replace_state(&mut self, mut state: EditState, label: impl Into<String>) {
        state.clamp_ranges();
        self.live = state;
        self.commit(label);
        self.touch();
    }

    // ── Masks ───────────────────────────────────────────────────

    /// Add a mask, make it active and commit. Brush masks get an empty
    /// raster at proxy resolution.
    pub fn add_mask(&mut self, kind: MaskKind) -> MaskId {
        let layer = MaskLayer::new(kind, format!("Mask {}", self.live.masks.len() + 1));
        let id = layer.id;
        let proxy_size = self
            .current_item()
            .map(|item| (item.source.proxy.width, item.source.proxy.height));
        if let (MaskKind::Brush, Some((width, height))) = (kind, proxy_size) {
            self.brushes.insert(id, BrushEngine::new(width, height));
        }
        self.live.masks.push(layer);
        self.live.active_mask_id = Some(id);
        self.commit(format!("Add {} mask", mask_label(&kind)));
        self.touch();
        id
    }

    /// Apply a partial update to a mask. Unknown ids are ignored.
    pub fn update_mask(&mut self, id: MaskId, update: &MaskUpdate) -> bool {
        let Some(layer) = self.live.mask_mut(id) else {
            tracing::debug!("update_mask: unknown mask {id}");
            return false;
        };
        layer.apply_update(update);
        self.touch();
        true
    }

    /// Delete a mask and commit. Its raster is kept so undo restores the
    /// painting. Unknown ids are ignored.
    pub fn delete_mask(&mut self, id: MaskId) -> bool {
        if self.live.mask(id).is_none() {
            tracing::debug!("delete_mask: unknown mask {id}");
            return false;
        }
        self.live.masks.retain(|m| m.id != id);
        if self.live.active_mask_id == Some(id) {
            self.live.active_mask_id = None;
        }
        if self.painting == Some(id) {
            self.painting = None;
            self.stroke_before = None;
        }
        self.commit("Delete mask");
        self.touch();
        true
    }

    /// Select the mask the overlay and brush act on. Unknown ids are ignored.
    pub fn set_active_mask(&mut self, id: Option<MaskId>) -> bool {
        if let Some(id) = id
            && self.live.mask(id).is_none()
        {
            tracing::debug!("set_active_mask: unknown mask {id}");
            return false;
        }
        self.live.active_mask_id = id;
        self.touch();
        true
    }

    // ── Brush ───────────────────────────────────────────────────

    pub fn brush_settings(&self) -> &BrushSettings {
        &self.brush_settings
    }

    pub fn set_brush_settings(&mut self, mut settings: BrushSettings) {
        settings.clamp_ranges();
        self.brush_settings = settings;
    }

    /// Start painting on a brush mask at proxy pixel coordinates. Unknown
    /// ids, gradient masks and a session without an image are ignored.
    pub fn begin_stroke(&mut self, id: MaskId, x: f32, y: f32) -> bool {
        let is_brush = self
            .live
            .mask(id)
            .is_some_and(|m| matches!(m.kind, MaskKind::Brush));
        if !is_brush {
            tracing::debug!("begin_stroke: {id} is not a brush mask");
            return false;
        }
        let Some(item) = self.current_item() else {
            return false;
        };
        let (width, height) = (item.source.proxy.width, item.source.proxy.height);
        // A stroke still in progress is finished and committed on its own.
        if self.painting.is_some() {
            self.end_stroke();
        }
        let settings = self.brush_settings;
        let engine = self
            .brushes
            .entry(id)
            .or_insert_with(|| BrushEngine::new(width, height));
        self.stroke_before = Some(engine.data().to_vec());
        engine.start_stroke(x, y, &settings);
        self.painting = Some(id);
        self.touch();
        true
    }

    pub fn continue_stroke(&mut self, x: f32, y: f32) {
        let Some(id) = self.painting else {
            return;
        };
        let settings = self.brush_settings;
        if let Some(engine) = self.brushes.get_mut(&id) {
            engine.continue_stroke(x, y, &settings);
            self.touch();
        }
    }

    /// Finish the stroke and commit "Brush stroke" together with the
    /// raster before and after it.
    pub fn end_stroke(&mut self) {
        let Some(id) = self.painting.take() else {
            return;
        };
        let before = self.stroke_before.take();
        let Some(engine) = self.brushes.get_mut(&id) else {
            self.commit("Brush stroke");
            return;
        };
        engine.end_stroke();
        match before {
            Some(before) if before.len() == engine.data().len() => {
                let stroke = StrokeSnapshot {
                    mask_id: id,
                    width: engine.width(),
                    height: engine.height(),
                    before,
                    after: engine.data().to_vec(),
                };
                self.history.push_stroke(&self.live, "Brush stroke", stroke);
            }
            _ => self.commit("Brush stroke"),
        }
    }

    // ── Rating and filters ──────────────────────────────────────

    pub fn set_rating(&mut self, index: usize, rating: u8) -> bool {
        match self.items.get_mut(index) {
            Some(item) => {
                item.rating = rating.min(MAX_RATING);
                true
            }
            None => false,
        }
    }

    pub fn set_flag(&mut self, index: usize, flag: FlagStatus) -> bool {
        match self.items.get_mut(index) {
            Some(item) => {
                item.flag = flag;
                true
            }
            None => false,
        }
    }

    pub fn set_filter(&mut self, flag: FlagFilter, min_rating: u8) {
        self.filter_flag = flag;
        self.filter_rating = min_rating.min(MAX_RATING);
    }

    /// Indices of images that pass the flag and rating filters.
    pub fn visible_indices(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| {
                self.filter_flag.matches(item.flag) && item.rating >= self.filter_rating
            })
            .map(|(i, _)| i)
            .collect()
    }

    // ── Rendering ───────────────────────────────────────────────

    /// Mask layers of the live state at the given resolution.
    pub fn mask_layers(&self, width: u32, height: u32) -> Vec<CompositeLayer> {
        build_layers(&self.live, &self.brushes, width, height)
    }

    /// Bind the current proxy to `renderer`.
    pub fn bind_preview(&self, renderer: &mut dyn FrameRenderer) -> Result<(), RenderError> {
        let item = self.current_item().ok_or(RenderError::NoImage)?;
        renderer.bind_image(&item.source.proxy)
    }

    /// Render the bound proxy with the live state.
    pub fn render_preview(
        &self,
        renderer: &mut dyn FrameRenderer,
        seed: f32,
    ) -> Result<PhotoImage, RenderError> {
        let item = self.current_item().ok_or(RenderError::NoImage)?;
        let layers = self.mask_layers(item.source.proxy.width, item.source.proxy.height);
        let request = FrameRequest::new(&self.live)
            .with_layers(&layers)
            .with_seed(seed);
        renderer.render(&request)
    }

    /// Render the full-resolution buffer through the same renderer, bake the
    /// crop, and rebind the proxy for preview.
    ///
    /// The proxy is rebound whether or not the full-resolution render
    /// succeeds; a render failure takes precedence over a rebind failure.
    pub fn export(
        &self,
        renderer: &mut dyn FrameRenderer,
        seed: f32,
    ) -> Result<PhotoImage, RenderError> {
        let item = self.current_item().ok_or(RenderError::NoImage)?;
        let full = &item.source.full;
        let layers = self.mask_layers(full.width, full.height);
        let request = FrameRequest::new(&self.live)
            .with_layers(&layers)
            .with_seed(seed);
        let rendered = renderer
            .bind_image(full)
            .and_then(|()| renderer.render(&request));
        let rebound = renderer.bind_image(&item.source.proxy);
        if let Err(e) = &rebound {
            tracing::warn!("Rebinding the proxy after export failed: {e}");
        }
        let rendered = rendered?;
        rebound?;
        Ok(apply_crop(&rendered, &self.live.crop))
    }

    // ── Persistence ─────────────────────────────────────────────

    /// Save every image and the session metadata, and delete stored images
    /// that are no longer in the session.
    pub fn persist(&mut self, store: &mut dyn SessionStore) -> Result<(), CoreError> {
        self.flush();
        for item in &self.items {
            store.save_image(&persisted(item))?;
        }
        for stale in store.load_images()? {
            if !self.items.iter().any(|item| item.id == stale.id) {
                store.delete_image(stale.id)?;
            }
        }
        store.save_session(&SessionMetadata {
            current_image_index: self.current.map_or(-1, |i| i as isize),
            filter_flag: self.filter_flag,
            filter_rating: self.filter_rating,
        })?;
        tracing::debug!("Persisted {} images", self.items.len());
        Ok(())
    }

    /// Rebuild a session from `store`. `load_pixels` supplies the buffers
    /// of each record; records it fails on are skipped with a warning.
    pub fn restore(
        config: EngineConfig,
        store: &dyn SessionStore,
        mut load_pixels: impl FnMut(&PersistedImage) -> Result<ImageSource, CoreError>,
    ) -> Result<Self, CoreError> {
        let mut session = Self::new(config);
        for record in store.load_images()? {
            let source = match load_pixels(&record) {
                Ok(source) => source,
                Err(e) => {
                    tracing::warn!("Skipping {}: {e}", record.file_name);
                    continue;
                }
            };
            session.items.push(restored(record, source, session.config.max_history));
        }

        let metadata = store.load_session()?.unwrap_or_default();
        session.filter_flag = metadata.filter_flag;
        session.filter_rating = metadata.filter_rating.min(MAX_RATING);
        if !session.items.is_empty() {
            let index = usize::try_from(metadata.current_image_index)
                .unwrap_or(0)
                .min(session.items.len() - 1);
            session.load(index);
        }
        Ok(session)
    }
}

fn persisted(item: &ImageItem) -> PersistedImage {
    PersistedImage {
        id: item.id,
        file_name: item.file_name.clone(),
        original_width: item.source.original_width,
        original_height: item.source.original_height,
        edit_state: item.edit_state.clone(),
        history: item.history.entries().to_vec(),
        history_index: item.history.pointer_index(),
        rating: item.rating,
        flag_status: item.flag,
        brush_masks: item
            .brushes
            .iter()
            .filter(|(_, engine)| !engine.is_blank())
            .map(|(id, engine)| {
                let brush = PersistedBrush {
                    width: engine.width(),
                    height: engine.height(),
                    data: engine.to_base64(),
                };
                (*id, brush)
            })
            .collect(),
    }
}

fn restored(record: PersistedImage, source: ImageSource, max_history: usize) -> ImageItem {
    let (proxy_w, proxy_h) = (source.proxy.width, source.proxy.height);
    let mut brushes = BrushRasters::new();
    for (id, brush) in &record.brush_masks {
        match BrushEngine::from_base64(brush.width, brush.height, &brush.data) {
            Ok(mut engine) => {
                if (engine.width(), engine.height()) != (proxy_w, proxy_h) {
                    engine.resize(proxy_w, proxy_h);
                }
                brushes.insert(*id, engine);
            }
            Err(e) => tracing::warn!("Dropping brush raster {id}: {e}"),
        }
    }
    let mut edit_state = record.edit_state;
    edit_state.clamp_ranges();
    ImageItem {
        id: record.id,
        file_name: record.file_name,
        source,
        edit_state,
        history: History::from_parts(record.history, record.history_index, max_history),
        brushes,
        rating: record.rating.min(MAX_RATING),
        flag: record.flag_status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{ReducedRenderer, RenderMode};
    use crate::state::mask::RadialGradientData;

    fn source(width: u32, height: u32) -> ImageSource {
        ImageSource::from_full(PhotoImage::filled(width, height, [0.4, 0.4, 0.4, 1.0]), 2048)
            .unwrap()
    }

    fn session_with(count: usize) -> Session {
        let mut session = Session::new(EngineConfig::builtin());
        for i in 0..count {
            session.add_source(format!("img{i}.png"), source(32, 16));
        }
        session
    }

    #[test]
    fn test_import_starts_history_with_open_image() {
        let session = session_with(1);
        assert_eq!(session.current_index(), Some(0));
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history().entries()[0].label, "Open image");
        assert!(!session.can_undo());
    }

    #[test]
    fn test_per_image_isolation() {
        let mut session = session_with(2);
        session.switch_to(0);
        session.set_basic(BasicField::Exposure, 1.5);
        session.commit("Exposure");

        session.switch_to(1);
        assert_eq!(session.edit_state().basic.exposure, 0.0);
        session.set_basic(BasicField::Exposure, -2.0);
        session.commit("Exposure");

        session.switch_to(0);
        assert_eq!(session.edit_state().basic.exposure, 1.5);
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.item_state(1).unwrap().basic.exposure, -2.0);
    }

    #[test]
    fn test_history_follows_image_switch() {
        let mut session = session_with(2);
        session.switch_to(0);
        session.set_basic(BasicField::Contrast, 20.0);
        session.commit("Contrast");
        session.switch_to(1);
        assert!(!session.can_undo());
        session.switch_to(0);
        assert!(session.undo());
        assert_eq!(session.edit_state().basic.contrast, 0.0);
    }

    #[test]
    fn test_setters_clamp_and_request_render() {
        let mut session = session_with(1);
        session.take_render_request();
        session.set_basic(BasicField::Exposure, 9.0);
        assert_eq!(session.edit_state().basic.exposure, 5.0);
        assert!(session.take_render_request());
        assert!(!session.take_render_request());
    }

    #[test]
    fn test_reset_pushes_labelled_entry() {
        let mut session = session_with(1);
        session.set_basic(BasicField::Saturation, 40.0);
        session.reset_basic();
        assert_eq!(session.edit_state().basic, BasicAdjustments::default());
        assert_eq!(
            session.history().current().unwrap().label,
            "Reset basic adjustments"
        );
    }

    #[test]
    fn test_unknown_mask_operations_are_noops() {
        let mut session = session_with(1);
        let before = session.edit_state().clone();
        let stranger = MaskId::new();
        assert!(!session.update_mask(stranger, &MaskUpdate::default()));
        assert!(!session.delete_mask(stranger));
        assert!(!session.set_active_mask(Some(stranger)));
        assert!(!session.begin_stroke(stranger, 1.0, 1.0));
        assert_eq!(session.edit_state(), &before);
    }

    #[test]
    fn test_add_and_delete_mask() {
        let mut session = session_with(1);
        let id = session.add_mask(MaskKind::RadialGradient(RadialGradientData::default()));
        assert_eq!(session.edit_state().active_mask_id, Some(id));
        assert_eq!(session.edit_state().masks[0].name, "Mask 1");
        assert_eq!(
            session.history().current().unwrap().label,
            "Add radial gradient mask"
        );

        assert!(session.delete_mask(id));
        assert!(session.edit_state().masks.is_empty());
        assert_eq!(session.edit_state().active_mask_id, None);
        assert!(session.undo());
        assert_eq!(session.edit_state().masks.len(), 1);
    }

    #[test]
    fn test_brush_stroke_paints_and_commits() {
        let mut session = session_with(1);
        let id = session.add_mask(MaskKind::Brush);
        session.set_brush_settings(BrushSettings {
            size: 6.0,
            hardness: 100.0,
            flow: 100.0,
            ..Default::default()
        });
        assert!(session.begin_stroke(id, 4.0, 8.0));
        session.continue_stroke(28.0, 8.0);
        session.end_stroke();

        assert_eq!(session.history().current().unwrap().label, "Brush stroke");
        let raster = &session.brushes()[&id];
        assert_eq!(raster.data()[8 * 32 + 16], 255);
        assert_eq!(raster.data()[0], 0);
    }

    fn paint_row(session: &mut Session, id: MaskId, y: f32) {
        session.set_brush_settings(BrushSettings {
            size: 6.0,
            hardness: 100.0,
            flow: 100.0,
            ..Default::default()
        });
        assert!(session.begin_stroke(id, 4.0, y));
        session.continue_stroke(28.0, y);
        session.end_stroke();
    }

    fn raster_at(session: &Session, id: MaskId, x: usize, y: usize) -> u8 {
        session.brushes()[&id].data()[y * 32 + x]
    }

    #[test]
    fn test_undo_and_redo_restore_brush_raster() {
        let mut session = session_with(1);
        let id = session.add_mask(MaskKind::Brush);
        paint_row(&mut session, id, 8.0);
        assert_eq!(raster_at(&session, id, 16, 8), 255);

        assert!(session.undo());
        assert_eq!(session.history().current().unwrap().label, "Add brush mask");
        assert!(session.brushes()[&id].is_blank());

        assert!(session.redo());
        assert_eq!(session.history().current().unwrap().label, "Brush stroke");
        assert_eq!(raster_at(&session, id, 16, 8), 255);
    }

    #[test]
    fn test_undo_reverts_only_the_last_stroke() {
        let mut session = session_with(1);
        let id = session.add_mask(MaskKind::Brush);
        paint_row(&mut session, id, 3.0);
        paint_row(&mut session, id, 12.0);

        assert!(session.undo());
        assert_eq!(raster_at(&session, id, 16, 3), 255);
        assert_eq!(raster_at(&session, id, 16, 12), 0);
    }

    #[test]
    fn test_restarting_a_stroke_commits_the_previous_one() {
        let mut session = session_with(1);
        let id = session.add_mask(MaskKind::Brush);
        session.set_brush_settings(BrushSettings {
            size: 6.0,
            hardness: 100.0,
            flow: 100.0,
            ..Default::default()
        });
        assert!(session.begin_stroke(id, 4.0, 3.0));
        assert!(session.begin_stroke(id, 4.0, 12.0));
        session.end_stroke();
        assert_eq!(session.history().len(), 4);

        assert!(session.undo());
        assert_eq!(raster_at(&session, id, 4, 3), 255);
        assert_eq!(raster_at(&session, id, 4, 12), 0);
    }

    #[test]
    fn test_stroke_undo_survives_image_switch() {
        let mut session = session_with(2);
        session.switch_to(0);
        let id = session.add_mask(MaskKind::Brush);
        paint_row(&mut session, id, 8.0);

        session.switch_to(1);
        assert!(session.brushes().is_empty());
        session.switch_to(0);
        assert_eq!(raster_at(&session, id, 16, 8), 255);
        assert!(session.undo());
        assert!(session.brushes()[&id].is_blank());
    }

    #[test]
    fn test_stroke_undo_survives_persist_and_restore() {
        let mut session = session_with(1);
        let id = session.add_mask(MaskKind::Brush);
        paint_row(&mut session, id, 8.0);

        let mut store = MemoryStore::new();
        session.persist(&mut store).unwrap();
        let mut restored =
            Session::restore(EngineConfig::builtin(), &store, |_| Ok(source(32, 16))).unwrap();
        assert_eq!(raster_at(&restored, id, 16, 8), 255);
        assert!(restored.undo());
        assert!(restored.brushes()[&id].is_blank());
        assert!(restored.redo());
        assert_eq!(raster_at(&restored, id, 16, 8), 255);
    }

    #[test]
    fn test_stroke_on_gradient_mask_is_ignored() {
        let mut session = session_with(1);
        let id = session.add_mask(MaskKind::RadialGradient(RadialGradientData::default()));
        assert!(!session.begin_stroke(id, 1.0, 1.0));
        assert!(session.brushes().is_empty());
    }

    #[test]
    fn test_apply_preset_commits() {
        let mut session = session_with(1);
        let partial = PartialAdjustments::from_json(r#"{"basic":{"exposure":0.5}}"#).unwrap();
        session.apply_preset(&partial);
        assert_eq!(session.edit_state().basic.exposure, 0.5);
        assert_eq!(session.history().current().unwrap().label, "Apply preset");
        assert!(session.undo());
        assert_eq!(session.edit_state().basic.exposure, 0.0);
    }

    #[test]
    fn test_replace_state_clamps_and_commits() {
        let mut session = session_with(1);
        let mut pasted = EditState::default();
        pasted.basic.contrast = 400.0;
        session.replace_state(pasted, "Paste settings");
        assert_eq!(session.edit_state().basic.contrast, 100.0);
        assert_eq!(session.history().current().unwrap().label, "Paste settings");
        assert!(session.take_render_request());
    }

    #[test]
    fn test_remove_current_image_selects_neighbor() {
        let mut session = session_with(3);
        session.switch_to(2);
        assert!(session.remove_image(2));
        assert_eq!(session.current_index(), Some(1));
        assert!(session.remove_image(0));
        assert_eq!(session.current_index(), Some(0));
        assert!(!session.remove_image(5));
    }

    #[test]
    fn test_visible_indices_filter() {
        let mut session = session_with(3);
        session.set_rating(0, 4);
        session.set_flag(0, FlagStatus::Picked);
        session.set_rating(1, 9);
        session.set_flag(2, FlagStatus::Rejected);
        assert_eq!(session.images()[1].rating, MAX_RATING);

        session.set_filter(FlagFilter::All, 3);
        assert_eq!(session.visible_indices(), [0, 1]);
        session.set_filter(FlagFilter::Picked, 0);
        assert_eq!(session.visible_indices(), [0]);
        session.set_filter(FlagFilter::Unflagged, 0);
        assert_eq!(session.visible_indices(), [1]);
    }

    #[test]
    fn test_preview_and_export_through_renderer() {
        let mut session = session_with(1);
        session.set_basic(BasicField::Exposure, 1.0);
        session.set_crop(CropState {
            width: 0.5,
            ..Default::default()
        });
        let mut renderer = ReducedRenderer::new();
        session.bind_preview(&mut renderer).unwrap();

        let preview = session.render_preview(&mut renderer, 0.0).unwrap();
        assert_eq!((preview.width, preview.height), (32, 16));
        assert!((preview.pixels[0][0] - 0.8).abs() < 1e-5);

        let export = session.export(&mut renderer, 0.0).unwrap();
        assert_eq!((export.width, export.height), (16, 16));
    }

    /// Refuses images wider than `max_width` and remembers what is bound.
    struct LimitedRenderer {
        inner: ReducedRenderer,
        max_width: u32,
        fail_render: bool,
        bound: Option<(u32, u32)>,
    }

    impl LimitedRenderer {
        fn new(max_width: u32) -> Self {
            Self {
                inner: ReducedRenderer::new(),
                max_width,
                fail_render: false,
                bound: None,
            }
        }
    }

    impl FrameRenderer for LimitedRenderer {
        fn mode(&self) -> RenderMode {
            self.inner.mode()
        }

        fn bind_image(&mut self, image: &PhotoImage) -> Result<(), RenderError> {
            self.bound = None;
            if image.width > self.max_width {
                return Err(RenderError::Backend("image exceeds texture limit".into()));
            }
            self.inner.bind_image(image)?;
            self.bound = Some((image.width, image.height));
            Ok(())
        }

        fn render(&mut self, request: &FrameRequest<'_>) -> Result<PhotoImage, RenderError> {
            if self.fail_render {
                return Err(RenderError::Backend("device lost".into()));
            }
            self.inner.render(request)
        }

        fn release(&mut self) {
            self.inner.release();
        }
    }

    fn session_with_large_source() -> Session {
        let mut session = Session::new(EngineConfig::builtin());
        let full = PhotoImage::filled(64, 32, [0.4, 0.4, 0.4, 1.0]);
        session.add_source("large.png", ImageSource::from_full(full, 32).unwrap());
        session
    }

    #[test]
    fn test_failed_export_bind_keeps_proxy_bound() {
        let session = session_with_large_source();
        let mut renderer = LimitedRenderer::new(32);
        session.bind_preview(&mut renderer).unwrap();

        assert!(matches!(
            session.export(&mut renderer, 0.0),
            Err(RenderError::Backend(_))
        ));
        assert_eq!(renderer.bound, Some((32, 16)));
        let preview = session.render_preview(&mut renderer, 0.0).unwrap();
        assert_eq!((preview.width, preview.height), (32, 16));
    }

    #[test]
    fn test_failed_export_render_rebinds_proxy() {
        let session = session_with_large_source();
        let mut renderer = LimitedRenderer::new(64);
        renderer.fail_render = true;

        assert!(session.export(&mut renderer, 0.0).is_err());
        assert_eq!(renderer.bound, Some((32, 16)));

        renderer.fail_render = false;
        let export = session.export(&mut renderer, 0.0).unwrap();
        assert_eq!((export.width, export.height), (64, 32));
        assert_eq!(renderer.bound, Some((32, 16)));
    }

    #[test]
    fn test_persist_and_restore() {
        let mut session = session_with(2);
        session.switch_to(1);
        let brush = session.add_mask(MaskKind::Brush);
        session.begin_stroke(brush, 10.0, 8.0);
        session.end_stroke();
        session.set_basic(BasicField::Vibrance, 30.0);
        session.commit("Vibrance");
        session.set_rating(1, 3);

        let mut store = MemoryStore::new();
        session.persist(&mut store).unwrap();
        assert_eq!(store.image_count(), 2);

        let restored = Session::restore(EngineConfig::builtin(), &store, |_| Ok(source(32, 16)))
            .unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.current_index(), Some(1));
        assert_eq!(restored.edit_state().basic.vibrance, 30.0);
        assert_eq!(restored.history().len(), session.history().len());
        assert_eq!(restored.images()[1].rating, 3);
        assert_eq!(
            restored.brushes()[&brush].data(),
            session.brushes()[&brush].data()
        );
    }

    #[test]
    fn test_persist_deletes_removed_images() {
        let mut session = session_with(2);
        let mut store = MemoryStore::new();
        session.persist(&mut store).unwrap();
        session.remove_image(0);
        session.persist(&mut store).unwrap();
        assert_eq!(store.image_count(), 1);
    }
}
