//! Bounded undo/redo timeline of [`EditState`] snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::EditState;
use crate::state::mask::MaskId;

/// Default number of snapshots kept per image.
pub const DEFAULT_MAX_HISTORY: usize = 50;

/// Brush raster bytes on both sides of one stroke.
///
/// Rasters live outside [`EditState`], so a stroke entry carries them for
/// undo and redo to put the painting back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeSnapshot {
    pub mask_id: MaskId,
    pub width: u32,
    pub height: u32,
    #[serde(with = "base64_bytes")]
    pub before: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub after: Vec<u8>,
}

mod base64_bytes {
    use base64::{Engine as _, engine::general_purpose};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        general_purpose::STANDARD
            .decode(encoded)
            .map_err(D::Error::custom)
    }
}

/// One snapshot in the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub edit_state: EditState,
    pub label: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Set on entries that record a brush stroke.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<StrokeSnapshot>,
}

/// Per-image history.
///
/// Snapshots are owned clones, so in-place edits to the live state after a
/// push, undo or redo never reach the stored entries.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    entries: Vec<HistoryEntry>,
    pointer: Option<usize>,
    max_entries: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl History {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            pointer: None,
            max_entries: max_entries.max(1),
        }
    }

    /// Rebuild a timeline from persisted parts. An out-of-range pointer is
    /// pulled back to the last entry, and excess entries drop from the front.
    pub fn from_parts(entries: Vec<HistoryEntry>, pointer: isize, max_entries: usize) -> Self {
        let mut history = Self::new(max_entries);
        history.entries = entries;
        let excess = history.entries.len().saturating_sub(history.max_entries);
        history.entries.drain(..excess);
        history.pointer = if history.entries.is_empty() || pointer < 0 {
            None
        } else {
            let last = history.entries.len() - 1;
            Some((pointer as usize).saturating_sub(excess).min(last))
        };
        if history.pointer.is_none() && !history.entries.is_empty() {
            history.pointer = Some(history.entries.len() - 1);
        }
        history
    }

    /// Snapshot `state` as the newest entry, discarding any redo branch.
    pub fn push(&mut self, state: &EditState, label: impl Into<String>) {
        self.push_entry(state, label.into(), None);
    }

    /// Like [`push`](Self::push), also recording the raster change of a
    /// brush stroke.
    pub fn push_stroke(
        &mut self,
        state: &EditState,
        label: impl Into<String>,
        stroke: StrokeSnapshot,
    ) {
        self.push_entry(state, label.into(), Some(stroke));
    }

    fn push_entry(&mut self, state: &EditState, label: String, stroke: Option<StrokeSnapshot>) {
        let keep = self.pointer.map_or(0, |p| p + 1);
        self.entries.truncate(keep);
        let entry = HistoryEntry {
            edit_state: state.clone(),
            label,
            timestamp: Utc::now(),
            stroke,
        };
        tracing::debug!(label = %entry.label, "history push");
        self.entries.push(entry);

        let excess = self.entries.len().saturating_sub(self.max_entries);
        self.entries.drain(..excess);
        self.pointer = Some(self.entries.len() - 1);
    }

    /// Step back one entry and restore it into `state`. Returns `false` at
    /// the oldest entry.
    pub fn undo(&mut self, state: &mut EditState) -> bool {
        match self.pointer {
            Some(p) if p > 0 => {
                self.pointer = Some(p - 1);
                *state = self.entries[p - 1].edit_state.clone();
                true
            }
            _ => false,
        }
    }

    /// Step forward one entry and restore it into `state`. Returns `false`
    /// at the newest entry.
    pub fn redo(&mut self, state: &mut EditState) -> bool {
        match self.pointer {
            Some(p) if p + 1 < self.entries.len() => {
                self.pointer = Some(p + 1);
                *state = self.entries[p + 1].edit_state.clone();
                true
            }
            _ => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.pointer.is_some_and(|p| p > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.pointer.is_some_and(|p| p + 1 < self.entries.len())
    }

    /// Pointer as stored by the persistence layer: -1 when empty.
    pub fn pointer_index(&self) -> isize {
        self.pointer.map_or(-1, |p| p as isize)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.pointer.map(|p| &self.entries[p])
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.pointer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_exposure(exposure: f32) -> EditState {
        let mut state = EditState::default();
        state.basic.exposure = exposure;
        state
    }

    #[test]
    fn test_empty_history() {
        let history = History::default();
        assert_eq!(history.pointer_index(), -1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_bounded_to_max_entries() {
        let mut history = History::new(50);
        let state = EditState::default();
        for i in 1..=60 {
            history.push(&state, format!("#{i}"));
        }
        assert_eq!(history.len(), 50);
        assert_eq!(history.pointer_index(), 49);
        assert_eq!(history.entries()[0].label, "#11");
        assert!(history.entries().iter().all(|e| e.label != "#1"));
        assert_eq!(history.current().unwrap().label, "#60");
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut history = History::default();
        let a = state_with_exposure(0.5);
        let b = state_with_exposure(1.5);
        history.push(&a, "A");
        history.push(&b, "B");

        let mut live = b.clone();
        assert!(history.undo(&mut live));
        assert_eq!(live, a);
        assert!(history.redo(&mut live));
        assert_eq!(live, b);
    }

    #[test]
    fn test_push_after_undo_discards_redo_branch() {
        let mut history = History::default();
        let mut live = state_with_exposure(0.5);
        history.push(&live, "A");
        history.push(&state_with_exposure(1.5), "B");
        history.undo(&mut live);

        history.push(&state_with_exposure(-1.0), "C");
        assert!(!history.can_redo());
        assert!(!history.redo(&mut live));
        let labels: Vec<_> = history.entries().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["A", "C"]);
    }

    #[test]
    fn test_undo_past_bounds_is_noop() {
        let mut history = History::default();
        let mut live = state_with_exposure(0.5);
        history.push(&live, "Open image");
        live.basic.exposure = 2.0;
        assert!(!history.undo(&mut live));
        assert_eq!(live.basic.exposure, 2.0);
        assert_eq!(history.pointer_index(), 0);
    }

    #[test]
    fn test_restored_state_is_independent_of_snapshot() {
        let mut history = History::default();
        history.push(&state_with_exposure(0.5), "A");
        history.push(&state_with_exposure(1.0), "B");
        let mut live = EditState::default();
        history.undo(&mut live);
        live.basic.exposure = 4.0;
        assert_eq!(history.entries()[0].edit_state.basic.exposure, 0.5);
    }

    #[test]
    fn test_from_parts_clamps_pointer() {
        let mut source = History::default();
        for label in ["A", "B", "C"] {
            source.push(&EditState::default(), label);
        }
        let restored = History::from_parts(source.entries().to_vec(), 7, 50);
        assert_eq!(restored.pointer_index(), 2);
        let restored = History::from_parts(source.entries().to_vec(), 1, 50);
        assert!(restored.can_redo());
        let restored = History::from_parts(source.entries().to_vec(), 2, 2);
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.pointer_index(), 1);
    }

    #[test]
    fn test_stroke_entry_keeps_raster_bytes() {
        let mut history = History::default();
        history.push(&EditState::default(), "Open image");
        let stroke = StrokeSnapshot {
            mask_id: MaskId::new(),
            width: 2,
            height: 1,
            before: vec![0, 0],
            after: vec![255, 128],
        };
        history.push_stroke(&EditState::default(), "Brush stroke", stroke.clone());
        assert_eq!(history.current().unwrap().stroke.as_ref(), Some(&stroke));
        assert!(history.entries()[0].stroke.is_none());

        let json = serde_json::to_value(&history.entries()[1]).unwrap();
        assert_eq!(json["stroke"]["after"], "/4A=");
        let entry: HistoryEntry = serde_json::from_value(json).unwrap();
        assert_eq!(entry.stroke, Some(stroke));
        let plain = serde_json::to_value(&history.entries()[0]).unwrap();
        assert!(plain.get("stroke").is_none());
    }

    #[test]
    fn test_entry_serializes_timestamp_as_millis() {
        let mut history = History::default();
        history.push(&EditState::default(), "Open image");
        let json = serde_json::to_value(&history.entries()[0]).unwrap();
        assert!(json["timestamp"].is_i64());
        assert!(json.get("editState").is_some());
    }
}
