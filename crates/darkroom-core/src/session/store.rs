//! Persistence collaborator.
//!
//! The session hands plain records to a [`SessionStore`] and does not care
//! how they are kept. [`MemoryStore`] keeps them as JSON strings in memory.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::item::{FlagFilter, FlagStatus, ImageId};
use crate::error::CoreError;
use crate::history::HistoryEntry;
use crate::state::mask::MaskId;
use crate::state::EditState;

/// A painted raster, base64-encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedBrush {
    pub width: u32,
    pub height: u32,
    pub data: String,
}

/// Everything stored for one image except its pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedImage {
    pub id: ImageId,
    pub file_name: String,
    pub original_width: u32,
    pub original_height: u32,
    pub edit_state: EditState,
    pub history: Vec<HistoryEntry>,
    pub history_index: isize,
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub flag_status: FlagStatus,
    #[serde(default)]
    pub brush_masks: BTreeMap<MaskId, PersistedBrush>,
}

/// Session-level state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionMetadata {
    /// -1 when no image is current.
    pub current_image_index: isize,
    pub filter_flag: FlagFilter,
    pub filter_rating: u8,
}

pub trait SessionStore {
    /// Insert or replace by id.
    fn save_image(&mut self, image: &PersistedImage) -> Result<(), CoreError>;

    /// All images, in the order they were first saved.
    fn load_images(&self) -> Result<Vec<PersistedImage>, CoreError>;

    fn delete_image(&mut self, id: ImageId) -> Result<(), CoreError>;

    fn save_session(&mut self, metadata: &SessionMetadata) -> Result<(), CoreError>;

    fn load_session(&self) -> Result<Option<SessionMetadata>, CoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    images: Vec<(ImageId, String)>,
    session: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}

impl SessionStore for MemoryStore {
    fn save_image(&mut self, image: &PersistedImage) -> Result<(), CoreError> {
        let json = serde_json::to_string(image)?;
        match self.images.iter_mut().find(|(id, _)| *id == image.id) {
            Some(slot) => slot.1 = json,
            None => self.images.push((image.id, json)),
        }
        Ok(())
    }

    fn load_images(&self) -> Result<Vec<PersistedImage>, CoreError> {
        self.images
            .iter()
            .map(|(_, json)| Ok(serde_json::from_str(json)?))
            .collect()
    }

    fn delete_image(&mut self, id: ImageId) -> Result<(), CoreError> {
        self.images.retain(|(stored, _)| *stored != id);
        Ok(())
    }

    fn save_session(&mut self, metadata: &SessionMetadata) -> Result<(), CoreError> {
        self.session = Some(serde_json::to_string(metadata)?);
        Ok(())
    }

    fn load_session(&self) -> Result<Option<SessionMetadata>, CoreError> {
        self.session
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(CoreError::from)
    }
}
