//! One imported image and the edits that belong to it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::history::History;
use crate::image::ImageSource;
use crate::mask::BrushRasters;
use crate::state::EditState;

/// Highest star rating.
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(pub Uuid);

impl ImageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ImageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cull flag of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagStatus {
    Picked,
    Rejected,
    #[default]
    Unflagged,
}

/// Which flags the filmstrip shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagFilter {
    #[default]
    All,
    Picked,
    Rejected,
    Unflagged,
}

impl FlagFilter {
    pub fn matches(self, flag: FlagStatus) -> bool {
        match self {
            Self::All => true,
            Self::Picked => flag == FlagStatus::Picked,
            Self::Rejected => flag == FlagStatus::Rejected,
            Self::Unflagged => flag == FlagStatus::Unflagged,
        }
    }
}

/// An image in the session.
///
/// While the item is current, the session's live state, history and brush
/// rasters are authoritative and these fields hold the copy taken when it
/// was last flushed.
#[derive(Debug, Clone)]
pub struct ImageItem {
    pub id: ImageId,
    pub file_name: String,
    pub source: ImageSource,
    pub edit_state: EditState,
    pub history: History,
    /// Brush rasters at proxy resolution.
    pub brushes: BrushRasters,
    pub rating: u8,
    pub flag: FlagStatus,
}

impl ImageItem {
    /// A fresh item whose history starts with "Open image".
    pub fn new(file_name: impl Into<String>, source: ImageSource, max_history: usize) -> Self {
        let edit_state = EditState::default();
        let mut history = History::new(max_history);
        history.push(&edit_state, "Open image");
        Self {
            id: ImageId::new(),
            file_name: file_name.into(),
            source,
            edit_state,
            history,
            brushes: BrushRasters::new(),
            rating: 0,
            flag: FlagStatus::Unflagged,
        }
    }
}
