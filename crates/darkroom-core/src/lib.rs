//! Darkroom Core: domain layer for non-destructive photo editing.
//!
//! This crate contains the edit-state model, tone-curve evaluation, the CPU
//! reference of the adjustment pipeline, the mask engine, edit history and
//! the per-image session model. No GPU or framework dependencies.

pub mod config;
pub mod error;
pub mod geometry;
pub mod grading;
pub mod history;
pub mod image;
pub mod mask;
pub mod pipeline;
pub mod preset;
pub mod session;
pub mod state;

// Re-exports for convenience.
pub use config::EngineConfig;
pub use error::{CoreError, RenderError};
pub use history::{DEFAULT_MAX_HISTORY, History, HistoryEntry, StrokeSnapshot};
pub use image::{ImageSource, PhotoImage};
pub use pipeline::{FrameRenderer, RenderMode};
pub use preset::{PartialAdjustments, apply_preset};
pub use session::Session;
pub use state::EditState;
