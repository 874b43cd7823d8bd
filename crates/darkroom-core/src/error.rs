//! Error types for the core crate.
//!
//! Range violations, malformed curves, unknown mask ids and out-of-bounds
//! undo/redo are not errors: they clamp or no-op at the data-model boundary.

use std::error::Error as StdError;

/// Failures in decoding, persistence and raster bookkeeping.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid edit state JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid brush raster encoding: {0}")]
    RasterEncoding(#[from] base64::DecodeError),
    #[error("raster size mismatch: expected {expected} bytes, got {actual}")]
    RasterSize { expected: usize, actual: usize },
    #[error("image has zero width or height")]
    EmptyImage,
    #[error("persistence error: {0}")]
    Store(String),
}

/// Failures raised by a [`FrameRenderer`](crate::pipeline::FrameRenderer).
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("renderer was released")]
    Released,
    #[error("image has zero width or height")]
    EmptyImage,
    #[error("no image is bound to the renderer")]
    NoImage,
    #[error("render backend failed: {0}")]
    Backend(#[source] Box<dyn StdError + Send + Sync>),
}
