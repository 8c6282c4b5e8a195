//! Error types for editor operations.

use thiserror::Error;

use crate::surface::ToolMode;

/// Result type for editor operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur in editor operations.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Drawable not found in the scene.
    #[error("Drawable not found: {0}")]
    DrawableNotFound(String),

    /// The drawable exists but cannot be selected or moved.
    #[error("Drawable is locked: {0}")]
    Locked(String),

    /// The operation is not available in the current tool mode.
    #[error("Operation not allowed in {mode:?} mode: {operation}")]
    WrongMode {
        /// Active tool mode.
        mode: ToolMode,
        /// The rejected operation.
        operation: &'static str,
    },

    /// A stroke gesture was continued or finished without being started.
    #[error("No stroke gesture in progress")]
    NoActiveGesture,

    /// A gesture was drawn with no points.
    #[error("Stroke gesture has no points")]
    EmptyGesture,

    /// Color string could not be parsed.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Image dimensions are unusable (zero width or height).
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidImage {
        /// Natural width in pixels.
        width: u32,
        /// Natural height in pixels.
        height: u32,
    },

    /// Scene serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
