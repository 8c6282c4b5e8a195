//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rasterization and image coding.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The string is not a usable data URI.
    #[error("Invalid data URI: {0}")]
    DataUri(String),

    /// Image bytes could not be decoded.
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// The target surface could not be allocated.
    #[error("Cannot allocate {width}x{height} surface")]
    Surface {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// PNG encoding failed.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// Decoded image did not satisfy scene constraints.
    #[error(transparent)]
    Canvas(#[from] inpaint_core::CanvasError),
}
