//! Editor error types.

use std::path::PathBuf;

use inpaint_core::CanvasError;
use inpaint_renderer::RenderError;
use thiserror::Error;

use crate::transport::TransportError;

/// Result type for editor operations outside the edit flow.
pub type EditorResult<T> = Result<T, EditorError>;

/// Failures of an edit submission. `Display` is the message shown to the user.
#[derive(Debug, Error)]
pub enum EditError {
    /// Prompt was empty or whitespace.
    #[error("Please enter a prompt for AI editing")]
    EmptyPrompt,
    /// Another edit is still in flight.
    #[error("An edit is already in progress")]
    Busy,
    /// The endpoint could not be reached or answered with an error status.
    #[error("AI editing failed. Please try again.")]
    Request(#[source] TransportError),
    /// Canvas or mask could not be rasterized.
    #[error("Could not prepare the canvas: {0}")]
    Render(#[from] RenderError),
    /// The returned image could not be loaded; the canvas is unchanged.
    #[error("The edited image could not be loaded")]
    InvalidImage(#[source] RenderError),
    /// Applying the edit to the session failed.
    #[error(transparent)]
    Canvas(#[from] CanvasError),
}

/// Failures of the CLI helpers (loading inputs, saving output).
#[derive(Debug, Error)]
pub enum EditorError {
    /// Reading or writing a file failed.
    #[error("{}: {source}", path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// A stroke script was not valid JSON.
    #[error("invalid stroke script: {0}")]
    Script(#[from] serde_json::Error),
    /// An image file or render failed.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// A session operation failed.
    #[error(transparent)]
    Canvas(#[from] CanvasError),
}
