//! Saving the canvas to disk.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use inpaint_core::Scene;
use inpaint_renderer::SceneRasterizer;

use crate::error::{EditorError, EditorResult};

/// File name used for a download taken at `millis` since the Unix epoch.
#[must_use]
pub fn download_file_name(millis: u128) -> String {
    format!("edited-image-{millis}.png")
}

/// Render `scene` to `dir/edited-image-<unix millis>.png`.
///
/// # Errors
///
/// Returns an error if rendering fails or the file cannot be written.
pub fn download(scene: &Scene, dir: &Path) -> EditorResult<PathBuf> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let path = dir.join(download_file_name(millis));

    let png = SceneRasterizer::with_defaults().render_png(scene)?;
    std::fs::write(&path, png).map_err(|source| EditorError::Io {
        path: path.clone(),
        source,
    })?;

    tracing::info!(path = %path.display(), "Canvas saved");
    Ok(path)
}
