//! # Inpaint Canvas Editor
//!
//! Headless host for an editing session: loads an image, replays drawing
//! gestures, submits the masked region with a prompt and saves the result.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p inpaint-editor -- --image photo.png --strokes strokes.json \
//!     --prompt "replace the sky with a sunset"
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `EditorConfig` - Canvas size, brush and I/O paths
//! - `EditOrchestrator` - Single-flight edit submission over an `EditTransport`
//! - `HttpEditTransport` - reqwest client for `POST /api/edit-image`

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod error;
pub mod orchestrator;
pub mod script;
pub mod transport;

pub use download::download;
pub use error::{EditError, EditorError, EditorResult};
pub use orchestrator::{EditOrchestrator, EditOutcome};
pub use script::{load_script, parse_script, run_script, ScriptStep};
pub use transport::{EditTransport, HttpEditTransport, TransportError};

use std::path::{Path, PathBuf};

use clap::Parser;
use inpaint_core::scene::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use inpaint_core::{Color, EditorSession};
use inpaint_renderer::image_source_from_bytes;

/// Default edit server.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:9473";

/// Command-line arguments for inpaint-editor.
#[derive(Debug, Clone, Parser)]
#[command(name = "inpaint-editor")]
#[command(about = "Draw a mask over an image and submit it for AI editing")]
#[command(version)]
pub struct CliArgs {
    /// Edit server base URL (e.g., <http://localhost:9473>)
    #[arg(long, env = "INPAINT_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    pub server: String,

    /// Canvas width in pixels
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    pub width: f32,

    /// Canvas height in pixels
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    pub height: f32,

    /// Brush size (clamped to 1..=50)
    #[arg(long)]
    pub brush_size: Option<f32>,

    /// Brush color as #rrggbb
    #[arg(long)]
    pub brush_color: Option<Color>,

    /// Image loaded as the canvas background
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Images added on top of the background
    #[arg(long = "overlay")]
    pub overlays: Vec<PathBuf>,

    /// JSON stroke script to replay
    #[arg(long)]
    pub strokes: Option<PathBuf>,

    /// Edit prompt; without it the canvas is only saved
    #[arg(long)]
    pub prompt: Option<String>,

    /// Directory for the saved PNG
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,
}

/// Editor configuration.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Edit server base URL.
    pub server: String,
    /// Canvas width.
    pub width: f32,
    /// Canvas height.
    pub height: f32,
    /// Brush size override.
    pub brush_size: Option<f32>,
    /// Brush color override.
    pub brush_color: Option<Color>,
    /// Background image file.
    pub image: Option<PathBuf>,
    /// Overlay image files.
    pub overlays: Vec<PathBuf>,
    /// Stroke script file.
    pub strokes: Option<PathBuf>,
    /// Edit prompt.
    pub prompt: Option<String>,
    /// Output directory.
    pub output_dir: PathBuf,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            server: DEFAULT_SERVER_URL.to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            brush_size: None,
            brush_color: None,
            image: None,
            overlays: Vec::new(),
            strokes: None,
            prompt: None,
            output_dir: PathBuf::from("."),
        }
    }

    /// Mount a session: background image (if any), overlays, brush settings.
    ///
    /// # Errors
    ///
    /// Returns an error if an image cannot be read or decoded.
    pub fn build_session(&self) -> EditorResult<EditorSession> {
        let mut session = match &self.image {
            Some(path) => {
                let source = image_source_from_bytes(&read_file(path)?)?;
                EditorSession::with_image(self.width, self.height, source)?
            }
            None => EditorSession::new(self.width, self.height)?,
        };

        for path in &self.overlays {
            let source = image_source_from_bytes(&read_file(path)?)?;
            session.add_overlay_image(source)?;
        }
        if let Some(color) = self.brush_color {
            session.set_brush_color(color);
        }
        if let Some(size) = self.brush_size {
            session.set_brush_size(size);
        }
        Ok(session)
    }
}

impl From<CliArgs> for EditorConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            server: args.server,
            width: args.width,
            height: args.height,
            brush_size: args.brush_size,
            brush_color: args.brush_color,
            image: args.image,
            overlays: args.overlays,
            strokes: args.strokes,
            prompt: args.prompt,
            output_dir: args.output_dir,
        }
    }
}

fn read_file(path: &Path) -> EditorResult<Vec<u8>> {
    std::fs::read(path).map_err(|source| EditorError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use inpaint_core::Scene;
    use inpaint_renderer::SceneRasterizer;

    #[test]
    fn test_cli_defaults() {
        let args = CliArgs::try_parse_from(["inpaint-editor"]).expect("parse");
        let config = EditorConfig::from(args);
        assert!((config.width - 800.0).abs() < f32::EPSILON);
        assert!((config.height - 600.0).abs() < f32::EPSILON);
        assert!(config.prompt.is_none());
    }

    #[test]
    fn test_cli_brush_color_parses_hex() {
        let args = CliArgs::try_parse_from(["inpaint-editor", "--brush-color", "#00ff00"])
            .expect("parse");
        assert_eq!(args.brush_color, Some(Color::rgb(0, 255, 0)));
        assert!(CliArgs::try_parse_from(["inpaint-editor", "--brush-color", "green"]).is_err());
    }

    #[test]
    fn test_build_session_with_background() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bg.png");
        let png = SceneRasterizer::with_defaults()
            .render_png(&Scene::new(1600.0, 600.0))
            .expect("png");
        std::fs::write(&path, png).expect("write");

        let config = EditorConfig {
            image: Some(path),
            brush_size: Some(80.0),
            ..EditorConfig::new()
        };
        let session = config.build_session().expect("session");
        let background = session.scene().background().expect("background");
        // 1600x600 into 800x600 halves the image.
        assert!((background.scale - 0.5).abs() < f32::EPSILON);
        assert!((session.surface().brush().size - 50.0).abs() < f32::EPSILON);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_build_session_missing_image() {
        let config = EditorConfig {
            image: Some(PathBuf::from("/no/such/image.png")),
            ..EditorConfig::new()
        };
        assert!(matches!(config.build_session(), Err(EditorError::Io { .. })));
    }
}
