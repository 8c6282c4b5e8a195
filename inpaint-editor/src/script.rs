//! Stroke scripts: replay drawing gestures from JSON.
//!
//! ```json
//! [
//!   { "tool": "pencil", "points": [{"x": 10, "y": 10}, {"x": 120, "y": 80}] },
//!   { "tool": "eraser", "size": 12, "points": [{"x": 40, "y": 40}, {"x": 60, "y": 40}] },
//!   { "tool": "move", "target": 0, "dx": 25, "dy": 0 }
//! ]
//! ```

use std::path::Path;

use inpaint_core::{Color, EditorSession, Point, SceneChange, ToolMode};
use serde::Deserialize;

use crate::error::{EditorError, EditorResult};

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "tool", rename_all = "lowercase")]
pub enum ScriptStep {
    /// Freehand stroke with the brush color.
    Pencil {
        /// Gesture points in canvas coordinates.
        points: Vec<Point>,
        /// Brush color override.
        #[serde(default)]
        color: Option<Color>,
        /// Brush size override.
        #[serde(default)]
        size: Option<f32>,
    },
    /// Freehand overpaint with the background color.
    Eraser {
        /// Gesture points in canvas coordinates.
        points: Vec<Point>,
        /// Brush size override.
        #[serde(default)]
        size: Option<f32>,
    },
    /// Drag a previously drawn object by its position in paint order.
    Move {
        /// Index into the current paint order.
        target: usize,
        /// Horizontal offset.
        dx: f32,
        /// Vertical offset.
        dy: f32,
    },
    /// Remove every stroke.
    Clear,
    /// Step back in history.
    Undo,
    /// Step forward in history.
    Redo,
}

/// Parse a script from JSON text.
///
/// # Errors
///
/// Returns [`EditorError::Script`] for malformed JSON.
pub fn parse_script(json: &str) -> EditorResult<Vec<ScriptStep>> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse a script file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_script(path: &Path) -> EditorResult<Vec<ScriptStep>> {
    let text = std::fs::read_to_string(path).map_err(|source| EditorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_script(&text)
}

/// Replay `steps` against `session`. Brush overrides persist for later steps,
/// like moving the slider in the toolbar would.
///
/// # Errors
///
/// Stops at the first step the session rejects.
pub fn run_script(session: &mut EditorSession, steps: &[ScriptStep]) -> EditorResult<usize> {
    let mut committed = 0;
    for step in steps {
        match step {
            ScriptStep::Pencil {
                points,
                color,
                size,
            } => {
                session.set_mode(ToolMode::Pencil);
                if let Some(color) = color {
                    session.set_brush_color(*color);
                }
                if let Some(size) = size {
                    session.set_brush_size(*size);
                }
                session.draw(points)?;
            }
            ScriptStep::Eraser { points, size } => {
                session.set_mode(ToolMode::Eraser);
                if let Some(size) = size {
                    session.set_brush_size(*size);
                }
                session.draw(points)?;
            }
            ScriptStep::Move { target, dx, dy } => {
                let id = session
                    .scene()
                    .drawables()
                    .nth(*target)
                    .map(|(id, _)| id)
                    .ok_or_else(|| {
                        inpaint_core::CanvasError::DrawableNotFound(format!("index {target}"))
                    })?;
                session.set_mode(ToolMode::Move);
                let change = session.move_object(id, *dx, *dy)?;
                if let SceneChange::ObjectMoved { from, to } = change {
                    tracing::debug!(%from, %to, "Scripted move");
                }
            }
            ScriptStep::Clear => {
                session.remove_all_strokes()?;
            }
            ScriptStep::Undo => {
                session.undo()?;
            }
            ScriptStep::Redo => {
                session.redo()?;
            }
        }
        committed += 1;
    }
    Ok(committed)
}
