//! Editor session: a drawing surface wired to its history.
//!
//! A session is created when the editor mounts and dropped when it unmounts.
//! Every committing operation snapshots the scene synchronously, so history
//! order always matches event order.

use crate::element::{DrawableId, ImageSource, Point};
use crate::history::History;
use crate::surface::{DrawingSurface, SceneChange, ToolMode};
use crate::{CanvasError, CanvasResult, Color, Scene};

type ChangeObserver = Box<dyn Fn(&SceneChange, &Scene) + Send + Sync>;

/// One editor instance.
pub struct EditorSession {
    surface: DrawingSurface,
    history: History,
    on_change: Option<ChangeObserver>,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("surface", &self.surface)
            .field("history_len", &self.history.len())
            .field("history_cursor", &self.history.cursor())
            .finish_non_exhaustive()
    }
}

impl EditorSession {
    /// Mount an empty editor. The blank canvas is the first history entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial snapshot fails.
    pub fn new(width: f32, height: f32) -> CanvasResult<Self> {
        Self::with_history(width, height, History::new())
    }

    /// Mount an empty editor with a custom history.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial snapshot fails.
    pub fn with_history(width: f32, height: f32, mut history: History) -> CanvasResult<Self> {
        let surface = DrawingSurface::new(width, height);
        history.snapshot(surface.scene())?;
        Ok(Self {
            surface,
            history,
            on_change: None,
        })
    }

    /// Mount an editor seeded with an uploaded image as background. The
    /// seeded canvas is the first history entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial snapshot fails.
    pub fn with_image(width: f32, height: f32, source: ImageSource) -> CanvasResult<Self> {
        let mut surface = DrawingSurface::new(width, height);
        surface.insert_background(source);
        let mut history = History::new();
        history.snapshot(surface.scene())?;
        Ok(Self {
            surface,
            history,
            on_change: None,
        })
    }

    /// Register a callback invoked after every committed change.
    pub fn set_on_change<F>(&mut self, callback: F)
    where
        F: Fn(&SceneChange, &Scene) + Send + Sync + 'static,
    {
        self.on_change = Some(Box::new(callback));
    }

    /// The drawing surface (read-only).
    #[must_use]
    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }

    /// The current scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        self.surface.scene()
    }

    /// The history.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    fn commit(&mut self, change: SceneChange) -> CanvasResult<SceneChange> {
        self.history.snapshot(self.surface.scene())?;
        tracing::debug!(?change, entries = self.history.len(), "scene change committed");
        if let Some(callback) = &self.on_change {
            callback(&change, self.surface.scene());
        }
        Ok(change)
    }

    /// Switch tools.
    pub fn set_mode(&mut self, mode: ToolMode) {
        self.surface.set_mode(mode);
    }

    /// Set the pencil color.
    pub fn set_brush_color(&mut self, color: Color) {
        self.surface.set_brush_color(color);
    }

    /// Set the pencil size.
    pub fn set_brush_size(&mut self, size: f32) {
        self.surface.set_brush_size(size);
    }

    /// Start a freehand gesture.
    ///
    /// # Errors
    ///
    /// Fails in move mode.
    pub fn begin_stroke(&mut self, at: Point) -> CanvasResult<()> {
        self.surface.begin_stroke(at)
    }

    /// Extend the current gesture.
    ///
    /// # Errors
    ///
    /// Fails if no gesture is in progress.
    pub fn extend_stroke(&mut self, to: Point) -> CanvasResult<()> {
        self.surface.extend_stroke(to)
    }

    /// Finish the current gesture and record it.
    ///
    /// # Errors
    ///
    /// Fails if no gesture is in progress or the snapshot fails.
    pub fn end_stroke(&mut self) -> CanvasResult<SceneChange> {
        let change = self.surface.end_stroke()?;
        self.commit(change)
    }

    /// Draw a whole gesture with the active tool.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::EmptyGesture`] for an empty point list. Also
    /// fails in move mode, or if the snapshot fails.
    pub fn draw(&mut self, points: &[Point]) -> CanvasResult<SceneChange> {
        let (first, rest) = points.split_first().ok_or(CanvasError::EmptyGesture)?;
        self.surface.begin_stroke(*first)?;
        for point in rest {
            self.surface.extend_stroke(*point)?;
        }
        self.end_stroke()
    }

    /// Add a stroke with explicit style and record it.
    ///
    /// # Errors
    ///
    /// Fails if the snapshot fails.
    pub fn add_stroke(
        &mut self,
        points: Vec<Point>,
        color: Color,
        width: f32,
    ) -> CanvasResult<SceneChange> {
        let change = self.surface.add_stroke(points, color, width);
        self.commit(change)
    }

    /// Place an image at `position` with `scale` and record it.
    ///
    /// # Errors
    ///
    /// Fails if the snapshot fails.
    pub fn add_image(
        &mut self,
        source: ImageSource,
        position: Point,
        scale: f32,
    ) -> CanvasResult<SceneChange> {
        let change = self.surface.add_image(source, position, scale);
        self.commit(change)
    }

    /// Place an image at the overlay position and record it.
    ///
    /// # Errors
    ///
    /// Fails if the snapshot fails.
    pub fn add_overlay_image(&mut self, source: ImageSource) -> CanvasResult<SceneChange> {
        let change = self.surface.add_overlay_image(source);
        self.commit(change)
    }

    /// Install a fitted, centered background and record it.
    ///
    /// # Errors
    ///
    /// Fails if the snapshot fails.
    pub fn insert_background(&mut self, source: ImageSource) -> CanvasResult<SceneChange> {
        let change = self.surface.insert_background(source);
        self.commit(change)
    }

    /// Remove every stroke and record it.
    ///
    /// # Errors
    ///
    /// Fails if the snapshot fails.
    pub fn remove_all_strokes(&mut self) -> CanvasResult<SceneChange> {
        let change = self.surface.remove_all_strokes();
        self.commit(change)
    }

    /// Drag an object in move mode and record it.
    ///
    /// # Errors
    ///
    /// Fails outside move mode, for unknown or locked objects, or if the
    /// snapshot fails.
    pub fn move_object(&mut self, id: DrawableId, dx: f32, dy: f32) -> CanvasResult<SceneChange> {
        let change = self.surface.move_object(id, dx, dy)?;
        self.commit(change)
    }

    /// Replace the canvas with an edited image and record it.
    ///
    /// # Errors
    ///
    /// Fails if the snapshot fails.
    pub fn apply_edited_image(&mut self, source: ImageSource) -> CanvasResult<SceneChange> {
        let change = self.surface.replace_with_image(source);
        self.commit(change)
    }

    /// Step back one history entry. Returns `false` at the earliest entry.
    ///
    /// # Errors
    ///
    /// Fails if the stored snapshot cannot be restored.
    pub fn undo(&mut self) -> CanvasResult<bool> {
        match self.history.undo()? {
            Some(scene) => {
                self.surface.restore(scene);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Step forward one history entry. Returns `false` at the latest entry.
    ///
    /// # Errors
    ///
    /// Fails if the stored snapshot cannot be restored.
    pub fn redo(&mut self) -> CanvasResult<bool> {
        match self.history.redo()? {
            Some(scene) => {
                self.surface.restore(scene);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
