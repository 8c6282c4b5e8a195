//! Drawing surface: tool state, brush settings and scene mutations.
//!
//! Every committed mutation returns a [`SceneChange`]. The surface never
//! records history itself; [`crate::EditorSession`] consumes the change and
//! snapshots.

use serde::{Deserialize, Serialize};

use crate::element::{fit_scale, Drawable, DrawableId, ImageLayer, ImageSource, Point, Stroke};
use crate::{CanvasError, CanvasResult, Color, Scene};

/// Smallest brush size.
pub const MIN_BRUSH_SIZE: f32 = 1.0;
/// Largest brush size.
pub const MAX_BRUSH_SIZE: f32 = 50.0;
/// Brush size on a fresh surface.
pub const DEFAULT_BRUSH_SIZE: f32 = 5.0;
/// Where overlay images land.
pub const OVERLAY_POSITION: Point = Point::new(100.0, 100.0);
/// Largest scale applied to overlay images.
pub const OVERLAY_MAX_SCALE: f32 = 0.5;

/// Active tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolMode {
    /// Freehand drawing with the brush color.
    #[default]
    Pencil,
    /// Freehand overpainting with the canvas background color.
    Eraser,
    /// Drag objects; drawing is disabled.
    Move,
}

impl ToolMode {
    /// Whether freehand gestures are accepted.
    #[must_use]
    pub fn is_drawing(self) -> bool {
        matches!(self, Self::Pencil | Self::Eraser)
    }
}

/// Brush color and size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushSettings {
    /// Pencil color.
    pub color: Color,
    /// Pencil width in pixels.
    pub size: f32,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            color: Color::RED,
            size: DEFAULT_BRUSH_SIZE,
        }
    }
}

/// A committed scene mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneChange {
    /// A freehand or programmatic stroke was added.
    StrokeAdded(DrawableId),
    /// All strokes were removed.
    StrokesCleared {
        /// How many strokes were removed.
        removed: usize,
    },
    /// An image was placed above the background.
    ImageAdded(DrawableId),
    /// The background image was installed or replaced.
    BackgroundSet,
    /// An object was dragged; the old id is retired.
    ObjectMoved {
        /// Id before the move.
        from: DrawableId,
        /// Id after the move.
        to: DrawableId,
    },
    /// The whole canvas was replaced by an edited image.
    EditApplied,
}

/// The retained drawing surface of one editor session.
#[derive(Debug, Clone, Default)]
pub struct DrawingSurface {
    scene: Scene,
    mode: ToolMode,
    brush: BrushSettings,
    gesture: Option<Vec<Point>>,
}

impl DrawingSurface {
    /// Create an empty surface of the given size.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            scene: Scene::new(width, height),
            ..Self::default()
        }
    }

    /// The current scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The active tool.
    #[must_use]
    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    /// The brush settings.
    #[must_use]
    pub fn brush(&self) -> BrushSettings {
        self.brush
    }

    /// Switch tools. An unfinished gesture is discarded.
    pub fn set_mode(&mut self, mode: ToolMode) {
        if self.gesture.take().is_some() {
            tracing::debug!("Discarding unfinished gesture on tool switch");
        }
        self.mode = mode;
    }

    /// Set the pencil color.
    pub fn set_brush_color(&mut self, color: Color) {
        self.brush.color = color;
    }

    /// Set the pencil size, clamped to the slider range.
    pub fn set_brush_size(&mut self, size: f32) {
        self.brush.size = if size.is_nan() {
            DEFAULT_BRUSH_SIZE
        } else {
            size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE)
        };
    }

    /// Color and width a gesture would get with the active tool.
    ///
    /// The eraser overpaints with the canvas color at twice the brush size.
    #[must_use]
    pub fn gesture_style(&self) -> Option<(Color, f32)> {
        match self.mode {
            ToolMode::Pencil => Some((self.brush.color, self.brush.size)),
            ToolMode::Eraser => Some((self.scene.background_color, self.brush.size * 2.0)),
            ToolMode::Move => None,
        }
    }

    /// Whether `id` can be picked up right now.
    #[must_use]
    pub fn is_selectable(&self, id: DrawableId) -> bool {
        if self.mode != ToolMode::Move {
            return false;
        }
        match self.scene.get(id) {
            Some(Drawable::Stroke(_)) => true,
            Some(Drawable::Image(image)) => image.selectable,
            None => false,
        }
    }

    /// Start a freehand gesture.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::WrongMode`] in move mode.
    pub fn begin_stroke(&mut self, at: Point) -> CanvasResult<()> {
        if !self.mode.is_drawing() {
            return Err(CanvasError::WrongMode {
                mode: self.mode,
                operation: "begin_stroke",
            });
        }
        self.gesture = Some(vec![at]);
        Ok(())
    }

    /// Extend the current gesture.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::NoActiveGesture`] if no gesture was started.
    pub fn extend_stroke(&mut self, to: Point) -> CanvasResult<()> {
        self.gesture
            .as_mut()
            .ok_or(CanvasError::NoActiveGesture)?
            .push(to);
        Ok(())
    }

    /// Finish the current gesture and commit it as a stroke.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::NoActiveGesture`] if no gesture was started.
    pub fn end_stroke(&mut self) -> CanvasResult<SceneChange> {
        let points = self.gesture.take().ok_or(CanvasError::NoActiveGesture)?;
        let (color, width) = self.gesture_style().ok_or(CanvasError::WrongMode {
            mode: self.mode,
            operation: "end_stroke",
        })?;
        Ok(self.add_stroke(points, color, width))
    }

    /// Commit a stroke directly.
    pub fn add_stroke(&mut self, points: Vec<Point>, color: Color, width: f32) -> SceneChange {
        let id = self
            .scene
            .push(Drawable::Stroke(Stroke::new(points, color, width)));
        SceneChange::StrokeAdded(id)
    }

    /// Place a selectable image above the background.
    pub fn add_image(&mut self, source: ImageSource, position: Point, scale: f32) -> SceneChange {
        let id = self.scene.push(Drawable::Image(ImageLayer {
            source,
            position,
            scale,
            selectable: true,
        }));
        SceneChange::ImageAdded(id)
    }

    /// Place an image at the overlay position, shrunk to at most half the
    /// canvas fit.
    pub fn add_overlay_image(&mut self, source: ImageSource) -> SceneChange {
        let scale = fit_scale(
            self.scene.width,
            self.scene.height,
            &source,
            OVERLAY_MAX_SCALE,
        );
        self.add_image(source, OVERLAY_POSITION, scale)
    }

    /// Install `source` as the centered background, fitted without upscaling.
    pub fn insert_background(&mut self, source: ImageSource) -> SceneChange {
        let scale = fit_scale(self.scene.width, self.scene.height, &source, 1.0);
        self.set_centered_background(source, scale);
        SceneChange::BackgroundSet
    }

    /// Wipe the canvas and show `source` as the only object, fitted to the
    /// canvas (upscaling allowed).
    pub fn replace_with_image(&mut self, source: ImageSource) -> SceneChange {
        self.gesture = None;
        self.scene.clear();
        self.scene.background_color = Color::WHITE;
        let scale = fit_scale(self.scene.width, self.scene.height, &source, f32::INFINITY);
        self.set_centered_background(source, scale);
        SceneChange::EditApplied
    }

    fn set_centered_background(&mut self, source: ImageSource, scale: f32) {
        let mut layer = ImageLayer {
            source,
            position: Point::default(),
            scale,
            selectable: false,
        };
        layer.position = Point::new(
            (self.scene.width - layer.scaled_width()) / 2.0,
            (self.scene.height - layer.scaled_height()) / 2.0,
        );
        self.scene.set_background(layer);
    }

    /// Remove every stroke. Images, including the background, stay.
    pub fn remove_all_strokes(&mut self) -> SceneChange {
        let removed = self.scene.remove_strokes();
        SceneChange::StrokesCleared { removed }
    }

    /// Drag a selectable object by `(dx, dy)`.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::WrongMode`] outside move mode,
    /// [`CanvasError::DrawableNotFound`] for unknown ids and
    /// [`CanvasError::Locked`] for non-selectable images.
    pub fn move_object(&mut self, id: DrawableId, dx: f32, dy: f32) -> CanvasResult<SceneChange> {
        if self.mode != ToolMode::Move {
            return Err(CanvasError::WrongMode {
                mode: self.mode,
                operation: "move_object",
            });
        }
        let drawable = self
            .scene
            .get(id)
            .ok_or_else(|| CanvasError::DrawableNotFound(id.to_string()))?;
        if !self.is_selectable(id) {
            return Err(CanvasError::Locked(id.to_string()));
        }
        let moved = drawable.translated(dx, dy);
        let to = self.scene.replace(id, moved)?;
        Ok(SceneChange::ObjectMoved { from: id, to })
    }

    /// Replace the scene wholesale (history restoration).
    pub fn restore(&mut self, scene: Scene) {
        self.gesture = None;
        self.scene = scene;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(width: u32, height: u32) -> ImageSource {
        ImageSource::new("data:image/png;base64,AAAA", width, height).expect("source")
    }

    #[test]
    fn test_pencil_gesture_uses_brush() {
        let mut surface = DrawingSurface::new(800.0, 600.0);
        surface.set_brush_size(8.0);
        surface.begin_stroke(Point::new(1.0, 1.0)).expect("begin");
        surface.extend_stroke(Point::new(5.0, 5.0)).expect("extend");
        let change = surface.end_stroke().expect("end");

        let SceneChange::StrokeAdded(id) = change else {
            panic!("expected StrokeAdded, got {change:?}");
        };
        let stroke = surface.scene().get(id).and_then(Drawable::as_stroke).expect("stroke");
        assert_eq!(stroke.color, Color::RED);
        assert!((stroke.width - 8.0).abs() < f32::EPSILON);
        assert_eq!(stroke.points.len(), 2);
    }

    #[test]
    fn test_eraser_overpaints_with_background_at_double_width() {
        let mut surface = DrawingSurface::new(800.0, 600.0);
        surface.set_mode(ToolMode::Eraser);
        surface.set_brush_size(6.0);
        assert_eq!(surface.gesture_style(), Some((Color::WHITE, 12.0)));

        surface.begin_stroke(Point::new(0.0, 0.0)).expect("begin");
        surface.end_stroke().expect("end");
        assert_eq!(surface.scene().stroke_count(), 1);
    }

    #[test]
    fn test_move_mode_rejects_gestures() {
        let mut surface = DrawingSurface::new(800.0, 600.0);
        surface.set_mode(ToolMode::Move);
        assert!(matches!(
            surface.begin_stroke(Point::default()),
            Err(CanvasError::WrongMode { .. })
        ));
        assert!(matches!(
            surface.end_stroke(),
            Err(CanvasError::NoActiveGesture)
        ));
    }

    #[test]
    fn test_brush_size_is_clamped() {
        let mut surface = DrawingSurface::default();
        surface.set_brush_size(0.0);
        assert!((surface.brush().size - MIN_BRUSH_SIZE).abs() < f32::EPSILON);
        surface.set_brush_size(500.0);
        assert!((surface.brush().size - MAX_BRUSH_SIZE).abs() < f32::EPSILON);
    }

    #[test]
    fn test_insert_background_fits_without_upscaling() {
        let mut surface = DrawingSurface::new(800.0, 600.0);
        surface.insert_background(source(1600, 600));
        let bg = surface.scene().background().expect("background");
        assert!((bg.scale - 0.5).abs() < f32::EPSILON);
        assert!(bg.scaled_width() <= 800.0 && bg.scaled_height() <= 600.0);
        assert_eq!(bg.position, Point::new(0.0, 150.0));
        assert!(!bg.selectable);

        surface.insert_background(source(200, 100));
        let bg = surface.scene().background().expect("background");
        assert!((bg.scale - 1.0).abs() < f32::EPSILON);
        assert_eq!(bg.position, Point::new(300.0, 250.0));
    }

    #[test]
    fn test_overlay_image_is_capped_at_half() {
        let mut surface = DrawingSurface::new(800.0, 600.0);
        let SceneChange::ImageAdded(id) = surface.add_overlay_image(source(100, 100)) else {
            panic!("expected ImageAdded");
        };
        let Some(Drawable::Image(layer)) = surface.scene().get(id) else {
            panic!("expected image");
        };
        assert!((layer.scale - 0.5).abs() < f32::EPSILON);
        assert_eq!(layer.position, OVERLAY_POSITION);
    }

    #[test]
    fn test_selection_follows_mode() {
        let mut surface = DrawingSurface::new(800.0, 600.0);
        surface.insert_background(source(10, 10));
        let SceneChange::StrokeAdded(id) =
            surface.add_stroke(vec![Point::new(0.0, 0.0)], Color::RED, 5.0)
        else {
            panic!("expected StrokeAdded");
        };
        assert!(!surface.is_selectable(id));
        assert!(matches!(
            surface.move_object(id, 1.0, 1.0),
            Err(CanvasError::WrongMode { .. })
        ));

        surface.set_mode(ToolMode::Move);
        assert!(surface.is_selectable(id));
        let change = surface.move_object(id, 10.0, 20.0).expect("move");
        let SceneChange::ObjectMoved { to, .. } = change else {
            panic!("expected ObjectMoved");
        };
        let stroke = surface.scene().get(to).and_then(Drawable::as_stroke).expect("stroke");
        assert_eq!(stroke.offset, Point::new(10.0, 20.0));
    }

    #[test]
    fn test_locked_image_cannot_move() {
        let mut surface = DrawingSurface::new(800.0, 600.0);
        let SceneChange::ImageAdded(id) = surface.add_image(
            source(10, 10),
            Point::default(),
            1.0,
        ) else {
            panic!("expected ImageAdded");
        };
        surface.set_mode(ToolMode::Move);
        assert!(surface.is_selectable(id));

        let mut locked = surface.scene().clone();
        if let Some(Drawable::Image(layer)) = locked.get(id).cloned() {
            locked
                .replace(
                    id,
                    Drawable::Image(ImageLayer {
                        selectable: false,
                        ..layer
                    }),
                )
                .expect("replace");
        }
        surface.restore(locked);
        let id = surface.scene().drawables().next().map(|(id, _)| id).expect("id");
        assert!(matches!(
            surface.move_object(id, 1.0, 1.0),
            Err(CanvasError::Locked(_))
        ));
    }

    #[test]
    fn test_replace_with_image_wipes_everything() {
        let mut surface = DrawingSurface::new(800.0, 600.0);
        surface.scene.background_color = Color::BLACK;
        surface.insert_background(source(10, 10));
        surface.add_stroke(vec![Point::new(0.0, 0.0)], Color::RED, 5.0);
        surface.add_overlay_image(source(10, 10));

        surface.replace_with_image(source(400, 200));
        let scene = surface.scene();
        assert_eq!(scene.drawable_count(), 0);
        assert_eq!(scene.background_color, Color::WHITE);
        let bg = scene.background().expect("background");
        assert!((bg.scale - 2.0).abs() < f32::EPSILON);
        assert_eq!(bg.position, Point::new(0.0, 100.0));
    }
}
