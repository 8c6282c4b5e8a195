//! Scene arena for the drawing surface.
//!
//! Drawables are immutable records stored in an append-only arena. The scene
//! keeps an ordered list of ids (back to front) on top of it, so moving an
//! object appends a translated copy and swaps the id in the order list. The
//! background image lives outside the arena and is always drawn first.

use crate::element::{Drawable, DrawableId, ImageLayer, Stroke};
use crate::schema::SceneDocument;
use crate::{CanvasError, CanvasResult, Color};

/// Default canvas width in pixels.
pub const DEFAULT_WIDTH: f32 = 800.0;
/// Default canvas height in pixels.
pub const DEFAULT_HEIGHT: f32 = 600.0;

/// Everything drawn on the canvas.
///
/// Equality compares what is drawn, not arena layout.
#[derive(Debug, Clone)]
pub struct Scene {
    /// Canvas width in pixels.
    pub width: f32,
    /// Canvas height in pixels.
    pub height: f32,
    /// Fill color behind everything; the eraser paints with it.
    pub background_color: Color,
    background: Option<ImageLayer>,
    arena: Vec<Drawable>,
    order: Vec<DrawableId>,
}

impl PartialEq for Scene {
    fn eq(&self, other: &Self) -> bool {
        self.to_document() == other.to_document()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl Scene {
    /// Create an empty white scene.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            background_color: Color::WHITE,
            background: None,
            arena: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Append a drawable on top of the stack.
    pub fn push(&mut self, drawable: Drawable) -> DrawableId {
        let id = DrawableId(self.arena.len());
        self.arena.push(drawable);
        self.order.push(id);
        id
    }

    /// Look up a live drawable.
    #[must_use]
    pub fn get(&self, id: DrawableId) -> Option<&Drawable> {
        if self.order.contains(&id) {
            self.arena.get(id.0)
        } else {
            None
        }
    }

    /// Replace a live drawable with a new record, keeping its stacking slot.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::DrawableNotFound`] if `id` is not in the scene.
    pub fn replace(&mut self, id: DrawableId, drawable: Drawable) -> CanvasResult<DrawableId> {
        let slot = self
            .order
            .iter()
            .position(|&live| live == id)
            .ok_or_else(|| CanvasError::DrawableNotFound(id.to_string()))?;
        let new_id = DrawableId(self.arena.len());
        self.arena.push(drawable);
        self.order[slot] = new_id;
        Ok(new_id)
    }

    /// Live drawables, back to front.
    pub fn drawables(&self) -> impl Iterator<Item = (DrawableId, &Drawable)> {
        self.order
            .iter()
            .filter_map(|&id| self.arena.get(id.0).map(|d| (id, d)))
    }

    /// Live strokes, back to front.
    pub fn strokes(&self) -> impl Iterator<Item = &Stroke> {
        self.drawables().filter_map(|(_, d)| d.as_stroke())
    }

    /// Number of live strokes.
    #[must_use]
    pub fn stroke_count(&self) -> usize {
        self.strokes().count()
    }

    /// Number of live drawables (excluding the background).
    #[must_use]
    pub fn drawable_count(&self) -> usize {
        self.order.len()
    }

    /// Remove every stroke; images stay. Compacts the arena, so earlier ids
    /// become invalid. Returns how many strokes were removed.
    pub fn remove_strokes(&mut self) -> usize {
        let before = self.order.len();
        let kept: Vec<Drawable> = self
            .drawables()
            .filter(|(_, d)| d.as_stroke().is_none())
            .map(|(_, d)| d.clone())
            .collect();
        let removed = before - kept.len();
        self.arena.clear();
        self.order.clear();
        for drawable in kept {
            self.push(drawable);
        }
        removed
    }

    /// Drop every drawable and the background image.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.order.clear();
        self.background = None;
    }

    /// The background image, if any.
    #[must_use]
    pub fn background(&self) -> Option<&ImageLayer> {
        self.background.as_ref()
    }

    /// Install the background image. It is forced non-selectable.
    pub fn set_background(&mut self, mut layer: ImageLayer) {
        layer.selectable = false;
        self.background = Some(layer);
    }

    /// Check if the scene has nothing drawn on it.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.background.is_none() && self.order.is_empty()
    }

    /// Canonical serialized form (arena garbage is dropped).
    #[must_use]
    pub fn to_document(&self) -> SceneDocument {
        SceneDocument {
            width: self.width,
            height: self.height,
            background_color: self.background_color,
            background: self.background.clone(),
            drawables: self.drawables().map(|(_, d)| d.clone()).collect(),
        }
    }

    /// Rebuild a scene from its canonical form.
    #[must_use]
    pub fn from_document(document: SceneDocument) -> Self {
        let mut scene = Self::new(document.width, document.height);
        scene.background_color = document.background_color;
        if let Some(background) = document.background {
            scene.set_background(background);
        }
        for drawable in document.drawables {
            scene.push(drawable);
        }
        scene
    }

    /// Serialize the scene to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CanvasResult<String> {
        serde_json::to_string(&self.to_document()).map_err(CanvasError::Serialization)
    }

    /// Deserialize a scene from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        let document: SceneDocument =
            serde_json::from_str(json).map_err(CanvasError::Serialization)?;
        Ok(Self::from_document(document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ImageSource, Point};

    fn stroke(x: f32) -> Drawable {
        Drawable::Stroke(Stroke::new(
            vec![Point::new(x, 0.0), Point::new(x, 10.0)],
            Color::RED,
            5.0,
        ))
    }

    fn overlay() -> Drawable {
        Drawable::Image(ImageLayer {
            source: ImageSource::new("data:image/png;base64,AAAA", 10, 10).expect("source"),
            position: Point::new(100.0, 100.0),
            scale: 0.5,
            selectable: true,
        })
    }

    #[test]
    fn test_push_and_order() {
        let mut scene = Scene::default();
        assert!(scene.is_empty());

        let a = scene.push(stroke(1.0));
        let b = scene.push(overlay());
        let ids: Vec<_> = scene.drawables().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, b]);
        assert_eq!(scene.stroke_count(), 1);
    }

    #[test]
    fn test_replace_keeps_slot_and_retires_old_id() {
        let mut scene = Scene::default();
        let a = scene.push(stroke(1.0));
        let b = scene.push(stroke(2.0));

        let moved = scene.replace(a, stroke(9.0)).expect("replace");
        assert!(scene.get(a).is_none());
        let ids: Vec<_> = scene.drawables().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![moved, b]);
    }

    #[test]
    fn test_remove_strokes_keeps_images() {
        let mut scene = Scene::default();
        scene.push(stroke(1.0));
        scene.push(overlay());
        scene.push(stroke(2.0));

        assert_eq!(scene.remove_strokes(), 2);
        assert_eq!(scene.stroke_count(), 0);
        assert_eq!(scene.drawable_count(), 1);
    }

    #[test]
    fn test_json_round_trip_drops_arena_garbage() {
        let mut scene = Scene::new(640.0, 480.0);
        let a = scene.push(stroke(1.0));
        scene.replace(a, stroke(3.0)).expect("replace");

        let json = scene.to_json().expect("serialize");
        let restored = Scene::from_json(&json).expect("deserialize");
        assert_eq!(restored.to_document(), scene.to_document());
        assert_eq!(restored.drawable_count(), 1);
    }
}
