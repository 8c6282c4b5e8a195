//! Canonical serialized representation of a scene, used for history snapshots.

use serde::{Deserialize, Serialize};

use crate::element::{Drawable, ImageLayer};
use crate::scene::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::Color;

/// Canonical scene document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Canvas width in pixels.
    #[serde(default = "SceneDocument::default_width")]
    pub width: f32,
    /// Canvas height in pixels.
    #[serde(default = "SceneDocument::default_height")]
    pub height: f32,
    /// Canvas fill color.
    #[serde(default = "SceneDocument::default_background_color")]
    pub background_color: Color,
    /// Back-most image, if any.
    #[serde(default)]
    pub background: Option<ImageLayer>,
    /// Live drawables, back to front.
    #[serde(default)]
    pub drawables: Vec<Drawable>,
}

impl SceneDocument {
    const fn default_width() -> f32 {
        DEFAULT_WIDTH
    }

    const fn default_height() -> f32 {
        DEFAULT_HEIGHT
    }

    const fn default_background_color() -> Color {
        Color::WHITE
    }
}
