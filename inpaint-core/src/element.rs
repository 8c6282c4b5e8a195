//! Drawable records - the immutable building blocks of a scene.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{CanvasError, CanvasResult};

/// Index of a drawable inside the scene arena.
///
/// Ids stay valid until [`crate::Scene::remove_strokes`] compacts the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DrawableId(pub(crate) usize);

impl DrawableId {
    /// Arena slot of this drawable.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for DrawableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A point in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Pixels from the left edge.
    pub x: f32,
    /// Pixels from the top edge.
    pub y: f32,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Translate by an offset.
    #[must_use]
    pub fn offset_by(self, offset: Point) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y)
    }
}

/// An opaque-or-translucent RGBA color, written as `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Default pencil color.
    pub const RED: Self = Self::rgb(255, 0, 0);

    /// Create an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

impl FromStr for Color {
    type Err = CanvasError;

    fn from_str(s: &str) -> CanvasResult<Self> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| CanvasError::InvalidColor(s.to_string()))?;
        let channel = |i: usize| {
            hex.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| CanvasError::InvalidColor(s.to_string()))
        };
        match hex.len() {
            6 => Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Ok(Self {
                r: channel(0)?,
                g: channel(2)?,
                b: channel(4)?,
                a: channel(6)?,
            }),
            _ => Err(CanvasError::InvalidColor(s.to_string())),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One completed pencil or eraser gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Points in drawing order, relative to `offset`.
    pub points: Vec<Point>,
    /// Stroke color.
    pub color: Color,
    /// Stroke width in pixels.
    pub width: f32,
    /// Position offset applied to every point (changed by move mode).
    #[serde(default)]
    pub offset: Point,
}

impl Stroke {
    /// Create a stroke with no offset.
    #[must_use]
    pub fn new(points: Vec<Point>, color: Color, width: f32) -> Self {
        Self {
            points,
            color,
            width,
            offset: Point::default(),
        }
    }

    /// Points with the offset applied.
    pub fn absolute_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.points.iter().map(|p| p.offset_by(self.offset))
    }
}

/// Image pixels referenced by a scene, plus their natural size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSource {
    /// Encoded image as a data URI (`data:image/png;base64,...`).
    pub data_uri: String,
    /// Natural width in pixels.
    pub width: u32,
    /// Natural height in pixels.
    pub height: u32,
}

impl ImageSource {
    /// Create an image source, rejecting zero-sized images.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidImage`] if either dimension is zero.
    pub fn new(data_uri: impl Into<String>, width: u32, height: u32) -> CanvasResult<Self> {
        if width == 0 || height == 0 {
            return Err(CanvasError::InvalidImage { width, height });
        }
        Ok(Self {
            data_uri: data_uri.into(),
            width,
            height,
        })
    }
}

/// A placed image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageLayer {
    /// Pixel source.
    pub source: ImageSource,
    /// Top-left corner on the canvas.
    pub position: Point,
    /// Uniform scale applied to the natural size.
    pub scale: f32,
    /// Whether move mode may pick this image up.
    pub selectable: bool,
}

impl ImageLayer {
    /// Rendered width in canvas pixels.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn scaled_width(&self) -> f32 {
        self.source.width as f32 * self.scale
    }

    /// Rendered height in canvas pixels.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn scaled_height(&self) -> f32 {
        self.source.height as f32 * self.scale
    }
}

/// Anything stored in the scene arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Drawable {
    /// A vector stroke.
    Stroke(Stroke),
    /// An overlay image drawn above the background.
    Image(ImageLayer),
}

impl Drawable {
    /// Borrow the stroke, if this drawable is one.
    #[must_use]
    pub fn as_stroke(&self) -> Option<&Stroke> {
        match self {
            Self::Stroke(stroke) => Some(stroke),
            Self::Image(_) => None,
        }
    }

    /// Return a copy of this drawable translated by `(dx, dy)`.
    #[must_use]
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        let delta = Point::new(dx, dy);
        match self {
            Self::Stroke(stroke) => Self::Stroke(Stroke {
                offset: stroke.offset.offset_by(delta),
                ..stroke.clone()
            }),
            Self::Image(image) => Self::Image(ImageLayer {
                position: image.position.offset_by(delta),
                ..image.clone()
            }),
        }
    }
}

/// Scale that fits an image inside the canvas, never exceeding `cap`.
///
/// Pass `f32::INFINITY` as `cap` to allow upscaling.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn fit_scale(canvas_width: f32, canvas_height: f32, image: &ImageSource, cap: f32) -> f32 {
    (canvas_width / image.width as f32)
        .min(canvas_height / image.height as f32)
        .min(cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_round_trip_hex() {
        let color: Color = "#ff8000".parse().expect("parse");
        assert_eq!(color, Color::rgb(255, 128, 0));
        assert_eq!(color.to_string(), "#ff8000");

        let translucent: Color = "#00000080".parse().expect("parse");
        assert_eq!(translucent.a, 0x80);
        assert_eq!(translucent.to_string(), "#00000080");
    }

    #[test]
    fn test_color_rejects_garbage() {
        assert!("ff0000".parse::<Color>().is_err());
        assert!("#ff00".parse::<Color>().is_err());
        assert!("#gg0000".parse::<Color>().is_err());
    }

    #[test]
    fn test_fit_scale_caps_upscaling() {
        let small = ImageSource::new("data:,", 100, 50).expect("source");
        assert!((fit_scale(800.0, 600.0, &small, 1.0) - 1.0).abs() < f32::EPSILON);
        assert!((fit_scale(800.0, 600.0, &small, f32::INFINITY) - 8.0).abs() < f32::EPSILON);

        let wide = ImageSource::new("data:,", 1600, 600).expect("source");
        assert!((fit_scale(800.0, 600.0, &wide, 1.0) - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_image_source_rejects_zero_size() {
        assert!(ImageSource::new("data:,", 0, 10).is_err());
    }

    #[test]
    fn test_translated_stroke_moves_offset_only() {
        let stroke = Stroke::new(vec![Point::new(1.0, 1.0)], Color::RED, 5.0);
        let moved = Drawable::Stroke(stroke).translated(10.0, -1.0);
        let moved = moved.as_stroke().expect("stroke");
        assert_eq!(moved.points, vec![Point::new(1.0, 1.0)]);
        assert_eq!(moved.absolute_points().next(), Some(Point::new(11.0, 0.0)));
    }
}
