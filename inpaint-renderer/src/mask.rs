//! Binary edit masks.
//!
//! White marks the region the provider may repaint, black is preserved. Every
//! stroke in the scene is redrawn in white, widened to three times the brush
//! size so the editable region comfortably covers what the user painted.

use inpaint_core::{Point, Scene};
use tiny_skia::{Paint, Pixmap, Transform};

use crate::error::{RenderError, RenderResult};
use crate::image::png_data_uri;
use crate::raster::{output_dimensions, polyline};

/// Mask strokes are this many times wider than the brush.
pub const MASK_DILATION: f32 = 3.0;

/// Builds masks from the strokes of a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskCompositor {
    brush_size: f32,
}

impl MaskCompositor {
    /// Create a compositor for the current brush size.
    #[must_use]
    pub fn new(brush_size: f32) -> Self {
        Self { brush_size }
    }

    /// Width of white strokes in the mask.
    #[must_use]
    pub fn stroke_width(&self) -> f32 {
        self.brush_size * MASK_DILATION
    }

    /// Composite the mask for `scene`.
    ///
    /// Images and stroke colors are ignored. Single-point strokes have no
    /// path and contribute nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be allocated.
    pub fn compose(&self, scene: &Scene) -> RenderResult<Mask> {
        let (width, height) = output_dimensions(scene, 1.0);
        let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::Surface { width, height })?;
        pixmap.fill(tiny_skia::Color::BLACK);

        let mut paint = Paint::default();
        paint.set_color(tiny_skia::Color::WHITE);
        paint.anti_alias = false;

        let style = tiny_skia::Stroke {
            width: self.stroke_width(),
            ..tiny_skia::Stroke::default()
        };

        let mut painted = 0usize;
        for stroke in scene.strokes() {
            let points: Vec<Point> = stroke.absolute_points().collect();
            if let Some(path) = polyline(&points) {
                pixmap.stroke_path(&path, &paint, &style, Transform::identity(), None);
                painted += 1;
            }
        }
        tracing::debug!(strokes = painted, width, height, "Composited edit mask");

        Ok(Mask { pixmap })
    }
}

/// A black/white mask image.
#[derive(Debug, Clone)]
pub struct Mask {
    pixmap: Pixmap,
}

impl Mask {
    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Whether the pixel at `(x, y)` is editable. Out of bounds is `false`.
    #[must_use]
    pub fn is_white(&self, x: u32, y: u32) -> bool {
        self.pixmap
            .pixel(x, y)
            .is_some_and(|p| p.red() == u8::MAX && p.green() == u8::MAX && p.blue() == u8::MAX)
    }

    /// Number of editable pixels.
    #[must_use]
    pub fn white_pixel_count(&self) -> usize {
        self.pixmap
            .pixels()
            .iter()
            .filter(|p| p.red() == u8::MAX)
            .count()
    }

    /// Raw pixmap.
    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Encode as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn to_png(&self) -> RenderResult<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}")))
    }

    /// Encode as a `data:image/png;base64,...` URI.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn to_data_uri(&self) -> RenderResult<String> {
        Ok(png_data_uri(&self.to_png()?))
    }
}
