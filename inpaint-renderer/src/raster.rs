//! Scene rasterization to PNG.
//!
//! Renders a [`Scene`] the way the editor displays it: background color,
//! background image, then drawables in paint order. The result is what gets
//! sent to the edit endpoint as the `image` field.

use inpaint_core::{Color, Drawable, ImageLayer, Scene, Stroke};
use tiny_skia::{
    FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Transform,
};

use crate::error::{RenderError, RenderResult};
use crate::image::{load_image_from_data_uri, png_data_uri};

/// Configuration for scene rasterization.
#[derive(Debug, Clone)]
pub struct RasterConfig {
    /// Scale factor (e.g. 2.0 for retina).
    pub scale: f32,
    /// Draw a dot for single-point strokes (a click without drag).
    pub draw_dots: bool,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            draw_dots: true,
        }
    }
}

/// Renders a [`Scene`] to pixels.
#[derive(Debug, Clone, Default)]
pub struct SceneRasterizer {
    config: RasterConfig,
}

impl SceneRasterizer {
    /// Create a rasterizer with the given configuration.
    #[must_use]
    pub fn new(config: RasterConfig) -> Self {
        Self { config }
    }

    /// Create a rasterizer with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Render the scene to a pixmap.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be allocated or an embedded
    /// image fails to decode.
    pub fn render(&self, scene: &Scene) -> RenderResult<Pixmap> {
        let (width, height) = output_dimensions(scene, self.config.scale);
        let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::Surface { width, height })?;
        pixmap.fill(to_skia_color(scene.background_color));

        let base = Transform::from_scale(self.config.scale, self.config.scale);

        if let Some(layer) = scene.background() {
            draw_image(&mut pixmap, layer, base)?;
        }

        for (_, drawable) in scene.drawables() {
            match drawable {
                Drawable::Stroke(stroke) => self.draw_stroke(&mut pixmap, stroke, base),
                Drawable::Image(layer) => draw_image(&mut pixmap, layer, base)?,
            }
        }

        Ok(pixmap)
    }

    /// Render the scene to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn render_png(&self, scene: &Scene) -> RenderResult<Vec<u8>> {
        self.render(scene)?
            .encode_png()
            .map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}")))
    }

    /// Render the scene to a `data:image/png;base64,...` URI.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn render_data_uri(&self, scene: &Scene) -> RenderResult<String> {
        Ok(png_data_uri(&self.render_png(scene)?))
    }

    fn draw_stroke(&self, pixmap: &mut Pixmap, stroke: &Stroke, transform: Transform) {
        let mut paint = Paint::default();
        paint.set_color(to_skia_color(stroke.color));
        paint.anti_alias = true;

        let points: Vec<_> = stroke.absolute_points().collect();
        if let [only] = points.as_slice() {
            if !self.config.draw_dots {
                return;
            }
            if let Some(dot) = PathBuilder::from_circle(only.x, only.y, stroke.width / 2.0) {
                pixmap.fill_path(&dot, &paint, FillRule::Winding, transform, None);
            }
            return;
        }

        let Some(path) = polyline(&points) else {
            return;
        };
        let style = tiny_skia::Stroke {
            width: stroke.width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..tiny_skia::Stroke::default()
        };
        pixmap.stroke_path(&path, &paint, &style, transform, None);
    }
}

/// Pixel size of the output for a scene at `scale`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn output_dimensions(scene: &Scene, scale: f32) -> (u32, u32) {
    let width = (scene.width * scale).ceil().max(1.0) as u32;
    let height = (scene.height * scale).ceil().max(1.0) as u32;
    (width, height)
}

/// Build an open polyline path. Returns `None` for fewer than two points.
pub(crate) fn polyline(points: &[inpaint_core::Point]) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    if rest.is_empty() {
        return None;
    }
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for point in rest {
        pb.line_to(point.x, point.y);
    }
    pb.finish()
}

fn draw_image(pixmap: &mut Pixmap, layer: &ImageLayer, base: Transform) -> RenderResult<()> {
    let texture = load_image_from_data_uri(&layer.source.data_uri)?;
    let image = texture.to_pixmap()?;
    let transform = base.pre_concat(
        Transform::from_translate(layer.position.x, layer.position.y)
            .pre_scale(layer.scale, layer.scale),
    );
    let paint = PixmapPaint {
        quality: tiny_skia::FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(0, 0, image.as_ref(), &paint, transform, None);
    Ok(())
}

fn to_skia_color(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::encode_data_uri;
    use inpaint_core::{ImageSource, Point};

    fn solid_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let mut pixmap = Pixmap::new(width, height).expect("pixmap");
        pixmap.fill(tiny_skia::Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3]));
        pixmap.encode_png().expect("png")
    }

    fn pixel(pixmap: &Pixmap, x: u32, y: u32) -> [u8; 4] {
        let p = pixmap.pixel(x, y).expect("in bounds");
        [p.red(), p.green(), p.blue(), p.alpha()]
    }

    #[test]
    fn test_png_export_produces_valid_bytes() {
        let scene = Scene::new(50.0, 50.0);
        let png = SceneRasterizer::with_defaults()
            .render_png(&scene)
            .expect("png export");

        // PNG magic bytes: \x89PNG
        assert!(png.len() > 8);
        assert_eq!(&png[0..4], &[137, 80, 78, 71]);
    }

    #[test]
    fn test_background_color_fills_canvas() {
        let scene = Scene::new(10.0, 10.0);
        let pixmap = SceneRasterizer::with_defaults().render(&scene).expect("render");
        assert_eq!(pixel(&pixmap, 5, 5), [255, 255, 255, 255]);
    }

    #[test]
    fn test_stroke_is_painted_in_its_color() {
        let mut scene = Scene::new(100.0, 100.0);
        scene.push(Drawable::Stroke(Stroke::new(
            vec![Point::new(10.0, 50.0), Point::new(90.0, 50.0)],
            Color::RED,
            10.0,
        )));
        let pixmap = SceneRasterizer::with_defaults().render(&scene).expect("render");
        assert_eq!(pixel(&pixmap, 50, 50), [255, 0, 0, 255]);
        assert_eq!(pixel(&pixmap, 50, 10), [255, 255, 255, 255]);
    }

    #[test]
    fn test_stroke_offset_is_applied() {
        let mut scene = Scene::new(100.0, 100.0);
        let stroke = Drawable::Stroke(Stroke::new(
            vec![Point::new(10.0, 20.0), Point::new(90.0, 20.0)],
            Color::BLACK,
            6.0,
        ));
        scene.push(stroke.translated(0.0, 50.0));
        let pixmap = SceneRasterizer::with_defaults().render(&scene).expect("render");
        assert_eq!(pixel(&pixmap, 50, 70), [0, 0, 0, 255]);
        assert_eq!(pixel(&pixmap, 50, 20), [255, 255, 255, 255]);
    }

    #[test]
    fn test_single_point_stroke_draws_dot() {
        let mut scene = Scene::new(40.0, 40.0);
        scene.push(Drawable::Stroke(Stroke::new(
            vec![Point::new(20.0, 20.0)],
            Color::BLACK,
            10.0,
        )));
        let pixmap = SceneRasterizer::with_defaults().render(&scene).expect("render");
        assert_eq!(pixel(&pixmap, 20, 20), [0, 0, 0, 255]);

        let without = SceneRasterizer::new(RasterConfig {
            draw_dots: false,
            ..RasterConfig::default()
        })
        .render(&scene)
        .expect("render");
        assert_eq!(pixel(&without, 20, 20), [255, 255, 255, 255]);
    }

    #[test]
    fn test_background_image_is_scaled_and_positioned() {
        let png = solid_png(10, 10, [0, 0, 255, 255]);
        let source =
            ImageSource::new(encode_data_uri("image/png", &png), 10, 10).expect("source");
        let mut scene = Scene::new(100.0, 100.0);
        scene.set_background(ImageLayer {
            source,
            position: Point::new(40.0, 40.0),
            scale: 2.0,
            selectable: false,
        });
        let pixmap = SceneRasterizer::with_defaults().render(&scene).expect("render");
        assert_eq!(pixel(&pixmap, 50, 50), [0, 0, 255, 255]);
        assert_eq!(pixel(&pixmap, 30, 30), [255, 255, 255, 255]);
        assert_eq!(pixel(&pixmap, 65, 65), [255, 255, 255, 255]);
    }

    #[test]
    fn test_undecodable_image_is_an_error() {
        let mut scene = Scene::new(10.0, 10.0);
        scene.push(Drawable::Image(ImageLayer {
            source: ImageSource::new("data:image/png;base64,AAAA", 4, 4).expect("source"),
            position: Point::new(0.0, 0.0),
            scale: 1.0,
            selectable: true,
        }));
        assert!(SceneRasterizer::with_defaults().render(&scene).is_err());
    }

    #[test]
    fn test_scale_factor() {
        let scene = Scene::new(100.0, 50.0);
        let pixmap = SceneRasterizer::new(RasterConfig {
            scale: 2.0,
            ..RasterConfig::default()
        })
        .render(&scene)
        .expect("render");
        assert_eq!((pixmap.width(), pixmap.height()), (200, 100));
    }

    #[test]
    fn test_data_uri_prefix() {
        let uri = SceneRasterizer::with_defaults()
            .render_data_uri(&Scene::new(4.0, 4.0))
            .expect("uri");
        assert!(uri.starts_with("data:image/png;base64,"));
    }
}
