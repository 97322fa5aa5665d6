//! The drawing surface trait and its retained-mode implementation.

use crate::placement::{ImagePlacement, fit_image};
use crate::primitives::Point;
use crate::shape::{Cursor, Shape, Tag};
use crate::viewport::Viewport;

/// Operations the annotator needs from a canvas.
///
/// The surface is owned by the composition layer and lent to handlers, which
/// may add and remove shapes or move the viewport but never replace it.
pub trait DrawingSurface {
    /// Surface size in screen pixels.
    fn size(&self) -> (f64, f64);

    /// Add a shape under the given tag.
    fn add_shape(&mut self, tag: Tag, shape: Shape);

    /// Remove every shape carrying `tag`. Returns how many were removed.
    fn remove_by_tag(&mut self, tag: &Tag) -> usize;

    /// Remove all shapes. The viewport is left untouched.
    fn clear(&mut self);

    /// Current pan/zoom.
    fn viewport(&self) -> Viewport;

    /// Relative pan by a screen-pixel delta.
    fn pan(&mut self, dx: f64, dy: f64);

    /// Multiply the zoom by `factor` about a screen point.
    fn zoom_at(&mut self, factor: f64, at: Point);

    /// Change the pointer cursor.
    fn set_cursor(&mut self, cursor: Cursor);

    /// Ask for a repaint at the next opportunity.
    fn request_render(&mut self);

    /// Place an image scaled to fit and centered, replacing any previous
    /// image. Returns `None` if the image or surface has no area.
    fn place_image(&mut self, name: &str, width: u32, height: u32) -> Option<ImagePlacement>;
}

/// In-memory display list.
#[derive(Debug, Clone)]
pub struct Scene {
    width: f64,
    height: f64,
    shapes: Vec<(Tag, Shape)>,
    viewport: Viewport,
    cursor: Cursor,
    zoom_limits: (f64, f64),
    fill_ratio: f64,
    /// Set whenever a render was requested and not yet consumed.
    dirty: bool,
    render_requests: u64,
}

impl Scene {
    /// Default zoom range.
    pub const DEFAULT_ZOOM_LIMITS: (f64, f64) = (0.1, 20.0);
    /// Fraction of the limiting dimension a placed image fills.
    pub const DEFAULT_FILL_RATIO: f64 = 0.9;

    /// Create an empty scene of the given size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            shapes: Vec::new(),
            viewport: Viewport::identity(),
            cursor: Cursor::Default,
            zoom_limits: Self::DEFAULT_ZOOM_LIMITS,
            fill_ratio: Self::DEFAULT_FILL_RATIO,
            dirty: true,
            render_requests: 0,
        }
    }

    /// Override the zoom range.
    pub fn with_zoom_limits(mut self, min: f64, max: f64) -> Self {
        self.zoom_limits = (min, max);
        self
    }

    /// Override the fraction of the surface a placed image fills.
    pub fn with_fill_ratio(mut self, fill_ratio: f64) -> Self {
        self.fill_ratio = fill_ratio;
        self
    }

    /// Resize the surface (e.g. after the host window changed).
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.dirty = true;
    }

    /// All shapes in insertion (paint) order.
    pub fn shapes(&self) -> impl Iterator<Item = (&Tag, &Shape)> {
        self.shapes.iter().map(|(tag, shape)| (tag, shape))
    }

    /// Shapes carrying a specific tag.
    pub fn shapes_tagged<'a>(&'a self, tag: &'a Tag) -> impl Iterator<Item = &'a Shape> + 'a {
        self.shapes
            .iter()
            .filter(move |(t, _)| t == tag)
            .map(|(_, shape)| shape)
    }

    /// Number of shapes carrying a specific tag.
    pub fn count_tagged(&self, tag: &Tag) -> usize {
        self.shapes_tagged(tag).count()
    }

    /// Total number of shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Whether the scene holds no shapes.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Current cursor.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Whether a repaint is pending.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag. Call after painting.
    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// How many renders were requested since creation.
    pub fn render_requests(&self) -> u64 {
        self.render_requests
    }
}

impl DrawingSurface for Scene {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn add_shape(&mut self, tag: Tag, shape: Shape) {
        self.shapes.push((tag, shape));
    }

    fn remove_by_tag(&mut self, tag: &Tag) -> usize {
        let before = self.shapes.len();
        self.shapes.retain(|(t, _)| t != tag);
        before - self.shapes.len()
    }

    fn clear(&mut self) {
        self.shapes.clear();
        self.dirty = true;
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn pan(&mut self, dx: f64, dy: f64) {
        self.viewport = self.viewport.pan_by(dx, dy);
    }

    fn zoom_at(&mut self, factor: f64, at: Point) {
        let (min, max) = self.zoom_limits;
        self.viewport = self.viewport.zoom_by(factor, at, min, max);
        log::trace!("Zoom {:.2}x at ({:.1}, {:.1})", self.viewport.zoom, at.x, at.y);
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn request_render(&mut self) {
        self.dirty = true;
        self.render_requests += 1;
    }

    fn place_image(&mut self, name: &str, width: u32, height: u32) -> Option<ImagePlacement> {
        let placement = fit_image(self.width, self.height, width, height, self.fill_ratio)?;
        self.remove_by_tag(&Tag::Image);
        // Image goes underneath everything already on the surface.
        self.shapes.insert(
            0,
            (
                Tag::Image,
                Shape::Image {
                    name: name.to_string(),
                    placement,
                },
            ),
        );
        log::debug!(
            "Placed '{}' {}x{} at ({:.1}, {:.1}) scale {:.3}",
            name,
            width,
            height,
            placement.left,
            placement.top,
            placement.scale_x
        );
        Some(placement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{Color, Rect};

    fn rect_shape() -> Shape {
        Shape::Rect {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            fill: Color::GREEN,
        }
    }

    #[test]
    fn test_remove_by_tag_only_removes_matching() {
        let mut scene = Scene::new(100.0, 100.0);
        scene.add_shape(Tag::object("a"), rect_shape());
        scene.add_shape(Tag::object("a"), rect_shape());
        scene.add_shape(Tag::object("b"), rect_shape());
        scene.add_shape(Tag::GuideLine, rect_shape());

        assert_eq!(scene.remove_by_tag(&Tag::object("a")), 2);
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.count_tagged(&Tag::object("b")), 1);
        assert_eq!(scene.remove_by_tag(&Tag::object("missing")), 0);
    }

    #[test]
    fn test_clear_keeps_viewport() {
        let mut scene = Scene::new(100.0, 100.0);
        scene.pan(12.0, -3.0);
        scene.add_shape(Tag::Overlay, rect_shape());
        scene.clear();
        assert!(scene.is_empty());
        assert_eq!(scene.viewport().pan(), Point::new(12.0, -3.0));
    }

    #[test]
    fn test_place_image_replaces_previous_and_sits_below() {
        let mut scene = Scene::new(1000.0, 1000.0);
        scene.add_shape(Tag::object("x"), rect_shape());
        scene.place_image("first.png", 100, 100).unwrap();
        let placement = scene.place_image("second.png", 500, 500).unwrap();

        assert_eq!(scene.count_tagged(&Tag::Image), 1);
        let (first_tag, first_shape) = scene.shapes().next().unwrap();
        assert_eq!(first_tag, &Tag::Image);
        match first_shape {
            Shape::Image { name, .. } => assert_eq!(name, "second.png"),
            other => panic!("expected image, got {:?}", other),
        }
        assert!((placement.scale_x - 1.8).abs() < 1e-9);
    }

    #[test]
    fn test_custom_fill_ratio() {
        let mut scene = Scene::new(400.0, 200.0).with_fill_ratio(0.5);
        let p = scene.place_image("a.png", 100, 100).unwrap();
        assert!((p.scaled_height() - 100.0).abs() < 1e-9);
        assert!((p.left - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_respects_limits() {
        let mut scene = Scene::new(100.0, 100.0).with_zoom_limits(0.5, 2.0);
        for _ in 0..10 {
            scene.zoom_at(1.5, Point::new(50.0, 50.0));
        }
        assert_eq!(scene.viewport().zoom, 2.0);
    }

    #[test]
    fn test_request_render_counts() {
        let mut scene = Scene::new(10.0, 10.0);
        scene.clear_dirty();
        scene.request_render();
        scene.request_render();
        assert!(scene.is_dirty());
        assert_eq!(scene.render_requests(), 2);
    }
}
