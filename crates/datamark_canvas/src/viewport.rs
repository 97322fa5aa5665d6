//! Pan/zoom viewport mathematics.
//!
//! The viewport maps scene coordinates to screen pixels as
//! `screen = scene * zoom + pan`.

use crate::primitives::Point;

/// Pan/zoom state of the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Viewport {
    /// Create a viewport with the given zoom and pan.
    pub fn new(zoom: f64, pan_x: f64, pan_y: f64) -> Self {
        Self { zoom, pan_x, pan_y }
    }

    /// Identity viewport (zoom=1, no pan).
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Current pan offset in screen pixels.
    pub fn pan(&self) -> Point {
        Point::new(self.pan_x, self.pan_y)
    }

    /// Apply a relative pan.
    pub fn pan_by(&self, dx: f64, dy: f64) -> Viewport {
        Viewport {
            zoom: self.zoom,
            pan_x: self.pan_x + dx,
            pan_y: self.pan_y + dy,
        }
    }

    /// Zoom to `new_zoom` while keeping the scene point under `cursor` fixed.
    pub fn zoom_to_cursor(&self, new_zoom: f64, cursor: Point) -> Viewport {
        let scene = self.screen_to_scene(cursor);

        Viewport {
            zoom: new_zoom,
            pan_x: cursor.x - scene.x * new_zoom,
            pan_y: cursor.y - scene.y * new_zoom,
        }
    }

    /// Multiply the zoom by `factor` about `cursor`, clamped to `[min, max]`.
    pub fn zoom_by(&self, factor: f64, cursor: Point, min: f64, max: f64) -> Viewport {
        let new_zoom = (self.zoom * factor).clamp(min, max);
        self.zoom_to_cursor(new_zoom, cursor)
    }

    /// Screen pixel to scene coordinate.
    pub fn screen_to_scene(&self, p: Point) -> Point {
        Point::new((p.x - self.pan_x) / self.zoom, (p.y - self.pan_y) / self.zoom)
    }

    /// Scene coordinate to screen pixel.
    pub fn scene_to_screen(&self, p: Point) -> Point {
        Point::new(p.x * self.zoom + self.pan_x, p.y * self.zoom + self.pan_y)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_identity_viewport() {
        let v = Viewport::identity();
        assert_eq!(v.zoom, 1.0);
        assert_eq!(v.pan(), Point::ORIGIN);
    }

    #[test]
    fn test_pan_by_accumulates() {
        let v = Viewport::new(1.0, 10.0, 20.0).pan_by(5.0, -10.0).pan_by(1.0, 1.0);
        assert_eq!(v.pan_x, 16.0);
        assert_eq!(v.pan_y, 11.0);
        assert_eq!(v.zoom, 1.0);
    }

    #[test]
    fn test_zoom_to_cursor_preserves_cursor_point() {
        let v = Viewport::new(1.0, 50.0, 30.0);
        let cursor = Point::new(150.0, 120.0);
        let before = v.screen_to_scene(cursor);

        let zoomed = v.zoom_to_cursor(2.0, cursor);
        let after = zoomed.screen_to_scene(cursor);

        assert_eq!(zoomed.zoom, 2.0);
        assert!(approx_eq(before.x, after.x));
        assert!(approx_eq(before.y, after.y));
    }

    #[test]
    fn test_zoom_by_is_clamped() {
        let v = Viewport::new(4.0, 0.0, 0.0);
        assert_eq!(v.zoom_by(1.5, Point::ORIGIN, 0.1, 5.0).zoom, 5.0);
        assert_eq!(v.zoom_by(0.01, Point::ORIGIN, 0.1, 5.0).zoom, 0.1);
    }

    #[test]
    fn test_screen_scene_inverse() {
        let v = Viewport::new(1.7, -42.0, 13.5);
        let p = Point::new(321.0, -7.25);
        let back = v.scene_to_screen(v.screen_to_scene(p));
        assert!(approx_eq(p.x, back.x));
        assert!(approx_eq(p.y, back.y));
    }
}
