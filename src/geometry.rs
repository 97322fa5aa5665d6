//! Coordinate transforms between screen space and image-normalized space.
//!
//! Screen rectangles are pixels on the canvas and depend on pan/zoom.
//! Normalized rectangles are fractions of the displayed image's size and do
//! not. Nothing here clamps: a box drawn past the image edge normalizes to
//! values outside `[0, 1]` and converts back unchanged.

pub use datamark_canvas::{Point, Rect};
use datamark_canvas::ImagePlacement;

/// Where the reference image sits on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageTransform {
    /// Placed left offset
    pub left: f64,
    /// Placed top offset
    pub top: f64,
    /// Displayed (scaled) width
    pub width: f64,
    /// Displayed (scaled) height
    pub height: f64,
}

impl ImageTransform {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// A transform is usable only with a positive displayed size.
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

impl From<ImagePlacement> for ImageTransform {
    fn from(p: ImagePlacement) -> Self {
        Self::new(p.left, p.top, p.scaled_width(), p.scaled_height())
    }
}

/// Screen rectangle to normalized rectangle.
pub fn to_normalized(rect: Rect, t: &ImageTransform) -> Rect {
    Rect {
        left: (rect.left - t.left) / t.width,
        top: (rect.top - t.top) / t.height,
        width: rect.width / t.width,
        height: rect.height / t.height,
    }
}

/// Normalized rectangle to screen rectangle; inverse of [`to_normalized`].
pub fn to_screen(rect: Rect, t: &ImageTransform) -> Rect {
    Rect {
        left: t.left + rect.left * t.width,
        top: t.top + rect.top * t.height,
        width: rect.width * t.width,
        height: rect.height * t.height,
    }
}

/// Divide a screen-space point or offset by the zoom factor.
///
/// Feeding `rect_from_points` the unzoomed pointer and pan makes
/// `current - pan` equal to the viewport's screen-to-canvas mapping, so the
/// anchor and the pointer end up in the same space at any zoom.
pub fn unzoom(p: Point, zoom: f64) -> Point {
    Point::new(p.x / zoom, p.y / zoom)
}

/// Rectangle spanned by a drag anchor and the current pointer.
///
/// Only `current` is pan-adjusted: the anchor was already converted to
/// canvas coordinates when the button went down, and the pan cannot change
/// mid-drag while drawing.
pub fn rect_from_points(anchor: Point, current: Point, pan: Point) -> Rect {
    let x2 = current.x - pan.x;
    let y2 = current.y - pan.y;

    Rect {
        left: anchor.x.min(x2),
        top: anchor.y.min(y2),
        width: (anchor.x - x2).abs(),
        height: (anchor.y - y2).abs(),
    }
}
