//! Drawing helpers shared by the mode handlers and image loading.

use datamark_canvas::{DrawingSurface, Point, Rect, Shape, Tag, estimate_text_width};

use crate::constants::{annotation_style, guide, overlay};
use crate::geometry::unzoom;
use crate::model::AnnotationId;

/// Replace the crosshair guide lines with ones through `mouse`.
/// `mouse` is in screen space and is mapped onto the canvas through the
/// current pan and zoom.
pub fn draw_guides<S: DrawingSurface + ?Sized>(surface: &mut S, mouse: Point) {
    remove_guides(surface);

    let viewport = surface.viewport();
    let (width, height) = surface.size();
    let mouse = unzoom(mouse, viewport.zoom);
    let pan = unzoom(viewport.pan(), viewport.zoom);
    let x = mouse.x - pan.x;
    let y = mouse.y - pan.y;

    surface.add_shape(Tag::GuideLine, dashed_line(x, 0.0, x, height));
    surface.add_shape(Tag::GuideLine, dashed_line(0.0, y, width, y));
}

fn dashed_line(x1: f64, y1: f64, x2: f64, y2: f64) -> Shape {
    Shape::Line {
        x1,
        y1,
        x2,
        y2,
        stroke: guide::STROKE,
        dash: Some(guide::DASH),
    }
}

pub fn remove_guides<S: DrawingSurface + ?Sized>(surface: &mut S) {
    surface.remove_by_tag(&Tag::GuideLine);
}

/// Dim the whole canvas except for `rect`.
pub fn dim<S: DrawingSurface + ?Sized>(surface: &mut S, rect: Rect) {
    let (width, height) = surface.size();
    surface.add_shape(
        Tag::Overlay,
        Shape::Rect {
            rect: Rect::new(0.0, 0.0, width, height),
            fill: overlay::DIM,
        },
    );
    surface.add_shape(
        Tag::Overlay,
        Shape::Rect {
            rect,
            fill: overlay::HIGHLIGHT,
        },
    );
}

pub fn undim<S: DrawingSurface + ?Sized>(surface: &mut S) {
    surface.remove_by_tag(&Tag::Overlay);
}

/// Render a box with its label above the top-left corner. All three shapes
/// share the annotation's tag so they can be removed together.
pub fn render_annotation<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    rect: Rect,
    label: &str,
    id: &AnnotationId,
) {
    let tag = Tag::object(id.as_str());
    let text_width = estimate_text_width(label, annotation_style::FONT_SIZE);

    surface.add_shape(
        tag.clone(),
        Shape::Rect {
            rect,
            fill: annotation_style::BOX_FILL,
        },
    );
    surface.add_shape(
        tag.clone(),
        Shape::Rect {
            rect: Rect::new(
                rect.left,
                rect.top - annotation_style::LABEL_HEIGHT,
                text_width + 2.0 * annotation_style::TEXT_INSET,
                annotation_style::LABEL_HEIGHT,
            ),
            fill: annotation_style::LABEL_FILL,
        },
    );
    surface.add_shape(
        tag,
        Shape::Text {
            left: rect.left + annotation_style::TEXT_INSET,
            bottom: rect.top - annotation_style::TEXT_INSET,
            text: label.to_string(),
            font_size: annotation_style::FONT_SIZE,
            fill: annotation_style::TEXT_FILL,
        },
    );
}

/// Remove every shape of an annotation. Returns how many were removed.
pub fn remove_annotation<S: DrawingSurface + ?Sized>(surface: &mut S, id: &AnnotationId) -> usize {
    surface.remove_by_tag(&Tag::object(id.as_str()))
}
