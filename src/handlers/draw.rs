//! Draw mode: crosshair guides, drag feedback and committing boxes.

use datamark_canvas::{Cursor, DrawingSurface};

use super::view;
use crate::geometry::{ImageTransform, rect_from_points, to_normalized, unzoom};
use crate::model::{Annotation, AnnotationSequence};
use crate::state::InteractionState;

/// The selected label a committed box gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelContext<'a> {
    pub index: usize,
    pub name: &'a str,
}

/// Run one draw cycle.
///
/// Returns the committed annotation on the cycle right after a release over
/// a loaded image. The box is already rendered on `surface` by then; storing
/// it is up to the caller.
pub fn handle<S: DrawingSurface + ?Sized>(
    state: &InteractionState,
    surface: &mut S,
    image: Option<&ImageTransform>,
    label: LabelContext<'_>,
    sequence: &mut AnnotationSequence,
) -> Option<Annotation> {
    surface.set_cursor(Cursor::Crosshair);
    view::draw_guides(surface, state.mouse());

    let viewport = surface.viewport();
    let rect = rect_from_points(
        state.pointer.rect_start,
        unzoom(state.mouse(), viewport.zoom),
        unzoom(viewport.pan(), viewport.zoom),
    );

    if state.mouse_down() && image.is_some() {
        view::undim(surface);
        view::dim(surface, rect);
    }

    if state.mouse_up() {
        view::undim(surface);
    }

    let mut committed = None;
    if state.render_rectangle() {
        if let Some(transform) = image {
            let id = sequence.mint();
            view::render_annotation(surface, rect, label.name, &id);
            log::debug!("Committed {} ({}) at {:?}", id, label.name, rect);
            committed = Some(Annotation::new(id, label.index, to_normalized(rect, transform)));
        }
    }

    surface.request_render();
    committed
}
