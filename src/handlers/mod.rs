//! Mode handlers: side effects of the reduced state on the drawing surface.

pub mod draw;
pub mod pan;
pub mod view;

pub use draw::LabelContext;

use datamark_canvas::DrawingSurface;

use crate::geometry::ImageTransform;
use crate::input::Mode;
use crate::model::{Annotation, AnnotationSequence};
use crate::state::InteractionState;

/// Run the handler for the current mode. Only drawing can commit an
/// annotation.
pub fn run_mode<S: DrawingSurface + ?Sized>(
    state: &InteractionState,
    surface: &mut S,
    image: Option<&ImageTransform>,
    label: LabelContext<'_>,
    sequence: &mut AnnotationSequence,
) -> Option<Annotation> {
    match state.mode() {
        Mode::Draw => draw::handle(state, surface, image, label, sequence),
        Mode::Pan => {
            pan::handle(state, surface);
            None
        }
    }
}
