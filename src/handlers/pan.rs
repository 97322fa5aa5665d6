//! Pan mode: dragging moves the viewport.

use datamark_canvas::{Cursor, DrawingSurface};

use super::view;
use crate::state::InteractionState;

/// Each move while the button is held nudges the viewport by the move's
/// delta, so the pan accumulates across the drag.
pub fn handle<S: DrawingSurface + ?Sized>(state: &InteractionState, surface: &mut S) {
    surface.set_cursor(Cursor::Grab);
    view::remove_guides(surface);

    if state.mouse_down() {
        surface.set_cursor(Cursor::Grabbing);
        let delta = state.pointer.pan_move;
        surface.pan(delta.x, delta.y);
    }

    surface.request_render();
}
