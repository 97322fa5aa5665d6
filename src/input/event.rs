//! Raw input events and their translation into dispatchable work.

use serde::{Deserialize, Serialize};

use datamark_canvas::{Point, Viewport};

use super::action::{Action, Mode};
use super::keybindings::{Key, KeyBindings, KeyCommand};
use crate::navigation::PageStep;

/// A device event as a source reports it. Pointer coordinates are screen
/// pixels relative to the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InputEvent {
    PointerMove {
        x: f64,
        y: f64,
        #[serde(default)]
        dx: f64,
        #[serde(default)]
        dy: f64,
    },
    PointerDown {
        x: f64,
        y: f64,
    },
    PointerUp {
        x: f64,
        y: f64,
    },
    /// Click on the draw/pan toolbar button.
    ModeButton {
        mode: Mode,
    },
    Key {
        key: Key,
        #[serde(default)]
        repeat: bool,
    },
    Wheel {
        x: f64,
        y: f64,
        /// Positive scrolls down (zoom out).
        delta_y: f64,
    },
}

/// What the session does with one dequeued event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dispatch {
    /// Fold into the interaction state and run the mode handler.
    Reduce(Action),
    /// Load the next or previous page of images.
    Page(PageStep),
    /// Zoom the surface by `factor` about a screen point.
    Zoom { factor: f64, at: Point },
    /// Select a label by index.
    SelectLabel(usize),
}

/// Translate a raw event. Press and release points are mapped into canvas
/// coordinates through the current viewport; move positions stay in screen
/// space and are pan-adjusted later by the draw handler. Key auto-repeats
/// are dropped.
pub fn translate(
    event: InputEvent,
    viewport: &Viewport,
    bindings: &KeyBindings,
    zoom_step: f64,
) -> Option<Dispatch> {
    match event {
        InputEvent::PointerMove { x, y, dx, dy } => {
            Some(Dispatch::Reduce(Action::MouseMove { x, y, dx, dy }))
        }
        InputEvent::PointerDown { x, y } => {
            let p = viewport.screen_to_scene(Point::new(x, y));
            Some(Dispatch::Reduce(Action::MouseDown { x: p.x, y: p.y }))
        }
        InputEvent::PointerUp { x, y } => {
            let p = viewport.screen_to_scene(Point::new(x, y));
            Some(Dispatch::Reduce(Action::MouseUp { x: p.x, y: p.y }))
        }
        InputEvent::ModeButton { mode } => Some(Dispatch::Reduce(Action::SwitchMode(mode))),
        InputEvent::Key { repeat: true, .. } => None,
        InputEvent::Key { key, .. } => bindings.command_for_key(key).map(|cmd| match cmd {
            KeyCommand::NextImage => Dispatch::Reduce(Action::NextImage),
            KeyCommand::PrevImage => Dispatch::Reduce(Action::PrevImage),
            KeyCommand::NextPage => Dispatch::Page(PageStep::Next),
            KeyCommand::PrevPage => Dispatch::Page(PageStep::Previous),
            KeyCommand::SwitchMode(mode) => Dispatch::Reduce(Action::SwitchMode(mode)),
            KeyCommand::SelectLabel(index) => Dispatch::SelectLabel(index),
        }),
        InputEvent::Wheel { x, y, delta_y } => {
            if delta_y == 0.0 {
                return None;
            }
            let factor = if delta_y < 0.0 { zoom_step } else { 1.0 / zoom_step };
            Some(Dispatch::Zoom {
                factor,
                at: Point::new(x, y),
            })
        }
    }
}
