//! Interaction state and the reducer that folds actions into it.

use datamark_canvas::Point;

use crate::input::{Action, Mode};

/// Fields that carry over from one action to the next.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    /// Last pointer position, screen space.
    pub mouse: Point,
    /// Drag anchor, set on press.
    pub rect_start: Point,
    /// Set on release.
    pub rect_end: Point,
    /// Delta of the last move.
    pub pan_move: Point,
    pub mouse_down: bool,
    pub mode: Mode,
}

/// An event visible to exactly one processing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pulse {
    /// The button was released: the in-progress rectangle should be
    /// committed and the overlay removed.
    Released,
    NextImage,
    PrevImage,
}

/// Snapshot handed to the mode handlers after each action.
///
/// `pulse` is rebuilt by every reduction, so a pulse can never leak into a
/// second cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InteractionState {
    pub pointer: PointerState,
    pub pulse: Option<Pulse>,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one action into the state.
    pub fn reduce(self, action: Action) -> Self {
        let mut pointer = self.pointer;
        let pulse = match action {
            Action::MouseMove { x, y, dx, dy } => {
                pointer.mouse = Point::new(x, y);
                pointer.pan_move = Point::new(dx, dy);
                None
            }
            Action::MouseDown { x, y } => {
                pointer.rect_start = Point::new(x, y);
                pointer.mouse_down = true;
                None
            }
            Action::MouseUp { x, y } => {
                pointer.rect_end = Point::new(x, y);
                pointer.mouse_down = false;
                Some(Pulse::Released)
            }
            Action::SwitchMode(mode) => {
                pointer.mode = mode;
                None
            }
            Action::NextImage => Some(Pulse::NextImage),
            Action::PrevImage => Some(Pulse::PrevImage),
        };
        Self { pointer, pulse }
    }

    pub fn mode(&self) -> Mode {
        self.pointer.mode
    }

    pub fn mouse(&self) -> Point {
        self.pointer.mouse
    }

    pub fn mouse_down(&self) -> bool {
        self.pointer.mouse_down
    }

    /// True only for the cycle right after a release.
    pub fn mouse_up(&self) -> bool {
        self.pulse == Some(Pulse::Released)
    }

    /// True only for the cycle right after a release.
    pub fn render_rectangle(&self) -> bool {
        self.pulse == Some(Pulse::Released)
    }

    pub fn up_arrow_pressed(&self) -> bool {
        self.pulse == Some(Pulse::NextImage)
    }

    pub fn down_arrow_pressed(&self) -> bool {
        self.pulse == Some(Pulse::PrevImage)
    }
}

/// Free-function form of [`InteractionState::reduce`].
pub fn reduce(state: InteractionState, action: Action) -> InteractionState {
    state.reduce(action)
}
