//! Input handling: raw device events, key bindings, the merged event queue
//! and the actions the reducer consumes.

mod action;
mod event;
mod keybindings;
mod merger;

pub use action::{Action, Mode};
pub use event::{Dispatch, InputEvent, translate};
pub use keybindings::{Key, KeyBindings, KeyCommand, MAX_LABEL_HOTKEYS};
pub use merger::{
    EventMerger, InputClosed, InputSources, KeyboardSource, ModeButtons, PointerSource,
    WheelSource,
};
