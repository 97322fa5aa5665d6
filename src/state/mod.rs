//! Interaction state management.

mod interaction;

pub use interaction::{InteractionState, PointerState, Pulse, reduce};
