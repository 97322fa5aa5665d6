//! Actions folded by the reducer.

use serde::{Deserialize, Serialize};

/// Interaction mode. Changes only through [`Action::SwitchMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Draw,
    #[default]
    Pan,
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Draw => "Draw",
            Mode::Pan => "Pan",
        }
    }
}

/// One discrete input, already translated out of raw device events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Pointer position in screen space plus the delta since the last move.
    MouseMove { x: f64, y: f64, dx: f64, dy: f64 },
    /// Button press, in canvas (scene) coordinates.
    MouseDown { x: f64, y: f64 },
    /// Button release, in canvas (scene) coordinates.
    MouseUp { x: f64, y: f64 },
    SwitchMode(Mode),
    NextImage,
    PrevImage,
}
