//! Customizable key bindings.
//!
//! Keys are written the way a browser reports `KeyboardEvent.key` for the
//! keys we care about: `ArrowUp`, `ArrowDown`, `ArrowLeft`, `ArrowRight`, or
//! a single character such as `d` or `1`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::action::Mode;

/// Maximum number of labels that can have hotkeys (0-9 keys).
pub const MAX_LABEL_HOTKEYS: usize = 10;

/// A keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Char(char),
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ArrowUp" => Ok(Key::ArrowUp),
            "ArrowDown" => Ok(Key::ArrowDown),
            "ArrowLeft" => Ok(Key::ArrowLeft),
            "ArrowRight" => Ok(Key::ArrowRight),
            _ => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Key::Char(c.to_ascii_lowercase())),
                    _ => Err(format!("Unknown key '{}'", s)),
                }
            }
        }
    }
}

impl TryFrom<String> for Key {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::ArrowUp => f.write_str("ArrowUp"),
            Key::ArrowDown => f.write_str("ArrowDown"),
            Key::ArrowLeft => f.write_str("ArrowLeft"),
            Key::ArrowRight => f.write_str("ArrowRight"),
            Key::Char(c) => write!(f, "{}", c),
        }
    }
}

/// What a bound key does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    NextImage,
    PrevImage,
    NextPage,
    PrevPage,
    SwitchMode(Mode),
    /// Select the label at this index.
    SelectLabel(usize),
}

/// Keybinding configuration for the annotator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub next_image: Key,
    pub prev_image: Key,
    pub next_page: Key,
    pub prev_page: Key,
    pub draw_mode: Key,
    pub pan_mode: Key,

    /// Hotkeys for label selection (indices 0-9 map to labels 1-10).
    /// None means no hotkey assigned for that slot.
    pub label_hotkeys: [Option<Key>; MAX_LABEL_HOTKEYS],
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            next_image: Key::ArrowUp,
            prev_image: Key::ArrowDown,
            next_page: Key::ArrowRight,
            prev_page: Key::ArrowLeft,
            draw_mode: Key::Char('d'),
            pan_mode: Key::Char('p'),
            label_hotkeys: [
                Some(Key::Char('1')),
                Some(Key::Char('2')),
                Some(Key::Char('3')),
                Some(Key::Char('4')),
                Some(Key::Char('5')),
                Some(Key::Char('6')),
                Some(Key::Char('7')),
                Some(Key::Char('8')),
                Some(Key::Char('9')),
                Some(Key::Char('0')),
            ],
        }
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the command bound to a key. Navigation and mode keys take
    /// precedence over label hotkeys.
    pub fn command_for_key(&self, key: Key) -> Option<KeyCommand> {
        if key == self.next_image {
            Some(KeyCommand::NextImage)
        } else if key == self.prev_image {
            Some(KeyCommand::PrevImage)
        } else if key == self.next_page {
            Some(KeyCommand::NextPage)
        } else if key == self.prev_page {
            Some(KeyCommand::PrevPage)
        } else if key == self.draw_mode {
            Some(KeyCommand::SwitchMode(Mode::Draw))
        } else if key == self.pan_mode {
            Some(KeyCommand::SwitchMode(Mode::Pan))
        } else {
            self.label_index_for_key(key).map(KeyCommand::SelectLabel)
        }
    }

    /// Get the label index (0-based) that corresponds to a key press, if any.
    pub fn label_index_for_key(&self, key: Key) -> Option<usize> {
        self.label_hotkeys
            .iter()
            .position(|hotkey| *hotkey == Some(key))
    }

    /// Check if a key is bound more than once.
    /// Returns a description of the first clash found.
    pub fn conflict(&self) -> Option<String> {
        let mut seen: Vec<(Key, String)> = Vec::new();
        let named = [
            (self.next_image, "Next image".to_string()),
            (self.prev_image, "Previous image".to_string()),
            (self.next_page, "Next page".to_string()),
            (self.prev_page, "Previous page".to_string()),
            (self.draw_mode, "Draw mode".to_string()),
            (self.pan_mode, "Pan mode".to_string()),
        ];
        let labels = self
            .label_hotkeys
            .iter()
            .enumerate()
            .filter_map(|(i, k)| k.map(|k| (k, format!("Label {}", i + 1))));

        for (key, what) in named.into_iter().chain(labels) {
            if let Some((_, other)) = seen.iter().find(|(k, _)| *k == key) {
                return Some(format!("'{}' is bound to both {} and {}", key, other, what));
            }
            seen.push((key, what));
        }
        None
    }
}
