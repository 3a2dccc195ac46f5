use crate::geometry::Point;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    WheelUp,
    WheelDown,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum KeyCode {
    Return,
    KeypadEnter,
    Space,
    Escape,
    Backspace,
    Tab,
    Control,
    Shift,
    Up,
    Down,
    Left,
    Right,
}

impl KeyCode {
    /// Keys that acknowledge a pause or finish a text reveal.
    pub fn is_advance(&self) -> bool {
        matches!(self, KeyCode::Return | KeyCode::KeypadEnter | KeyCode::Space)
    }
}

/// One input notification from the platform layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerMoved(Point),
    ButtonStateChanged { button: MouseButton, pressed: bool },
    KeyStateChanged { key: KeyCode, pressed: bool },
}
