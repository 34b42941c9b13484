//! Keyboard bindings and input handling.
//!
//! Centralizes all keyboard shortcuts and key mapping logic.

use nannou::prelude::*;

/// Actions that can be triggered by key presses
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    ToggleHelp,
    ToggleBars,
    ToggleFullscreen,
    /// Stop or resume the animation
    Freeze,
    NextDevice,
    SelectPattern(usize),
}

/// Parse a key into an action
pub fn parse_key(key: Key) -> Option<Action> {
    match key {
        Key::Q => Some(Action::Quit),
        Key::H => Some(Action::ToggleHelp),
        Key::B => Some(Action::ToggleBars),
        Key::F => Some(Action::ToggleFullscreen),
        Key::Space => Some(Action::Freeze),
        Key::Tab => Some(Action::NextDevice),
        _ => parse_number_key(key).map(Action::SelectPattern),
    }
}

/// Parse number keys 1-6 into pattern indices
fn parse_number_key(key: Key) -> Option<usize> {
    match key {
        Key::Key1 => Some(0),
        Key::Key2 => Some(1),
        Key::Key3 => Some(2),
        Key::Key4 => Some(3),
        Key::Key5 => Some(4),
        Key::Key6 => Some(5),
        _ => None,
    }
}
