use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::app::{App, Mode};
use crate::keymap::{KeyBinding, Keymap};

/// Input action that can be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Begin,
    Next,
    Previous,
    First,
    Last,
    Replay,
    Restart,
    ToggleAudio,
    ToggleHelp,
    CloseHelp,
    /// Wheel step: positive scrolls down
    Wheel(i16),
    /// Left click at a terminal cell
    Click { column: u16, row: u16 },
    None,
}

/// Map a key press to an action
pub fn handle_key_event(key: KeyEvent, app: &App, keymap: &Keymap) -> Action {
    if app.mode == Mode::Help {
        // Ctrl+C still quits from the help overlay
        return match keymap.lookup(&KeyBinding::from(key)) {
            Some(Action::Quit) if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
            Some(Action::ToggleHelp) => Action::ToggleHelp,
            _ => Action::CloseHelp,
        };
    }

    if key.code == KeyCode::Esc {
        return Action::None;
    }
    keymap.lookup(&KeyBinding::from(key)).unwrap_or(Action::None)
}

/// Map a mouse event to an action; moves and drags are ignored
pub fn handle_mouse_event(mouse: MouseEvent) -> Action {
    match mouse.kind {
        MouseEventKind::ScrollDown => Action::Wheel(1),
        MouseEventKind::ScrollUp => Action::Wheel(-1),
        MouseEventKind::Down(MouseButton::Left) => Action::Click {
            column: mouse.column,
            row: mouse.row,
        },
        _ => Action::None,
    }
}
