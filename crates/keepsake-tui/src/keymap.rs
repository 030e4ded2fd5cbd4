use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use keepsake_core::config::KeymapConfig;
use tracing::warn;

use crate::input::Action;

/// Parsed key binding (key code + modifiers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub fn simple(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::CONTROL)
    }

    pub fn shift(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::SHIFT)
    }
}

impl From<KeyEvent> for KeyBinding {
    fn from(key: KeyEvent) -> Self {
        Self::new(key.code, key.modifiers)
    }
}

/// Key-to-action lookup built from the configured keymap
pub struct Keymap {
    bindings: HashMap<KeyBinding, Action>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self::from_config(&KeymapConfig::default())
    }
}

impl Keymap {
    pub fn from_config(config: &KeymapConfig) -> Self {
        let mut bindings = HashMap::new();

        let configured = [
            (&config.quit, Action::Quit),
            (&config.begin, Action::Begin),
            (&config.next, Action::Next),
            (&config.previous, Action::Previous),
            (&config.first, Action::First),
            (&config.last, Action::Last),
            (&config.replay, Action::Replay),
            (&config.restart, Action::Restart),
            (&config.toggle_audio, Action::ToggleAudio),
            (&config.help, Action::ToggleHelp),
        ];
        for (key_str, action) in configured {
            let Some(binding) = parse_key_binding(key_str) else {
                warn!("Invalid key binding '{}' for {:?}, leaving it unbound", key_str, action);
                continue;
            };
            if let Some(existing) = bindings.get(&binding) {
                warn!(
                    "Key conflict: '{}' already bound to {:?}, ignoring binding to {:?}",
                    key_str, existing, action
                );
            } else {
                bindings.insert(binding, action);
            }
        }

        // Always available, whatever the config says
        bindings.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        for (code, action) in [
            (KeyCode::Right, Action::Next),
            (KeyCode::Down, Action::Next),
            (KeyCode::Left, Action::Previous),
            (KeyCode::Up, Action::Previous),
            (KeyCode::Home, Action::First),
            (KeyCode::End, Action::Last),
        ] {
            bindings.insert(KeyBinding::simple(code), action);
        }

        Self { bindings }
    }

    pub fn get(&self, binding: &KeyBinding) -> Option<&Action> {
        self.bindings.get(binding)
    }

    /// Lookup that tolerates terminals reporting SHIFT on symbol keys ("?")
    pub fn lookup(&self, binding: &KeyBinding) -> Option<Action> {
        if let Some(action) = self.bindings.get(binding) {
            return Some(*action);
        }
        match binding.code {
            KeyCode::Char(c) if binding.modifiers == KeyModifiers::SHIFT && !c.is_alphabetic() => {
                self.bindings.get(&KeyBinding::simple(binding.code)).copied()
            }
            _ => None,
        }
    }

    /// Bindings for one action, in display form
    pub fn keys_for(&self, action: Action) -> Vec<String> {
        let mut keys: Vec<String> = self
            .bindings
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|(binding, _)| display_binding(binding))
            .collect();
        keys.sort();
        keys
    }
}

/// Parse Vim-style key notation
///
/// Single characters ("l", "?"), uppercase for Shift ("G"), `<C-x>` for Ctrl,
/// `<S-Tab>` for Shift, and named keys such as `<CR>`, `<Space>`, `<Right>`.
pub fn parse_key_binding(s: &str) -> Option<KeyBinding> {
    let s = s.trim();

    if let Some(inner) = s.strip_prefix('<').and_then(|rest| rest.strip_suffix('>')) {
        if let Some(rest) = inner.strip_prefix("C-") {
            return parse_key_name(rest).map(KeyBinding::ctrl);
        }
        if let Some(rest) = inner.strip_prefix("S-") {
            return parse_key_name(rest).map(KeyBinding::shift);
        }
        return parse_key_name(inner).map(KeyBinding::simple);
    }

    let mut chars = s.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    if c.is_ascii_uppercase() {
        Some(KeyBinding::shift(KeyCode::Char(c)))
    } else {
        Some(KeyBinding::simple(KeyCode::Char(c)))
    }
}

fn parse_key_name(name: &str) -> Option<KeyCode> {
    let lower = name.to_lowercase();
    let code = match lower.as_str() {
        "cr" | "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "space" | "spc" => KeyCode::Char(' '),
        "bs" | "backspace" => KeyCode::Backspace,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" | "pgup" => KeyCode::PageUp,
        "pagedown" | "pgdn" => KeyCode::PageDown,
        _ => {
            if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                return (1..=12).contains(&n).then_some(KeyCode::F(n));
            }
            let mut chars = name.chars();
            let c = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            KeyCode::Char(c.to_ascii_lowercase())
        }
    };
    Some(code)
}

/// Short label for the help popup
fn display_binding(binding: &KeyBinding) -> String {
    let key = match binding.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        other => format!("{:?}", other),
    };
    if binding.modifiers.contains(KeyModifiers::CONTROL) {
        format!("Ctrl+{}", key)
    } else {
        key
    }
}
