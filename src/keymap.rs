use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use itertools::Itertools;
use miette::Diagnostic;
use thiserror::Error;

use crate::config::{KeyBinding, Keybindings, TabAction};

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum KeyBindingError {
    #[error("unknown key {0:?}")]
    #[diagnostic(
        code(tab_jump::keymap::unknown_key),
        help("use a single character, a function key (f1-f12) or one of esc, enter, backspace, tab, space")
    )]
    UnknownKey(String),

    #[error("unknown modifier {0:?}")]
    #[diagnostic(
        code(tab_jump::keymap::unknown_modifier),
        help("modifiers are ctrl, shift and alt")
    )]
    UnknownModifier(String),
}

/// A key together with its modifiers, normalized for lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyChord {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        let code = match code {
            KeyCode::Char(c) => KeyCode::Char(c.to_lowercase().next().unwrap_or(c)),
            other => other,
        };
        Self { code, modifiers }
    }

    pub fn from_event(key: &KeyEvent) -> Self {
        Self::new(key.code, key.modifiers)
    }
}

impl TryFrom<&KeyBinding> for KeyChord {
    type Error = KeyBindingError;

    fn try_from(binding: &KeyBinding) -> Result<Self, Self::Error> {
        let code = match binding.code.to_lowercase().as_str() {
            "esc" => KeyCode::Esc,
            "enter" => KeyCode::Enter,
            "backspace" => KeyCode::Backspace,
            "tab" => KeyCode::Tab,
            "space" => KeyCode::Char(' '),
            s if s.len() > 1 && s.starts_with('f') => s[1..]
                .parse::<u8>()
                .ok()
                .filter(|n| (1..=12).contains(n))
                .map(KeyCode::F)
                .ok_or_else(|| KeyBindingError::UnknownKey(binding.code.clone()))?,
            s => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return Err(KeyBindingError::UnknownKey(binding.code.clone())),
                }
            }
        };

        let mut modifiers = KeyModifiers::empty();
        for modifier in &binding.modifiers {
            modifiers |= match modifier.to_lowercase().as_str() {
                "ctrl" | "control" => KeyModifiers::CONTROL,
                "shift" => KeyModifiers::SHIFT,
                "alt" => KeyModifiers::ALT,
                _ => return Err(KeyBindingError::UnknownModifier(modifier.clone())),
            };
        }

        Ok(Self::new(code, modifiers))
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modifiers = [
            (KeyModifiers::CONTROL, "Ctrl"),
            (KeyModifiers::ALT, "Alt"),
            (KeyModifiers::SHIFT, "Shift"),
        ]
        .into_iter()
        .filter(|(m, _)| self.modifiers.contains(*m))
        .map(|(_, name)| name.to_string());

        let key = match self.code {
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) => c.to_uppercase().to_string(),
            KeyCode::F(n) => format!("F{n}"),
            other => format!("{other:?}"),
        };

        write!(f, "{}", modifiers.chain(std::iter::once(key)).join("+"))
    }
}

/// Keymap layers, lowest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    /// Editor defaults
    Base,
    /// Bindings active while jump mode is on for the document
    JumpOut,
}

/// Commands a key can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Save,
    /// Step over a closing character, or run the next binding below
    JumpOut,
    InsertTab,
    IndentLine,
    ToggleJump,
    ToggleJumpGlobal,
    NextDocument,
    PreviousDocument,
}

impl From<TabAction> for Command {
    fn from(action: TabAction) -> Self {
        match action {
            TabAction::InsertTab => Command::InsertTab,
            TabAction::IndentLine => Command::IndentLine,
        }
    }
}

/// Layered key bindings
///
/// Lookup walks enabled layers from the highest priority down. A command
/// that declines a key can resolve the same key strictly below its own layer
/// and run that binding instead.
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    layers: BTreeMap<Layer, HashMap<KeyChord, Command>>,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(
        keybindings: &Keybindings,
        tab_action: TabAction,
    ) -> Result<Self, KeyBindingError> {
        let mut keymap = Self::new();
        let base = [
            (&keybindings.quit, Command::Quit),
            (&keybindings.quit_alt, Command::Quit),
            (&keybindings.save, Command::Save),
            (&keybindings.advance, Command::from(tab_action)),
            (&keybindings.toggle_jump, Command::ToggleJump),
            (&keybindings.toggle_jump_global, Command::ToggleJumpGlobal),
            (&keybindings.next_document, Command::NextDocument),
            (&keybindings.previous_document, Command::PreviousDocument),
        ];

        for (binding, command) in base {
            keymap.bind(Layer::Base, KeyChord::try_from(binding)?, command);
        }
        keymap.bind(
            Layer::JumpOut,
            KeyChord::try_from(&keybindings.advance)?,
            Command::JumpOut,
        );

        Ok(keymap)
    }

    pub fn bind(&mut self, layer: Layer, chord: KeyChord, command: Command) {
        self.layers.entry(layer).or_default().insert(chord, command);
    }

    /// Find the highest-priority enabled binding for `chord`
    pub fn resolve(
        &self,
        chord: &KeyChord,
        enabled: impl Fn(Layer) -> bool,
    ) -> Option<(Layer, Command)> {
        self.layers
            .iter()
            .rev()
            .filter(|(layer, _)| enabled(**layer))
            .find_map(|(layer, bindings)| bindings.get(chord).map(|cmd| (*layer, *cmd)))
    }

    /// Find the binding for `chord` in enabled layers strictly below `layer`
    pub fn resolve_below(
        &self,
        layer: Layer,
        chord: &KeyChord,
        enabled: impl Fn(Layer) -> bool,
    ) -> Option<(Layer, Command)> {
        self.resolve(chord, |l| l < layer && enabled(l))
    }
}
