use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tab_jump_core::JumpChars;

use crate::syntax::{SyntaxEngine, SyntaxTable};

fn default_true() -> bool {
    true
}

/// What the advance key does when jump-out does not apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TabAction {
    /// Insert a tab or spaces up to the next tab stop
    #[default]
    InsertTab,
    /// Re-indent the current line
    IndentLine,
}

/// Editor display and editing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Show line numbers in the editor
    #[serde(default = "default_true")]
    pub show_line_numbers: bool,

    /// Highlight the current line
    #[serde(default = "default_true")]
    pub show_current_line_highlight: bool,

    /// Syntax highlighting theme
    #[serde(default = "default_theme")]
    pub theme: String,

    #[serde(default = "default_tab_width")]
    pub tab_width: usize,

    /// Insert spaces instead of a tab character
    #[serde(default = "default_true")]
    pub insert_spaces: bool,

    #[serde(default)]
    pub tab_action: TabAction,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            show_line_numbers: true,
            show_current_line_highlight: true,
            theme: default_theme(),
            tab_width: default_tab_width(),
            insert_spaces: true,
            tab_action: TabAction::default(),
        }
    }
}

fn default_theme() -> String {
    "base16-ocean.dark".to_string()
}

fn default_tab_width() -> usize {
    4
}

/// Jump-out configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JumpConfig {
    /// Whether jump mode starts enabled for every document
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub engine: SyntaxEngine,

    /// Ordered jump characters, e.g. `[{ char = ")" }, { char = '"', quote = true }]`
    #[serde(default)]
    pub chars: JumpChars,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            engine: SyntaxEngine::default(),
            chars: JumpChars::default(),
        }
    }
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log file; nothing is logged when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// `tracing_subscriber::EnvFilter` directive
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub jump: JumpConfig,
    #[serde(default)]
    pub keybindings: Keybindings,
    /// Syntax table overrides by language identifier
    #[serde(default)]
    pub languages: HashMap<String, SyntaxTable>,
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load_from_file(path: impl AsRef<Path>) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| miette::miette!("Failed to read config file: {}", e))?;

        toml::from_str(&content).map_err(|e| miette::miette!("Failed to parse config file: {}", e))
    }

    /// Save configuration to file, creating parent directories
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> miette::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| miette::miette!("Failed to serialize config: {}", e))?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| miette::miette!("Failed to create config directory: {}", e))?;
        }

        std::fs::write(path.as_ref(), content)
            .map_err(|e| miette::miette!("Failed to write config file: {}", e))?;

        Ok(())
    }

    /// Load configuration from the default location, or defaults if absent
    pub fn load_default() -> miette::Result<Self> {
        let config_path = Self::default_config_path();

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Get default config file path
    pub fn default_config_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("tab-jump").join("config.toml")
        } else {
            PathBuf::from(".tab-jump.toml")
        }
    }
}

/// Keybindings configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Keybindings {
    /// Quit application (default: Ctrl+Q)
    pub quit: KeyBinding,

    /// Alternative quit binding (default: Esc)
    pub quit_alt: KeyBinding,

    /// Save file (default: Ctrl+S)
    pub save: KeyBinding,

    /// Jump out, or fall back to the editor's tab action (default: Tab)
    pub advance: KeyBinding,

    /// Toggle jump mode for the current document (default: Alt+J)
    pub toggle_jump: KeyBinding,

    /// Toggle jump mode for every document (default: Alt+Shift+J)
    pub toggle_jump_global: KeyBinding,

    /// Switch to the next open document (default: Ctrl+N)
    pub next_document: KeyBinding,

    /// Switch to the previous open document (default: Ctrl+P)
    pub previous_document: KeyBinding,
}

impl Default for Keybindings {
    fn default() -> Self {
        Self {
            quit: KeyBinding::new("q", &["ctrl"]),
            quit_alt: KeyBinding::new("esc", &[]),
            save: KeyBinding::new("s", &["ctrl"]),
            advance: KeyBinding::new("tab", &[]),
            // Alt avoids clashing with terminal Ctrl+J (newline)
            toggle_jump: KeyBinding::new("j", &["alt"]),
            toggle_jump_global: KeyBinding::new("j", &["alt", "shift"]),
            next_document: KeyBinding::new("n", &["ctrl"]),
            previous_document: KeyBinding::new("p", &["ctrl"]),
        }
    }
}

/// Represents a key binding with modifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    pub code: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
}

impl KeyBinding {
    pub fn new(code: &str, modifiers: &[&str]) -> Self {
        Self {
            code: code.to_string(),
            modifiers: modifiers.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Get a human-readable representation of the keybinding
    pub fn display(&self) -> String {
        let mut parts: Vec<String> = self
            .modifiers
            .iter()
            .map(|modifier| match modifier.to_lowercase().as_str() {
                "ctrl" | "control" => "Ctrl".to_string(),
                "shift" => "Shift".to_string(),
                "alt" => "Alt".to_string(),
                _ => modifier.clone(),
            })
            .collect();

        parts.push(self.code.to_uppercase());
        parts.join("+")
    }
}
