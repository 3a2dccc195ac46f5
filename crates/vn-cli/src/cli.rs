//! CLI configuration and settings management

use crate::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vn_core::{InputEvent, KeyCode, MouseButton, Point};
use vn_machine::MachineOptions;

/// Configuration loaded from `vn.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Interpreter options
    pub machine: MachineOptions,

    /// Headless run settings
    pub run: RunConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Simulated frame length in milliseconds
    pub frame_ms: u64,

    /// Frames to run before giving up on a waiting script
    pub max_frames: u64,

    /// Text page width in characters
    pub columns: usize,

    /// Text page height in lines
    pub rows: usize,

    /// Input delivered at fixed frames
    pub input: Vec<ScriptedInput>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            frame_ms: 16,
            max_frames: 10_000,
            columns: 40,
            rows: 4,
            input: Vec::new(),
        }
    }
}

/// One scripted input, delivered before the tick of `frame`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedInput {
    pub frame: u64,
    #[serde(flatten)]
    pub action: InputAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputAction {
    /// Press and release a mouse button
    Click {
        #[serde(default = "left_button")]
        button: MouseButton,
    },
    /// Press and release a key
    Key { key: KeyCode },
    /// Move the pointer
    Move { x: i32, y: i32 },
}

fn left_button() -> MouseButton {
    MouseButton::Left
}

impl InputAction {
    pub fn events(&self) -> Vec<InputEvent> {
        match *self {
            InputAction::Click { button } => vec![
                InputEvent::ButtonStateChanged {
                    button,
                    pressed: true,
                },
                InputEvent::ButtonStateChanged {
                    button,
                    pressed: false,
                },
            ],
            InputAction::Key { key } => vec![
                InputEvent::KeyStateChanged { key, pressed: true },
                InputEvent::KeyStateChanged {
                    key,
                    pressed: false,
                },
            ],
            InputAction::Move { x, y } => vec![InputEvent::PointerMoved(Point::new(x, y))],
        }
    }
}

impl CliConfig {
    /// Load configuration from `path`, else `vn.toml` in the working
    /// directory, else the user config directory, else defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }
        let local = Path::new("vn.toml");
        if local.exists() {
            return Self::load_from_file(local);
        }
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&content).map_err(|e| {
            CliError::Config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CliError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }
        std::fs::write(path, content)
            .map_err(|e| CliError::Config(format!("Failed to write config file: {}", e)))?;
        Ok(())
    }

    /// The per-user config file
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vn").join("config.toml"))
    }
}
