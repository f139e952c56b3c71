//! Settings, types and defaults.
//!
//! Settings are stored as a RON file under `data/settings/` and are hot-reloadable
//! using the RON watcher utilities (see `ron::setup_ron_watcher`). Every field
//! has a default, so a settings file only needs the values it changes:
//!
//! ```ron
//! (
//!     window: (vsync: false),
//!     export: (timestamped: true),
//!     controls: (keybinds: {"save": "F9"}),
//! )
//! ```
use bevy::prelude::{KeyCode, Resource};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowSettings {
    #[serde(default = "WindowSettings::default_title")]
    pub title: String,
    #[serde(default = "WindowSettings::default_width")]
    pub width: f32, // Initial logical window width
    #[serde(default = "WindowSettings::default_height")]
    pub height: f32, // Initial logical window height
    #[serde(default = "WindowSettings::default_vsync")]
    pub vsync: bool, // Cap FPS to the display refresh rate (applied live)
}

impl WindowSettings {
    fn default_title() -> String { "Castle Builder".to_string() }
    fn default_width() -> f32 { 980.0 }
    fn default_height() -> f32 { 760.0 }
    fn default_vsync() -> bool { true }
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: Self::default_title(),
            width: Self::default_width(),
            height: Self::default_height(),
            vsync: Self::default_vsync(),
        }
    }
}

/// Canvas geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasSettings {
    #[serde(default = "CanvasSettings::default_grid_size")]
    pub grid_size: usize, // Cells per side (read once at startup)
    #[serde(default = "CanvasSettings::default_initial_pixels")]
    pub initial_pixels: u32, // Canvas edge before the first resize event
    #[serde(default = "CanvasSettings::default_min_pixels")]
    pub min_pixels: u32, // Smallest canvas edge a resize may produce
    #[serde(default = "CanvasSettings::default_margin")]
    pub margin: u32, // Canvas edge = min(window width, window height) - margin
}

impl CanvasSettings {
    fn default_grid_size() -> usize { crate::grid::GRID_SIZE }
    fn default_initial_pixels() -> u32 { 512 }
    fn default_min_pixels() -> u32 { 128 }
    fn default_margin() -> u32 { 100 }

    /// Canvas edge length for a window of `width x height` logical pixels.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn edge_for_window(&self, width: f32, height: f32) -> u32 {
        let shortest = width.min(height).max(0.0) as u32;
        shortest.saturating_sub(self.margin).max(self.min_pixels)
    }
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            grid_size: Self::default_grid_size(),
            initial_pixels: Self::default_initial_pixels(),
            min_pixels: Self::default_min_pixels(),
            margin: Self::default_margin(),
        }
    }
}

/// Where the saved document lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "StorageSettings::default_dir")]
    pub dir: String,
    #[serde(default = "StorageSettings::default_slot")]
    pub slot: String, // Storage key; one document per key
}

impl StorageSettings {
    fn default_dir() -> String { "data/storage".to_string() }
    fn default_slot() -> String { crate::persistence::DEFAULT_SLOT.to_string() }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self { dir: Self::default_dir(), slot: Self::default_slot() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    #[serde(default = "ExportSettings::default_dir")]
    pub dir: String,
    #[serde(default = "ExportSettings::default_file_name")]
    pub file_name: String,
    #[serde(default)]
    pub timestamped: bool, // Insert a UTC timestamp into the file name
}

impl ExportSettings {
    fn default_dir() -> String { "exports".to_string() }
    fn default_file_name() -> String { "my_castle.png".to_string() }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
            file_name: Self::default_file_name(),
            timestamped: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteSettings {
    #[serde(default = "PaletteSettings::default_thumbnail_size")]
    pub thumbnail_size: u32, // Edge of each palette thumbnail in pixels
}

impl PaletteSettings {
    fn default_thumbnail_size() -> u32 { 32 }
}

impl Default for PaletteSettings {
    fn default() -> Self {
        Self { thumbnail_size: Self::default_thumbnail_size() }
    }
}

/// Controls / input settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlsSettings {
    #[serde(default)]
    pub keybinds: HashMap<String, String>, // Action name -> key name; overrides the defaults
}

impl ControlsSettings {
    /// Built-in bindings, used for any action the user did not rebind.
    #[must_use]
    pub fn default_keybinds() -> HashMap<String, String> {
        [
            ("tool_draw", "1"),
            ("tool_erase", "2"),
            ("tool_interact", "3"),
            ("cycle_layer", "L"),
            ("toggle_rotate", "R"),
            ("cycle_theme", "B"),
            ("toggle_time", "N"),
            ("save", "F5"),
            ("export", "F6"),
            ("clear", "Delete"),
            ("unlock", "U"),
            ("confirm", "Enter"),
            ("cancel", "Escape"),
            ("dump_debug", "F3"),
        ]
        .into_iter()
        .map(|(a, k)| (a.to_string(), k.to_string()))
        .collect()
    }

    /// Key bound to `action`: the user's binding if it parses, else the default.
    #[must_use]
    pub fn binding(&self, action: &str) -> Option<KeyCode> {
        self.keybinds
            .get(action)
            .and_then(|k| Settings::keycode_from_str(k))
            .or_else(|| {
                Self::default_keybinds()
                    .get(action)
                    .and_then(|k| Settings::keycode_from_str(k))
            })
    }
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self { keybinds: Self::default_keybinds() }
    }
}

/// Top-level Settings
#[derive(Resource, Clone, Debug, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub window: WindowSettings,
    #[serde(default)]
    pub canvas: CanvasSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub export: ExportSettings,
    #[serde(default)]
    pub palette: PaletteSettings,
    #[serde(default)]
    pub controls: ControlsSettings,
}

const LETTERS: [KeyCode; 26] = [
    KeyCode::KeyA, KeyCode::KeyB, KeyCode::KeyC, KeyCode::KeyD, KeyCode::KeyE, KeyCode::KeyF,
    KeyCode::KeyG, KeyCode::KeyH, KeyCode::KeyI, KeyCode::KeyJ, KeyCode::KeyK, KeyCode::KeyL,
    KeyCode::KeyM, KeyCode::KeyN, KeyCode::KeyO, KeyCode::KeyP, KeyCode::KeyQ, KeyCode::KeyR,
    KeyCode::KeyS, KeyCode::KeyT, KeyCode::KeyU, KeyCode::KeyV, KeyCode::KeyW, KeyCode::KeyX,
    KeyCode::KeyY, KeyCode::KeyZ,
];

const DIGITS: [KeyCode; 10] = [
    KeyCode::Digit0, KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4,
    KeyCode::Digit5, KeyCode::Digit6, KeyCode::Digit7, KeyCode::Digit8, KeyCode::Digit9,
];

const FUNCTION_KEYS: [KeyCode; 12] = [
    KeyCode::F1, KeyCode::F2, KeyCode::F3, KeyCode::F4, KeyCode::F5, KeyCode::F6,
    KeyCode::F7, KeyCode::F8, KeyCode::F9, KeyCode::F10, KeyCode::F11, KeyCode::F12,
];

impl Settings {
    /// Convert a key name from `controls.keybinds` into a `KeyCode`.
    ///
    /// # Arguments
    /// * `name` - Case-insensitive key name (e.g. "W", "7", "F5", "Space", "Delete").
    ///
    /// # Returns
    /// The matching `KeyCode`, or `None` if the name is not recognised.
    #[must_use]
    pub fn keycode_from_str(name: &str) -> Option<KeyCode> {
        let s = name.trim().to_ascii_uppercase();
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_uppercase() {
                return Some(LETTERS[(c as u8 - b'A') as usize]);
            }
            if c.is_ascii_digit() {
                return Some(DIGITS[(c as u8 - b'0') as usize]);
            }
        }
        if let Some(n) = s.strip_prefix('F').and_then(|n| n.parse::<usize>().ok()) {
            return n.checked_sub(1).and_then(|i| FUNCTION_KEYS.get(i)).copied();
        }

        Some(match s.as_str() {
            "LEFT" | "ARROWLEFT" => KeyCode::ArrowLeft,
            "RIGHT" | "ARROWRIGHT" => KeyCode::ArrowRight,
            "UP" | "ARROWUP" => KeyCode::ArrowUp,
            "DOWN" | "ARROWDOWN" => KeyCode::ArrowDown,
            "HOME" => KeyCode::Home,
            "END" => KeyCode::End,
            "INSERT" => KeyCode::Insert,
            "DELETE" | "DEL" => KeyCode::Delete,
            "ESC" | "ESCAPE" => KeyCode::Escape,
            "SPACE" => KeyCode::Space,
            "TAB" => KeyCode::Tab,
            "ENTER" | "RETURN" => KeyCode::Enter,
            "BACKSPACE" | "BACK" => KeyCode::Backspace,
            "-" | "MINUS" => KeyCode::Minus,
            "=" | "EQUALS" | "PLUS" => KeyCode::Equal,
            "[" | "LBRACKET" => KeyCode::BracketLeft,
            "]" | "RBRACKET" => KeyCode::BracketRight,
            "," | "COMMA" => KeyCode::Comma,
            "." | "PERIOD" => KeyCode::Period,
            "/" | "SLASH" => KeyCode::Slash,
            _ => return None,
        })
    }
}


pub mod loader;
