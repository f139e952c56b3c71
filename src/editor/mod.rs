//! Editor state: everything about the active document that is not the grid
//! itself. The `EditorState` resource is the single authoritative instance;
//! UI systems change it by sending `EditorCommand` events.

use crate::grid::{Grid, Layer};
use crate::raster::{rgb, Color};
use bevy::prelude::{Event, Resource};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tool {
    #[default]
    Draw,
    Erase,
    Interact,
}

impl Tool {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Tool::Draw => "draw",
            Tool::Erase => "erase",
            Tool::Interact => "interact",
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Tool::Draw => Tool::Erase,
            Tool::Erase => Tool::Interact,
            Tool::Interact => Tool::Draw,
        }
    }
}

/// Background fill of the canvas. Unknown or null names parse as `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum Theme {
    #[default]
    None,
    Grass,
    Sand,
    Water,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::None, Theme::Grass, Theme::Sand, Theme::Water];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Theme::None => "none",
            Theme::Grass => "grass",
            Theme::Sand => "sand",
            Theme::Water => "water",
        }
    }

    #[must_use]
    pub fn fill(self) -> Color {
        match self {
            Theme::None => rgb(0x1A1A1A),
            Theme::Grass => rgb(0x228B22),
            Theme::Sand => rgb(0xDEB887),
            Theme::Water => rgb(0x1E90FF),
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Theme::None => Theme::Grass,
            Theme::Grass => Theme::Sand,
            Theme::Sand => Theme::Water,
            Theme::Water => Theme::None,
        }
    }
}

impl From<String> for Theme {
    fn from(s: String) -> Self {
        Theme::ALL.into_iter().find(|t| t.name() == s).unwrap_or_default()
    }
}

impl From<Option<String>> for Theme {
    fn from(s: Option<String>) -> Self {
        s.map(Theme::from).unwrap_or_default()
    }
}

impl From<Theme> for String {
    fn from(t: Theme) -> Self {
        t.name().to_string()
    }
}

/// Unknown or null names parse as `Day`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum TimeOfDay {
    #[default]
    Day,
    Night,
}

impl TimeOfDay {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            TimeOfDay::Day => "day",
            TimeOfDay::Night => "night",
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            TimeOfDay::Day => TimeOfDay::Night,
            TimeOfDay::Night => TimeOfDay::Day,
        }
    }
}

impl From<String> for TimeOfDay {
    fn from(s: String) -> Self {
        if s == "night" { TimeOfDay::Night } else { TimeOfDay::Day }
    }
}

impl From<Option<String>> for TimeOfDay {
    fn from(s: Option<String>) -> Self {
        s.map(TimeOfDay::from).unwrap_or_default()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.name().to_string()
    }
}

/// Destructive actions waiting on a yes/no answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    ClearGrid,
}

impl Confirmation {
    #[must_use]
    pub fn prompt(self) -> &'static str {
        match self {
            Confirmation::ClearGrid => "Are you sure you want to clear the grid?",
        }
    }
}

/// Requests from the palette, toolbar and keyboard.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum EditorCommand {
    Select(String),
    CycleLayer,
    SetTool(Tool),
    CycleTool,
    ToggleRotate,
    CycleTheme,
    ToggleTimeOfDay,
    Save,
    RequestClear,
    Confirm(bool),
    Export,
    Unlock,
    DumpDebug,
}

#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct EditorState {
    pub selected: Option<String>,
    pub layer: Layer,
    pub tool: Tool,
    pub rotate: bool,
    pub theme: Theme,
    pub time_of_day: TimeOfDay,
    pub frame: u64,
    pub pending: Option<Confirmation>,
}

impl EditorState {
    /// Rotation applied to newly placed blocks.
    #[must_use]
    pub fn rotation(&self) -> f32 {
        if self.rotate { std::f32::consts::FRAC_PI_2 } else { 0.0 }
    }

    pub fn advance_frame(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }

    pub fn request_clear(&mut self) {
        self.pending = Some(Confirmation::ClearGrid);
    }

    /// Answer the pending confirmation. Returns `true` if the grid was cleared.
    pub fn resolve_confirmation(&mut self, accept: bool, grid: &mut Grid) -> bool {
        match self.pending.take() {
            Some(Confirmation::ClearGrid) if accept => {
                grid.clear();
                true
            }
            _ => false,
        }
    }

    /// Whether `command` may run now. While a confirmation is pending only
    /// the answer and the debug dump go through.
    #[must_use]
    pub fn accepts(&self, command: &EditorCommand) -> bool {
        match command {
            EditorCommand::DumpDebug => true,
            EditorCommand::Confirm(_) => self.pending.is_some(),
            _ => self.pending.is_none(),
        }
    }

    /// Apply a command that only touches editor state. Returns `false` for
    /// commands the shell must handle (save, export, clear, ...).
    pub fn apply(&mut self, command: &EditorCommand) -> bool {
        match command {
            EditorCommand::Select(name) => self.selected = Some(name.clone()),
            EditorCommand::CycleLayer => self.layer = self.layer.other(),
            EditorCommand::SetTool(tool) => self.tool = *tool,
            EditorCommand::CycleTool => self.tool = self.tool.next(),
            EditorCommand::ToggleRotate => self.rotate = !self.rotate,
            EditorCommand::CycleTheme => self.theme = self.theme.next(),
            EditorCommand::ToggleTimeOfDay => self.time_of_day = self.time_of_day.toggled(),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockRegistry;

    #[test]
    fn rotation_follows_toggle() {
        let mut state = EditorState::default();
        assert!(state.rotation().abs() < f32::EPSILON);
        state.apply(&EditorCommand::ToggleRotate);
        assert!((state.rotation() - std::f32::consts::FRAC_PI_2).abs() < f32::EPSILON);
    }

    #[test]
    fn declined_clear_changes_nothing() {
        let registry = BlockRegistry::builtin();
        let mut grid = Grid::default();
        grid.place(Layer::Background, 2, 2, registry.get("Wall").unwrap(), 0.0);
        let mut state = EditorState::default();

        state.request_clear();
        assert_eq!(state.pending.map(Confirmation::prompt), Some("Are you sure you want to clear the grid?"));
        assert!(!state.resolve_confirmation(false, &mut grid));
        assert_eq!(grid.count(), 1);
        assert!(state.pending.is_none());

        // answering with nothing pending is a no-op
        assert!(!state.resolve_confirmation(true, &mut grid));
        assert_eq!(grid.count(), 1);

        state.request_clear();
        assert!(state.resolve_confirmation(true, &mut grid));
        assert!(grid.is_empty());
    }

    #[test]
    fn pending_confirmation_blocks_other_commands() {
        let mut state = EditorState::default();
        assert!(state.accepts(&EditorCommand::Unlock));
        assert!(!state.accepts(&EditorCommand::Confirm(true)));

        state.request_clear();
        for blocked in [
            EditorCommand::Unlock,
            EditorCommand::Save,
            EditorCommand::RequestClear,
            EditorCommand::CycleTheme,
            EditorCommand::Select("Wall".to_string()),
        ] {
            assert!(!state.accepts(&blocked), "{blocked:?}");
        }
        assert!(state.accepts(&EditorCommand::Confirm(false)));
        assert!(state.accepts(&EditorCommand::DumpDebug));
    }

    #[test]
    fn cycles_wrap_around() {
        let mut state = EditorState::default();
        for _ in 0..3 {
            state.apply(&EditorCommand::CycleTool);
        }
        assert_eq!(state.tool, Tool::Draw);
        for _ in 0..4 {
            state.apply(&EditorCommand::CycleTheme);
        }
        assert_eq!(state.theme, Theme::None);
        state.apply(&EditorCommand::CycleLayer);
        assert_eq!(state.layer, Layer::Foreground);
        assert!(!state.apply(&EditorCommand::Save));
    }

    #[test]
    fn unknown_names_fall_back() {
        assert_eq!(Theme::from("lava".to_string()), Theme::None);
        assert_eq!(Theme::from("sand".to_string()), Theme::Sand);
        assert_eq!(TimeOfDay::from("dusk".to_string()), TimeOfDay::Day);
        let t: Theme = serde_json::from_str("\"water\"").unwrap();
        assert_eq!(t, Theme::Water);
        assert_eq!(serde_json::to_string(&TimeOfDay::Night).unwrap(), "\"night\"");
        let t: TimeOfDay = serde_json::from_str("null").unwrap();
        assert_eq!(t, TimeOfDay::Day);
        let t: Theme = serde_json::from_str("null").unwrap();
        assert_eq!(t, Theme::None);
    }
}
