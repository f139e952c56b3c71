//! Pointer, touch and keyboard input.
use bevy::input::touch::Touches;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use castle_builder::block::BlockRegistry;
use castle_builder::editor::{EditorCommand, EditorState, Tool};
use castle_builder::grid::Grid;
use castle_builder::interaction::handle_pointer;
use castle_builder::settings::Settings;
use castle_builder::ui::CanvasNode;

/// Command triggered by a keybind action name.
#[must_use]
pub fn command_for_action(action: &str) -> Option<EditorCommand> {
    Some(match action {
        "tool_draw" => EditorCommand::SetTool(Tool::Draw),
        "tool_erase" => EditorCommand::SetTool(Tool::Erase),
        "tool_interact" => EditorCommand::SetTool(Tool::Interact),
        "cycle_layer" => EditorCommand::CycleLayer,
        "toggle_rotate" => EditorCommand::ToggleRotate,
        "cycle_theme" => EditorCommand::CycleTheme,
        "toggle_time" => EditorCommand::ToggleTimeOfDay,
        "save" => EditorCommand::Save,
        "export" => EditorCommand::Export,
        "clear" => EditorCommand::RequestClear,
        "unlock" => EditorCommand::Unlock,
        "confirm" => EditorCommand::Confirm(true),
        "cancel" => EditorCommand::Confirm(false),
        "dump_debug" => EditorCommand::DumpDebug,
        _ => return None,
    })
}

const ACTIONS: [&str; 14] = [
    "tool_draw",
    "tool_erase",
    "tool_interact",
    "cycle_layer",
    "toggle_rotate",
    "cycle_theme",
    "toggle_time",
    "save",
    "export",
    "clear",
    "unlock",
    "confirm",
    "cancel",
    "dump_debug",
];

/// Send the command of every keybind pressed this frame. While a
/// confirmation is pending only confirm/cancel (and the debug dump) go through.
#[allow(clippy::needless_pass_by_value)]
pub fn keyboard_shortcuts(
    keys: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
    editor: Res<EditorState>,
    mut out: EventWriter<EditorCommand>,
) {
    for action in ACTIONS {
        let Some(key) = settings.controls.binding(action) else { continue };
        if !keys.just_pressed(key) {
            continue;
        }
        let Some(command) = command_for_action(action) else { continue };
        if editor.accepts(&command) {
            out.send(command);
        }
    }
}

#[derive(bevy::ecs::system::SystemParam)]
pub struct PointerCtx<'w, 's> {
    pub mouse: Res<'w, ButtonInput<MouseButton>>,
    pub touches: Res<'w, Touches>,
    pub windows: Query<'w, 's, &'static Window, With<PrimaryWindow>>,
    pub canvas: Query<'w, 's, (&'static Node, &'static GlobalTransform), With<CanvasNode>>,
    pub grid: ResMut<'w, Grid>,
    pub registry: Res<'w, BlockRegistry>,
    pub editor: Res<'w, EditorState>,
}

/// Apply the active tool where the canvas was clicked or touched.
pub fn canvas_pointer(mut ctx: PointerCtx<'_, '_>) {
    if ctx.editor.pending.is_some() {
        return;
    }

    let mut presses: Vec<Vec2> = ctx.touches.iter_just_pressed().map(|t| t.position()).collect();
    if ctx.mouse.just_pressed(MouseButton::Left)
        && let Ok(window) = ctx.windows.get_single()
        && let Some(cursor) = window.cursor_position()
    {
        presses.push(cursor);
    }
    if presses.is_empty() {
        return;
    }

    let Ok((node, transform)) = ctx.canvas.get_single() else { return };
    let size = node.size();
    let origin = transform.translation().truncate() - size / 2.0;
    #[allow(clippy::cast_precision_loss)]
    let tile = size.x / ctx.grid.size() as f32;

    for pointer in presses {
        let outcome = handle_pointer(&mut ctx.grid, &ctx.registry, &ctx.editor, pointer, origin, tile);
        if outcome.changed_grid() {
            debug!("pointer at {pointer}: {outcome:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_action_has_a_command() {
        for action in ACTIONS {
            assert!(command_for_action(action).is_some(), "{action}");
        }
        assert_eq!(command_for_action("fly"), None);
    }
}
