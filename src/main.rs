use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use bevy::window::{PresentMode, Window, WindowPlugin};
use castle_builder::block::loader as block_loader;
use castle_builder::debug::DebugDumpPlugin;
use castle_builder::editor::{EditorCommand, EditorState};
use castle_builder::grid::Grid;
use castle_builder::settings::loader as settings_loader;
use castle_builder::ui::{
    handle_ui_clicks, rebuild_palette, sync_confirm_dialog, update_button_colors, update_labels,
    StatusMessage,
};

mod app;
use app::{
    canvas_pointer, handle_commands, keyboard_shortcuts, load_saved_document, poll_exports,
    redraw_canvas, resize_canvas, setup, sync_window_settings, PendingExports,
};

fn main() {
    let settings = settings_loader::load_settings_from_dir("data/settings");
    let settings_watcher = settings_loader::setup_settings_watcher("data/settings")
        .unwrap_or_else(|_| settings_loader::SettingsWatcher::stub());

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: settings.window.title.clone(),
                resolution: (settings.window.width, settings.window.height).into(),
                position: WindowPosition::Centered(MonitorSelection::Primary),
                present_mode: if settings.window.vsync { PresentMode::Fifo } else { PresentMode::AutoNoVsync },
                ..default()
            }),
            ..default()
        }))
        .add_plugins(FrameTimeDiagnosticsPlugin)
        .add_plugins(DebugDumpPlugin);

    app.add_event::<EditorCommand>();

    app.insert_resource(Grid::new(settings.canvas.grid_size.max(1)));
    app.insert_resource(EditorState::default());
    app.insert_resource(StatusMessage::default());
    app.insert_resource(PendingExports::default());
    app.insert_resource(block_loader::load_blocks_from_dir("data/blocks"));
    app.insert_resource(
        block_loader::setup_block_watcher("data/blocks").unwrap_or_else(|_| {
            block_loader::BlockWatcher::stub()
        }),
    );

    app.insert_resource(settings);
    app.insert_resource(settings_watcher);

    app.add_systems(Startup, (setup, load_saved_document).chain());

    app.add_systems(Update, block_loader::check_block_changes);
    app.add_systems(Update, settings_loader::check_settings_changes);
    app.add_systems(Update, sync_window_settings);

    // input -> commands -> grid/state -> canvas -> widgets
    app.add_systems(
        Update,
        (
            keyboard_shortcuts,
            handle_ui_clicks,
            canvas_pointer,
            handle_commands,
            poll_exports,
            resize_canvas,
            redraw_canvas,
            rebuild_palette,
            update_button_colors,
            update_labels,
            sync_confirm_dialog,
        )
            .chain(),
    );

    app.run();
}
