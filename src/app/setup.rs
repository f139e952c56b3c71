//! Startup: camera, canvas surface/texture and the UI layout.
use bevy::prelude::*;
use castle_builder::editor::EditorState;
use castle_builder::raster::Surface;
use castle_builder::settings::Settings;
use castle_builder::ui::{image_from_surface, spawn_ui};

use super::canvas::Canvas;

/// Spawn the 2D camera, create the canvas texture and build the UI around it.
///
/// # Arguments
/// - `commands`: Commands for spawning entities and inserting the `Canvas` resource.
/// - `images`: Asset storage the canvas texture is added to.
/// - `settings`: Initial canvas size.
/// - `editor`: Initial toolbar labels.
#[allow(clippy::needless_pass_by_value)]
pub fn setup(
    mut commands: Commands,
    mut images: ResMut<Assets<Image>>,
    settings: Res<Settings>,
    editor: Res<EditorState>,
) {
    commands.spawn(Camera2dBundle::default());

    let edge = settings.canvas.initial_pixels.max(settings.canvas.min_pixels);
    let surface = Surface::new(edge, edge);
    let handle = images.add(image_from_surface(&surface));

    spawn_ui(&mut commands, handle.clone(), edge, &editor);
    commands.insert_resource(Canvas { surface, handle });
}
