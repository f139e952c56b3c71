//! The canvas texture: redrawn from the raster surface every frame and
//! resized with the window.
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};
use castle_builder::block::BlockRegistry;
use castle_builder::editor::EditorState;
use castle_builder::grid::Grid;
use castle_builder::raster::Surface;
use castle_builder::render::render_scene;
use castle_builder::settings::Settings;
use castle_builder::ui::{image_from_surface, CanvasNode};

/// The software surface and the texture it is uploaded to.
#[derive(Resource)]
pub struct Canvas {
    pub surface: Surface,
    pub handle: Handle<Image>,
}

/// Continuous redraw: advances the animation frame, renders the scene and
/// copies the pixels into the canvas texture.
///
/// The frame counter bypasses change detection so UI systems keyed on
/// `EditorState` changes do not run every frame.
#[allow(clippy::needless_pass_by_value)]
pub fn redraw_canvas(
    mut canvas: ResMut<Canvas>,
    grid: Res<Grid>,
    registry: Res<BlockRegistry>,
    mut editor: ResMut<EditorState>,
    mut images: ResMut<Assets<Image>>,
) {
    editor.bypass_change_detection().advance_frame();

    let canvas = &mut *canvas;
    render_scene(&mut canvas.surface, &grid, &registry, &editor);

    let raw = canvas.surface.as_raw();
    let uploaded = images.get_mut(&canvas.handle).is_some_and(|image| {
        if image.data.len() != raw.len() {
            return false;
        }
        image.data.copy_from_slice(raw);
        true
    });
    if !uploaded {
        // size changed: replace the texture
        images.insert(&canvas.handle, image_from_surface(&canvas.surface));
    }
}

/// Size the canvas to `min(width, height) - margin` whenever the window
/// changes size (and once at startup).
#[allow(clippy::needless_pass_by_value)]
pub fn resize_canvas(
    mut resized: EventReader<WindowResized>,
    windows: Query<&Window, With<PrimaryWindow>>,
    settings: Res<Settings>,
    mut canvas: ResMut<Canvas>,
    mut nodes: Query<&mut Style, With<CanvasNode>>,
    mut initialized: Local<bool>,
) {
    let mut latest = resized.read().last().map(|e| (e.width, e.height));
    if !*initialized {
        *initialized = true;
        if latest.is_none() {
            latest = windows.get_single().ok().map(|w| (w.width(), w.height()));
        }
    }
    let Some((width, height)) = latest else { return };

    let edge = settings.canvas.edge_for_window(width, height);
    if edge == canvas.surface.width() {
        return;
    }
    debug!("canvas resized to {edge}px for window {width}x{height}");
    canvas.surface = Surface::new(edge, edge);

    #[allow(clippy::cast_precision_loss)]
    let px = Val::Px(edge as f32);
    for mut style in &mut nodes {
        style.width = px;
        style.height = px;
    }
}
