//! User interface: block palette, toolbar, status line and the
//! confirmation dialog, plus the canvas image node they surround.
//!
//! UI widgets never mutate editor state directly. Clicks are turned into
//! `EditorCommand` events and the app's command handler applies them.

use crate::block::BlockRegistry;
use crate::editor::{EditorCommand, EditorState};
use crate::raster::Surface;
use crate::render::render_palette;
use crate::settings::Settings;
use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy::render::texture::ImageSampler;
use bevy::ui::FocusPolicy;

const PANEL_BG: Color = Color::srgb(0.12, 0.12, 0.14);
const BUTTON_BG: Color = Color::srgb(0.22, 0.22, 0.26);
const BUTTON_HOVER: Color = Color::srgb(0.30, 0.30, 0.36);
const SELECTED_BG: Color = Color::srgb(0.55, 0.42, 0.16);
const TEXT: Color = Color::srgb(0.92, 0.92, 0.92);

/// The image node showing the rendered canvas.
#[derive(Component)]
pub struct CanvasNode;

/// Container the palette entries are spawned into.
#[derive(Component)]
pub struct PaletteRoot;

/// One palette button; holds the block name it selects.
#[derive(Component, Debug, Clone)]
pub struct PaletteEntry(pub String);

/// Toolbar button sending its command when pressed.
#[derive(Component, Debug, Clone)]
pub struct ToolbarButton(pub EditorCommand);

/// Text of a toolbar button, refreshed from the editor state.
#[derive(Component, Debug, Clone)]
pub struct ToolbarLabel(pub EditorCommand);

#[derive(Component)]
pub struct StatusText;

#[derive(Component)]
pub struct ConfirmDialog;

#[derive(Component)]
pub struct ConfirmPrompt;

/// Dialog button answering the pending confirmation.
#[derive(Component)]
pub struct ConfirmButton(pub bool);

/// Last message for the status line (save confirmation, errors, ...).
#[derive(Resource, Debug, Clone, Default)]
pub struct StatusMessage(pub String);

impl StatusMessage {
    pub fn set(&mut self, message: impl Into<String>) {
        self.0 = message.into();
    }
}

/// Commands offered on the toolbar, top to bottom.
#[must_use]
pub fn toolbar_commands() -> Vec<EditorCommand> {
    vec![
        EditorCommand::CycleLayer,
        EditorCommand::CycleTool,
        EditorCommand::ToggleRotate,
        EditorCommand::CycleTheme,
        EditorCommand::ToggleTimeOfDay,
        EditorCommand::Save,
        EditorCommand::RequestClear,
        EditorCommand::Export,
        EditorCommand::Unlock,
    ]
}

/// Text for a toolbar button given the current editor state.
#[must_use]
pub fn button_label(command: &EditorCommand, editor: &EditorState) -> String {
    match command {
        EditorCommand::CycleLayer => format!("Layer: {}", editor.layer.name()),
        EditorCommand::CycleTool => format!("Tool: {}", editor.tool.name()),
        EditorCommand::ToggleRotate => format!("Rotate: {}", if editor.rotate { "on" } else { "off" }),
        EditorCommand::CycleTheme => format!("Background: {}", editor.theme.name()),
        EditorCommand::ToggleTimeOfDay => format!("Time: {}", editor.time_of_day.name()),
        EditorCommand::Save => "Save".to_string(),
        EditorCommand::RequestClear => "Clear".to_string(),
        EditorCommand::Export => "Export PNG".to_string(),
        EditorCommand::Unlock => "Unlock block".to_string(),
        other => format!("{other:?}"),
    }
}

/// Upload a raster surface as a nearest-sampled texture.
#[must_use]
pub fn image_from_surface(surface: &Surface) -> Image {
    let mut image = Image::new(
        Extent3d { width: surface.width(), height: surface.height(), depth_or_array_layers: 1 },
        TextureDimension::D2,
        surface.as_raw().to_vec(),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    );
    image.sampler = ImageSampler::nearest();
    image
}

fn text_style(size: f32) -> TextStyle {
    TextStyle { font_size: size, color: TEXT, ..default() }
}

fn button_style() -> Style {
    Style {
        padding: UiRect::axes(Val::Px(8.0), Val::Px(6.0)),
        margin: UiRect::bottom(Val::Px(4.0)),
        justify_content: JustifyContent::Center,
        ..default()
    }
}

/// Spawn the whole layout around the canvas image.
///
/// # Arguments
/// * `commands` - used to spawn the UI tree.
/// * `canvas` - handle of the image the canvas is rendered into.
/// * `edge` - initial canvas edge length in logical pixels.
/// * `editor` - initial state for the toolbar labels.
#[allow(clippy::cast_precision_loss, clippy::too_many_lines)]
pub fn spawn_ui(commands: &mut Commands, canvas: Handle<Image>, edge: u32, editor: &EditorState) {
    commands
        .spawn(NodeBundle {
            style: Style {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Row,
                justify_content: JustifyContent::SpaceBetween,
                ..default()
            },
            background_color: PANEL_BG.into(),
            ..default()
        })
        .with_children(|root| {
            // palette column
            root.spawn(NodeBundle {
                style: Style {
                    flex_direction: FlexDirection::Column,
                    padding: UiRect::all(Val::Px(8.0)),
                    width: Val::Px(140.0),
                    ..default()
                },
                ..default()
            })
            .with_children(|col| {
                col.spawn(TextBundle::from_section("Blocks", text_style(18.0)));
                col.spawn((
                    NodeBundle {
                        style: Style {
                            flex_direction: FlexDirection::Column,
                            margin: UiRect::top(Val::Px(6.0)),
                            ..default()
                        },
                        ..default()
                    },
                    PaletteRoot,
                ));
            });

            // canvas and status line
            root.spawn(NodeBundle {
                style: Style {
                    flex_direction: FlexDirection::Column,
                    align_items: AlignItems::Center,
                    justify_content: JustifyContent::Center,
                    flex_grow: 1.0,
                    ..default()
                },
                ..default()
            })
            .with_children(|col| {
                col.spawn((
                    ImageBundle {
                        style: Style {
                            width: Val::Px(edge as f32),
                            height: Val::Px(edge as f32),
                            ..default()
                        },
                        image: UiImage::new(canvas),
                        ..default()
                    },
                    CanvasNode,
                ));
                col.spawn((
                    TextBundle::from_section("", text_style(16.0)).with_style(Style {
                        margin: UiRect::top(Val::Px(8.0)),
                        ..default()
                    }),
                    StatusText,
                ));
            });

            // toolbar
            root.spawn(NodeBundle {
                style: Style {
                    flex_direction: FlexDirection::Column,
                    padding: UiRect::all(Val::Px(8.0)),
                    width: Val::Px(170.0),
                    ..default()
                },
                ..default()
            })
            .with_children(|col| {
                for command in toolbar_commands() {
                    let label = button_label(&command, editor);
                    col.spawn((
                        ButtonBundle { style: button_style(), background_color: BUTTON_BG.into(), ..default() },
                        ToolbarButton(command.clone()),
                    ))
                    .with_children(|b| {
                        b.spawn((TextBundle::from_section(label, text_style(15.0)), ToolbarLabel(command)));
                    });
                }
            });
        });

    // confirmation dialog, hidden until something is pending
    commands
        .spawn((
            NodeBundle {
                style: Style {
                    display: Display::None,
                    position_type: PositionType::Absolute,
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    align_items: AlignItems::Center,
                    justify_content: JustifyContent::Center,
                    ..default()
                },
                background_color: Color::srgba(0.0, 0.0, 0.0, 0.5).into(),
                focus_policy: FocusPolicy::Block,
                z_index: ZIndex::Global(10),
                ..default()
            },
            ConfirmDialog,
        ))
        .with_children(|overlay| {
            overlay
                .spawn(NodeBundle {
                    style: Style {
                        flex_direction: FlexDirection::Column,
                        align_items: AlignItems::Center,
                        padding: UiRect::all(Val::Px(16.0)),
                        ..default()
                    },
                    background_color: PANEL_BG.into(),
                    ..default()
                })
                .with_children(|panel| {
                    panel.spawn((TextBundle::from_section("", text_style(18.0)), ConfirmPrompt));
                    panel
                        .spawn(NodeBundle {
                            style: Style {
                                flex_direction: FlexDirection::Row,
                                column_gap: Val::Px(12.0),
                                margin: UiRect::top(Val::Px(12.0)),
                                ..default()
                            },
                            ..default()
                        })
                        .with_children(|row| {
                            for (label, accept) in [("Yes", true), ("No", false)] {
                                row.spawn((
                                    ButtonBundle { style: button_style(), background_color: BUTTON_BG.into(), ..default() },
                                    ConfirmButton(accept),
                                ))
                                .with_children(|b| {
                                    b.spawn(TextBundle::from_section(label, text_style(16.0)));
                                });
                            }
                        });
                });
        });
}

/// Rebuild the palette whenever the registry changes (startup, unlock,
/// hot reload). Thumbnails are rendered in parallel.
#[allow(clippy::needless_pass_by_value)]
pub fn rebuild_palette(
    mut commands: Commands,
    registry: Res<BlockRegistry>,
    settings: Res<Settings>,
    mut images: ResMut<Assets<Image>>,
    roots: Query<Entity, With<PaletteRoot>>,
) {
    if !registry.is_changed() {
        return;
    }
    let Ok(root) = roots.get_single() else { return };

    let size = settings.palette.thumbnail_size.max(8);
    let thumbnails = render_palette(&registry, size);

    commands.entity(root).despawn_descendants();
    commands.entity(root).with_children(|list| {
        for (name, surface) in thumbnails {
            let handle = images.add(image_from_surface(&surface));
            list.spawn((
                ButtonBundle {
                    style: Style {
                        flex_direction: FlexDirection::Row,
                        align_items: AlignItems::Center,
                        column_gap: Val::Px(6.0),
                        padding: UiRect::all(Val::Px(4.0)),
                        margin: UiRect::bottom(Val::Px(4.0)),
                        ..default()
                    },
                    background_color: BUTTON_BG.into(),
                    ..default()
                },
                PaletteEntry(name.clone()),
            ))
            .with_children(|b| {
                #[allow(clippy::cast_precision_loss)]
                let px = Val::Px(size as f32);
                b.spawn(ImageBundle {
                    style: Style { width: px, height: px, ..default() },
                    image: UiImage::new(handle),
                    ..default()
                });
                b.spawn(TextBundle::from_section(name, text_style(14.0)));
            });
        }
    });
}

/// Palette clicks select a block; toolbar clicks send their command.
#[allow(clippy::type_complexity)]
pub fn handle_ui_clicks(
    palette: Query<(&Interaction, &PaletteEntry), Changed<Interaction>>,
    toolbar: Query<(&Interaction, &ToolbarButton), Changed<Interaction>>,
    confirm: Query<(&Interaction, &ConfirmButton), Changed<Interaction>>,
    mut out: EventWriter<EditorCommand>,
) {
    for (interaction, entry) in &palette {
        if *interaction == Interaction::Pressed {
            out.send(EditorCommand::Select(entry.0.clone()));
        }
    }
    for (interaction, button) in &toolbar {
        if *interaction == Interaction::Pressed {
            out.send(button.0.clone());
        }
    }
    for (interaction, button) in &confirm {
        if *interaction == Interaction::Pressed {
            out.send(EditorCommand::Confirm(button.0));
        }
    }
}

/// Button colors: selected palette entry, hover, idle.
#[allow(clippy::needless_pass_by_value, clippy::type_complexity)]
pub fn update_button_colors(
    editor: Res<EditorState>,
    mut buttons: Query<(&Interaction, &mut BackgroundColor, Option<&PaletteEntry>), With<Button>>,
) {
    for (interaction, mut bg, entry) in &mut buttons {
        let selected = entry.is_some_and(|e| editor.selected.as_deref() == Some(e.0.as_str()));
        let color = button_color(selected, *interaction);
        if bg.0 != color {
            bg.0 = color;
        }
    }
}

#[must_use]
pub fn button_color(selected: bool, interaction: Interaction) -> Color {
    if selected {
        SELECTED_BG
    } else if interaction == Interaction::Hovered {
        BUTTON_HOVER
    } else {
        BUTTON_BG
    }
}

/// Refresh toolbar labels and the status line.
#[allow(clippy::needless_pass_by_value)]
pub fn update_labels(
    editor: Res<EditorState>,
    status: Res<StatusMessage>,
    mut labels: Query<(&mut Text, &ToolbarLabel), Without<StatusText>>,
    mut status_text: Query<&mut Text, With<StatusText>>,
) {
    if !editor.is_changed() && !status.is_changed() {
        return;
    }
    for (mut text, label) in &mut labels {
        let value = button_label(&label.0, &editor);
        if text.sections[0].value != value {
            text.sections[0].value = value;
        }
    }
    if let Ok(mut text) = status_text.get_single_mut() {
        let selected = editor.selected.as_deref().unwrap_or("none");
        text.sections[0].value = if status.0.is_empty() {
            format!("Selected: {selected}")
        } else {
            format!("Selected: {selected} | {}", status.0)
        };
    }
}

/// Show the dialog while a confirmation is pending.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_confirm_dialog(
    editor: Res<EditorState>,
    mut dialog: Query<&mut Style, With<ConfirmDialog>>,
    mut prompt: Query<&mut Text, With<ConfirmPrompt>>,
) {
    if !editor.is_changed() {
        return;
    }
    let display = if editor.pending.is_some() { Display::Flex } else { Display::None };
    for mut style in &mut dialog {
        if style.display != display {
            style.display = display;
        }
    }
    if let (Some(pending), Ok(mut text)) = (editor.pending, prompt.get_single_mut()) {
        text.sections[0].value = pending.prompt().to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::Tool;

    #[test]
    fn labels_reflect_state() {
        let mut editor = EditorState::default();
        assert_eq!(button_label(&EditorCommand::CycleTool, &editor), "Tool: draw");
        editor.tool = Tool::Interact;
        editor.rotate = true;
        assert_eq!(button_label(&EditorCommand::CycleTool, &editor), "Tool: interact");
        assert_eq!(button_label(&EditorCommand::ToggleRotate, &editor), "Rotate: on");
        assert_eq!(button_label(&EditorCommand::CycleTheme, &editor), "Background: none");
    }

    #[test]
    fn selection_wins_over_hover() {
        assert_eq!(button_color(true, Interaction::Hovered), SELECTED_BG);
        assert_eq!(button_color(false, Interaction::Hovered), BUTTON_HOVER);
        assert_eq!(button_color(false, Interaction::Pressed), BUTTON_BG);
        assert_eq!(button_color(false, Interaction::None), BUTTON_BG);
    }

    #[test]
    fn surface_upload_keeps_pixels() {
        let surface = Surface::filled(3, 2, crate::raster::rgb(0x102030));
        let image = image_from_surface(&surface);
        assert_eq!(image.width(), 3);
        assert_eq!(image.height(), 2);
        assert_eq!(&image.data[..4], &[0x10, 0x20, 0x30, 0xFF]);
    }
}
