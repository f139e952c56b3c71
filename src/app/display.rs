//! Display-related systems: syncing window settings from the `Settings`
//! resource to the primary window.
use bevy::prelude::*;
use bevy::window::{PresentMode, PrimaryWindow};
use castle_builder::settings::Settings;

/// Sync `Settings.window.vsync` and the title into the primary window.
/// Allows the user to toggle vsync at runtime without restarting.
///
/// # Arguments
/// - `settings`: The current settings resource.
/// - `windows`: Query for the primary window.
/// - `last`: Local cache of the last applied values to avoid redundant updates.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_window_settings(
    settings: Res<Settings>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    mut last: Local<Option<(bool, String)>>,
) {
    let desired = (settings.window.vsync, settings.window.title.clone());
    if last.as_ref() == Some(&desired) {
        return;
    }

    for mut w in &mut windows {
        w.present_mode = if desired.0 { PresentMode::Fifo } else { PresentMode::AutoNoVsync };
        if w.title != desired.1 {
            w.title.clone_from(&desired.1);
        }
    }
    *last = Some(desired);
}
