//! Editor settings from `data/settings/*.ron`, reloaded when the files change.
//!
//! Files are tried in name order and the first one that parses wins; with
//! nothing usable on disk the built-in defaults apply. `canvas.grid_size` is
//! only read at startup, so a reload does not resize an open document.
use crate::ron_loader::{load_ron_files, setup_ron_watcher};
use crate::settings::Settings;
use bevy::log::info;
use bevy::prelude::{Res, ResMut, Resource};
use std::path::Path;

#[derive(Resource)]
pub struct SettingsWatcher(pub crate::ron::RonWatcher);

impl SettingsWatcher {
    #[must_use]
    pub fn stub() -> Self {
        SettingsWatcher(crate::ron::RonWatcher::stub())
    }
}

/// First parsable `Settings` in the directory `path`, or the defaults.
///
/// # Example
/// ```
/// use castle_builder::settings::loader::load_settings_from_dir;
///
/// let settings = load_settings_from_dir("no/such/dir");
/// assert_eq!(settings.canvas.grid_size, 16);
/// ```
#[must_use]
pub fn load_settings_from_dir(path: impl AsRef<Path>) -> Settings {
    let items: Vec<Settings> = load_ron_files(path);
    items.into_iter().next().unwrap_or_default()
}

/// Create a watcher for the settings directory (hot-reload).
///
/// # Errors
/// Returns a `notify::Error` if the watcher cannot be created for `path`.
pub fn setup_settings_watcher(path: impl AsRef<Path>) -> Result<SettingsWatcher, notify::Error> {
    setup_ron_watcher(path).map(SettingsWatcher)
}

/// Replace the `Settings` resource after the watcher saw a file change.
///
/// # Example
/// ```no_run
/// use bevy::prelude::*;
/// App::new().add_systems(Update, castle_builder::settings::loader::check_settings_changes);
/// ```
#[allow(clippy::needless_pass_by_value)]
pub fn check_settings_changes(watcher: Res<SettingsWatcher>, mut settings: ResMut<Settings>) {
    if watcher.0.take_changed() {
        info!("settings files changed, reloading from {}", watcher.0.path.display());
        *settings = load_settings_from_dir(&watcher.0.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ron::test_dir;

    #[test]
    fn first_parsable_file_wins() {
        let dir = test_dir::fresh("settings");
        std::fs::write(dir.join("a.ron"), "(canvas: (grid_size: ))").unwrap();
        std::fs::write(dir.join("b.ron"), "(canvas: (margin: 40))").unwrap();
        std::fs::write(dir.join("c.ron"), "(canvas: (margin: 80))").unwrap();
        let settings = load_settings_from_dir(&dir);
        assert_eq!(settings.canvas.margin, 40);
        assert_eq!(settings.canvas.grid_size, 16);
    }
}
