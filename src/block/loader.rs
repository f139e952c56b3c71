//! Block loader and watcher for extra block definitions stored as RON files
//! and monitoring changes for hot reloading while the editor runs.
//!
//! Each file in the block directory holds one `BlockDef`:
//! ```ron
//! (
//!     name: "Gate",
//!     sprite: Door,
//!     toggle: Some((states: ("closed", "open"))),
//! )
//! ```
//!
//! # Example
//! ```no_run
//! use bevy::prelude::*;
//! use castle_builder::block::loader as block_loader;
//!
//! let mut app = App::new();
//! app.insert_resource(block_loader::load_blocks_from_dir("data/blocks"));
//! app.insert_resource(
//!     block_loader::setup_block_watcher("data/blocks")
//!         .unwrap_or_else(|_| block_loader::BlockWatcher::stub()),
//! );
//! app.add_systems(Update, block_loader::check_block_changes);
//! ```

use super::{BlockDef, BlockRegistry};
use crate::ron_loader::{load_ron_files, setup_ron_watcher};
use bevy::log::info;
use bevy::prelude::{Res, ResMut, Resource};
use std::path::Path;

#[derive(Resource)]
pub struct BlockWatcher(pub crate::ron::RonWatcher);

impl BlockWatcher {
    /// Create a stub `BlockWatcher` that does not have an active OS watcher.
    #[must_use]
    pub fn stub() -> Self {
        BlockWatcher(crate::ron::RonWatcher::stub())
    }
}

/// Build the registry: the built-in catalog followed by every block
/// definition found in `path`.
///
/// # Arguments
/// * `path` - The directory holding block RON files (e.g. "data/blocks").
///
/// # Returns
/// A `BlockRegistry` in palette order. A file that reuses a built-in name
/// replaces that block's definition without moving it.
///
/// # Example
/// ```rust
/// use castle_builder::block::loader::load_blocks_from_dir;
///
/// let registry = load_blocks_from_dir("no/such/dir");
/// assert_eq!(registry.len(), 5);
/// ```
#[must_use]
pub fn load_blocks_from_dir(path: impl AsRef<Path>) -> BlockRegistry {
    let mut registry = BlockRegistry::builtin();
    let blocks: Vec<BlockDef> = load_ron_files(path);
    registry.merge(blocks);
    registry
}

/// Set up a file watcher on the block directory.
///
/// # Errors
/// Returns a `notify::Error` if the underlying file watcher could not be created or configured.
pub fn setup_block_watcher(path: impl AsRef<Path>) -> Result<BlockWatcher, notify::Error> {
    setup_ron_watcher(path).map(BlockWatcher)
}

/// Merge reloaded definitions into `registry`. Blocks that disappeared from
/// disk stay registered so cells placed with them keep drawing.
///
/// # Returns
/// The number of names that were not registered before.
pub fn reload_into(registry: &mut BlockRegistry, path: impl AsRef<Path>) -> usize {
    let blocks: Vec<BlockDef> = load_ron_files(path);
    registry.merge(blocks)
}

/// Checks the watcher flag and merges changed block files into the registry.
///
/// # Arguments
/// * `watcher` - `BlockWatcher` resource monitoring the block directory.
/// * `registry` - The live `BlockRegistry`, updated in place.
#[allow(clippy::needless_pass_by_value)]
pub fn check_block_changes(watcher: Res<BlockWatcher>, mut registry: ResMut<BlockRegistry>) {
    if !watcher.0.take_changed() {
        return;
    }
    let added = reload_into(&mut registry, &watcher.0.path);
    info!("Blocks changed, reloaded ({added} new, {} total)", registry.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Sprite;
    use crate::ron::test_dir;

    #[test]
    fn loads_builtin_then_files() {
        let dir = test_dir::fresh("blocks");
        std::fs::write(
            dir.join("gate.ron"),
            r#"(name: "Gate", sprite: Door, toggle: Some((states: ("shut", "ajar"))))"#,
        )
        .unwrap();
        std::fs::write(dir.join("banner.ron"), r#"(name: "Banner", sprite: Villager)"#).unwrap();

        let registry = load_blocks_from_dir(&dir);
        assert_eq!(registry.len(), 7);
        assert_eq!(registry.index_of("Banner"), Some(5));
        assert_eq!(registry.index_of("Gate"), Some(6));
        assert_eq!(registry.get("Gate").unwrap().default_state(), Some("shut"));
        assert!(!registry.get("Banner").unwrap().is_interactive());
    }

    #[test]
    fn reload_keeps_removed_blocks() {
        let dir = test_dir::fresh("blocks-reload");
        let file = dir.join("banner.ron");
        std::fs::write(&file, r#"(name: "Banner", sprite: Villager)"#).unwrap();
        let mut registry = load_blocks_from_dir(&dir);

        std::fs::remove_file(&file).unwrap();
        std::fs::write(dir.join("torch.ron"), r#"(name: "Torch", sprite: Bridge)"#).unwrap();
        let added = reload_into(&mut registry, &dir);

        assert_eq!(added, 0);
        assert!(registry.get("Banner").is_some());
        assert_eq!(registry.get("Torch").unwrap().sprite, Sprite::Bridge);
        assert_eq!(registry.index_of("Torch"), Some(1));
    }
}
