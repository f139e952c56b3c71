//! This module contains the block types and helpers.
//! It exposes block definitions (`BlockDef`), the procedural `Sprite`
//! renderers behind them, the `BlockRegistry` which stores all loaded
//! blocks in palette order, and the runtime loader/watcher used for
//! hot-reloading extra block definitions from RON files.
//!
//! Example:
//!
//! ```no_run
//! use bevy::prelude::*;
//! use castle_builder::block::loader as block_loader;
//!
//! let mut app = App::new();
//! // Load and insert the block registry resource
//! app.insert_resource(block_loader::load_blocks_from_dir("data/blocks"));
//! // Watcher (fallback to stub on error)
//! let watcher = block_loader::setup_block_watcher("data/blocks")
//!     .unwrap_or_else(|_| block_loader::BlockWatcher::stub());
//! app.insert_resource(watcher);
//! app.add_systems(Update, block_loader::check_block_changes);
//! ```

/// Loader/watchers for block RON files.
pub mod loader;

/// Block registry and related data structures.
pub mod registry;

/// Procedural sprite renderers.
pub mod sprite;

pub use registry::{BlockDef, BlockRegistry, Toggle, MISSING_NAME};
pub use sprite::Sprite;
