//! Saving, loading and exporting the active document.
//!
//! The document lives under a single storage key (`savedCastle` by
//! default); saving overwrites it. Loading parses the whole document
//! before touching the grid, so a corrupt slot leaves the editor as it was.
//!
//! # Example
//! ```rust
//! use castle_builder::block::BlockRegistry;
//! use castle_builder::editor::EditorState;
//! use castle_builder::grid::{Grid, Layer};
//! use castle_builder::persistence::{self, MemoryStorage};
//!
//! let registry = BlockRegistry::builtin();
//! let mut storage = MemoryStorage::default();
//! let mut grid = Grid::default();
//! let mut editor = EditorState::default();
//! grid.place(Layer::Foreground, 3, 3, registry.get("Door").unwrap(), 0.0);
//!
//! persistence::save(&mut storage, "savedCastle", &grid, &editor).unwrap();
//! let mut fresh = Grid::default();
//! persistence::load(&storage, "savedCastle", &mut fresh, &mut editor, &registry).unwrap();
//! assert_eq!(fresh, grid);
//! ```

pub mod document;
pub mod export;
pub mod storage;

pub use document::{CellRecord, RestoreReport, SavedDocument};
pub use export::{export_file_name, export_png};
pub use storage::{FileStorage, MemoryStorage, Storage};

use crate::block::BlockRegistry;
use crate::editor::EditorState;
use crate::grid::Grid;
use std::error::Error;

/// Default storage key of the document.
pub const DEFAULT_SLOT: &str = "savedCastle";
/// Status line text after a successful save.
pub const SAVED_MESSAGE: &str = "Your castle has been saved!";

/// Serialize the grid, theme and time of day under `key`.
///
/// # Errors
/// Fails when serialization or the storage write fails.
pub fn save(storage: &mut dyn Storage, key: &str, grid: &Grid, editor: &EditorState) -> Result<(), Box<dyn Error>> {
    let doc = SavedDocument::capture(grid, editor);
    let json = serde_json::to_string(&doc)?;
    storage.set_item(key, &json)
}

/// Restore the document stored under `key`.
///
/// # Returns
/// `Ok(None)` when nothing is stored (grid and editor untouched), otherwise
/// the restore report.
///
/// # Errors
/// Fails when the storage read fails or the stored document does not
/// parse; the grid and editor are untouched in both cases.
pub fn load(
    storage: &dyn Storage,
    key: &str,
    grid: &mut Grid,
    editor: &mut EditorState,
    registry: &BlockRegistry,
) -> Result<Option<RestoreReport>, Box<dyn Error>> {
    let Some(json) = storage.get_item(key)? else {
        return Ok(None);
    };
    let doc: SavedDocument = serde_json::from_str(&json)?;
    Ok(Some(doc.restore(grid, editor, registry)))
}
