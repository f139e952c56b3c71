//! The saved document: both layers plus theme and time of day, as JSON.
//!
//! ```json
//! { "layers": { "background": [[{"name": "Wall", "rotation": 0, "state": null}, null, ...], ...],
//!               "foreground": [...] },
//!   "backgroundType": "grass",
//!   "timeOfDay": "night" }
//! ```
//! The outer array index is the column, the inner one the row.

use crate::block::BlockRegistry;
use crate::editor::{EditorState, Theme, TimeOfDay};
use crate::grid::{Grid, Layer, PlacedBlock};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    pub name: String,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default)]
    pub state: Option<String>,
}

pub type Matrix = Vec<Vec<Option<CellRecord>>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerRecords {
    #[serde(default)]
    pub background: Matrix,
    #[serde(default)]
    pub foreground: Matrix,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedDocument {
    pub layers: LayerRecords,
    #[serde(default)]
    pub background_type: Theme,
    #[serde(default)]
    pub time_of_day: TimeOfDay,
}

/// What `restore` could not place faithfully.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoreReport {
    /// Block names not in the registry, sorted and deduplicated. Their cells
    /// are kept and draw as the placeholder.
    pub missing: Vec<String>,
    /// Cells outside the grid (document from a larger grid) that were dropped.
    pub dropped: usize,
}

impl SavedDocument {
    /// Snapshot `grid` and the persisted parts of `editor`.
    #[must_use]
    pub fn capture(grid: &Grid, editor: &EditorState) -> Self {
        let matrix = |layer: Layer| -> Matrix {
            (0..grid.size())
                .map(|x| {
                    (0..grid.size())
                        .map(|y| {
                            grid.get(layer, x, y).map(|cell| CellRecord {
                                name: cell.block.clone(),
                                rotation: cell.rotation,
                                state: cell.state.clone(),
                            })
                        })
                        .collect()
                })
                .collect()
        };
        Self {
            layers: LayerRecords {
                background: matrix(Layer::Background),
                foreground: matrix(Layer::Foreground),
            },
            background_type: editor.theme,
            time_of_day: editor.time_of_day,
        }
    }

    /// Rebuild `grid` from the document and copy theme and time of day into
    /// `editor`. The grid is cleared first; a matrix of another size is
    /// copied over the overlapping cells.
    pub fn restore(&self, grid: &mut Grid, editor: &mut EditorState, registry: &BlockRegistry) -> RestoreReport {
        let mut report = RestoreReport::default();
        grid.clear();

        for (layer, matrix) in [
            (Layer::Background, &self.layers.background),
            (Layer::Foreground, &self.layers.foreground),
        ] {
            for (x, column) in matrix.iter().enumerate() {
                for (y, record) in column.iter().enumerate() {
                    let Some(record) = record else { continue };
                    if !grid.in_bounds(x, y) {
                        report.dropped += 1;
                        continue;
                    }
                    if registry.get(&record.name).is_none() {
                        report.missing.push(record.name.clone());
                    }
                    grid.set(
                        layer,
                        x,
                        y,
                        Some(PlacedBlock {
                            block: record.name.clone(),
                            rotation: record.rotation,
                            state: record.state.clone(),
                        }),
                    );
                }
            }
        }

        editor.theme = self.background_type;
        editor.time_of_day = self.time_of_day;
        report.missing.sort();
        report.missing.dedup();
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_shape_matches_saved_format() {
        let registry = BlockRegistry::builtin();
        let mut grid = Grid::new(2);
        grid.place(Layer::Foreground, 1, 0, registry.get("Door").unwrap(), 0.0);
        let editor = EditorState { theme: Theme::Grass, time_of_day: TimeOfDay::Night, ..Default::default() };

        let value = serde_json::to_value(SavedDocument::capture(&grid, &editor)).unwrap();
        assert_eq!(value["backgroundType"], "grass");
        assert_eq!(value["timeOfDay"], "night");
        assert_eq!(value["layers"]["foreground"][1][0]["name"], "Door");
        assert_eq!(value["layers"]["foreground"][1][0]["state"], "closed");
        assert!(value["layers"]["foreground"][0][1].is_null());
        assert!(value["layers"]["background"][0][0].is_null());
    }

    #[test]
    fn absent_theme_and_time_default() {
        let doc: SavedDocument =
            serde_json::from_str(r#"{"layers": {"background": [], "foreground": []}}"#).unwrap();
        assert_eq!(doc.background_type, Theme::None);
        assert_eq!(doc.time_of_day, TimeOfDay::Day);
    }

    #[test]
    fn null_theme_and_time_still_restore_grid() {
        let registry = BlockRegistry::builtin();
        let json = r#"{
            "layers": {
                "background": [[null, null], [null, null]],
                "foreground": [[null, {"name": "Door", "rotation": 0, "state": "open"}], [null, null]]
            },
            "backgroundType": null,
            "timeOfDay": null
        }"#;
        let doc: SavedDocument = serde_json::from_str(json).unwrap();
        let mut grid = Grid::new(2);
        let mut editor = EditorState { theme: Theme::Water, time_of_day: TimeOfDay::Night, ..Default::default() };
        doc.restore(&mut grid, &mut editor, &registry);

        assert_eq!(grid.get(Layer::Foreground, 0, 1).unwrap().state.as_deref(), Some("open"));
        assert_eq!(editor.theme, Theme::None);
        assert_eq!(editor.time_of_day, TimeOfDay::Day);
    }

    #[test]
    fn restore_keeps_unknown_names_and_overlap() {
        let registry = BlockRegistry::builtin();
        let json = r#"{
            "layers": {
                "background": [
                    [{"name": "Ghost", "rotation": 0, "state": null}, null, {"name": "Wall"}],
                    [null, {"name": "Ghost", "rotation": 1.5707964, "state": "boo"}, null],
                    [{"name": "Wall", "rotation": 0, "state": null}, null, null]
                ],
                "foreground": []
            },
            "backgroundType": "sand",
            "timeOfDay": "night"
        }"#;
        let doc: SavedDocument = serde_json::from_str(json).unwrap();
        let mut grid = Grid::new(2);
        let mut editor = EditorState::default();
        let report = doc.restore(&mut grid, &mut editor, &registry);

        assert_eq!(report.missing, vec!["Ghost".to_string()]);
        assert_eq!(report.dropped, 2);
        assert_eq!(grid.get(Layer::Background, 0, 0).unwrap().block, "Ghost");
        assert_eq!(grid.get(Layer::Background, 1, 1).unwrap().state.as_deref(), Some("boo"));
        assert_eq!(grid.count(), 2);
        assert_eq!(editor.theme, Theme::Sand);
        assert_eq!(editor.time_of_day, TimeOfDay::Night);
    }
}
