//! Pointer handling: turns a canvas position into a grid cell and applies
//! the active tool there.

use crate::block::BlockRegistry;
use crate::editor::{EditorState, Tool};
use crate::grid::{Grid, Layer};
use bevy::math::Vec2;

/// What a pointer action did to the grid.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Placed { layer: Layer, x: usize, y: usize },
    Erased { layer: Layer, x: usize, y: usize },
    Toggled { layer: Layer, x: usize, y: usize, state: String },
    Ignored,
}

impl Outcome {
    #[must_use]
    pub fn changed_grid(&self) -> bool {
        !matches!(self, Outcome::Ignored)
    }
}

/// Resolve a pointer position to a cell.
///
/// # Arguments
/// * `pointer` - Pointer position, same space as `origin`.
/// * `origin` - Top-left corner of the canvas.
/// * `tile` - Cell edge length.
/// * `grid_size` - Cells per side.
///
/// # Returns
/// `Some((x, y))` for a position over the grid, `None` otherwise.
///
/// # Example
/// ```rust
/// use bevy::math::Vec2;
/// use castle_builder::interaction::cell_at;
///
/// assert_eq!(cell_at(Vec2::new(110.0, 45.0), Vec2::new(10.0, 10.0), 32.0, 16), Some((3, 1)));
/// assert_eq!(cell_at(Vec2::new(5.0, 45.0), Vec2::new(10.0, 10.0), 32.0, 16), None);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn cell_at(pointer: Vec2, origin: Vec2, tile: f32, grid_size: usize) -> Option<(usize, usize)> {
    if tile <= 0.0 {
        return None;
    }
    let cell = ((pointer - origin) / tile).floor();
    if cell.x < 0.0 || cell.y < 0.0 || cell.x >= grid_size as f32 || cell.y >= grid_size as f32 {
        return None;
    }
    Some((cell.x as usize, cell.y as usize))
}

/// Apply the active tool at cell `(x, y)`.
pub fn apply_at(grid: &mut Grid, registry: &BlockRegistry, editor: &EditorState, x: usize, y: usize) -> Outcome {
    if !grid.in_bounds(x, y) {
        return Outcome::Ignored;
    }
    let layer = editor.layer;
    match editor.tool {
        Tool::Draw => {
            let Some(def) = editor.selected.as_deref().and_then(|name| registry.get(name)) else {
                return Outcome::Ignored;
            };
            if grid.place(layer, x, y, def, editor.rotation()) {
                Outcome::Placed { layer, x, y }
            } else {
                Outcome::Ignored
            }
        }
        Tool::Erase => {
            grid.erase(layer, x, y);
            Outcome::Erased { layer, x, y }
        }
        Tool::Interact => interact(grid, registry, x, y),
    }
}

/// Toggle the first interactive block at `(x, y)`, checking the foreground
/// before the background. At most one cell changes.
pub fn interact(grid: &mut Grid, registry: &BlockRegistry, x: usize, y: usize) -> Outcome {
    for layer in [Layer::Foreground, Layer::Background] {
        let Some(cell) = grid.get_mut(layer, x, y) else { continue };
        let Some(def) = registry.get(&cell.block) else { continue };
        if def.on_click(&mut cell.state) {
            let state = cell.state.clone().unwrap_or_default();
            return Outcome::Toggled { layer, x, y, state };
        }
    }
    Outcome::Ignored
}

/// Resolve `pointer` and apply the active tool.
pub fn handle_pointer(
    grid: &mut Grid,
    registry: &BlockRegistry,
    editor: &EditorState,
    pointer: Vec2,
    origin: Vec2,
    tile: f32,
) -> Outcome {
    match cell_at(pointer, origin, tile, grid.size()) {
        Some((x, y)) => apply_at(grid, registry, editor, x, y),
        None => Outcome::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::EditorCommand;
    use crate::grid::GRID_SIZE;

    const TILE: f32 = 32.0;

    fn editor(tool: Tool, layer: Layer, selected: Option<&str>) -> EditorState {
        EditorState { tool, layer, selected: selected.map(str::to_string), ..Default::default() }
    }

    #[allow(clippy::cast_precision_loss)]
    fn center_of(x: usize, y: usize) -> Vec2 {
        Vec2::new(x as f32 * TILE + TILE / 2.0, y as f32 * TILE + TILE / 2.0)
    }

    #[test]
    fn cell_resolution_floors_and_bounds() {
        assert_eq!(cell_at(Vec2::new(0.0, 0.0), Vec2::ZERO, TILE, GRID_SIZE), Some((0, 0)));
        assert_eq!(cell_at(Vec2::new(31.9, 32.0), Vec2::ZERO, TILE, GRID_SIZE), Some((0, 1)));
        assert_eq!(cell_at(Vec2::new(511.9, 511.9), Vec2::ZERO, TILE, GRID_SIZE), Some((15, 15)));
        assert_eq!(cell_at(Vec2::new(512.0, 10.0), Vec2::ZERO, TILE, GRID_SIZE), None);
        assert_eq!(cell_at(Vec2::new(-0.5, 10.0), Vec2::ZERO, TILE, GRID_SIZE), None);
        assert_eq!(cell_at(Vec2::new(10.0, 10.0), Vec2::ZERO, 0.0, GRID_SIZE), None);
    }

    #[test]
    fn draw_requires_selection() {
        let registry = BlockRegistry::builtin();
        let mut grid = Grid::default();
        let ed = editor(Tool::Draw, Layer::Background, None);
        assert_eq!(handle_pointer(&mut grid, &registry, &ed, center_of(1, 1), Vec2::ZERO, TILE), Outcome::Ignored);
        assert!(grid.is_empty());

        let ed = editor(Tool::Draw, Layer::Background, Some("Deleted"));
        assert_eq!(apply_at(&mut grid, &registry, &ed, 1, 1), Outcome::Ignored);
        assert!(grid.is_empty());
    }

    #[test]
    fn draw_uses_rotation_toggle() {
        let registry = BlockRegistry::builtin();
        let mut grid = Grid::default();
        let mut ed = editor(Tool::Draw, Layer::Foreground, Some("Wall"));
        ed.apply(&EditorCommand::ToggleRotate);
        let out = handle_pointer(&mut grid, &registry, &ed, center_of(2, 7), Vec2::ZERO, TILE);
        assert_eq!(out, Outcome::Placed { layer: Layer::Foreground, x: 2, y: 7 });
        let cell = grid.get(Layer::Foreground, 2, 7).unwrap();
        assert!((cell.rotation - std::f32::consts::FRAC_PI_2).abs() < f32::EPSILON);
    }

    #[test]
    fn erase_only_touches_active_layer() {
        let registry = BlockRegistry::builtin();
        let mut grid = Grid::default();
        grid.place(Layer::Background, 0, 0, registry.get("Wall").unwrap(), 0.0);
        grid.place(Layer::Foreground, 0, 0, registry.get("Torch").unwrap(), 0.0);
        let ed = editor(Tool::Erase, Layer::Foreground, Some("Wall"));
        apply_at(&mut grid, &registry, &ed, 0, 0);
        assert!(grid.get(Layer::Foreground, 0, 0).is_none());
        assert!(grid.get(Layer::Background, 0, 0).is_some());
    }

    #[test]
    fn interact_prefers_foreground_and_stops_at_first_hit() {
        let registry = BlockRegistry::builtin();
        let mut grid = Grid::default();
        grid.place(Layer::Background, 4, 4, registry.get("Bridge").unwrap(), 0.0);
        grid.place(Layer::Foreground, 4, 4, registry.get("Door").unwrap(), 0.0);

        let out = interact(&mut grid, &registry, 4, 4);
        assert_eq!(out, Outcome::Toggled { layer: Layer::Foreground, x: 4, y: 4, state: "open".into() });
        assert_eq!(grid.get(Layer::Background, 4, 4).unwrap().state.as_deref(), Some("retracted"));
    }

    #[test]
    fn interact_falls_through_non_interactive_foreground() {
        let registry = BlockRegistry::builtin();
        let mut grid = Grid::default();
        grid.place(Layer::Background, 4, 4, registry.get("Bridge").unwrap(), 0.0);
        grid.place(Layer::Foreground, 4, 4, registry.get("Torch").unwrap(), 0.0);
        let out = interact(&mut grid, &registry, 4, 4);
        assert_eq!(out, Outcome::Toggled { layer: Layer::Background, x: 4, y: 4, state: "extended".into() });
        assert_eq!(interact(&mut grid, &registry, 9, 9), Outcome::Ignored);
    }

    #[test]
    fn door_scenario_through_pointer() {
        let registry = BlockRegistry::builtin();
        let mut grid = Grid::default();
        let origin = Vec2::new(50.0, 50.0);
        let ed = editor(Tool::Draw, Layer::Foreground, Some("Door"));
        handle_pointer(&mut grid, &registry, &ed, origin + center_of(3, 3), origin, TILE);
        let cell = grid.get(Layer::Foreground, 3, 3).unwrap();
        assert_eq!((cell.block.as_str(), cell.state.as_deref()), ("Door", Some("closed")));

        let ed = editor(Tool::Interact, Layer::Background, None);
        let out = handle_pointer(&mut grid, &registry, &ed, origin + center_of(3, 3), origin, TILE);
        assert!(out.changed_grid());
        assert_eq!(grid.get(Layer::Foreground, 3, 3).unwrap().state.as_deref(), Some("open"));
        handle_pointer(&mut grid, &registry, &ed, origin + center_of(3, 3), origin, TILE);
        assert_eq!(grid.get(Layer::Foreground, 3, 3).unwrap().state.as_deref(), Some("closed"));
    }
}
