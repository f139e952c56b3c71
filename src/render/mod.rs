//! Scene and palette rendering onto a `Surface`.
//!
//! `render_scene` performs one full redraw in a fixed order:
//! theme fill, night overlay, grid lines, then the background layer and
//! the foreground layer. Cells resolve their block by name at draw time;
//! names the registry does not know draw the placeholder sprite.

use crate::block::{BlockDef, BlockRegistry};
use crate::editor::{EditorState, TimeOfDay};
use crate::grid::{Grid, Layer};
use crate::raster::{rgb, Color, Paint, Surface};
use bevy::math::Vec2;
use rayon::prelude::*;

/// Color of the cell separator lines.
pub const GRID_LINE: Color = rgb(0x333333);
/// Opacity of the black overlay drawn at night.
pub const NIGHT_ALPHA: f32 = 0.6;

/// Edge length of one cell for a surface of `surface_px` pixels.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn tile_size(surface_px: u32, grid_size: usize) -> f32 {
    if grid_size == 0 { 0.0 } else { surface_px as f32 / grid_size as f32 }
}

/// Redraw the whole scene.
///
/// # Arguments
/// * `surface` - Target surface; its width sets the tile size.
/// * `grid` - Cells to draw.
/// * `registry` - Resolves cell block names.
/// * `editor` - Theme, time of day and animation frame.
pub fn render_scene(surface: &mut Surface, grid: &Grid, registry: &BlockRegistry, editor: &EditorState) {
    let tile = tile_size(surface.width(), grid.size());
    surface.clear(editor.theme.fill());

    if editor.time_of_day == TimeOfDay::Night {
        surface.save();
        surface.set_global_alpha(NIGHT_ALPHA);
        #[allow(clippy::cast_precision_loss)]
        let (w, h) = (surface.width() as f32, surface.height() as f32);
        surface.fill_rect(0.0, 0.0, w, h, Paint::Solid(rgb(0x000000)));
        surface.restore();
    }

    draw_grid_lines(surface, grid.size(), tile);

    for layer in Layer::ALL {
        draw_layer(surface, grid, layer, registry, tile, editor.frame);
    }
}

/// One-pixel lines at every cell boundary, the last one pulled inside the surface.
#[allow(clippy::cast_precision_loss)]
fn draw_grid_lines(surface: &mut Surface, n: usize, tile: f32) {
    let w = surface.width() as f32;
    let h = surface.height() as f32;
    for i in 0..=n {
        let p = (i as f32 * tile).floor().min(w - 1.0) + 0.5;
        surface.stroke_line(Vec2::new(p, 0.0), Vec2::new(p, h), 1.0, GRID_LINE);
        let q = (i as f32 * tile).floor().min(h - 1.0) + 0.5;
        surface.stroke_line(Vec2::new(0.0, q), Vec2::new(w, q), 1.0, GRID_LINE);
    }
}

#[allow(clippy::cast_precision_loss)]
fn draw_layer(surface: &mut Surface, grid: &Grid, layer: Layer, registry: &BlockRegistry, tile: f32, frame: u64) {
    for (x, y, cell) in grid.occupied(layer) {
        registry.resolve(&cell.block).draw(
            surface,
            x as f32 * tile,
            y as f32 * tile,
            tile,
            cell.rotation,
            frame,
            cell.state.as_deref(),
        );
    }
}

/// Static preview of `def` (frame 0, no rotation, default state) on a
/// transparent surface.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn render_thumbnail(def: &BlockDef, size: u32) -> Surface {
    let mut surface = Surface::new(size, size);
    def.draw(&mut surface, 0.0, 0.0, size as f32, 0.0, 0, def.default_state());
    surface
}

/// Thumbnails for every registered block, in palette order.
#[must_use]
pub fn render_palette(registry: &BlockRegistry, size: u32) -> Vec<(String, Surface)> {
    registry
        .blocks()
        .par_iter()
        .map(|def| (def.name.clone(), render_thumbnail(def, size)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::Theme;
    use crate::grid::PlacedBlock;

    fn close(a: Color, b: [u8; 3]) -> bool {
        (0..3).all(|i| (i32::from(a[i]) - i32::from(b[i])).abs() <= 1)
    }

    #[test]
    fn water_at_night_is_dimmed_blue() {
        let registry = BlockRegistry::builtin();
        let grid = Grid::default();
        let editor = EditorState { theme: Theme::Water, time_of_day: TimeOfDay::Night, ..Default::default() };
        let mut surface = Surface::new(320, 320);
        render_scene(&mut surface, &grid, &registry, &editor);

        // Inside a cell: blue under 60% black.
        assert!(close(surface.pixel(10, 10).unwrap(), [12, 58, 102]));
        // Grid lines are drawn after the overlay, so they stay undimmed.
        assert_eq!(surface.pixel(0, 10), Some(GRID_LINE));
        assert_eq!(surface.pixel(20, 10), Some(GRID_LINE));
        assert_eq!(surface.pixel(319, 10), Some(GRID_LINE));
        assert_eq!(surface.pixel(10, 20), Some(GRID_LINE));
    }

    #[test]
    fn day_themes_fill_plainly() {
        let registry = BlockRegistry::builtin();
        let grid = Grid::default();
        for theme in Theme::ALL {
            let editor = EditorState { theme, ..Default::default() };
            let mut surface = Surface::new(160, 160);
            render_scene(&mut surface, &grid, &registry, &editor);
            assert_eq!(surface.pixel(5, 5), Some(theme.fill()));
        }
    }

    #[test]
    fn foreground_occludes_background() {
        let registry = BlockRegistry::builtin();
        let mut grid = Grid::default();
        grid.place(Layer::Foreground, 1, 0, registry.get("Door").unwrap(), 0.0);
        grid.place(Layer::Background, 1, 0, registry.get("Wall").unwrap(), 0.0);
        let mut surface = Surface::new(512, 512);
        render_scene(&mut surface, &grid, &registry, &EditorState::default());
        // Door frame corner at the top-left of cell (1, 0).
        assert_eq!(surface.pixel(33, 2), Some(rgb(0x654321)));
    }

    #[test]
    fn cells_use_column_then_row() {
        let registry = BlockRegistry::builtin();
        let mut grid = Grid::default();
        grid.place(Layer::Background, 2, 5, registry.get("Door").unwrap(), 0.0);
        let mut surface = Surface::new(512, 512);
        render_scene(&mut surface, &grid, &registry, &EditorState::default());
        assert_eq!(surface.pixel(2 * 32 + 2, 5 * 32 + 2), Some(rgb(0x654321)));
        assert_eq!(surface.pixel(5 * 32 + 2, 2 * 32 + 2), Some(Theme::None.fill()));
    }

    #[test]
    fn unknown_block_draws_placeholder() {
        let registry = BlockRegistry::builtin();
        let mut grid = Grid::default();
        grid.set(
            Layer::Foreground,
            0,
            0,
            Some(PlacedBlock { block: "Ghost".into(), rotation: 0.0, state: None }),
        );
        let mut surface = Surface::new(512, 512);
        render_scene(&mut surface, &grid, &registry, &EditorState::default());
        assert_eq!(surface.pixel(4, 4), Some(rgb(0xFF00FF)));
        assert_eq!(surface.pixel(28, 4), Some(rgb(0x000000)));
    }

    #[test]
    fn redraw_is_deterministic() {
        let registry = BlockRegistry::builtin();
        let mut grid = Grid::default();
        grid.place(Layer::Foreground, 4, 4, registry.get("Torch").unwrap(), 0.0);
        grid.place(Layer::Foreground, 5, 4, registry.get("Villager").unwrap(), 0.0);
        let editor = EditorState { frame: 42, ..Default::default() };
        let mut a = Surface::new(256, 256);
        let mut b = Surface::new(256, 256);
        render_scene(&mut a, &grid, &registry, &editor);
        render_scene(&mut a, &grid, &registry, &editor);
        render_scene(&mut b, &grid, &registry, &editor);
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn palette_follows_registry_order() {
        let mut registry = BlockRegistry::builtin();
        registry.unlock();
        let palette = render_palette(&registry, 32);
        let names: Vec<_> = palette.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["Wall", "Torch", "Villager", "Door", "Bridge", "Relic 1"]);
        let (_, door) = &palette[3];
        assert_eq!(door.pixel(16, 20), Some(rgb(0x321000)));
        // thumbnails start transparent
        let (_, torch) = &palette[1];
        assert_eq!(torch.pixel(0, 0).map(|c| c[3]), Some(0));
    }
}
