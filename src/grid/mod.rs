//! The two-layer block grid.
//!
//! A `Grid` holds two same-sized square layers of optional `PlacedBlock`s.
//! Cells store the block by name; the registry resolves that name when the
//! cell is drawn or clicked. The grid size is fixed at construction.
//!
//! Cells are addressed `(x, y)` with `x` the column and `y` the row, and
//! stored column-major to match the persisted document layout.

use crate::block::BlockDef;
use bevy::prelude::Resource;

/// Default edge length of the grid, in cells.
pub const GRID_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Layer {
    #[default]
    Background,
    Foreground,
}

impl Layer {
    /// Layers in draw order: background first, so foreground occludes it.
    pub const ALL: [Layer; 2] = [Layer::Background, Layer::Foreground];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Layer::Background => "background",
            Layer::Foreground => "foreground",
        }
    }

    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Layer::Background => Layer::Foreground,
            Layer::Foreground => Layer::Background,
        }
    }
}

/// Contents of an occupied cell.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedBlock {
    pub block: String,
    /// Radians, applied about the cell center.
    pub rotation: f32,
    pub state: Option<String>,
}

impl PlacedBlock {
    /// A fresh instance of `def` in its default state.
    #[must_use]
    pub fn new(def: &BlockDef, rotation: f32) -> Self {
        Self {
            block: def.name.clone(),
            rotation,
            state: def.default_state().map(str::to_string),
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Grid {
    size: usize,
    background: Vec<Option<PlacedBlock>>,
    foreground: Vec<Option<PlacedBlock>>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(GRID_SIZE)
    }
}

impl Grid {
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            size,
            background: vec![None; size * size],
            foreground: vec![None; size * size],
        }
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size
    }

    fn cells(&self, layer: Layer) -> &[Option<PlacedBlock>] {
        match layer {
            Layer::Background => &self.background,
            Layer::Foreground => &self.foreground,
        }
    }

    fn cells_mut(&mut self, layer: Layer) -> &mut [Option<PlacedBlock>] {
        match layer {
            Layer::Background => &mut self.background,
            Layer::Foreground => &mut self.foreground,
        }
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        self.in_bounds(x, y).then_some(x * self.size + y)
    }

    /// Place a fresh instance of `def`, overwriting whatever was there.
    /// Returns `false` (grid unchanged) when `(x, y)` is out of bounds.
    pub fn place(&mut self, layer: Layer, x: usize, y: usize, def: &BlockDef, rotation: f32) -> bool {
        self.set(layer, x, y, Some(PlacedBlock::new(def, rotation)))
    }

    /// Store `cell` as-is (used when restoring saved documents).
    pub fn set(&mut self, layer: Layer, x: usize, y: usize, cell: Option<PlacedBlock>) -> bool {
        let Some(i) = self.index(x, y) else { return false };
        self.cells_mut(layer)[i] = cell;
        true
    }

    /// Empty the cell. Returns the discarded block, if any.
    pub fn erase(&mut self, layer: Layer, x: usize, y: usize) -> Option<PlacedBlock> {
        let i = self.index(x, y)?;
        self.cells_mut(layer)[i].take()
    }

    #[must_use]
    pub fn get(&self, layer: Layer, x: usize, y: usize) -> Option<&PlacedBlock> {
        let i = self.index(x, y)?;
        self.cells(layer)[i].as_ref()
    }

    pub fn get_mut(&mut self, layer: Layer, x: usize, y: usize) -> Option<&mut PlacedBlock> {
        let i = self.index(x, y)?;
        self.cells_mut(layer)[i].as_mut()
    }

    /// Empty both layers.
    pub fn clear(&mut self) {
        self.background.fill(None);
        self.foreground.fill(None);
    }

    /// Occupied cells of `layer` as `(x, y, block)`, column by column.
    pub fn occupied(&self, layer: Layer) -> impl Iterator<Item = (usize, usize, &PlacedBlock)> {
        let size = self.size;
        self.cells(layer)
            .iter()
            .enumerate()
            .filter_map(move |(i, c)| c.as_ref().map(|b| (i / size, i % size, b)))
    }

    /// Number of occupied cells across both layers.
    #[must_use]
    pub fn count(&self) -> usize {
        Layer::ALL.iter().map(|&l| self.occupied(l).count()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}
