//! This module defines `BlockDef` (one placeable block) and the
//! `BlockRegistry` resource that holds every definition in palette order.
//!
//! The registry is append-only: `register` either appends a new block or
//! replaces the definition with the same name in place. Placed cells refer
//! to blocks by name, so entries registered earlier stay resolvable no
//! matter what is added later.
//!
//! Example:
//! ```rust
//! use castle_builder::block::registry::BlockRegistry;
//!
//! let mut registry = BlockRegistry::builtin();
//! let door = registry.get("Door").unwrap();
//! assert!(door.is_interactive());
//! assert_eq!(door.default_state(), Some("closed"));
//!
//! let relic = registry.unlock();
//! assert_eq!(relic, "Relic 1");
//! assert!(registry.get("Door").is_some());
//! ```
//!
use super::sprite::{Sprite, BRIDGE_EXTENDED, BRIDGE_RETRACTED, DOOR_CLOSED, DOOR_OPEN};
use crate::raster::Surface;
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reserved name of the placeholder drawn for unresolved cells.
pub const MISSING_NAME: &str = "__missing__";

/// Two-state toggle carried by interactive blocks. The first state is the
/// default a freshly placed block starts in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toggle {
    pub states: (String, String),
}

impl Toggle {
    #[must_use]
    pub fn new(first: &str, second: &str) -> Self {
        Self { states: (first.to_string(), second.to_string()) }
    }

    /// State that follows `current`. Anything other than the first state
    /// (including no state at all) goes back to the first.
    #[must_use]
    pub fn next(&self, current: Option<&str>) -> String {
        if current == Some(self.states.0.as_str()) {
            self.states.1.clone()
        } else {
            self.states.0.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDef {
    pub name: String,
    pub sprite: Sprite,

    /// Present only on interactive blocks.
    #[serde(default)]
    pub toggle: Option<Toggle>,
}

impl BlockDef {
    #[must_use]
    pub fn new(name: &str, sprite: Sprite) -> Self {
        Self { name: name.to_string(), sprite, toggle: None }
    }

    #[must_use]
    pub fn with_toggle(mut self, first: &str, second: &str) -> Self {
        self.toggle = Some(Toggle::new(first, second));
        self
    }

    #[must_use]
    pub fn is_animated(&self) -> bool {
        self.sprite.is_animated()
    }

    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.toggle.is_some()
    }

    #[must_use]
    pub fn default_state(&self) -> Option<&str> {
        self.toggle.as_ref().map(|t| t.states.0.as_str())
    }

    /// Draw an instance of this block. The toggle's first and second states
    /// map onto the sprite's resting and active drawings, so a block can
    /// name its states freely.
    #[allow(clippy::too_many_arguments)]
    pub fn draw(&self, surface: &mut Surface, x: f32, y: f32, size: f32, rotation: f32, frame: u64, state: Option<&str>) {
        let drawn = match (&self.toggle, self.sprite.drawn_states(), state) {
            (Some(toggle), Some((rest, _)), Some(s)) if s == toggle.states.0 => Some(rest),
            (Some(toggle), Some((_, active)), Some(s)) if s == toggle.states.1 => Some(active),
            _ => state,
        };
        self.sprite.draw(surface, x, y, size, rotation, frame, drawn);
    }

    /// Advance a placed instance's state. Returns `false` (and leaves the
    /// state alone) for non-interactive blocks.
    pub fn on_click(&self, state: &mut Option<String>) -> bool {
        match &self.toggle {
            Some(toggle) => {
                *state = Some(toggle.next(state.as_deref()));
                true
            }
            None => false,
        }
    }
}

#[derive(Resource, Clone, Debug)]
pub struct BlockRegistry {
    blocks: Vec<BlockDef>,
    by_name: HashMap<String, usize>,
    unlocked: u32,
    missing: BlockDef,
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self {
            blocks: Vec::new(),
            by_name: HashMap::new(),
            unlocked: 0,
            missing: BlockDef::new(MISSING_NAME, Sprite::Missing),
        }
    }
}

impl BlockRegistry {
    /// Registry holding the built-in catalog: Wall, Torch, Villager, Door, Bridge.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        registry.register(BlockDef::new(
            "Wall",
            Sprite::Wall { light: (0x88, 0x88, 0x88), dark: (0x55, 0x55, 0x55) },
        ));
        registry.register(BlockDef::new("Torch", Sprite::Torch));
        registry.register(BlockDef::new("Villager", Sprite::Villager));
        registry.register(BlockDef::new("Door", Sprite::Door).with_toggle(DOOR_CLOSED, DOOR_OPEN));
        registry.register(BlockDef::new("Bridge", Sprite::Bridge).with_toggle(BRIDGE_RETRACTED, BRIDGE_EXTENDED));
        registry
    }

    /// Append `block`, or replace the existing definition of the same name
    /// in place. Returns the palette index, or `None` for the reserved
    /// placeholder name.
    pub fn register(&mut self, block: BlockDef) -> Option<usize> {
        if block.name == MISSING_NAME {
            return None;
        }
        if let Some(&index) = self.by_name.get(&block.name) {
            self.blocks[index] = block;
            return Some(index);
        }
        let index = self.blocks.len();
        self.by_name.insert(block.name.clone(), index);
        self.blocks.push(block);
        Some(index)
    }

    /// Register every block in `blocks`. Returns how many were new names.
    pub fn merge(&mut self, blocks: impl IntoIterator<Item = BlockDef>) -> usize {
        let before = self.blocks.len();
        for block in blocks {
            self.register(block);
        }
        self.blocks.len() - before
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BlockDef> {
        self.by_name.get(name).map(|&i| &self.blocks[i])
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Look up `name`, falling back to the placeholder definition.
    #[must_use]
    pub fn resolve(&self, name: &str) -> &BlockDef {
        self.get(name).unwrap_or(&self.missing)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockDef> {
        self.blocks.iter()
    }

    #[must_use]
    pub fn blocks(&self) -> &[BlockDef] {
        &self.blocks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Append a procedurally colored block and return its name.
    ///
    /// Each unlock gets the next "Relic N" name (skipping names already
    /// taken), a hue stepped by the golden angle and a noise seed derived
    /// from the counter, so successive relics look distinct.
    pub fn unlock(&mut self) -> String {
        self.unlocked += 1;
        let mut n = self.unlocked;
        let mut name = format!("Relic {n}");
        while self.by_name.contains_key(&name) {
            n += 1;
            name = format!("Relic {n}");
        }
        self.unlocked = n;

        #[allow(clippy::cast_precision_loss)]
        let hue = (n as f32 * 137.508) % 360.0;
        let base = hsv_to_rgb(hue, 0.6, 0.85);
        self.register(BlockDef::new(&name, Sprite::Speckled { base, seed: n.wrapping_mul(7919) }));
        name
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (u8, u8, u8) {
    let c = v * s;
    let hp = h / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = v - c;
    let to_u8 = |f: f32| ((f + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_u8(r), to_u8(g), to_u8(b))
}
