//! Procedural sprites: the drawing routine behind every block.
//!
//! A `Sprite` is a tagged variant rather than a closure so block definitions
//! stay plain data (loadable from RON, cloneable into worker threads). All
//! pixel constants are authored for a 32 px tile and scaled by `size / 32`.
//!
//! Every sprite except `Villager` rotates about the center of its cell.

use crate::raster::{from_tuple, rgb, Color, Paint, Surface};
use bevy::math::Vec2;
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

/// Tile size the pixel constants below are authored for.
const AUTHORED_TILE: f32 = 32.0;

const TORCH_STICK: Color = rgb(0x8B4513);
const TORCH_FLAME: Color = rgb(0xFFA500);
const VILLAGER_HEAD: Color = rgb(0xFFDAB9);
const VILLAGER_BODY: Color = rgb(0x8B4513);
const DOOR_FRAME: Color = rgb(0x654321);
const DOOR_PANEL: Color = rgb(0x321000);
const BRIDGE_PLANK: Color = rgb(0xA0522D);
const MISSING_A: Color = rgb(0xFF00FF);
const MISSING_B: Color = rgb(0x000000);

/// Door state that draws the panel centered.
pub const DOOR_CLOSED: &str = "closed";
pub const DOOR_OPEN: &str = "open";
pub const BRIDGE_RETRACTED: &str = "retracted";
/// Bridge state that draws the full-width plank.
pub const BRIDGE_EXTENDED: &str = "extended";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Sprite {
    /// Diagonal gradient from `light` (top-left) to `dark` (bottom-right).
    Wall { light: (u8, u8, u8), dark: (u8, u8, u8) },
    /// Stick with a flickering flame.
    Torch,
    /// Bobbing figure. Always drawn upright.
    Villager,
    /// Frame with a panel that slides aside when the state is not `closed`.
    Door,
    /// Small block that becomes a full-width plank when `extended`.
    Bridge,
    /// Solid color shaded by Perlin noise.
    Speckled { base: (u8, u8, u8), seed: u32 },
    /// Magenta/black checker used for unresolved block names.
    #[serde(skip)]
    Missing,
}

impl Sprite {
    /// Whether the drawn pixels depend on the frame counter.
    #[must_use]
    pub fn is_animated(&self) -> bool {
        matches!(self, Sprite::Torch | Sprite::Villager)
    }

    /// The two state tokens this sprite draws differently, resting state first.
    #[must_use]
    pub fn drawn_states(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Sprite::Door => Some((DOOR_CLOSED, DOOR_OPEN)),
            Sprite::Bridge => Some((BRIDGE_RETRACTED, BRIDGE_EXTENDED)),
            _ => None,
        }
    }

    /// Draw the sprite into the cell whose top-left corner is `(x, y)`.
    ///
    /// # Arguments
    /// * `surface` - Target surface. Its transform and alpha are restored on return.
    /// * `x`, `y` - Cell origin in surface pixels.
    /// * `size` - Cell edge length in pixels.
    /// * `rotation` - Rotation in radians, applied about the cell center.
    /// * `frame` - Animation frame counter.
    /// * `state` - The placed instance's state token, if any.
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &self,
        surface: &mut Surface,
        x: f32,
        y: f32,
        size: f32,
        rotation: f32,
        frame: u64,
        state: Option<&str>,
    ) {
        let s = size;
        let k = size / AUTHORED_TILE;
        surface.save();

        if let Sprite::Villager = self {
            #[allow(clippy::cast_precision_loss)]
            let bob = (frame as f32 / 30.0).sin() * 2.0 * k;
            surface.translate(x, y + bob);
            surface.fill_rect(s / 4.0, 0.0, s / 2.0, s / 2.0, Paint::Solid(VILLAGER_HEAD));
            surface.fill_rect(s / 4.0, s / 2.0, s / 2.0, s / 2.0, Paint::Solid(VILLAGER_BODY));
            surface.restore();
            return;
        }

        surface.translate(x + s / 2.0, y + s / 2.0);
        surface.rotate(rotation);
        surface.translate(-s / 2.0, -s / 2.0);

        match self {
            Sprite::Wall { light, dark } => {
                surface.fill_rect(
                    0.0,
                    0.0,
                    s,
                    s,
                    Paint::LinearGradient {
                        from: Vec2::ZERO,
                        to: Vec2::splat(s),
                        start: from_tuple(*light),
                        end: from_tuple(*dark),
                    },
                );
            }
            Sprite::Torch => {
                #[allow(clippy::cast_precision_loss)]
                let flame = (((frame as f32 / 10.0).sin() + 1.0) * 5.0 + 5.0) * k;
                surface.fill_rect(s / 2.0 - 2.0 * k, s / 2.0, 4.0 * k, s / 2.0, Paint::Solid(TORCH_STICK));
                surface.fill_polygon(
                    &[
                        Vec2::new(s / 2.0, s / 2.0),
                        Vec2::new(s / 2.0 - 5.0 * k, s / 2.0 - flame),
                        Vec2::new(s / 2.0 + 5.0 * k, s / 2.0 - flame),
                    ],
                    Paint::Solid(TORCH_FLAME),
                );
            }
            Sprite::Door => {
                surface.fill_rect(0.0, 0.0, s, s, Paint::Solid(DOOR_FRAME));
                if state == Some(DOOR_CLOSED) {
                    surface.fill_rect(s / 4.0, s / 4.0, s / 2.0, s * 0.75, Paint::Solid(DOOR_PANEL));
                } else {
                    surface.fill_rect(0.0, s / 4.0, s / 4.0, s * 0.75, Paint::Solid(DOOR_PANEL));
                }
            }
            Sprite::Bridge => {
                if state == Some(BRIDGE_EXTENDED) {
                    surface.fill_rect(0.0, s / 3.0, s, s / 3.0, Paint::Solid(BRIDGE_PLANK));
                } else {
                    surface.fill_rect(s / 3.0, s / 3.0, s / 3.0, s / 3.0, Paint::Solid(BRIDGE_PLANK));
                }
            }
            Sprite::Speckled { base, seed } => {
                let perlin = Perlin::new(*seed);
                let base = from_tuple(*base);
                surface.fill_rect_with(0.0, 0.0, s, s, |p| {
                    #[allow(clippy::cast_possible_truncation)]
                    let n = perlin.get([f64::from(p.x / s * 4.0), f64::from(p.y / s * 4.0)]) as f32;
                    shade(base, 1.0 + 0.3 * n)
                });
            }
            Sprite::Missing => {
                let half = s / 2.0;
                surface.fill_rect_with(0.0, 0.0, s, s, |p| {
                    if (p.x < half) == (p.y < half) { MISSING_A } else { MISSING_B }
                });
            }
            Sprite::Villager => {}
        }

        surface.restore();
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn shade(c: Color, factor: f32) -> Color {
    let mut out = c;
    for i in 0..3 {
        out[i] = (f32::from(c[i]) * factor).round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: Color = rgb(0x000000);

    fn cell() -> Surface {
        Surface::filled(32, 32, BG)
    }

    #[test]
    fn door_panel_moves_with_state() {
        let mut closed = cell();
        Sprite::Door.draw(&mut closed, 0.0, 0.0, 32.0, 0.0, 0, Some("closed"));
        assert_eq!(closed.pixel(16, 20), Some(DOOR_PANEL));
        assert_eq!(closed.pixel(2, 20), Some(DOOR_FRAME));

        let mut open = cell();
        Sprite::Door.draw(&mut open, 0.0, 0.0, 32.0, 0.0, 0, Some("open"));
        assert_eq!(open.pixel(16, 20), Some(DOOR_FRAME));
        assert_eq!(open.pixel(2, 20), Some(DOOR_PANEL));
    }

    #[test]
    fn bridge_extends_full_width() {
        let mut s = cell();
        Sprite::Bridge.draw(&mut s, 0.0, 0.0, 32.0, 0.0, 0, Some("retracted"));
        assert_eq!(s.pixel(1, 16), Some(BG));
        assert_eq!(s.pixel(16, 16), Some(BRIDGE_PLANK));

        let mut s = cell();
        Sprite::Bridge.draw(&mut s, 0.0, 0.0, 32.0, 0.0, 0, Some("extended"));
        assert_eq!(s.pixel(1, 16), Some(BRIDGE_PLANK));
        assert_eq!(s.pixel(16, 2), Some(BG));
    }

    #[test]
    fn bridge_rotates_about_cell_center() {
        let mut s = cell();
        Sprite::Bridge.draw(&mut s, 0.0, 0.0, 32.0, std::f32::consts::FRAC_PI_2, 0, Some("extended"));
        // A horizontal plank turned a quarter turn becomes a vertical one.
        assert_eq!(s.pixel(16, 1), Some(BRIDGE_PLANK));
        assert_eq!(s.pixel(16, 30), Some(BRIDGE_PLANK));
        assert_eq!(s.pixel(1, 16), Some(BG));
    }

    #[test]
    fn sprites_draw_inside_their_cell() {
        let mut s = Surface::filled(64, 64, BG);
        Sprite::Wall { light: (0x88, 0x88, 0x88), dark: (0x55, 0x55, 0x55) }
            .draw(&mut s, 32.0, 32.0, 32.0, 0.0, 0, None);
        assert_eq!(s.pixel(31, 31), Some(BG));
        assert_ne!(s.pixel(32, 32), Some(BG));
        assert_ne!(s.pixel(63, 63), Some(BG));
    }

    #[test]
    fn torch_flame_changes_with_frame() {
        let mut a = cell();
        let mut b = cell();
        Sprite::Torch.draw(&mut a, 0.0, 0.0, 32.0, 0.0, 0, None);
        Sprite::Torch.draw(&mut b, 0.0, 0.0, 32.0, 0.0, 16, None);
        assert_ne!(a.as_raw(), b.as_raw());
        assert!(Sprite::Torch.is_animated());
        assert!(!Sprite::Door.is_animated());
    }

    #[test]
    fn drawing_is_deterministic_for_a_frame() {
        let sprite = Sprite::Speckled { base: (120, 60, 200), seed: 7 };
        let mut a = cell();
        let mut b = cell();
        sprite.draw(&mut a, 0.0, 0.0, 32.0, 0.0, 3, None);
        sprite.draw(&mut b, 0.0, 0.0, 32.0, 0.0, 3, None);
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn villager_ignores_rotation() {
        let mut a = cell();
        let mut b = cell();
        Sprite::Villager.draw(&mut a, 0.0, 0.0, 32.0, 0.0, 0, None);
        Sprite::Villager.draw(&mut b, 0.0, 0.0, 32.0, std::f32::consts::FRAC_PI_2, 0, None);
        assert_eq!(a.as_raw(), b.as_raw());
        assert_eq!(a.pixel(16, 4), Some(VILLAGER_HEAD));
    }

    #[test]
    fn sprite_parses_from_ron() {
        let s: Sprite = ron::from_str("Speckled(base: (10, 20, 30), seed: 4)").unwrap();
        assert_eq!(s, Sprite::Speckled { base: (10, 20, 30), seed: 4 });
    }
}
