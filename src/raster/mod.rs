//! Software raster surface used for every pixel the editor produces.
//!
//! `Surface` wraps an `image::RgbaImage` and exposes a small canvas-style
//! drawing API: a save/restore stack for the current transform and global
//! alpha, `translate`/`rotate` that post-multiply the transform, and fills
//! for rectangles and polygons with solid or linear-gradient paint.
//!
//! Coverage is decided per pixel: a pixel is painted when its center, mapped
//! back into user space through the inverse transform, lies inside the shape.
//! This keeps rotated sprites exact (no seams between cells) and makes every
//! draw call deterministic, which the renderer tests rely on.
//!
//! # Example
//! ```rust
//! use castle_builder::raster::{rgb, Paint, Surface};
//!
//! let mut surface = Surface::filled(8, 8, rgb(0x000000));
//! surface.fill_rect(0.0, 0.0, 4.0, 4.0, Paint::Solid(rgb(0xFF0000)));
//! assert_eq!(surface.pixel(1, 1), Some(rgb(0xFF0000)));
//! assert_eq!(surface.pixel(5, 5), Some(rgb(0x000000)));
//! ```

use bevy::math::{Affine2, Vec2};
use image::{Rgba, RgbaImage};

/// 8-bit straight-alpha RGBA color.
pub type Color = Rgba<u8>;

/// Fully transparent black.
pub const TRANSPARENT: Color = Rgba([0, 0, 0, 0]);

/// Build an opaque color from a `0xRRGGBB` literal.
#[must_use]
pub const fn rgb(hex: u32) -> Color {
    Rgba([(hex >> 16) as u8, (hex >> 8) as u8, hex as u8, 255])
}

/// Build an opaque color from a `(r, g, b)` triple (the RON block format).
#[must_use]
pub const fn from_tuple(c: (u8, u8, u8)) -> Color {
    Rgba([c.0, c.1, c.2, 255])
}

/// How a filled shape is colored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Paint {
    Solid(Color),
    /// Gradient along `from -> to` in user space, clamped at both ends.
    LinearGradient {
        from: Vec2,
        to: Vec2,
        start: Color,
        end: Color,
    },
}

impl Paint {
    fn color_at(&self, p: Vec2) -> Color {
        match *self {
            Paint::Solid(c) => c,
            Paint::LinearGradient { from, to, start, end } => {
                let axis = to - from;
                let len2 = axis.length_squared();
                let t = if len2 <= f32::EPSILON {
                    0.0
                } else {
                    ((p - from).dot(axis) / len2).clamp(0.0, 1.0)
                };
                lerp_color(start, end, t)
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lerp_color(a: Color, b: Color, t: f32) -> Color {
    let mut out = [0u8; 4];
    for (i, o) in out.iter_mut().enumerate() {
        let (x, y) = (f32::from(a[i]), f32::from(b[i]));
        *o = (x + (y - x) * t).round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}

/// Source-over composite of `src` (scaled by `alpha`) onto `dst`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blend(dst: &mut Color, src: Color, alpha: f32) {
    let sa = f32::from(src[3]) / 255.0 * alpha;
    if sa <= 0.0 {
        return;
    }
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    for i in 0..3 {
        let s = f32::from(src[i]);
        let d = f32::from(dst[i]);
        let v = (s * sa + d * da * (1.0 - sa)) / out_a;
        dst[i] = v.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Even-odd point-in-polygon test.
fn polygon_contains(points: &[Vec2], p: Vec2) -> bool {
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[derive(Clone, Copy, Debug)]
struct DrawState {
    transform: Affine2,
    alpha: f32,
}

impl Default for DrawState {
    fn default() -> Self {
        Self { transform: Affine2::IDENTITY, alpha: 1.0 }
    }
}

/// An RGBA pixel buffer with a transform stack.
#[derive(Clone, Debug)]
pub struct Surface {
    image: RgbaImage,
    current: DrawState,
    stack: Vec<DrawState>,
}

impl Surface {
    /// Transparent surface of `width x height` pixels.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, TRANSPARENT)
    }

    #[must_use]
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, color),
            current: DrawState::default(),
            stack: Vec::new(),
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Overwrite every pixel (ignores transform and alpha) and reset the
    /// draw state stack.
    pub fn clear(&mut self, color: Color) {
        for p in self.image.pixels_mut() {
            *p = color;
        }
        self.current = DrawState::default();
        self.stack.clear();
    }

    /// Push the current transform and global alpha.
    pub fn save(&mut self) {
        self.stack.push(self.current);
    }

    /// Pop the last saved transform and global alpha. Unbalanced calls are ignored.
    pub fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.current = state;
        }
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.current.transform = self.current.transform * Affine2::from_translation(Vec2::new(dx, dy));
    }

    /// Rotate user space clockwise (y axis points down) by `radians`.
    pub fn rotate(&mut self, radians: f32) {
        self.current.transform = self.current.transform * Affine2::from_angle(radians);
    }

    pub fn set_global_alpha(&mut self, alpha: f32) {
        self.current.alpha = alpha.clamp(0.0, 1.0);
    }

    #[must_use]
    pub fn global_alpha(&self) -> f32 {
        self.current.alpha
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, paint: Paint) {
        self.fill_rect_with(x, y, w, h, |p| paint.color_at(p));
    }

    /// Fill a rectangle, asking `shade` for the color at each covered point
    /// (in user space).
    pub fn fill_rect_with(&mut self, x: f32, y: f32, w: f32, h: f32, shade: impl Fn(Vec2) -> Color) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let (min, max) = (Vec2::new(x, y), Vec2::new(x + w, y + h));
        let outline = [min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)];
        self.fill_covered(
            &outline,
            |p| p.x >= min.x && p.x < max.x && p.y >= min.y && p.y < max.y,
            shade,
        );
    }

    pub fn fill_polygon(&mut self, points: &[Vec2], paint: Paint) {
        if points.len() < 3 {
            return;
        }
        self.fill_covered(points, |p| polygon_contains(points, p), |p| paint.color_at(p));
    }

    /// Stroke a straight segment `width` pixels wide (butt caps).
    pub fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        let dir = to - from;
        let len = dir.length();
        if len <= f32::EPSILON || width <= 0.0 {
            return;
        }
        let n = Vec2::new(-dir.y, dir.x) / len * (width * 0.5);
        self.fill_polygon(&[from + n, to + n, to - n, from - n], Paint::Solid(color));
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn fill_covered(
        &mut self,
        outline: &[Vec2],
        inside: impl Fn(Vec2) -> bool,
        shade: impl Fn(Vec2) -> Color,
    ) {
        let alpha = self.current.alpha;
        if alpha <= 0.0 {
            return;
        }
        let transform = self.current.transform;
        let inverse = transform.inverse();

        let mut lo = Vec2::splat(f32::INFINITY);
        let mut hi = Vec2::splat(f32::NEG_INFINITY);
        for p in outline {
            let d = transform.transform_point2(*p);
            lo = lo.min(d);
            hi = hi.max(d);
        }

        let (w, h) = (self.width() as f32, self.height() as f32);
        let x0 = lo.x.floor().clamp(0.0, w) as u32;
        let y0 = lo.y.floor().clamp(0.0, h) as u32;
        let x1 = hi.x.ceil().clamp(0.0, w) as u32;
        let y1 = hi.y.ceil().clamp(0.0, h) as u32;

        for py in y0..y1 {
            for px in x0..x1 {
                let center = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
                let local = inverse.transform_point2(center);
                if inside(local) {
                    blend(self.image.get_pixel_mut(px, py), shade(local), alpha);
                }
            }
        }
    }

    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.image.get_pixel_checked(x, y).copied()
    }

    /// Raw RGBA8 bytes, row-major.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    #[must_use]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}
