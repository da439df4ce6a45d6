//! Drawing surfaces.
//!
//! The portrait never talks to a window or GPU directly. Every stage draws
//! through the [`Surface`] trait, which models a 2D raster canvas measured in
//! logical pixels. [`PixelCanvas`] is the bundled software implementation: an
//! RGBA buffer at physical resolution (logical size × device pixel ratio) that
//! the viewer uploads to the GPU once per frame.
//!
//! # Example
//!
//! ```ignore
//! let mut canvas = PixelCanvas::new(SurfaceSize::new(320.0, 240.0).with_scale_factor(2.0));
//! canvas.fill_circle(Vec2::new(10.0, 10.0), 3.0, Rgb::new(0, 245, 212).with_alpha(1.0));
//! assert_eq!(canvas.physical_width(), 640);
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An opaque 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Mean of the three channels, 0..=255.
    #[inline]
    pub fn brightness(&self) -> f32 {
        (self.r as f32 + self.g as f32 + self.b as f32) / 3.0
    }

    /// Add a per-channel tint, saturating at 255.
    pub fn saturating_add(self, tint: [u8; 3]) -> Self {
        Self {
            r: self.r.saturating_add(tint[0]),
            g: self.g.saturating_add(tint[1]),
            b: self.b.saturating_add(tint[2]),
        }
    }

    /// Attach an opacity (clamped to 0..=1).
    #[inline]
    pub fn with_alpha(self, alpha: f32) -> Rgba {
        Rgba {
            color: self,
            alpha: if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 0.0 },
        }
    }
}

/// A colour with straight (non-premultiplied) opacity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba {
    pub color: Rgb,
    pub alpha: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba {
        color: Rgb::new(0, 0, 0),
        alpha: 0.0,
    };

    fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgba {
            color: Rgb::new(
                mix(self.color.r, other.color.r),
                mix(self.color.g, other.color.g),
                mix(self.color.b, other.color.b),
            ),
            alpha: self.alpha + (other.alpha - self.alpha) * t,
        }
    }
}

/// Size of a drawing surface.
///
/// `width`/`height` are logical pixels (the coordinate space the simulation
/// runs in); `scale_factor` is the device pixel ratio used to rasterise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
    pub scale_factor: f32,
}

impl SurfaceSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            scale_factor: 1.0,
        }
    }

    pub fn with_scale_factor(mut self, scale_factor: f32) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Whether anything can be drawn at this size.
    pub fn is_drawable(&self) -> bool {
        self.width.is_finite()
            && self.height.is_finite()
            && self.scale_factor.is_finite()
            && self.width >= 1.0
            && self.height >= 1.0
            && self.scale_factor > 0.0
    }

    /// Backing-store dimensions in device pixels.
    pub fn physical(&self) -> (u32, u32) {
        if !self.is_drawable() {
            return (0, 0);
        }
        (
            (self.width * self.scale_factor).round().max(1.0) as u32,
            (self.height * self.scale_factor).round().max(1.0) as u32,
        )
    }
}

/// A 2D raster target the simulation draws into every frame.
///
/// All coordinates and radii are in logical pixels.
pub trait Surface {
    /// Current size of the surface.
    fn size(&self) -> SurfaceSize;

    /// Wipe the surface to its background.
    fn clear(&mut self);

    /// Filled, anti-aliased disc.
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);

    /// Line segment whose colour fades linearly from `start` to `end`.
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, start: Rgba, end: Rgba);

    /// Disc shaded with a radial gradient: a bright highlight up and to the
    /// left of the centre falling off into `color`.
    fn fill_bubble(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32) {
        self.fill_circle(center, radius, color.with_alpha(alpha * 0.4));
        let highlight = center - Vec2::splat(radius * 0.3);
        self.fill_circle(highlight, radius * 0.35, Rgb::new(255, 255, 255).with_alpha(alpha * 0.8));
    }

    /// Soft additive halo.
    fn glow(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.fill_circle(center, radius, Rgba {
            alpha: color.alpha * 0.35,
            ..color
        });
    }
}

/// RGBA8 software canvas.
///
/// Pixels are stored row-major, 4 bytes each, straight alpha, in the sRGB
/// encoding the colours were given in.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    size: SurfaceSize,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    background: Rgb,
}

impl PixelCanvas {
    /// Near-black page background.
    pub const DEFAULT_BACKGROUND: Rgb = Rgb::new(10, 10, 15);

    pub fn new(size: SurfaceSize) -> Self {
        let (width, height) = size.physical();
        let mut canvas = Self {
            size,
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize) * 4],
            background: Self::DEFAULT_BACKGROUND,
        };
        canvas.clear();
        canvas
    }

    pub fn with_background(mut self, background: Rgb) -> Self {
        self.background = background;
        self.clear();
        self
    }

    /// Reallocate the backing store for a new size. Contents are cleared.
    pub fn resize(&mut self, size: SurfaceSize) {
        let (width, height) = size.physical();
        self.size = size;
        self.width = width;
        self.height = height;
        self.pixels = vec![0; (width as usize) * (height as usize) * 4];
        self.clear();
    }

    #[inline]
    pub fn physical_width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn physical_height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes (`physical_width * physical_height * 4`).
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixel at physical coordinates, if in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    #[inline]
    fn scale(&self) -> f32 {
        self.size.scale_factor
    }

    /// Source-over blend of one physical pixel.
    #[inline]
    fn blend(&mut self, x: i64, y: i64, color: Rgb, alpha: f32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 || alpha <= 0.0 {
            return;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        let a = alpha.min(1.0);
        let px = &mut self.pixels[i..i + 4];
        px[0] = (px[0] as f32 + (color.r as f32 - px[0] as f32) * a).round() as u8;
        px[1] = (px[1] as f32 + (color.g as f32 - px[1] as f32) * a).round() as u8;
        px[2] = (px[2] as f32 + (color.b as f32 - px[2] as f32) * a).round() as u8;
        px[3] = 255;
    }

    /// Additive blend of one physical pixel, saturating.
    #[inline]
    fn add(&mut self, x: i64, y: i64, color: Rgb, alpha: f32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 || alpha <= 0.0 {
            return;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        let px = &mut self.pixels[i..i + 4];
        px[0] = (px[0] as f32 + color.r as f32 * alpha).min(255.0) as u8;
        px[1] = (px[1] as f32 + color.g as f32 * alpha).min(255.0) as u8;
        px[2] = (px[2] as f32 + color.b as f32 * alpha).min(255.0) as u8;
        px[3] = 255;
    }

    /// Physical-pixel bounding box of a disc, clipped to the canvas.
    fn disc_bounds(&self, center: Vec2, radius: f32) -> Option<(i64, i64, i64, i64)> {
        if !center.is_finite() || !radius.is_finite() || radius <= 0.0 {
            return None;
        }
        let x0 = ((center.x - radius).floor() as i64).max(0);
        let y0 = ((center.y - radius).floor() as i64).max(0);
        let x1 = ((center.x + radius).ceil() as i64).min(self.width as i64 - 1);
        let y1 = ((center.y + radius).ceil() as i64).min(self.height as i64 - 1);
        if x0 > x1 || y0 > y1 {
            return None;
        }
        Some((x0, y0, x1, y1))
    }
}

impl Surface for PixelCanvas {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn clear(&mut self) {
        let bg = self.background;
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[bg.r, bg.g, bg.b, 255]);
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        let s = self.scale();
        let (c, r) = (center * s, radius * s);
        let Some((x0, y0, x1, y1)) = self.disc_bounds(c, r + 0.5) else {
            return;
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5).distance(c);
                // One-pixel soft edge.
                let coverage = (r + 0.5 - d).clamp(0.0, 1.0);
                self.blend(x, y, color.color, color.alpha * coverage);
            }
        }
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, start: Rgba, end: Rgba) {
        let s = self.scale();
        let (a, b, half) = (from * s, to * s, (width * s * 0.5).max(0.5));
        if !a.is_finite() || !b.is_finite() || !half.is_finite() {
            return;
        }
        let seg = b - a;
        let len_sq = seg.length_squared();
        let lo = a.min(b) - Vec2::splat(half + 1.0);
        let hi = a.max(b) + Vec2::splat(half + 1.0);
        let x0 = (lo.x.floor() as i64).max(0);
        let y0 = (lo.y.floor() as i64).max(0);
        let x1 = (hi.x.ceil() as i64).min(self.width as i64 - 1);
        let y1 = (hi.y.ceil() as i64).min(self.height as i64 - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let t = if len_sq > f32::EPSILON {
                    ((p - a).dot(seg) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let d = p.distance(a + seg * t);
                let coverage = (half + 0.5 - d).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    let c = start.lerp(end, t);
                    self.blend(x, y, c.color, c.alpha * coverage);
                }
            }
        }
    }

    fn fill_bubble(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32) {
        let s = self.scale();
        let (c, r) = (center * s, radius * s);
        let Some((x0, y0, x1, y1)) = self.disc_bounds(c, r + 0.5) else {
            return;
        };
        let highlight = c - Vec2::splat(r * 0.3);
        let white = Rgb::new(255, 255, 255);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let coverage = (r + 0.5 - p.distance(c)).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                // Stops: white 0.8 -> color 0.4 at half radius -> color 0.1 at rim.
                let t = (p.distance(highlight) / r).clamp(0.0, 1.0);
                let (shade, a) = if t < 0.5 {
                    let k = t / 0.5;
                    let white_a = white.with_alpha(0.8);
                    let mid = color.with_alpha(0.4);
                    let mixed = white_a.lerp(mid, k);
                    (mixed.color, mixed.alpha)
                } else {
                    let k = (t - 0.5) / 0.5;
                    (color, 0.4 + (0.1 - 0.4) * k)
                };
                self.blend(x, y, shade, a * alpha * coverage);
            }
        }
    }

    fn glow(&mut self, center: Vec2, radius: f32, color: Rgba) {
        let s = self.scale();
        let (c, r) = (center * s, radius * s);
        let Some((x0, y0, x1, y1)) = self.disc_bounds(c, r) else {
            return;
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5).distance(c);
                let falloff = (1.0 - d / r).max(0.0);
                self.add(x, y, color.color, color.alpha * falloff * falloff);
            }
        }
    }
}
