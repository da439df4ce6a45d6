//! Falling water drops.
//!
//! Each frame every drop accelerates under gravity, jitters sideways and is
//! tested against the water surface. A drop that reaches the surface lands:
//! it raises the level, is reported back as a [`Landing`] so the caller can
//! spawn splashes and bubbles, and is removed. Drops that somehow leave the
//! surface are discarded too. Survivors are drawn as a fading trail with a
//! glowing head.

use glam::Vec2;
use rand::Rng;

use crate::config::PortraitConfig;
use crate::surface::{Rgba, Surface, SurfaceSize};
use crate::water::WaterState;

/// Slack around the surface before a drop counts as lost.
pub const BOUNDS_MARGIN: f32 = 50.0;

/// A single falling drop.
#[derive(Debug, Clone, PartialEq)]
pub struct Drop {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    pub opacity: f32,
}

/// Outcome of testing a drop after it moved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropFate {
    Falling,
    /// Hit the water surface at the given point.
    Landed(Vec2),
    /// Left the surface without landing.
    Lost,
}

/// Where a drop hit the water.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landing {
    pub point: Vec2,
    pub size: f32,
}

impl Drop {
    /// Apply gravity, move, then wobble sideways by up to `wobble`.
    pub fn step<R: Rng + ?Sized>(&mut self, gravity: f32, wobble: f32, rng: &mut R) {
        self.velocity.y += gravity;
        self.position += self.velocity;
        self.position.x += (rng.gen::<f32>() - 0.5) * 2.0 * wobble;
    }

    /// Classify the drop against the water line `surface_y`.
    pub fn fate(&self, surface_y: f32, size: SurfaceSize) -> DropFate {
        if self.position.y >= surface_y {
            return DropFate::Landed(Vec2::new(self.position.x, surface_y));
        }
        let out = !self.position.is_finite()
            || self.position.x < -BOUNDS_MARGIN
            || self.position.x > size.width + BOUNDS_MARGIN
            || self.position.y < -BOUNDS_MARGIN
            || self.position.y > size.height + BOUNDS_MARGIN;
        if out {
            DropFate::Lost
        } else {
            DropFate::Falling
        }
    }

    fn draw(&self, config: &PortraitConfig, surface: &mut dyn Surface) {
        let tail = self.position - self.velocity * config.trail_length;
        let color = config.water_color;
        surface.stroke_line(
            tail,
            self.position,
            self.size * 0.6,
            color.with_alpha(0.0),
            color.with_alpha(self.opacity * 0.6),
        );
        surface.glow(self.position, self.size * 2.0, Rgba {
            color: config.accent,
            alpha: self.opacity * 0.3,
        });
        surface.fill_circle(self.position, self.size * 0.5, color.with_alpha(self.opacity));
    }
}

/// Advance every drop one frame.
///
/// Landings raise `water` immediately, so later drops in the same frame see
/// the higher surface. Removed drops are gone before this returns.
pub fn integrate_drops<R: Rng + ?Sized>(
    drops: &mut Vec<Drop>,
    water: &mut WaterState,
    config: &PortraitConfig,
    rng: &mut R,
    surface: &mut dyn Surface,
) -> Vec<Landing> {
    let size = surface.size();
    let mut landings = Vec::new();

    drops.retain_mut(|drop| {
        drop.step(config.gravity, config.drop_wobble, rng);
        match drop.fate(water.surface_y(size.height), size) {
            DropFate::Landed(point) => {
                water.absorb_drop(config.fill_increment);
                landings.push(Landing {
                    point,
                    size: drop.size,
                });
                false
            }
            DropFate::Lost => false,
            DropFate::Falling => {
                drop.draw(config, surface);
                true
            }
        }
    });

    landings
}
