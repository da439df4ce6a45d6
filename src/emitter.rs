//! The spout that feeds drops into the scene.
//!
//! A [`Spout`] sits at the top centre of the surface. While the water is
//! filling it releases `drops_per_frame` drops every tick with a little
//! horizontal scatter; in every other phase it is silent.

use glam::Vec2;
use rand::Rng;

use crate::config::PortraitConfig;
use crate::drops::Drop;
use crate::surface::SurfaceSize;
use crate::water::Phase;

/// Fixed drop source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spout {
    /// Centre of the spout opening.
    pub position: Vec2,
    /// Horizontal half-width of the opening.
    pub spread: f32,
}

impl Spout {
    /// Spout centred on the top edge of `size`.
    pub fn centered(size: SurfaceSize, spread: f32) -> Self {
        Self {
            position: Vec2::new(size.width / 2.0, 0.0),
            spread,
        }
    }

    /// Release this frame's drops into `drops`. Returns how many were added.
    pub fn emit<R: Rng + ?Sized>(
        &self,
        phase: Phase,
        config: &PortraitConfig,
        rng: &mut R,
        drops: &mut Vec<Drop>,
    ) -> usize {
        if phase != Phase::Filling {
            return 0;
        }
        let count = config.drops_per_frame as usize;
        drops.reserve(count);
        for _ in 0..count {
            let jitter = (rng.gen::<f32>() - 0.5) * 2.0 * self.spread;
            drops.push(Drop {
                position: self.position + Vec2::new(jitter, 0.0),
                velocity: Vec2::new((rng.gen::<f32>() - 0.5) * 0.6, 1.0 + rng.gen::<f32>() * 2.0),
                size: 2.0 + rng.gen::<f32>() * 2.0,
                opacity: 0.6 + rng.gen::<f32>() * 0.4,
            });
        }
        count
    }
}
