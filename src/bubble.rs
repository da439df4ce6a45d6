//! Rising bubbles.
//!
//! Bubbles drift upward on a sinusoidal wobble and shrink geometrically every
//! frame. They disappear once they float off the top edge or get too small.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use crate::config::PortraitConfig;
use crate::surface::Surface;

#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub position: Vec2,
    /// Horizontal centre the wobble oscillates around.
    pub anchor_x: f32,
    pub size: f32,
    pub wobble_phase: f32,
    pub wobble_speed: f32,
    /// Multiplier on the configured rise speed.
    pub buoyancy: f32,
}

/// Release one bubble at `at` with a random size between `min` and `max`.
pub fn spawn_bubble<R: Rng + ?Sized>(at: Vec2, min: f32, max: f32, rng: &mut R) -> Bubble {
    Bubble {
        position: at,
        anchor_x: at.x,
        size: min + rng.gen::<f32>() * (max - min).max(0.0),
        wobble_phase: rng.gen::<f32>() * TAU,
        wobble_speed: 0.05 + rng.gen::<f32>() * 0.1,
        buoyancy: 0.6 + rng.gen::<f32>() * 0.8,
    }
}

/// Advance, draw and cull bubbles.
pub fn integrate_bubbles(bubbles: &mut Vec<Bubble>, config: &PortraitConfig, surface: &mut dyn Surface) {
    bubbles.retain_mut(|b| {
        b.wobble_phase += b.wobble_speed;
        b.position.x = b.anchor_x + b.wobble_phase.sin() * config.bubble_wobble;
        b.position.y -= config.bubble_rise * b.buoyancy;
        b.size *= config.bubble_shrink;

        if b.position.y + b.size < 0.0 || b.size < config.bubble_min_size || !b.position.is_finite() {
            return false;
        }
        surface.fill_bubble(b.position, b.size, config.water_color, 1.0);
        true
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{PixelCanvas, SurfaceSize};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_size_shrinks_every_frame() {
        let config = PortraitConfig::default();
        let mut canvas = PixelCanvas::new(SurfaceSize::new(100.0, 1000.0));
        let mut rng = SmallRng::seed_from_u64(3);
        let mut bubbles = vec![spawn_bubble(Vec2::new(50.0, 990.0), 4.0, 6.0, &mut rng)];

        let mut last = bubbles[0].size;
        while let Some(b) = {
            integrate_bubbles(&mut bubbles, &config, &mut canvas);
            bubbles.first()
        } {
            assert!(b.size < last);
            assert!(b.size >= config.bubble_min_size);
            last = b.size;
        }
    }

    #[test]
    fn test_removed_above_top_edge() {
        let config = PortraitConfig::default();
        let mut canvas = PixelCanvas::new(SurfaceSize::new(100.0, 100.0));
        let mut rng = SmallRng::seed_from_u64(3);
        let mut bubbles = vec![spawn_bubble(Vec2::new(50.0, 2.0), 10.0, 10.0, &mut rng)];
        bubbles[0].buoyancy = 20.0;
        integrate_bubbles(&mut bubbles, &config, &mut canvas);
        assert!(bubbles.is_empty());
    }

    #[test]
    fn test_removed_when_too_small() {
        let config = PortraitConfig::default();
        let mut canvas = PixelCanvas::new(SurfaceSize::new(100.0, 100.0));
        let mut rng = SmallRng::seed_from_u64(3);
        let min = config.bubble_min_size;
        let mut bubbles = vec![spawn_bubble(Vec2::new(50.0, 80.0), min, min, &mut rng)];
        integrate_bubbles(&mut bubbles, &config, &mut canvas);
        assert!(bubbles.is_empty());
    }

    #[test]
    fn test_wobble_stays_near_anchor() {
        let config = PortraitConfig::default();
        let mut canvas = PixelCanvas::new(SurfaceSize::new(100.0, 500.0));
        let mut rng = SmallRng::seed_from_u64(8);
        let mut bubbles = vec![spawn_bubble(Vec2::new(40.0, 490.0), 5.0, 5.0, &mut rng)];
        for _ in 0..50 {
            integrate_bubbles(&mut bubbles, &config, &mut canvas);
            if let Some(b) = bubbles.first() {
                assert!((b.position.x - 40.0).abs() <= config.bubble_wobble + 1e-4);
            }
        }
    }
}
