//! Splash droplets thrown up where drops hit the water.

use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;

use crate::config::PortraitConfig;
use crate::surface::Surface;

#[derive(Debug, Clone, PartialEq)]
pub struct Splash {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Remaining life, starts at 1 and drives both size and opacity.
    pub life: f32,
    pub size: f32,
}

/// Throw `count` droplets upward from `at`.
pub fn spawn_splash<R: Rng + ?Sized>(at: Vec2, count: u32, rng: &mut R, out: &mut Vec<Splash>) {
    out.reserve(count as usize);
    for _ in 0..count {
        // Upper half-plane, biased to steep angles.
        let angle = PI + rng.gen::<f32>() * PI;
        let speed = 1.0 + rng.gen::<f32>() * 2.5;
        out.push(Splash {
            position: at,
            velocity: Vec2::new(angle.cos(), angle.sin()) * speed,
            life: 1.0,
            size: 1.0 + rng.gen::<f32>() * 1.5,
        });
    }
}

/// Advance, draw and cull splashes. A splash whose life runs out is removed
/// in the same frame without being drawn.
pub fn integrate_splashes(splashes: &mut Vec<Splash>, config: &PortraitConfig, surface: &mut dyn Surface) {
    splashes.retain_mut(|s| {
        s.velocity.y += config.gravity;
        s.position += s.velocity;
        s.life -= config.splash_life_step;
        if s.life <= 0.0 || !s.position.is_finite() {
            return false;
        }
        surface.fill_circle(s.position, s.size * s.life.max(0.3), config.water_color.with_alpha(s.life));
        true
    });
}
