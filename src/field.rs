//! Per-frame update and drawing of the particle field.
//!
//! For every particle:
//!
//! 1. **Reveal test** - hidden under the water line? Skip it entirely: no
//!    motion, no draw. This is what produces the rising reveal.
//! 2. **Target** - origin plus the particle's idle float plus the global
//!    wave offset (only while the wave is above its threshold).
//! 3. **Integrate** - ease velocity toward the target, move, apply friction.
//! 4. **Draw** - a coloured disc, with a glow when the particle sits on the
//!    water line during filling.
//!
//! A particle whose update would produce a non-finite value is left untouched
//! for the frame and counted as skipped.

use glam::Vec2;

use crate::config::PortraitConfig;
use crate::particle::{Particle, ParticleField};
use crate::surface::Surface;
use crate::water::{Wave, WaterState};

/// What happened to the field during one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldFrame {
    pub drawn: usize,
    pub hidden: usize,
    pub skipped: usize,
}

/// Idle lissajous drift of `particle` at time `clock`.
#[inline]
pub fn float_offset(particle: &Particle, clock: f32, config: &PortraitConfig) -> Vec2 {
    let t = clock * config.float_speed;
    Vec2::new(
        (t + particle.float_phase).sin(),
        (t * 0.8 + particle.float_phase * 1.3).cos(),
    ) * particle.float_radius
}

/// Update and draw every visible particle once.
pub fn render_field(
    field: &mut ParticleField,
    water: &WaterState,
    wave: &Wave,
    config: &PortraitConfig,
    surface: &mut dyn Surface,
) -> FieldFrame {
    let mut frame = FieldFrame::default();
    let level = water.level();
    let filling = water.is_filling();
    let water_line = 1.0 - level;
    let wave_on = wave.is_active(config.wave_threshold);

    for p in field.iter_mut() {
        if !p.is_revealed(level) {
            frame.hidden += 1;
            continue;
        }

        let mut target = p.origin + float_offset(p, wave.clock(), config);
        if wave_on {
            target += wave.offset(p.origin.x, config);
        }

        let velocity = p.velocity + (target - p.position) * config.follow_rate;
        let position = p.position + velocity;
        if !velocity.is_finite() || !position.is_finite() {
            frame.skipped += 1;
            continue;
        }
        p.position = position;
        p.velocity = velocity * config.friction;

        surface.fill_circle(p.position, p.size, p.color.with_alpha(1.0));

        if filling && config.glow_band > 0.0 {
            let distance = (p.normalized_y - water_line).abs();
            if distance < config.glow_band {
                let strength = 1.0 - distance / config.glow_band;
                surface.glow(p.position, p.size * 3.0, config.accent.with_alpha(0.5 * strength));
            }
        }
        frame.drawn += 1;
    }

    if frame.skipped > 0 {
        log::trace!("skipped {} degenerate particles this frame", frame.skipped);
    }
    frame
}
