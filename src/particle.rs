//! Sampled portrait particles.

use glam::Vec2;

use crate::surface::Rgb;

/// One sampled pixel of the source image.
///
/// `origin`, `color`, `size`, `brightness`, `normalized_y` and the float
/// parameters are fixed at sampling time; only `position` and `velocity`
/// change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub origin: Vec2,
    pub position: Vec2,
    pub velocity: Vec2,
    pub color: Rgb,
    pub size: f32,
    pub brightness: f32,
    /// `origin.y / surface height`, in `[0, 1)`.
    pub normalized_y: f32,
    pub float_phase: f32,
    pub float_radius: f32,
}

impl Particle {
    /// A particle resting at its origin.
    pub fn at_rest(
        origin: Vec2,
        color: Rgb,
        size: f32,
        brightness: f32,
        surface_height: f32,
        float_phase: f32,
        float_radius: f32,
    ) -> Self {
        let normalized_y = if surface_height > 0.0 {
            (origin.y / surface_height).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            origin,
            position: origin,
            velocity: Vec2::ZERO,
            color,
            size,
            brightness,
            normalized_y,
            float_phase,
            float_radius,
        }
    }

    /// Whether the water has risen far enough to show this particle.
    #[inline]
    pub fn is_revealed(&self, water_level: f32) -> bool {
        1.0 - water_level <= self.normalized_y
    }
}

/// The fixed set of particles sampled from the source.
///
/// The collection can only be swapped out as a whole via [`replace`]; per
/// frame the renderer may move particles but never add or drop any. Every
/// swap bumps [`generation`] so callers can tell fields apart.
///
/// [`replace`]: ParticleField::replace
/// [`generation`]: ParticleField::generation
#[derive(Debug, Clone, Default)]
pub struct ParticleField {
    particles: Vec<Particle>,
    generation: u64,
}

impl ParticleField {
    pub fn new(particles: Vec<Particle>) -> Self {
        Self {
            particles,
            generation: 0,
        }
    }

    /// Swap in a freshly sampled collection, returning the old one.
    pub fn replace(&mut self, particles: Vec<Particle>) -> Vec<Particle> {
        self.generation += 1;
        std::mem::replace(&mut self.particles, particles)
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Particle> {
        self.particles.iter_mut()
    }
}
