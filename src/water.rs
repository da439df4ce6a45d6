//! Shared simulation state: water level, reveal phase and the wave overlay.
//!
//! # Phases
//!
//! ```text
//! filling ──(level reaches 1)──▶ complete ──(complete_delay frames)──▶ idle
//!    ▲                                                                  │
//!    └───────────────────────────── reset ──────────────────────────────┘
//! ```
//!
//! The wave overlay is independent of the phase: a trigger can kick it at any
//! time and it decays on its own.

use std::fmt;

use glam::Vec2;

use crate::config::PortraitConfig;
use crate::surface::{Surface, SurfaceSize};

/// Coarse state of the reveal animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Drops are falling and the water is rising.
    #[default]
    Filling,
    /// Fully revealed; waiting out the settle delay.
    Complete,
    /// Steady state.
    Idle,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Filling => "filling",
            Phase::Complete => "complete",
            Phase::Idle => "idle",
        })
    }
}

/// Water level plus the phase machine it drives.
#[derive(Debug, Clone, Default)]
pub struct WaterState {
    level: f32,
    phase: Phase,
    frames_in_phase: u32,
}

impl WaterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill fraction, `0.0..=1.0`.
    #[inline]
    pub fn level(&self) -> f32 {
        self.level
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn is_filling(&self) -> bool {
        self.phase == Phase::Filling
    }

    /// Raise the level for one landed drop.
    ///
    /// Only counts while filling. When the remainder drops under half an
    /// increment the level snaps to exactly 1 so accumulated rounding cannot
    /// leave the fill one drop short. Returns whether the level changed.
    pub fn absorb_drop(&mut self, increment: f32) -> bool {
        if self.phase != Phase::Filling || self.level >= 1.0 {
            return false;
        }
        self.level = (self.level + increment).min(1.0);
        if 1.0 - self.level < increment * 0.5 {
            self.level = 1.0;
        }
        true
    }

    /// Advance the phase machine by one frame. Returns the new phase on a
    /// transition.
    pub fn update_phase(&mut self, complete_delay: u32) -> Option<Phase> {
        self.frames_in_phase = self.frames_in_phase.saturating_add(1);
        let next = match self.phase {
            Phase::Filling if self.level >= 1.0 => Phase::Complete,
            Phase::Complete if self.frames_in_phase > complete_delay => Phase::Idle,
            _ => return None,
        };
        self.phase = next;
        self.frames_in_phase = 0;
        Some(next)
    }

    /// Back to an empty tank.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Y coordinate of the water surface on a surface of `height`.
    ///
    /// Before the first drop lands this is a fallback line just above the
    /// bottom edge.
    pub fn surface_y(&self, height: f32) -> f32 {
        if self.level > 0.0 {
            height * (1.0 - self.level)
        } else {
            height - FLOOR_OFFSET
        }
    }

    /// Faint line marking the water surface while filling.
    pub fn draw(&self, clock: f32, config: &PortraitConfig, surface: &mut dyn Surface) {
        if !self.is_filling() || self.level <= 0.0 {
            return;
        }
        let SurfaceSize { width, height, .. } = surface.size();
        let y = self.surface_y(height) + (clock * 0.05).sin();
        let line = config.water_color.with_alpha(0.35);
        surface.stroke_line(Vec2::new(0.0, y), Vec2::new(width, y), 1.5, line, line);
    }
}

/// Distance above the bottom edge that drops land on before any water exists.
pub const FLOOR_OFFSET: f32 = 2.0;

/// Decaying sinusoidal displacement applied to visible particles.
///
/// `clock` counts frames and never goes backwards; it also drives the idle
/// float of every particle.
#[derive(Debug, Clone, Default)]
pub struct Wave {
    amplitude: f32,
    clock: f32,
}

impl Wave {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    #[inline]
    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// Kick the wave to `amplitude`.
    pub fn trigger(&mut self, amplitude: f32) {
        self.amplitude = amplitude;
    }

    /// Whether the wave is strong enough to bother applying.
    #[inline]
    pub fn is_active(&self, threshold: f32) -> bool {
        self.amplitude > threshold
    }

    /// Offset for a particle whose origin is at `origin_x`.
    pub fn offset(&self, origin_x: f32, config: &PortraitConfig) -> Vec2 {
        let angle = origin_x * config.wave_frequency + self.clock * config.wave_speed;
        Vec2::new(angle.cos() * 0.3, angle.sin()) * self.amplitude
    }

    /// Tick the clock and decay the amplitude.
    pub fn advance(&mut self, decay: f32) {
        self.clock += 1.0;
        self.amplitude *= decay;
        if self.amplitude < f32::EPSILON {
            self.amplitude = 0.0;
        }
    }
}
