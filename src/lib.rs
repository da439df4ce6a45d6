//! # tidepool - a particle portrait that fills with water
//!
//! A source image is sampled into a field of coloured particles that stays
//! hidden below a rising water line. Drops fall from a spout at the top of the
//! surface; every drop that lands raises the water and throws up splashes and
//! bubbles. Particles above the water line are revealed, drift gently around
//! their home position and ripple when a wave is triggered.
//!
//! ## Quick Start
//!
//! ```ignore
//! use tidepool::prelude::*;
//!
//! let size = SurfaceSize::new(480.0, 640.0);
//! let config = PortraitConfig::default().with_gap(4);
//! let mut canvas = PixelCanvas::new(size);
//! let mut portrait = Portrait::from_path(size, config, "portrait.png").unwrap();
//!
//! // Once per frame:
//! portrait.inbox().push(Command::Trigger);
//! let stats = portrait.tick(&mut canvas);
//! println!("{} particles revealed", stats.drawn);
//! ```
//!
//! ## Frame pipeline
//!
//! Each [`Portrait::tick`] runs these stages in order:
//!
//! 1. drain the command [`Inbox`](input::Inbox) (pointer, trigger, resize, reset)
//! 2. clear the surface
//! 3. [`emitter`] spawns drops while the water is filling
//! 4. [`drops`] fall, and landings raise the [`water`] level
//! 5. the phase machine advances `filling -> complete -> idle`
//! 6. [`splash`] and [`bubble`] particles update
//! 7. the water line is drawn
//! 8. the [`field`] eases revealed particles toward their targets and draws them
//! 9. the wave overlay decays
//!
//! ## Drawing
//!
//! The simulation draws through the [`Surface`] trait in logical pixels.
//! [`PixelCanvas`] is a software rasteriser at device resolution; the
//! `tidepool` viewer binary uploads it to the window with [`present`].
//!
//! ## Configuration
//!
//! Every tuning constant lives in [`PortraitConfig`], which can be built in
//! code or loaded from JSON:
//!
//! ```ignore
//! let config = PortraitConfig::load("portrait.json")?;
//! ```

pub mod bubble;
pub mod config;
pub mod drops;
pub mod emitter;
pub mod error;
pub mod field;
pub mod input;
pub mod particle;
pub mod portrait;
pub mod present;
pub mod sampler;
pub mod splash;
pub mod surface;
pub mod time;
pub mod water;

pub use config::PortraitConfig;
pub use error::{ConfigError, GpuError, SourceError, ViewerError};
pub use glam::Vec2;
pub use input::{Command, Inbox};
pub use particle::{Particle, ParticleField};
pub use portrait::{FrameStats, Portrait};
pub use surface::{PixelCanvas, Rgb, Rgba, Surface, SurfaceSize};
pub use water::Phase;

/// Everything needed to host a portrait.
pub mod prelude {
    pub use crate::config::PortraitConfig;
    pub use crate::input::{Command, Inbox};
    pub use crate::particle::{Particle, ParticleField};
    pub use crate::portrait::{FrameStats, Portrait};
    pub use crate::surface::{PixelCanvas, Rgb, Rgba, Surface, SurfaceSize};
    pub use crate::time::FrameClock;
    pub use crate::water::Phase;
    pub use crate::Vec2;
}
