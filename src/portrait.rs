//! The particle portrait: orchestrates every stage once per frame.

use std::path::Path;

use glam::Vec2;
use image::RgbaImage;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::bubble::{integrate_bubbles, spawn_bubble, Bubble};
use crate::config::PortraitConfig;
use crate::drops::{integrate_drops, Drop};
use crate::emitter::Spout;
use crate::field::{render_field, FieldFrame};
use crate::input::{Command, Inbox};
use crate::particle::{Particle, ParticleField};
use crate::sampler::{load_source, placeholder_field, sample_image};
use crate::splash::{integrate_splashes, spawn_splash, Splash};
use crate::surface::{Surface, SurfaceSize};
use crate::water::{Phase, Wave, WaterState};

/// Summary of one [`Portrait::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Particles drawn this frame.
    pub drawn: usize,
    /// Particles still under the water line.
    pub hidden: usize,
    /// Particles left untouched because their update was not finite.
    pub skipped: usize,
    /// Drops that hit the water this frame.
    pub landed: usize,
    /// Drops still falling after this frame.
    pub drops: usize,
    /// Live splash droplets.
    pub splashes: usize,
    /// Live bubbles.
    pub bubbles: usize,
}

/// A particle portrait bound to a surface size.
///
/// Construction samples the source once. After that the host calls
/// [`tick`](Self::tick) every frame and feeds input through
/// [`inbox`](Self::inbox); nothing else mutates the simulation.
///
/// # Example
///
/// ```ignore
/// let size = SurfaceSize::new(480.0, 640.0);
/// let mut canvas = PixelCanvas::new(size);
/// let mut portrait = Portrait::from_path(size, PortraitConfig::default(), "photo.png")
///     .expect("surface is drawable");
///
/// loop {
///     portrait.tick(&mut canvas);
///     // present canvas.pixels()
/// }
/// ```
pub struct Portrait {
    config: PortraitConfig,
    size: SurfaceSize,
    /// Decoded source kept for re-sampling; `None` means placeholder.
    source: Option<RgbaImage>,
    field: ParticleField,
    water: WaterState,
    wave: Wave,
    spout: Spout,
    drops: Vec<Drop>,
    splashes: Vec<Splash>,
    bubbles: Vec<Bubble>,
    pointer: Option<Vec2>,
    inbox: Inbox,
    rng: SmallRng,
    frame: u64,
}

impl Portrait {
    /// Portrait sampled from an already decoded image.
    ///
    /// Returns `None` when `size` is not drawable or `config` is invalid;
    /// the effect simply does not start.
    pub fn from_image(size: SurfaceSize, config: PortraitConfig, image: RgbaImage) -> Option<Self> {
        Self::new(size, config, Some(image))
    }

    /// Portrait sampled from an image file, falling back to the placeholder
    /// field if the file cannot be loaded.
    pub fn from_path(size: SurfaceSize, config: PortraitConfig, path: impl AsRef<Path>) -> Option<Self> {
        let source = match load_source(path.as_ref()) {
            Ok(image) => Some(image),
            Err(e) => {
                log::warn!(
                    "could not load portrait source '{}', using placeholder: {}",
                    path.as_ref().display(),
                    e
                );
                None
            }
        };
        Self::new(size, config, source)
    }

    /// Portrait built on the synthetic placeholder field.
    pub fn placeholder(size: SurfaceSize, config: PortraitConfig) -> Option<Self> {
        Self::new(size, config, None)
    }

    /// Portrait over an optional decoded source; `None` uses the placeholder.
    ///
    /// Returns `None` when `size` is not drawable or `config` is invalid.
    pub fn new(size: SurfaceSize, config: PortraitConfig, source: Option<RgbaImage>) -> Option<Self> {
        if !size.is_drawable() {
            log::debug!("surface {}x{} is not drawable; portrait not started", size.width, size.height);
            return None;
        }
        if let Err(e) = config.validate() {
            log::warn!("portrait not started: {}", e);
            return None;
        }
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let mut portrait = Self {
            spout: Spout::centered(size, config.spout_spread),
            config,
            size,
            source,
            field: ParticleField::default(),
            water: WaterState::new(),
            wave: Wave::new(),
            drops: Vec::new(),
            splashes: Vec::new(),
            bubbles: Vec::new(),
            pointer: None,
            inbox: Inbox::new(),
            rng,
            frame: 0,
        };
        portrait.inbox.set_scale_factor(size.scale_factor as f64);
        let particles = portrait.sample();
        portrait.field = ParticleField::new(particles);
        Some(portrait)
    }

    /// Sample the current source at the current size. Never empty for a
    /// drawable surface: a source that yields nothing falls back to the
    /// placeholder.
    fn sample(&mut self) -> Vec<Particle> {
        if let Some(image) = &self.source {
            let particles = sample_image(image, self.size, &self.config, &mut self.rng);
            if !particles.is_empty() {
                log::info!(
                    "sampled {} particles from {}x{} source at gap {}",
                    particles.len(),
                    image.width(),
                    image.height(),
                    self.config.gap
                );
                return particles;
            }
            log::warn!("source produced no particles above the thresholds, using placeholder");
        }
        let particles = placeholder_field(self.size, &self.config, &mut self.rng);
        log::info!("created {} placeholder particles", particles.len());
        particles
    }

    /// Queue for host input; drained at the start of every tick.
    pub fn inbox(&mut self) -> &mut Inbox {
        &mut self.inbox
    }

    /// Shorthand for `inbox().push(command)`.
    pub fn send(&mut self, command: Command) {
        self.inbox.push(command);
    }

    /// Advance the simulation by one frame and draw it to `surface`.
    ///
    /// Stages run in dependency order: inputs, spout, drops, splashes,
    /// bubbles, water line, particle field.
    pub fn tick(&mut self, surface: &mut dyn Surface) -> FrameStats {
        self.apply_commands();
        self.frame += 1;

        surface.clear();

        self.spout
            .emit(self.water.phase(), &self.config, &mut self.rng, &mut self.drops);
        let landings = integrate_drops(
            &mut self.drops,
            &mut self.water,
            &self.config,
            &mut self.rng,
            surface,
        );
        for landing in &landings {
            spawn_splash(landing.point, self.config.splash_burst, &mut self.rng, &mut self.splashes);
            if self.rng.gen::<f32>() < self.config.bubble_chance {
                let bubble = spawn_bubble(landing.point, 1.0, landing.size + 1.0, &mut self.rng);
                self.bubbles.push(bubble);
            }
        }
        if let Some(phase) = self.water.update_phase(self.config.complete_delay) {
            log::info!("portrait phase -> {} at frame {}", phase, self.frame);
        }

        integrate_splashes(&mut self.splashes, &self.config, surface);
        integrate_bubbles(&mut self.bubbles, &self.config, surface);
        self.water.draw(self.wave.clock(), &self.config, surface);

        let FieldFrame { drawn, hidden, skipped } =
            render_field(&mut self.field, &self.water, &self.wave, &self.config, surface);
        self.wave.advance(self.config.wave_decay);

        FrameStats {
            drawn,
            hidden,
            skipped,
            landed: landings.len(),
            drops: self.drops.len(),
            splashes: self.splashes.len(),
            bubbles: self.bubbles.len(),
        }
    }

    fn apply_commands(&mut self) {
        let mut resize = None;
        let commands: Vec<Command> = self.inbox.drain().collect();
        for command in commands {
            match command {
                Command::PointerMoved(at) => self.pointer = Some(at),
                Command::PointerLeft => self.pointer = None,
                Command::Trigger => self.trigger(),
                // Only the last resize of a frame matters.
                Command::Resize(size) => resize = Some(size),
                Command::Reset => self.reset(),
            }
        }
        if let Some(size) = resize {
            self.resize(size);
        }
    }

    fn trigger(&mut self) {
        self.wave.trigger(self.config.wave_amplitude);
        let count = self.config.bubble_burst;
        match self.pointer {
            Some(at) => {
                spawn_splash(at, self.config.splash_burst * 2, &mut self.rng, &mut self.splashes);
                for _ in 0..count {
                    let jitter = Vec2::new(self.rng.gen::<f32>() - 0.5, self.rng.gen::<f32>() - 0.5) * 40.0;
                    let bubble = spawn_bubble(at + jitter, 2.0, 6.0, &mut self.rng);
                    self.bubbles.push(bubble);
                }
            }
            None => {
                for _ in 0..count {
                    let at = Vec2::new(
                        self.rng.gen::<f32>() * self.size.width,
                        self.size.height - self.rng.gen::<f32>() * 20.0,
                    );
                    let bubble = spawn_bubble(at, 2.0, 6.0, &mut self.rng);
                    self.bubbles.push(bubble);
                }
            }
        }
        log::debug!("trigger: wave {} and {} bubbles", self.wave.amplitude(), count);
    }

    fn reset(&mut self) {
        self.water.reset();
        self.drops.clear();
        self.splashes.clear();
        self.bubbles.clear();
        log::info!("portrait reset at frame {}", self.frame);
    }

    fn resize(&mut self, size: SurfaceSize) {
        if !size.is_drawable() {
            log::debug!("ignoring resize to undrawable {}x{}", size.width, size.height);
            return;
        }
        log::debug!("resize {}x{} -> {}x{}", self.size.width, self.size.height, size.width, size.height);
        self.size = size;
        self.spout = Spout::centered(size, self.config.spout_spread);
        self.inbox.set_scale_factor(size.scale_factor as f64);
        let particles = self.sample();
        self.field.replace(particles);
    }

    pub fn config(&self) -> &PortraitConfig {
        &self.config
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Frames ticked so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn water_level(&self) -> f32 {
        self.water.level()
    }

    pub fn phase(&self) -> Phase {
        self.water.phase()
    }

    pub fn wave_amplitude(&self) -> f32 {
        self.wave.amplitude()
    }

    /// Last known pointer position, if the pointer is over the surface.
    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn particles(&self) -> &[Particle] {
        self.field.as_slice()
    }

    pub fn drops(&self) -> &[Drop] {
        &self.drops
    }

    pub fn splashes(&self) -> &[Splash] {
        &self.splashes
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    /// Whether the field came from an image rather than the placeholder.
    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }
}
