//! End-to-end tests of the portrait through a recording surface.

use image::{Rgba as Pixel, RgbaImage};
use tidepool::prelude::*;

/// Surface that only counts what it is asked to draw.
#[derive(Default)]
struct RecordingSurface {
    size: Option<SurfaceSize>,
    clears: usize,
    circles: usize,
    lines: usize,
}

impl RecordingSurface {
    fn new(size: SurfaceSize) -> Self {
        Self {
            size: Some(size),
            ..Default::default()
        }
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> SurfaceSize {
        self.size.unwrap_or(SurfaceSize::new(0.0, 0.0))
    }

    fn clear(&mut self) {
        self.clears += 1;
    }

    fn fill_circle(&mut self, _center: Vec2, _radius: f32, _color: Rgba) {
        self.circles += 1;
    }

    fn stroke_line(&mut self, _from: Vec2, _to: Vec2, _width: f32, _start: Rgba, _end: Rgba) {
        self.lines += 1;
    }
}

fn gray_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Pixel([128, 128, 128, 255]))
}

fn quick_fill() -> PortraitConfig {
    PortraitConfig::default()
        .with_seed(7)
        .with_fill_increment(0.05)
        .with_complete_delay(10)
}

#[test]
fn test_fills_then_completes_then_idles() {
    let size = SurfaceSize::new(60.0, 60.0);
    let mut surface = RecordingSurface::new(size);
    let mut portrait = Portrait::placeholder(size, quick_fill()).unwrap();

    let mut phases = vec![portrait.phase()];
    let mut last_level = portrait.water_level();
    for _ in 0..2000 {
        portrait.tick(&mut surface);

        let level = portrait.water_level();
        assert!((0.0..=1.0).contains(&level), "level out of range: {level}");
        assert!(level >= last_level, "level went down: {last_level} -> {level}");
        last_level = level;

        if phases.last() != Some(&portrait.phase()) {
            phases.push(portrait.phase());
        }
        if portrait.phase() == Phase::Idle {
            break;
        }
    }

    assert_eq!(phases, vec![Phase::Filling, Phase::Complete, Phase::Idle]);
    assert_eq!(portrait.water_level(), 1.0);
}

#[test]
fn test_no_drops_after_filling() {
    let size = SurfaceSize::new(60.0, 60.0);
    let mut surface = RecordingSurface::new(size);
    let mut portrait = Portrait::placeholder(size, quick_fill()).unwrap();

    while portrait.phase() == Phase::Filling && portrait.frame() < 2000 {
        portrait.tick(&mut surface);
    }
    assert_ne!(portrait.phase(), Phase::Filling);

    // Drops already in flight finish falling, nothing new is emitted.
    for _ in 0..200 {
        portrait.tick(&mut surface);
    }
    assert!(portrait.drops().is_empty());
    assert_eq!(portrait.water_level(), 1.0);
}

#[test]
fn test_everything_hidden_before_first_drop() {
    let size = SurfaceSize::new(100.0, 100.0);
    let mut surface = RecordingSurface::new(size);
    let mut portrait = Portrait::placeholder(size, PortraitConfig::default().with_seed(1)).unwrap();

    let stats = portrait.tick(&mut surface);
    assert_eq!(stats.drawn, 0);
    assert_eq!(stats.hidden, portrait.particles().len());
    assert_eq!(surface.clears, 1);
}

#[test]
fn test_image_fully_revealed_when_full() {
    let size = SurfaceSize::new(40.0, 40.0);
    let mut surface = RecordingSurface::new(size);
    let config = quick_fill().with_gap(4);
    let mut portrait = Portrait::from_image(size, config, gray_image(40, 40)).unwrap();
    assert!(portrait.has_source());
    assert_eq!(portrait.particles().len(), 100);

    let mut stats = FrameStats::default();
    while portrait.phase() == Phase::Filling && portrait.frame() < 2000 {
        stats = portrait.tick(&mut surface);
    }
    assert_eq!(stats.drawn + stats.skipped, 100);
    assert_eq!(stats.hidden, 0);
}

#[test]
fn test_trigger_without_pointer_uses_bottom_edge() {
    let size = SurfaceSize::new(200.0, 100.0);
    let mut surface = RecordingSurface::new(size);
    let config = PortraitConfig::default().with_seed(3).with_bubble_burst(15);
    let mut portrait = Portrait::placeholder(size, config.clone()).unwrap();

    portrait.send(Command::Trigger);
    portrait.tick(&mut surface);

    let expected = config.wave_amplitude * config.wave_decay;
    assert!((portrait.wave_amplitude() - expected).abs() < 1e-4);
    assert!(portrait.bubbles().len() >= 15);
    assert!(portrait.bubbles().iter().all(|b| b.position.y > size.height - 25.0));
}

#[test]
fn test_wave_decays_below_threshold() {
    let size = SurfaceSize::new(100.0, 100.0);
    let mut surface = RecordingSurface::new(size);
    let config = PortraitConfig::default().with_seed(3);
    let mut portrait = Portrait::placeholder(size, config.clone()).unwrap();

    portrait.send(Command::Trigger);
    for _ in 0..75 {
        portrait.tick(&mut surface);
    }
    assert!(portrait.wave_amplitude() < config.wave_threshold);

    let mut last = portrait.wave_amplitude();
    for _ in 0..20 {
        portrait.tick(&mut surface);
        assert!(portrait.wave_amplitude() <= last);
        last = portrait.wave_amplitude();
    }
}

#[test]
fn test_resizes_coalesce_into_one_resample() {
    let size = SurfaceSize::new(40.0, 40.0);
    let mut surface = RecordingSurface::new(size);
    let config = PortraitConfig::default().with_seed(5).with_gap(4);
    let mut portrait = Portrait::from_image(size, config, gray_image(40, 40)).unwrap();
    let generation = portrait.field().generation();

    portrait.send(Command::Resize(SurfaceSize::new(60.0, 60.0)));
    portrait.send(Command::Resize(SurfaceSize::new(80.0, 80.0)));
    surface.size = Some(SurfaceSize::new(80.0, 80.0));
    portrait.tick(&mut surface);

    assert_eq!(portrait.field().generation(), generation + 1);
    assert_eq!(portrait.size(), SurfaceSize::new(80.0, 80.0));
    assert_eq!(portrait.particles().len(), 400);
}

#[test]
fn test_degenerate_resize_is_ignored() {
    let size = SurfaceSize::new(50.0, 50.0);
    let mut surface = RecordingSurface::new(size);
    let mut portrait = Portrait::placeholder(size, PortraitConfig::default().with_seed(2)).unwrap();
    let generation = portrait.field().generation();

    portrait.send(Command::Resize(SurfaceSize::new(0.0, 50.0)));
    portrait.tick(&mut surface);

    assert_eq!(portrait.field().generation(), generation);
    assert_eq!(portrait.size(), size);
}

#[test]
fn test_undrawable_surface_never_starts() {
    let config = PortraitConfig::default();
    for size in [
        SurfaceSize::new(0.0, 0.0),
        SurfaceSize::new(100.0, 0.0),
        SurfaceSize::new(f32::NAN, 100.0),
    ] {
        assert!(Portrait::placeholder(size, config.clone()).is_none());
        assert!(Portrait::from_image(size, config.clone(), gray_image(10, 10)).is_none());
    }
}

#[test]
fn test_reset_empties_the_tank() {
    let size = SurfaceSize::new(60.0, 60.0);
    let mut surface = RecordingSurface::new(size);
    let mut portrait = Portrait::placeholder(size, quick_fill()).unwrap();

    while portrait.water_level() < 0.3 && portrait.frame() < 2000 {
        portrait.tick(&mut surface);
    }
    assert!(portrait.water_level() >= 0.3);

    portrait.send(Command::Reset);
    portrait.tick(&mut surface);

    assert_eq!(portrait.water_level(), 0.0);
    assert_eq!(portrait.phase(), Phase::Filling);
    assert!(portrait.splashes().is_empty());
    assert!(portrait.bubbles().is_empty());
}

#[test]
fn test_drop_population_stays_bounded() {
    let size = SurfaceSize::new(80.0, 300.0);
    let mut surface = RecordingSurface::new(size);
    let config = PortraitConfig::default().with_seed(11);
    let per_frame = config.drops_per_frame as usize;
    let mut portrait = Portrait::placeholder(size, config).unwrap();

    // Falling from rest under gravity 0.25 covers 300px in under 50 frames.
    for _ in 0..500 {
        let stats = portrait.tick(&mut surface);
        assert!(stats.drops <= per_frame * 50, "{} drops alive", stats.drops);
    }
}

#[test]
fn test_same_seed_same_frames() {
    let size = SurfaceSize::new(64.0, 64.0);
    let config = quick_fill();
    let mut a = Portrait::placeholder(size, config.clone()).unwrap();
    let mut b = Portrait::placeholder(size, config).unwrap();
    let mut sa = RecordingSurface::new(size);
    let mut sb = RecordingSurface::new(size);

    for i in 0..120 {
        if i == 30 {
            a.send(Command::Trigger);
            b.send(Command::Trigger);
        }
        assert_eq!(a.tick(&mut sa), b.tick(&mut sb));
    }
    assert_eq!(a.particles(), b.particles());
    assert_eq!(sa.circles, sb.circles);
}

#[test]
fn test_missing_image_uses_placeholder() {
    let size = SurfaceSize::new(100.0, 100.0);
    let config = PortraitConfig::default().with_seed(4);
    let portrait = Portrait::from_path(size, config.clone(), "does/not/exist.png").unwrap();
    assert!(!portrait.has_source());
    assert_eq!(portrait.particles().len(), config.placeholder_count);
}

#[test]
fn test_draws_through_surface() {
    let size = SurfaceSize::new(60.0, 60.0);
    let mut surface = RecordingSurface::new(size);
    let mut portrait = Portrait::placeholder(size, quick_fill()).unwrap();
    for _ in 0..30 {
        portrait.tick(&mut surface);
    }
    assert_eq!(surface.clears, 30);
    // Falling drops draw a trail each.
    assert!(surface.lines > 0);
    assert!(surface.circles > 0);
}

#[test]
fn test_empty_placeholder_config_never_starts() {
    let size = SurfaceSize::new(100.0, 100.0);
    let config = PortraitConfig {
        placeholder_count: 0,
        ..PortraitConfig::default()
    };
    assert!(Portrait::placeholder(size, config.clone()).is_none());
    assert!(Portrait::from_path(size, config, "does/not/exist.png").is_none());
}

#[test]
fn test_sliver_source_fills_the_surface() {
    let size = SurfaceSize::new(200.0, 200.0);
    let config = PortraitConfig::default().with_seed(8).with_gap(4);
    let portrait = Portrait::from_image(size, config, gray_image(1, 2000)).unwrap();
    assert!(portrait.has_source());
    assert_eq!(portrait.particles().len(), 50 * 50);
}

#[test]
fn test_landings_are_counted() {
    let size = SurfaceSize::new(60.0, 60.0);
    let mut surface = RecordingSurface::new(size);
    let mut portrait = Portrait::placeholder(size, quick_fill()).unwrap();

    let mut landed = 0;
    while portrait.phase() == Phase::Filling && portrait.frame() < 2000 {
        landed += portrait.tick(&mut surface).landed;
    }
    // 0.05 per landing fills the tank in 20.
    assert!(landed >= 20, "only {landed} landings");
}
