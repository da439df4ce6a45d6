mod window;

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use tidepool::PortraitConfig;
use winit::event_loop::{ControlFlow, EventLoop};

/// Particle portrait that fills with water.
#[derive(Parser, Debug)]
#[command(name = "tidepool", version, about)]
struct Args {
    /// Portrait image (PNG or JPEG). Without one a placeholder field is shown.
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// JSON file with portrait settings.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Window width in logical pixels.
    #[arg(long, default_value_t = 480)]
    width: u32,

    /// Window height in logical pixels.
    #[arg(long, default_value_t = 640)]
    height: u32,

    /// Sampling stride in pixels, overrides the config file.
    #[arg(short, long)]
    gap: Option<u32>,

    /// Random seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,

    /// Simulation frames per second.
    #[arg(long, default_value_t = 60.0)]
    fps: f32,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PortraitConfig::load(path)?,
        None => PortraitConfig::default(),
    };
    if let Some(gap) = args.gap {
        config = config.with_gap(gap);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    config.validate()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = window::App::new(window::ViewerOptions {
        image: args.image,
        config,
        width: args.width,
        height: args.height,
        fps: args.fps,
    });
    event_loop.run_app(&mut app)?;

    if let Some(e) = app.take_error() {
        return Err(e.into());
    }
    Ok(())
}
