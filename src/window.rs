use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tidepool::error::ViewerError;
use tidepool::present::Presenter;
use tidepool::time::FrameClock;
use tidepool::{PixelCanvas, Portrait, PortraitConfig, SurfaceSize};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

const TITLE: &str = "tidepool";

/// Everything the viewer needs before the window exists.
pub struct ViewerOptions {
    pub image: Option<PathBuf>,
    pub config: PortraitConfig,
    pub width: u32,
    pub height: u32,
    pub fps: f32,
}

pub struct App {
    options: ViewerOptions,
    window: Option<Arc<Window>>,
    presenter: Option<Presenter>,
    portrait: Option<Portrait>,
    canvas: Option<PixelCanvas>,
    clock: FrameClock,
    last_title: Instant,
    error: Option<ViewerError>,
}

impl App {
    pub fn new(options: ViewerOptions) -> Self {
        Self {
            clock: FrameClock::new(options.fps),
            options,
            window: None,
            presenter: None,
            portrait: None,
            canvas: None,
            last_title: Instant::now(),
            error: None,
        }
    }

    /// The error that stopped the event loop, if any.
    pub fn take_error(&mut self) -> Option<ViewerError> {
        self.error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: ViewerError) {
        log::error!("{}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn logical_size(window: &Window, physical: PhysicalSize<u32>) -> SurfaceSize {
        let scale = window.scale_factor();
        let logical = physical.to_logical::<f32>(scale);
        SurfaceSize::new(logical.width, logical.height).with_scale_factor(scale as f32)
    }

    /// Build the portrait the first time the window has a drawable size.
    fn start_portrait(&mut self, size: SurfaceSize) {
        if self.portrait.is_some() {
            return;
        }
        let config = self.options.config.clone();
        self.portrait = match &self.options.image {
            Some(path) => Portrait::from_path(size, config, path),
            None => Portrait::placeholder(size, config),
        };
        if self.portrait.is_some() {
            self.canvas = Some(PixelCanvas::new(size));
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) -> bool {
        if event.state != ElementState::Pressed || event.repeat {
            return false;
        }
        match event.physical_key {
            PhysicalKey::Code(KeyCode::Space) => {
                self.clock.toggle_pause();
                log::info!("{}", if self.clock.is_paused() { "paused" } else { "resumed" });
                true
            }
            PhysicalKey::Code(KeyCode::Escape) => {
                event_loop.exit();
                true
            }
            _ => false,
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let due = self.clock.advance(Instant::now());
        if let (Some(portrait), Some(canvas)) = (&mut self.portrait, &mut self.canvas) {
            for _ in 0..due {
                let stats = portrait.tick(&mut *canvas);
                log::trace!("frame {}: {:?}", portrait.frame(), stats);
            }
        }

        if let (Some(presenter), Some(canvas)) = (&mut self.presenter, &self.canvas) {
            match presenter.present(canvas) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => presenter.reconfigure(),
                Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                Err(e) => log::warn!("render error: {:?}", e),
            }
        }

        if let Some(window) = &self.window {
            if self.last_title.elapsed().as_millis() >= 500 {
                let phase = self.portrait.as_ref().map(|p| p.phase().to_string()).unwrap_or_default();
                window.set_title(&format!("{} - {} - {:.0} fps", TITLE, phase, self.clock.fps()));
                self.last_title = Instant::now();
            }
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window_attrs = Window::default_attributes()
            .with_title(TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(self.options.width, self.options.height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };
        match pollster::block_on(Presenter::new(window.clone())) {
            Ok(presenter) => self.presenter = Some(presenter),
            Err(e) => return self.fail(event_loop, e.into()),
        }

        let size = Self::logical_size(&window, window.inner_size());
        self.start_portrait(size);
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match &event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                return;
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(portrait) = &mut self.portrait {
                    portrait.inbox().set_scale_factor(*scale_factor);
                }
            }
            WindowEvent::Resized(physical) => {
                if let Some(presenter) = &mut self.presenter {
                    presenter.resize(*physical);
                }
                let size = self.window.as_ref().map(|w| Self::logical_size(w, *physical));
                if let Some(size) = size.filter(SurfaceSize::is_drawable) {
                    // The portrait re-samples on its next tick; the canvas
                    // must already match by then.
                    if let Some(canvas) = &mut self.canvas {
                        canvas.resize(size);
                    }
                    self.start_portrait(size);
                }
            }
            WindowEvent::KeyboardInput { event: key, .. } => {
                if self.handle_key(event_loop, key) {
                    return;
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                return;
            }
            _ => {}
        }

        if let Some(portrait) = &mut self.portrait {
            portrait.inbox().handle_event(&event);
        }
    }
}
