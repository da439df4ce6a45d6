//! Input commands for the portrait.
//!
//! Host events (pointer movement, clicks, resizes) never touch simulation
//! state directly. They are queued as [`Command`]s in an [`Inbox`] and the
//! portrait drains the whole queue at the start of its next tick, so every
//! frame sees one consistent snapshot of its inputs.
//!
//! # Usage
//!
//! ```ignore
//! // From a winit event handler:
//! portrait.inbox().handle_event(&event);
//!
//! // Or directly:
//! portrait.inbox().push(Command::Trigger);
//! ```

use std::collections::VecDeque;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::surface::SurfaceSize;

/// Something the host wants the portrait to react to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Pointer moved to a surface-local position (logical pixels).
    PointerMoved(Vec2),
    /// Pointer left the surface.
    PointerLeft,
    /// Kick the wave overlay and release a bubble burst.
    Trigger,
    /// The surface changed size; the field is re-sampled.
    Resize(SurfaceSize),
    /// Empty the water and restart filling.
    Reset,
}

/// FIFO of pending commands.
#[derive(Debug)]
pub struct Inbox {
    queue: VecDeque<Command>,
    scale_factor: f64,
}

impl Default for Inbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Inbox {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            scale_factor: 1.0,
        }
    }

    pub fn push(&mut self, command: Command) {
        self.queue.push_back(command);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Take every pending command, oldest first.
    pub fn drain(&mut self) -> std::collections::vec_deque::Drain<'_, Command> {
        self.queue.drain(..)
    }

    /// Device pixel ratio used to convert window events to logical pixels.
    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        if scale_factor.is_finite() && scale_factor > 0.0 {
            self.scale_factor = scale_factor;
        }
    }

    /// Translate a winit window event into commands.
    ///
    /// Returns `true` if the event produced a command.
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        let command = match event {
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f32>(self.scale_factor);
                Command::PointerMoved(Vec2::new(logical.x, logical.y))
            }
            WindowEvent::CursorLeft { .. } => Command::PointerLeft,
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => Command::Trigger,
            WindowEvent::Resized(physical) => {
                let logical = physical.to_logical::<f32>(self.scale_factor);
                Command::Resize(
                    SurfaceSize::new(logical.width, logical.height).with_scale_factor(self.scale_factor as f32),
                )
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && !event.repeat
                    && event.physical_key == PhysicalKey::Code(KeyCode::KeyR) =>
            {
                Command::Reset
            }
            _ => return false,
        };
        self.push(command);
        true
    }
}
