//! Frame pacing for the viewer.
//!
//! The portrait advances in whole frames, so the viewer needs to know how many
//! ticks are due each time the window redraws. [`FrameClock`] runs a fixed-step
//! accumulator: wall time is added up and spent in `step`-sized slices, with a
//! cap so a long stall does not trigger a burst of catch-up ticks.
//!
//! # Example
//!
//! ```ignore
//! use tidepool::time::FrameClock;
//!
//! let mut clock = FrameClock::new(60.0);
//!
//! // On every redraw:
//! for _ in 0..clock.advance(std::time::Instant::now()) {
//!     portrait.tick(&mut canvas);
//! }
//! println!("FPS: {:.1}", clock.fps());
//! ```

use std::time::{Duration, Instant};

/// Most ticks a single [`FrameClock::advance`] may return.
pub const MAX_CATCH_UP: u32 = 4;

/// Accepted tick rates, in ticks per second.
pub const RATE_RANGE: (f32, f32) = (1.0, 1000.0);

/// Fixed-step frame scheduler.
#[derive(Debug)]
pub struct FrameClock {
    /// Duration of one simulation frame.
    step: Duration,
    last: Instant,
    /// Wall time not yet spent on ticks.
    accumulator: Duration,
    /// Ticks handed out since start.
    ticks: u64,
    fps: f32,
    fps_ticks: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    paused: bool,
}

impl FrameClock {
    /// Clock ticking `rate` times per second, starting now.
    ///
    /// Non-positive or non-finite rates fall back to 60; others are clamped
    /// to [`RATE_RANGE`].
    pub fn new(rate: f32) -> Self {
        Self::starting_at(rate, Instant::now())
    }

    pub fn starting_at(rate: f32, now: Instant) -> Self {
        let rate = if rate.is_finite() && rate > 0.0 {
            rate.clamp(RATE_RANGE.0, RATE_RANGE.1)
        } else {
            60.0
        };
        Self {
            step: Duration::from_secs_f32(1.0 / rate),
            last: now,
            accumulator: Duration::ZERO,
            ticks: 0,
            fps: 0.0,
            fps_ticks: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            paused: false,
        }
    }

    /// Account for wall time up to `now` and return the number of ticks due.
    pub fn advance(&mut self, now: Instant) -> u32 {
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;

        let due = if self.paused {
            0
        } else {
            self.accumulator += elapsed;
            let mut due = 0;
            while self.accumulator >= self.step && due < MAX_CATCH_UP {
                self.accumulator -= self.step;
                due += 1;
            }
            // Drop the backlog instead of replaying it later.
            if due == MAX_CATCH_UP {
                self.accumulator = self.accumulator.min(self.step);
            }
            due
        };
        self.ticks += due as u64;

        let fps_elapsed = now.saturating_duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            self.fps = (self.ticks - self.fps_ticks) as f32 / fps_elapsed.as_secs_f32();
            self.fps_ticks = self.ticks;
            self.fps_update_time = now;
        }
        due
    }

    #[inline]
    pub fn step(&self) -> Duration {
        self.step
    }

    /// Total ticks handed out.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Simulation ticks per second, refreshed twice a second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// While paused, [`advance`](Self::advance) returns 0 and wall time is
    /// discarded rather than accumulated.
    pub fn pause(&mut self) {
        self.paused = true;
        self.accumulator = Duration::ZERO;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(60.0)
    }
}
