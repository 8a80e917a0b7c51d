//! Frame clock for driving the simulation.
//!
//! The simulation advances in whole ticks, each one a fixed slice of time.
//! [`FrameClock`] turns measured wall-clock deltas into a count of ticks to
//! run before the next render, so motion speed does not depend on the
//! display refresh rate.
//!
//! # Example
//!
//! ```ignore
//! let mut clock = FrameClock::new(60.0);
//!
//! // In your redraw handler:
//! for _ in 0..clock.update() {
//!     sim.tick();
//! }
//! sim.render(&mut frame);
//! ```

use std::time::{Duration, Instant};

/// Fixed-step scheduler with FPS tracking.
#[derive(Debug)]
pub struct FrameClock {
    /// When the last frame occurred.
    last_frame: Instant,
    /// Length of one simulation tick.
    step: Duration,
    /// Unconsumed time carried to the next frame.
    accumulator: Duration,
    /// Cap on ticks per frame after a stall.
    max_steps: u32,
    /// Total ticks handed out.
    tick_count: u64,
    /// Total frames since start.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Time of last FPS calculation.
    fps_update_time: Instant,
    /// How often to update FPS calculation.
    fps_update_interval: Duration,
}

impl FrameClock {
    /// Clock producing `rate` ticks per second.
    pub fn new(rate: f32) -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            step: Duration::from_secs_f32(1.0 / rate.max(1.0)),
            accumulator: Duration::ZERO,
            max_steps: 5,
            tick_count: 0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Set the cap on ticks per frame.
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Measure time since the last call and return the ticks to run.
    pub fn update(&mut self) -> u32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame);
        self.last_frame = now;

        self.frame_count += 1;
        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.advance(delta)
    }

    /// Add `delta` and return the whole ticks it completes.
    ///
    /// Time beyond `max_steps` ticks is dropped rather than replayed.
    pub fn advance(&mut self, delta: Duration) -> u32 {
        self.accumulator += delta;
        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps {
            self.accumulator -= self.step;
            steps += 1;
        }
        if steps == self.max_steps && self.accumulator >= self.step {
            log::debug!("Frame clock fell behind, dropping {:?}", self.accumulator);
            self.accumulator = Duration::ZERO;
        }
        self.tick_count += u64::from(steps);
        steps
    }

    /// Length of one tick.
    #[inline]
    pub fn step(&self) -> Duration {
        self.step
    }

    /// Total ticks handed out.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.tick_count
    }

    /// Total frames measured by [`update`](Self::update).
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Calculated frames per second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Forget accumulated time, e.g. after the window was hidden.
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.last_frame = now;
        self.accumulator = Duration::ZERO;
        self.fps_update_time = now;
        self.fps_frame_count = self.frame_count;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(60.0)
    }
}
