//! # Frame Pacing
//!
//! Holds a loop near a target frame rate by sleeping away the rest of each
//! frame's budget.
//!
//! Sleep granularity is coarse, so each frame's overshoot or undershoot is
//! fed back: half of the error is added to the next sleep.

use std::thread;
use std::time::{Duration, Instant};

/// Target-FPS limiter with a rolling frame-time window.
#[derive(Clone, Debug)]
pub struct FrameLimiter {
    /// Target frame duration in seconds.
    target_secs: f64,
    /// Correction added to the next sleep, in seconds.
    adjustment: f64,
    /// End of the previous frame.
    last: Instant,
    /// Ring of recent work durations in seconds.
    frame_times: Vec<f32>,
    /// Sum of `frame_times`.
    accumulated: f32,
    /// Next slot of `frame_times` to overwrite.
    cursor: usize,
}

impl FrameLimiter {
    /// Creates a limiter aiming for `target_fps`, averaging over `window`
    /// frames.
    ///
    /// # Panics
    ///
    /// Panics if `window` is zero.
    #[must_use]
    pub fn new(target_fps: f64, window: usize) -> Self {
        assert!(window > 0, "frame window must hold at least one frame");
        Self {
            target_secs: 1.0 / target_fps,
            adjustment: 0.0,
            last: Instant::now(),
            frame_times: vec![0.0; window],
            accumulated: 0.0,
            cursor: 0,
        }
    }

    /// Resets the clock. Call once before the first frame.
    pub fn start(&mut self) {
        self.last = Instant::now();
        self.adjustment = 0.0;
        self.accumulated = 0.0;
        self.cursor = 0;
        self.frame_times.fill(0.0);
    }

    /// Ends the current frame.
    ///
    /// Records the time spent since the previous frame ended, sleeps for the
    /// remainder of the budget and returns the full frame duration, which is
    /// the time step the simulation should advance by.
    pub fn frame(&mut self) -> f32 {
        let worked = self.last.elapsed().as_secs_f64();
        #[allow(clippy::cast_possible_truncation)]
        let worked_f32 = worked as f32;
        self.record(worked_f32);

        let sleep = self.target_secs - worked + self.adjustment;
        if sleep.is_finite() && sleep > 0.0 {
            thread::sleep(Duration::from_secs_f64(sleep));
        }
        thread::yield_now();

        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f64();
        self.last = now;
        self.adjustment += (self.target_secs - dt) * 0.5;

        #[allow(clippy::cast_possible_truncation)]
        let dt = dt as f32;
        dt
    }

    /// Average work time per frame over the window, in seconds.
    #[must_use]
    pub fn frame_time(&self) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let len = self.frame_times.len() as f32;
        self.accumulated / len
    }

    /// Target frame duration in seconds.
    #[must_use]
    pub fn target(&self) -> Duration {
        Duration::from_secs_f64(self.target_secs)
    }

    fn record(&mut self, secs: f32) {
        self.accumulated += secs - self.frame_times[self.cursor];
        self.frame_times[self.cursor] = secs;
        self.cursor = (self.cursor + 1) % self.frame_times.len();
    }
}
