//! Frame clock.
//!
//! Hosts drive the scene once per display frame. [`FrameClock`] turns
//! wall-clock instants into a delta clamped to `max_delta`, so a stalled tab
//! or a debugger pause never feeds the integrator a multi-second step.
//!
//! ```ignore
//! let mut clock = FrameClock::new(1.0 / 15.0);
//! loop {
//!     let dt = clock.update();
//!     sim.tick(dt);
//! }
//! ```

use std::time::{Duration, Instant};

/// Monotonic frame timer with delta clamping.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
    /// Simulated seconds: sum of clamped deltas.
    elapsed_secs: f32,
    delta_secs: f32,
    max_delta: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    paused: bool,
    /// Deterministic step instead of measured time.
    fixed_delta: Option<f32>,
}

impl FrameClock {
    /// Start a clock now. Deltas are clamped to `max_delta` seconds.
    pub fn new(max_delta: f32) -> Self {
        Self::starting_at(Instant::now(), max_delta)
    }

    /// Start a clock at a given instant.
    pub fn starting_at(now: Instant, max_delta: f32) -> Self {
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            max_delta: max_delta.max(0.0),
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            paused: false,
            fixed_delta: None,
        }
    }

    /// Advance to `Instant::now()` and return the clamped delta.
    pub fn update(&mut self) -> f32 {
        self.update_at(Instant::now())
    }

    /// Advance to `now` and return the clamped delta.
    ///
    /// An instant earlier than the previous frame yields zero.
    pub fn update_at(&mut self, now: Instant) -> f32 {
        let raw = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        if self.paused {
            self.delta_secs = 0.0;
            return 0.0;
        }

        self.delta_secs = clamp_delta(self.fixed_delta.unwrap_or(raw), self.max_delta);
        self.elapsed_secs += self.delta_secs;
        self.frame_count += 1;

        let window = now.saturating_duration_since(self.fps_update_time);
        if window >= self.fps_update_interval {
            let frames = self.frame_count - self.fps_frame_count;
            self.fps = frames as f32 / window.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.delta_secs
    }

    /// Simulated seconds since start, excluding pauses and clamped time.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Last clamped delta.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    #[inline]
    pub fn max_delta(&self) -> f32 {
        self.max_delta
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Measured frames per second, refreshed twice a second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Wall-clock instant the clock was started.
    #[inline]
    pub fn start_instant(&self) -> Instant {
        self.start
    }

    /// Instant of the last update.
    #[inline]
    pub fn last_instant(&self) -> Instant {
        self.last_frame
    }

    /// While paused, `update` returns 0 and nothing advances.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.last_frame = Instant::now();
            self.paused = false;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Use a fixed step instead of measured time. `None` restores real
    /// timing. The step is still clamped to `max_delta`.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(1.0 / 15.0)
    }
}

/// Clamp a host delta to `[0, max_delta]`. NaN and infinities map to 0.
#[inline]
pub fn clamp_delta(dt: f32, max_delta: f32) -> f32 {
    if dt.is_finite() {
        dt.clamp(0.0, max_delta)
    } else {
        0.0
    }
}
