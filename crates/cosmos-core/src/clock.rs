use crate::constants::{MAX_FRAME_DELTA_SEC, REFERENCE_FPS};
use std::time::Duration;

/// Time values handed to every simulation step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since the session started. Monotonic.
    pub elapsed: f32,
    /// Seconds since the previous tick.
    pub delta: f32,
}

impl FrameTime {
    pub fn new(elapsed: f32, delta: f32) -> Self {
        Self { elapsed, delta }
    }

    /// Delta expressed in reference frames (1.0 at 60 fps), clamped so a
    /// stalled host cannot launch entities across the domain in one tick.
    #[inline]
    pub fn frame_scale(&self) -> f32 {
        if !self.delta.is_finite() {
            return 0.0;
        }
        self.delta.clamp(0.0, MAX_FRAME_DELTA_SEC) * REFERENCE_FPS
    }
}

/// Accumulates host deltas into [`FrameTime`]s.
#[derive(Clone, Debug, Default)]
pub struct Clock {
    elapsed: f64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self, dt: Duration) -> FrameTime {
        self.elapsed += dt.as_secs_f64();
        FrameTime {
            elapsed: self.elapsed as f32,
            delta: dt.as_secs_f32(),
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed as f32
    }
}
