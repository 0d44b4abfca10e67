//! Frame clocks
//!
//! The simulation takes whatever delta the frontend measured. The motion
//! step is clamped so a stalled tab or a debugger pause does not teleport
//! entities; the real elapsed time is passed along for the score clock.

use crate::sim::FrameTime;

/// Measures deltas from monotonically increasing timestamps in milliseconds
/// (`requestAnimationFrame` time on web, `Instant` offsets on native)
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_dt: f32,
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            last_ms: None,
            max_dt,
        }
    }

    /// Time since the previous call; zero on the first frame
    pub fn tick(&mut self, now_ms: f64) -> FrameTime {
        let wall = match self.last_ms {
            Some(last) => (((now_ms - last) / 1000.0) as f32).max(0.0),
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        FrameTime {
            dt: wall.min(self.max_dt),
            wall,
        }
    }

    /// Forget the previous timestamp (after the page was hidden)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// Constant delta, for headless runs and tests
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    dt: f32,
}

impl FixedClock {
    pub fn from_fps(fps: u32) -> Self {
        Self {
            dt: 1.0 / fps.max(1) as f32,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        FrameTime::fixed(self.dt)
    }
}

/// Sleeps out the rest of each frame to hold a target rate
#[cfg(not(target_arch = "wasm32"))]
pub struct FramePacer {
    frame: std::time::Duration,
    last: std::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl FramePacer {
    pub fn from_fps(fps: u32) -> Self {
        Self {
            frame: std::time::Duration::from_secs_f64(1.0 / fps.max(1) as f64),
            last: std::time::Instant::now(),
        }
    }

    /// Block until the current frame's time slice is used up
    pub fn wait(&mut self) {
        let spent = self.last.elapsed();
        if let Some(rest) = self.frame.checked_sub(spent) {
            std::thread::sleep(rest);
        }
        self.last = std::time::Instant::now();
    }
}
