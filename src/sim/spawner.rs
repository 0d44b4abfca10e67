//! Periodic meteor spawning
//!
//! Elapsed frame time is accumulated; every full interval yields one spawn.
//! Spawn counts therefore track wall time rather than frame count.

/// Fixed-interval event source driven by variable frame deltas
#[derive(Debug, Clone)]
pub struct Spawner {
    interval: f32,
    accumulator: f32,
}

impl Spawner {
    /// Spawner firing every `interval` seconds (non-positive never fires)
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            accumulator: 0.0,
        }
    }

    pub fn accumulate(&mut self, dt: f32) {
        self.accumulator += dt.max(0.0);
    }

    /// Consume one interval if available
    pub fn should_spawn(&mut self) -> bool {
        if self.interval > 0.0 && self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            true
        } else {
            false
        }
    }

    /// Accumulate `dt` and return how many spawns are due
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.accumulate(dt);
        let mut due = 0;
        while self.should_spawn() {
            due += 1;
        }
        due
    }
}
