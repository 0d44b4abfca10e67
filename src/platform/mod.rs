//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (key codes to logical keys, per-frame snapshots)
//! - Frame timing (measured deltas, fixed deltas, native pacing)

pub mod clock;
pub mod input;

pub use clock::{FixedClock, FrameClock};
#[cfg(not(target_arch = "wasm32"))]
pub use clock::FramePacer;
pub use input::{KeyTracker, key_from_code};
