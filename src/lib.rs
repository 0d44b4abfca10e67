//! Space Shooter - a top-down arcade shooter
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (entities, registry, spawning, collisions)
//! - `assets`: Image/font/sound resource set, loaded once and validated
//! - `renderer`: Render boundary (draw lists) and the WebGPU presenter
//! - `audio`: Fire-and-forget sound cues
//! - `platform`: Input snapshots and frame clocks
//! - `settings`: Persisted player preferences
//! - `game`: One loop iteration wired across all of the above

pub mod assets;
pub mod audio;
pub mod game;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use assets::{AssetError, Assets};
pub use game::Game;
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Visible area (reference resolution)
    pub const WINDOW_WIDTH: f32 = 1280.0;
    pub const WINDOW_HEIGHT: f32 = 720.0;

    /// Background clear color (#3a2e3f)
    pub const BACKGROUND_RGB: [u8; 3] = [0x3a, 0x2e, 0x3f];

    /// Player ship
    pub const PLAYER_SPEED: f32 = 1000.0;
    /// Seconds between shots
    pub const PLAYER_COOLDOWN: f32 = 0.4;

    /// Laser speed (pixels/second, upward)
    pub const LASER_SPEED: f32 = 1000.0;

    /// Meteor speed along its (unnormalized) drift direction
    pub const METEOR_SPEED: f32 = 700.0;
    /// Horizontal drift range; vertical component is always 1
    pub const METEOR_DRIFT: f32 = 0.3;
    /// Rotation rate range in degrees/second (inclusive)
    pub const METEOR_SPIN_MIN: u32 = 40;
    pub const METEOR_SPIN_MAX: u32 = 80;
    /// Spawn mid-bottom y coordinate
    pub const METEOR_SPAWN_Y: f32 = 10.0;

    /// Explosion playback rate (frames/second)
    pub const EXPLOSION_FPS: f32 = 50.0;
    /// Number of frames in the explosion sequence
    pub const EXPLOSION_FRAMES: usize = 21;

    /// Meteor spawn interval (seconds)
    pub const SPAWN_INTERVAL: f32 = 0.5;

    /// Score units per second (deciseconds)
    pub const SCORE_PER_SECOND: f64 = 10.0;
    /// Score text baseline offset from the bottom edge
    pub const SCORE_BOTTOM_MARGIN: f32 = 50.0;
    /// Score font size in pixels
    pub const SCORE_FONT_SIZE: f32 = 50.0;
    pub const SCORE_RGB: [u8; 3] = [240, 240, 240];

    /// Alpha above which a pixel counts for mask collisions
    pub const MASK_THRESHOLD: u8 = 127;

    /// Base volume applied to every cue before the settings mix
    pub const BASE_VOLUME: f32 = 0.1;
}

/// Visible area as a vector
#[inline]
pub fn screen_size() -> Vec2 {
    Vec2::new(consts::WINDOW_WIDTH, consts::WINDOW_HEIGHT)
}

/// Rotate a y-down screen offset counter-clockwise (as seen on screen) by `degrees`
#[inline]
pub fn rotate_ccw(offset: Vec2, degrees: f32) -> Vec2 {
    let (s, c) = degrees.to_radians().sin_cos();
    Vec2::new(offset.x * c + offset.y * s, -offset.x * s + offset.y * c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_ccw_quarter_turn() {
        // Pointing right, a quarter turn CCW on screen points up (negative y)
        let v = rotate_ccw(Vec2::new(10.0, 0.0), 90.0);
        assert!(v.x.abs() < 1e-4);
        assert!((v.y + 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_rotate_ccw_zero_is_identity() {
        let v = Vec2::new(3.0, -7.0);
        assert_eq!(rotate_ccw(v, 0.0), v);
    }
}
