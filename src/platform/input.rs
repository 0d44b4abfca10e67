//! Keyboard state tracking
//!
//! Frontends feed raw key events in as they arrive; once per frame the
//! tracker hands the simulation a [`TickInput`] snapshot and clears the
//! "just pressed" set.

use crate::sim::{Key, KeySet, TickInput};

/// Map a DOM `KeyboardEvent.code` to a logical key
pub fn key_from_code(code: &str) -> Option<Key> {
    match code {
        "KeyW" | "ArrowUp" => Some(Key::Up),
        "KeyS" | "ArrowDown" => Some(Key::Down),
        "KeyA" | "ArrowLeft" => Some(Key::Left),
        "KeyD" | "ArrowRight" => Some(Key::Right),
        "Space" => Some(Key::Fire),
        "KeyQ" => Some(Key::Quit),
        _ => None,
    }
}

/// Accumulates key events between frames
#[derive(Debug, Default)]
pub struct KeyTracker {
    held: KeySet,
    pressed: KeySet,
    close_requested: bool,
}

impl KeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key went down; auto-repeat while held does not count as a new press
    pub fn key_down(&mut self, key: Key) {
        if !self.held.contains(key) {
            self.pressed.insert(key);
        }
        self.held.insert(key);
    }

    pub fn key_up(&mut self, key: Key) {
        self.held.remove(key);
    }

    /// Forget held keys (focus lost; key-up events will not arrive)
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    /// Window/page is closing
    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    /// Input for the coming frame; presses are consumed
    pub fn snapshot(&mut self) -> TickInput {
        let input = TickInput {
            held: self.held,
            pressed: self.pressed,
            close_requested: self.close_requested,
        };
        self.pressed.clear();
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_codes() {
        assert_eq!(key_from_code("KeyW"), Some(Key::Up));
        assert_eq!(key_from_code("ArrowLeft"), Some(Key::Left));
        assert_eq!(key_from_code("Space"), Some(Key::Fire));
        assert_eq!(key_from_code("KeyQ"), Some(Key::Quit));
        assert_eq!(key_from_code("KeyZ"), None);
    }

    #[test]
    fn test_press_reported_once() {
        let mut keys = KeyTracker::new();
        keys.key_down(Key::Fire);
        let first = keys.snapshot();
        assert!(first.just_pressed(Key::Fire));
        assert!(first.is_held(Key::Fire));

        // Auto-repeat
        keys.key_down(Key::Fire);
        let second = keys.snapshot();
        assert!(!second.just_pressed(Key::Fire));
        assert!(second.is_held(Key::Fire));
    }

    #[test]
    fn test_tap_within_one_frame_still_counts() {
        let mut keys = KeyTracker::new();
        keys.key_down(Key::Fire);
        keys.key_up(Key::Fire);
        let input = keys.snapshot();
        assert!(input.just_pressed(Key::Fire));
        assert!(!input.is_held(Key::Fire));
    }

    #[test]
    fn test_release_all_and_close() {
        let mut keys = KeyTracker::new();
        keys.key_down(Key::Left);
        keys.release_all();
        keys.request_close();
        let input = keys.snapshot();
        assert!(input.held.is_empty());
        assert!(input.quit_requested());
    }
}
