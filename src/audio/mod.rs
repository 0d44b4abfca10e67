//! Audio output
//!
//! The game emits fire-and-forget [`SoundCue`]s; a backend decides how to
//! make noise. Cues never block and never fail: a backend that cannot play
//! simply drops them.

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(all(feature = "playback", not(target_arch = "wasm32")))]
pub mod native;

#[cfg(all(feature = "playback", not(target_arch = "wasm32")))]
pub use native::RodioAudio;

use crate::consts::BASE_VOLUME;
use crate::settings::Settings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Laser fired
    Laser,
    /// Meteor destroyed by a laser
    Explosion,
    /// Meteor hit the player
    Damage,
}

/// Sound backend
pub trait AudioOut {
    /// Play a one-shot cue
    fn play(&mut self, cue: SoundCue);

    /// Start the looping background music (idempotent)
    fn start_music(&mut self) {}

    fn stop_music(&mut self) {}
}

/// Volume actually applied to a cue
pub fn cue_volume(settings: &Settings) -> f32 {
    BASE_VOLUME * settings.sfx_gain()
}

/// Volume actually applied to the music loop
pub fn music_volume(settings: &Settings) -> f32 {
    BASE_VOLUME * settings.music_gain()
}

/// Backend that logs cues instead of playing them (headless runs, tests)
#[derive(Debug, Default)]
pub struct LogAudio {
    volume: f32,
    pub played: Vec<SoundCue>,
    pub music_playing: bool,
}

impl LogAudio {
    pub fn new(settings: &Settings) -> Self {
        Self {
            volume: cue_volume(settings),
            played: Vec::new(),
            music_playing: false,
        }
    }

    pub fn count(&self, cue: SoundCue) -> usize {
        self.played.iter().filter(|c| **c == cue).count()
    }
}

impl AudioOut for LogAudio {
    fn play(&mut self, cue: SoundCue) {
        log::trace!("Sound {cue:?} at volume {:.3}", self.volume);
        self.played.push(cue);
    }

    fn start_music(&mut self) {
        if !self.music_playing {
            log::debug!("Music started");
            self.music_playing = true;
        }
    }

    fn stop_music(&mut self) {
        self.music_playing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_volume_includes_base() {
        let settings = Settings {
            master_volume: 1.0,
            sfx_volume: 0.5,
            ..Settings::default()
        };
        assert!((cue_volume(&settings) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_log_audio_records_cues() {
        let mut audio = LogAudio::new(&Settings::default());
        audio.play(SoundCue::Laser);
        audio.play(SoundCue::Laser);
        audio.play(SoundCue::Damage);
        audio.start_music();
        audio.start_music();
        assert_eq!(audio.count(SoundCue::Laser), 2);
        assert_eq!(audio.count(SoundCue::Explosion), 0);
        assert!(audio.music_playing);
    }
}
