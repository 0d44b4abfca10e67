//! Native playback of the loaded sound bank through rodio

use std::io::Cursor;
use std::sync::Arc;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use super::{AudioOut, SoundCue, cue_volume, music_volume};
use crate::assets::{Sound, SoundBank};
use crate::settings::Settings;

/// Plays cues from the asset files on the default output device
pub struct RodioAudio {
    stream: OutputStream,
    sounds: SoundBank,
    sfx_volume: f32,
    music_volume: f32,
    music: Option<Sink>,
}

impl RodioAudio {
    /// Open the default device; `None` when no output is available
    pub fn new(sounds: &SoundBank, settings: &Settings) -> Option<Self> {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(e) => {
                log::warn!("Failed to open audio stream: {e}");
                return None;
            }
        };
        log::info!("Audio output opened");
        Some(Self {
            stream,
            sounds: sounds.clone(),
            sfx_volume: cue_volume(settings),
            music_volume: music_volume(settings),
            music: None,
        })
    }

    fn sound(&self, cue: SoundCue) -> &Sound {
        match cue {
            SoundCue::Laser => &self.sounds.laser,
            SoundCue::Explosion => &self.sounds.explosion,
            SoundCue::Damage => &self.sounds.damage,
        }
    }

    /// Fresh decoder over the sound's bytes (procedural sounds have none)
    fn decode(sound: &Sound) -> Option<Decoder<Cursor<Arc<[u8]>>>> {
        let data = sound.data.clone()?;
        match Decoder::new(Cursor::new(data)) {
            Ok(decoder) => Some(decoder),
            Err(e) => {
                log::warn!("Cannot play {}: {e}", sound.name);
                None
            }
        }
    }
}

impl AudioOut for RodioAudio {
    fn play(&mut self, cue: SoundCue) {
        if self.sfx_volume <= 0.0 {
            return;
        }
        let sound = self.sound(cue);
        let Some(source) = Self::decode(sound) else {
            return;
        };
        log::trace!("Playing {}", sound.name);
        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.sfx_volume);
        sink.append(source);
        sink.detach();
    }

    fn start_music(&mut self) {
        if self.music.is_some() {
            return;
        }
        let Some(source) = Self::decode(&self.sounds.music) else {
            return;
        };
        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.music_volume);
        sink.append(source.repeat_infinite());
        self.music = Some(sink);
        log::debug!("Music started");
    }

    fn stop_music(&mut self) {
        if let Some(sink) = self.music.take() {
            sink.stop();
        }
    }
}
