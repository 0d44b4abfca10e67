//! One game loop iteration, wired across simulation, audio and rendering

use crate::assets::Assets;
use crate::audio::AudioOut;
use crate::renderer::Canvas;
use crate::settings::Settings;
use crate::sim::{self, FrameTime, GameEvent, GameState, Stats, TickInput};

/// A running game
pub struct Game {
    state: GameState,
    assets: Assets,
    settings: Settings,
}

impl Game {
    pub fn new(assets: Assets, settings: Settings, seed: u64) -> Self {
        let state = GameState::new(seed, &assets, settings.quality.star_count());
        log::info!(
            "New game: seed {seed}, {} stars",
            settings.quality.star_count()
        );
        Self {
            state,
            assets,
            settings,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn assets(&self) -> &Assets {
        &self.assets
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stats(&self) -> Stats {
        self.state.stats
    }

    pub fn score(&self) -> u64 {
        self.state.score()
    }

    /// False once quit was requested
    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Run one frame: simulate, play cues, draw
    pub fn frame(
        &mut self,
        time: FrameTime,
        input: &TickInput,
        canvas: &mut dyn Canvas,
        audio: &mut dyn AudioOut,
    ) {
        sim::tick_timed(&mut self.state, &self.assets, input, time);

        for event in self.state.drain_events() {
            match event {
                GameEvent::PlayerHit { meteors } => log::debug!("Player hit by {meteors} meteor(s)"),
                GameEvent::MeteorShot { meteors } => log::debug!("Laser destroyed {meteors} meteor(s)"),
                _ => log::trace!("{event:?}"),
            }
            if let Some(cue) = event.cue() {
                audio.play(cue);
            }
        }

        sim::render(&self.state, &self.assets, canvas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{LogAudio, SoundCue};
    use crate::renderer::DrawList;
    use crate::sim::{Key, autopilot};

    fn new_game(seed: u64) -> Game {
        Game::new(Assets::procedural(), Settings::default(), seed)
    }

    #[test]
    fn test_fire_plays_laser_cue() {
        let mut game = new_game(1);
        let mut list = DrawList::new();
        let mut audio = LogAudio::default();

        let input = TickInput::default().with_pressed(Key::Fire);
        game.frame(FrameTime::fixed(1.0 / 60.0), &input, &mut list, &mut audio);

        assert_eq!(audio.played, vec![SoundCue::Laser]);
        assert_eq!(list.count_image(game.assets().laser.id()), 1);
    }

    #[test]
    fn test_star_count_follows_quality() {
        let settings = Settings::from_preset(crate::QualityPreset::Low);
        let game = Game::new(Assets::procedural(), settings, 1);
        let stars = game
            .state()
            .registry
            .iter()
            .filter(|(_, e)| matches!(e, crate::sim::Entity::Star(_)))
            .count();
        assert_eq!(stars, 10);
    }

    #[test]
    fn test_quit_stops_after_frame() {
        let mut game = new_game(2);
        let mut list = DrawList::new();
        let mut audio = LogAudio::default();
        assert!(game.is_running());

        let input = TickInput {
            close_requested: true,
            ..TickInput::default()
        };
        game.frame(FrameTime::fixed(0.016), &input, &mut list, &mut audio);
        assert!(!game.is_running());
        // The final frame was still drawn
        assert!(!list.commands().is_empty());
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = |seed| {
            let mut game = new_game(seed);
            let mut list = DrawList::new();
            let mut audio = LogAudio::default();
            for _ in 0..600 {
                let input = autopilot(game.state());
                game.frame(FrameTime::fixed(1.0 / 60.0), &input, &mut list, &mut audio);
            }
            (game.stats(), game.score(), audio.played)
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn test_autopilot_demo_shoots_meteors() {
        let mut game = new_game(9);
        let mut list = DrawList::new();
        let mut audio = LogAudio::default();
        for _ in 0..(60 * 20) {
            let input = autopilot(game.state());
            game.frame(FrameTime::fixed(1.0 / 60.0), &input, &mut list, &mut audio);
        }
        let stats = game.stats();
        assert!(stats.meteors_spawned >= 39);
        assert!(stats.lasers_fired > 0);
        assert_eq!(game.score(), 200);
    }
}
