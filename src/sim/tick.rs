//! Per-frame simulation step
//!
//! One frame runs, in order: quit check, meteor spawning, entity updates
//! (registry order), deferred spawns, collision resolution. [`render`] then
//! draws the score overlay followed by every entity in registry order.

use std::collections::BTreeSet;

use glam::Vec2;

use super::collision;
use super::entity::{Commands, Entity, Fate, SimContext};
use super::rect::Rect;
use super::state::{GameEvent, GameState};
use crate::assets::Assets;
use crate::consts::*;
use crate::renderer::{Canvas, Color};

/// Logical keys the simulation reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Fire,
    Quit,
}

impl Key {
    fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Small set of keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeySet(u8);

impl KeySet {
    pub fn insert(&mut self, key: Key) {
        self.0 |= key.bit();
    }

    pub fn remove(&mut self, key: Key) {
        self.0 &= !key.bit();
    }

    pub fn contains(&self, key: Key) -> bool {
        self.0 & key.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }
}

impl FromIterator<Key> for KeySet {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        let mut set = KeySet::default();
        for key in iter {
            set.insert(key);
        }
        set
    }
}

/// Input snapshot for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Keys currently held
    pub held: KeySet,
    /// Keys that went down since the previous frame
    pub pressed: KeySet,
    /// Window/page close request
    pub close_requested: bool,
}

impl TickInput {
    /// Input holding the given keys, nothing newly pressed
    pub fn holding(keys: &[Key]) -> Self {
        Self {
            held: keys.iter().copied().collect(),
            ..Self::default()
        }
    }

    /// Copy with `key` marked as pressed this frame (and held)
    pub fn with_pressed(mut self, key: Key) -> Self {
        self.held.insert(key);
        self.pressed.insert(key);
        self
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(key)
    }

    pub fn just_pressed(&self, key: Key) -> bool {
        self.pressed.contains(key)
    }

    /// Unit movement direction from held keys (zero when idle or cancelled)
    pub fn movement(&self) -> Vec2 {
        let axis = |neg: Key, pos: Key| {
            let value = |key: Key| if self.is_held(key) { 1.0 } else { 0.0 };
            value(pos) - value(neg)
        };
        Vec2::new(axis(Key::Left, Key::Right), axis(Key::Up, Key::Down)).normalize_or_zero()
    }

    pub fn quit_requested(&self) -> bool {
        self.close_requested || self.just_pressed(Key::Quit)
    }
}

/// Time covered by one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    /// Step for motion, cooldowns and animation (frontends clamp it)
    pub dt: f32,
    /// Real time that passed; drives the score clock and spawning
    pub wall: f32,
}

impl FrameTime {
    /// Frame where the simulation step equals real time
    pub fn fixed(dt: f32) -> Self {
        Self { dt, wall: dt }
    }
}

/// Advance the game by one frame of `dt` seconds
pub fn tick(state: &mut GameState, assets: &Assets, input: &TickInput, dt: f32) {
    tick_timed(state, assets, input, FrameTime::fixed(dt));
}

/// Advance the game by one frame whose step may be shorter than real time
///
/// Entities move by `time.dt`. The score clock and the spawner follow
/// `time.wall`, so a stalled frame neither slows the score nor drops meteors.
pub fn tick_timed(state: &mut GameState, assets: &Assets, input: &TickInput, time: FrameTime) {
    let dt = time.dt.max(0.0);
    let wall = time.wall.max(dt);
    state.frame += 1;
    state.elapsed += wall as f64;

    if input.quit_requested() {
        log::info!("Quit requested at frame {}", state.frame);
        state.request_quit();
    }

    for _ in 0..state.spawner.advance(wall) {
        state.spawn_meteor(assets);
    }

    // Update pass; removals and spawns are applied once it completes
    let ctx = SimContext {
        dt,
        input,
        assets,
        bounds: state.bounds,
    };
    let mut cmds = Commands::default();
    let mut removed = BTreeSet::new();
    let mut finished = 0;
    for (id, entity) in state.registry.iter_mut() {
        if entity.update(&ctx, &mut cmds) == Fate::Remove {
            if matches!(entity, Entity::Explosion(_)) {
                finished += 1;
            }
            removed.insert(id);
        }
    }
    state.registry.remove_all(&removed);
    for _ in 0..finished {
        state.record(GameEvent::ExplosionFinished);
    }

    let Commands { spawns, events } = cmds;
    for entity in spawns {
        state.registry.insert(entity);
    }
    for event in events {
        state.record(event);
    }

    collision::resolve(state, assets);
}

/// Rectangle the score text occupies for `text`
pub fn score_rect(assets: &Assets, text: &str) -> Rect {
    let size = assets.font.measure(text);
    Rect::from_midbottom(
        Vec2::new(WINDOW_WIDTH / 2.0, WINDOW_HEIGHT - SCORE_BOTTOM_MARGIN),
        size,
    )
}

/// Draw the frame: background, score overlay, then entities in registry order
pub fn render(state: &GameState, assets: &Assets, canvas: &mut dyn Canvas) {
    canvas.clear(Color::BACKGROUND);

    let text = state.score().to_string();
    let rect = score_rect(assets, &text);
    canvas.draw_text(&text, &assets.font, rect, Color::SCORE);
    canvas.draw_rect_outline(rect.inflate(20.0, 10.0).moved(0.0, -8.0), Color::SCORE, 5.0, 10.0);

    for (_, entity) in state.registry.iter() {
        entity.render(canvas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DrawCommand, DrawList};
    use crate::sim::entity::Meteor;
    use crate::sim::state::EntityId;

    fn laser_count(state: &GameState) -> usize {
        state.registry.lasers().len()
    }

    fn player_only(assets: &Assets) -> GameState {
        let mut state = GameState::new(11, assets, 0);
        // Keep meteors out of scenarios that don't want them
        state.spawner = crate::sim::Spawner::new(0.0);
        state
    }

    #[test]
    fn test_cooldown_blocks_rapid_fire() {
        let assets = Assets::procedural();
        let mut state = player_only(&assets);
        let dt = 0.05;

        // Press at 0 ms, 200 ms and 450 ms
        for frame in 0..12 {
            let input = if matches!(frame, 0 | 4 | 9) {
                TickInput::default().with_pressed(Key::Fire)
            } else {
                TickInput::default()
            };
            tick(&mut state, &assets, &input, dt);
            match frame {
                0..=8 => assert!(
                    state.stats.lasers_fired == 1,
                    "frame {frame}: {} fired",
                    state.stats.lasers_fired
                ),
                _ => assert_eq!(state.stats.lasers_fired, 2),
            }
        }
    }

    #[test]
    fn test_held_fire_does_not_autofire() {
        let assets = Assets::procedural();
        let mut state = player_only(&assets);
        tick(&mut state, &assets, &TickInput::default().with_pressed(Key::Fire), 0.05);
        for _ in 0..20 {
            tick(&mut state, &assets, &TickInput::holding(&[Key::Fire]), 0.05);
        }
        assert_eq!(state.stats.lasers_fired, 1);
    }

    #[test]
    fn test_laser_spawned_in_frame_is_drawn_that_frame() {
        let assets = Assets::procedural();
        let mut state = player_only(&assets);
        tick(&mut state, &assets, &TickInput::default().with_pressed(Key::Fire), 0.016);
        assert_eq!(laser_count(&state), 1);

        let mut list = DrawList::new();
        render(&state, &assets, &mut list);
        assert_eq!(list.count_image(assets.laser.id()), 1);
    }

    #[test]
    fn test_meteor_removed_only_after_top_passes_bottom_edge() {
        let assets = Assets::procedural();
        let mut state = player_only(&assets);
        let height = assets.meteor.size().y;
        // Top starts at y = 0, far from the player horizontally; no spin keeps size fixed
        let meteor = Meteor::new(
            assets.meteor.clone(),
            Vec2::new(60.0, height),
            Vec2::Y,
            160.0,
            0.0,
        );
        let id = state.registry.insert(Entity::Meteor(meteor));

        // 160 px/s at 1/16 s moves exactly 10 px per frame
        for _ in 0..72 {
            tick(&mut state, &assets, &TickInput::default(), 1.0 / 16.0);
        }
        let top = state.registry.get(id).map(|e| e.rect().top());
        assert_eq!(top, Some(WINDOW_HEIGHT));

        tick(&mut state, &assets, &TickInput::default(), 1.0 / 16.0);
        assert!(!state.registry.contains(id));
        assert!(state.registry.meteors().is_empty());
    }

    #[test]
    fn test_removed_entities_never_return() {
        let assets = Assets::procedural();
        let mut state = GameState::new(5, &assets, 4);
        let mut seen_removed: BTreeSet<EntityId> = BTreeSet::new();
        let mut alive: BTreeSet<EntityId> = state.registry.iter().map(|(id, _)| id).collect();

        for frame in 0..600 {
            let input = if frame % 7 == 0 {
                TickInput::holding(&[Key::Left]).with_pressed(Key::Fire)
            } else {
                TickInput::holding(&[Key::Up])
            };
            tick(&mut state, &assets, &input, 1.0 / 60.0);

            let now: BTreeSet<EntityId> = state.registry.iter().map(|(id, _)| id).collect();
            seen_removed.extend(alive.difference(&now).copied());
            assert!(now.is_disjoint(&seen_removed));
            alive = now;
        }
        assert!(state.registry.contains(state.player));
    }

    #[test]
    fn test_spawner_adds_meteors_over_time() {
        let assets = Assets::procedural();
        let mut state = GameState::new(2, &assets, 0);
        // Just over one second: two full intervals
        for _ in 0..61 {
            tick(&mut state, &assets, &TickInput::default(), 1.0 / 60.0);
        }
        assert_eq!(state.stats.meteors_spawned, 2);
    }

    #[test]
    fn test_stalled_frame_keeps_score_and_spawns_on_wall_time() {
        let assets = Assets::procedural();
        let mut state = GameState::new(6, &assets, 0);
        let start = state.player().map(|p| p.rect.x).expect("player");

        // One 2 s stall, clamped to a 0.1 s step while holding right
        let time = FrameTime { dt: 0.1, wall: 2.0 };
        tick_timed(&mut state, &assets, &TickInput::holding(&[Key::Right]), time);

        assert_eq!(state.score(), 20);
        assert_eq!(state.stats.meteors_spawned, 4);
        let moved = state.player().map(|p| p.rect.x).expect("player") - start;
        assert!((moved - PLAYER_SPEED * 0.1).abs() < 1e-3);
    }

    #[test]
    fn test_quit_finishes_frame() {
        let assets = Assets::procedural();
        let mut state = player_only(&assets);
        let input = TickInput::holding(&[Key::Right]).with_pressed(Key::Quit);
        let before = state.player().map(|p| p.rect.x).expect("player");

        tick(&mut state, &assets, &input, 0.01);

        assert!(!state.running);
        let after = state.player().map(|p| p.rect.x).expect("player");
        assert!(after > before);
        assert!(state.drain_events().contains(&GameEvent::QuitRequested));
    }

    #[test]
    fn test_render_order_score_then_entities() {
        let assets = Assets::procedural();
        let state = GameState::new(4, &assets, 3);
        let mut list = DrawList::new();
        render(&state, &assets, &mut list);

        let commands = list.commands();
        assert!(matches!(commands[0], DrawCommand::Clear(_)));
        assert!(matches!(commands[1], DrawCommand::Text { .. }));
        assert!(matches!(commands[2], DrawCommand::RectOutline { .. }));
        assert_eq!(commands.len(), 3 + state.registry.len());
        // Player registered last, drawn last
        assert!(matches!(
            commands.last(),
            Some(DrawCommand::Image { id, .. }) if *id == assets.player.id()
        ));
    }

    #[test]
    fn test_score_overlay_position() {
        let assets = Assets::procedural();
        let rect = score_rect(&assets, "123");
        assert_eq!(rect.midbottom(), Vec2::new(640.0, 670.0));
    }
}
