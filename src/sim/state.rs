//! Game state, entity registry and gameplay events
//!
//! All state that a frame reads or mutates lives in [`GameState`]. Entity
//! storage is owned by the [`Registry`], which keeps the "all" collection in
//! insertion order and tracks the meteor and laser subsets by id.

use std::collections::BTreeSet;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, Meteor, Player, Role, Star};
use super::spawner::Spawner;
use crate::assets::Assets;
use crate::audio::SoundCue;
use crate::consts::*;

/// Stable entity handle; ids are never reused within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Gameplay events emitted during a frame (consumed by audio and stats)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    LaserFired,
    MeteorSpawned,
    /// Player touched one or more meteors (they are absorbed)
    PlayerHit { meteors: usize },
    /// A laser destroyed one or more meteors
    MeteorShot { meteors: usize },
    ExplosionFinished,
    QuitRequested,
}

impl GameEvent {
    /// Sound cue for this event, if any
    pub fn cue(&self) -> Option<SoundCue> {
        match self {
            GameEvent::LaserFired => Some(SoundCue::Laser),
            GameEvent::PlayerHit { .. } => Some(SoundCue::Damage),
            GameEvent::MeteorShot { .. } => Some(SoundCue::Explosion),
            _ => None,
        }
    }
}

/// Run counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub lasers_fired: u32,
    pub meteors_spawned: u32,
    pub meteors_destroyed: u32,
    pub meteors_absorbed: u32,
    pub explosions_finished: u32,
}

impl Stats {
    pub fn record(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::LaserFired => self.lasers_fired += 1,
            GameEvent::MeteorSpawned => self.meteors_spawned += 1,
            GameEvent::PlayerHit { meteors } => self.meteors_absorbed += meteors as u32,
            GameEvent::MeteorShot { meteors } => self.meteors_destroyed += meteors as u32,
            GameEvent::ExplosionFinished => self.explosions_finished += 1,
            GameEvent::QuitRequested => {}
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    id: EntityId,
    entity: Entity,
}

/// Owner of every live entity
///
/// `all` is ordered by id, which is also insertion order, so updates and
/// draws happen in the order entities were added.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    all: Vec<Slot>,
    meteors: Vec<EntityId>,
    lasers: Vec<EntityId>,
    next_id: u32,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new entity ID
    fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add an entity to "all" and to the subset matching its variant
    pub fn insert(&mut self, entity: Entity) -> EntityId {
        let id = self.next_entity_id();
        match entity.role() {
            Role::Meteor => self.meteors.push(id),
            Role::Laser => self.lasers.push(id),
            Role::Ambient => {}
        }
        self.all.push(Slot { id, entity });
        id
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.all.binary_search_by_key(&id, |slot| slot.id).ok()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index_of(id).map(|i| &self.all[i].entity)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.index_of(id).map(move |i| &mut self.all[i].entity)
    }

    /// Every entity in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.all.iter().map(|slot| (slot.id, &slot.entity))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut Entity)> {
        self.all.iter_mut().map(|slot| (slot.id, &mut slot.entity))
    }

    /// Ids of live meteors, insertion order
    pub fn meteors(&self) -> &[EntityId] {
        &self.meteors
    }

    /// Ids of live lasers, insertion order
    pub fn lasers(&self) -> &[EntityId] {
        &self.lasers
    }

    /// Remove the given entities from "all" and from every subset.
    /// Unknown ids are ignored. Returns the number removed.
    pub fn remove_all(&mut self, ids: &BTreeSet<EntityId>) -> usize {
        if ids.is_empty() {
            return 0;
        }
        let before = self.all.len();
        self.all.retain(|slot| !ids.contains(&slot.id));
        self.meteors.retain(|id| !ids.contains(id));
        self.lasers.retain(|id| !ids.contains(id));
        before - self.all.len()
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    /// Visible area size
    pub bounds: Vec2,
    pub registry: Registry,
    /// Handle of the single player entity
    pub player: EntityId,
    pub spawner: Spawner,
    /// Real seconds since the run started (unclamped)
    pub elapsed: f64,
    /// Frames processed
    pub frame: u64,
    /// Cleared once quit is requested; the loop exits after the current frame
    pub running: bool,
    pub stats: Stats,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game: `star_count` stars first, then the player at the center
    pub fn new(seed: u64, assets: &Assets, star_count: usize) -> Self {
        let bounds = crate::screen_size();
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut registry = Registry::new();

        for _ in 0..star_count {
            registry.insert(Entity::Star(Star::random(assets.star.clone(), &mut rng, bounds)));
        }
        let player = registry.insert(Entity::Player(Player::new(
            assets.player.clone(),
            bounds / 2.0,
        )));

        Self {
            seed,
            rng,
            bounds,
            registry,
            player,
            spawner: Spawner::new(SPAWN_INTERVAL),
            elapsed: 0.0,
            frame: 0,
            running: true,
            stats: Stats::default(),
            events: Vec::new(),
        }
    }

    /// Displayed score: tenths of a second survived
    pub fn score(&self) -> u64 {
        (self.elapsed * SCORE_PER_SECOND).floor() as u64
    }

    pub fn player(&self) -> Option<&Player> {
        self.registry.get(self.player).and_then(Entity::as_player)
    }

    pub fn player_mut(&mut self) -> Option<&mut Player> {
        self.registry.get_mut(self.player).and_then(Entity::as_player_mut)
    }

    /// Iterate live meteors with their ids
    pub fn meteors(&self) -> impl Iterator<Item = (EntityId, &Meteor)> {
        self.registry
            .meteors()
            .iter()
            .filter_map(|&id| self.registry.get(id)?.as_meteor().map(|m| (id, m)))
    }

    /// Add a meteor with randomized position, drift and spin
    pub fn spawn_meteor(&mut self, assets: &Assets) -> EntityId {
        let meteor = Meteor::random(assets.meteor.clone(), &mut self.rng, self.bounds);
        let id = self.registry.insert(Entity::Meteor(meteor));
        self.record(GameEvent::MeteorSpawned);
        id
    }

    /// Record an event for this frame and update counters
    pub fn record(&mut self, event: GameEvent) {
        self.stats.record(&event);
        self.events.push(event);
    }

    /// Events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Stop the run; idempotent
    pub fn request_quit(&mut self) {
        if self.running {
            self.running = false;
            self.record(GameEvent::QuitRequested);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Laser;

    #[test]
    fn test_new_state_layout() {
        let assets = Assets::procedural();
        let state = GameState::new(7, &assets, 20);

        assert_eq!(state.registry.len(), 21);
        assert!(state.registry.meteors().is_empty());
        assert!(state.registry.lasers().is_empty());

        // Player drawn after every star
        let last = state.registry.iter().last().map(|(id, _)| id);
        assert_eq!(last, Some(state.player));
        let player = state.player().expect("player");
        assert_eq!(player.rect.center(), Vec2::new(640.0, 360.0));
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_same_seed_same_stars() {
        let assets = Assets::procedural();
        let a = GameState::new(99, &assets, 10);
        let b = GameState::new(99, &assets, 10);
        let rects_a: Vec<_> = a.registry.iter().map(|(_, e)| e.rect()).collect();
        let rects_b: Vec<_> = b.registry.iter().map(|(_, e)| e.rect()).collect();
        assert_eq!(rects_a, rects_b);
    }

    #[test]
    fn test_registry_subsets_follow_membership() {
        let assets = Assets::procedural();
        let mut registry = Registry::new();
        let star = registry.insert(Entity::Star(Star::new(assets.star.clone(), Vec2::ZERO)));
        let laser = registry.insert(Entity::Laser(Laser::new(
            assets.laser.clone(),
            Vec2::new(10.0, 10.0),
        )));
        let meteor = registry.insert(Entity::Meteor(Meteor::new(
            assets.meteor.clone(),
            Vec2::new(100.0, 10.0),
            Vec2::Y,
            0.0,
            0.0,
        )));

        assert_eq!(registry.lasers(), &[laser]);
        assert_eq!(registry.meteors(), &[meteor]);

        let removed = registry.remove_all(&BTreeSet::from([laser, meteor]));
        assert_eq!(removed, 2);
        assert!(registry.lasers().is_empty());
        assert!(registry.meteors().is_empty());
        assert!(registry.contains(star));
        assert!(!registry.contains(laser));

        // Removing again is a no-op
        assert_eq!(registry.remove_all(&BTreeSet::from([laser])), 0);
    }

    #[test]
    fn test_ids_never_reused() {
        let assets = Assets::procedural();
        let mut registry = Registry::new();
        assert!(registry.is_empty());
        let a = registry.insert(Entity::Star(Star::new(assets.star.clone(), Vec2::ZERO)));
        registry.remove_all(&BTreeSet::from([a]));
        assert!(registry.is_empty());
        let b = registry.insert(Entity::Star(Star::new(assets.star.clone(), Vec2::ZERO)));
        assert!(b > a);
    }

    #[test]
    fn test_score_is_floored_deciseconds() {
        let assets = Assets::procedural();
        let mut state = GameState::new(1, &assets, 0);
        state.elapsed = 1.29;
        assert_eq!(state.score(), 12);
        state.elapsed = 1.3;
        assert_eq!(state.score(), 13);
    }

    #[test]
    fn test_stats_follow_events() {
        let assets = Assets::procedural();
        let mut state = GameState::new(1, &assets, 0);
        state.record(GameEvent::LaserFired);
        state.record(GameEvent::MeteorShot { meteors: 2 });
        state.record(GameEvent::PlayerHit { meteors: 1 });
        state.request_quit();
        state.request_quit();

        assert_eq!(state.stats.lasers_fired, 1);
        assert_eq!(state.stats.meteors_destroyed, 2);
        assert_eq!(state.stats.meteors_absorbed, 1);
        assert!(!state.running);
        let events = state.drain_events();
        assert_eq!(events.len(), 4);
        assert!(state.drain_events().is_empty());
    }
}
