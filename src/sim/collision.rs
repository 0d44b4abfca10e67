//! Collision resolution
//!
//! Runs once per frame after every entity has updated:
//! 1. Player vs meteors, per-pixel masks: touching meteors are absorbed.
//! 2. Each laser vs meteors, bounding boxes: hit meteors and the laser are
//!    destroyed and an explosion starts at the laser's top edge.
//!
//! Removals are collected first and applied together, so an entity can be
//! removed at most once and a meteor destroyed by an earlier laser cannot
//! be hit again by a later one in the same frame.

use std::collections::BTreeSet;

use glam::Vec2;

use super::entity::{Entity, Explosion};
use super::mask::masks_collide;
use super::state::{EntityId, GameEvent, GameState};
use crate::assets::Assets;

/// What happened during one resolution pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    /// Meteors that touched the player
    pub absorbed: Vec<EntityId>,
    /// Lasers that hit something, with the meteors each destroyed
    pub shots: Vec<LaserHit>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaserHit {
    pub laser: EntityId,
    pub meteors: Vec<EntityId>,
    /// Where the explosion was placed
    pub at: Vec2,
}

impl CollisionReport {
    pub fn is_empty(&self) -> bool {
        self.absorbed.is_empty() && self.shots.is_empty()
    }
}

/// Resolve this frame's collisions, mutating the registry and recording events
pub fn resolve(state: &mut GameState, assets: &Assets) -> CollisionReport {
    let mut report = CollisionReport::default();
    let mut removed = BTreeSet::new();

    // Player vs meteors
    if let Some(player) = state.player() {
        let player_rect = player.rect;
        for (id, meteor) in state.meteors() {
            if masks_collide(player.mask(), &player_rect, meteor.mask(), &meteor.rect) {
                report.absorbed.push(id);
            }
        }
    }
    removed.extend(report.absorbed.iter().copied());

    // Lasers vs meteors
    for &laser_id in state.registry.lasers() {
        let Some(laser) = state.registry.get(laser_id).and_then(Entity::as_laser) else {
            continue;
        };
        let meteors: Vec<EntityId> = state
            .meteors()
            .filter(|(id, meteor)| !removed.contains(id) && laser.rect.overlaps(&meteor.rect))
            .map(|(id, _)| id)
            .collect();
        if meteors.is_empty() {
            continue;
        }

        removed.extend(meteors.iter().copied());
        removed.insert(laser_id);
        report.shots.push(LaserHit {
            laser: laser_id,
            meteors,
            at: laser.rect.midtop(),
        });
    }

    state.registry.remove_all(&removed);

    if !report.absorbed.is_empty() {
        log::debug!("Player absorbed {} meteor(s)", report.absorbed.len());
        state.record(GameEvent::PlayerHit {
            meteors: report.absorbed.len(),
        });
    }
    for shot in &report.shots {
        state
            .registry
            .insert(Entity::Explosion(Explosion::new(assets.explosion.clone(), shot.at)));
        state.record(GameEvent::MeteorShot {
            meteors: shot.meteors.len(),
        });
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Laser, Meteor};

    fn still_meteor(assets: &Assets, midbottom: Vec2) -> Entity {
        Entity::Meteor(Meteor::new(assets.meteor.clone(), midbottom, Vec2::Y, 0.0, 0.0))
    }

    fn empty_state(assets: &Assets) -> GameState {
        GameState::new(3, assets, 0)
    }

    #[test]
    fn test_laser_destroys_every_overlapping_meteor() {
        let assets = Assets::procedural();
        let mut state = empty_state(&assets);
        let a = state.registry.insert(still_meteor(&assets, Vec2::new(200.0, 200.0)));
        let b = state.registry.insert(still_meteor(&assets, Vec2::new(210.0, 210.0)));
        let laser = state.registry.insert(Entity::Laser(Laser::new(
            assets.laser.clone(),
            Vec2::new(205.0, 220.0),
        )));

        let report = resolve(&mut state, &assets);

        assert_eq!(report.shots.len(), 1);
        assert_eq!(report.shots[0].meteors, vec![a, b]);
        assert!(!state.registry.contains(a));
        assert!(!state.registry.contains(b));
        assert!(!state.registry.contains(laser));
        assert!(state.registry.meteors().is_empty());
        assert!(state.registry.lasers().is_empty());

        let explosions: Vec<_> = state
            .registry
            .iter()
            .filter_map(|(_, e)| e.as_explosion())
            .collect();
        assert_eq!(explosions.len(), 1);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::MeteorShot { meteors: 2 }]
        );
    }

    #[test]
    fn test_meteor_hit_once_by_two_lasers() {
        let assets = Assets::procedural();
        let mut state = empty_state(&assets);
        let meteor = state.registry.insert(still_meteor(&assets, Vec2::new(200.0, 200.0)));
        let first = state.registry.insert(Entity::Laser(Laser::new(
            assets.laser.clone(),
            Vec2::new(195.0, 200.0),
        )));
        let second = state.registry.insert(Entity::Laser(Laser::new(
            assets.laser.clone(),
            Vec2::new(205.0, 200.0),
        )));

        let report = resolve(&mut state, &assets);

        assert_eq!(report.shots.len(), 1);
        assert_eq!(report.shots[0].laser, first);
        assert!(!state.registry.contains(meteor));
        // The second laser found nothing left to hit and keeps flying
        assert!(state.registry.contains(second));
        assert_eq!(state.registry.lasers(), &[second]);
    }

    #[test]
    fn test_player_absorbs_touching_meteor() {
        let assets = Assets::procedural();
        let mut state = empty_state(&assets);
        let center = state.player().map(|p| p.rect.center()).expect("player");
        let meteor = state.registry.insert(still_meteor(&assets, center + Vec2::new(0.0, 20.0)));
        let far = state.registry.insert(still_meteor(&assets, Vec2::new(100.0, 100.0)));

        let report = resolve(&mut state, &assets);

        assert_eq!(report.absorbed, vec![meteor]);
        assert!(!state.registry.contains(meteor));
        assert!(state.registry.contains(far));
        assert!(state.registry.contains(state.player));
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::PlayerHit { meteors: 1 }]
        );
    }

    #[test]
    fn test_absorbed_meteor_cannot_be_shot_same_frame() {
        let assets = Assets::procedural();
        let mut state = empty_state(&assets);
        let center = state.player().map(|p| p.rect.center()).expect("player");
        let meteor = state.registry.insert(still_meteor(&assets, center + Vec2::new(0.0, 20.0)));
        // Laser box inside the meteor's upper right
        let laser = state.registry.insert(Entity::Laser(Laser::new(
            assets.laser.clone(),
            center + Vec2::new(40.0, -20.0),
        )));
        let laser_rect = state.registry.get(laser).map(|e| e.rect()).expect("laser");
        let meteor_rect = state.registry.get(meteor).map(|e| e.rect()).expect("meteor");
        assert!(laser_rect.overlaps(&meteor_rect));

        let report = resolve(&mut state, &assets);

        assert_eq!(report.absorbed, vec![meteor]);
        assert!(report.shots.is_empty());
        assert!(state.registry.contains(laser));
        assert_eq!(state.registry.lasers(), &[laser]);
        assert!(state.registry.meteors().is_empty());
        assert!(state.registry.iter().all(|(_, e)| e.as_explosion().is_none()));
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::PlayerHit { meteors: 1 }]
        );
    }

    #[test]
    fn test_transparent_corners_do_not_absorb() {
        let assets = Assets::procedural();
        let mut state = empty_state(&assets);
        let player_rect = state.player().map(|p| p.rect).expect("player");

        // Meteor box overlaps the ship's box only at its empty top-left corner
        let meteor_size = assets.meteor.size();
        let midbottom = Vec2::new(
            player_rect.left() - meteor_size.x / 2.0 + 4.0,
            player_rect.top() + 4.0,
        );
        let meteor = state.registry.insert(still_meteor(&assets, midbottom));

        let report = resolve(&mut state, &assets);
        assert!(report.absorbed.is_empty());
        assert!(state.registry.contains(meteor));
    }

    #[test]
    fn test_no_collisions_is_a_no_op() {
        let assets = Assets::procedural();
        let mut state = empty_state(&assets);
        let len = state.registry.len();
        assert!(resolve(&mut state, &assets).is_empty());
        assert_eq!(state.registry.len(), len);
        assert!(state.drain_events().is_empty());
    }
}
