//! Demo-mode pilot
//!
//! Produces a [`TickInput`] from the current state so the game can play
//! itself (attract screen in the browser, headless runs on native). The
//! pilot dodges meteors falling toward the ship, otherwise lines up under
//! the lowest meteor and shoots whenever one is overhead.

use super::state::GameState;
use super::tick::{Key, KeySet, TickInput};

/// Horizontal clearance kept around falling meteors
const DODGE_MARGIN: f32 = 40.0;
/// How far above the ship a meteor counts as a threat
const THREAT_RANGE: f32 = 320.0;
/// Alignment tolerance for tracking and firing
const AIM_TOLERANCE: f32 = 24.0;
/// Keep this far from the side edges
const EDGE_MARGIN: f32 = 80.0;
/// Cruise height as a fraction of the screen height
const CRUISE_HEIGHT: f32 = 0.8;

/// Compute this frame's input for the autopilot
pub fn autopilot(state: &GameState) -> TickInput {
    let mut held = KeySet::default();
    let mut pressed = KeySet::default();

    let Some(player) = state.player() else {
        return TickInput::default();
    };
    let ship = player.rect;
    let center = ship.center();

    // Nearest meteor above the ship whose path would clip it
    let threat = state
        .meteors()
        .map(|(_, m)| m.rect)
        .filter(|r| {
            let above = r.bottom() <= ship.bottom() && ship.top() - r.bottom() < THREAT_RANGE;
            let clearance = (r.w + ship.w) / 2.0 + DODGE_MARGIN;
            above && (r.center().x - center.x).abs() < clearance
        })
        .max_by(|a, b| a.bottom().total_cmp(&b.bottom()));

    // Lowest meteor still above the ship, to line up under
    let target = state
        .meteors()
        .map(|(_, m)| m.rect.center())
        .filter(|c| c.y < center.y)
        .max_by(|a, b| a.y.total_cmp(&b.y));

    let steer_x = match (threat, target) {
        (Some(r), _) => {
            if r.center().x < center.x {
                1.0
            } else {
                -1.0
            }
        }
        (None, Some(t)) if (t.x - center.x).abs() > AIM_TOLERANCE => (t.x - center.x).signum(),
        _ => 0.0,
    };

    // Edges override everything else
    let steer_x = if center.x < EDGE_MARGIN {
        1.0
    } else if center.x > state.bounds.x - EDGE_MARGIN {
        -1.0
    } else {
        steer_x
    };
    if steer_x > 0.0 {
        held.insert(Key::Right);
    } else if steer_x < 0.0 {
        held.insert(Key::Left);
    }

    let cruise_y = state.bounds.y * CRUISE_HEIGHT;
    if center.y < cruise_y - AIM_TOLERANCE {
        held.insert(Key::Down);
    } else if center.y > cruise_y + AIM_TOLERANCE {
        held.insert(Key::Up);
    }

    let overhead = state.meteors().any(|(_, m)| {
        let c = m.rect.center();
        c.y < center.y && (c.x - center.x).abs() < m.rect.w / 2.0
    });
    if overhead && player.can_shoot() {
        pressed.insert(Key::Fire);
        held.insert(Key::Fire);
    }

    TickInput {
        held,
        pressed,
        close_requested: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use crate::assets::Assets;
    use crate::sim::entity::{Entity, Meteor};
    use crate::sim::tick::tick;

    fn state_with_meteor(offset: Vec2) -> (GameState, Assets) {
        let assets = Assets::procedural();
        let mut state = GameState::new(8, &assets, 0);
        let center = state.player().map(|p| p.rect.center()).expect("player");
        state.registry.insert(Entity::Meteor(Meteor::new(
            assets.meteor.clone(),
            center + offset,
            Vec2::Y,
            0.0,
            0.0,
        )));
        (state, assets)
    }

    #[test]
    fn test_dodges_meteor_falling_onto_ship() {
        // Slightly left of center, directly above: move right
        let (state, _) = state_with_meteor(Vec2::new(-10.0, -120.0));
        let input = autopilot(&state);
        assert!(input.is_held(Key::Right));
        assert!(!input.is_held(Key::Left));
    }

    #[test]
    fn test_fires_at_overhead_meteor() {
        let (state, _) = state_with_meteor(Vec2::new(0.0, -200.0));
        assert!(autopilot(&state).just_pressed(Key::Fire));
    }

    #[test]
    fn test_holds_fire_during_cooldown() {
        let (mut state, assets) = state_with_meteor(Vec2::new(0.0, -200.0));
        let first = autopilot(&state);
        tick(&mut state, &assets, &first, 0.01);
        assert!(!autopilot(&state).just_pressed(Key::Fire));
    }

    #[test]
    fn test_idle_without_meteors_returns_to_cruise_height() {
        let assets = Assets::procedural();
        let state = GameState::new(1, &assets, 0);
        // Ship starts at mid screen, above cruise height
        let input = autopilot(&state);
        assert!(input.is_held(Key::Down));
        assert!(input.pressed.is_empty());
        assert_eq!(input.movement(), Vec2::new(0.0, 1.0));
    }
}
