//! Frame-stepped simulation module
//!
//! All gameplay logic lives here. This module must stay free of platform
//! dependencies:
//! - Frame delta supplied by the caller
//! - Seeded RNG only
//! - Stable iteration order (registry insertion order)
//! - Rendering only through the `Canvas` boundary

pub mod autopilot;
pub mod collision;
pub mod entity;
pub mod mask;
pub mod rect;
pub mod spawner;
pub mod state;
pub mod tick;

pub use autopilot::autopilot;
pub use collision::{CollisionReport, LaserHit, resolve};
pub use entity::{Actor, Cooldown, Entity, Explosion, Fate, Laser, Meteor, Player, Star};
pub use mask::{Mask, masks_collide};
pub use rect::Rect;
pub use spawner::Spawner;
pub use state::{EntityId, GameEvent, GameState, Registry, Stats};
pub use tick::{FrameTime, Key, KeySet, TickInput, render, score_rect, tick, tick_timed};
