//! Entity variants and their per-frame behavior
//!
//! The set of entities is closed: Player, Star, Laser, Meteor, Explosion.
//! Each variant implements [`Actor`]; [`Entity`] dispatches to it so the
//! registry can update and render everything polymorphically.
//!
//! Entities never remove themselves or touch the registry directly. An
//! update returns a [`Fate`] and queues new entities/events in [`Commands`];
//! the tick applies both after the pass completes.

use glam::Vec2;
use rand::Rng;

use super::mask::Mask;
use super::rect::Rect;
use super::state::GameEvent;
use super::tick::{Key, TickInput};
use crate::assets::{Assets, Image};
use crate::consts::*;
use crate::renderer::Canvas;

/// Per-frame context shared by every entity update
pub struct SimContext<'a> {
    /// Seconds since the previous frame
    pub dt: f32,
    pub input: &'a TickInput,
    pub assets: &'a Assets,
    /// Visible area size
    pub bounds: Vec2,
}

/// Outcome of an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fate {
    Keep,
    Remove,
}

/// Side effects queued during a pass, applied once it finishes
#[derive(Debug, Default)]
pub struct Commands {
    pub spawns: Vec<Entity>,
    pub events: Vec<GameEvent>,
}

/// Registry subset an entity belongs to besides "all"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Ambient,
    Meteor,
    Laser,
}

/// Common capability set of every entity
pub trait Actor {
    /// Image drawn this frame
    fn image(&self) -> &Image;

    /// Bounding rectangle in screen space
    fn rect(&self) -> Rect;

    fn update(&mut self, _ctx: &SimContext, _cmds: &mut Commands) -> Fate {
        Fate::Keep
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        canvas.draw_image(self.image(), self.rect());
    }
}

// ============================================================================
// PLAYER
// ============================================================================

/// Fire cooldown state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cooldown {
    Ready,
    /// Seconds accumulated since the last shot
    Cooling { elapsed: f32 },
}

/// The player ship (one instance, never removed)
#[derive(Debug, Clone)]
pub struct Player {
    image: Image,
    mask: Mask,
    pub rect: Rect,
    /// Unit or zero vector, recomputed every update
    pub direction: Vec2,
    pub speed: f32,
    pub cooldown: Cooldown,
    pub cooldown_duration: f32,
}

impl Player {
    pub fn new(image: Image, center: Vec2) -> Self {
        Self {
            mask: Mask::from_image(&image),
            rect: Rect::from_center(center, image.size()),
            image,
            direction: Vec2::ZERO,
            speed: PLAYER_SPEED,
            cooldown: Cooldown::Ready,
            cooldown_duration: PLAYER_COOLDOWN,
        }
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn can_shoot(&self) -> bool {
        self.cooldown == Cooldown::Ready
    }

    /// Accumulate cooling time; becomes Ready once the duration is reached
    fn tick_cooldown(&mut self, dt: f32) {
        if let Cooldown::Cooling { elapsed } = self.cooldown {
            let elapsed = elapsed + dt;
            self.cooldown = if elapsed >= self.cooldown_duration {
                Cooldown::Ready
            } else {
                Cooldown::Cooling { elapsed }
            };
        }
    }
}

impl Actor for Player {
    fn image(&self) -> &Image {
        &self.image
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn update(&mut self, ctx: &SimContext, cmds: &mut Commands) -> Fate {
        self.direction = ctx.input.movement();
        self.rect.translate(self.direction * self.speed * ctx.dt);

        // Time since the shot only counts frames after the one that fired it
        self.tick_cooldown(ctx.dt);

        if ctx.input.just_pressed(Key::Fire) && self.can_shoot() {
            let laser = Laser::new(ctx.assets.laser.clone(), self.rect.midtop());
            cmds.spawns.push(Entity::Laser(laser));
            cmds.events.push(GameEvent::LaserFired);
            self.cooldown = Cooldown::Cooling { elapsed: 0.0 };
        }

        Fate::Keep
    }
}

// ============================================================================
// STAR
// ============================================================================

/// Static background decoration
#[derive(Debug, Clone)]
pub struct Star {
    image: Image,
    rect: Rect,
}

impl Star {
    pub fn new(image: Image, center: Vec2) -> Self {
        Self {
            rect: Rect::from_center(center, image.size()),
            image,
        }
    }

    /// Star at a uniformly random integer position inside `bounds`
    pub fn random(image: Image, rng: &mut impl Rng, bounds: Vec2) -> Self {
        let x = rng.random_range(0..=bounds.x as i32) as f32;
        let y = rng.random_range(0..=bounds.y as i32) as f32;
        Self::new(image, Vec2::new(x, y))
    }
}

impl Actor for Star {
    fn image(&self) -> &Image {
        &self.image
    }

    fn rect(&self) -> Rect {
        self.rect
    }
}

// ============================================================================
// LASER
// ============================================================================

/// Upward projectile
#[derive(Debug, Clone)]
pub struct Laser {
    image: Image,
    pub rect: Rect,
    pub speed: f32,
}

impl Laser {
    /// Laser whose bottom edge midpoint sits on `midbottom`
    pub fn new(image: Image, midbottom: Vec2) -> Self {
        Self {
            rect: Rect::from_midbottom(midbottom, image.size()),
            image,
            speed: LASER_SPEED,
        }
    }
}

impl Actor for Laser {
    fn image(&self) -> &Image {
        &self.image
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn update(&mut self, ctx: &SimContext, _cmds: &mut Commands) -> Fate {
        self.rect.y -= self.speed * ctx.dt;
        if self.rect.bottom() < 0.0 {
            Fate::Remove
        } else {
            Fate::Keep
        }
    }
}

// ============================================================================
// METEOR
// ============================================================================

/// Falling, spinning obstacle
#[derive(Debug, Clone)]
pub struct Meteor {
    /// Unrotated source; every frame's image is derived from this
    original: Image,
    image: Image,
    mask: Mask,
    pub rect: Rect,
    pub direction: Vec2,
    pub speed: f32,
    /// Current rotation, degrees counter-clockwise
    pub rotation: f32,
    /// Degrees per second
    pub rotation_speed: f32,
}

impl Meteor {
    pub fn new(
        original: Image,
        midbottom: Vec2,
        direction: Vec2,
        speed: f32,
        rotation_speed: f32,
    ) -> Self {
        Self {
            rect: Rect::from_midbottom(midbottom, original.size()),
            mask: Mask::from_image(&original),
            image: original.clone(),
            original,
            direction,
            speed,
            rotation: 0.0,
            rotation_speed,
        }
    }

    /// Meteor at a random x along the top edge with randomized drift and spin
    pub fn random(original: Image, rng: &mut impl Rng, bounds: Vec2) -> Self {
        let x = rng.random_range(0..=bounds.x as i32) as f32;
        let drift = rng.random_range(-METEOR_DRIFT..=METEOR_DRIFT);
        let spin = rng.random_range(METEOR_SPIN_MIN..=METEOR_SPIN_MAX) as f32;
        Self::new(
            original,
            Vec2::new(x, METEOR_SPAWN_Y),
            Vec2::new(drift, 1.0),
            METEOR_SPEED,
            spin,
        )
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }
}

impl Actor for Meteor {
    fn image(&self) -> &Image {
        &self.image
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn update(&mut self, ctx: &SimContext, _cmds: &mut Commands) -> Fate {
        self.rect.translate(self.direction * self.speed * ctx.dt);
        if self.rect.top() > ctx.bounds.y {
            return Fate::Remove;
        }

        self.rotation += self.rotation_speed * ctx.dt;
        let center = self.rect.center();
        self.image = self.original.rotated(self.rotation);
        self.mask = Mask::from_image(&self.image);
        self.rect = Rect::from_center(center, self.image.size());
        Fate::Keep
    }
}

// ============================================================================
// EXPLOSION
// ============================================================================

/// One-shot frame animation
#[derive(Debug, Clone)]
pub struct Explosion {
    frames: Vec<Image>,
    center: Vec2,
    /// Fractional frame index; only ever increases
    cursor: f32,
    /// Frames per second
    pub rate: f32,
    rect: Rect,
}

impl Explosion {
    pub fn new(frames: Vec<Image>, center: Vec2) -> Self {
        let size = frames.first().map(Image::size).unwrap_or(Vec2::ZERO);
        Self {
            frames,
            center,
            cursor: 0.0,
            rate: EXPLOSION_FPS,
            rect: Rect::from_center(center, size),
        }
    }

    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    /// Frame shown this frame
    pub fn frame_index(&self) -> usize {
        (self.cursor as usize).min(self.frames.len().saturating_sub(1))
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl Actor for Explosion {
    fn image(&self) -> &Image {
        &self.frames[self.frame_index()]
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn update(&mut self, ctx: &SimContext, _cmds: &mut Commands) -> Fate {
        self.cursor += self.rate * ctx.dt;
        let index = self.cursor as usize;
        match self.frames.get(index) {
            Some(frame) => {
                self.rect = Rect::from_center(self.center, frame.size());
                Fate::Keep
            }
            None => Fate::Remove,
        }
    }
}

// ============================================================================
// ENTITY
// ============================================================================

/// Any live entity
#[derive(Debug, Clone)]
pub enum Entity {
    Player(Player),
    Star(Star),
    Laser(Laser),
    Meteor(Meteor),
    Explosion(Explosion),
}

impl Entity {
    pub fn actor(&self) -> &dyn Actor {
        match self {
            Entity::Player(e) => e,
            Entity::Star(e) => e,
            Entity::Laser(e) => e,
            Entity::Meteor(e) => e,
            Entity::Explosion(e) => e,
        }
    }

    pub fn actor_mut(&mut self) -> &mut dyn Actor {
        match self {
            Entity::Player(e) => e,
            Entity::Star(e) => e,
            Entity::Laser(e) => e,
            Entity::Meteor(e) => e,
            Entity::Explosion(e) => e,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Entity::Meteor(_) => Role::Meteor,
            Entity::Laser(_) => Role::Laser,
            _ => Role::Ambient,
        }
    }

    pub fn update(&mut self, ctx: &SimContext, cmds: &mut Commands) -> Fate {
        self.actor_mut().update(ctx, cmds)
    }

    pub fn render(&self, canvas: &mut dyn Canvas) {
        self.actor().render(canvas);
    }

    pub fn rect(&self) -> Rect {
        self.actor().rect()
    }

    pub fn as_player(&self) -> Option<&Player> {
        match self {
            Entity::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut Player> {
        match self {
            Entity::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_meteor(&self) -> Option<&Meteor> {
        match self {
            Entity::Meteor(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_laser(&self) -> Option<&Laser> {
        match self {
            Entity::Laser(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_explosion(&self) -> Option<&Explosion> {
        match self {
            Entity::Explosion(e) => Some(e),
            _ => None,
        }
    }
}
