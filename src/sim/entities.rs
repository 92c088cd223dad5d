//! Concrete bodies: ball, racket, ground, walls and blocks

use std::time::Duration;

use glam::Vec2;

use super::body::{Body, BodyKind, TimedEntity};
use super::filter::filter_for;
use super::level::BlockSpecial;
use crate::consts::*;
use crate::physics::{BodyDef, BodyType, FixtureDef, Shape, World};
use crate::render::{RenderTarget, Resources, Sprite};
use crate::to_pixels;

/// Playground size in meters
pub fn playground_size() -> Vec2 {
    Vec2::new(PLAYGROUND_WIDTH, PLAYGROUND_HEIGHT) * INV_SCALE
}

fn spawn_static(world: &mut World, kind: BodyKind, position: Vec2, shape: Shape) -> TimedEntity {
    let handle = world.create_body(&BodyDef {
        position,
        ..Default::default()
    });
    let mut fixture = FixtureDef::new(shape);
    fixture.filter = filter_for(kind);
    world.create_fixture(handle, &fixture);
    TimedEntity::new(Some(handle))
}

// ============================================================================
// Ball
// ============================================================================

#[derive(Debug)]
pub struct Ball {
    timed: TimedEntity,
    position: Vec2,
    angle: f32,
}

impl Ball {
    /// Dynamic circle, flagged as a bullet
    pub fn spawn(world: &mut World, position: Vec2, velocity: Vec2) -> Self {
        let handle = world.create_body(&BodyDef {
            body_type: BodyType::Dynamic,
            position,
            linear_velocity: velocity,
            bullet: true,
            ..Default::default()
        });
        world.create_fixture(
            handle,
            &FixtureDef {
                shape: Shape::circle(BALL_RADIUS),
                density: BALL_DENSITY,
                friction: BALL_FRICTION,
                restitution: BALL_RESTITUTION,
                filter: filter_for(BodyKind::Ball),
            },
        );
        log::debug!("Ball spawned at ({:.1}, {:.1})", position.x, position.y);
        Self {
            timed: TimedEntity::new(Some(handle)),
            position,
            angle: 0.0,
        }
    }

    /// Position in meters as of the last update
    pub fn position(&self) -> Vec2 {
        self.position
    }
}

/// Keep a moving ball's speed inside [min, max]; a resting ball stays put
pub fn clamp_ball_speed(velocity: Vec2) -> Vec2 {
    let speed = velocity.length();
    if speed <= f32::EPSILON {
        velocity
    } else if speed > BALL_MAX_SPEED {
        velocity * (BALL_MAX_SPEED / speed)
    } else if speed < BALL_MIN_SPEED {
        velocity * (BALL_MIN_SPEED / speed)
    } else {
        velocity
    }
}

impl Body for Ball {
    fn kind(&self) -> BodyKind {
        BodyKind::Ball
    }

    fn timed(&self) -> &TimedEntity {
        &self.timed
    }

    fn timed_mut(&mut self) -> &mut TimedEntity {
        &mut self.timed
    }

    fn update(&mut self, dt: Duration, world: &mut World) {
        self.timed.tick(dt, world);
        let Some(handle) = self.timed.handle() else {
            return;
        };
        if let Some(t) = world.transform(handle) {
            self.position = t.position;
            self.angle = t.angle;
        }
        if let Some(v) = world.linear_velocity(handle) {
            let clamped = clamp_ball_speed(v);
            if clamped != v {
                world.set_linear_velocity(handle, clamped);
            }
        }
    }

    fn draw(&self, target: &mut dyn RenderTarget, resources: &Resources) {
        let mut sprite = Sprite::new(resources.textures.ball, to_pixels(self.position));
        sprite.rotation = self.angle.to_degrees();
        target.draw(&sprite);
    }
}

// ============================================================================
// Racket
// ============================================================================

#[derive(Debug)]
pub struct Racket {
    timed: TimedEntity,
    position: Vec2,
    /// Horizontal movement requested since the last update (pixels)
    pending: f32,
}

impl Racket {
    /// Kinematic box near the bottom of the playground
    pub fn spawn(world: &mut World) -> Self {
        let size = playground_size();
        let position = Vec2::new(0.5 * size.x, size.y - RACKET_BOTTOM_OFFSET * INV_SCALE);
        let handle = world.create_body(&BodyDef {
            body_type: BodyType::Kinematic,
            position,
            fixed_rotation: true,
            ..Default::default()
        });
        world.create_fixture(
            handle,
            &FixtureDef {
                shape: Shape::rect(RACKET_HALF_WIDTH, RACKET_HALF_HEIGHT),
                density: 0.0,
                friction: 0.4,
                restitution: 0.1,
                filter: filter_for(BodyKind::Racket),
            },
        );
        Self {
            timed: TimedEntity::new(Some(handle)),
            position,
            pending: 0.0,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Queue a horizontal paddle movement in pixels
    pub fn push(&mut self, delta_px: f32) {
        self.pending += delta_px;
    }

    /// Horizontal target after applying `delta` meters, kept inside the walls
    pub fn target_x(&self, delta: f32) -> f32 {
        let min = RACKET_HALF_WIDTH;
        let max = playground_size().x - RACKET_HALF_WIDTH;
        (self.position.x + delta).clamp(min, max)
    }
}

impl Body for Racket {
    fn kind(&self) -> BodyKind {
        BodyKind::Racket
    }

    fn timed(&self) -> &TimedEntity {
        &self.timed
    }

    fn timed_mut(&mut self) -> &mut TimedEntity {
        &mut self.timed
    }

    fn update(&mut self, dt: Duration, world: &mut World) {
        self.timed.tick(dt, world);
        let Some(handle) = self.timed.handle() else {
            return;
        };
        if let Some(p) = world.position(handle) {
            self.position = p;
        }

        // Velocity that reaches the target during the next step
        let secs = dt.as_secs_f32();
        let delta = std::mem::take(&mut self.pending) * INV_SCALE;
        let vx = if secs > 0.0 {
            (self.target_x(delta) - self.position.x) / secs
        } else {
            0.0
        };
        world.set_linear_velocity(handle, Vec2::new(vx, 0.0));
    }

    fn draw(&self, target: &mut dyn RenderTarget, resources: &Resources) {
        target.draw(&Sprite::new(
            resources.textures.racket,
            to_pixels(self.position),
        ));
    }
}

// ============================================================================
// Ground and walls
// ============================================================================

/// Static strip below the bottom edge; touching it loses the ball
#[derive(Debug)]
pub struct Ground {
    timed: TimedEntity,
}

impl Ground {
    pub fn spawn(world: &mut World) -> Self {
        let size = playground_size();
        let position = Vec2::new(0.5 * size.x, size.y + BOUNDARY_HALF_THICKNESS);
        let shape = Shape::rect(0.5 * size.x + BOUNDARY_HALF_THICKNESS, BOUNDARY_HALF_THICKNESS);
        Self {
            timed: spawn_static(world, BodyKind::Ground, position, shape),
        }
    }
}

impl Body for Ground {
    fn kind(&self) -> BodyKind {
        BodyKind::Ground
    }

    fn timed(&self) -> &TimedEntity {
        &self.timed
    }

    fn timed_mut(&mut self) -> &mut TimedEntity {
        &mut self.timed
    }

    fn update(&mut self, dt: Duration, world: &mut World) {
        self.timed.tick(dt, world);
    }

    fn draw(&self, _target: &mut dyn RenderTarget, _resources: &Resources) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallSide {
    Left,
    Right,
    Top,
}

#[derive(Debug)]
pub struct Wall {
    timed: TimedEntity,
    side: WallSide,
}

impl Wall {
    pub fn spawn(world: &mut World, side: WallSide) -> Self {
        let size = playground_size();
        let t = BOUNDARY_HALF_THICKNESS;
        let (position, shape) = match side {
            WallSide::Left => (Vec2::new(-t, 0.5 * size.y), Shape::rect(t, 0.5 * size.y + 2.0 * t)),
            WallSide::Right => (
                Vec2::new(size.x + t, 0.5 * size.y),
                Shape::rect(t, 0.5 * size.y + 2.0 * t),
            ),
            WallSide::Top => (Vec2::new(0.5 * size.x, -t), Shape::rect(0.5 * size.x + 2.0 * t, t)),
        };
        Self {
            timed: spawn_static(world, BodyKind::Wall, position, shape),
            side,
        }
    }
}

impl Body for Wall {
    fn kind(&self) -> BodyKind {
        BodyKind::Wall
    }

    fn name(&self) -> &'static str {
        match self.side {
            WallSide::Left => "LeftWall",
            WallSide::Right => "RightWall",
            WallSide::Top => "TopWall",
        }
    }

    fn timed(&self) -> &TimedEntity {
        &self.timed
    }

    fn timed_mut(&mut self) -> &mut TimedEntity {
        &mut self.timed
    }

    fn update(&mut self, dt: Duration, world: &mut World) {
        self.timed.tick(dt, world);
    }

    fn draw(&self, _target: &mut dyn RenderTarget, _resources: &Resources) {}
}

// ============================================================================
// Block
// ============================================================================

#[derive(Debug)]
pub struct Block {
    timed: TimedEntity,
    position: Vec2,
    score: i64,
    special: BlockSpecial,
}

impl Block {
    /// Static box; `position` in meters
    pub fn spawn(world: &mut World, position: Vec2, score: i64, special: BlockSpecial) -> Self {
        let shape = Shape::rect(BLOCK_HALF_WIDTH, BLOCK_HALF_HEIGHT);
        Self {
            timed: spawn_static(world, BodyKind::Block, position, shape),
            position,
            score,
            special,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn special(&self) -> BlockSpecial {
        self.special
    }
}

impl Body for Block {
    fn kind(&self) -> BodyKind {
        BodyKind::Block
    }

    fn timed(&self) -> &TimedEntity {
        &self.timed
    }

    fn timed_mut(&mut self) -> &mut TimedEntity {
        &mut self.timed
    }

    fn update(&mut self, dt: Duration, world: &mut World) {
        self.timed.tick(dt, world);
    }

    fn draw(&self, target: &mut dyn RenderTarget, resources: &Resources) {
        target.draw(&Sprite::new(
            resources.textures.block,
            to_pixels(self.position),
        ));
    }
}
