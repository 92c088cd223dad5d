//! Simulation bodies and the timed lifecycle shared by every entity
//!
//! Every entity owns its physics handle(s) exclusively. Killing an entity
//! releases its handle immediately (Alive → Dying); the registry removes it
//! later in the frame (Dying → Reaped).

use std::time::Duration;

use crate::physics::{BodyHandle, World};
use crate::render::{RenderTarget, Resources};

/// Closed set of entity types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKind {
    Ball,
    Racket,
    Ground,
    Wall,
    Block,
    Particle,
}

impl BodyKind {
    pub const ALL: [BodyKind; 6] = [
        BodyKind::Ball,
        BodyKind::Racket,
        BodyKind::Ground,
        BodyKind::Wall,
        BodyKind::Block,
        BodyKind::Particle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BodyKind::Ball => "Ball",
            BodyKind::Racket => "Racket",
            BodyKind::Ground => "Ground",
            BodyKind::Wall => "Wall",
            BodyKind::Block => "Block",
            BodyKind::Particle => "Particle",
        }
    }
}

/// Lifecycle of a timed entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Alive,
    /// Kill requested, physics released, waiting for the reap pass
    Dying,
    /// Removed from the registry
    Reaped,
}

/// Age clock, optional lifetime and kill state
#[derive(Debug, Clone, Default)]
pub struct TimedEntity {
    age: Duration,
    lifetime: Option<Duration>,
    lifecycle: Lifecycle,
    handle: Option<BodyHandle>,
}

impl TimedEntity {
    pub fn new(handle: Option<BodyHandle>) -> Self {
        Self {
            handle,
            ..Default::default()
        }
    }

    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    pub fn age(&self) -> Duration {
        self.age
    }

    pub fn lifetime(&self) -> Option<Duration> {
        self.lifetime
    }

    pub fn set_lifetime(&mut self, lifetime: Option<Duration>) {
        self.lifetime = lifetime;
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_alive(&self) -> bool {
        self.lifecycle == Lifecycle::Alive
    }

    pub fn handle(&self) -> Option<BodyHandle> {
        self.handle
    }

    /// True once the age has passed the lifetime
    pub fn is_overage(&self) -> bool {
        self.lifetime.is_some_and(|lifetime| self.age > lifetime)
    }

    /// Advance the age clock. Dead entities stop ageing.
    pub fn advance(&mut self, dt: Duration) {
        if self.is_alive() {
            self.age += dt;
        }
    }

    /// Advance and kill on overage within the same call
    pub fn tick(&mut self, dt: Duration, world: &mut World) {
        self.advance(dt);
        if self.is_alive() && self.is_overage() {
            self.kill(world);
        }
    }

    /// Alive → Dying, releasing the physics handle. Returns false if the
    /// entity was not alive.
    pub fn kill(&mut self, world: &mut World) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.release(world);
        self.lifecycle = Lifecycle::Dying;
        true
    }

    /// Destroy the physics body if it is still held
    pub fn release(&mut self, world: &mut World) {
        if let Some(handle) = self.handle.take() {
            world.destroy_body(handle);
        }
    }

    pub(crate) fn mark_reaped(&mut self) {
        debug_assert_eq!(self.lifecycle, Lifecycle::Dying, "reaping an entity that was not dying");
        self.lifecycle = Lifecycle::Reaped;
    }
}

/// Capability set shared by every entity: update, draw, kind
pub trait Body {
    fn kind(&self) -> BodyKind;

    /// Diagnostic label
    fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    fn timed(&self) -> &TimedEntity;
    fn timed_mut(&mut self) -> &mut TimedEntity;

    fn update(&mut self, dt: Duration, world: &mut World);
    fn draw(&self, target: &mut dyn RenderTarget, resources: &Resources);

    /// Every physics handle this entity currently owns
    fn handles(&self) -> Vec<BodyHandle> {
        self.timed().handle().into_iter().collect()
    }

    /// Whether the entity still holds physics. A live entity without
    /// physics violates the lifecycle invariant.
    fn has_physics(&self) -> bool {
        self.timed().handle().is_some()
    }

    fn is_alive(&self) -> bool {
        self.timed().is_alive()
    }

    /// Request death: releases physics synchronously
    fn kill(&mut self, world: &mut World) -> bool {
        self.timed_mut().kill(world)
    }

    /// Release any physics still held (no-op after `kill`)
    fn release(&mut self, world: &mut World) {
        self.timed_mut().release(world);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::BodyDef;
    use glam::Vec2;

    #[test]
    fn test_overage_kills_in_same_tick() {
        let mut world = World::new(Vec2::ZERO);
        let handle = world.create_body(&BodyDef::default());
        let mut timed = TimedEntity::new(Some(handle)).with_lifetime(Duration::from_millis(100));

        timed.tick(Duration::from_millis(100), &mut world);
        assert!(timed.is_alive(), "age == lifetime is not overage");

        timed.tick(Duration::from_millis(1), &mut world);
        assert_eq!(timed.lifecycle(), Lifecycle::Dying);
        assert!(timed.handle().is_none());
        assert!(!world.is_alive(handle));
    }

    #[test]
    fn test_kill_releases_once() {
        let mut world = World::new(Vec2::ZERO);
        let handle = world.create_body(&BodyDef::default());
        let mut timed = TimedEntity::new(Some(handle));

        assert!(timed.kill(&mut world));
        assert!(!timed.kill(&mut world));
        timed.release(&mut world);
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn test_dead_entities_stop_ageing() {
        let mut world = World::new(Vec2::ZERO);
        let mut timed = TimedEntity::new(None);
        timed.advance(Duration::from_millis(10));
        timed.kill(&mut world);
        timed.advance(Duration::from_millis(10));
        assert_eq!(timed.age(), Duration::from_millis(10));
    }
}
