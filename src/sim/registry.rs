//! Body registry: owns every entity, defers additions and reaps the dead
//!
//! Frame contract:
//! - `add` during a frame makes the entity eligible from the next frame
//! - `update_all` then `reap_dead` run once per frame, in that order
//! - `reap_dead` is idempotent; a second call in the same frame is a no-op

use std::collections::HashMap;
use std::time::Duration;

use super::body::{Body, BodyKind, TimedEntity};
use super::entities::{Ball, Block, Ground, Racket, Wall};
use super::particles::ParticleEffect;
use crate::physics::{BodyHandle, World};
use crate::render::{RenderTarget, Resources};

/// Stable entity identifier, never reused within a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

/// Entity that owns a physics handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner {
    pub id: EntityId,
    pub kind: BodyKind,
}

/// Resolve the entity owning a physics body
pub trait OwnerLookup {
    fn owner_of(&self, handle: BodyHandle) -> Option<Owner>;
}

/// Closed set of entities the registry can hold
#[derive(Debug)]
pub enum Entity {
    Ball(Ball),
    Racket(Racket),
    Ground(Ground),
    Wall(Wall),
    Block(Block),
    Effect(ParticleEffect),
}

macro_rules! each_entity {
    ($self:expr, $e:ident => $body:expr) => {
        match $self {
            Entity::Ball($e) => $body,
            Entity::Racket($e) => $body,
            Entity::Ground($e) => $body,
            Entity::Wall($e) => $body,
            Entity::Block($e) => $body,
            Entity::Effect($e) => $body,
        }
    };
}

impl Body for Entity {
    fn kind(&self) -> BodyKind {
        each_entity!(self, e => e.kind())
    }

    fn name(&self) -> &'static str {
        each_entity!(self, e => e.name())
    }

    fn timed(&self) -> &TimedEntity {
        each_entity!(self, e => e.timed())
    }

    fn timed_mut(&mut self) -> &mut TimedEntity {
        each_entity!(self, e => e.timed_mut())
    }

    fn update(&mut self, dt: Duration, world: &mut World) {
        each_entity!(self, e => e.update(dt, world))
    }

    fn draw(&self, target: &mut dyn RenderTarget, resources: &Resources) {
        each_entity!(self, e => e.draw(target, resources))
    }

    fn handles(&self) -> Vec<BodyHandle> {
        each_entity!(self, e => e.handles())
    }

    fn has_physics(&self) -> bool {
        each_entity!(self, e => e.has_physics())
    }

    fn kill(&mut self, world: &mut World) -> bool {
        each_entity!(self, e => e.kill(world))
    }

    fn release(&mut self, world: &mut World) {
        each_entity!(self, e => e.release(world))
    }
}

impl Entity {
    pub fn as_ball(&self) -> Option<&Ball> {
        match self {
            Entity::Ball(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_racket_mut(&mut self) -> Option<&mut Racket> {
        match self {
            Entity::Racket(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Entity::Block(b) => Some(b),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Entry {
    id: EntityId,
    entity: Entity,
    /// Handles registered in the owner map when the entity was added
    handles: Vec<BodyHandle>,
}

#[derive(Debug, Default)]
pub struct BodyRegistry {
    active: Vec<Entry>,
    incoming: Vec<Entry>,
    owners: HashMap<BodyHandle, Owner>,
    next_id: u64,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of an entity. It joins the active set at the end of
    /// the current frame.
    pub fn add(&mut self, entity: impl Into<Entity>) -> EntityId {
        let entity = entity.into();
        let id = EntityId(self.next_id);
        self.next_id += 1;

        let handles = entity.handles();
        let owner = Owner {
            id,
            kind: entity.kind(),
        };
        for &handle in &handles {
            self.owners.insert(handle, owner);
        }
        log::debug!("Registered {} #{} ({} bodies)", entity.name(), id.0, handles.len());

        self.incoming.push(Entry {
            id,
            entity,
            handles,
        });
        id
    }

    /// Update every live active entity in insertion order
    pub fn update_all(&mut self, dt: Duration, world: &mut World) {
        for entry in &mut self.active {
            if !entry.entity.is_alive() {
                continue;
            }
            if !entry.entity.has_physics() {
                log::error!(
                    "{} #{} is alive without physics, skipping",
                    entry.entity.name(),
                    entry.id.0
                );
                debug_assert!(false, "live entity without physics");
                continue;
            }
            entry.entity.update(dt, world);
        }
    }

    pub fn draw_all(&self, target: &mut dyn RenderTarget, resources: &Resources) {
        for entry in &self.active {
            if entry.entity.is_alive() {
                entry.entity.draw(target, resources);
            }
        }
    }

    /// Remove dying entities and admit this frame's additions.
    /// Returns how many entities were removed.
    pub fn reap_dead(&mut self, world: &mut World) -> usize {
        let before = self.active.len();
        let owners = &mut self.owners;
        self.active.retain_mut(|entry| {
            if entry.entity.is_alive() {
                return true;
            }
            entry.entity.release(world);
            entry.entity.timed_mut().mark_reaped();
            for handle in &entry.handles {
                owners.remove(handle);
            }
            false
        });
        let reaped = before - self.active.len();
        if reaped > 0 {
            log::debug!("Reaped {} entities", reaped);
        }
        self.active.append(&mut self.incoming);
        reaped
    }

    /// Request death of an entity; physics is released immediately
    pub fn kill(&mut self, id: EntityId, world: &mut World) -> bool {
        self.entry_mut(id)
            .is_some_and(|entry| entry.entity.kill(world))
    }

    /// Kill and drop everything, including pending additions
    pub fn clear(&mut self, world: &mut World) {
        for entry in self.active.iter_mut().chain(self.incoming.iter_mut()) {
            entry.entity.release(world);
        }
        self.active.clear();
        self.incoming.clear();
        self.owners.clear();
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.active
            .iter()
            .chain(self.incoming.iter())
            .find(|e| e.id == id)
            .map(|e| &e.entity)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entry_mut(id).map(|e| &mut e.entity)
    }

    fn entry_mut(&mut self, id: EntityId) -> Option<&mut Entry> {
        self.active
            .iter_mut()
            .chain(self.incoming.iter_mut())
            .find(|e| e.id == id)
    }

    /// Active plus pending entities
    pub fn len(&self) -> usize {
        self.active.len() + self.incoming.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live entities of one kind, pending additions included
    pub fn count_kind(&self, kind: BodyKind) -> usize {
        self.active
            .iter()
            .chain(self.incoming.iter())
            .filter(|e| e.entity.kind() == kind && e.entity.is_alive())
            .count()
    }

    /// Live active entities with their ids
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.active
            .iter()
            .filter(|e| e.entity.is_alive())
            .map(|e| (e.id, &e.entity))
    }
}

impl OwnerLookup for BodyRegistry {
    fn owner_of(&self, handle: BodyHandle) -> Option<Owner> {
        self.owners.get(&handle).copied()
    }
}

impl From<Ball> for Entity {
    fn from(b: Ball) -> Self {
        Entity::Ball(b)
    }
}

impl From<Racket> for Entity {
    fn from(r: Racket) -> Self {
        Entity::Racket(r)
    }
}

impl From<Ground> for Entity {
    fn from(g: Ground) -> Self {
        Entity::Ground(g)
    }
}

impl From<Wall> for Entity {
    fn from(w: Wall) -> Self {
        Entity::Wall(w)
    }
}

impl From<Block> for Entity {
    fn from(b: Block) -> Self {
        Entity::Block(b)
    }
}

impl From<ParticleEffect> for Entity {
    fn from(p: ParticleEffect) -> Self {
        Entity::Effect(p)
    }
}
