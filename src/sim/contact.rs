//! Per-step contact collection
//!
//! The physics engine reports solved contacts through [`ContactListener`].
//! The collector keeps at most [`MAX_CONTACT_POINTS`] of them per step in a
//! buffer allocated once. Anything beyond capacity is dropped and counted.

use glam::Vec2;

use crate::consts::MAX_CONTACT_POINTS;
use crate::physics::{BodyHandle, ContactListener, SolvedContact};

/// One recorded contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    /// World position in meters
    pub position: Vec2,
    /// Unit normal from A toward B
    pub normal: Vec2,
    pub normal_impulse: f32,
    pub tangent_impulse: f32,
    pub separation: f32,
}

impl From<&SolvedContact> for ContactPoint {
    fn from(c: &SolvedContact) -> Self {
        Self {
            body_a: c.body_a,
            body_b: c.body_b,
            position: c.point,
            normal: c.normal,
            normal_impulse: c.normal_impulse,
            tangent_impulse: c.tangent_impulse,
            separation: c.separation,
        }
    }
}

/// Bounded contact buffer, reset at the start of every physics step
#[derive(Debug)]
pub struct ContactCollector {
    points: Vec<ContactPoint>,
    dropped_last_step: usize,
    dropped_total: u64,
}

impl Default for ContactCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactCollector {
    pub const CAPACITY: usize = MAX_CONTACT_POINTS;

    pub fn new() -> Self {
        Self {
            points: Vec::with_capacity(Self::CAPACITY),
            dropped_last_step: 0,
            dropped_total: 0,
        }
    }

    /// Clear the buffer before stepping
    pub fn begin_step(&mut self) {
        if self.dropped_last_step > 0 {
            log::debug!(
                "Contact buffer overflowed: {} contacts dropped last step",
                self.dropped_last_step
            );
        }
        self.points.clear();
        self.dropped_last_step = 0;
    }

    pub fn points(&self) -> &[ContactPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.points.len() >= Self::CAPACITY
    }

    pub fn dropped_last_step(&self) -> usize {
        self.dropped_last_step
    }

    pub fn dropped_total(&self) -> u64 {
        self.dropped_total
    }

    /// Record a contact, dropping it when full
    pub fn record(&mut self, point: ContactPoint) -> bool {
        if self.is_full() {
            self.dropped_last_step += 1;
            self.dropped_total += 1;
            return false;
        }
        self.points.push(point);
        true
    }
}

impl ContactListener for ContactCollector {
    fn post_solve(&mut self, contact: &SolvedContact) {
        self.record(ContactPoint::from(contact));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{BodyDef, World};
    use proptest::prelude::*;

    fn point(world: &mut World, impulse: f32) -> ContactPoint {
        let a = world.create_body(&BodyDef::default());
        let b = world.create_body(&BodyDef::default());
        ContactPoint {
            body_a: a,
            body_b: b,
            position: Vec2::ZERO,
            normal: Vec2::Y,
            normal_impulse: impulse,
            tangent_impulse: 0.0,
            separation: 0.0,
        }
    }

    #[test]
    fn test_begin_step_clears() {
        let mut world = World::new(Vec2::ZERO);
        let mut collector = ContactCollector::new();
        collector.record(point(&mut world, 1.0));
        assert_eq!(collector.len(), 1);
        collector.begin_step();
        assert!(collector.is_empty());
    }

    #[test]
    fn test_overflow_is_counted() {
        let mut world = World::new(Vec2::ZERO);
        let p = point(&mut world, 1.0);
        let mut collector = ContactCollector::new();
        for _ in 0..ContactCollector::CAPACITY + 3 {
            collector.post_solve(&SolvedContact {
                body_a: p.body_a,
                body_b: p.body_b,
                normal: p.normal,
                point: p.position,
                normal_impulse: 1.0,
                tangent_impulse: 0.0,
                separation: 0.0,
            });
        }
        assert_eq!(collector.len(), ContactCollector::CAPACITY);
        assert_eq!(collector.dropped_last_step(), 3);
        collector.begin_step();
        assert_eq!(collector.dropped_last_step(), 0);
        assert_eq!(collector.dropped_total(), 3);
    }

    proptest! {
        #[test]
        fn never_exceeds_capacity(n in 0usize..2000) {
            let mut world = World::new(Vec2::ZERO);
            let p = point(&mut world, 0.5);
            let mut collector = ContactCollector::new();
            let initial_capacity = collector.points.capacity();
            for _ in 0..n {
                collector.record(p);
            }
            prop_assert!(collector.len() <= ContactCollector::CAPACITY);
            prop_assert_eq!(collector.len(), n.min(ContactCollector::CAPACITY));
            prop_assert_eq!(collector.points.capacity(), initial_capacity);
        }
    }
}
