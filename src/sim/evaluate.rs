//! Collision evaluation
//!
//! Turns one step's contacts into gameplay consequences. Pure: it reads the
//! contacts and the owner table and mutates nothing. The game applies the
//! returned consequences afterwards.

use std::collections::HashSet;

use glam::Vec2;

use super::body::BodyKind;
use super::contact::ContactPoint;
use super::registry::{EntityId, Owner, OwnerLookup};
use crate::consts::{BLOCK_HIT_IMPULSE, RACKET_HIT_IMPULSE};

/// Impulse thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluatorConfig {
    /// A ball must hit a block harder than this to destroy it
    pub block_hit_impulse: f32,
    pub racket_hit_impulse: f32,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            block_hit_impulse: BLOCK_HIT_IMPULSE,
            racket_hit_impulse: RACKET_HIT_IMPULSE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Consequence {
    BlockDestroyed {
        block: EntityId,
        ball: EntityId,
        /// Contact point in meters
        position: Vec2,
    },
    BallLost {
        ball: EntityId,
    },
    RacketHit {
        position: Vec2,
        impulse: f32,
    },
    /// Feedback only; the block survives
    RacketHitBlock {
        block: EntityId,
        position: Vec2,
    },
}

/// Order a pair so that `first` has the given kind
fn pick(a: Owner, b: Owner, first: BodyKind, second: BodyKind) -> Option<(Owner, Owner)> {
    if a.kind == first && b.kind == second {
        Some((a, b))
    } else if b.kind == first && a.kind == second {
        Some((b, a))
    } else {
        None
    }
}

/// Evaluate a step's contacts. Each block is destroyed at most once and
/// each entity pair yields at most one consequence.
pub fn evaluate(
    contacts: &[ContactPoint],
    owners: &impl OwnerLookup,
    config: &EvaluatorConfig,
) -> Vec<Consequence> {
    let mut out = Vec::new();
    let mut seen_pairs: HashSet<(EntityId, EntityId)> = HashSet::new();
    let mut destroyed: HashSet<EntityId> = HashSet::new();
    let mut lost: HashSet<EntityId> = HashSet::new();

    for contact in contacts {
        let (Some(a), Some(b)) = (owners.owner_of(contact.body_a), owners.owner_of(contact.body_b))
        else {
            log::debug!("Contact between unowned bodies ignored");
            continue;
        };

        let impulse = contact.normal_impulse;

        if let Some((ball, block)) = pick(a, b, BodyKind::Ball, BodyKind::Block) {
            if impulse > config.block_hit_impulse
                && !destroyed.contains(&block.id)
                && seen_pairs.insert((ball.id, block.id))
            {
                destroyed.insert(block.id);
                out.push(Consequence::BlockDestroyed {
                    block: block.id,
                    ball: ball.id,
                    position: contact.position,
                });
            }
        } else if let Some((ball, _ground)) = pick(a, b, BodyKind::Ball, BodyKind::Ground) {
            if lost.insert(ball.id) {
                out.push(Consequence::BallLost { ball: ball.id });
            }
        } else if let Some((ball, racket)) = pick(a, b, BodyKind::Ball, BodyKind::Racket) {
            if impulse > config.racket_hit_impulse && seen_pairs.insert((ball.id, racket.id)) {
                out.push(Consequence::RacketHit {
                    position: contact.position,
                    impulse,
                });
            }
        } else if let Some((racket, block)) = pick(a, b, BodyKind::Racket, BodyKind::Block) {
            if seen_pairs.insert((racket.id, block.id)) {
                out.push(Consequence::RacketHitBlock {
                    block: block.id,
                    position: contact.position,
                });
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{BodyDef, BodyHandle, World};
    use std::collections::HashMap;

    #[derive(Default)]
    struct Table(HashMap<BodyHandle, Owner>);

    impl OwnerLookup for Table {
        fn owner_of(&self, handle: BodyHandle) -> Option<Owner> {
            self.0.get(&handle).copied()
        }
    }

    struct Fixture {
        world: World,
        table: Table,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                world: World::new(Vec2::ZERO),
                table: Table::default(),
            }
        }

        fn body(&mut self, id: u64, kind: BodyKind) -> BodyHandle {
            let handle = self.world.create_body(&BodyDef::default());
            self.table.0.insert(
                handle,
                Owner {
                    id: EntityId(id),
                    kind,
                },
            );
            handle
        }
    }

    fn contact(a: BodyHandle, b: BodyHandle, impulse: f32) -> ContactPoint {
        ContactPoint {
            body_a: a,
            body_b: b,
            position: Vec2::new(1.0, 2.0),
            normal: Vec2::Y,
            normal_impulse: impulse,
            tangent_impulse: 0.0,
            separation: 0.0,
        }
    }

    #[test]
    fn test_block_destroyed_once_per_step() {
        let mut f = Fixture::new();
        let ball = f.body(1, BodyKind::Ball);
        let block = f.body(2, BodyKind::Block);
        let contacts = [contact(ball, block, 1.0), contact(block, ball, 2.0)];

        let out = evaluate(&contacts, &f.table, &EvaluatorConfig::default());
        assert_eq!(
            out,
            vec![Consequence::BlockDestroyed {
                block: EntityId(2),
                ball: EntityId(1),
                position: Vec2::new(1.0, 2.0),
            }]
        );
    }

    #[test]
    fn test_soft_touch_is_ignored() {
        let mut f = Fixture::new();
        let ball = f.body(1, BodyKind::Ball);
        let block = f.body(2, BodyKind::Block);
        let config = EvaluatorConfig::default();
        let out = evaluate(
            &[contact(ball, block, config.block_hit_impulse * 0.5)],
            &f.table,
            &config,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_ground_loses_ball_regardless_of_impulse() {
        let mut f = Fixture::new();
        let ball = f.body(1, BodyKind::Ball);
        let ground = f.body(2, BodyKind::Ground);
        let out = evaluate(
            &[contact(ground, ball, 0.0), contact(ball, ground, 0.0)],
            &f.table,
            &EvaluatorConfig::default(),
        );
        assert_eq!(out, vec![Consequence::BallLost { ball: EntityId(1) }]);
    }

    #[test]
    fn test_racket_hit_and_unowned_bodies() {
        let mut f = Fixture::new();
        let ball = f.body(1, BodyKind::Ball);
        let racket = f.body(2, BodyKind::Racket);
        let stray = f.world.create_body(&BodyDef::default());
        let out = evaluate(
            &[contact(ball, racket, 3.0), contact(ball, stray, 3.0)],
            &f.table,
            &EvaluatorConfig::default(),
        );
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0], Consequence::RacketHit { impulse, .. } if impulse == 3.0));
    }

    #[test]
    fn test_racket_touching_block_reported_once() {
        let mut f = Fixture::new();
        let racket = f.body(1, BodyKind::Racket);
        let block = f.body(2, BodyKind::Block);
        let out = evaluate(
            &[contact(racket, block, 0.0), contact(block, racket, 4.0)],
            &f.table,
            &EvaluatorConfig::default(),
        );
        assert_eq!(
            out,
            vec![Consequence::RacketHitBlock {
                block: EntityId(2),
                position: Vec2::new(1.0, 2.0),
            }]
        );
    }

    #[test]
    fn test_particles_never_score() {
        let mut f = Fixture::new();
        let particle = f.body(1, BodyKind::Particle);
        let block = f.body(2, BodyKind::Block);
        let out = evaluate(
            &[contact(particle, block, 10.0)],
            &f.table,
            &EvaluatorConfig::default(),
        );
        assert!(out.is_empty());
    }
}
