//! Collision filter policy
//!
//! Each entity type owns one category bit and a default mask computed from a
//! static table: every category except its own and the ones it explicitly
//! excludes. Filters are assigned once when the fixture is created.

use super::body::BodyKind;
use crate::physics::Filter;

/// Category bits
pub mod category {
    pub const BALL: u16 = 1 << 0;
    pub const RACKET: u16 = 1 << 1;
    pub const GROUND: u16 = 1 << 2;
    pub const WALL: u16 = 1 << 3;
    pub const BLOCK: u16 = 1 << 4;
    pub const PARTICLE: u16 = 1 << 5;
    pub const ALL: u16 = 0xFFFF;
}

/// One row of the policy table
struct PolicyEntry {
    kind: BodyKind,
    category: u16,
    excluded: u16,
}

const POLICY: [PolicyEntry; 6] = [
    PolicyEntry {
        kind: BodyKind::Ball,
        category: category::BALL,
        excluded: 0,
    },
    PolicyEntry {
        kind: BodyKind::Racket,
        category: category::RACKET,
        excluded: category::PARTICLE,
    },
    PolicyEntry {
        kind: BodyKind::Ground,
        category: category::GROUND,
        excluded: category::PARTICLE,
    },
    PolicyEntry {
        kind: BodyKind::Wall,
        category: category::WALL,
        excluded: 0,
    },
    PolicyEntry {
        kind: BodyKind::Block,
        category: category::BLOCK,
        excluded: 0,
    },
    PolicyEntry {
        kind: BodyKind::Particle,
        category: category::PARTICLE,
        excluded: category::RACKET,
    },
];

fn entry(kind: BodyKind) -> &'static PolicyEntry {
    // The table covers every kind
    POLICY
        .iter()
        .find(|e| e.kind == kind)
        .unwrap_or(&POLICY[0])
}

/// Category bit of an entity type
pub fn category_of(kind: BodyKind) -> u16 {
    entry(kind).category
}

/// All categories except the type's own and its exclusions
pub fn default_mask(kind: BodyKind) -> u16 {
    let e = entry(kind);
    category::ALL & !e.category & !e.excluded
}

/// Filter for a fixture of the given entity type
pub fn filter_for(kind: BodyKind) -> Filter {
    Filter::new(category_of(kind), default_mask(kind))
}

/// Filter for one sub-particle of an effect.
///
/// With ball collision disabled the ball bit is toggled out of the mask.
pub fn particle_filter(ball_collision_enabled: bool) -> Filter {
    let mut filter = filter_for(BodyKind::Particle);
    if !ball_collision_enabled {
        filter.mask ^= category::BALL;
    }
    filter
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_table_covers_every_kind() {
        for kind in BodyKind::ALL {
            assert_eq!(entry(kind).kind, kind);
            assert_eq!(category_of(kind).count_ones(), 1);
        }
    }

    #[test]
    fn test_particle_mask() {
        let mask = default_mask(BodyKind::Particle);
        assert_eq!(mask & category::PARTICLE, 0);
        assert_eq!(mask & category::RACKET, 0);
        assert_ne!(mask & category::BALL, 0);
        assert_ne!(mask & category::BLOCK, 0);

        let no_ball = particle_filter(false);
        assert_eq!(no_ball.mask & category::BALL, 0);
        assert_eq!(no_ball.mask | category::BALL, mask);
    }

    #[test]
    fn test_ball_hits_blocks_racket_ground() {
        let ball = filter_for(BodyKind::Ball);
        for other in [BodyKind::Block, BodyKind::Racket, BodyKind::Ground, BodyKind::Wall] {
            assert!(ball.should_collide(&filter_for(other)), "{:?}", other);
        }
        assert!(!ball.should_collide(&filter_for(BodyKind::Ball)));
    }

    fn any_kind() -> impl Strategy<Value = BodyKind> {
        (0..BodyKind::ALL.len()).prop_map(|i| BodyKind::ALL[i])
    }

    proptest! {
        #[test]
        fn exclusion_is_symmetric(a in any_kind(), b in any_kind(), ball_flag in any::<bool>()) {
            let fa = if a == BodyKind::Particle { particle_filter(ball_flag) } else { filter_for(a) };
            let fb = if b == BodyKind::Particle { particle_filter(ball_flag) } else { filter_for(b) };
            if fa.mask & fb.category == 0 || fb.mask & fa.category == 0 {
                prop_assert!(!fa.should_collide(&fb));
                prop_assert!(!fb.should_collide(&fa));
            }
            prop_assert_eq!(fa.should_collide(&fb), fb.should_collide(&fa));
        }
    }
}
