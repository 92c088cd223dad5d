//! Rigid-body physics world
//!
//! A small 2D impulse solver that provides exactly what the game core needs:
//! - Static, kinematic and dynamic bodies addressed by generational handles
//! - Circle and axis-aligned box fixtures with category/mask filtering
//! - Fixed-iteration stepping with a post-solve contact callback

pub mod shape;
pub mod world;

pub use shape::{Manifold, Shape, collide};
pub use world::{
    BodyDef, BodyHandle, BodyType, ContactListener, FixtureDef, SolvedContact, Transform, World,
};

/// Collision filter attached to a fixture.
///
/// Two fixtures touch iff each one's category is in the other's mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Filter {
    /// Category bit(s) this fixture belongs to
    pub category: u16,
    /// Categories this fixture is willing to collide with
    pub mask: u16,
}

impl Filter {
    pub const DEFAULT: Self = Self {
        category: 0x0001,
        mask: 0xFFFF,
    };

    pub const fn new(category: u16, mask: u16) -> Self {
        Self { category, mask }
    }

    /// Bidirectional category/mask test
    #[inline]
    pub fn should_collide(&self, other: &Filter) -> bool {
        (self.category & other.mask) != 0 && (other.category & self.mask) != 0
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::DEFAULT
    }
}
