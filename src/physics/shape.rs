//! Fixture shapes and narrow-phase contact generation
//!
//! Shapes are centred on their body. Boxes stay axis-aligned, which is all the
//! playground needs (walls, ground, blocks and the racket never rotate).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Contacts are kept while the gap is below this (meters)
pub const LINEAR_SLOP: f32 = 0.005;

/// Collision shape of a fixture
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { radius: f32 },
    /// Axis-aligned box given by its half extents
    Rect { half_extents: Vec2 },
}

impl Shape {
    pub fn circle(radius: f32) -> Self {
        Shape::Circle { radius }
    }

    pub fn rect(half_width: f32, half_height: f32) -> Self {
        Shape::Rect {
            half_extents: Vec2::new(half_width, half_height),
        }
    }

    pub fn area(&self) -> f32 {
        match *self {
            Shape::Circle { radius } => std::f32::consts::PI * radius * radius,
            Shape::Rect { half_extents } => 4.0 * half_extents.x * half_extents.y,
        }
    }

    /// Rotational inertia about the centre for the given mass.
    /// Boxes report zero: they are kept axis-aligned.
    pub fn inertia(&self, mass: f32) -> f32 {
        match *self {
            Shape::Circle { radius } => 0.5 * mass * radius * radius,
            Shape::Rect { .. } => 0.0,
        }
    }
}

/// Result of a narrow-phase test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Manifold {
    /// Unit normal pointing from shape A toward shape B
    pub normal: Vec2,
    /// World-space contact point
    pub point: Vec2,
    /// Signed gap between the shapes (negative when overlapping)
    pub separation: f32,
}

/// Test two shapes placed at `pos_a` and `pos_b`.
///
/// Returns a manifold when the shapes overlap or are within [`LINEAR_SLOP`].
pub fn collide(shape_a: &Shape, pos_a: Vec2, shape_b: &Shape, pos_b: Vec2) -> Option<Manifold> {
    match (*shape_a, *shape_b) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_circle(pos_a, ra, pos_b, rb)
        }
        (Shape::Circle { radius }, Shape::Rect { half_extents }) => {
            circle_rect(pos_a, radius, pos_b, half_extents)
        }
        (Shape::Rect { half_extents }, Shape::Circle { radius }) => {
            circle_rect(pos_b, radius, pos_a, half_extents).map(|m| Manifold {
                normal: -m.normal,
                ..m
            })
        }
        (Shape::Rect { half_extents: ha }, Shape::Rect { half_extents: hb }) => {
            rect_rect(pos_a, ha, pos_b, hb)
        }
    }
}

fn circle_circle(pa: Vec2, ra: f32, pb: Vec2, rb: f32) -> Option<Manifold> {
    let d = pb - pa;
    let dist = d.length();
    let separation = dist - ra - rb;
    if separation > LINEAR_SLOP {
        return None;
    }
    let normal = if dist > f32::EPSILON { d / dist } else { Vec2::Y };
    Some(Manifold {
        normal,
        point: pa + normal * (ra + 0.5 * separation),
        separation,
    })
}

/// Circle (A) against box (B); normal points from the circle into the box
fn circle_rect(pc: Vec2, radius: f32, pb: Vec2, half: Vec2) -> Option<Manifold> {
    let local = pc - pb;
    let clamped = local.clamp(-half, half);

    if clamped == local {
        // Centre is inside the box: push out along the shallowest axis
        let dx = half.x - local.x.abs();
        let dy = half.y - local.y.abs();
        let outward = if dx < dy {
            Vec2::new(local.x.signum(), 0.0)
        } else {
            Vec2::new(0.0, local.y.signum())
        };
        let depth = dx.min(dy);
        return Some(Manifold {
            normal: -outward,
            point: pc,
            separation: -(depth + radius),
        });
    }

    let diff = local - clamped;
    let dist = diff.length();
    let separation = dist - radius;
    if separation > LINEAR_SLOP {
        return None;
    }
    let outward = diff / dist;
    Some(Manifold {
        normal: -outward,
        point: pb + clamped,
        separation,
    })
}

fn rect_rect(pa: Vec2, ha: Vec2, pb: Vec2, hb: Vec2) -> Option<Manifold> {
    let d = pb - pa;
    let overlap = ha + hb - d.abs();
    if overlap.x < -LINEAR_SLOP || overlap.y < -LINEAR_SLOP {
        return None;
    }
    let (normal, depth) = if overlap.x < overlap.y {
        (Vec2::new(sign_or_one(d.x), 0.0), overlap.x)
    } else {
        (Vec2::new(0.0, sign_or_one(d.y)), overlap.y)
    };
    Some(Manifold {
        normal,
        point: 0.5 * (pa + pb),
        separation: -depth,
    })
}

#[inline]
fn sign_or_one(v: f32) -> f32 {
    if v < 0.0 { -1.0 } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_circle_overlap() {
        let a = Shape::circle(1.0);
        let b = Shape::circle(1.0);
        let m = collide(&a, Vec2::ZERO, &b, Vec2::new(1.5, 0.0)).unwrap();
        assert!((m.normal - Vec2::X).length() < 1e-5);
        assert!((m.separation + 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_circle_circle_apart() {
        let a = Shape::circle(1.0);
        assert!(collide(&a, Vec2::ZERO, &a, Vec2::new(3.0, 0.0)).is_none());
    }

    #[test]
    fn test_circle_resting_on_box_top() {
        // Box surface at y = -0.5 (y grows downward); circle sinks slightly into it
        let circle = Shape::circle(0.5);
        let rect = Shape::rect(2.0, 0.5);
        let m = collide(&circle, Vec2::new(0.0, -0.9), &rect, Vec2::ZERO).unwrap();
        // Normal from circle into box points +y
        assert!((m.normal - Vec2::Y).length() < 1e-5);
        assert!((m.separation + 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_box_circle_flips_normal() {
        let circle = Shape::circle(0.5);
        let rect = Shape::rect(2.0, 0.5);
        let m = collide(&rect, Vec2::ZERO, &circle, Vec2::new(0.0, -0.9)).unwrap();
        assert!((m.normal + Vec2::Y).length() < 1e-5);
    }

    #[test]
    fn test_circle_centre_inside_box() {
        let circle = Shape::circle(0.25);
        let rect = Shape::rect(1.0, 1.0);
        let m = collide(&circle, Vec2::new(0.9, 0.0), &rect, Vec2::ZERO).unwrap();
        assert!(m.separation < 0.0);
        // Closest face is +x, so the circle is pushed toward +x (normal into box is -x)
        assert!((m.normal + Vec2::X).length() < 1e-5);
    }

    #[test]
    fn test_rect_rect_shallow_axis() {
        let a = Shape::rect(1.0, 1.0);
        let m = collide(&a, Vec2::ZERO, &a, Vec2::new(1.9, 0.5)).unwrap();
        assert_eq!(m.normal, Vec2::X);
        assert!((m.separation + 0.1).abs() < 1e-5);
    }
}
