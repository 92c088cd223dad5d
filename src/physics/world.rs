//! Physics world: body storage, fixed-iteration stepping and contact reporting
//!
//! One step runs, in order:
//! 1. Velocity integration (gravity × gravity scale, damping)
//! 2. Contact generation for every filtered fixture pair with a dynamic body
//! 3. `velocity_iterations` sequential-impulse passes (restitution, friction)
//! 4. Position integration
//! 5. Up to `position_iterations` positional-correction passes
//! 6. One `post_solve` callback per contact with the accumulated impulses

use glam::Vec2;

use super::Filter;
use super::shape::{LINEAR_SLOP, Shape, collide};

/// Relative normal speed below which restitution is ignored (m/s)
const VELOCITY_THRESHOLD: f32 = 1.0;
/// Fraction of the remaining overlap resolved per position pass
const BAUMGARTE: f32 = 0.2;
/// Largest positional correction applied in one pass (meters)
const MAX_LINEAR_CORRECTION: f32 = 0.2;

/// Opaque, generational reference to a body in a [`World`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

/// How a body participates in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyType {
    /// Never moves
    #[default]
    Static,
    /// Moves by its velocity, unaffected by contacts and gravity
    Kinematic,
    /// Fully simulated
    Dynamic,
}

/// Body construction parameters
#[derive(Debug, Clone)]
pub struct BodyDef {
    pub body_type: BodyType,
    pub position: Vec2,
    pub angle: f32,
    pub linear_velocity: Vec2,
    pub angular_velocity: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub gravity_scale: f32,
    pub fixed_rotation: bool,
    /// Recorded for callers; continuous collision is not simulated
    pub bullet: bool,
    /// Recorded for callers; bodies never sleep
    pub allow_sleep: bool,
}

impl Default for BodyDef {
    fn default() -> Self {
        Self {
            body_type: BodyType::Static,
            position: Vec2::ZERO,
            angle: 0.0,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            gravity_scale: 1.0,
            fixed_rotation: false,
            bullet: false,
            allow_sleep: true,
        }
    }
}

/// Fixture construction parameters
#[derive(Debug, Clone, Copy)]
pub struct FixtureDef {
    pub shape: Shape,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    pub filter: Filter,
}

impl FixtureDef {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            density: 0.0,
            friction: 0.2,
            restitution: 0.0,
            filter: Filter::DEFAULT,
        }
    }
}

/// Position and rotation of a body
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    pub position: Vec2,
    /// Radians
    pub angle: f32,
}

/// Contact data reported after the solver has run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolvedContact {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    /// Unit normal from A toward B
    pub normal: Vec2,
    pub point: Vec2,
    pub normal_impulse: f32,
    pub tangent_impulse: f32,
    pub separation: f32,
}

/// Receives one callback per touching fixture pair per step
pub trait ContactListener {
    fn post_solve(&mut self, contact: &SolvedContact);
}

impl<F: FnMut(&SolvedContact)> ContactListener for F {
    fn post_solve(&mut self, contact: &SolvedContact) {
        self(contact)
    }
}

#[derive(Debug, Clone)]
struct Fixture {
    shape: Shape,
    density: f32,
    friction: f32,
    restitution: f32,
    filter: Filter,
}

#[derive(Debug, Clone)]
struct RigidBody {
    body_type: BodyType,
    position: Vec2,
    angle: f32,
    linear_velocity: Vec2,
    angular_velocity: f32,
    linear_damping: f32,
    angular_damping: f32,
    gravity_scale: f32,
    fixed_rotation: bool,
    bullet: bool,
    inv_mass: f32,
    inv_inertia: f32,
    fixtures: Vec<Fixture>,
}

impl RigidBody {
    fn from_def(def: &BodyDef) -> Self {
        Self {
            body_type: def.body_type,
            position: def.position,
            angle: def.angle,
            linear_velocity: def.linear_velocity,
            angular_velocity: if def.fixed_rotation {
                0.0
            } else {
                def.angular_velocity
            },
            linear_damping: def.linear_damping,
            angular_damping: def.angular_damping,
            gravity_scale: def.gravity_scale,
            fixed_rotation: def.fixed_rotation,
            bullet: def.bullet,
            inv_mass: 0.0,
            inv_inertia: 0.0,
            fixtures: Vec::new(),
        }
    }

    fn reset_mass(&mut self) {
        self.inv_mass = 0.0;
        self.inv_inertia = 0.0;
        if self.body_type != BodyType::Dynamic {
            return;
        }

        let mut mass = 0.0;
        let mut inertia = 0.0;
        let mut has_rect = false;
        for fixture in &self.fixtures {
            let m = fixture.density * fixture.shape.area();
            mass += m;
            inertia += fixture.shape.inertia(m);
            has_rect |= matches!(fixture.shape, Shape::Rect { .. });
        }
        // A dynamic body always has positive mass
        if mass <= 0.0 {
            mass = 1.0;
        }
        self.inv_mass = 1.0 / mass;
        if !self.fixed_rotation && !has_rect && inertia > 0.0 {
            self.inv_inertia = 1.0 / inertia;
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    body: Option<RigidBody>,
}

/// Per-step solver contact (indices refer to the step's dense body arrays)
#[derive(Debug)]
struct SolverContact {
    a: usize,
    b: usize,
    fixture_a: usize,
    fixture_b: usize,
    normal: Vec2,
    point: Vec2,
    separation: f32,
    r_a: Vec2,
    r_b: Vec2,
    normal_mass: f32,
    tangent_mass: f32,
    velocity_bias: f32,
    friction: f32,
    restitution: f32,
    normal_impulse: f32,
    tangent_impulse: f32,
}

/// The rigid-body world
#[derive(Debug)]
pub struct World {
    gravity: Vec2,
    slots: Vec<Slot>,
    free: Vec<u32>,
    body_count: usize,
}

impl World {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            slots: Vec::new(),
            free: Vec::new(),
            body_count: 0,
        }
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    /// Number of live bodies
    pub fn body_count(&self) -> usize {
        self.body_count
    }

    pub fn create_body(&mut self, def: &BodyDef) -> BodyHandle {
        let body = RigidBody::from_def(def);
        self.body_count += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.body = Some(body);
            BodyHandle {
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 0,
                body: Some(body),
            });
            BodyHandle {
                index: (self.slots.len() - 1) as u32,
                generation: 0,
            }
        }
    }

    /// Attach a fixture. Returns false if the handle is stale.
    pub fn create_fixture(&mut self, handle: BodyHandle, def: &FixtureDef) -> bool {
        let Some(body) = self.body_mut(handle) else {
            return false;
        };
        body.fixtures.push(Fixture {
            shape: def.shape,
            density: def.density,
            friction: def.friction,
            restitution: def.restitution,
            filter: def.filter,
        });
        body.reset_mass();
        true
    }

    /// Destroy a body. Returns false if it was already destroyed.
    pub fn destroy_body(&mut self, handle: BodyHandle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.index as usize) else {
            return false;
        };
        if slot.generation != handle.generation || slot.body.is_none() {
            return false;
        }
        slot.body = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.body_count -= 1;
        true
    }

    pub fn is_alive(&self, handle: BodyHandle) -> bool {
        self.body(handle).is_some()
    }

    pub fn transform(&self, handle: BodyHandle) -> Option<Transform> {
        self.body(handle).map(|b| Transform {
            position: b.position,
            angle: b.angle,
        })
    }

    pub fn position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.body(handle).map(|b| b.position)
    }

    pub fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec2> {
        self.body(handle).map(|b| b.linear_velocity)
    }

    pub fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec2) {
        if let Some(body) = self.body_mut(handle) {
            body.linear_velocity = velocity;
        }
    }

    pub fn set_position(&mut self, handle: BodyHandle, position: Vec2) {
        if let Some(body) = self.body_mut(handle) {
            body.position = position;
        }
    }

    /// Set the density of every fixture and recompute the mass.
    /// Returns false if the handle is stale.
    pub fn set_density(&mut self, handle: BodyHandle, density: f32) -> bool {
        let Some(body) = self.body_mut(handle) else {
            return false;
        };
        for fixture in &mut body.fixtures {
            fixture.density = density;
        }
        body.reset_mass();
        true
    }

    /// Mass in kg; zero for static and kinematic bodies
    pub fn mass(&self, handle: BodyHandle) -> Option<f32> {
        self.body(handle)
            .map(|b| if b.inv_mass > 0.0 { 1.0 / b.inv_mass } else { 0.0 })
    }

    pub fn has_fixed_rotation(&self, handle: BodyHandle) -> bool {
        self.body(handle).is_some_and(|b| b.fixed_rotation)
    }

    pub fn is_bullet(&self, handle: BodyHandle) -> bool {
        self.body(handle).is_some_and(|b| b.bullet)
    }

    /// Filter of the body's first fixture
    pub fn filter(&self, handle: BodyHandle) -> Option<Filter> {
        self.body(handle)
            .and_then(|b| b.fixtures.first())
            .map(|f| f.filter)
    }

    fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.body.as_ref())
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.body.as_mut())
    }

    /// Advance the world by `dt` seconds with fixed solver iteration counts
    pub fn step(
        &mut self,
        dt: f32,
        velocity_iterations: u32,
        position_iterations: u32,
        listener: &mut dyn ContactListener,
    ) {
        if dt <= 0.0 {
            return;
        }

        // Dense view of live bodies for this step
        let handles: Vec<BodyHandle> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.body.is_some())
            .map(|(i, s)| BodyHandle {
                index: i as u32,
                generation: s.generation,
            })
            .collect();

        let gravity = self.gravity;

        // 1. Integrate velocities
        for handle in &handles {
            let Some(body) = self.body_mut(*handle) else {
                continue;
            };
            if body.body_type != BodyType::Dynamic {
                continue;
            }
            body.linear_velocity += gravity * body.gravity_scale * dt;
            body.linear_velocity *= 1.0 / (1.0 + dt * body.linear_damping);
            body.angular_velocity *= 1.0 / (1.0 + dt * body.angular_damping);
        }

        // 2. Contacts
        let mut contacts = self.find_contacts(&handles);
        self.prepare_contacts(&handles, &mut contacts);

        // 3. Velocity solver
        for _ in 0..velocity_iterations {
            for contact in contacts.iter_mut() {
                self.solve_velocity(&handles, contact);
            }
        }

        // 4. Integrate positions
        for handle in &handles {
            let Some(body) = self.body_mut(*handle) else {
                continue;
            };
            if body.body_type == BodyType::Static {
                continue;
            }
            body.position += body.linear_velocity * dt;
            if !body.fixed_rotation {
                body.angle += body.angular_velocity * dt;
            }
        }

        // 5. Position correction
        for _ in 0..position_iterations {
            let mut min_separation = 0.0_f32;
            for contact in &contacts {
                min_separation = min_separation.min(self.solve_position(&handles, contact));
            }
            if min_separation >= -3.0 * LINEAR_SLOP {
                break;
            }
        }

        // 6. Report
        for contact in &contacts {
            listener.post_solve(&SolvedContact {
                body_a: handles[contact.a],
                body_b: handles[contact.b],
                normal: contact.normal,
                point: contact.point,
                normal_impulse: contact.normal_impulse,
                tangent_impulse: contact.tangent_impulse,
                separation: contact.separation,
            });
        }
    }

    fn find_contacts(&self, handles: &[BodyHandle]) -> Vec<SolverContact> {
        let mut contacts = Vec::new();
        for a in 0..handles.len() {
            let Some(body_a) = self.body(handles[a]) else {
                continue;
            };
            for b in (a + 1)..handles.len() {
                let Some(body_b) = self.body(handles[b]) else {
                    continue;
                };
                if body_a.body_type != BodyType::Dynamic && body_b.body_type != BodyType::Dynamic {
                    continue;
                }
                for (ia, fa) in body_a.fixtures.iter().enumerate() {
                    for (ib, fb) in body_b.fixtures.iter().enumerate() {
                        if !fa.filter.should_collide(&fb.filter) {
                            continue;
                        }
                        let Some(m) = collide(&fa.shape, body_a.position, &fb.shape, body_b.position)
                        else {
                            continue;
                        };
                        contacts.push(SolverContact {
                            a,
                            b,
                            fixture_a: ia,
                            fixture_b: ib,
                            normal: m.normal,
                            point: m.point,
                            separation: m.separation,
                            r_a: Vec2::ZERO,
                            r_b: Vec2::ZERO,
                            normal_mass: 0.0,
                            tangent_mass: 0.0,
                            velocity_bias: 0.0,
                            friction: (fa.friction * fb.friction).sqrt(),
                            restitution: fa.restitution.max(fb.restitution),
                            normal_impulse: 0.0,
                            tangent_impulse: 0.0,
                        });
                    }
                }
            }
        }
        contacts
    }

    fn prepare_contacts(&self, handles: &[BodyHandle], contacts: &mut [SolverContact]) {
        for c in contacts.iter_mut() {
            let (Some(a), Some(b)) = (self.body(handles[c.a]), self.body(handles[c.b])) else {
                continue;
            };
            c.r_a = c.point - a.position;
            c.r_b = c.point - b.position;

            let rn_a = cross(c.r_a, c.normal);
            let rn_b = cross(c.r_b, c.normal);
            let k_normal =
                a.inv_mass + b.inv_mass + a.inv_inertia * rn_a * rn_a + b.inv_inertia * rn_b * rn_b;
            c.normal_mass = if k_normal > 0.0 { 1.0 / k_normal } else { 0.0 };

            let tangent = tangent_of(c.normal);
            let rt_a = cross(c.r_a, tangent);
            let rt_b = cross(c.r_b, tangent);
            let k_tangent =
                a.inv_mass + b.inv_mass + a.inv_inertia * rt_a * rt_a + b.inv_inertia * rt_b * rt_b;
            c.tangent_mass = if k_tangent > 0.0 { 1.0 / k_tangent } else { 0.0 };

            let dv = relative_velocity(a, b, c.r_a, c.r_b);
            let vn = dv.dot(c.normal);
            c.velocity_bias = if vn < -VELOCITY_THRESHOLD {
                -c.restitution * vn
            } else {
                0.0
            };
        }
    }

    fn solve_velocity(&mut self, handles: &[BodyHandle], c: &mut SolverContact) {
        let (Some(a), Some(b)) = (self.body(handles[c.a]), self.body(handles[c.b])) else {
            return;
        };
        let (inv_ma, inv_ia, inv_mb, inv_ib) = (a.inv_mass, a.inv_inertia, b.inv_mass, b.inv_inertia);
        let mut va = a.linear_velocity;
        let mut wa = a.angular_velocity;
        let mut vb = b.linear_velocity;
        let mut wb = b.angular_velocity;

        // Friction first, bounded by the current normal impulse
        let tangent = tangent_of(c.normal);
        let dv = vb + cross_sv(wb, c.r_b) - va - cross_sv(wa, c.r_a);
        let vt = dv.dot(tangent);
        let max_friction = c.friction * c.normal_impulse;
        let new_tangent = (c.tangent_impulse - c.tangent_mass * vt).clamp(-max_friction, max_friction);
        let lambda = new_tangent - c.tangent_impulse;
        c.tangent_impulse = new_tangent;
        let p = tangent * lambda;
        va -= p * inv_ma;
        wa -= inv_ia * cross(c.r_a, p);
        vb += p * inv_mb;
        wb += inv_ib * cross(c.r_b, p);

        // Normal impulse with accumulated clamping
        let dv = vb + cross_sv(wb, c.r_b) - va - cross_sv(wa, c.r_a);
        let vn = dv.dot(c.normal);
        let new_normal = (c.normal_impulse - c.normal_mass * (vn - c.velocity_bias)).max(0.0);
        let lambda = new_normal - c.normal_impulse;
        c.normal_impulse = new_normal;
        let p = c.normal * lambda;
        va -= p * inv_ma;
        wa -= inv_ia * cross(c.r_a, p);
        vb += p * inv_mb;
        wb += inv_ib * cross(c.r_b, p);

        if let Some(a) = self.body_mut(handles[c.a]) {
            a.linear_velocity = va;
            a.angular_velocity = wa;
        }
        if let Some(b) = self.body_mut(handles[c.b]) {
            b.linear_velocity = vb;
            b.angular_velocity = wb;
        }
    }

    /// Returns the separation measured before correcting
    fn solve_position(&mut self, handles: &[BodyHandle], c: &SolverContact) -> f32 {
        let (Some(a), Some(b)) = (self.body(handles[c.a]), self.body(handles[c.b])) else {
            return 0.0;
        };
        let (Some(fa), Some(fb)) = (a.fixtures.get(c.fixture_a), b.fixtures.get(c.fixture_b)) else {
            return 0.0;
        };
        let Some(m) = collide(&fa.shape, a.position, &fb.shape, b.position) else {
            return 0.0;
        };
        let inv_sum = a.inv_mass + b.inv_mass;
        if inv_sum <= 0.0 {
            return m.separation;
        }
        let (inv_ma, inv_mb) = (a.inv_mass, b.inv_mass);

        let correction =
            (BAUMGARTE * (m.separation + LINEAR_SLOP)).clamp(-MAX_LINEAR_CORRECTION, 0.0);
        let impulse = m.normal * (-correction / inv_sum);

        if let Some(a) = self.body_mut(handles[c.a]) {
            a.position -= impulse * inv_ma;
        }
        if let Some(b) = self.body_mut(handles[c.b]) {
            b.position += impulse * inv_mb;
        }
        m.separation
    }
}

fn relative_velocity(a: &RigidBody, b: &RigidBody, r_a: Vec2, r_b: Vec2) -> Vec2 {
    b.linear_velocity + cross_sv(b.angular_velocity, r_b)
        - a.linear_velocity
        - cross_sv(a.angular_velocity, r_a)
}

#[inline]
fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Scalar × vector cross product (ω × r)
#[inline]
fn cross_sv(s: f32, v: Vec2) -> Vec2 {
    Vec2::new(-s * v.y, s * v.x)
}

#[inline]
fn tangent_of(normal: Vec2) -> Vec2 {
    Vec2::new(normal.y, -normal.x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball_def(position: Vec2, velocity: Vec2) -> BodyDef {
        BodyDef {
            body_type: BodyType::Dynamic,
            position,
            linear_velocity: velocity,
            ..Default::default()
        }
    }

    fn collect(world: &mut World, dt: f32) -> Vec<SolvedContact> {
        let mut seen = Vec::new();
        let mut listener = |c: &SolvedContact| seen.push(*c);
        world.step(dt, 8, 3, &mut listener);
        seen
    }

    #[test]
    fn test_destroy_is_idempotent_and_generational() {
        let mut world = World::new(Vec2::ZERO);
        let h = world.create_body(&BodyDef::default());
        assert_eq!(world.body_count(), 1);
        assert!(world.destroy_body(h));
        assert!(!world.destroy_body(h));
        assert_eq!(world.body_count(), 0);

        // Slot is reused but the stale handle does not alias the new body
        let h2 = world.create_body(&BodyDef::default());
        assert_ne!(h, h2);
        assert!(!world.is_alive(h));
        assert!(world.is_alive(h2));
    }

    #[test]
    fn test_gravity_scale() {
        let mut world = World::new(Vec2::new(0.0, 10.0));
        let normal = world.create_body(&ball_def(Vec2::ZERO, Vec2::ZERO));
        let floaty = world.create_body(&BodyDef {
            gravity_scale: 0.0,
            ..ball_def(Vec2::new(5.0, 0.0), Vec2::ZERO)
        });
        collect(&mut world, 0.1);
        assert!((world.linear_velocity(normal).unwrap().y - 1.0).abs() < 1e-5);
        assert_eq!(world.linear_velocity(floaty).unwrap(), Vec2::ZERO);
    }

    #[test]
    fn test_ball_bounces_off_static_box() {
        let mut world = World::new(Vec2::ZERO);
        let ball = world.create_body(&ball_def(Vec2::new(0.0, -0.95), Vec2::new(0.0, 10.0)));
        world.create_fixture(
            ball,
            &FixtureDef {
                density: 1.0,
                restitution: 1.0,
                ..FixtureDef::new(Shape::circle(0.5))
            },
        );
        let floor = world.create_body(&BodyDef::default());
        world.create_fixture(floor, &FixtureDef::new(Shape::rect(5.0, 0.5)));

        let contacts = collect(&mut world, 1.0 / 60.0);
        assert_eq!(contacts.len(), 1);
        assert!(contacts[0].normal_impulse > 0.0);
        // Ball now moves up (negative y)
        assert!(world.linear_velocity(ball).unwrap().y < 0.0);
    }

    #[test]
    fn test_filtered_pair_generates_no_contact() {
        let mut world = World::new(Vec2::ZERO);
        let a = world.create_body(&ball_def(Vec2::ZERO, Vec2::ZERO));
        world.create_fixture(
            a,
            &FixtureDef {
                filter: Filter::new(0b01, 0xFFFF ^ 0b10),
                ..FixtureDef::new(Shape::circle(1.0))
            },
        );
        let b = world.create_body(&ball_def(Vec2::new(0.5, 0.0), Vec2::ZERO));
        world.create_fixture(
            b,
            &FixtureDef {
                filter: Filter::new(0b10, 0xFFFF),
                ..FixtureDef::new(Shape::circle(1.0))
            },
        );
        assert!(collect(&mut world, 1.0 / 60.0).is_empty());
    }

    #[test]
    fn test_kinematic_moves_without_gravity() {
        let mut world = World::new(Vec2::new(0.0, 10.0));
        let k = world.create_body(&BodyDef {
            body_type: BodyType::Kinematic,
            linear_velocity: Vec2::new(2.0, 0.0),
            ..Default::default()
        });
        collect(&mut world, 0.5);
        assert_eq!(world.position(k).unwrap(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_density_change_rescales_mass() {
        let mut world = World::new(Vec2::ZERO);
        let ball = world.create_body(&ball_def(Vec2::ZERO, Vec2::ZERO));
        world.create_fixture(
            ball,
            &FixtureDef {
                density: 1.0,
                ..FixtureDef::new(Shape::circle(0.5))
            },
        );
        let base = world.mass(ball).unwrap();
        assert!(base > 0.0);

        assert!(world.set_density(ball, 3.0));
        assert!((world.mass(ball).unwrap() - 3.0 * base).abs() < 1e-5);

        let wall = world.create_body(&BodyDef::default());
        world.create_fixture(wall, &FixtureDef::new(Shape::rect(1.0, 1.0)));
        assert!(world.set_density(wall, 5.0));
        assert_eq!(world.mass(wall), Some(0.0));

        world.destroy_body(ball);
        assert!(!world.set_density(ball, 1.0));
        assert_eq!(world.mass(ball), None);
    }

    #[test]
    fn test_static_pairs_are_skipped() {
        let mut world = World::new(Vec2::ZERO);
        for _ in 0..2 {
            let h = world.create_body(&BodyDef::default());
            world.create_fixture(h, &FixtureDef::new(Shape::rect(1.0, 1.0)));
        }
        assert!(collect(&mut world, 1.0 / 60.0).is_empty());
    }
}
