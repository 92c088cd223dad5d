//! Particle effects: explosions and radial particle systems
//!
//! An effect owns many small physics bodies. Each sub-particle has its own
//! lifetime; the effect kills itself once every sub-particle is dead or its
//! own age exceeds the longest lifetime.

use std::time::Duration;

use glam::Vec2;
use rand::Rng;

use super::body::{Body, BodyKind, TimedEntity};
use super::filter::particle_filter;
use crate::consts::INV_SCALE;
use crate::physics::{BodyDef, BodyHandle, BodyType, FixtureDef, Shape, World};
use crate::render::{RenderTarget, Resources, ShaderId, ShaderUniforms, Sprite, TextureId};
use crate::to_pixels;

/// Above this many sub-particles the update pass runs on rayon
#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    /// Random direction and speed
    Explosion,
    /// Uniform random angle, rotation follows the body
    ParticleSystem,
}

/// Construction parameters for a particle effect
#[derive(Debug, Clone)]
pub struct ParticleEffectDef {
    pub kind: EffectKind,
    /// Emission point in meters
    pub position: Vec2,
    pub count: usize,
    pub min_lifetime: Duration,
    pub max_lifetime: Duration,
    /// m/s
    pub min_speed: f32,
    pub max_speed: f32,
    pub min_gravity_scale: f32,
    pub max_gravity_scale: f32,
    pub initial_gravity_scale: f32,
    pub density: f32,
    pub restitution: f32,
    pub friction: f32,
    pub linear_damping: f32,
    /// Sub-particle radius in pixels
    pub radius: f32,
    pub texture: TextureId,
    pub ball_collision_enabled: bool,
}

impl ParticleEffectDef {
    pub fn explosion(position: Vec2, texture: TextureId) -> Self {
        Self {
            kind: EffectKind::Explosion,
            position,
            count: 50,
            min_lifetime: Duration::from_millis(300),
            max_lifetime: Duration::from_millis(1_000),
            min_speed: 4.0,
            max_speed: 12.0,
            min_gravity_scale: 1.0,
            max_gravity_scale: 1.0,
            initial_gravity_scale: 1.0,
            density: 5.0,
            restitution: 0.6,
            friction: 0.0,
            linear_damping: 0.5,
            radius: 2.0,
            texture,
            ball_collision_enabled: false,
        }
    }

    /// Short spark burst, used for racket hits
    pub fn sparks(position: Vec2, texture: TextureId) -> Self {
        Self {
            kind: EffectKind::ParticleSystem,
            count: 20,
            min_lifetime: Duration::from_millis(100),
            max_lifetime: Duration::from_millis(400),
            min_speed: 2.0,
            max_speed: 6.0,
            density: 1.0,
            restitution: 0.3,
            linear_damping: 1.0,
            radius: 1.0,
            ..Self::explosion(position, texture)
        }
    }

    fn sample_gravity_scale<R: Rng>(&self, rng: &mut R) -> f32 {
        let (lo, hi) = ordered(self.min_gravity_scale, self.max_gravity_scale);
        if lo == hi {
            self.initial_gravity_scale
        } else {
            rng.random_range(lo..=hi)
        }
    }

    fn sample_lifetime<R: Rng>(&self, rng: &mut R) -> Duration {
        let lo = self.min_lifetime.min(self.max_lifetime).as_millis() as u64;
        let hi = self.min_lifetime.max(self.max_lifetime).as_millis() as u64;
        Duration::from_millis(rng.random_range(lo..=hi))
    }

    fn sample_velocity<R: Rng>(&self, rng: &mut R) -> Vec2 {
        let (lo, hi) = ordered(self.min_speed, self.max_speed);
        let speed = if lo == hi { lo } else { rng.random_range(lo..=hi) };
        match self.kind {
            EffectKind::Explosion => {
                speed * Vec2::new(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0))
            }
            EffectKind::ParticleSystem => {
                let angle: f32 = rng.random_range(0.0..std::f32::consts::TAU);
                speed * Vec2::from_angle(angle)
            }
        }
    }

    fn sample_position<R: Rng>(&self, rng: &mut R) -> Vec2 {
        match self.kind {
            // Up to one pixel of jitter
            EffectKind::Explosion => {
                self.position
                    + INV_SCALE * Vec2::new(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0))
            }
            EffectKind::ParticleSystem => self.position,
        }
    }
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Quadratic ease-in: `change * (t / duration)^2 + begin`
pub fn quad_ease_in(t: f32, begin: f32, change: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return begin + change;
    }
    let x = t / duration;
    change * x * x + begin
}

/// Alpha of a fading sub-particle: 255 at birth, 0 at the end of its lifetime
pub fn fade_alpha(age: Duration, lifetime: Duration) -> u8 {
    let eased = quad_ease_in(age.as_secs_f32(), 0.0, 255.0, lifetime.as_secs_f32());
    255 - eased.clamp(0.0, 255.0) as u8
}

#[derive(Debug, Clone)]
struct SubParticle {
    body: Option<BodyHandle>,
    lifetime: Duration,
    dead: bool,
    position: Vec2,
    rotation: f32,
    alpha: u8,
}

impl SubParticle {
    /// Mark overage particles dead, sync live ones. Returns `dead`.
    /// Body destruction happens later in a serial pass.
    fn step(&mut self, age: Duration, world: &World, fade: bool, rotate: bool) -> bool {
        if self.dead {
            return true;
        }
        if age > self.lifetime {
            self.dead = true;
            return true;
        }
        if let Some(t) = self.body.and_then(|h| world.transform(h)) {
            self.position = to_pixels(t.position);
            if rotate {
                self.rotation = t.angle.to_degrees();
            }
        }
        if fade {
            self.alpha = fade_alpha(age, self.lifetime);
        }
        false
    }
}

/// A burst of short-lived physics particles
#[derive(Debug)]
pub struct ParticleEffect {
    timed: TimedEntity,
    kind: EffectKind,
    texture: TextureId,
    shader: Option<ShaderId>,
    particles: Vec<SubParticle>,
}

impl ParticleEffect {
    /// Create every sub-particle body. `shader` replaces the alpha fade.
    pub fn new<R: Rng>(
        def: &ParticleEffectDef,
        world: &mut World,
        rng: &mut R,
        shader: Option<ShaderId>,
    ) -> Self {
        let filter = particle_filter(def.ball_collision_enabled);
        let shape = Shape::circle(def.radius * INV_SCALE);

        let particles = (0..def.count)
            .map(|_| {
                let lifetime = def.sample_lifetime(rng);
                let handle = world.create_body(&BodyDef {
                    body_type: BodyType::Dynamic,
                    position: def.sample_position(rng),
                    linear_velocity: def.sample_velocity(rng),
                    linear_damping: def.linear_damping,
                    gravity_scale: def.sample_gravity_scale(rng),
                    fixed_rotation: true,
                    ..Default::default()
                });
                world.create_fixture(
                    handle,
                    &FixtureDef {
                        shape,
                        density: def.density,
                        friction: def.friction,
                        restitution: def.restitution,
                        filter,
                    },
                );
                SubParticle {
                    body: Some(handle),
                    lifetime,
                    dead: false,
                    position: to_pixels(def.position),
                    rotation: 0.0,
                    alpha: 255,
                }
            })
            .collect();

        let max_lifetime = def.min_lifetime.max(def.max_lifetime);
        Self {
            timed: TimedEntity::new(None).with_lifetime(max_lifetime),
            kind: def.kind,
            texture: def.texture,
            shader,
            particles,
        }
    }

    pub fn effect_kind(&self) -> EffectKind {
        self.kind
    }

    pub fn shader(&self) -> Option<ShaderId> {
        self.shader
    }

    /// Sub-particles not yet dead
    pub fn live_particles(&self) -> usize {
        self.particles.iter().filter(|p| !p.dead).count()
    }

    fn step_particles(&mut self, world: &World) -> bool {
        let age = self.timed.age();
        let fade = self.shader.is_none();
        let rotate = self.kind == EffectKind::ParticleSystem;

        #[cfg(feature = "parallel")]
        if self.particles.len() >= PARALLEL_THRESHOLD {
            use rayon::prelude::*;
            return self
                .particles
                .par_iter_mut()
                .map(|p| p.step(age, world, fade, rotate))
                .reduce(|| true, |a, b| a && b);
        }

        self.particles
            .iter_mut()
            .fold(true, |all_dead, p| p.step(age, world, fade, rotate) && all_dead)
    }
}

impl Body for ParticleEffect {
    fn kind(&self) -> BodyKind {
        BodyKind::Particle
    }

    fn name(&self) -> &'static str {
        match self.kind {
            EffectKind::Explosion => "Explosion",
            EffectKind::ParticleSystem => "ParticleSystem",
        }
    }

    fn timed(&self) -> &TimedEntity {
        &self.timed
    }

    fn timed_mut(&mut self) -> &mut TimedEntity {
        &mut self.timed
    }

    fn update(&mut self, dt: Duration, world: &mut World) {
        self.timed.advance(dt);
        if !self.timed.is_alive() {
            return;
        }

        let all_dead = self.step_particles(world);

        // Serial phase: the world is not shared while bodies are destroyed
        for p in self.particles.iter_mut().filter(|p| p.dead) {
            if let Some(handle) = p.body.take() {
                world.destroy_body(handle);
            }
        }

        if all_dead || self.timed.is_overage() {
            self.kill(world);
        }
    }

    fn draw(&self, target: &mut dyn RenderTarget, _resources: &Resources) {
        let uniforms = self.shader.map(|shader| ShaderUniforms {
            shader,
            age: self.timed.age().as_secs_f32(),
            max_age: self.timed.lifetime().unwrap_or_default().as_secs_f32(),
        });
        for p in self.particles.iter().filter(|p| !p.dead) {
            target.draw(&Sprite {
                texture: self.texture,
                position: p.position,
                rotation: p.rotation,
                color: [255, 255, 255, p.alpha],
                shader: uniforms,
            });
        }
    }

    fn handles(&self) -> Vec<BodyHandle> {
        self.particles.iter().filter_map(|p| p.body).collect()
    }

    fn has_physics(&self) -> bool {
        self.particles.iter().any(|p| p.body.is_some())
    }

    fn kill(&mut self, world: &mut World) -> bool {
        if !self.timed.is_alive() {
            return false;
        }
        self.release(world);
        self.timed.kill(world)
    }

    fn release(&mut self, world: &mut World) {
        for p in &mut self.particles {
            if let Some(handle) = p.body.take() {
                world.destroy_body(handle);
            }
            p.dead = true;
        }
    }
}
