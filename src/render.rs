//! Rendering sink contract
//!
//! The core never touches pixels. It hands the renderer sprites (texture,
//! transform, colour, optional shader uniforms). Textures and shaders are
//! owned by the host and injected through [`Resources`].

use glam::Vec2;

/// Host-assigned texture identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureId(pub u32);

/// Host-assigned shader identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u32);

/// Uniforms for the ageing shaders of particle effects
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaderUniforms {
    pub shader: ShaderId,
    /// Seconds since the effect was created
    pub age: f32,
    /// Lifetime of the effect in seconds
    pub max_age: f32,
}

/// One drawable handed to the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub texture: TextureId,
    /// Centre in pixels
    pub position: Vec2,
    /// Degrees
    pub rotation: f32,
    /// RGBA
    pub color: [u8; 4],
    pub shader: Option<ShaderUniforms>,
}

impl Sprite {
    pub fn new(texture: TextureId, position: Vec2) -> Self {
        Self {
            texture,
            position,
            rotation: 0.0,
            color: [255; 4],
            shader: None,
        }
    }
}

/// Where sprites go
pub trait RenderTarget {
    fn draw(&mut self, sprite: &Sprite);
}

/// Collects sprites; used by the headless driver and tests
#[derive(Debug, Default)]
pub struct RecordingTarget {
    pub sprites: Vec<Sprite>,
}

impl RenderTarget for RecordingTarget {
    fn draw(&mut self, sprite: &Sprite) {
        self.sprites.push(sprite.clone());
    }
}

/// Texture ids for every entity type
#[derive(Debug, Clone, Default)]
pub struct Textures {
    pub ball: TextureId,
    pub racket: TextureId,
    pub block: TextureId,
    pub particle: TextureId,
    pub soft_particle: TextureId,
}

/// Round-robin pool of explosion shaders
#[derive(Debug, Clone, Default)]
pub struct ShaderPool {
    shaders: Vec<ShaderId>,
    next: usize,
}

impl ShaderPool {
    pub fn new(shaders: Vec<ShaderId>) -> Self {
        Self { shaders, next: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }

    /// Next shader in rotation, `None` if the pool is empty
    pub fn next_shader(&mut self) -> Option<ShaderId> {
        if self.shaders.is_empty() {
            return None;
        }
        let shader = self.shaders[self.next];
        self.next = (self.next + 1) % self.shaders.len();
        Some(shader)
    }
}

/// Injected presentation resources, owned by the game for its lifetime
#[derive(Debug, Clone, Default)]
pub struct Resources {
    pub textures: Textures,
    pub explosion_shaders: ShaderPool,
    /// Missing shader means particle systems fall back to the alpha fade
    pub particle_system_shader: Option<ShaderId>,
}
