//! Gameplay simulation
//!
//! Everything here runs on the frame thread and is deterministic for a
//! given seed and input sequence:
//! - One physics step per Playing frame with fixed solver iterations
//! - Seeded RNG owned by the game
//! - Entities updated in insertion order

pub mod body;
pub mod contact;
pub mod effects;
pub mod entities;
pub mod evaluate;
pub mod filter;
pub mod game;
pub mod level;
pub mod particles;
pub mod registry;

pub use body::{Body, BodyKind, Lifecycle, TimedEntity};
pub use contact::{ContactCollector, ContactPoint};
pub use effects::{AberrationSignal, EarthquakeSignal, FadeDirection, FadeSignal, Overlay};
pub use entities::{Ball, Block, Ground, Racket, Wall, WallSide};
pub use evaluate::{Consequence, EvaluatorConfig, evaluate};
pub use game::{Action, FrameInput, Game, GameEvent, MenuChoice, Playmode, State};
pub use level::{BlockPlacement, BlockSpecial, LevelDef, LevelError, LevelSet, LevelTimer};
pub use particles::{EffectKind, ParticleEffect, ParticleEffectDef};
pub use registry::{BodyRegistry, Entity, EntityId, Owner, OwnerLookup};
