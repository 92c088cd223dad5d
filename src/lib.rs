//! Impact - a ball-and-paddle arcade game core
//!
//! Core modules:
//! - `physics`: Rigid-body world with bitmask filtering and post-solve contacts
//! - `sim`: Entity lifecycle, particle effects, collision evaluation, game state machine
//! - `render`: Rendering sink contract and injected texture/shader resources
//! - `settings`: Player options
//! - `highscores`: Best-score table

pub mod highscores;
pub mod physics;
pub mod render;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    use std::time::Duration;

    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Pixels per physics meter
    pub const SCALE: f32 = 16.0;
    pub const INV_SCALE: f32 = 1.0 / SCALE;

    /// Playground dimensions in pixels
    pub const PLAYGROUND_WIDTH: f32 = 640.0;
    pub const PLAYGROUND_HEIGHT: f32 = 400.0;

    /// Solver iterations per world step (fixed, no adaptive substeps)
    pub const VELOCITY_ITERATIONS: u32 = 100;
    pub const POSITION_ITERATIONS: u32 = 50;

    /// Gravity in m/s² (y axis points down, like screen space)
    pub const GRAVITY: f32 = 9.81;

    /// Contact events kept per physics step
    pub const MAX_CONTACT_POINTS: usize = 512;

    /// Ball defaults (meters, m/s)
    pub const BALL_RADIUS: f32 = 0.5;
    pub const BALL_MIN_SPEED: f32 = 6.0;
    pub const BALL_MAX_SPEED: f32 = 30.0;
    pub const BALL_DENSITY: f32 = 1.0;
    pub const BALL_RESTITUTION: f32 = 0.8;
    pub const BALL_FRICTION: f32 = 0.2;

    /// Racket defaults (meters)
    pub const RACKET_HALF_WIDTH: f32 = 2.5;
    pub const RACKET_HALF_HEIGHT: f32 = 0.4;
    /// Racket centre distance from the bottom edge of the playground (pixels)
    pub const RACKET_BOTTOM_OFFSET: f32 = 32.0;

    /// Block size (meters)
    pub const BLOCK_HALF_WIDTH: f32 = 1.0;
    pub const BLOCK_HALF_HEIGHT: f32 = 0.5;

    /// Wall/ground thickness (meters)
    pub const BOUNDARY_HALF_THICKNESS: f32 = 0.5;

    /// Minimum normal impulse for a ball to destroy a block
    pub const BLOCK_HIT_IMPULSE: f32 = 0.05;
    /// Minimum normal impulse for a racket hit to throw sparks
    pub const RACKET_HIT_IMPULSE: f32 = 0.5;

    /// Gameplay defaults
    pub const DEFAULT_LIVES: u32 = 3;
    pub const DEFAULT_PENALTY: i64 = 100;
    pub const NEW_LIFE_AFTER_POINTS: [i64; 6] = [2_500, 5_000, 10_000, 20_000, 50_000, 100_000];
    pub const NEW_LIFE_AFTER_POINTS_DEFAULT: i64 = 100_000;
    pub const KILLINGS_PER_KILLING_SPREE: usize = 5;
    pub const KILLING_SPREE_BONUS: i64 = 1_000;
    pub const KILLING_SPREE_INTERVAL: Duration = Duration::from_millis(3_000);
    /// Level par time and the bonus per second saved
    pub const DEFAULT_PAR_TIME_SECS: u32 = 60;
    pub const LEVEL_TIME_BONUS_PER_SECOND: i64 = 10;

    /// Post-processing signal durations
    pub const FADE_EFFECT_DURATION: Duration = Duration::from_millis(1_000);
    pub const ABERRATION_EFFECT_DURATION: Duration = Duration::from_millis(250);
    pub const EARTHQUAKE_DURATION: Duration = Duration::from_millis(10_000);
    pub const OVERLAY_DURATION: Duration = Duration::from_millis(1_000);
}

/// Convert a physics position (meters) to screen pixels
#[inline]
pub fn to_pixels(v: Vec2) -> Vec2 {
    v * consts::SCALE
}

/// Convert screen pixels to a physics position (meters)
#[inline]
pub fn to_meters(v: Vec2) -> Vec2 {
    v * consts::INV_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_round_trip() {
        let p = Vec2::new(320.0, 200.0);
        let m = to_meters(p);
        assert!((m.x - 20.0).abs() < 1e-5);
        assert!((to_pixels(m) - p).length() < 1e-4);
    }
}
