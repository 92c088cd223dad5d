//! Game settings and preferences
//!
//! Persisted as JSON next to the high score table. Missing or broken files
//! fall back to defaults.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    /// Sub-particles per explosion for this preset
    pub fn max_explosion_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 20,
            QualityPreset::Medium => 50,
            QualityPreset::High => 120,
        }
    }
}

impl FromStr for QualityPreset {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(QualityPreset::Low),
            "medium" | "med" => Ok(QualityPreset::Medium),
            "high" => Ok(QualityPreset::High),
            other => Err(SettingsError::UnknownPreset(other.to_string())),
        }
    }
}

/// Error reading or writing a JSON file in the player's data directory
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Json(serde_json::Error),
    UnknownPreset(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "settings I/O failed: {}", e),
            SettingsError::Json(e) => write!(f, "settings JSON invalid: {}", e),
            SettingsError::UnknownPreset(s) => write!(f, "unknown quality preset '{}'", s),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Json(e) => Some(e),
            SettingsError::UnknownPreset(_) => None,
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Json(e)
    }
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SettingsError> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), SettingsError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Master switch for shader effects
    pub use_shaders: bool,
    /// Ageing shaders on explosions (needs `use_shaders`)
    pub use_shaders_for_explosions: bool,
    /// Particle effects (explosions, sparks)
    pub particles: bool,
    /// Explosion particles bounce off the ball
    pub explosion_ball_collision: bool,
    /// Screen shake from earthquake blocks
    pub earthquake: bool,

    // === Accessibility ===
    /// Reduced motion (no shake, no colour split)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            use_shaders: true,
            use_shaders_for_explosions: true,
            particles: true,
            explosion_ball_collision: false,
            earthquake: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;

        // Low preset skips the per-explosion shaders
        if preset == QualityPreset::Low {
            self.use_shaders_for_explosions = false;
        }
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_earthquake(&self) -> bool {
        self.earthquake && !self.reduced_motion
    }

    pub fn explosion_shaders_enabled(&self) -> bool {
        self.use_shaders && self.use_shaders_for_explosions
    }

    /// Sub-particles per explosion; zero with particles off
    pub fn explosion_particles(&self) -> usize {
        self.particle_budget(self.quality.max_explosion_particles())
    }

    /// Sub-particle count for other effects after applying the preset cap
    pub fn particle_budget(&self, requested: usize) -> usize {
        if !self.particles {
            0
        } else {
            requested.min(self.quality.max_explosion_particles())
        }
    }

    pub fn try_load(path: &Path) -> Result<Self, SettingsError> {
        read_json(path)
    }

    /// Load settings, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(SettingsError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        write_json(path, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}
