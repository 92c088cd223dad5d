//! Level definitions loaded from JSON

use std::fmt;
use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{
    BLOCK_HALF_HEIGHT, BLOCK_HALF_WIDTH, DEFAULT_PAR_TIME_SECS, EARTHQUAKE_DURATION,
    LEVEL_TIME_BONUS_PER_SECOND, PLAYGROUND_WIDTH, SCALE,
};

/// Side effect triggered when a block is destroyed
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockSpecial {
    #[default]
    None,
    /// Screen shake for `duration_ms`
    Earthquake {
        intensity: f32,
        #[serde(default = "default_earthquake_ms")]
        duration_ms: u64,
    },
    /// Scaled gravity plus a colour split for `duration_ms`
    Aberration { gravity_scale: f32, duration_ms: u64 },
    /// Heavier (or lighter) ball for `duration_ms`
    BallDensity { scale: f32, duration_ms: u64 },
}

fn default_earthquake_ms() -> u64 {
    EARTHQUAKE_DURATION.as_millis() as u64
}

fn default_score() -> i64 {
    100
}

fn default_par_time() -> u32 {
    DEFAULT_PAR_TIME_SECS
}

/// One block in a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockPlacement {
    /// Block centre in pixels
    pub position: Vec2,
    #[serde(default = "default_score")]
    pub score: i64,
    #[serde(default)]
    pub special: BlockSpecial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDef {
    pub name: String,
    /// Seconds under which finishing earns a time bonus
    #[serde(default = "default_par_time")]
    pub par_time_secs: u32,
    pub placements: Vec<BlockPlacement>,
}

/// Ordered campaign of levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSet {
    pub levels: Vec<LevelDef>,
}

#[derive(Debug)]
pub enum LevelError {
    Parse(serde_json::Error),
    /// The set contains no levels
    EmptySet,
    /// A level has no blocks and could never be completed
    EmptyLevel { index: usize, name: String },
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Parse(e) => write!(f, "invalid level JSON: {}", e),
            LevelError::EmptySet => write!(f, "level set contains no levels"),
            LevelError::EmptyLevel { index, name } => {
                write!(f, "level {} ({}) has no blocks", index + 1, name)
            }
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for LevelError {
    fn from(e: serde_json::Error) -> Self {
        LevelError::Parse(e)
    }
}

impl LevelSet {
    /// Parse and validate a level set
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let set: LevelSet = serde_json::from_str(json)?;
        set.validate()?;
        log::info!("Loaded {} levels", set.levels.len());
        Ok(set)
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        if self.levels.is_empty() {
            return Err(LevelError::EmptySet);
        }
        for (index, level) in self.levels.iter().enumerate() {
            if level.placements.is_empty() {
                return Err(LevelError::EmptyLevel {
                    index,
                    name: level.name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LevelDef> {
        self.levels.get(index)
    }

    /// Built-in campaign: rows of blocks, one more row per level.
    /// The centre block of the second level shakes the screen; the third
    /// level flips gravity and makes the ball heavy.
    pub fn demo() -> Self {
        let levels = (0..3)
            .map(|i| {
                let mut level = LevelDef::grid(&format!("Level {}", i + 1), 8, 2 + i);
                if i == 1 {
                    let mid = level.placements.len() / 2;
                    level.placements[mid].special = BlockSpecial::Earthquake {
                        intensity: 0.5,
                        duration_ms: 2_000,
                    };
                }
                if i == 2 {
                    level.placements[0].special = BlockSpecial::Aberration {
                        gravity_scale: -0.5,
                        duration_ms: 3_000,
                    };
                    let last = level.placements.len() - 1;
                    level.placements[last].special = BlockSpecial::BallDensity {
                        scale: 4.0,
                        duration_ms: 5_000,
                    };
                }
                level
            })
            .collect();
        Self { levels }
    }
}

impl LevelDef {
    /// Centred grid of `columns` x `rows` blocks starting near the top
    pub fn grid(name: &str, columns: usize, rows: usize) -> Self {
        let block_w = 2.0 * BLOCK_HALF_WIDTH * SCALE;
        let block_h = 2.0 * BLOCK_HALF_HEIGHT * SCALE;
        let gap = 4.0;
        let row_width = columns as f32 * (block_w + gap) - gap;
        let left = 0.5 * (PLAYGROUND_WIDTH - row_width) + 0.5 * block_w;
        let top = 48.0;

        let placements = (0..rows)
            .flat_map(|row| {
                (0..columns).map(move |col| BlockPlacement {
                    position: Vec2::new(
                        left + col as f32 * (block_w + gap),
                        top + row as f32 * (block_h + gap),
                    ),
                    score: 100 + 50 * (rows - 1 - row) as i64,
                    special: BlockSpecial::None,
                })
            })
            .collect();

        Self {
            name: name.to_string(),
            par_time_secs: DEFAULT_PAR_TIME_SECS,
            placements,
        }
    }

    /// Points for finishing after `elapsed`: every whole second left on the
    /// par time is worth `LEVEL_TIME_BONUS_PER_SECOND`
    pub fn time_bonus(&self, elapsed: Duration) -> i64 {
        let par = Duration::from_secs(u64::from(self.par_time_secs));
        par.saturating_sub(elapsed).as_secs() as i64 * LEVEL_TIME_BONUS_PER_SECOND
    }
}

/// Play time of the current level on the simulation clock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelTimer {
    started: Duration,
    stopped: Option<Duration>,
}

impl LevelTimer {
    pub fn start(now: Duration) -> Self {
        Self {
            started: now,
            stopped: None,
        }
    }

    /// Freeze the timer. Later calls keep the first stop time.
    pub fn stop(&mut self, now: Duration) {
        self.stopped.get_or_insert(now);
    }

    pub fn is_running(&self) -> bool {
        self.stopped.is_none()
    }

    pub fn elapsed(&self, now: Duration) -> Duration {
        self.stopped.unwrap_or(now).saturating_sub(self.started)
    }
}
