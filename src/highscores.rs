//! High score leaderboard
//!
//! Tracks the top 10 scores; stored as JSON in the player's data directory.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::settings::{SettingsError, read_json, write_json};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: i64,
    /// Level reached (1-indexed)
    pub level: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard, sorted descending by score
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: i64) -> bool {
        if score <= 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: i64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a score if it qualifies. Returns the rank achieved (1-indexed).
    pub fn add_score(&mut self, score: i64, level: u32, timestamp: f64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            score,
            level,
            timestamp,
        };

        let rank = match self.entries.iter().position(|e| score > e.score) {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<i64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load the table, starting fresh when the file is missing or invalid
    pub fn load(path: &Path) -> Self {
        match read_json::<HighScores>(path) {
            Ok(scores) => {
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Err(e) => {
                log::info!("No high scores loaded ({}), starting fresh", e);
                Self::new()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        write_json(path, self)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

/// Current Unix time in milliseconds
pub fn now_millis() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Format a timestamp relative to `now` (both Unix ms)
pub fn format_date(timestamp: f64, now: f64) -> String {
    let diff_secs = (now - timestamp).max(0.0) / 1000.0;
    let diff_mins = diff_secs / 60.0;
    let diff_hours = diff_mins / 60.0;
    let diff_days = diff_hours / 24.0;

    if diff_days >= 1.0 {
        let days = diff_days.floor() as i64;
        if days == 1 {
            "Yesterday".to_string()
        } else {
            format!("{} days ago", days)
        }
    } else if diff_hours >= 1.0 {
        let hours = diff_hours.floor() as i64;
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if diff_mins >= 1.0 {
        let mins = diff_mins.floor() as i64;
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        "Just now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranking_and_trim() {
        let mut scores = HighScores::new();
        for s in 1..=12 {
            scores.add_score(s * 100, 1, 0.0);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.top_score(), Some(1_200));
        assert!(!scores.qualifies(200));
        assert_eq!(scores.potential_rank(650), Some(7));
        assert_eq!(scores.add_score(5_000, 3, 0.0), Some(1));
    }

    #[test]
    fn test_non_positive_scores_never_qualify() {
        let scores = HighScores::new();
        assert!(!scores.qualifies(0));
        assert!(!scores.qualifies(-100));
    }

    #[test]
    fn test_format_date() {
        let now = 10.0 * 86_400_000.0;
        assert_eq!(format_date(now - 5_000.0, now), "Just now");
        assert_eq!(format_date(now - 90_000.0, now), "1 min ago");
        assert_eq!(format_date(now - 3.0 * 3_600_000.0, now), "3 hours ago");
        assert_eq!(format_date(now - 86_400_000.0, now), "Yesterday");
        assert_eq!(format_date(now - 4.0 * 86_400_000.0, now), "4 days ago");
    }
}
