//! High score leaderboard
//!
//! Persisted to LocalStorage, tracks the top 10 runs.

use serde::{Deserialize, Serialize};

use crate::platform::storage;
use crate::sim::Rank;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    pub kills: u32,
    /// Wave reached
    pub wave: u32,
    /// Rank of the best combo in the run
    #[serde(default = "default_rank")]
    pub rank: Rank,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

fn default_rank() -> Rank {
    Rank::C
}

/// Finished run submitted to the leaderboard
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub score: u64,
    pub kills: u32,
    pub wave: u32,
    pub rank: Rank,
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    const STORAGE_KEY: &'static str = "ink_blade_highscores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a finished run (if it qualifies)
    /// Returns the place achieved (1-indexed) or None if didn't qualify
    pub fn add_run(&mut self, run: RunSummary, timestamp: f64) -> Option<usize> {
        if !self.qualifies(run.score) {
            return None;
        }

        let entry = HighScoreEntry {
            score: run.score,
            kills: run.kills,
            wave: run.wave,
            rank: run.rank,
            timestamp,
        };

        // Sorted descending by score; ties keep the older run first
        let pos = self.entries.iter().position(|e| run.score > e.score);
        let place = match pos {
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
        Some(place)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best score so far (0 when empty)
    pub fn top_score(&self) -> u64 {
        self.entries.first().map(|e| e.score).unwrap_or(0)
    }

    /// Load from LocalStorage, falling back to an empty table
    pub fn load() -> Self {
        match storage::load_json::<HighScores>(Self::STORAGE_KEY) {
            Ok(Some(scores)) => {
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Ok(None) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("High scores not loaded: {}", e);
                Self::new()
            }
        }
    }

    pub fn save(&self) {
        match storage::save_json(Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("High scores saved ({} entries)", self.entries.len()),
            Err(e) => log::warn!("High scores not saved: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(score: u64) -> RunSummary {
        RunSummary {
            score,
            kills: 3,
            wave: 2,
            rank: Rank::B,
        }
    }

    #[test]
    fn test_zero_never_qualifies() {
        let scores = HighScores::new();
        assert!(!scores.qualifies(0));
        assert_eq!(scores.potential_rank(0), None);
    }

    #[test]
    fn test_sorted_insert() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_run(run(500), 0.0), Some(1));
        assert_eq!(scores.add_run(run(900), 1.0), Some(1));
        assert_eq!(scores.add_run(run(700), 2.0), Some(2));
        // Tie goes below the existing entry
        assert_eq!(scores.add_run(run(700), 3.0), Some(3));
        let order: Vec<u64> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(order, vec![900, 700, 700, 500]);
        assert_eq!(scores.top_score(), 900);
    }

    #[test]
    fn test_table_is_capped() {
        let mut scores = HighScores::new();
        for s in 1..=15 {
            scores.add_run(run(s * 100), 0.0);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert!(!scores.qualifies(100));
        assert_eq!(scores.potential_rank(1550), Some(1));
        assert_eq!(scores.add_run(run(50), 0.0), None);
    }

    #[test]
    fn test_old_entries_without_rank_load() {
        let json = r#"{"entries":[{"score":10,"kills":1,"wave":1,"timestamp":0.0}]}"#;
        let scores: HighScores = serde_json::from_str(json).unwrap();
        assert_eq!(scores.entries[0].rank, Rank::C);
    }
}
