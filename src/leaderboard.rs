//! Best-agent leaderboard
//!
//! Keeps the top N evaluated agents by fitness.

use serde::{Deserialize, Serialize};

use crate::sim::EpisodeResult;

/// Default number of entries to keep
pub const MAX_ENTRIES: usize = 10;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Agent label
    pub label: String,
    pub fitness: f64,
    /// Frames the episode lasted
    pub frames: u64,
    pub seed: u64,
}

/// Entries sorted by descending fitness; ties keep arrival order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
    capacity: usize,
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::new(MAX_ENTRIES)
    }
}

impl Leaderboard {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Check if a fitness would make it onto the board
    pub fn qualifies(&self, fitness: f64) -> bool {
        if self.capacity == 0 || !fitness.is_finite() {
            return false;
        }
        if self.entries.len() < self.capacity {
            return true;
        }
        self.entries.last().map(|e| fitness > e.fitness).unwrap_or(true)
    }

    /// Add a result if it qualifies.
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify
    pub fn add(&mut self, label: impl Into<String>, result: &EpisodeResult) -> Option<usize> {
        if !self.qualifies(result.fitness) {
            return None;
        }

        let entry = LeaderboardEntry {
            label: label.into(),
            fitness: result.fitness,
            frames: result.frames,
            seed: result.seed,
        };

        let pos = self.entries.iter().position(|e| result.fitness > e.fitness);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };
        self.entries.truncate(self.capacity);

        log::info!("New rank {} with fitness {:.3}", rank, result.fitness);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best(&self) -> Option<&LeaderboardEntry> {
        self.entries.first()
    }
}
