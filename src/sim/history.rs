//! Crash history strip
//!
//! Most recent round first, bounded; the oldest entry is evicted when full.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::consts::HISTORY_LEN;

/// A single completed round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Multiplier the round crashed at
    pub multiplier: f64,
    /// Unique, increasing round id
    pub round_id: u64,
    /// Unix timestamp (ms) of the crash
    pub timestamp_ms: u64,
}

/// Bounded round history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl RoundHistory {
    /// Create empty history keeping at most `capacity` rounds
    ///
    /// `capacity` is clamped to `HISTORY_LEN`.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.min(HISTORY_LEN);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a round as the newest entry
    pub fn push(&mut self, entry: HistoryEntry) {
        if self.capacity == 0 {
            return;
        }
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity.min(HISTORY_LEN));
    }

    /// Entries, newest first
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(round_id: u64) -> HistoryEntry {
        HistoryEntry {
            multiplier: 1.0 + round_id as f64,
            round_id,
            timestamp_ms: round_id * 1000,
        }
    }

    #[test]
    fn test_newest_first() {
        let mut history = RoundHistory::with_capacity(20);
        history.push(entry(1));
        history.push(entry(2));
        assert_eq!(history.latest().map(|e| e.round_id), Some(2));
        let ids: Vec<_> = history.entries().map(|e| e.round_id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_evicts_oldest() {
        let mut history = RoundHistory::with_capacity(20);
        for id in 1..=25 {
            history.push(entry(id));
        }
        assert_eq!(history.len(), 20);
        assert_eq!(history.latest().map(|e| e.round_id), Some(25));
        assert_eq!(history.entries().last().map(|e| e.round_id), Some(6));
    }

    #[test]
    fn test_oversized_capacity_is_clamped() {
        let mut history = RoundHistory::with_capacity(50);
        assert_eq!(history.capacity(), HISTORY_LEN);
        for id in 1..=30 {
            history.push(entry(id));
        }
        assert_eq!(history.len(), HISTORY_LEN);
        assert_eq!(history.latest().map(|e| e.round_id), Some(30));
    }

    #[test]
    fn test_zero_capacity() {
        let mut history = RoundHistory::with_capacity(0);
        history.push(entry(1));
        assert!(history.is_empty());
    }
}
