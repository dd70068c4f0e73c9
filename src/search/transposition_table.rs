//! Bounded transposition table keyed by board fingerprint.
//!
//! Entries keep the searched value, the remaining depth it was searched to,
//! and the first placement of the best turn. Values are not tagged as exact
//! or bound: a value stored after a cutoff is reused as if it were exact.
//! Win and loss values are stored already shifted by the ply they were found
//! at, so a hit at a different ply reuses the original distance to the end.
//! When the table reaches capacity it is cleared wholesale.

use std::collections::HashMap;

use log::trace;

use crate::game_state::game_types::Placement;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTEntry {
    pub key: u64,
    pub depth: u8,
    pub value: f64,
    pub best_move: Option<Placement>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TTStats {
    pub probes: u64,
    pub hits: u64,
    pub stores: u64,
    pub clears: u64,
}

#[derive(Debug, Clone)]
pub struct TranspositionTable {
    entries: HashMap<u64, TTEntry>,
    capacity: usize,
    stats: TTStats,
}

impl TranspositionTable {
    pub const DEFAULT_CAPACITY: usize = 150_000;

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::with_capacity(capacity.min(1 << 16)),
            capacity,
            stats: TTStats::default(),
        }
    }

    /// Drop every entry and reset the counters; called once per decision.
    #[inline]
    pub fn reset(&mut self) {
        self.entries.clear();
        self.stats = TTStats::default();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn stats(&self) -> TTStats {
        self.stats
    }

    pub fn probe(&mut self, key: u64) -> Option<TTEntry> {
        self.stats.probes += 1;
        let hit = self.entries.get(&key).copied();
        if hit.is_some() {
            self.stats.hits += 1;
        }
        hit
    }

    /// Store an entry. A shallower result never replaces a deeper one for the
    /// same key.
    pub fn store(&mut self, entry: TTEntry) {
        self.stats.stores += 1;
        if let Some(existing) = self.entries.get(&entry.key) {
            if entry.depth < existing.depth {
                return;
            }
        } else if self.entries.len() >= self.capacity {
            trace!(
                "transposition table full at {} entries, clearing",
                self.entries.len()
            );
            self.entries.clear();
            self.stats.clears += 1;
        }
        self.entries.insert(entry.key, entry);
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::{TTEntry, TranspositionTable};
    use crate::game_state::game_types::Placement;

    fn entry(key: u64, depth: u8, value: f64) -> TTEntry {
        TTEntry {
            key,
            depth,
            value,
            best_move: Some(Placement::new(1, 2)),
        }
    }

    #[test]
    fn deeper_entries_are_preferred() {
        let mut tt = TranspositionTable::default();
        tt.store(entry(555, 2, 1.0));
        tt.store(entry(555, 1, 9.0));
        assert_eq!(tt.probe(555).expect("exists").value, 1.0);
        tt.store(entry(555, 4, 3.0));
        let got = tt.probe(555).expect("exists");
        assert_eq!(got.depth, 4);
        assert_eq!(got.value, 3.0);
        assert_eq!(got.best_move, Some(Placement::new(1, 2)));

        let stats = tt.stats();
        assert_eq!(stats.probes, 2);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.stores, 3);
    }

    #[test]
    fn full_table_is_cleared_before_inserting() {
        let mut tt = TranspositionTable::with_capacity(3);
        for key in 0..3 {
            tt.store(entry(key, 1, 0.0));
        }
        assert_eq!(tt.len(), 3);
        // Overwriting an existing key does not count as growth.
        tt.store(entry(2, 1, 5.0));
        assert_eq!(tt.stats().clears, 0);

        tt.store(entry(10, 1, 0.0));
        assert_eq!(tt.len(), 1);
        assert_eq!(tt.stats().clears, 1);
        assert!(tt.probe(0).is_none());
        assert!(tt.probe(10).is_some());
    }

    #[test]
    fn reset_forgets_entries_and_counters() {
        let mut tt = TranspositionTable::with_capacity(8);
        tt.store(entry(1, 1, 0.0));
        tt.probe(1);
        tt.reset();
        assert!(tt.is_empty());
        assert_eq!(tt.stats(), Default::default());
    }
}
