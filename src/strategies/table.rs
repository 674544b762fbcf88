use crate::interface::*;
use std::collections::HashMap;

// Transposition table scoped to a single move computation.

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EntryFlag {
    Exact,
    Upperbound,
    Lowerbound,
    /// Returned by `lookup` when nothing is stored for the hash.
    Invalid,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Entry {
    pub flag: EntryFlag,
    pub value: Evaluation,
    pub depth: u32,
}

impl Entry {
    pub const INVALID: Entry = Entry { flag: EntryFlag::Invalid, value: 0.0, depth: 0 };
}

/// Map from position hash to the last search result stored for it.
///
/// Distinct positions sharing a hash are not detected; the table trusts the
/// hash. There is no eviction: the table is cleared at the start of every
/// move computation instead.
#[derive(Default)]
pub struct TranspositionTable {
    table: HashMap<u64, Entry>,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, hash: u64) -> Entry {
        self.table.get(&hash).copied().unwrap_or(Entry::INVALID)
    }

    /// Last write wins.
    pub fn store(&mut self, hash: u64, entry: Entry) {
        self.table.insert(hash, entry);
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    // Check and update negamax state based on any transposition table hit.
    // Returns Some(value) on an exact match or when the narrowed window is empty.
    // Returns None, updating mutable arguments, if negamax should continue to explore this node.
    pub fn check(
        &self, hash: u64, depth: u32, alpha: &mut Evaluation, beta: &mut Evaluation,
    ) -> Option<Evaluation> {
        let entry = self.lookup(hash);
        if entry.depth < depth {
            return None;
        }
        match entry.flag {
            EntryFlag::Exact => return Some(entry.value),
            EntryFlag::Lowerbound => *alpha = alpha.max(entry.value),
            EntryFlag::Upperbound => *beta = beta.min(entry.value),
            EntryFlag::Invalid => return None,
        }
        if *alpha >= *beta {
            return Some(entry.value);
        }
        None
    }

    // Update table based on negamax results.
    pub fn update(
        &mut self, hash: u64, alpha_orig: Evaluation, beta: Evaluation, depth: u32,
        best: Evaluation,
    ) {
        let flag = if best <= alpha_orig {
            EntryFlag::Upperbound
        } else if best >= beta {
            EntryFlag::Lowerbound
        } else {
            EntryFlag::Exact
        };
        self.store(hash, Entry { flag, value: best, depth });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entries_are_invalid() {
        let mut table = TranspositionTable::new();
        assert_eq!(table.lookup(42).flag, EntryFlag::Invalid);
        table.store(42, Entry { flag: EntryFlag::Exact, value: 0.25, depth: 3 });
        assert_eq!(table.lookup(42).value, 0.25);
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.lookup(42), Entry::INVALID);
    }

    #[test]
    fn last_write_wins() {
        let mut table = TranspositionTable::new();
        table.store(7, Entry { flag: EntryFlag::Exact, value: 0.5, depth: 8 });
        table.store(7, Entry { flag: EntryFlag::Lowerbound, value: -0.5, depth: 1 });
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup(7), Entry { flag: EntryFlag::Lowerbound, value: -0.5, depth: 1 });
    }

    #[test]
    fn shallow_entries_are_ignored() {
        let mut table = TranspositionTable::new();
        table.store(1, Entry { flag: EntryFlag::Exact, value: 0.3, depth: 2 });
        let (mut alpha, mut beta) = (WORST_EVAL, BEST_EVAL);
        assert_eq!(table.check(1, 4, &mut alpha, &mut beta), None);
        assert_eq!(table.check(1, 2, &mut alpha, &mut beta), Some(0.3));
    }

    #[test]
    fn bounds_narrow_the_window() {
        let mut table = TranspositionTable::new();
        table.store(1, Entry { flag: EntryFlag::Lowerbound, value: 0.2, depth: 4 });
        table.store(2, Entry { flag: EntryFlag::Upperbound, value: -0.1, depth: 4 });

        let (mut alpha, mut beta) = (-0.5, 0.5);
        assert_eq!(table.check(1, 4, &mut alpha, &mut beta), None);
        assert_eq!((alpha, beta), (0.2, 0.5));

        let (mut alpha, mut beta) = (-0.5, 0.5);
        assert_eq!(table.check(2, 3, &mut alpha, &mut beta), None);
        assert_eq!((alpha, beta), (-0.5, -0.1));

        // Lower bound at or above beta: cutoff from the cache.
        let (mut alpha, mut beta) = (-0.5, 0.1);
        assert_eq!(table.check(1, 4, &mut alpha, &mut beta), Some(0.2));
    }

    #[test]
    fn update_classifies_bounds() {
        let mut table = TranspositionTable::new();
        table.update(1, 0.0, 0.5, 3, -0.2);
        table.update(2, 0.0, 0.5, 3, 0.7);
        table.update(3, 0.0, 0.5, 3, 0.3);
        assert_eq!(table.lookup(1).flag, EntryFlag::Upperbound);
        assert_eq!(table.lookup(2).flag, EntryFlag::Lowerbound);
        assert_eq!(table.lookup(3).flag, EntryFlag::Exact);
        assert_eq!(table.lookup(3).depth, 3);
    }
}
