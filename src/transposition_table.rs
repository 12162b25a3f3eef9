//! Open-addressed transposition table.
//!
//! Maps Zobrist position keys to moves with linear probing. Deleted
//! slots become tombstones: lookups probe across them but insertions
//! may reuse them.

use std::fmt;

use crate::board::Move;

/// The table has no free slot left for an insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableFull;

impl fmt::Display for TableFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transposition table is full")
    }
}

impl std::error::Error for TableFull {}

#[derive(Clone, Copy, Debug)]
struct Entry {
    key: u64,
    mv: Move,
    occupied: bool,
    tombstoned: bool,
}

impl Entry {
    const fn vacant() -> Self {
        Entry {
            key: 0,
            mv: Move::null(),
            occupied: false,
            tombstoned: false,
        }
    }
}

/// Fixed-capacity open-addressed hash table keyed by position hash.
pub struct TranspositionTable {
    entries: Vec<Entry>,
    live: usize,
}

impl TranspositionTable {
    /// Create a table with room for `capacity` entries, allocated once.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "transposition table needs a nonzero capacity");
        TranspositionTable {
            entries: vec![Entry::vacant(); capacity],
            live: 0,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Insert a move for `key`, probing linearly from `key % capacity`
    /// and landing on the first empty or tombstoned slot.
    ///
    /// An existing live entry with the same key is never overwritten;
    /// callers wanting replacement delete the key first and re-insert.
    pub fn insert(&mut self, key: u64, mv: Move) -> Result<(), TableFull> {
        if self.live == self.entries.len() {
            return Err(TableFull);
        }

        let mut index = (key % self.entries.len() as u64) as usize;
        while self.entries[index].occupied {
            index += 1;
            if index >= self.entries.len() {
                index = 0;
            }
        }

        self.entries[index] = Entry {
            key,
            mv,
            occupied: true,
            tombstoned: false,
        };
        self.live += 1;
        Ok(())
    }

    /// Look up the move stored for `key`, if a live entry matches.
    ///
    /// Probing skips tombstones and stops at a truly empty slot.
    #[must_use]
    pub fn lookup(&self, key: u64) -> Option<Move> {
        let capacity = self.entries.len();
        let mut index = (key % capacity as u64) as usize;

        for _ in 0..capacity {
            let entry = &self.entries[index];
            if !entry.occupied && !entry.tombstoned {
                return None;
            }
            if entry.occupied && entry.key == key {
                return Some(entry.mv);
            }
            index += 1;
            if index >= capacity {
                index = 0;
            }
        }
        None
    }

    /// Delete the entry for `key`, leaving a tombstone so later probes
    /// keep walking past the slot. Returns whether an entry was removed.
    pub fn delete(&mut self, key: u64) -> bool {
        let capacity = self.entries.len();
        let mut index = (key % capacity as u64) as usize;

        for _ in 0..capacity {
            let entry = &mut self.entries[index];
            if !entry.occupied && !entry.tombstoned {
                return false;
            }
            if entry.occupied && entry.key == key {
                entry.occupied = false;
                entry.tombstoned = true;
                self.live -= 1;
                return true;
            }
            index += 1;
            if index >= capacity {
                index = 0;
            }
        }
        false
    }
}
