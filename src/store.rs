//! Core in-memory store with nested transaction support
//!
//! `MemoryStore` is single-threaded and performs no synchronization of its
//! own; the wrappers in [`crate::sync`] and [`crate::suspend`] protect it.

use crate::error::{Result, TxVaultError};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;
use tracing::trace;

/// Per-frame record for a key touched inside a transaction.
///
/// A `Tombstone` marks a key deleted within the frame, distinct from the
/// key having no entry at all: an untouched key falls through to the
/// enclosing frame, a tombstoned key must not, even when an outer frame or
/// the root still holds a value for it.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot<V> {
    Present(V),
    Tombstone,
}

/// One level of transaction state: key overrides plus a differential
/// counter recording how this frame shifts each value's occurrence count
/// relative to the enclosing scope. A delta of zero is never stored.
#[derive(Debug)]
struct Frame<K, V> {
    slots: HashMap<K, Slot<V>>,
    deltas: HashMap<V, i64>,
}

impl<K, V> Frame<K, V> {
    fn new() -> Self {
        Self {
            slots: HashMap::new(),
            deltas: HashMap::new(),
        }
    }
}

/// In-memory key-value store with unbounded transaction nesting and an
/// O(depth) occurrence-count query.
///
/// The root state lives in two hash maps: key -> value, and value -> number
/// of keys currently holding that value. Active transactions form a stack of
/// [`Frame`]s; `get` resolves keys innermost-first, `set`/`delete` write only
/// to the top frame, `commit` folds the top frame into its parent (or the
/// root), `rollback` discards it.
///
/// Counts are maintained differentially rather than recomputed, which keeps
/// `set`/`delete` O(1) and `count` O(depth) instead of O(total keys). The
/// assumed workload has far more keys than per-transaction edits, and far
/// more per-transaction edits than nesting levels.
#[derive(Debug)]
pub struct MemoryStore<K, V> {
    root: HashMap<K, V>,
    counter: HashMap<V, i64>,
    frames: Vec<Frame<K, V>>,
}

impl<K, V> Default for MemoryStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> MemoryStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    /// Create an empty store with no active transaction.
    pub fn new() -> Self {
        Self {
            root: HashMap::new(),
            counter: HashMap::new(),
            frames: Vec::new(),
        }
    }

    /// Get the effective value for a key.
    ///
    /// Scans the transaction stack innermost-first; the first frame with an
    /// override for the key decides the result (a tombstone yields `None`).
    /// Falls back to root state when no frame mentions the key.
    ///
    /// Time complexity: O(d) where d is the current nesting depth.
    pub fn get(&self, key: &K) -> Option<V> {
        for frame in self.frames.iter().rev() {
            match frame.slots.get(key) {
                Some(Slot::Present(value)) => return Some(value.clone()),
                Some(Slot::Tombstone) => return None,
                None => {}
            }
        }

        self.root.get(key).cloned()
    }

    /// Set a key to a value, overwriting any previous effective value.
    ///
    /// Time complexity: O(1) amortized (O(d) for the previous-value lookup,
    /// folded into the per-transaction amortized bound).
    pub fn set(&mut self, key: K, value: V) {
        if let Some(previous) = self.get(&key) {
            self.update_counter(previous, -1);
        }

        match self.frames.last_mut() {
            Some(frame) => {
                frame.slots.insert(key, Slot::Present(value.clone()));
            }
            None => {
                self.root.insert(key, value.clone());
            }
        }

        self.update_counter(value, 1);
    }

    /// Delete a key. A no-op on counts if the key is absent, but inside a
    /// transaction a tombstone is recorded regardless, so an outer value
    /// for the key cannot resurface after the frame is folded.
    ///
    /// Time complexity: O(1) amortized.
    pub fn delete(&mut self, key: &K) {
        if let Some(previous) = self.get(key) {
            self.update_counter(previous, -1);
        }

        match self.frames.last_mut() {
            Some(frame) => {
                frame.slots.insert(key.clone(), Slot::Tombstone);
            }
            None => {
                self.root.remove(key);
            }
        }
    }

    /// Count how many keys currently hold `value`, transactions included.
    ///
    /// Sums the root counter entry with every frame's delta for the value.
    /// Returns 0 for a value never stored.
    ///
    /// Time complexity: O(d) where d is the current nesting depth.
    pub fn count(&self, value: &V) -> usize {
        let diff: i64 = self
            .frames
            .iter()
            .filter_map(|frame| frame.deltas.get(value))
            .sum();

        let base = self.counter.get(value).copied().unwrap_or(0);
        let total = base + diff;

        debug_assert!(total >= 0, "occurrence count went negative");
        total.max(0) as usize
    }

    /// Start a new transaction. Nesting is unbounded.
    ///
    /// Time complexity: O(1).
    pub fn begin(&mut self) {
        self.frames.push(Frame::new());
        trace!(depth = self.frames.len(), "transaction started");
    }

    /// Commit the innermost transaction, folding its overrides and counter
    /// deltas into the parent frame, or into root state if it was the only
    /// frame. Child overrides win over parent overrides for the same key;
    /// deltas add algebraically, and entries summing to zero are removed.
    ///
    /// Time complexity: O(k) where k is the number of keys touched in the
    /// committed frame.
    pub fn commit(&mut self) -> Result<()> {
        let frame = self.frames.pop().ok_or(TxVaultError::NotInTransaction)?;

        match self.frames.last_mut() {
            Some(parent) => {
                for (key, slot) in frame.slots {
                    parent.slots.insert(key, slot);
                }
                for (value, diff) in frame.deltas {
                    merge_delta(&mut parent.deltas, value, diff);
                }
            }
            None => {
                for (key, slot) in frame.slots {
                    match slot {
                        Slot::Present(value) => {
                            self.root.insert(key, value);
                        }
                        Slot::Tombstone => {
                            self.root.remove(&key);
                        }
                    }
                }
                for (value, diff) in frame.deltas {
                    merge_delta(&mut self.counter, value, diff);
                }
            }
        }

        trace!(depth = self.frames.len(), "transaction committed");
        Ok(())
    }

    /// Discard the innermost transaction. Observable state reverts to
    /// exactly what it was before the matching `begin`.
    ///
    /// Time complexity: O(1).
    pub fn rollback(&mut self) -> Result<()> {
        self.frames.pop().ok_or(TxVaultError::NotInTransaction)?;
        trace!(depth = self.frames.len(), "transaction rolled back");
        Ok(())
    }

    /// Apply a +/-1 count adjustment for `value` to the innermost counter:
    /// the top frame's deltas, or the root counter outside a transaction.
    fn update_counter(&mut self, value: V, diff: i64) {
        let counter = match self.frames.last_mut() {
            Some(frame) => &mut frame.deltas,
            None => &mut self.counter,
        };

        merge_delta(counter, value, diff);
    }
}

/// Add `diff` to a counter entry, removing the entry when it reaches zero.
/// Neither the root counter nor frame deltas ever store an explicit zero;
/// that keeps `count` on an absent value a hash lookup, not a scan.
fn merge_delta<V>(counter: &mut HashMap<V, i64>, value: V, diff: i64)
where
    V: Eq + Hash,
{
    match counter.entry(value) {
        Entry::Occupied(mut entry) => {
            *entry.get_mut() += diff;
            if *entry.get() == 0 {
                entry.remove();
            }
        }
        Entry::Vacant(entry) => {
            entry.insert(diff);
        }
    }
}
