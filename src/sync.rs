//! Thread-safe wrapper for blocking callers
//!
//! Serializes access to a [`MemoryStore`] through a readers-writer lock:
//! read-only queries may overlap, everything that mutates (transaction
//! boundaries included) is exclusive.

use crate::error::Result;
use crate::store::MemoryStore;
use parking_lot::RwLock;
use std::hash::Hash;

/// The storage operation contract for blocking callers.
///
/// Both this trait and [`crate::suspend::SuspendStorage`] expose the same
/// seven operations and nothing else; callers never see the nesting depth
/// or the store internals.
///
/// Exclusivity is per operation, not per logical transaction: between one
/// caller's `begin` and `commit` the lock is not held, so operations from
/// other callers may interleave, and all callers share one transaction
/// stack. Callers needing whole-transaction atomicity must coordinate
/// among themselves.
pub trait Storage<K, V>: Send + Sync {
    /// Get the effective value for a key. Does not mutate counts.
    fn get(&self, key: &K) -> Option<V>;

    /// Set a key to a value, overwriting and updating occurrence counts.
    fn set(&self, key: K, value: V);

    /// Delete a key. A no-op if the key is absent.
    fn delete(&self, key: &K);

    /// Count how many keys currently hold `value`; 0 if never stored.
    fn count(&self, value: &V) -> usize;

    /// Start a (possibly nested) transaction.
    fn begin(&self);

    /// Commit the innermost transaction, folding it into its parent scope.
    fn commit(&self) -> Result<()>;

    /// Discard the innermost transaction.
    fn rollback(&self) -> Result<()>;
}

/// [`MemoryStore`] behind a `parking_lot::RwLock`.
///
/// `get` and `count` take the read lock and may run concurrently with each
/// other; all other operations take the write lock. parking_lot locks do
/// not poison, so a panicking caller cannot wedge the store for everyone
/// else.
pub struct SynchronizedStore<K, V> {
    inner: RwLock<MemoryStore<K, V>>,
}

impl<K, V> SynchronizedStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStore::new()),
        }
    }
}

impl<K, V> Default for SynchronizedStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Storage<K, V> for SynchronizedStore<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Eq + Hash + Clone + Send + Sync,
{
    fn get(&self, key: &K) -> Option<V> {
        self.inner.read().get(key)
    }

    fn set(&self, key: K, value: V) {
        self.inner.write().set(key, value);
    }

    fn delete(&self, key: &K) {
        self.inner.write().delete(key);
    }

    fn count(&self, value: &V) -> usize {
        self.inner.read().count(value)
    }

    fn begin(&self) {
        self.inner.write().begin();
    }

    fn commit(&self) -> Result<()> {
        self.inner.write().commit()
    }

    fn rollback(&self) -> Result<()> {
        self.inner.write().rollback()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TxVaultError;

    #[test]
    fn operations_through_the_contract() {
        let store = SynchronizedStore::new();

        store.set("foo", 123);
        assert_eq!(store.get(&"foo"), Some(123));
        assert_eq!(store.count(&123), 1);

        store.begin();
        store.delete(&"foo");
        assert_eq!(store.get(&"foo"), None);

        store.rollback().unwrap();
        assert_eq!(store.get(&"foo"), Some(123));

        assert_eq!(store.commit(), Err(TxVaultError::NotInTransaction));
    }

    #[test]
    fn readers_do_not_block_each_other() {
        let store = SynchronizedStore::new();
        store.set("k", 1);

        // hold a read guard while issuing another read through the facade
        let guard = store.inner.read();
        assert_eq!(store.get(&"k"), Some(1));
        assert_eq!(guard.count(&1), 1);
    }
}
