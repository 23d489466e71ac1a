//! Task-safe wrapper for cooperative callers
//!
//! Serializes access to a [`MemoryStore`] through an async mutex held for
//! the duration of each single operation. Waiting for the lock suspends the
//! task instead of blocking a worker thread.

use crate::error::Result;
use crate::store::MemoryStore;
use std::hash::Hash;
use tokio::sync::Mutex;

/// The storage operation contract for async callers.
///
/// Mirrors [`crate::sync::Storage`] operation for operation. Every method is
/// a potential suspension point while the lock is contended; a caller that
/// drops the future before acquisition simply never executes the operation,
/// so no partial mutation can be observed.
#[allow(async_fn_in_trait)]
pub trait SuspendStorage<K, V>: Send + Sync {
    /// Get the effective value for a key. Does not mutate counts.
    async fn get(&self, key: &K) -> Option<V>;

    /// Set a key to a value, overwriting and updating occurrence counts.
    async fn set(&self, key: K, value: V);

    /// Delete a key. A no-op if the key is absent.
    async fn delete(&self, key: &K);

    /// Count how many keys currently hold `value`; 0 if never stored.
    async fn count(&self, value: &V) -> usize;

    /// Start a (possibly nested) transaction.
    async fn begin(&self);

    /// Commit the innermost transaction, folding it into its parent scope.
    async fn commit(&self) -> Result<()>;

    /// Discard the innermost transaction.
    async fn rollback(&self) -> Result<()>;
}

/// [`MemoryStore`] behind a `tokio::sync::Mutex`.
///
/// Exclusivity is per operation, not per logical transaction, and all
/// callers of one instance share a single transaction stack, exactly as
/// with [`crate::sync::SynchronizedStore`].
pub struct SuspendStore<K, V> {
    inner: Mutex<MemoryStore<K, V>>,
}

impl<K, V> SuspendStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MemoryStore::new()),
        }
    }
}

impl<K, V> Default for SuspendStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> SuspendStorage<K, V> for SuspendStore<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Eq + Hash + Clone + Send,
{
    async fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().await.get(key)
    }

    async fn set(&self, key: K, value: V) {
        self.inner.lock().await.set(key, value);
    }

    async fn delete(&self, key: &K) {
        self.inner.lock().await.delete(key);
    }

    async fn count(&self, value: &V) -> usize {
        self.inner.lock().await.count(value)
    }

    async fn begin(&self) {
        self.inner.lock().await.begin();
    }

    async fn commit(&self) -> Result<()> {
        self.inner.lock().await.commit()
    }

    async fn rollback(&self) -> Result<()> {
        self.inner.lock().await.rollback()
    }
}
