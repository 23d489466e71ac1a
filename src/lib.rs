//! txvault - an in-memory key-value store with nested transactions
//!
//! This library provides a generic key-value store with:
//! - Unbounded transaction nesting with commit and rollback
//! - An occurrence-count query (`count`) answered in O(depth)
//! - A thread-safe wrapper built on a readers-writer lock
//! - A task-safe wrapper built on an async mutex
//!
//! # Approach
//!
//! Root state is two hash maps plus a stack of transaction frames:
//! - key -> value for `get`, `set`, `delete`
//! - value -> occurrence count for `count`
//! - the frame stack for transaction support
//!
//! Each frame carries its own overrides (with tombstones marking in-frame
//! deletions) and a differential counter against the enclosing scope. `get`
//! walks the stack innermost-first until a key appears; `set` and `delete`
//! touch only the top frame; `count` folds the whole stack.
//!
//! # Performance
//!
//! Assuming the number of keys vastly exceeds both the per-transaction edit
//! volume and the nesting depth d:
//! - `set`, `delete`, `begin`, `rollback` run in O(1)
//! - `get`, `count` run in O(d)
//! - `commit` runs in O(k), k = keys touched in the committed frame
//!
//! So an arbitrarily long transaction amortizes to O(1) per operation.
//!
//! # Thread safety
//!
//! [`MemoryStore`] itself performs no synchronization; wrap it in
//! [`SynchronizedStore`] for thread-parallel callers or [`SuspendStore`]
//! for task-based callers. Both wrappers serialize individual operations,
//! not whole transactions, and all callers of one instance share a single
//! transaction stack. Per-caller isolation would mean one frame stack per
//! logical caller layered over the same fold algorithm; it is deliberately
//! out of scope here.

pub mod error;
pub mod store;
pub mod suspend;
pub mod sync;

pub use error::{Result, TxVaultError};
pub use store::MemoryStore;
pub use suspend::{SuspendStorage, SuspendStore};
pub use sync::{Storage, SynchronizedStore};
