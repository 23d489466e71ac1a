//! Error types for txvault

use thiserror::Error;

/// Result type alias for txvault operations
pub type Result<T> = std::result::Result<T, TxVaultError>;

/// The recoverable conditions a store can report.
///
/// Every other operation is total: absent keys, absent values, and empty
/// stores are valid inputs with well-defined outputs, not errors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxVaultError {
    /// `commit` or `rollback` was called while no transaction was active.
    #[error("not in a transaction")]
    NotInTransaction,
}
