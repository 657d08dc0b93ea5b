//! Error and Result types for the key-value store.
use thiserror::Error;

/// A convenience `Result` type.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for key-value store operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested key was not found.
    #[error("key not found")]
    NotFound,

    /// The transaction has already been closed (committed or rolled back).
    #[error("transaction is closed")]
    TxnClosed,

    /// A transaction conflict occurred (optimistic concurrency control failure).
    #[error("transaction conflict")]
    TxnConflict,

    /// A write was attempted through a read-only transaction.
    #[error("transaction is read-only")]
    ReadOnly,

    /// Shared state was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    LockPoisoned,

    /// Stored data has an unexpected shape.
    #[error("invalid format: {0}")]
    InvalidFormat(String),
}
