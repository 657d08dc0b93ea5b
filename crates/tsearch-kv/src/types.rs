//! Common types shared by the store and its transactions.

/// A key in the store.
pub type Key = Vec<u8>;

/// A value in the store.
pub type Value = Vec<u8>;

/// A unique transaction identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxnId(pub u64);

/// The access mode of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnMode {
    /// Reads only; writes fail with [`crate::Error::ReadOnly`].
    ReadOnly,
    /// Reads and buffered writes, applied atomically on commit.
    ReadWrite,
}

/// The lifecycle state of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnState {
    /// Open for reads and writes.
    Active,
    /// Writes were applied.
    Committed,
    /// Writes were discarded.
    RolledBack,
}
