//! Traits for the key-value storage layer.

use crate::error::Result;
use crate::types::{Key, TxnId, TxnMode, Value};

pub mod memory;

/// A transaction for interacting with the key-value store.
///
/// Transactions provide snapshot isolation. Writes are buffered and become
/// visible to other transactions all at once when the transaction commits.
pub trait KVTransaction<'a> {
    /// Returns the transaction's unique ID.
    fn id(&self) -> TxnId;

    /// Returns the transaction's mode (ReadOnly or ReadWrite).
    fn mode(&self) -> TxnMode;

    /// Retrieves the value for a given key.
    fn get(&mut self, key: &Key) -> Result<Option<Value>>;

    /// Sets a value for a given key.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction is read-only.
    fn put(&mut self, key: Key, value: Value) -> Result<()>;

    /// Deletes a key-value pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction is read-only.
    fn delete(&mut self, key: Key) -> Result<()>;

    /// Returns every pair whose key starts with `prefix`, in key order.
    ///
    /// Buffered writes of this transaction are visible in the result.
    fn scan_prefix(&mut self, prefix: &[u8]) -> Result<Vec<(Key, Value)>>;

    /// Applies all buffered writes atomically.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::TxnConflict`] if a key read or written by this
    /// transaction was committed by another transaction in the meantime.
    fn commit_self(self) -> Result<()>
    where
        Self: Sized;

    /// Discards all buffered writes.
    fn rollback_self(self) -> Result<()>
    where
        Self: Sized;
}

/// The main trait for a key-value storage engine.
pub trait KVStore: Send + Sync {
    /// The transaction type for this store.
    type Transaction<'a>: KVTransaction<'a>
    where
        Self: 'a;

    /// Begins a new transaction.
    fn begin(&self, mode: TxnMode) -> Result<Self::Transaction<'_>>;
}
