//! The storage crate for the text search catalog, providing a transactional
//! ordered key-value store.

#![deny(missing_docs)]

pub mod error;
pub mod kv;
pub mod types;

pub use error::{Error, Result};
pub use kv::memory::{MemoryKV, MemoryTransaction};
pub use kv::{KVStore, KVTransaction};
pub use types::{Key, TxnId, TxnMode, TxnState, Value};
