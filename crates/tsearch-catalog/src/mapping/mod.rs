//! Token type to dictionary mappings.
//!
//! A configuration maps each token type to an ordered list of dictionaries.
//! Each list element is one [`MappingEntry`]; the sequence number gives the
//! order in which dictionaries are tried (lowest first).

mod editor;
mod kv_store;

pub use editor::MappingEditor;
pub use kv_store::KvMappingStore;

use crate::error::Result;
use crate::{ObjectId, TokenTypeId};

/// One row of a configuration's token map.
///
/// `(config_id, token_type, seq_no)` is unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MappingEntry {
    pub config_id: ObjectId,
    pub token_type: TokenTypeId,
    pub seq_no: i32,
    pub dict_id: ObjectId,
}

impl MappingEntry {
    pub fn new(config_id: ObjectId, token_type: TokenTypeId, seq_no: i32, dict_id: ObjectId) -> Self {
        Self {
            config_id,
            token_type,
            seq_no,
            dict_id,
        }
    }
}

/// The configuration a mapping command operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingTarget {
    pub config_id: ObjectId,
    /// Parser whose token types the configuration uses.
    pub parser_id: ObjectId,
}

/// Storage for mapping rows.
///
/// Implementations apply a command's operations as one atomic batch; readers
/// see either none or all of them.
pub trait MappingStore {
    /// Inserts a new row.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::AlreadyExists` if the row key is taken.
    fn insert(&mut self, entry: &MappingEntry) -> Result<()>;

    /// Rewrites the row with the same key.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no such row exists.
    fn update(&mut self, entry: &MappingEntry) -> Result<()>;

    /// Deletes all rows of `config_id`, or only those of `token_type`.
    /// Returns the number of rows removed.
    fn delete_where(&mut self, config_id: ObjectId, token_type: Option<TokenTypeId>)
        -> Result<usize>;

    /// Returns all rows of `config_id`, or only those of `token_type`, ordered
    /// by token type then sequence number.
    fn scan(&mut self, config_id: ObjectId, token_type: Option<TokenTypeId>)
        -> Result<Vec<MappingEntry>>;
}

/// Resolves dictionary names to ids.
pub trait DictionaryResolver {
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no dictionary has this name.
    fn resolve_dictionary(&self, name: &str) -> Result<ObjectId>;
}

/// What a mapping command changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingOutcome {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    /// Non-fatal messages, e.g. skipped token types in a permissive drop.
    pub notices: Vec<String>,
}
