//! Text search configuration catalog.
//!
//! This crate maintains the per-configuration token-to-dictionary map and the
//! textual option lists attached to configurations and dictionaries.
//!
//! # Components
//!
//! - [`options::codec`]: reproducible text form of an option list
//! - [`options::ConfigurationOptionsEditor`]: incremental set/reset of options
//! - [`token_types::TokenTypeResolver`]: token type names to parser ids
//! - [`mapping::MappingEditor`]: add, override, replace and drop mappings
//! - [`catalog::TextSearchCatalog`]: persistent catalog over a `KVStore`

pub mod catalog;
pub mod config;
pub mod error;
pub mod mapping;
pub mod options;
pub mod token_types;

pub use catalog::{
    AlterConfiguration, AlterOutcome, ConfigurationRecord, ConfigurationSource, DictionaryRecord,
    TextSearchCatalog,
};
pub use config::CatalogConfig;
pub use error::{CatalogError, ObjectKind, Result};
pub use mapping::{
    DictionaryResolver, KvMappingStore, MappingEditor, MappingEntry, MappingOutcome,
    MappingStore, MappingTarget,
};
pub use options::{
    AcceptAll, ConfigurationOptionsEditor, FormatError, KnownKeys, OptionChange, OptionEntry,
    OptionList, OptionValidator,
};
pub use token_types::{
    LexicalCategoryProvider, StaticCategoryProvider, TokenCategory, TokenTypeResolver,
};

/// Numeric identifier of a catalog object (configuration, dictionary, parser).
pub type ObjectId = u32;

/// Numeric identifier of a token type, as reported by a parser.
pub type TokenTypeId = i32;
