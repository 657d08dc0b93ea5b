//! Error types for the text search catalog.

use std::fmt;

use thiserror::Error;

use crate::options::FormatError;

/// Kind of object named in a lookup failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Configuration,
    Dictionary,
    Parser,
    TokenType,
    Mapping,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ObjectKind::Configuration => "text search configuration",
            ObjectKind::Dictionary => "text search dictionary",
            ObjectKind::Parser => "token type table for text search parser",
            ObjectKind::TokenType => "token type",
            ObjectKind::Mapping => "mapping for token type",
        };
        f.write_str(label)
    }
}

/// Errors raised by catalog commands.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A name did not resolve to an object.
    #[error("{kind} \"{name}\" does not exist")]
    NotFound { kind: ObjectKind, name: String },

    /// The target name is already taken.
    #[error("{kind} \"{name}\" already exists")]
    AlreadyExists { kind: ObjectKind, name: String },

    /// A stored option list could not be parsed.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The option validator rejected a merged option list.
    #[error("invalid options: {0}")]
    Validation(String),

    /// The command's arguments do not fit the requested operation.
    #[error("{0}")]
    Precondition(String),

    #[error("kv error: {0}")]
    Kv(#[from] tsearch_kv::Error),

    #[error("serialize error: {0}")]
    Serialize(#[from] bincode::Error),

    #[error("invalid catalog key: {0}")]
    InvalidKey(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl CatalogError {
    pub(crate) fn not_found(kind: ObjectKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn already_exists(kind: ObjectKind, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind,
            name: name.into(),
        }
    }
}

/// Type alias for catalog results.
pub type Result<T> = std::result::Result<T, CatalogError>;
