//! Token type lookup.
//!
//! Every text search parser reports the token types it produces as a table of
//! `(id, alias)` pairs. Mapping commands name token types by alias; this module
//! turns those names into ids.

use std::collections::HashMap;

use crate::error::{CatalogError, ObjectKind, Result};
use crate::{ObjectId, TokenTypeId};

/// Id of the built-in default parser.
pub const DEFAULT_PARSER_ID: ObjectId = 3722;

const DEFAULT_PARSER_TOKEN_TYPES: &[(TokenTypeId, &str, &str)] = &[
    (1, "asciiword", "Word, all ASCII"),
    (2, "word", "Word, all letters"),
    (3, "numword", "Word, letters and digits"),
    (4, "asciihword", "Hyphenated word, all ASCII"),
    (5, "hword", "Hyphenated word, all letters"),
    (6, "numhword", "Hyphenated word, letters and digits"),
    (7, "hword_asciipart", "Hyphenated word part, all ASCII"),
    (8, "hword_part", "Hyphenated word part, all letters"),
    (9, "hword_numpart", "Hyphenated word part, letters and digits"),
    (10, "email", "Email address"),
    (11, "protocol", "Protocol head"),
    (12, "url", "URL"),
    (13, "host", "Host"),
    (14, "url_path", "URL path"),
    (15, "file", "File or path name"),
    (16, "sfloat", "Scientific notation"),
    (17, "float", "Decimal notation"),
    (18, "int", "Signed integer"),
    (19, "uint", "Unsigned integer"),
    (20, "version", "Version number"),
    (21, "tag", "XML tag"),
    (22, "entity", "XML entity"),
    (23, "blank", "Space symbols"),
];

/// A token type reported by a parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCategory {
    pub id: TokenTypeId,
    pub alias: String,
    pub description: String,
}

impl TokenCategory {
    pub fn new(id: TokenTypeId, alias: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            alias: alias.into(),
            description: description.into(),
        }
    }
}

/// The token types of the default parser, in id order.
pub fn default_parser_categories() -> Vec<TokenCategory> {
    DEFAULT_PARSER_TOKEN_TYPES
        .iter()
        .map(|(id, alias, description)| TokenCategory::new(*id, *alias, *description))
        .collect()
}

/// Source of per-parser token type tables.
pub trait LexicalCategoryProvider {
    /// Returns the token type table of `parser_id`.
    ///
    /// A category with id `0` terminates the table; anything after it is
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the parser does not report token
    /// types.
    fn categories_for(&self, parser_id: ObjectId) -> Result<Vec<TokenCategory>>;
}

/// In-memory token type tables keyed by parser id.
#[derive(Debug, Clone, Default)]
pub struct StaticCategoryProvider {
    tables: HashMap<ObjectId, Vec<TokenCategory>>,
}

impl StaticCategoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider that knows only the default parser.
    pub fn with_default_parser() -> Self {
        let mut provider = Self::new();
        provider.register(DEFAULT_PARSER_ID, default_parser_categories());
        provider
    }

    /// Installs (or replaces) the table for `parser_id`.
    pub fn register(&mut self, parser_id: ObjectId, categories: Vec<TokenCategory>) {
        self.tables.insert(parser_id, categories);
    }
}

impl LexicalCategoryProvider for StaticCategoryProvider {
    fn categories_for(&self, parser_id: ObjectId) -> Result<Vec<TokenCategory>> {
        self.tables
            .get(&parser_id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found(ObjectKind::Parser, parser_id.to_string()))
    }
}

impl<P: LexicalCategoryProvider + ?Sized> LexicalCategoryProvider for &P {
    fn categories_for(&self, parser_id: ObjectId) -> Result<Vec<TokenCategory>> {
        (**self).categories_for(parser_id)
    }
}

/// Resolves token type names through a [`LexicalCategoryProvider`].
///
/// Tables are fetched on every call; nothing is cached between calls.
pub struct TokenTypeResolver<'p, P: ?Sized> {
    provider: &'p P,
    case_insensitive: bool,
}

impl<'p, P: LexicalCategoryProvider + ?Sized> TokenTypeResolver<'p, P> {
    /// Creates a resolver that matches aliases exactly.
    pub fn new(provider: &'p P) -> Self {
        Self {
            provider,
            case_insensitive: false,
        }
    }

    /// Matches aliases ignoring ASCII case instead.
    pub fn case_insensitive(mut self, enabled: bool) -> Self {
        self.case_insensitive = enabled;
        self
    }

    fn matches(&self, alias: &str, name: &str) -> bool {
        if self.case_insensitive {
            alias.eq_ignore_ascii_case(name)
        } else {
            alias == name
        }
    }

    /// Resolves `names` to ids, preserving input order.
    ///
    /// An empty `names` returns an empty result without asking the provider.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` naming the first unknown token type, or
    /// the provider's error when the parser has no token type table.
    pub fn resolve<S: AsRef<str>>(&self, parser_id: ObjectId, names: &[S]) -> Result<Vec<TokenTypeId>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let table = self.provider.categories_for(parser_id)?;
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                table
                    .iter()
                    .take_while(|category| category.id != 0)
                    .find(|category| self.matches(&category.alias, name))
                    .map(|category| category.id)
                    .ok_or_else(|| CatalogError::not_found(ObjectKind::TokenType, name))
            })
            .collect()
    }
}
