//! Option lists attached to text search configurations and dictionaries.
//!
//! - [`codec`]: the stored text form
//! - [`ConfigurationOptionsEditor`]: merge, validate and re-encode changes

pub mod codec;
mod editor;

pub use codec::FormatError;
pub use editor::{
    merge_options, AcceptAll, ConfigurationOptionsEditor, KnownKeys, OptionChange,
    OptionValidator,
};

/// A single `key = value` option.
///
/// Values are always kept in textual form, whatever type they were given as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionEntry {
    /// Option name; compared case-insensitively by the editor.
    pub key: String,
    /// Option value.
    pub value: String,
}

impl OptionEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Returns `true` if this option's key matches `key` ignoring ASCII case.
    pub fn has_key(&self, key: &str) -> bool {
        self.key.eq_ignore_ascii_case(key)
    }
}

/// An ordered list of options.
pub type OptionList = Vec<OptionEntry>;
