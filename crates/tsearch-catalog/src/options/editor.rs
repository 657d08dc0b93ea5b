use tracing::debug;

use super::{codec, OptionEntry, OptionList};
use crate::error::{CatalogError, Result};
use crate::ObjectId;

/// One requested change to an option list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionChange {
    /// Replace every option named `key` with a single `key = value`.
    Set { key: String, value: String },
    /// Remove every option named `key`.
    Reset { key: String },
}

impl OptionChange {
    pub fn set(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Set {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn reset(key: impl Into<String>) -> Self {
        Self::Reset { key: key.into() }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Set { key, .. } | Self::Reset { key } => key,
        }
    }
}

/// Checks a merged option list before it is stored.
pub trait OptionValidator {
    /// Returns a human-readable reason when `options` are not acceptable for
    /// configurations using `parser_id`.
    fn validate(&self, options: &[OptionEntry], parser_id: ObjectId)
        -> std::result::Result<(), String>;
}

/// Validator that accepts every option list.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl OptionValidator for AcceptAll {
    fn validate(&self, _options: &[OptionEntry], _parser_id: ObjectId) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// Validator that only accepts a fixed set of option names.
#[derive(Debug, Clone, Default)]
pub struct KnownKeys {
    keys: Vec<String>,
}

impl KnownKeys {
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl OptionValidator for KnownKeys {
    fn validate(&self, options: &[OptionEntry], _parser_id: ObjectId) -> std::result::Result<(), String> {
        match options
            .iter()
            .find(|option| !self.keys.iter().any(|known| option.has_key(known)))
        {
            Some(unknown) => Err(format!("unrecognized parameter \"{}\"", unknown.key)),
            None => Ok(()),
        }
    }
}

/// Applies `changes` to `existing`.
///
/// For every change, all options with a case-insensitively matching key are
/// removed first. The result keeps the surviving old options in their
/// original order followed by the newly set ones in request order.
pub fn merge_options(existing: OptionList, changes: &[OptionChange]) -> OptionList {
    let mut kept = existing;
    let mut added = OptionList::new();
    for change in changes {
        kept.retain(|option| !option.has_key(change.key()));
        added.retain(|option| !option.has_key(change.key()));
        if let OptionChange::Set { key, value } = change {
            added.push(OptionEntry::new(key.clone(), value.clone()));
        }
    }
    kept.extend(added);
    kept
}

/// Applies incremental changes to a stored option blob.
pub struct ConfigurationOptionsEditor<'v, V: ?Sized> {
    validator: &'v V,
}

impl<'v, V: OptionValidator + ?Sized> ConfigurationOptionsEditor<'v, V> {
    pub fn new(validator: &'v V) -> Self {
        Self { validator }
    }

    /// Decodes `stored`, merges `changes`, validates and re-encodes.
    ///
    /// Returns `None` when no options remain, which callers store as "no
    /// options" rather than an empty string.
    ///
    /// # Errors
    ///
    /// - `CatalogError::Format` if `stored` is not a valid option list
    /// - `CatalogError::Validation` if the validator rejects the result
    pub fn apply(
        &self,
        stored: Option<&str>,
        changes: &[OptionChange],
        parser_id: ObjectId,
    ) -> Result<Option<String>> {
        let existing = match stored {
            Some(text) => codec::decode(text)?,
            None => OptionList::new(),
        };
        let merged = merge_options(existing, changes);
        self.validator
            .validate(&merged, parser_id)
            .map_err(CatalogError::Validation)?;

        let encoded = codec::encode(&merged);
        debug!(
            parser_id,
            changes = changes.len(),
            options = merged.len(),
            "options_merged"
        );
        Ok((!encoded.is_empty()).then_some(encoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_replaces_matching_keys_case_insensitively() {
        let existing = vec![
            OptionEntry::new("StopWords", "english"),
            OptionEntry::new("language", "en"),
        ];
        let merged = merge_options(existing, &[OptionChange::set("stopwords", "french")]);
        assert_eq!(
            merged,
            vec![
                OptionEntry::new("language", "en"),
                OptionEntry::new("stopwords", "french"),
            ]
        );
    }

    #[test]
    fn merge_reset_removes_all_duplicates() {
        let existing = vec![
            OptionEntry::new("a", "1"),
            OptionEntry::new("A", "2"),
            OptionEntry::new("b", "3"),
        ];
        let merged = merge_options(existing, &[OptionChange::reset("a")]);
        assert_eq!(merged, vec![OptionEntry::new("b", "3")]);
    }

    #[test]
    fn merge_later_change_wins_within_one_request() {
        let merged = merge_options(
            Vec::new(),
            &[OptionChange::set("a", "1"), OptionChange::set("a", "2")],
        );
        assert_eq!(merged, vec![OptionEntry::new("a", "2")]);
    }

    #[test]
    fn apply_on_absent_blob() {
        let editor = ConfigurationOptionsEditor::new(&AcceptAll);
        let stored = editor
            .apply(None, &[OptionChange::set("ngram", "2")], 1)
            .unwrap();
        assert_eq!(stored.as_deref(), Some("ngram = '2'"));
    }

    #[test]
    fn apply_reset_last_option_yields_none() {
        let editor = ConfigurationOptionsEditor::new(&AcceptAll);
        let stored = editor
            .apply(Some("ngram = '2'"), &[OptionChange::reset("NGRAM")], 1)
            .unwrap();
        assert_eq!(stored, None);
    }

    #[test]
    fn apply_surfaces_validation_errors() {
        let validator = KnownKeys::new(["ngram"]);
        let editor = ConfigurationOptionsEditor::new(&validator);
        let err = editor
            .apply(None, &[OptionChange::set("bogus", "1")], 1)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid options: unrecognized parameter \"bogus\""
        );
    }

    #[test]
    fn apply_surfaces_format_errors() {
        let editor = ConfigurationOptionsEditor::new(&AcceptAll);
        let err = editor
            .apply(Some("broken = 'x"), &[OptionChange::reset("a")], 1)
            .unwrap_err();
        assert!(matches!(err, CatalogError::Format(_)));
    }
}
