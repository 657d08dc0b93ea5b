use tracing::{debug, info};

use super::{DictionaryResolver, MappingEntry, MappingOutcome, MappingStore, MappingTarget};
use crate::error::{CatalogError, ObjectKind, Result};
use crate::token_types::{LexicalCategoryProvider, TokenTypeResolver};
use crate::ObjectId;

/// Edits the token map of one configuration.
///
/// All names are resolved before the store is touched, so a bad token type or
/// dictionary name never leaves a half-applied command behind. Operations on
/// the store are issued in sequence; the store (usually one catalog
/// transaction) is responsible for applying them atomically.
pub struct MappingEditor<'a, P: ?Sized, D: ?Sized> {
    token_types: TokenTypeResolver<'a, P>,
    dictionaries: &'a D,
}

impl<'a, P, D> MappingEditor<'a, P, D>
where
    P: LexicalCategoryProvider + ?Sized,
    D: DictionaryResolver + ?Sized,
{
    pub fn new(token_types: TokenTypeResolver<'a, P>, dictionaries: &'a D) -> Self {
        Self {
            token_types,
            dictionaries,
        }
    }

    fn resolve_dictionaries<N: AsRef<str>>(&self, names: &[N]) -> Result<Vec<ObjectId>> {
        names
            .iter()
            .map(|name| self.dictionaries.resolve_dictionary(name.as_ref()))
            .collect()
    }

    /// Maps every token type in `tokens` to `dictionaries`.
    ///
    /// Every token type gets the same try order: the dictionary at position
    /// `i` of `dictionaries` is stored with sequence number `i + 1`. With
    /// `override_existing` all current rows of those token types are deleted
    /// first; otherwise an existing row with the same sequence number is an
    /// `AlreadyExists` error.
    pub fn add_mapping<M, T, N>(
        &self,
        store: &mut M,
        target: MappingTarget,
        tokens: &[T],
        dictionaries: &[N],
        override_existing: bool,
    ) -> Result<MappingOutcome>
    where
        M: MappingStore + ?Sized,
        T: AsRef<str>,
        N: AsRef<str>,
    {
        if tokens.is_empty() {
            return Err(CatalogError::Precondition(
                "at least one token type is required to add a mapping".into(),
            ));
        }
        if dictionaries.is_empty() {
            return Err(CatalogError::Precondition(
                "at least one dictionary is required to add a mapping".into(),
            ));
        }

        let token_ids = self.token_types.resolve(target.parser_id, tokens)?;
        let dict_ids = self.resolve_dictionaries(dictionaries)?;
        let mut outcome = MappingOutcome::default();

        if override_existing {
            for &token_type in &token_ids {
                outcome.deleted += store.delete_where(target.config_id, Some(token_type))?;
            }
        }

        for &token_type in &token_ids {
            for (seq_no, &dict_id) in (1..).zip(&dict_ids) {
                store.insert(&MappingEntry::new(
                    target.config_id,
                    token_type,
                    seq_no,
                    dict_id,
                ))?;
                outcome.inserted += 1;
            }
        }

        debug!(
            config_id = target.config_id,
            override_existing,
            inserted = outcome.inserted,
            deleted = outcome.deleted,
            "mapping_add"
        );
        Ok(outcome)
    }

    /// Swaps dictionary `dictionaries[0]` for `dictionaries[1]` wherever it
    /// appears, keeping sequence numbers.
    ///
    /// An empty `tokens` list means every token type of the configuration.
    pub fn replace_dictionary<M, T, N>(
        &self,
        store: &mut M,
        target: MappingTarget,
        tokens: &[T],
        dictionaries: &[N],
    ) -> Result<MappingOutcome>
    where
        M: MappingStore + ?Sized,
        T: AsRef<str>,
        N: AsRef<str>,
    {
        if dictionaries.len() != 2 {
            return Err(CatalogError::Precondition(format!(
                "dictionary replacement needs exactly two dictionaries (old and new), got {}",
                dictionaries.len()
            )));
        }

        let token_ids = self.token_types.resolve(target.parser_id, tokens)?;
        let dict_ids = self.resolve_dictionaries(dictionaries)?;
        let (old_dict, new_dict) = (dict_ids[0], dict_ids[1]);

        let mut outcome = MappingOutcome::default();
        for entry in store.scan(target.config_id, None)? {
            if !token_ids.is_empty() && !token_ids.contains(&entry.token_type) {
                continue;
            }
            if entry.dict_id == old_dict {
                store.update(&MappingEntry {
                    dict_id: new_dict,
                    ..entry
                })?;
                outcome.updated += 1;
            }
        }

        debug!(
            config_id = target.config_id,
            old_dict,
            new_dict,
            updated = outcome.updated,
            "mapping_replace"
        );
        Ok(outcome)
    }

    /// Removes every row of each token type in `tokens`.
    ///
    /// A token type without rows is a `NotFound` error, unless `missing_ok`
    /// is set; then a notice is recorded and the remaining token types are
    /// still processed.
    pub fn drop_mapping<M, T>(
        &self,
        store: &mut M,
        target: MappingTarget,
        tokens: &[T],
        missing_ok: bool,
    ) -> Result<MappingOutcome>
    where
        M: MappingStore + ?Sized,
        T: AsRef<str>,
    {
        if tokens.is_empty() {
            return Err(CatalogError::Precondition(
                "at least one token type is required to drop a mapping".into(),
            ));
        }

        let token_ids = self.token_types.resolve(target.parser_id, tokens)?;
        let mut outcome = MappingOutcome::default();

        for (name, &token_type) in tokens.iter().zip(&token_ids) {
            let name = name.as_ref();
            let removed = store.delete_where(target.config_id, Some(token_type))?;
            if removed > 0 {
                outcome.deleted += removed;
                continue;
            }
            if !missing_ok {
                return Err(CatalogError::not_found(ObjectKind::Mapping, name));
            }
            let notice = format!("mapping for token type \"{name}\" does not exist, skipping");
            info!(config_id = target.config_id, token_type = name, "{notice}");
            outcome.notices.push(notice);
        }

        debug!(
            config_id = target.config_id,
            deleted = outcome.deleted,
            "mapping_drop"
        );
        Ok(outcome)
    }
}
