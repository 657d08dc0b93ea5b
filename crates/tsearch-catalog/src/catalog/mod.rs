//! Persistent text search catalog.
//!
//! [`TextSearchCatalog`] stores configurations, dictionaries and mapping rows
//! in a [`KVStore`]. Each public command runs in its own read-write
//! transaction: it commits when the command succeeds and rolls back otherwise.

mod records;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};
use tsearch_kv::{KVStore, KVTransaction, TxnMode};

pub use records::{ConfigurationRecord, DictionaryRecord};

use crate::config::CatalogConfig;
use crate::error::{CatalogError, ObjectKind, Result};
use crate::mapping::{
    DictionaryResolver, KvMappingStore, MappingEditor, MappingEntry, MappingOutcome,
    MappingStore, MappingTarget,
};
use crate::options::{
    codec, merge_options, AcceptAll, ConfigurationOptionsEditor, OptionChange, OptionEntry,
    OptionList, OptionValidator,
};
use crate::token_types::{LexicalCategoryProvider, StaticCategoryProvider, TokenTypeResolver};
use crate::ObjectId;

const TEMPLATE_KEY: &str = "template";

/// Where a new configuration gets its parser from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationSource {
    /// Use this parser; the configuration starts with no mappings.
    Parser(ObjectId),
    /// Copy parser, options and mappings of the named configuration.
    Copy(String),
}

/// Arguments of an `alter_configuration` command.
///
/// Dispatch follows the populated fields: with `replace` the command swaps
/// one dictionary for another; with dictionaries it adds (or overrides)
/// mappings; with only token types it drops mappings; otherwise it edits the
/// configuration options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlterConfiguration {
    pub tokens: Vec<String>,
    pub dictionaries: Vec<String>,
    pub override_existing: bool,
    pub replace: bool,
    pub missing_ok: bool,
    pub options: Vec<OptionChange>,
}

fn owned<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    names.iter().map(|name| name.as_ref().to_owned()).collect()
}

impl AlterConfiguration {
    /// `ADD MAPPING FOR tokens WITH dictionaries`.
    pub fn add_mapping<T: AsRef<str>, D: AsRef<str>>(tokens: &[T], dictionaries: &[D]) -> Self {
        Self {
            tokens: owned(tokens),
            dictionaries: owned(dictionaries),
            ..Self::default()
        }
    }

    /// `ALTER MAPPING FOR tokens WITH dictionaries`: existing rows of those
    /// token types are replaced.
    pub fn alter_mapping<T: AsRef<str>, D: AsRef<str>>(tokens: &[T], dictionaries: &[D]) -> Self {
        Self {
            override_existing: true,
            ..Self::add_mapping(tokens, dictionaries)
        }
    }

    /// `ALTER MAPPING [FOR tokens] REPLACE old WITH new`. An empty `tokens`
    /// applies to every token type.
    pub fn replace_dictionary<T: AsRef<str>>(tokens: &[T], old: &str, new: &str) -> Self {
        Self {
            tokens: owned(tokens),
            dictionaries: vec![old.to_owned(), new.to_owned()],
            replace: true,
            ..Self::default()
        }
    }

    /// `DROP MAPPING [IF EXISTS] FOR tokens`.
    pub fn drop_mapping<T: AsRef<str>>(tokens: &[T], missing_ok: bool) -> Self {
        Self {
            tokens: owned(tokens),
            missing_ok,
            ..Self::default()
        }
    }

    /// Set or reset configuration options.
    pub fn set_options(changes: Vec<OptionChange>) -> Self {
        Self {
            options: changes,
            ..Self::default()
        }
    }
}

/// Result of `alter_configuration`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlterOutcome {
    Mapping(MappingOutcome),
    /// The newly stored option blob.
    Options(Option<String>),
}

// Dictionary ids looked up inside the command's own transaction.
struct DictionarySnapshot(HashMap<String, Option<ObjectId>>);

impl DictionarySnapshot {
    fn load<'a, T: KVTransaction<'a>>(txn: &mut T, names: &[String]) -> Result<Self> {
        let mut ids = HashMap::with_capacity(names.len());
        for name in names {
            if !ids.contains_key(name) {
                let id = records::find_dictionary(txn, name)?.map(|record| record.id);
                ids.insert(name.clone(), id);
            }
        }
        Ok(Self(ids))
    }
}

impl DictionaryResolver for DictionarySnapshot {
    fn resolve_dictionary(&self, name: &str) -> Result<ObjectId> {
        self.0
            .get(name)
            .copied()
            .flatten()
            .ok_or_else(|| CatalogError::not_found(ObjectKind::Dictionary, name))
    }
}

fn finish<'a, T: KVTransaction<'a>, R>(txn: T, result: Result<R>) -> Result<R> {
    match result {
        Ok(value) => {
            txn.commit_self()?;
            Ok(value)
        }
        Err(err) => {
            txn.rollback_self()?;
            Err(err)
        }
    }
}

fn missing_configuration(name: &str) -> CatalogError {
    CatalogError::not_found(ObjectKind::Configuration, name)
}

fn missing_dictionary(name: &str) -> CatalogError {
    CatalogError::not_found(ObjectKind::Dictionary, name)
}

/// Text search catalog over a key-value store.
pub struct TextSearchCatalog<S: KVStore, P = StaticCategoryProvider, V = AcceptAll> {
    store: Arc<S>,
    categories: P,
    validator: V,
    config: CatalogConfig,
}

impl<S: KVStore> TextSearchCatalog<S> {
    /// Catalog that knows the default parser and accepts any options.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            categories: StaticCategoryProvider::with_default_parser(),
            validator: AcceptAll,
            config: CatalogConfig::default(),
        }
    }
}

impl<S, P, V> TextSearchCatalog<S, P, V>
where
    S: KVStore,
    P: LexicalCategoryProvider,
    V: OptionValidator,
{
    pub fn with_components(
        store: Arc<S>,
        categories: P,
        validator: V,
        config: CatalogConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            categories,
            validator,
            config,
        })
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    fn token_types(&self) -> TokenTypeResolver<'_, P> {
        TokenTypeResolver::new(&self.categories)
            .case_insensitive(self.config.token_types_case_insensitive)
    }

    fn is_builtin(&self, id: ObjectId) -> bool {
        id < self.config.first_normal_object_id
    }

    /// Creates a dictionary and returns its id.
    pub fn define_dictionary(
        &self,
        name: &str,
        template: &str,
        options: &[OptionEntry],
    ) -> Result<ObjectId> {
        let mut txn = self.store.begin(TxnMode::ReadWrite)?;
        let result = self.define_dictionary_in(&mut txn, name, template, options);
        finish(txn, result)
    }

    fn define_dictionary_in(
        &self,
        txn: &mut S::Transaction<'_>,
        name: &str,
        template: &str,
        options: &[OptionEntry],
    ) -> Result<ObjectId> {
        if records::find_dictionary(txn, name)?.is_some() {
            return Err(CatalogError::already_exists(ObjectKind::Dictionary, name));
        }
        let encoded = codec::encode(options);
        let record = DictionaryRecord {
            id: records::allocate_id(txn, &self.config)?,
            name: name.to_owned(),
            template: template.to_owned(),
            options: (!encoded.is_empty()).then_some(encoded),
        };
        records::put_dictionary(txn, &record)?;
        info!(id = record.id, name, template, "dictionary_defined");
        Ok(record.id)
    }

    /// Sets or resets dictionary options and returns the new blob.
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown dictionary
    /// - `Precondition` for a built-in dictionary outside bootstrap mode
    /// - `Validation` when a change names the `template` key
    pub fn alter_dictionary(&self, name: &str, changes: &[OptionChange]) -> Result<Option<String>> {
        let mut txn = self.store.begin(TxnMode::ReadWrite)?;
        let result = self.alter_dictionary_in(&mut txn, name, changes);
        finish(txn, result)
    }

    fn alter_dictionary_in(
        &self,
        txn: &mut S::Transaction<'_>,
        name: &str,
        changes: &[OptionChange],
    ) -> Result<Option<String>> {
        let mut record =
            records::find_dictionary(txn, name)?.ok_or_else(|| missing_dictionary(name))?;
        if self.is_builtin(record.id) && !self.config.bootstrap {
            return Err(CatalogError::Precondition(format!(
                "cannot alter built-in text search dictionary \"{name}\""
            )));
        }
        if changes
            .iter()
            .any(|change| change.key().eq_ignore_ascii_case(TEMPLATE_KEY))
        {
            return Err(CatalogError::Validation(
                "the template of a text search dictionary cannot be changed".into(),
            ));
        }

        let existing = match record.options.as_deref() {
            Some(text) => codec::decode(text)?,
            None => OptionList::new(),
        };
        let merged = merge_options(existing, changes);
        let encoded = codec::encode(&merged);
        let new_options = (!encoded.is_empty()).then_some(encoded);

        info!(
            id = record.id,
            name,
            old = record.options.as_deref().unwrap_or(""),
            new = new_options.as_deref().unwrap_or(""),
            "dictionary_altered"
        );
        record.options = new_options.clone();
        records::put_dictionary(txn, &record)?;
        Ok(new_options)
    }

    pub fn rename_dictionary(&self, name: &str, new_name: &str) -> Result<()> {
        let mut txn = self.store.begin(TxnMode::ReadWrite)?;
        let result = self.rename_dictionary_in(&mut txn, name, new_name);
        finish(txn, result)
    }

    fn rename_dictionary_in(
        &self,
        txn: &mut S::Transaction<'_>,
        name: &str,
        new_name: &str,
    ) -> Result<()> {
        let record =
            records::find_dictionary(txn, name)?.ok_or_else(|| missing_dictionary(name))?;
        if records::find_dictionary(txn, new_name)?.is_some() {
            return Err(CatalogError::already_exists(ObjectKind::Dictionary, new_name));
        }
        records::delete_dictionary(txn, &record)?;
        records::put_dictionary(
            txn,
            &DictionaryRecord {
                name: new_name.to_owned(),
                ..record
            },
        )?;
        info!(from = name, to = new_name, "dictionary_renamed");
        Ok(())
    }

    /// Returns the decoded options of a dictionary.
    pub fn dictionary_options(&self, name: &str) -> Result<OptionList> {
        let record = self.dictionary(name)?;
        match record.options.as_deref() {
            Some(text) => Ok(codec::decode(text)?),
            None => Ok(OptionList::new()),
        }
    }

    pub fn dictionary(&self, name: &str) -> Result<DictionaryRecord> {
        let mut txn = self.store.begin(TxnMode::ReadOnly)?;
        let result = records::find_dictionary(&mut txn, name)
            .and_then(|found| found.ok_or_else(|| missing_dictionary(name)));
        finish(txn, result)
    }

    /// Creates a configuration and returns its id.
    ///
    /// `options` are applied on top of the copied configuration's options
    /// (or an empty list for a parser source) and validated against the
    /// parser.
    pub fn define_configuration(
        &self,
        name: &str,
        source: ConfigurationSource,
        options: &[OptionChange],
    ) -> Result<ObjectId> {
        let mut txn = self.store.begin(TxnMode::ReadWrite)?;
        let result = self.define_configuration_in(&mut txn, name, &source, options);
        finish(txn, result)
    }

    fn define_configuration_in(
        &self,
        txn: &mut S::Transaction<'_>,
        name: &str,
        source: &ConfigurationSource,
        options: &[OptionChange],
    ) -> Result<ObjectId> {
        if records::find_configuration(txn, name)?.is_some() {
            return Err(CatalogError::already_exists(ObjectKind::Configuration, name));
        }

        let (parser_id, copied) = match source {
            ConfigurationSource::Parser(parser_id) => {
                self.categories.categories_for(*parser_id)?;
                (*parser_id, None)
            }
            ConfigurationSource::Copy(source_name) => {
                let original = records::find_configuration(txn, source_name)?
                    .ok_or_else(|| missing_configuration(source_name))?;
                (original.parser_id, Some(original))
            }
        };
        let base_options = copied.as_ref().and_then(|original| original.options.as_deref());
        let stored_options = if options.is_empty() {
            base_options.map(str::to_owned)
        } else {
            ConfigurationOptionsEditor::new(&self.validator).apply(base_options, options, parser_id)?
        };

        let record = ConfigurationRecord {
            id: records::allocate_id(txn, &self.config)?,
            name: name.to_owned(),
            parser_id,
            options: stored_options,
        };
        records::put_configuration(txn, &record)?;

        let mut copied_rows = 0;
        if let Some(original) = &copied {
            let mut rows = KvMappingStore::new(txn);
            for entry in rows.scan(original.id, None)? {
                rows.insert(&MappingEntry {
                    config_id: record.id,
                    ..entry
                })?;
                copied_rows += 1;
            }
        }

        info!(
            id = record.id,
            name,
            parser_id,
            copied_rows,
            "configuration_defined"
        );
        Ok(record.id)
    }

    /// Runs one `ALTER TEXT SEARCH CONFIGURATION` command.
    pub fn alter_configuration(
        &self,
        name: &str,
        command: &AlterConfiguration,
    ) -> Result<AlterOutcome> {
        let mut txn = self.store.begin(TxnMode::ReadWrite)?;
        let result = self.alter_configuration_in(&mut txn, name, command);
        finish(txn, result)
    }

    fn alter_configuration_in(
        &self,
        txn: &mut S::Transaction<'_>,
        name: &str,
        command: &AlterConfiguration,
    ) -> Result<AlterOutcome> {
        let mut record =
            records::find_configuration(txn, name)?.ok_or_else(|| missing_configuration(name))?;
        let target = MappingTarget {
            config_id: record.id,
            parser_id: record.parser_id,
        };

        if command.replace || !command.dictionaries.is_empty() || !command.tokens.is_empty() {
            let dictionaries = DictionarySnapshot::load(txn, &command.dictionaries)?;
            let editor = MappingEditor::new(self.token_types(), &dictionaries);
            let mut rows = KvMappingStore::new(txn);
            let outcome = if command.replace {
                editor.replace_dictionary(&mut rows, target, &command.tokens, &command.dictionaries)?
            } else if !command.dictionaries.is_empty() {
                editor.add_mapping(
                    &mut rows,
                    target,
                    &command.tokens,
                    &command.dictionaries,
                    command.override_existing,
                )?
            } else {
                editor.drop_mapping(&mut rows, target, &command.tokens, command.missing_ok)?
            };
            info!(
                config = name,
                inserted = outcome.inserted,
                updated = outcome.updated,
                deleted = outcome.deleted,
                "configuration_mapping_altered"
            );
            return Ok(AlterOutcome::Mapping(outcome));
        }

        if command.options.is_empty() {
            return Err(CatalogError::Precondition(
                "alter text search configuration needs mappings or options to change".into(),
            ));
        }

        let options = ConfigurationOptionsEditor::new(&self.validator).apply(
            record.options.as_deref(),
            &command.options,
            record.parser_id,
        )?;
        info!(
            config = name,
            old = record.options.as_deref().unwrap_or(""),
            new = options.as_deref().unwrap_or(""),
            "configuration_options_altered"
        );
        record.options = options.clone();
        records::put_configuration(txn, &record)?;
        Ok(AlterOutcome::Options(options))
    }

    pub fn rename_configuration(&self, name: &str, new_name: &str) -> Result<()> {
        let mut txn = self.store.begin(TxnMode::ReadWrite)?;
        let result = self.rename_configuration_in(&mut txn, name, new_name);
        finish(txn, result)
    }

    fn rename_configuration_in(
        &self,
        txn: &mut S::Transaction<'_>,
        name: &str,
        new_name: &str,
    ) -> Result<()> {
        let record =
            records::find_configuration(txn, name)?.ok_or_else(|| missing_configuration(name))?;
        if records::find_configuration(txn, new_name)?.is_some() {
            return Err(CatalogError::already_exists(
                ObjectKind::Configuration,
                new_name,
            ));
        }
        records::delete_configuration(txn, &record)?;
        records::put_configuration(
            txn,
            &ConfigurationRecord {
                name: new_name.to_owned(),
                ..record
            },
        )?;
        info!(from = name, to = new_name, "configuration_renamed");
        Ok(())
    }

    /// Removes a configuration and all of its mapping rows. Returns the
    /// number of rows removed.
    pub fn remove_configuration(&self, name: &str) -> Result<usize> {
        let mut txn = self.store.begin(TxnMode::ReadWrite)?;
        let result = self.remove_configuration_in(&mut txn, name);
        finish(txn, result)
    }

    fn remove_configuration_in(&self, txn: &mut S::Transaction<'_>, name: &str) -> Result<usize> {
        let record =
            records::find_configuration(txn, name)?.ok_or_else(|| missing_configuration(name))?;
        records::delete_configuration(txn, &record)?;
        let removed = KvMappingStore::new(txn).delete_where(record.id, None)?;
        info!(id = record.id, name, removed, "configuration_removed");
        Ok(removed)
    }

    pub fn configuration(&self, name: &str) -> Result<ConfigurationRecord> {
        let mut txn = self.store.begin(TxnMode::ReadOnly)?;
        let result = records::find_configuration(&mut txn, name)
            .and_then(|found| found.ok_or_else(|| missing_configuration(name)));
        finish(txn, result)
    }

    /// Returns the decoded options of a configuration.
    pub fn configuration_options(&self, name: &str) -> Result<OptionList> {
        let record = self.configuration(name)?;
        match record.options.as_deref() {
            Some(text) => Ok(codec::decode(text)?),
            None => Ok(OptionList::new()),
        }
    }

    /// Returns the mapping rows of a configuration, ordered by token type
    /// then sequence number.
    pub fn mappings(&self, name: &str) -> Result<Vec<MappingEntry>> {
        let mut txn = self.store.begin(TxnMode::ReadOnly)?;
        let result = self.mappings_in(&mut txn, name);
        finish(txn, result)
    }

    fn mappings_in(&self, txn: &mut S::Transaction<'_>, name: &str) -> Result<Vec<MappingEntry>> {
        let record =
            records::find_configuration(txn, name)?.ok_or_else(|| missing_configuration(name))?;
        let rows = KvMappingStore::new(txn).scan(record.id, None)?;
        debug!(config = name, rows = rows.len(), "configuration_mappings");
        Ok(rows)
    }
}

impl<S, P, V> DictionaryResolver for TextSearchCatalog<S, P, V>
where
    S: KVStore,
    P: LexicalCategoryProvider,
    V: OptionValidator,
{
    fn resolve_dictionary(&self, name: &str) -> Result<ObjectId> {
        self.dictionary(name).map(|record| record.id)
    }
}

#[cfg(test)]
mod tests {
    use tsearch_kv::MemoryKV;

    use super::*;
    use crate::options::KnownKeys;
    use crate::token_types::DEFAULT_PARSER_ID;

    fn catalog() -> TextSearchCatalog<MemoryKV> {
        let catalog = TextSearchCatalog::new(Arc::new(MemoryKV::new()));
        catalog.define_dictionary("english_stem", "snowball", &[]).unwrap();
        catalog.define_dictionary("simple", "simple", &[]).unwrap();
        catalog
            .define_configuration("english", ConfigurationSource::Parser(DEFAULT_PARSER_ID), &[])
            .unwrap();
        catalog
    }

    fn rows(catalog: &TextSearchCatalog<MemoryKV>, name: &str) -> Vec<(i32, i32, ObjectId)> {
        catalog
            .mappings(name)
            .unwrap()
            .into_iter()
            .map(|entry| (entry.token_type, entry.seq_no, entry.dict_id))
            .collect()
    }

    #[test]
    fn add_mapping_persists_rows() {
        let catalog = catalog();
        let stem = catalog.resolve_dictionary("english_stem").unwrap();
        let simple = catalog.resolve_dictionary("simple").unwrap();

        let outcome = catalog
            .alter_configuration(
                "english",
                &AlterConfiguration::add_mapping(&["asciiword", "word"], &["english_stem", "simple"]),
            )
            .unwrap();
        assert!(matches!(outcome, AlterOutcome::Mapping(MappingOutcome { inserted: 4, .. })));
        assert_eq!(
            rows(&catalog, "english"),
            vec![(1, 1, stem), (1, 2, simple), (2, 1, stem), (2, 2, simple)]
        );
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let catalog = catalog();
        let err = catalog
            .define_configuration("english", ConfigurationSource::Parser(DEFAULT_PARSER_ID), &[])
            .unwrap_err();
        assert!(matches!(err, CatalogError::AlreadyExists { .. }));
        let err = catalog.define_dictionary("simple", "simple", &[]).unwrap_err();
        assert!(matches!(err, CatalogError::AlreadyExists { .. }));
    }

    #[test]
    fn unknown_parser_is_rejected() {
        let catalog = catalog();
        let err = catalog
            .define_configuration("other", ConfigurationSource::Parser(1), &[])
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::NotFound {
                kind: ObjectKind::Parser,
                ..
            }
        ));
    }

    #[test]
    fn unknown_dictionary_leaves_mappings_untouched() {
        let catalog = catalog();
        catalog
            .alter_configuration("english", &AlterConfiguration::add_mapping(&["word"], &["simple"]))
            .unwrap();
        let before = rows(&catalog, "english");

        let err = catalog
            .alter_configuration(
                "english",
                &AlterConfiguration::alter_mapping(&["word"], &["no_such_dict"]),
            )
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "text search dictionary \"no_such_dict\" does not exist"
        );
        assert_eq!(rows(&catalog, "english"), before);
    }

    #[test]
    fn options_are_merged_and_reset() {
        let catalog = catalog();
        let outcome = catalog
            .alter_configuration(
                "english",
                &AlterConfiguration::set_options(vec![
                    OptionChange::set("a", "1"),
                    OptionChange::set("b", "2"),
                ]),
            )
            .unwrap();
        assert_eq!(outcome, AlterOutcome::Options(Some("a = '1', b = '2'".into())));

        let outcome = catalog
            .alter_configuration(
                "english",
                &AlterConfiguration::set_options(vec![
                    OptionChange::reset("A"),
                    OptionChange::reset("b"),
                ]),
            )
            .unwrap();
        assert_eq!(outcome, AlterOutcome::Options(None));
        assert!(catalog.configuration_options("english").unwrap().is_empty());
    }

    #[test]
    fn validator_rejection_keeps_old_options() {
        let catalog = TextSearchCatalog::with_components(
            Arc::new(MemoryKV::new()),
            StaticCategoryProvider::with_default_parser(),
            KnownKeys::new(["weight"]),
            CatalogConfig::default(),
        )
        .unwrap();
        catalog
            .define_configuration(
                "cfg",
                ConfigurationSource::Parser(DEFAULT_PARSER_ID),
                &[OptionChange::set("weight", "2")],
            )
            .unwrap();

        let err = catalog
            .alter_configuration(
                "cfg",
                &AlterConfiguration::set_options(vec![OptionChange::set("colour", "red")]),
            )
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
        assert_eq!(
            catalog.configuration("cfg").unwrap().options.as_deref(),
            Some("weight = '2'")
        );
    }

    #[test]
    fn empty_command_is_a_precondition_error() {
        let catalog = catalog();
        let err = catalog
            .alter_configuration("english", &AlterConfiguration::default())
            .unwrap_err();
        assert!(matches!(err, CatalogError::Precondition(_)));
    }

    #[test]
    fn rename_moves_the_name_index() {
        let catalog = catalog();
        let id = catalog.configuration("english").unwrap().id;
        catalog.rename_configuration("english", "en").unwrap();

        assert_eq!(catalog.configuration("en").unwrap().id, id);
        assert!(matches!(
            catalog.configuration("english"),
            Err(CatalogError::NotFound { .. })
        ));

        catalog
            .define_configuration("other", ConfigurationSource::Parser(DEFAULT_PARSER_ID), &[])
            .unwrap();
        assert!(matches!(
            catalog.rename_configuration("en", "other"),
            Err(CatalogError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn replace_does_not_request_override() {
        let command = AlterConfiguration::replace_dictionary(&["word"], "simple", "english_stem");
        assert!(command.replace);
        assert!(!command.override_existing);
    }

    #[test]
    fn rename_dictionary_keeps_mappings_pointing_at_it() {
        let catalog = catalog();
        let id = catalog.resolve_dictionary("simple").unwrap();
        catalog
            .alter_configuration("english", &AlterConfiguration::add_mapping(&["word"], &["simple"]))
            .unwrap();

        catalog.rename_dictionary("simple", "plain").unwrap();
        assert_eq!(catalog.resolve_dictionary("plain").unwrap(), id);
        assert!(matches!(
            catalog.resolve_dictionary("simple"),
            Err(CatalogError::NotFound { .. })
        ));
        assert_eq!(rows(&catalog, "english"), vec![(2, 1, id)]);

        assert!(matches!(
            catalog.rename_dictionary("plain", "english_stem"),
            Err(CatalogError::AlreadyExists {
                kind: ObjectKind::Dictionary,
                ..
            })
        ));
        assert!(matches!(
            catalog.rename_dictionary("missing", "other"),
            Err(CatalogError::NotFound { .. })
        ));
        assert_eq!(catalog.resolve_dictionary("plain").unwrap(), id);
    }

    #[test]
    fn dictionary_template_cannot_change() {
        let catalog = catalog();
        let err = catalog
            .alter_dictionary("simple", &[OptionChange::set("Template", "snowball")])
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[test]
    fn dictionary_options_round_trip() {
        let catalog = catalog();
        let blob = catalog
            .alter_dictionary(
                "simple",
                &[
                    OptionChange::set("stopwords", "english"),
                    OptionChange::set("accept", "false"),
                ],
            )
            .unwrap();
        assert_eq!(blob.as_deref(), Some("stopwords = 'english', accept = 'false'"));
        assert_eq!(
            catalog.dictionary_options("simple").unwrap(),
            vec![
                OptionEntry::new("stopwords", "english"),
                OptionEntry::new("accept", "false"),
            ]
        );
    }
}
