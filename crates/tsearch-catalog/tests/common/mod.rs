#![allow(dead_code)]

use std::sync::Arc;

use tsearch_catalog::token_types::DEFAULT_PARSER_ID;
use tsearch_catalog::{ConfigurationSource, ObjectId, TextSearchCatalog};
use tsearch_kv::MemoryKV;

/// Test tracing to stderr, filtered by `RUST_LOG`.
pub fn init_test_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Dictionary ids of [`seeded_catalog`].
pub struct Dictionaries {
    pub english_stem: ObjectId,
    pub simple: ObjectId,
    pub synonym: ObjectId,
}

/// A catalog with three dictionaries and an empty `english` configuration on
/// the default parser.
pub fn seeded_catalog() -> (TextSearchCatalog<MemoryKV>, Dictionaries) {
    init_test_tracing();
    let catalog = TextSearchCatalog::new(Arc::new(MemoryKV::new()));
    let dictionaries = Dictionaries {
        english_stem: catalog
            .define_dictionary("english_stem", "snowball", &[])
            .expect("define english_stem"),
        simple: catalog
            .define_dictionary("simple", "simple", &[])
            .expect("define simple"),
        synonym: catalog
            .define_dictionary("synonym", "synonym", &[])
            .expect("define synonym"),
    };
    catalog
        .define_configuration("english", ConfigurationSource::Parser(DEFAULT_PARSER_ID), &[])
        .expect("define english");
    (catalog, dictionaries)
}

/// `(token_type, seq_no, dict_id)` rows of a configuration.
pub fn rows(catalog: &TextSearchCatalog<MemoryKV>, name: &str) -> Vec<(i32, i32, ObjectId)> {
    catalog
        .mappings(name)
        .expect("mappings")
        .into_iter()
        .map(|entry| (entry.token_type, entry.seq_no, entry.dict_id))
        .collect()
}
