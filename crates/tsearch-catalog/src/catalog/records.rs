//! Persisted catalog records and their key layout.
//!
//! Records are stored with bincode under `__tsearch__/`. Objects are keyed by
//! big-endian id, with a separate name index pointing at the id.

use serde::{Deserialize, Serialize};
use tsearch_kv::{Key, KVTransaction};

use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::ObjectId;

const CONFIGS_PREFIX: &[u8] = b"__tsearch__/configs/";
const CONFIG_NAMES_PREFIX: &[u8] = b"__tsearch__/config_names/";
const DICTS_PREFIX: &[u8] = b"__tsearch__/dicts/";
const DICT_NAMES_PREFIX: &[u8] = b"__tsearch__/dict_names/";
const META_KEY: &[u8] = b"__tsearch__/meta";

const CATALOG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct CatalogMeta {
    version: u32,
    next_builtin_id: ObjectId,
    next_object_id: ObjectId,
}

/// A text search configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigurationRecord {
    pub id: ObjectId,
    pub name: String,
    pub parser_id: ObjectId,
    /// Encoded option list; `None` when the configuration has no options.
    pub options: Option<String>,
}

/// A text search dictionary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DictionaryRecord {
    pub id: ObjectId,
    pub name: String,
    pub template: String,
    /// Encoded option list; `None` when the dictionary has no options.
    pub options: Option<String>,
}

fn id_key(prefix: &[u8], id: ObjectId) -> Key {
    let mut key = prefix.to_vec();
    key.extend_from_slice(&id.to_be_bytes());
    key
}

fn name_key(prefix: &[u8], name: &str) -> Key {
    let mut key = prefix.to_vec();
    key.extend_from_slice(name.as_bytes());
    key
}

/// Hands out the next object id.
///
/// Bootstrap mode draws from the built-in range below
/// `first_normal_object_id`; otherwise ids start at `first_normal_object_id`.
pub(crate) fn allocate_id<'a, T: KVTransaction<'a>>(
    txn: &mut T,
    config: &CatalogConfig,
) -> Result<ObjectId> {
    let mut meta = match txn.get(&META_KEY.to_vec())? {
        Some(bytes) => {
            let meta: CatalogMeta = bincode::deserialize(&bytes)?;
            if meta.version != CATALOG_VERSION {
                return Err(CatalogError::InvalidKey(format!(
                    "unsupported catalog version {}",
                    meta.version
                )));
            }
            meta
        }
        None => CatalogMeta {
            version: CATALOG_VERSION,
            next_builtin_id: 1,
            next_object_id: config.first_normal_object_id,
        },
    };
    meta.next_object_id = meta.next_object_id.max(config.first_normal_object_id);

    let id = if config.bootstrap {
        let id = meta.next_builtin_id;
        if id >= config.first_normal_object_id {
            return Err(CatalogError::InvalidConfig(
                "built-in object id range exhausted".into(),
            ));
        }
        meta.next_builtin_id += 1;
        id
    } else {
        let id = meta.next_object_id;
        meta.next_object_id = id
            .checked_add(1)
            .ok_or_else(|| CatalogError::InvalidConfig("object id space exhausted".into()))?;
        id
    };

    txn.put(META_KEY.to_vec(), bincode::serialize(&meta)?)?;
    Ok(id)
}

fn lookup_id<'a, T: KVTransaction<'a>>(
    txn: &mut T,
    names_prefix: &[u8],
    name: &str,
) -> Result<Option<ObjectId>> {
    match txn.get(&name_key(names_prefix, name))? {
        Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
        None => Ok(None),
    }
}

fn load_by_id<'a, T, R>(txn: &mut T, prefix: &[u8], id: ObjectId) -> Result<R>
where
    T: KVTransaction<'a>,
    R: serde::de::DeserializeOwned,
{
    let bytes = txn
        .get(&id_key(prefix, id))?
        .ok_or_else(|| CatalogError::InvalidKey(format!("dangling name index for object {id}")))?;
    Ok(bincode::deserialize(&bytes)?)
}

pub(crate) fn find_configuration<'a, T: KVTransaction<'a>>(
    txn: &mut T,
    name: &str,
) -> Result<Option<ConfigurationRecord>> {
    match lookup_id(txn, CONFIG_NAMES_PREFIX, name)? {
        Some(id) => Ok(Some(load_by_id(txn, CONFIGS_PREFIX, id)?)),
        None => Ok(None),
    }
}

pub(crate) fn put_configuration<'a, T: KVTransaction<'a>>(
    txn: &mut T,
    record: &ConfigurationRecord,
) -> Result<()> {
    txn.put(id_key(CONFIGS_PREFIX, record.id), bincode::serialize(record)?)?;
    txn.put(
        name_key(CONFIG_NAMES_PREFIX, &record.name),
        bincode::serialize(&record.id)?,
    )?;
    Ok(())
}

pub(crate) fn delete_configuration<'a, T: KVTransaction<'a>>(
    txn: &mut T,
    record: &ConfigurationRecord,
) -> Result<()> {
    txn.delete(id_key(CONFIGS_PREFIX, record.id))?;
    txn.delete(name_key(CONFIG_NAMES_PREFIX, &record.name))?;
    Ok(())
}

pub(crate) fn find_dictionary<'a, T: KVTransaction<'a>>(
    txn: &mut T,
    name: &str,
) -> Result<Option<DictionaryRecord>> {
    match lookup_id(txn, DICT_NAMES_PREFIX, name)? {
        Some(id) => Ok(Some(load_by_id(txn, DICTS_PREFIX, id)?)),
        None => Ok(None),
    }
}

pub(crate) fn delete_dictionary<'a, T: KVTransaction<'a>>(
    txn: &mut T,
    record: &DictionaryRecord,
) -> Result<()> {
    txn.delete(id_key(DICTS_PREFIX, record.id))?;
    txn.delete(name_key(DICT_NAMES_PREFIX, &record.name))?;
    Ok(())
}

pub(crate) fn put_dictionary<'a, T: KVTransaction<'a>>(
    txn: &mut T,
    record: &DictionaryRecord,
) -> Result<()> {
    txn.put(id_key(DICTS_PREFIX, record.id), bincode::serialize(record)?)?;
    txn.put(
        name_key(DICT_NAMES_PREFIX, &record.name),
        bincode::serialize(&record.id)?,
    )?;
    Ok(())
}
