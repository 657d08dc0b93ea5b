use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use tsearch_kv::{Key, KVTransaction};

use super::{MappingEntry, MappingStore};
use crate::error::{CatalogError, ObjectKind, Result};
use crate::{ObjectId, TokenTypeId};

/// Key prefix of mapping rows.
pub const MAPPINGS_PREFIX: &[u8] = b"__tsearch__/map/";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct PersistedMappingEntry {
    config_id: ObjectId,
    token_type: TokenTypeId,
    seq_no: i32,
    dict_id: ObjectId,
}

impl From<&MappingEntry> for PersistedMappingEntry {
    fn from(value: &MappingEntry) -> Self {
        Self {
            config_id: value.config_id,
            token_type: value.token_type,
            seq_no: value.seq_no,
            dict_id: value.dict_id,
        }
    }
}

impl From<PersistedMappingEntry> for MappingEntry {
    fn from(value: PersistedMappingEntry) -> Self {
        MappingEntry::new(value.config_id, value.token_type, value.seq_no, value.dict_id)
    }
}

// Flipping the sign bit makes big-endian byte order match numeric order.
fn ordered_i32(value: i32) -> [u8; 4] {
    ((value as u32) ^ 0x8000_0000).to_be_bytes()
}

fn config_prefix(config_id: ObjectId) -> Key {
    let mut key = MAPPINGS_PREFIX.to_vec();
    key.extend_from_slice(&config_id.to_be_bytes());
    key
}

fn token_prefix(config_id: ObjectId, token_type: TokenTypeId) -> Key {
    let mut key = config_prefix(config_id);
    key.extend_from_slice(&ordered_i32(token_type));
    key
}

fn entry_key(entry: &MappingEntry) -> Key {
    let mut key = token_prefix(entry.config_id, entry.token_type);
    key.extend_from_slice(&ordered_i32(entry.seq_no));
    key
}

fn scan_prefix(config_id: ObjectId, token_type: Option<TokenTypeId>) -> Key {
    match token_type {
        Some(token_type) => token_prefix(config_id, token_type),
        None => config_prefix(config_id),
    }
}

fn row_name(entry: &MappingEntry) -> String {
    format!("{} (sequence {})", entry.token_type, entry.seq_no)
}

/// [`MappingStore`] over a key-value transaction.
///
/// Nothing is visible to other readers until the transaction commits.
pub struct KvMappingStore<'t, 'a, T: KVTransaction<'a>> {
    txn: &'t mut T,
    _marker: PhantomData<&'a ()>,
}

impl<'t, 'a, T: KVTransaction<'a>> KvMappingStore<'t, 'a, T> {
    pub fn new(txn: &'t mut T) -> Self {
        Self {
            txn,
            _marker: PhantomData,
        }
    }
}

impl<'t, 'a, T: KVTransaction<'a>> MappingStore for KvMappingStore<'t, 'a, T> {
    fn insert(&mut self, entry: &MappingEntry) -> Result<()> {
        let key = entry_key(entry);
        if self.txn.get(&key)?.is_some() {
            return Err(CatalogError::already_exists(
                ObjectKind::Mapping,
                row_name(entry),
            ));
        }
        let value = bincode::serialize(&PersistedMappingEntry::from(entry))?;
        self.txn.put(key, value)?;
        Ok(())
    }

    fn update(&mut self, entry: &MappingEntry) -> Result<()> {
        let key = entry_key(entry);
        if self.txn.get(&key)?.is_none() {
            return Err(CatalogError::not_found(ObjectKind::Mapping, row_name(entry)));
        }
        let value = bincode::serialize(&PersistedMappingEntry::from(entry))?;
        self.txn.put(key, value)?;
        Ok(())
    }

    fn delete_where(&mut self, config_id: ObjectId, token_type: Option<TokenTypeId>) -> Result<usize> {
        let rows = self.txn.scan_prefix(&scan_prefix(config_id, token_type))?;
        let removed = rows.len();
        for (key, _) in rows {
            self.txn.delete(key)?;
        }
        Ok(removed)
    }

    fn scan(&mut self, config_id: ObjectId, token_type: Option<TokenTypeId>) -> Result<Vec<MappingEntry>> {
        self.txn
            .scan_prefix(&scan_prefix(config_id, token_type))?
            .into_iter()
            .map(|(_, value)| {
                let persisted: PersistedMappingEntry = bincode::deserialize(&value)?;
                Ok(persisted.into())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use tsearch_kv::{KVStore, MemoryKV, TxnMode};

    use super::*;

    #[test]
    fn scan_orders_by_token_then_sequence() {
        let store = MemoryKV::new();
        let mut txn = store.begin(TxnMode::ReadWrite).unwrap();
        let mut rows = KvMappingStore::new(&mut txn);
        for entry in [
            MappingEntry::new(1, 300, 2, 9),
            MappingEntry::new(1, 2, 10, 8),
            MappingEntry::new(1, 2, 2, 7),
            MappingEntry::new(1, -1, 1, 6),
            MappingEntry::new(2, 1, 1, 5),
        ] {
            rows.insert(&entry).unwrap();
        }

        let scanned: Vec<_> = rows
            .scan(1, None)
            .unwrap()
            .into_iter()
            .map(|e| (e.token_type, e.seq_no))
            .collect();
        assert_eq!(scanned, vec![(-1, 1), (2, 2), (2, 10), (300, 2)]);
        assert_eq!(rows.scan(1, Some(2)).unwrap().len(), 2);
    }

    #[test]
    fn insert_rejects_duplicate_key() {
        let store = MemoryKV::new();
        let mut txn = store.begin(TxnMode::ReadWrite).unwrap();
        let mut rows = KvMappingStore::new(&mut txn);
        rows.insert(&MappingEntry::new(1, 2, 1, 10)).unwrap();
        let err = rows.insert(&MappingEntry::new(1, 2, 1, 11)).unwrap_err();
        assert!(matches!(err, CatalogError::AlreadyExists { .. }));
    }

    #[test]
    fn update_requires_existing_row() {
        let store = MemoryKV::new();
        let mut txn = store.begin(TxnMode::ReadWrite).unwrap();
        let mut rows = KvMappingStore::new(&mut txn);
        let err = rows.update(&MappingEntry::new(1, 2, 1, 10)).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));
    }

    #[test]
    fn delete_where_is_scoped_to_config_and_token() {
        let store = MemoryKV::new();
        let mut txn = store.begin(TxnMode::ReadWrite).unwrap();
        {
            let mut rows = KvMappingStore::new(&mut txn);
            rows.insert(&MappingEntry::new(1, 2, 1, 10)).unwrap();
            rows.insert(&MappingEntry::new(1, 2, 2, 11)).unwrap();
            rows.insert(&MappingEntry::new(1, 3, 1, 10)).unwrap();
            rows.insert(&MappingEntry::new(2, 2, 1, 10)).unwrap();

            assert_eq!(rows.delete_where(1, Some(2)).unwrap(), 2);
            assert_eq!(rows.delete_where(1, Some(2)).unwrap(), 0);
            assert_eq!(rows.delete_where(1, None).unwrap(), 1);
        }
        txn.commit_self().unwrap();

        let mut reader = store.begin(TxnMode::ReadOnly).unwrap();
        let rows = KvMappingStore::new(&mut reader).scan(2, None).unwrap();
        assert_eq!(rows, vec![MappingEntry::new(2, 2, 1, 10)]);
    }
}
