//! An in-memory key-value store with Optimistic Concurrency Control for
//! Snapshot Isolation.

use crate::error::{Error, Result};
use crate::kv::{KVStore, KVTransaction};
use crate::types::{Key, TxnId, TxnMode, TxnState, Value};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// An in-memory key-value store.
#[derive(Clone)]
pub struct MemoryKV {
    manager: Arc<MemoryTxnManager>,
}

impl MemoryKV {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self {
            manager: Arc::new(MemoryTxnManager::new()),
        }
    }

    /// Returns the number of live keys.
    pub fn len(&self) -> Result<usize> {
        let data = self.manager.read_data()?;
        Ok(data.values().filter(|(v, _)| v.is_some()).count())
    }

    /// Returns `true` if the store holds no live keys.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl Default for MemoryKV {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryKV {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryKV")
            .field(
                "commit_version",
                &self.manager.commit_version.load(Ordering::Acquire),
            )
            .finish()
    }
}

impl KVStore for MemoryKV {
    type Transaction<'a> = MemoryTransaction<'a>;

    fn begin(&self, mode: TxnMode) -> Result<Self::Transaction<'_>> {
        Ok(self.manager.begin_internal(mode))
    }
}

// Deleted keys keep a tombstone so concurrent writers can detect the delete.
// A tombstone is pruned once no open transaction started before it.
type VersionedValue = (Option<Value>, u64);

/// Shared state behind every [`MemoryKV`] handle.
struct MemoryTxnManager {
    /// The main data store, mapping keys to versioned values.
    data: RwLock<BTreeMap<Key, VersionedValue>>,
    /// The next transaction ID to be allocated.
    next_txn_id: AtomicU64,
    /// Incremented on every successful commit.
    commit_version: AtomicU64,
    /// Start versions of open transactions, with their counts.
    active_starts: Mutex<BTreeMap<u64, usize>>,
    /// Tombstones in commit order, awaiting pruning.
    tombstones: Mutex<VecDeque<(Key, u64)>>,
}

impl MemoryTxnManager {
    fn new() -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
            next_txn_id: AtomicU64::new(1),
            commit_version: AtomicU64::new(0),
            active_starts: Mutex::new(BTreeMap::new()),
            tombstones: Mutex::new(VecDeque::new()),
        }
    }

    fn read_data(&self) -> Result<RwLockReadGuard<'_, BTreeMap<Key, VersionedValue>>> {
        self.data.read().map_err(|_| Error::LockPoisoned)
    }

    fn write_data(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<Key, VersionedValue>>> {
        self.data.write().map_err(|_| Error::LockPoisoned)
    }

    // Counters only; a poisoned guard still holds consistent data.
    fn active_starts(&self) -> MutexGuard<'_, BTreeMap<u64, usize>> {
        self.active_starts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_internal(&self, mode: TxnMode) -> MemoryTransaction<'_> {
        let txn_id = self.next_txn_id.fetch_add(1, Ordering::SeqCst);
        // The version is read under the lock so a concurrent commit either
        // sees this start or commits after it.
        let start_version = {
            let mut active = self.active_starts();
            let start_version = self.commit_version.load(Ordering::Acquire);
            *active.entry(start_version).or_insert(0) += 1;
            start_version
        };
        MemoryTransaction::new(self, TxnId(txn_id), mode, start_version)
    }

    fn release(&self, start_version: u64) {
        let mut active = self.active_starts();
        if let Some(count) = active.get_mut(&start_version) {
            *count -= 1;
            if *count == 0 {
                active.remove(&start_version);
            }
        }
    }

    /// Drops tombstones no open transaction can still conflict on.
    ///
    /// A transaction conflicts on a version newer than its start, so a
    /// tombstone at or below the oldest open start is no longer needed.
    fn prune_tombstones(&self, data: &mut BTreeMap<Key, VersionedValue>) -> usize {
        let horizon = self
            .active_starts()
            .keys()
            .next()
            .copied()
            .unwrap_or(u64::MAX);
        let mut tombstones = self.tombstones.lock().unwrap_or_else(PoisonError::into_inner);
        let mut pruned = 0;
        while let Some((_, version)) = tombstones.front() {
            if *version > horizon {
                break;
            }
            let Some((key, version)) = tombstones.pop_front() else {
                break;
            };
            // Skip keys rewritten after the delete.
            if matches!(data.get(&key), Some((None, current)) if *current == version) {
                data.remove(&key);
                pruned += 1;
            }
        }
        pruned
    }

    fn commit(&self, txn: &mut MemoryTransaction<'_>) -> Result<()> {
        if txn.state != TxnState::Active {
            return Err(Error::TxnClosed);
        }
        if txn.mode == TxnMode::ReadOnly || txn.writes.is_empty() {
            txn.close(TxnState::Committed);
            return Ok(());
        }

        let mut data = self.write_data()?;
        let start_version = txn.start_version;

        let changed_since_start =
            |key: &Key| data.get(key).map(|(_, v)| *v).unwrap_or(0) > start_version;

        if txn.read_set.keys().any(changed_since_start) {
            txn.close(TxnState::RolledBack);
            return Err(Error::TxnConflict);
        }
        // Detect write-write conflicts even when the key was never read.
        if txn.writes.keys().any(changed_since_start) {
            txn.close(TxnState::RolledBack);
            return Err(Error::TxnConflict);
        }
        // Keys that appeared under a scanned prefix after the scan.
        for prefix in &txn.scanned_prefixes {
            let phantom = data
                .range::<[u8], _>((Bound::Included(prefix.as_slice()), Bound::Unbounded))
                .take_while(|(k, _)| k.starts_with(prefix))
                .any(|(_, (_, version))| *version > start_version);
            if phantom {
                txn.close(TxnState::RolledBack);
                return Err(Error::TxnConflict);
            }
        }

        let commit_version = self.commit_version.fetch_add(1, Ordering::AcqRel) + 1;
        let write_count = txn.writes.len();
        {
            let mut tombstones = self.tombstones.lock().unwrap_or_else(PoisonError::into_inner);
            for (key, value) in std::mem::take(&mut txn.writes) {
                if value.is_none() {
                    tombstones.push_back((key.clone(), commit_version));
                }
                data.insert(key, (value, commit_version));
            }
        }
        txn.close(TxnState::Committed);
        let pruned = self.prune_tombstones(&mut data);

        debug!(
            txn = txn.id.0,
            commit_version, write_count, pruned, "memory_kv_commit"
        );
        Ok(())
    }
}

/// An in-memory transaction that enforces snapshot isolation.
pub struct MemoryTransaction<'a> {
    manager: &'a MemoryTxnManager,
    id: TxnId,
    mode: TxnMode,
    state: TxnState,
    start_version: u64,
    writes: BTreeMap<Key, Option<Value>>,
    read_set: HashMap<Key, u64>,
    scanned_prefixes: Vec<Key>,
}

impl<'a> MemoryTransaction<'a> {
    fn new(manager: &'a MemoryTxnManager, id: TxnId, mode: TxnMode, start_version: u64) -> Self {
        Self {
            manager,
            id,
            mode,
            state: TxnState::Active,
            start_version,
            writes: BTreeMap::new(),
            read_set: HashMap::new(),
            scanned_prefixes: Vec::new(),
        }
    }

    /// Returns the transaction's lifecycle state.
    pub fn state(&self) -> TxnState {
        self.state
    }

    // Leaves the active set exactly once.
    fn close(&mut self, state: TxnState) {
        if self.state == TxnState::Active {
            self.manager.release(self.start_version);
        }
        self.state = state;
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.state != TxnState::Active {
            return Err(Error::TxnClosed);
        }
        if self.mode == TxnMode::ReadOnly {
            return Err(Error::ReadOnly);
        }
        Ok(())
    }
}

impl<'a> KVTransaction<'a> for MemoryTransaction<'a> {
    fn id(&self) -> TxnId {
        self.id
    }

    fn mode(&self) -> TxnMode {
        self.mode
    }

    fn get(&mut self, key: &Key) -> Result<Option<Value>> {
        if self.state != TxnState::Active {
            return Err(Error::TxnClosed);
        }

        if let Some(value) = self.writes.get(key) {
            return Ok(value.clone());
        }

        let result = {
            let data = self.manager.read_data()?;
            data.get(key).cloned()
        };

        match result {
            Some((value, version)) => {
                self.read_set.insert(key.clone(), version);
                Ok(value)
            }
            None => {
                self.read_set.insert(key.clone(), 0);
                Ok(None)
            }
        }
    }

    fn put(&mut self, key: Key, value: Value) -> Result<()> {
        self.ensure_writable()?;
        self.writes.insert(key, Some(value));
        Ok(())
    }

    fn delete(&mut self, key: Key) -> Result<()> {
        self.ensure_writable()?;
        self.writes.insert(key, None);
        Ok(())
    }

    fn scan_prefix(&mut self, prefix: &[u8]) -> Result<Vec<(Key, Value)>> {
        if self.state != TxnState::Active {
            return Err(Error::TxnClosed);
        }

        let mut merged: BTreeMap<Key, Value> = BTreeMap::new();
        {
            let data = self.manager.read_data()?;
            for (key, (value, version)) in data
                .range::<[u8], _>((Bound::Included(prefix), Bound::Unbounded))
                .take_while(|(k, _)| k.starts_with(prefix))
            {
                self.read_set.insert(key.clone(), *version);
                if let Some(value) = value {
                    merged.insert(key.clone(), value.clone());
                }
            }
        }

        for (key, value) in self
            .writes
            .range::<[u8], _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(k, _)| k.starts_with(prefix))
        {
            match value {
                Some(v) => {
                    merged.insert(key.clone(), v.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }

        self.scanned_prefixes.push(prefix.to_vec());
        Ok(merged.into_iter().collect())
    }

    fn commit_self(mut self) -> Result<()> {
        let manager = self.manager;
        manager.commit(&mut self)
    }

    fn rollback_self(mut self) -> Result<()> {
        if self.state != TxnState::Active {
            return Err(Error::TxnClosed);
        }
        self.writes.clear();
        self.close(TxnState::RolledBack);
        Ok(())
    }
}

impl<'a> Drop for MemoryTransaction<'a> {
    fn drop(&mut self) {
        self.close(TxnState::RolledBack);
    }
}
