use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

use proptest::prelude::*;
use tsearch_kv::{Error, KVStore, KVTransaction, MemoryKV, TxnMode};

fn op_strategy() -> impl Strategy<Value = (Vec<u8>, Option<Vec<u8>>)> {
    let key = prop::collection::vec(any::<u8>(), 1..6);
    let value = prop::option::of(prop::collection::vec(any::<u8>(), 0..8));
    (key, value)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]

    #[test]
    fn proptest_only_committed_batches_are_visible(
        batches in prop::collection::vec(prop::collection::vec(op_strategy(), 1..5), 1..8),
        commit_flags in prop::collection::vec(any::<bool>(), 8),
    ) {
        let store = MemoryKV::new();
        let mut model: BTreeMap<Vec<u8>, Vec<u8>> = BTreeMap::new();

        for (idx, batch) in batches.iter().enumerate() {
            let mut txn = store.begin(TxnMode::ReadWrite).expect("begin");
            let mut staged = model.clone();
            for (key, value) in batch {
                match value {
                    Some(v) => {
                        txn.put(key.clone(), v.clone()).expect("put");
                        staged.insert(key.clone(), v.clone());
                    }
                    None => {
                        txn.delete(key.clone()).expect("delete");
                        staged.remove(key);
                    }
                }
            }
            if commit_flags[idx] {
                txn.commit_self().expect("commit");
                model = staged;
            } else {
                txn.rollback_self().expect("rollback");
            }
        }

        let mut reader = store.begin(TxnMode::ReadOnly).expect("begin");
        let all: BTreeMap<Vec<u8>, Vec<u8>> = reader.scan_prefix(b"").expect("scan").into_iter().collect();
        prop_assert_eq!(all, model);
    }
}

#[test]
fn readers_never_observe_partial_batches() {
    let store = Arc::new(MemoryKV::new());
    let keys: Vec<Vec<u8>> = (0u8..8).map(|i| vec![b'r', i]).collect();

    let writer = {
        let store = Arc::clone(&store);
        let keys = keys.clone();
        thread::spawn(move || {
            let mut committed = 0;
            for round in 0u8..50 {
                let mut txn = store.begin(TxnMode::ReadWrite).expect("begin");
                for key in &keys {
                    txn.put(key.clone(), vec![round]).expect("put");
                }
                match txn.commit_self() {
                    Ok(()) => committed += 1,
                    Err(Error::TxnConflict) => {}
                    Err(err) => panic!("unexpected commit error: {err}"),
                }
            }
            committed
        })
    };

    for _ in 0..200 {
        let mut reader = store.begin(TxnMode::ReadOnly).expect("begin");
        let rows = reader.scan_prefix(b"r").expect("scan");
        if rows.is_empty() {
            continue;
        }
        assert_eq!(rows.len(), keys.len());
        let first = &rows[0].1;
        assert!(rows.iter().all(|(_, v)| v == first), "torn batch: {rows:?}");
    }

    assert_eq!(writer.join().expect("writer thread"), 50);
}
