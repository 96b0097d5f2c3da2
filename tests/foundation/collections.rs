//! Integration tests for persistent collections

use junction_foundation::{LtMap, RowId};
use proptest::prelude::*;

#[test]
fn snapshots_are_independent() {
    let v1: LtMap<RowId, &str> = LtMap::new().insert(RowId::new(1), "Tesla Model S");
    let v2 = v1.insert(RowId::new(2), "Ferrari 458");
    let v3 = v2.remove(&RowId::new(1));

    assert_eq!(v1.len(), 1);
    assert_eq!(v2.len(), 2);
    assert_eq!(v3.len(), 1);
    assert_eq!(v3.get(&RowId::new(2)), Some(&"Ferrari 458"));
}

#[test]
fn default_is_empty() {
    let map: LtMap<RowId, RowId> = LtMap::default();
    assert!(map.is_empty());
}

proptest! {
    #[test]
    fn iteration_is_sorted(keys in proptest::collection::vec(0u64..10_000, 0..64)) {
        let map: LtMap<u64, ()> = keys.iter().map(|k| (*k, ())).collect();
        let iterated: Vec<u64> = map.iter().map(|(k, _)| *k).collect();

        let mut expected = keys.clone();
        expected.sort_unstable();
        expected.dedup();
        prop_assert_eq!(iterated, expected);
    }

    #[test]
    fn insert_then_remove_restores_len(keys in proptest::collection::btree_set(0u64..1_000, 0..32), extra in 1_000u64..2_000) {
        let map: LtMap<u64, u64> = keys.iter().map(|k| (*k, *k)).collect();
        let grown = map.insert(extra, extra);
        prop_assert_eq!(grown.len(), map.len() + 1);
        prop_assert_eq!(grown.remove(&extra), map);
    }
}
