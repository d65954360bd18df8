//! Behaviour every `IndexMap` must share, checked once per map type.

use std::collections::BTreeMap;

use index_maps::{Error, FlatIndexMap, FlatSortedMap, IndexMap, SparseDirectMap, TwoLevelMap, UnorderedIndexMap};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// Key range used by the tests. Unbounded maps receive it as a capacity hint.
const KEY_RANGE: usize = 10;

/// Sorted `(key, value)` pairs, whatever order the map iterates in.
fn sorted_entries<M: IndexMap<Value = f64>>(map: &M) -> Vec<(u32, f64)> {
    let mut entries: Vec<_> = map.iter().map(|(key, &value)| (key, value)).collect();
    entries.sort_by_key(|&(key, _)| key);
    entries
}

fn assert_ascending<M: IndexMap>(map: &M) {
    let keys: Vec<u32> = map.keys().collect();
    assert!(keys.windows(2).all(|pair| pair[0] < pair[1]), "keys not ascending: {keys:?}");
}

// ─── Shared scenarios ───────────────────────────────────────────────────────

/// Mixes plain inserts with indexed writes, then removes a few keys.
fn scenario<M: IndexMap<Value = f64>>() {
    let mut map = M::with_key_range(KEY_RANGE);
    assert!(map.is_empty());

    map.insert(2, 3.5).unwrap();
    *map.get_or_insert_default(9).unwrap() = 7.0;
    map.insert(5, 123.0).unwrap();
    map.insert(4, -2.3).unwrap();
    *map.get_or_insert_default(7).unwrap() = -2.9;
    assert_eq!(map.len(), 5);

    if M::ORDERED {
        assert_eq!(map.keys().collect::<Vec<_>>(), [2, 4, 5, 7, 9]);
    }
    assert_eq!(sorted_entries(&map), [(2, 3.5), (4, -2.3), (5, 123.0), (7, -2.9), (9, 7.0)]);

    assert_eq!(map.at(3), Err(Error::KeyNotFound { key: 3 }));
    assert_eq!(map.at(5), Ok(&123.0));
    assert_eq!(map.get(3), None);

    for key in [7, 2, 5] {
        assert!(map.remove(key).is_some());
    }
    assert_eq!(map.len(), 2);
    assert_eq!(sorted_entries(&map), [(4, -2.3), (9, 7.0)]);
}

fn overwrite_returns_previous_value<M: IndexMap<Value = f64>>() {
    let mut map = M::with_key_range(KEY_RANGE);
    assert_eq!(map.insert(3, 1.0), Ok(None));
    assert_eq!(map.insert(3, 2.0), Ok(Some(1.0)));
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(3), Some(&2.0));

    // Idempotent.
    assert_eq!(map.insert(3, 2.0), Ok(Some(2.0)));
    assert_eq!(map.len(), 1);
}

fn remove_is_idempotent<M: IndexMap<Value = f64>>() {
    let mut map = M::with_key_range(KEY_RANGE);
    map.insert(1, 1.0).unwrap();
    map.insert(8, 8.0).unwrap();
    assert_eq!(map.remove(1), Some(1.0));
    assert_eq!(map.remove(1), None);
    assert_eq!(map.len(), 1);
    assert!(!map.contains_key(1));
    assert!(map.contains_key(8));
}

fn insert_then_remove_everything<M: IndexMap<Value = f64>>() {
    let mut map = M::with_key_range(KEY_RANGE);
    for key in 0..10 {
        map.insert(key, f64::from(key)).unwrap();
    }
    for key in (0..10).rev() {
        assert_eq!(map.remove(key), Some(f64::from(key)));
    }
    assert!(map.is_empty());
    assert_eq!(map.iter().count(), 0);
}

fn get_mut_and_get_or_insert_with<M: IndexMap<Value = f64>>() {
    let mut map = M::with_key_range(KEY_RANGE);
    assert_eq!(map.get_mut(6), None);
    *map.get_or_insert_with(6, || 1.0).unwrap() += 1.0;
    *map.get_or_insert_with(6, || 100.0).unwrap() += 1.0;
    assert_eq!(map.get(6), Some(&3.0));
    if let Some(value) = map.get_mut(6) {
        *value = 0.5;
    }
    assert_eq!(map.at(6), Ok(&0.5));
}

fn clear_empties_the_map<M: IndexMap<Value = f64>>() {
    let mut map = M::with_key_range(KEY_RANGE);
    for key in [0, 3, 9] {
        map.insert(key, 1.0).unwrap();
    }
    map.clear();
    assert!(map.is_empty());
    assert_eq!(map.get(3), None);
    map.insert(3, 2.0).unwrap();
    assert_eq!(sorted_entries(&map), [(3, 2.0)]);
}

/// Bounded maps reject keys past the range; unbounded maps accept them.
fn key_range_is_enforced<M: IndexMap<Value = f64>>() {
    let mut map = M::with_key_range(KEY_RANGE);
    let key = u32::try_from(KEY_RANGE).unwrap();
    match map.key_range() {
        Some(key_range) => {
            assert_eq!(key_range, KEY_RANGE);
            let rejected = Error::KeyOutOfRange { key, key_range };
            assert_eq!(map.insert(key, 1.0), Err(rejected.clone()));
            assert_eq!(map.at(key), Err(rejected.clone()));
            assert_eq!(map.get_or_insert_default(key).map(|value| *value), Err(rejected));
            assert_eq!(map.get(key), None);
            assert_eq!(map.remove(key), None);
            assert!(map.is_empty());
        }
        None => {
            assert_eq!(map.insert(u32::MAX, 1.0), Ok(None));
            assert_eq!(map.at(u32::MAX), Ok(&1.0));
        }
    }
}

fn iterator_is_exact_size<M: IndexMap<Value = f64>>() {
    let mut map = M::with_key_range(KEY_RANGE);
    for key in [1, 4, 6, 8] {
        map.insert(key, 0.0).unwrap();
    }
    map.remove(4);
    let mut iter = map.iter();
    assert_eq!(iter.len(), 3);
    iter.next();
    assert_eq!(iter.len(), 2);
    assert_eq!(iter.count(), 2);
}

/// Collect the keys to change, then change them.
fn snapshot_then_mutate<M: IndexMap<Value = f64>>() {
    let mut map = M::with_key_range(KEY_RANGE);
    for key in 0..10 {
        map.insert(key, f64::from(key % 3)).unwrap();
    }
    let zeros: Vec<u32> = map.iter().filter(|&(_, &value)| value == 0.0).map(|(key, _)| key).collect();
    for key in zeros {
        map.remove(key);
    }
    assert_eq!(map.len(), 6);
    assert!(map.values().all(|&value| value != 0.0));
}

fn heap_size_is_reported<M: IndexMap<Value = f64>>() {
    let mut map = M::with_key_range(KEY_RANGE);
    map.insert(1, 1.0).unwrap();
    assert!(map.heap_size() >= std::mem::size_of::<f64>());
}

macro_rules! contract_tests {
    ($($module:ident => $map:ty),* $(,)?) => {
        $(
            mod $module {
                use super::*;

                #[test]
                fn scenario() {
                    super::scenario::<$map>();
                }

                #[test]
                fn overwrite_returns_previous_value() {
                    super::overwrite_returns_previous_value::<$map>();
                }

                #[test]
                fn remove_is_idempotent() {
                    super::remove_is_idempotent::<$map>();
                }

                #[test]
                fn insert_then_remove_everything() {
                    super::insert_then_remove_everything::<$map>();
                }

                #[test]
                fn get_mut_and_get_or_insert_with() {
                    super::get_mut_and_get_or_insert_with::<$map>();
                }

                #[test]
                fn clear_empties_the_map() {
                    super::clear_empties_the_map::<$map>();
                }

                #[test]
                fn key_range_is_enforced() {
                    super::key_range_is_enforced::<$map>();
                }

                #[test]
                fn iterator_is_exact_size() {
                    super::iterator_is_exact_size::<$map>();
                }

                #[test]
                fn snapshot_then_mutate() {
                    super::snapshot_then_mutate::<$map>();
                }

                #[test]
                fn heap_size_is_reported() {
                    super::heap_size_is_reported::<$map>();
                }

                proptest! {
                    #![proptest_config(ProptestConfig::with_cases(64))]

                    #[test]
                    fn ops_match_btreemap(ops in proptest::collection::vec(op_strategy(), TEST_SIZE)) {
                        super::ops_match_btreemap::<$map>(ops)?;
                    }
                }
            }
        )*
    };
}

contract_tests! {
    sparse_direct => SparseDirectMap<f64>,
    two_level => TwoLevelMap<f64>,
    flat_index => FlatIndexMap<f64>,
    flat_sorted => FlatSortedMap<f64>,
    unordered => UnorderedIndexMap<f64>,
}

// ─── Model-based sequences ──────────────────────────────────────────────────

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 500;

/// Key range of the model tests; several blocks of a `TwoLevelMap`.
const MODEL_RANGE: u32 = 300;

#[derive(Debug, Clone)]
enum Op {
    Insert(u32, i32),
    IndexedWrite(u32, i32),
    Remove(u32),
    Get(u32),
    At(u32),
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        8 => (0..MODEL_RANGE, any::<i32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => (0..MODEL_RANGE, any::<i32>()).prop_map(|(k, v)| Op::IndexedWrite(k, v)),
        6 => (0..MODEL_RANGE).prop_map(Op::Remove),
        3 => (0..MODEL_RANGE).prop_map(Op::Get),
        2 => (0..MODEL_RANGE).prop_map(Op::At),
        1 => Just(Op::Clear),
    ]
}

/// Replays `ops` on `M` and on a `BTreeMap`, comparing every result.
fn ops_match_btreemap<M: IndexMap<Value = f64>>(ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut map = M::with_key_range(MODEL_RANGE as usize);
    let mut model: BTreeMap<u32, f64> = BTreeMap::new();

    for op in ops {
        match op {
            Op::Insert(key, value) => {
                let value = f64::from(value);
                prop_assert_eq!(map.insert(key, value), Ok(model.insert(key, value)));
            }
            Op::IndexedWrite(key, value) => {
                let value = f64::from(value);
                *map.get_or_insert_default(key).unwrap() = value;
                model.insert(key, value);
            }
            Op::Remove(key) => {
                prop_assert_eq!(map.remove(key), model.remove(&key));
            }
            Op::Get(key) => {
                prop_assert_eq!(map.get(key), model.get(&key));
                prop_assert_eq!(map.contains_key(key), model.contains_key(&key));
            }
            Op::At(key) => {
                let expected = model.get(&key).ok_or(Error::KeyNotFound { key });
                prop_assert_eq!(map.at(key), expected);
            }
            Op::Clear => {
                map.clear();
                model.clear();
            }
        }
        prop_assert_eq!(map.len(), model.len());
    }

    let expected: Vec<(u32, f64)> = model.into_iter().collect();
    if M::ORDERED {
        let actual: Vec<(u32, f64)> = map.iter().map(|(key, &value)| (key, value)).collect();
        prop_assert_eq!(actual, expected);
    } else {
        prop_assert_eq!(sorted_entries(&map), expected);
    }
    Ok(())
}

// ─── Cross-variant equivalence ──────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Every layout ends up holding the same entries after the same sequence.
    #[test]
    fn variants_agree(ops in proptest::collection::vec((any::<bool>(), 0..MODEL_RANGE, any::<i32>()), TEST_SIZE)) {
        fn replay<M: IndexMap<Value = f64>>(ops: &[(bool, u32, i32)]) -> M {
            let mut map = M::with_key_range(MODEL_RANGE as usize);
            for &(insert, key, value) in ops {
                if insert {
                    map.insert(key, f64::from(value)).unwrap();
                } else {
                    map.remove(key);
                }
            }
            map
        }

        let sparse: SparseDirectMap<f64> = replay(&ops);
        let two_level: TwoLevelMap<f64> = replay(&ops);
        let flat_index: FlatIndexMap<f64> = replay(&ops);
        let flat_sorted: FlatSortedMap<f64> = replay(&ops);
        let unordered: UnorderedIndexMap<f64> = replay(&ops);

        let expected = sorted_entries(&sparse);
        prop_assert_eq!(sorted_entries(&two_level), expected.clone());
        prop_assert_eq!(sorted_entries(&flat_index), expected.clone());
        prop_assert_eq!(sorted_entries(&flat_sorted), expected.clone());
        prop_assert_eq!(sorted_entries(&unordered), expected);

        assert_ascending(&sparse);
        assert_ascending(&two_level);
        assert_ascending(&flat_sorted);
    }
}
