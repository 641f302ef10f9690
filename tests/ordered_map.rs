use std::collections::BTreeMap;

use bst_maps::{MapError, OrderedMap};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

/// Keys drawn from a range smaller than `TEST_SIZE` so that collisions happen.
fn key_strategy() -> impl Strategy<Value = i64> {
    -1_000i64..1_000i64
}

fn value_strategy() -> impl Strategy<Value = i64> {
    any::<i64>()
}

/// Keys 5, 3, 8, 1, 4, 7, 9 inserted in that order build a full tree of height 3.
fn scenario() -> OrderedMap<i32, char> {
    let mut map = OrderedMap::new();
    for (key, value) in [(5, 'e'), (3, 'c'), (8, 'h'), (1, 'a'), (4, 'd'), (7, 'g'), (9, 'i')] {
        *map.insert_or_access(key) = value;
    }
    map
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum MapOp {
    InsertOrAccess(i64, i64),
    Insert(i64, i64),
    Remove(i64),
    Lookup(i64),
    ContainsKey(i64),
    RemoveFirstByCursor,
    RemoveLastByCursor,
}

fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        4 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::InsertOrAccess(k, v)),
        2 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::Insert(k, v)),
        3 => key_strategy().prop_map(MapOp::Remove),
        2 => key_strategy().prop_map(MapOp::Lookup),
        1 => key_strategy().prop_map(MapOp::ContainsKey),
        1 => Just(MapOp::RemoveFirstByCursor),
        1 => Just(MapOp::RemoveLastByCursor),
    ]
}

/// What a failing lookup or removal must report for a model map.
fn expected_error(model: &BTreeMap<i64, i64>) -> MapError {
    if model.is_empty() { MapError::EmptyContainer } else { MapError::KeyNotFound }
}

// ─── Model-based tests ───────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays random operations on both `OrderedMap` and `BTreeMap` and checks
    /// results, errors and length after every step.
    #[test]
    fn map_ops_match_btreemap(ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE)) {
        let mut map: OrderedMap<i64, i64> = OrderedMap::new();
        let mut model: BTreeMap<i64, i64> = BTreeMap::new();

        for op in &ops {
            match op {
                MapOp::InsertOrAccess(k, v) => {
                    *map.insert_or_access(*k) = *v;
                    model.insert(*k, *v);
                }
                MapOp::Insert(k, v) => {
                    prop_assert_eq!(map.insert(*k, *v), model.insert(*k, *v), "insert({}, {})", k, v);
                }
                MapOp::Remove(k) => {
                    let expected = model.remove(k).ok_or_else(|| expected_error(&model));
                    prop_assert_eq!(map.remove(k), expected, "remove({})", k);
                }
                MapOp::Lookup(k) => {
                    let expected = model.get(k).ok_or_else(|| expected_error(&model));
                    prop_assert_eq!(map.lookup(k), expected, "lookup({})", k);
                }
                MapOp::ContainsKey(k) => {
                    prop_assert_eq!(map.contains_key(k), model.contains_key(k), "contains_key({})", k);
                }
                MapOp::RemoveFirstByCursor => {
                    let expected = model.pop_first().ok_or(MapError::KeyNotFound);
                    prop_assert_eq!(map.begin_mut().remove_current(), expected);
                }
                MapOp::RemoveLastByCursor => {
                    let mut cursor = map.end_mut();
                    let removed = cursor.move_prev().and_then(|()| cursor.remove_current());
                    let expected = model.pop_last().ok_or(MapError::IteratorOutOfRange);
                    prop_assert_eq!(removed, expected);
                }
            }
            prop_assert_eq!(map.len(), model.len(), "len mismatch after {:?}", op);
        }

        let entries: Vec<_> = map.iter().map(|(&k, &v)| (k, v)).collect();
        let expected: Vec<_> = model.into_iter().collect();
        prop_assert_eq!(entries, expected);
    }

    /// Whatever the insertion order, iteration is sorted and matches the model.
    #[test]
    fn iteration_is_sorted(entries in proptest::collection::vec((key_strategy(), value_strategy()), 0..TEST_SIZE)) {
        let map: OrderedMap<i64, i64> = entries.iter().copied().collect();
        let model: BTreeMap<i64, i64> = entries.iter().copied().collect();

        let forward: Vec<_> = map.iter().map(|(&k, &v)| (k, v)).collect();
        let model_forward: Vec<_> = model.iter().map(|(&k, &v)| (k, v)).collect();
        prop_assert_eq!(&forward, &model_forward);

        let backward: Vec<_> = map.keys().rev().copied().collect();
        let model_backward: Vec<_> = model.keys().rev().copied().collect();
        prop_assert_eq!(backward, model_backward);

        prop_assert_eq!(map.first_key_value(), model.first_key_value());
        prop_assert_eq!(map.last_key_value(), model.last_key_value());
        prop_assert!(map.height() <= map.len());
    }

    /// A cursor walk visits exactly what the iterator visits, in both directions.
    #[test]
    fn cursor_walk_matches_iteration(keys in proptest::collection::vec(key_strategy(), 0..200)) {
        let map: OrderedMap<i64, ()> = keys.iter().map(|&k| (k, ())).collect();

        let mut cursor = map.begin();
        let mut forward = Vec::new();
        while let Ok((key, _)) = cursor.entry() {
            forward.push(*key);
            cursor.move_next().unwrap();
        }
        prop_assert_eq!(cursor, map.end());
        prop_assert_eq!(&forward, &map.keys().copied().collect::<Vec<_>>());

        let mut backward = Vec::new();
        while cursor.move_prev().is_ok() {
            backward.push(*cursor.key().unwrap());
        }
        forward.reverse();
        prop_assert_eq!(backward, forward);
        prop_assert_eq!(cursor, map.begin());
    }

    /// Maps with the same contents compare equal whatever their shape.
    #[test]
    fn equality_ignores_insertion_order(keys in proptest::collection::vec(key_strategy(), 0..200)) {
        let ascending: OrderedMap<i64, i64> = keys.iter().map(|&k| (k, k * 2)).collect();
        let mut shuffled = keys.clone();
        shuffled.reverse();
        let descending: OrderedMap<i64, i64> = shuffled.iter().map(|&k| (k, k * 2)).collect();
        prop_assert_eq!(&ascending, &descending);
        prop_assert_eq!(ascending.clone(), descending);
    }
}

// ─── Walkthrough of the documented scenario ──────────────────────────────────

#[test]
fn scenario_iteration_and_height() {
    let map = scenario();
    let entries: Vec<_> = map.iter().map(|(&k, &v)| (k, v)).collect();
    assert_eq!(
        entries,
        vec![(1, 'a'), (3, 'c'), (4, 'd'), (5, 'e'), (7, 'g'), (8, 'h'), (9, 'i')]
    );
    assert_eq!(map.height(), 3);
    assert_eq!(map.len(), 7);
}

#[test]
fn scenario_removals() {
    let mut map = scenario();

    // Two children: the successor 9 takes 8's place.
    assert_eq!(map.remove(&8), Ok('h'));
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![1, 3, 4, 5, 7, 9]);

    // The root, also with two children.
    assert_eq!(map.remove(&5), Ok('e'));
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![1, 3, 4, 7, 9]);

    assert_eq!(map.remove(&6), Err(MapError::KeyNotFound));
    assert_eq!(map.len(), 5);

    for key in [1, 3, 4, 7, 9] {
        assert!(map.lookup(&key).is_ok());
        map.remove(&key).unwrap();
    }
    assert_eq!(map.remove(&1), Err(MapError::EmptyContainer));
    assert_eq!(map.lookup(&1), Err(MapError::EmptyContainer));
}

#[test]
fn insert_or_access_keeps_existing_value() {
    let mut map = scenario();
    assert_eq!(*map.insert_or_access(4), 'd');
    *map.insert_or_access(4) = 'D';
    assert_eq!(map.len(), 7);
    assert_eq!(map[&4], 'D');
}

#[test]
fn lookup_mut_updates_in_place() {
    let mut map = scenario();
    *map.lookup_mut(&7).unwrap() = 'G';
    assert_eq!(map.get(&7), Some(&'G'));
    assert_eq!(map.lookup_mut(&2), Err(MapError::KeyNotFound));
}

#[test]
fn cursor_errors() {
    let map = scenario();

    let mut end = map.end();
    assert_eq!(end.entry(), Err(MapError::IteratorOutOfRange));
    assert_eq!(end.move_next(), Err(MapError::IteratorOutOfRange));
    assert_eq!(end, map.end());

    let mut begin = map.begin();
    assert_eq!(begin.move_prev(), Err(MapError::IteratorOutOfRange));
    assert_eq!(begin.key(), Some(&1));

    assert!(map.find(&6).is_end());
    assert_eq!(map.find(&4).value(), Some(&'d'));
}

#[test]
fn cursor_mut_edits_and_removes() {
    let mut map = scenario();
    let mut cursor = map.find_mut(&3);
    *cursor.value_mut().unwrap() = 'C';
    cursor.move_next().unwrap();
    assert_eq!(cursor.remove_current(), Ok((4, 'd')));
    assert_eq!(cursor.key(), Some(&5));
    assert_eq!(map.get(&3), Some(&'C'));
    assert_eq!(map.len(), 6);
}

#[test]
fn clone_is_independent() {
    let original = scenario();
    let mut copy = original.clone();
    assert_eq!(copy, original);
    assert_eq!(copy.height(), original.height());

    copy.remove(&5).unwrap();
    assert_ne!(copy, original);
    assert_eq!(original.len(), 7);
    assert_eq!(original.lookup(&5), Ok(&'e'));
}

#[test]
fn degenerate_tree_survives_traversal_clone_and_drop() {
    let map: OrderedMap<u32, u32> = (0..10_000).map(|k| (k, k)).collect();
    assert_eq!(map.height(), 10_000);
    let copy = map.clone();
    assert_eq!(copy.iter().rev().next(), Some((&9_999, &9_999)));
    assert_eq!(copy, map);
    drop(copy);
    drop(map);
}

#[test]
fn owned_iteration_is_sorted() {
    let map = scenario();
    let values: String = map.into_iter().map(|(_, v)| v).collect();
    assert_eq!(values, "acdeghi");
}

#[test]
fn values_mut_and_debug() {
    let mut map: OrderedMap<i32, i32> = [(2, 20), (1, 10)].into();
    for value in map.values_mut() {
        *value += 1;
    }
    assert_eq!(format!("{map:?}"), "{1: 11, 2: 21}");
}
