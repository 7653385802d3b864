#![cfg(feature = "persistent")]
//! Unit tests for PersistentTreeMap and PersistentTreeSet.

use lambars_collections::error::CollectionError;
use lambars_collections::persistent::{PersistentTreeMap, PersistentTreeSet};
use lambars_collections::typeclass::{CaseInsensitive, Foldable, Monoid, Order, ReverseOrder};
use rstest::{fixture, rstest};
use std::cmp::Ordering;
use std::ops::Bound;

#[fixture]
fn scenario() -> PersistentTreeMap<i32, i32> {
    [5, 3, 8, 1, 4, 7, 9]
        .into_iter()
        .fold(PersistentTreeMap::new(), |map, key| map.insert(key, key * 10))
}

// =============================================================================
// Concrete Scenario
// =============================================================================

#[rstest]
fn test_scenario_iterates_in_key_order(scenario: PersistentTreeMap<i32, i32>) {
    let entries: Vec<(i32, i32)> = scenario.iter().map(|(key, value)| (*key, *value)).collect();
    assert_eq!(
        entries,
        vec![(1, 10), (3, 30), (4, 40), (5, 50), (7, 70), (8, 80), (9, 90)]
    );
    assert_eq!(scenario.len(), 7);
    assert_eq!(scenario.find_min(), Ok((&1, &10)));
    assert_eq!(scenario.find_max(), Ok((&9, &90)));
}

#[rstest]
fn test_scenario_remove_leaves_original(scenario: PersistentTreeMap<i32, i32>) {
    let removed = scenario.remove(&5);
    assert_eq!(removed.len(), 6);
    assert_eq!(removed.get(&5), None);
    assert_eq!(
        removed.keys().copied().collect::<Vec<_>>(),
        vec![1, 3, 4, 7, 8, 9]
    );
    assert_eq!(scenario.get(&5), Some(&50));
    assert_eq!(scenario.len(), 7);
}

#[rstest]
#[case(Bound::Included(3), Bound::Excluded(8), vec![3, 4, 5, 7])]
#[case(Bound::Excluded(3), Bound::Included(8), vec![4, 5, 7, 8])]
#[case(Bound::Unbounded, Bound::Included(2), vec![1])]
#[case(Bound::Included(10), Bound::Unbounded, vec![])]
fn test_scenario_range(
    scenario: PersistentTreeMap<i32, i32>,
    #[case] start: Bound<i32>,
    #[case] end: Bound<i32>,
    #[case] expected: Vec<i32>,
) {
    let keys: Vec<i32> = scenario.range((start, end)).map(|(key, _)| *key).collect();
    assert_eq!(keys, expected);
}

#[rstest]
#[case(0, Some(1))]
#[case(3, Some(5))]
#[case(6, Some(9))]
#[case(7, None)]
fn test_scenario_get_index(
    scenario: PersistentTreeMap<i32, i32>,
    #[case] index: usize,
    #[case] expected: Option<i32>,
) {
    assert_eq!(scenario.get_index(index).map(|(key, _)| *key), expected);
}

#[rstest]
#[case(1, 0)]
#[case(6, 4)]
#[case(100, 7)]
fn test_scenario_rank(
    scenario: PersistentTreeMap<i32, i32>,
    #[case] key: i32,
    #[case] expected: usize,
) {
    assert_eq!(scenario.rank(&key), expected);
}

// =============================================================================
// Errors and Edge Cases
// =============================================================================

#[rstest]
fn test_empty_map_min_max_fail() {
    let map: PersistentTreeMap<i32, i32> = PersistentTreeMap::new();
    assert!(matches!(map.find_min(), Err(CollectionError::Empty { .. })));
    assert!(matches!(map.find_max(), Err(CollectionError::Empty { .. })));
    assert_eq!(map.height(), 0);
}

#[rstest]
fn test_remove_missing_key_is_noop(scenario: PersistentTreeMap<i32, i32>) {
    assert_eq!(scenario.remove(&42), scenario);
}

#[rstest]
fn test_update_missing_key_returns_none(scenario: PersistentTreeMap<i32, i32>) {
    assert!(scenario.update(&42, |value| value + 1).is_none());
    let updated = scenario.update(&4, |value| value + 1).unwrap();
    assert_eq!(updated.get(&4), Some(&41));
    assert_eq!(scenario.get(&4), Some(&40));
}

#[rstest]
fn test_insert_if_absent_keeps_existing(scenario: PersistentTreeMap<i32, i32>) {
    let kept = scenario.insert_if_absent(3, 0);
    assert_eq!(kept.get(&3), Some(&30));
    let added = scenario.insert_if_absent(2, 20);
    assert_eq!(added.get(&2), Some(&20));
}

// =============================================================================
// Strategies
// =============================================================================

#[rstest]
fn test_reverse_order_strategy() {
    let map: PersistentTreeMap<i32, &str, ReverseOrder> =
        [(1, "a"), (3, "c"), (2, "b")].into_iter().collect();
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
    assert_eq!(map.find_min(), Ok((&3, &"c")));
}

#[rstest]
fn test_case_insensitive_strategy_merges_keys() {
    let map: PersistentTreeMap<String, i32, CaseInsensitive> = PersistentTreeMap::with_strategy()
        .insert("Apple".to_string(), 1)
        .insert("APPLE".to_string(), 2)
        .insert("banana".to_string(), 3);
    assert_eq!(map.len(), 2);
    assert_eq!(map.get("apple"), Some(&2));
    assert!(map.contains_key("BANANA"));
}

/// Orders by length only, so words of equal length are the same key.
struct ByLength;

impl Order<str> for ByLength {
    fn compare(left: &str, right: &str) -> Ordering {
        left.len().cmp(&right.len())
    }
}

impl Order<String> for ByLength {
    fn compare(left: &String, right: &String) -> Ordering {
        <Self as Order<str>>::compare(left, right)
    }
}

#[rstest]
fn test_user_defined_strategy() {
    let set: PersistentTreeSet<String, ByLength> = ["bb", "a", "cc", "ddd"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(set.len(), 3);
    assert_eq!(
        set.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["a", "cc", "ddd"]
    );
    assert!(set.contains("zz"));
}

/// Scrambles comparisons: neither antisymmetric nor transitive nor reflexive.
struct Scrambled;

impl Order<u32> for Scrambled {
    fn compare(left: &u32, right: &u32) -> Ordering {
        let mixed =
            left.wrapping_mul(0x9E37_79B9) ^ right.rotate_left(7).wrapping_mul(0x85EB_CA6B);
        match mixed % 3 {
            0 => Ordering::Less,
            1 => Ordering::Equal,
            _ => Ordering::Greater,
        }
    }
}

fn assert_consistent_size<V>(map: &PersistentTreeMap<u32, V, Scrambled>) {
    assert_eq!(map.len(), map.iter().count());
    assert_eq!(map.len(), map.keys().count());
}

#[rstest]
fn test_non_total_order_is_undefined_but_never_panics() {
    let empty = PersistentTreeMap::<u32, u32, Scrambled>::with_strategy();
    let left = (0..2_000u32).fold(empty, |map, key| {
        let map = map.insert(key, key);
        if key % 3 == 0 {
            map.remove(&(key / 2))
        } else {
            map
        }
    });
    let right: PersistentTreeMap<u32, u32, Scrambled> =
        (1_000..3_000u32).map(|key| (key, key * 2)).collect();
    assert_consistent_size(&left);
    assert_consistent_size(&right);

    for combined in [
        left.union(&right),
        left.intersection(&right),
        left.difference(&right),
        left.symmetric_difference(&right),
        left.union_with(&right, |_, mine, theirs| mine + theirs),
    ] {
        assert_consistent_size(&combined);
        assert!(combined.range(100..900).count() <= combined.len());
    }

    let set: PersistentTreeSet<u32, Scrambled> = (0..500).collect();
    assert_eq!(set.len(), set.iter().count());
    assert!(set.range(..250).count() <= set.len());
    assert!(set.find_min().is_ok() && set.find_max().is_ok());
    assert!(set.get_index(set.len()).is_none());
}

// =============================================================================
// Set Algebra and Type Classes
// =============================================================================

#[rstest]
fn test_union_is_right_biased() {
    let left: PersistentTreeMap<i32, &str> = [(1, "left"), (2, "left")].into_iter().collect();
    let right: PersistentTreeMap<i32, &str> = [(2, "right"), (3, "right")].into_iter().collect();
    let union = left.union(&right);
    assert_eq!(
        union.iter().map(|(key, value)| (*key, *value)).collect::<Vec<_>>(),
        vec![(1, "left"), (2, "right"), (3, "right")]
    );
}

#[rstest]
fn test_intersection_keeps_left_values() {
    let left: PersistentTreeMap<i32, &str> = [(1, "left"), (2, "left")].into_iter().collect();
    let right: PersistentTreeMap<i32, &str> = [(2, "right"), (3, "right")].into_iter().collect();
    let common = left.intersection(&right);
    assert_eq!(common.get(&2), Some(&"left"));
    assert_eq!(common.len(), 1);
}

#[rstest]
fn test_set_relations() {
    let small: PersistentTreeSet<i32> = (1..=3).collect();
    let large: PersistentTreeSet<i32> = (1..=5).collect();
    assert!(small.is_subset(&large));
    assert!(large.is_superset(&small));
    assert!(small.is_disjoint(&(10..12).collect::<PersistentTreeSet<i32>>()));
    assert_eq!(
        large.difference(&small),
        (4..=5).collect::<PersistentTreeSet<i32>>()
    );
    assert_eq!(
        small.symmetric_difference(&(3..=4).collect::<PersistentTreeSet<i32>>()),
        [1, 2, 4].into_iter().collect::<PersistentTreeSet<i32>>()
    );
}

#[rstest]
fn test_monoid_and_foldable(scenario: PersistentTreeMap<i32, i32>) {
    let combined = PersistentTreeMap::combine_all(vec![
        scenario.clone(),
        PersistentTreeMap::singleton(2, 20),
        PersistentTreeMap::empty(),
    ]);
    assert_eq!(combined.len(), 8);
    let total = combined.fold_left(0, |sum, (_, value)| sum + value);
    assert_eq!(total, 390);
    assert!(combined.for_all(|(key, value)| key * 10 == *value));
}
