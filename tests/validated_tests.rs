#![cfg(all(feature = "persistent", feature = "validated"))]
//! Tests for the invariant-checking wrapper.

use lambars_collections::error::CollectionError;
use lambars_collections::persistent::{PersistentHashSet, PersistentList, PersistentVector};
use lambars_collections::validated::{
    AllItems, Both, Invariant, ItemPredicate, MaxLength, MinLength, NonEmpty, Validated,
};
use proptest::prelude::*;
use rstest::rstest;

type NonEmptyVector = Validated<PersistentVector<i32>, NonEmpty>;
type SmallSet = Validated<PersistentHashSet<u8>, Both<NonEmpty, MaxLength<3>>>;

fn violated(invariant: &'static str, operation: &'static str) -> CollectionError {
    CollectionError::InvariantViolated {
        invariant,
        operation,
    }
}

#[rstest]
fn test_from_items_rejects_empty_input() {
    let result = NonEmptyVector::from_items(Vec::<i32>::new());
    assert_eq!(
        result.err(),
        Some(violated("NonEmpty", "Validated::from_items"))
    );
}

#[rstest]
fn test_pop_back_to_empty_is_rejected() {
    let single = NonEmptyVector::from_items([1]).unwrap();
    let result = single.try_mutate("pop_back", |vector| vector.pop_back());
    assert_eq!(result.err(), Some(violated("NonEmpty", "pop_back")));
    assert_eq!(single.len(), 1);
    assert_eq!(single.first(), Some(&1));
}

#[rstest]
fn test_successful_mutations_chain() {
    let vector = NonEmptyVector::from_items([1, 2])
        .and_then(|vector| vector.mutate("push_back", |inner| inner.push_back(3)))
        .and_then(|vector| {
            vector.mutate("update", |inner| {
                inner.update(0, 10).unwrap_or_else(|_| inner.clone())
            })
        })
        .unwrap();
    assert_eq!(vector.iter().copied().collect::<Vec<_>>(), vec![10, 2, 3]);
    assert_eq!(vector.into_inner().len(), 3);
}

#[rstest]
#[case(&[], Some("NonEmpty"))]
#[case(&[1, 2, 3], None)]
#[case(&[1, 2, 3, 4], Some("MaxLength"))]
#[case(&[1, 1, 1, 1], None)]
fn test_conjunction_reports_first_failure(
    #[case] elements: &[u8],
    #[case] expected: Option<&'static str>,
) {
    let result = SmallSet::from_items(elements.iter().copied());
    assert_eq!(
        result.err().map(|error| match error {
            CollectionError::InvariantViolated { invariant, .. } => invariant,
            other => other.operation(),
        }),
        expected
    );
}

#[rstest]
fn test_custom_invariant_over_elements() {
    struct AllPositive;

    impl Invariant<PersistentList<i32>> for AllPositive {
        const NAME: &'static str = "AllPositive";

        fn holds(collection: &PersistentList<i32>) -> bool {
            collection.iter().all(|element| *element > 0)
        }
    }

    let list: Validated<PersistentList<i32>, AllPositive> =
        Validated::from_items([3, 2, 1]).unwrap();
    assert!(list.mutate("cons", |inner| inner.cons(-1)).is_err());
    assert_eq!(list.mutate("cons", |inner| inner.cons(4)).unwrap().len(), 4);
}

struct NotBlank;

impl ItemPredicate for NotBlank {
    type Item = String;
    const NAME: &'static str = "NotBlank";

    fn holds(item: &String) -> bool {
        !item.trim().is_empty()
    }
}

type Tags = Validated<PersistentList<String>, Both<NonEmpty, AllItems<NotBlank>>>;

fn tags(names: &[&str]) -> Result<Tags, CollectionError> {
    Tags::from_items(names.iter().map(|name| (*name).to_string()))
}

#[rstest]
#[case(&["rust", "  "], Some("NotBlank"))]
#[case(&[], Some("NonEmpty"))]
#[case(&["rust", "hamt"], None)]
fn test_element_predicate_on_construction(
    #[case] names: &[&str],
    #[case] expected: Option<&'static str>,
) {
    assert_eq!(
        tags(names).err().map(|error| match error {
            CollectionError::InvariantViolated { invariant, .. } => invariant,
            other => other.operation(),
        }),
        expected
    );
}

#[rstest]
fn test_element_predicate_on_mutation() {
    let current = tags(&["rust", "hamt"]).unwrap();
    let result = current.mutate("cons", |list| list.cons(String::new()));
    assert_eq!(result.err(), Some(violated("NotBlank", "cons")));
    assert_eq!(current.len(), 2);

    let extended = current
        .mutate("cons", |list| list.cons("avl".to_string()))
        .unwrap();
    assert_eq!(extended.head().map(String::as_str), Ok("avl"));
}

proptest! {
    /// A wrapper can only be observed with a collection that satisfies its invariant.
    #[test]
    fn prop_min_length_is_enforced(
        elements in prop::collection::vec(any::<i32>(), 0..10),
        pops in 0usize..10,
    ) {
        let result: Result<Validated<PersistentVector<i32>, MinLength<3>>, _> =
            Validated::from_items(elements.iter().copied());
        prop_assert_eq!(result.is_ok(), elements.len() >= 3);

        if let Ok(mut current) = result {
            for _ in 0..pops {
                match current.try_mutate("pop_back", |vector| vector.pop_back()) {
                    Ok((next, _)) => current = next,
                    Err(error) => {
                        prop_assert_eq!(error, violated("MinLength", "pop_back"));
                        break;
                    }
                }
                prop_assert!(current.len() >= 3);
            }
        }
    }
}
