//! Persistent (immutable) hash set based on HAMT.
//!
//! [`PersistentHashSet`] is a [`PersistentHashMap`] whose values are `()`.
//! Membership is decided by the [`Equivalence`] strategy token.
//!
//! # Examples
//!
//! ```rust
//! use lambars_collections::persistent::PersistentHashSet;
//!
//! let set = PersistentHashSet::new().insert(1).insert(2).insert(3);
//! assert!(set.contains(&1));
//!
//! let updated = set.insert(4);
//! assert_eq!(set.len(), 3);
//! assert_eq!(updated.len(), 4);
//!
//! let other: PersistentHashSet<i32> = [2, 3, 4].into_iter().collect();
//! assert_eq!(set.union(&other).len(), 4);
//! assert_eq!(set.intersection(&other).len(), 2);
//! ```

use super::PersistentHashMap;
use super::hashmap::{PersistentHashMapIntoIterator, PersistentHashMapIterator};
use crate::typeclass::{Equivalence, Foldable, Monoid, NaturalEquivalence, Semigroup};
use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::iter::FromIterator;

/// A persistent (immutable) hash set based on HAMT.
///
/// # Examples
///
/// ```rust
/// use lambars_collections::persistent::PersistentHashSet;
///
/// let set: PersistentHashSet<&str> = ["a", "b", "a"].into_iter().collect();
/// assert_eq!(set.len(), 2);
/// assert!(set.contains("a") && set.contains("b"));
/// ```
pub struct PersistentHashSet<T, E = NaturalEquivalence> {
    map: PersistentHashMap<T, (), E>,
}

impl<T> PersistentHashSet<T> {
    /// Creates a new empty set using the natural equivalence.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::with_strategy()
    }
}

impl<T: Clone + Hash + Eq> PersistentHashSet<T> {
    /// Creates a set containing a single element.
    #[inline]
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self::new().insert(element)
    }
}

impl<T, E> PersistentHashSet<T, E> {
    /// Creates a new empty set for an explicitly chosen strategy.
    #[inline]
    #[must_use]
    pub const fn with_strategy() -> Self {
        Self {
            map: PersistentHashMap::with_strategy(),
        }
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the set has no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns `true` if the set contains an element equivalent to `element`.
    #[must_use]
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        E: Equivalence<Q>,
        Q: ?Sized,
    {
        self.map.contains_key(element)
    }

    /// Returns the stored element equivalent to `element`.
    #[must_use]
    pub fn get<Q>(&self, element: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        E: Equivalence<Q>,
        Q: ?Sized,
    {
        self.map.get_key_value(element).map(|(stored, _)| stored)
    }

    /// Returns an iterator over the elements in trie order.
    #[must_use]
    pub fn iter(&self) -> PersistentHashSetIterator<'_, T> {
        PersistentHashSetIterator {
            inner: self.map.iter(),
        }
    }

    /// Folds the elements in iteration order.
    pub fn fold<B, F>(&self, init: B, mut function: F) -> B
    where
        F: FnMut(B, &T) -> B,
    {
        self.map
            .fold(init, |accumulator, element, _| function(accumulator, element))
    }
}

impl<T: Clone, E: Equivalence<T>> PersistentHashSet<T, E> {
    /// Inserts an element, returning a new set.
    ///
    /// An existing equivalent element is replaced by `element`.
    #[must_use]
    pub fn insert(&self, element: T) -> Self {
        Self {
            map: self.map.insert(element, ()),
        }
    }

    /// Removes an element, returning a new set.
    #[must_use]
    pub fn remove<Q>(&self, element: &Q) -> Self
    where
        T: Borrow<Q>,
        E: Equivalence<Q>,
        Q: ?Sized,
    {
        Self {
            map: self.map.remove(element),
        }
    }

    /// Returns the union of two sets; the representative from `other` wins.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            map: self.map.union(&other.map),
        }
    }

    /// Returns the elements of `self` that are also in `other`.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            map: self.map.intersection(&other.map),
        }
    }

    /// Returns the elements of `self` that are not in `other`.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        Self {
            map: self.map.difference(&other.map),
        }
    }

    /// Returns the elements in exactly one of the two sets.
    #[must_use]
    pub fn symmetric_difference(&self, other: &Self) -> Self {
        Self {
            map: self.map.symmetric_difference(&other.map),
        }
    }

    /// Returns `true` if every element of `self` is in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.len() <= other.len() && self.iter().all(|element| other.contains(element))
    }

    /// Returns `true` if every element of `other` is in `self`.
    #[must_use]
    pub fn is_superset(&self, other: &Self) -> bool {
        other.is_subset(self)
    }

    /// Returns `true` if the sets have no element in common.
    #[must_use]
    pub fn is_disjoint(&self, other: &Self) -> bool {
        let (smaller, larger) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        !smaller.iter().any(|element| larger.contains(element))
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over the elements of a [`PersistentHashSet`].
pub struct PersistentHashSetIterator<'a, T> {
    inner: PersistentHashMapIterator<'a, T, ()>,
}

impl<'a, T> Iterator for PersistentHashSetIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(element, _)| element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for PersistentHashSetIterator<'_, T> {}

/// An owning iterator over the elements of a [`PersistentHashSet`].
pub struct PersistentHashSetIntoIterator<T> {
    inner: PersistentHashMapIntoIterator<T, ()>,
}

impl<T> Iterator for PersistentHashSetIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(element, ())| element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for PersistentHashSetIntoIterator<T> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T, E> Clone for PersistentHashSet<T, E> {
    fn clone(&self) -> Self {
        Self {
            map: self.map.clone(),
        }
    }
}

impl<T, E> Default for PersistentHashSet<T, E> {
    fn default() -> Self {
        Self::with_strategy()
    }
}

impl<T: Clone, E: Equivalence<T>> FromIterator<T> for PersistentHashSet<T, E> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().map(|element| (element, ())).collect(),
        }
    }
}

impl<T: Clone, E> IntoIterator for PersistentHashSet<T, E> {
    type Item = T;
    type IntoIter = PersistentHashSetIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        PersistentHashSetIntoIterator {
            inner: self.map.into_iter(),
        }
    }
}

impl<'a, T, E> IntoIterator for &'a PersistentHashSet<T, E> {
    type Item = &'a T;
    type IntoIter = PersistentHashSetIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, E: Equivalence<T>> PartialEq for PersistentHashSet<T, E> {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<T, E: Equivalence<T>> Eq for PersistentHashSet<T, E> {}

impl<T: fmt::Debug, E> fmt::Debug for PersistentHashSet<T, E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

// =============================================================================
// Type Class Implementations
// =============================================================================

impl<T: Clone, E: Equivalence<T>> Semigroup for PersistentHashSet<T, E> {
    fn combine(self, other: Self) -> Self {
        self.union(&other)
    }

    fn combine_ref(&self, other: &Self) -> Self {
        self.union(other)
    }
}

impl<T: Clone, E: Equivalence<T>> Monoid for PersistentHashSet<T, E> {
    fn empty() -> Self {
        Self::with_strategy()
    }
}

impl<T, E> Foldable for PersistentHashSet<T, E> {
    type Item<'a>
        = &'a T
    where
        Self: 'a;

    fn fold_left<'a, B, F>(&'a self, init: B, function: F) -> B
    where
        F: FnMut(B, &'a T) -> B,
    {
        self.iter().fold(init, function)
    }

    #[inline]
    fn length(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typeclass::CaseInsensitive;
    use rstest::rstest;

    fn set_of(elements: &[i32]) -> PersistentHashSet<i32> {
        elements.iter().copied().collect()
    }

    #[rstest]
    fn test_duplicates_collapse() {
        let set: PersistentHashSet<&str> = ["a", "b", "a"].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains("a"));
        assert!(set.contains("b"));
        assert!(!set.contains("c"));
    }

    #[rstest]
    fn test_remove_preserves_original() {
        let set = set_of(&[1, 2, 3]);
        let removed = set.remove(&2);
        assert_eq!(removed, set_of(&[1, 3]));
        assert!(set.contains(&2));
    }

    #[rstest]
    fn test_set_algebra() {
        let left = set_of(&[1, 2, 3, 4]);
        let right = set_of(&[3, 4, 5]);
        assert_eq!(left.union(&right), set_of(&[1, 2, 3, 4, 5]));
        assert_eq!(left.intersection(&right), set_of(&[3, 4]));
        assert_eq!(left.difference(&right), set_of(&[1, 2]));
        assert_eq!(left.symmetric_difference(&right), set_of(&[1, 2, 5]));
    }

    #[rstest]
    #[case(&[1, 2], &[1, 2, 3], true)]
    #[case(&[1, 4], &[1, 2, 3], false)]
    #[case(&[], &[], true)]
    fn test_subset_superset(#[case] left: &[i32], #[case] right: &[i32], #[case] expected: bool) {
        assert_eq!(set_of(left).is_subset(&set_of(right)), expected);
        assert_eq!(set_of(right).is_superset(&set_of(left)), expected);
    }

    #[rstest]
    #[case(&[1, 2], &[3], true)]
    #[case(&[1, 2], &[2], false)]
    fn test_is_disjoint(#[case] left: &[i32], #[case] right: &[i32], #[case] expected: bool) {
        assert_eq!(set_of(left).is_disjoint(&set_of(right)), expected);
    }

    #[rstest]
    fn test_case_insensitive_membership() {
        let set: PersistentHashSet<String, CaseInsensitive> =
            ["Alpha".to_string(), "ALPHA".to_string(), "beta".to_string()]
                .into_iter()
                .collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains("alpha"));
        assert_eq!(set.get("alpha").map(String::as_str), Some("ALPHA"));
    }

    #[rstest]
    fn test_debug_and_fold() {
        let set = PersistentHashSet::singleton(7);
        assert_eq!(format!("{set:?}"), "{7}");
        assert_eq!(set.fold_left(0, |sum, element| sum + element), 7);
        assert_eq!(PersistentHashSet::combine_all(vec![set.clone(), set_of(&[8])]).len(), 2);
    }
}
