//! Persistent (immutable) ordered set.
//!
//! [`PersistentTreeSet`] is a [`PersistentTreeMap`] whose values are `()`,
//! so it inherits the AVL engine, structural sharing and the compile-time
//! [`Order`] strategy.
//!
//! # Examples
//!
//! ```rust
//! use lambars_collections::persistent::PersistentTreeSet;
//!
//! let set: PersistentTreeSet<i32> = [5, 1, 3, 1].into_iter().collect();
//! assert_eq!(set.len(), 3);
//! assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 3, 5]);
//!
//! let other: PersistentTreeSet<i32> = [3, 4].into_iter().collect();
//! assert_eq!(set.union(&other).len(), 4);
//! assert!(set.intersection(&other).contains(&3));
//! ```

use super::PersistentTreeMap;
use super::treemap::{PersistentTreeMapIntoIterator, PersistentTreeMapIterator};
use crate::error::CollectionError;
use crate::typeclass::{Foldable, Monoid, NaturalOrder, Order, Semigroup};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;
use std::ops::RangeBounds;

/// A persistent (immutable) ordered set based on an AVL tree.
///
/// Element order is given by the strategy token `O` (default
/// [`NaturalOrder`]). When two elements compare equal under the strategy,
/// only one is stored: the one inserted last.
///
/// # Examples
///
/// ```rust
/// use lambars_collections::persistent::PersistentTreeSet;
/// use lambars_collections::typeclass::CaseInsensitive;
///
/// let names: PersistentTreeSet<&str, CaseInsensitive> =
///     ["bob", "Alice", "BOB"].into_iter().collect();
/// assert_eq!(names.iter().copied().collect::<Vec<_>>(), vec!["Alice", "BOB"]);
/// ```
pub struct PersistentTreeSet<T, O = NaturalOrder> {
    map: PersistentTreeMap<T, (), O>,
}

impl<T> PersistentTreeSet<T> {
    /// Creates a new empty set under the natural order.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::with_strategy()
    }
}

impl<T: Clone + Ord> PersistentTreeSet<T> {
    /// Creates a set containing a single element.
    #[inline]
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self::new().insert(element)
    }
}

impl<T, O> PersistentTreeSet<T, O> {
    /// Creates a new empty set for an explicitly chosen strategy.
    #[inline]
    #[must_use]
    pub const fn with_strategy() -> Self {
        Self {
            map: PersistentTreeMap::with_strategy(),
        }
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the set has no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the height of the underlying tree.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.map.height()
    }

    /// Returns `true` if the set contains an element equal to `element` under
    /// the strategy.
    #[must_use]
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        O: Order<Q>,
        Q: ?Sized,
    {
        self.map.contains_key(element)
    }

    /// Returns the stored element equal to `element` under the strategy.
    #[must_use]
    pub fn get<Q>(&self, element: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        O: Order<Q>,
        Q: ?Sized,
    {
        self.map.get_key_value(element).map(|(stored, _)| stored)
    }

    /// Returns the smallest element under the strategy.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::Empty`] if the set is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentTreeSet;
    ///
    /// let set: PersistentTreeSet<i32> = [3, 1, 2].into_iter().collect();
    /// assert_eq!(set.find_min(), Ok(&1));
    /// assert_eq!(set.find_max(), Ok(&3));
    /// ```
    pub fn find_min(&self) -> Result<&T, CollectionError> {
        self.map
            .find_min()
            .map(|(element, _)| element)
            .map_err(|_| CollectionError::empty("PersistentTreeSet::find_min"))
    }

    /// Returns the largest element under the strategy.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::Empty`] if the set is empty.
    pub fn find_max(&self) -> Result<&T, CollectionError> {
        self.map
            .find_max()
            .map(|(element, _)| element)
            .map_err(|_| CollectionError::empty("PersistentTreeSet::find_max"))
    }

    /// Returns the element at a position of the sorted sequence.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&T> {
        self.map.get_index(index).map(|(element, _)| element)
    }

    /// Returns the number of elements strictly less than `element`.
    #[must_use]
    pub fn rank<Q>(&self, element: &Q) -> usize
    where
        T: Borrow<Q>,
        O: Order<Q>,
        Q: ?Sized,
    {
        self.map.rank(element)
    }

    /// Returns an iterator over the elements in order.
    #[must_use]
    pub fn iter(&self) -> PersistentTreeSetIterator<'_, T> {
        PersistentTreeSetIterator {
            inner: self.map.iter(),
        }
    }

    /// Returns a lazy iterator over the elements that fall within `range`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentTreeSet;
    ///
    /// let set: PersistentTreeSet<char> = "persistent".chars().collect();
    /// let middle: String = set.range('i'..'s').collect();
    /// assert_eq!(middle, "inpr");
    /// ```
    pub fn range<R>(&self, range: R) -> impl Iterator<Item = &T>
    where
        R: RangeBounds<T>,
        T: Clone,
        O: Order<T>,
    {
        self.map.range(range).map(|(element, _)| element)
    }

    /// Folds the elements in order.
    pub fn fold<B, F>(&self, init: B, mut function: F) -> B
    where
        F: FnMut(B, &T) -> B,
    {
        self.map
            .fold(init, |accumulator, element, _| function(accumulator, element))
    }
}

impl<T: Clone, O: Order<T>> PersistentTreeSet<T, O> {
    /// Inserts an element, returning a new set.
    ///
    /// An existing equal element is replaced by `element`.
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
        O: Order<Q>,
        Q: ?Sized,
    {
        Self {
            map: self.map.remove(element),
        }
    }

    /// Returns the union of two sets.
    ///
    /// For elements present in both, the representative from `other` is kept.
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
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentTreeSet;
    ///
    /// let left: PersistentTreeSet<i32> = [1, 2, 3].into_iter().collect();
    /// let right: PersistentTreeSet<i32> = [3, 4].into_iter().collect();
    /// let result: Vec<i32> = left.symmetric_difference(&right).into_iter().collect();
    /// assert_eq!(result, vec![1, 2, 4]);
    /// ```
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

/// An iterator over the elements of a [`PersistentTreeSet`] in order.
pub struct PersistentTreeSetIterator<'a, T> {
    inner: PersistentTreeMapIterator<'a, T, ()>,
}

impl<'a, T> Iterator for PersistentTreeSetIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(element, _)| element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for PersistentTreeSetIterator<'_, T> {}

/// An owning iterator over the elements of a [`PersistentTreeSet`].
pub struct PersistentTreeSetIntoIterator<T> {
    inner: PersistentTreeMapIntoIterator<T, ()>,
}

impl<T> Iterator for PersistentTreeSetIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(element, _)| element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for PersistentTreeSetIntoIterator<T> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T, O> Clone for PersistentTreeSet<T, O> {
    fn clone(&self) -> Self {
        Self {
            map: self.map.clone(),
        }
    }
}

impl<T, O> Default for PersistentTreeSet<T, O> {
    fn default() -> Self {
        Self::with_strategy()
    }
}

impl<T: Clone, O: Order<T>> FromIterator<T> for PersistentTreeSet<T, O> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().map(|element| (element, ())).collect(),
        }
    }
}

impl<T: Clone, O> IntoIterator for PersistentTreeSet<T, O> {
    type Item = T;
    type IntoIter = PersistentTreeSetIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        PersistentTreeSetIntoIterator {
            inner: self.map.into_iter(),
        }
    }
}

impl<'a, T, O> IntoIterator for &'a PersistentTreeSet<T, O> {
    type Item = &'a T;
    type IntoIter = PersistentTreeSetIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, O: Order<T>> PartialEq for PersistentTreeSet<T, O> {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<T, O: Order<T>> Eq for PersistentTreeSet<T, O> {}

impl<T, O: Order<T>> PartialOrd for PersistentTreeSet<T, O> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T, O: Order<T>> Ord for PersistentTreeSet<T, O> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.map.cmp(&other.map)
    }
}

impl<T: Hash> Hash for PersistentTreeSet<T, NaturalOrder> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.map.hash(state);
    }
}

impl<T: fmt::Debug, O> fmt::Debug for PersistentTreeSet<T, O> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

// =============================================================================
// Type Class Implementations
// =============================================================================

impl<T: Clone, O: Order<T>> Semigroup for PersistentTreeSet<T, O> {
    fn combine(self, other: Self) -> Self {
        self.union(&other)
    }

    fn combine_ref(&self, other: &Self) -> Self {
        self.union(other)
    }
}

impl<T: Clone, O: Order<T>> Monoid for PersistentTreeSet<T, O> {
    fn empty() -> Self {
        Self::with_strategy()
    }
}

impl<T, O> Foldable for PersistentTreeSet<T, O> {
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
