//! Persistent (immutable) singly-linked list.
//!
//! This module provides [`PersistentList`], an immutable cons list that
//! shares its tail between versions.
//!
//! # Overview
//!
//! - O(1) prepend (`cons`)
//! - O(1) head and tail access
//! - O(n) index access
//! - O(n) `append` (copies the left spine, shares the right) and `reverse`
//!
//! # Examples
//!
//! ```rust
//! use lambars_collections::persistent::PersistentList;
//!
//! let list = PersistentList::new().cons(3).cons(2).cons(1);
//! assert_eq!(list.head(), Ok(&1));
//! assert_eq!(list.len(), 3);
//!
//! // Structural sharing: the original list is preserved
//! let extended = list.cons(0);
//! assert_eq!(list.len(), 3);
//! assert_eq!(extended.len(), 4);
//!
//! let list: PersistentList<i32> = (1..=5).collect();
//! assert_eq!(list.iter().sum::<i32>(), 15);
//! ```
//!
//! # Structural Sharing
//!
//! ```text
//! list1: 1 -> 2 -> 3 -> nil
//! list2 = list1.cons(0): 0 -> [1 -> 2 -> 3 -> nil]  // shares [1, 2, 3] with list1
//! ```

use super::ReferenceCounter;
use crate::error::CollectionError;
use crate::typeclass::{Foldable, Monoid, Semigroup};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

type Link<T> = Option<ReferenceCounter<Node<T>>>;

struct Node<T> {
    element: T,
    next: Link<T>,
}

/// A persistent (immutable) singly-linked list.
///
/// # Time Complexity
///
/// | Operation | Complexity |
/// |-----------|------------|
/// | `cons`    | O(1)       |
/// | `head`    | O(1)       |
/// | `tail`    | O(1)       |
/// | `len`     | O(1)       |
/// | `get`     | O(i)       |
/// | `append`  | O(n)       |
/// | `reverse` | O(n)       |
///
/// # Examples
///
/// ```rust
/// use lambars_collections::persistent::PersistentList;
///
/// let list = PersistentList::singleton(42);
/// assert_eq!(list.head(), Ok(&42));
/// ```
pub struct PersistentList<T> {
    head: Link<T>,
    length: usize,
}

impl<T> PersistentList<T> {
    /// Creates a new empty list.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            head: None,
            length: 0,
        }
    }

    /// Creates a list containing a single element.
    #[inline]
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self::new().cons(element)
    }

    /// Prepends an element, sharing `self` as the tail of the result.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentList;
    ///
    /// let list = PersistentList::new().cons(2).cons(1);
    /// assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
    /// ```
    #[inline]
    #[must_use]
    pub fn cons(&self, element: T) -> Self {
        Self {
            head: Some(ReferenceCounter::new(Node {
                element,
                next: self.head.clone(),
            })),
            length: self.length + 1,
        }
    }

    /// Returns the first element.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::Empty`] if the list is empty.
    #[inline]
    pub fn head(&self) -> Result<&T, CollectionError> {
        self.head
            .as_ref()
            .map(|node| &node.element)
            .ok_or(CollectionError::empty("PersistentList::head"))
    }

    /// Returns the list without its first element.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::Empty`] if the list is empty.
    #[inline]
    pub fn tail(&self) -> Result<Self, CollectionError> {
        self.uncons()
            .map(|(_, tail)| tail)
            .ok_or(CollectionError::empty("PersistentList::tail"))
    }

    /// Splits the list into its head and tail, or `None` when empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentList;
    ///
    /// let list = PersistentList::new().cons(2).cons(1);
    /// let (head, tail) = list.uncons().unwrap();
    /// assert_eq!(*head, 1);
    /// assert_eq!(tail.head(), Ok(&2));
    /// ```
    #[inline]
    #[must_use]
    pub fn uncons(&self) -> Option<(&T, Self)> {
        self.head.as_ref().map(|node| {
            let tail = Self {
                head: node.next.clone(),
                length: self.length - 1,
            };
            (&node.element, tail)
        })
    }

    /// Returns the element at `index`, walking `index` links.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.length {
            return None;
        }
        self.iter().nth(index)
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the list has no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns an iterator from head to last.
    #[must_use]
    pub fn iter(&self) -> PersistentListIterator<'_, T> {
        PersistentListIterator {
            current: self.head.as_deref(),
            remaining: self.length,
        }
    }

    fn from_vec(mut elements: Vec<T>) -> Self {
        let length = elements.len();
        let mut head: Link<T> = None;
        while let Some(element) = elements.pop() {
            head = Some(ReferenceCounter::new(Node {
                element,
                next: head,
            }));
        }
        Self { head, length }
    }
}

impl<T: Clone> PersistentList<T> {
    /// Returns the elements of `self` followed by those of `other`.
    ///
    /// Copies the spine of `self` and shares all of `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentList;
    ///
    /// let left: PersistentList<i32> = (1..=2).collect();
    /// let right: PersistentList<i32> = (3..=4).collect();
    /// let combined = left.append(&right);
    /// assert_eq!(combined.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    /// ```
    #[must_use]
    pub fn append(&self, other: &Self) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }

        let mut elements: Vec<T> = self.iter().cloned().collect();
        let mut head = other.head.clone();
        while let Some(element) = elements.pop() {
            head = Some(ReferenceCounter::new(Node {
                element,
                next: head,
            }));
        }
        Self {
            head,
            length: self.length + other.length,
        }
    }

    /// Returns the list in reverse order.
    #[must_use]
    pub fn reverse(&self) -> Self {
        self.iter()
            .fold(Self::new(), |reversed, element| reversed.cons(element.clone()))
    }
}

impl<T> Drop for PersistentList<T> {
    // Unlinks uniquely owned nodes one at a time so long lists do not
    // recurse once per node.
    fn drop(&mut self) {
        let mut current = self.head.take();
        while let Some(node) = current {
            match ReferenceCounter::try_unwrap(node) {
                Ok(mut owned) => current = owned.next.take(),
                Err(_) => break,
            }
        }
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over references to elements of a [`PersistentList`].
pub struct PersistentListIterator<'a, T> {
    current: Option<&'a Node<T>>,
    remaining: usize,
}

impl<'a, T> Iterator for PersistentListIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.current.map(|node| {
            self.current = node.next.as_deref();
            self.remaining -= 1;
            &node.element
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for PersistentListIterator<'_, T> {}

/// An owning iterator over elements of a [`PersistentList`].
///
/// Elements are cloned because the nodes may be shared with other lists.
pub struct PersistentListIntoIterator<T> {
    list: PersistentList<T>,
}

impl<T: Clone> Iterator for PersistentListIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let (element, tail) = self
            .list
            .uncons()
            .map(|(head, tail)| (head.clone(), tail))?;
        self.list = tail;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.length, Some(self.list.length))
    }
}

impl<T: Clone> ExactSizeIterator for PersistentListIntoIterator<T> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Clone for PersistentList<T> {
    fn clone(&self) -> Self {
        Self {
            head: self.head.clone(),
            length: self.length,
        }
    }
}

impl<T> Default for PersistentList<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for PersistentList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T: Clone> IntoIterator for PersistentList<T> {
    type Item = T;
    type IntoIter = PersistentListIntoIterator<T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        PersistentListIntoIterator { list: self }
    }
}

impl<'a, T> IntoIterator for &'a PersistentList<T> {
    type Item = &'a T;
    type IntoIter = PersistentListIterator<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq> PartialEq for PersistentList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for PersistentList<T> {}

impl<T: PartialOrd> PartialOrd for PersistentList<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord> Ord for PersistentList<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Hash> Hash for PersistentList<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for element in self {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentList<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

// =============================================================================
// Type Class Implementations
// =============================================================================

impl<T: Clone> Semigroup for PersistentList<T> {
    fn combine(self, other: Self) -> Self {
        self.append(&other)
    }

    fn combine_ref(&self, other: &Self) -> Self {
        self.append(other)
    }
}

impl<T: Clone> Monoid for PersistentList<T> {
    fn empty() -> Self {
        Self::new()
    }
}

impl<T> Foldable for PersistentList<T> {
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
        self.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn list_of(elements: &[i32]) -> PersistentList<i32> {
        elements.iter().copied().collect()
    }

    #[rstest]
    fn test_empty_head_and_tail_fail() {
        let empty: PersistentList<i32> = PersistentList::new();
        assert_eq!(
            empty.head(),
            Err(CollectionError::empty("PersistentList::head"))
        );
        assert_eq!(
            empty.tail().map(|tail| tail.len()),
            Err(CollectionError::empty("PersistentList::tail"))
        );
        assert!(empty.uncons().is_none());
    }

    #[rstest]
    fn test_cons_shares_tail() {
        let base = list_of(&[2, 3]);
        let extended = base.cons(1);
        assert_eq!(extended, list_of(&[1, 2, 3]));
        assert_eq!(base, list_of(&[2, 3]));
        let shared = extended.tail().unwrap();
        assert!(ReferenceCounter::ptr_eq(
            shared.head.as_ref().unwrap(),
            base.head.as_ref().unwrap()
        ));
    }

    #[rstest]
    #[case(0, Some(10))]
    #[case(2, Some(30))]
    #[case(3, None)]
    fn test_get(#[case] index: usize, #[case] expected: Option<i32>) {
        assert_eq!(list_of(&[10, 20, 30]).get(index).copied(), expected);
    }

    #[rstest]
    fn test_append_shares_right_operand() {
        let left = list_of(&[1, 2]);
        let right = list_of(&[3, 4]);
        let combined = left.append(&right);
        assert_eq!(combined, list_of(&[1, 2, 3, 4]));
        let suffix = combined.tail().unwrap().tail().unwrap();
        assert!(ReferenceCounter::ptr_eq(
            suffix.head.as_ref().unwrap(),
            right.head.as_ref().unwrap()
        ));
    }

    #[rstest]
    fn test_reverse() {
        assert_eq!(list_of(&[1, 2, 3]).reverse(), list_of(&[3, 2, 1]));
        assert!(PersistentList::<i32>::new().reverse().is_empty());
    }

    #[rstest]
    #[case(&[1, 2], &[1, 3], Ordering::Less)]
    #[case(&[1, 2], &[1], Ordering::Greater)]
    #[case(&[], &[], Ordering::Equal)]
    fn test_lexicographic_order(
        #[case] left: &[i32],
        #[case] right: &[i32],
        #[case] expected: Ordering,
    ) {
        assert_eq!(list_of(left).cmp(&list_of(right)), expected);
    }

    #[rstest]
    fn test_into_iter_and_exact_size() {
        let list = list_of(&[1, 2, 3]);
        let mut iterator = list.iter();
        iterator.next();
        assert_eq!(iterator.len(), 2);
        assert_eq!(list.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[rstest]
    fn test_long_list_drops_without_overflow() {
        let list: PersistentList<u32> = (0..200_000).collect();
        assert_eq!(list.len(), 200_000);
        drop(list);
    }

    #[rstest]
    fn test_monoid_and_debug() {
        let combined = PersistentList::combine_all(vec![list_of(&[1]), list_of(&[2, 3])]);
        assert_eq!(format!("{combined:?}"), "[1, 2, 3]");
        assert_eq!(combined.fold_map(|element| element.to_string()), "123");
    }
}
