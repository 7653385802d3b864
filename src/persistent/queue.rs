//! Persistent (immutable) FIFO queue.
//!
//! [`PersistentQueue`] is a banker's queue: elements are dequeued from a
//! front list and enqueued onto a back list, and the back list is reversed
//! into the front only when the front runs out. Each element is reversed at
//! most once per version, so `dequeue` is amortized O(1) when a version is
//! used once, with an O(n) worst case on the call that triggers the reversal.
//!
//! # Examples
//!
//! ```rust
//! use lambars_collections::persistent::PersistentQueue;
//!
//! let queue = PersistentQueue::new().enqueue(1).enqueue(2).enqueue(3);
//! let (first, rest) = queue.dequeue().unwrap();
//! assert_eq!(first, 1);
//! assert_eq!(rest.peek(), Ok(&2));
//! assert_eq!(queue.len(), 3);
//! ```

use super::PersistentList;
use super::list::PersistentListIterator;
use crate::error::CollectionError;
use crate::typeclass::{Foldable, Monoid, Semigroup};
use smallvec::SmallVec;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

/// A persistent (immutable) first-in first-out queue.
///
/// The front list is empty only when the whole queue is empty.
pub struct PersistentQueue<T> {
    front: PersistentList<T>,
    back: PersistentList<T>,
}

impl<T> PersistentQueue<T> {
    /// Creates a new empty queue.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            front: PersistentList::new(),
            back: PersistentList::new(),
        }
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.front.len() + self.back.len()
    }

    /// Returns `true` if the queue has no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.front.is_empty()
    }

    /// Returns the element that `dequeue` would remove next.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::Empty`] if the queue is empty.
    pub fn peek(&self) -> Result<&T, CollectionError> {
        self.front
            .head()
            .map_err(|_| CollectionError::empty("PersistentQueue::peek"))
    }

    /// Returns an iterator from the oldest to the newest element.
    #[must_use]
    pub fn iter(&self) -> PersistentQueueIterator<'_, T> {
        PersistentQueueIterator {
            front: self.front.iter(),
            back: Some(self.back.iter()),
            reversed: SmallVec::new(),
        }
    }
}

impl<T: Clone> PersistentQueue<T> {
    /// Creates a queue holding a single element.
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self::new().enqueue(element)
    }

    fn balanced(front: PersistentList<T>, back: PersistentList<T>) -> Self {
        if front.is_empty() {
            Self {
                front: back.reverse(),
                back: PersistentList::new(),
            }
        } else {
            Self { front, back }
        }
    }

    /// Adds an element at the back.
    #[must_use]
    pub fn enqueue(&self, element: T) -> Self {
        Self::balanced(self.front.clone(), self.back.cons(element))
    }

    /// Removes the element at the front, returning it with the remaining queue.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::Empty`] if the queue is empty.
    pub fn dequeue(&self) -> Result<(T, Self), CollectionError> {
        let (element, front) = self
            .front
            .uncons()
            .map(|(head, tail)| (head.clone(), tail))
            .ok_or(CollectionError::empty("PersistentQueue::dequeue"))?;
        Ok((element, Self::balanced(front, self.back.clone())))
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over the elements of a [`PersistentQueue`] in dequeue order.
///
/// The back list is only reversed once the front list is exhausted.
pub struct PersistentQueueIterator<'a, T> {
    front: PersistentListIterator<'a, T>,
    back: Option<PersistentListIterator<'a, T>>,
    // Newest first, so `pop` yields the oldest pending element.
    reversed: SmallVec<[&'a T; 8]>,
}

impl<'a, T> Iterator for PersistentQueueIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(element) = self.front.next() {
            return Some(element);
        }
        if let Some(back) = self.back.take() {
            self.reversed = back.collect();
        }
        self.reversed.pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.front.len()
            + self.back.as_ref().map_or(0, ExactSizeIterator::len)
            + self.reversed.len();
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for PersistentQueueIterator<'_, T> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Clone for PersistentQueue<T> {
    fn clone(&self) -> Self {
        Self {
            front: self.front.clone(),
            back: self.back.clone(),
        }
    }
}

impl<T> Default for PersistentQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for PersistentQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            front: iter.into_iter().collect(),
            back: PersistentList::new(),
        }
    }
}

impl<'a, T> IntoIterator for &'a PersistentQueue<T> {
    type Item = &'a T;
    type IntoIter = PersistentQueueIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq> PartialEq for PersistentQueue<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for PersistentQueue<T> {}

impl<T: Hash> Hash for PersistentQueue<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for element in self {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentQueue<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

// =============================================================================
// Type Class Implementations
// =============================================================================

impl<T: Clone> Semigroup for PersistentQueue<T> {
    fn combine(self, other: Self) -> Self {
        self.combine_ref(&other)
    }

    fn combine_ref(&self, other: &Self) -> Self {
        other
            .iter()
            .fold(self.clone(), |queue, element| queue.enqueue(element.clone()))
    }
}

impl<T: Clone> Monoid for PersistentQueue<T> {
    fn empty() -> Self {
        Self::new()
    }
}

impl<T> Foldable for PersistentQueue<T> {
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
