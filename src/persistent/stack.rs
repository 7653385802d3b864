//! Persistent (immutable) LIFO stack.
//!
//! [`PersistentStack`] is a [`PersistentList`] with stack vocabulary: `push`
//! conses onto the top and `pop` splits the top off, both in O(1).
//!
//! # Examples
//!
//! ```rust
//! use lambars_collections::persistent::PersistentStack;
//!
//! let stack = PersistentStack::new().push(1).push(2);
//! let (top, rest) = stack.pop().unwrap();
//! assert_eq!(top, 2);
//! assert_eq!(rest.peek(), Ok(&1));
//! ```

use super::PersistentList;
use super::list::PersistentListIterator;
use crate::error::CollectionError;
use crate::typeclass::Foldable;
use std::fmt;
use std::iter::FromIterator;

/// A persistent (immutable) last-in first-out stack.
#[derive(PartialEq, Eq, Hash)]
pub struct PersistentStack<T> {
    elements: PersistentList<T>,
}

impl<T> PersistentStack<T> {
    /// Creates a new empty stack.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            elements: PersistentList::new(),
        }
    }

    /// Pushes an element on top.
    #[inline]
    #[must_use]
    pub fn push(&self, element: T) -> Self {
        Self {
            elements: self.elements.cons(element),
        }
    }

    /// Returns the top element.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::Empty`] if the stack is empty.
    pub fn peek(&self) -> Result<&T, CollectionError> {
        self.elements
            .head()
            .map_err(|_| CollectionError::empty("PersistentStack::peek"))
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the stack has no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns an iterator from the top of the stack down.
    #[must_use]
    pub fn iter(&self) -> PersistentListIterator<'_, T> {
        self.elements.iter()
    }
}

impl<T: Clone> PersistentStack<T> {
    /// Removes the top element, returning it with the remaining stack.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::Empty`] if the stack is empty.
    pub fn pop(&self) -> Result<(T, Self), CollectionError> {
        self.elements
            .uncons()
            .map(|(top, elements)| (top.clone(), Self { elements }))
            .ok_or(CollectionError::empty("PersistentStack::pop"))
    }
}

impl<T> Clone for PersistentStack<T> {
    fn clone(&self) -> Self {
        Self {
            elements: self.elements.clone(),
        }
    }
}

impl<T> Default for PersistentStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Pushes the elements in iteration order, so the last one ends on top.
impl<T> FromIterator<T> for PersistentStack<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), |stack, element| stack.push(element))
    }
}

impl<'a, T> IntoIterator for &'a PersistentStack<T> {
    type Item = &'a T;
    type IntoIter = PersistentListIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentStack<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Foldable for PersistentStack<T> {
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

    fn length(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_lifo_order() {
        let stack: PersistentStack<i32> = (1..=3).collect();
        assert_eq!(stack.iter().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
        let (top, rest) = stack.pop().unwrap();
        assert_eq!(top, 3);
        assert_eq!(rest.len(), 2);
        assert_eq!(stack.len(), 3);
    }

    #[rstest]
    fn test_empty_stack_errors() {
        let stack: PersistentStack<i32> = PersistentStack::new();
        assert_eq!(
            stack.peek(),
            Err(CollectionError::empty("PersistentStack::peek"))
        );
        assert_eq!(
            stack.pop().map(|(top, _)| top),
            Err(CollectionError::empty("PersistentStack::pop"))
        );
    }

    #[rstest]
    fn test_push_shares_previous_version() {
        let base = PersistentStack::new().push("a");
        let left = base.push("b");
        let right = base.push("c");
        assert_eq!(left.pop().unwrap().1, base);
        assert_eq!(right.pop().unwrap().1, base);
        assert_eq!(format!("{left:?}"), r#"["b", "a"]"#);
        assert!(left.exists(|element| *element == "a"));
    }
}
