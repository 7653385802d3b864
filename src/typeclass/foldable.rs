//! Foldable type class - folding over collections by reference.
//!
//! Persistent collections are never consumed by a fold, so [`Foldable`]
//! borrows the structure and hands each element to the folding function by
//! reference. The element type is a generic associated type so that maps
//! can yield `(&K, &V)` pairs while sequences yield `&T`.
//!
//! Ordered collections fold in ascending order of their strategy; hashed
//! collections fold in trie order, which is deterministic for a fixed set of
//! hashes but otherwise unspecified.
//!
//! # Examples
//!
//! ```rust
//! use lambars_collections::persistent::PersistentList;
//! use lambars_collections::typeclass::Foldable;
//!
//! let list: PersistentList<i32> = (1..=5).collect();
//! let sum = list.fold_left(0, |accumulator, element| accumulator + element);
//! assert_eq!(sum, 15);
//! assert_eq!(list.length(), 5);
//! ```

use super::Monoid;

/// A type class for collections that can be reduced to a summary value.
pub trait Foldable {
    /// The borrowed element handed to folding functions.
    type Item<'a>
    where
        Self: 'a;

    /// Folds the elements from first to last.
    fn fold_left<'a, B, F>(&'a self, init: B, function: F) -> B
    where
        F: FnMut(B, Self::Item<'a>) -> B;

    /// Returns the number of elements.
    fn length(&self) -> usize;

    /// Returns `true` if there are no elements.
    #[inline]
    fn is_empty(&self) -> bool {
        self.length() == 0
    }

    /// Maps every element into a monoid and combines the results.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentVector;
    /// use lambars_collections::typeclass::Foldable;
    ///
    /// let vector: PersistentVector<i32> = (1..=3).collect();
    /// let rendered: String = vector.fold_map(|element| element.to_string());
    /// assert_eq!(rendered, "123");
    /// ```
    fn fold_map<'a, M, F>(&'a self, mut function: F) -> M
    where
        M: Monoid,
        F: FnMut(Self::Item<'a>) -> M,
    {
        self.fold_left(M::empty(), |accumulator, element| {
            accumulator.combine(function(element))
        })
    }

    /// Returns `true` if any element satisfies the predicate.
    fn exists<'a, P>(&'a self, mut predicate: P) -> bool
    where
        P: FnMut(Self::Item<'a>) -> bool,
    {
        self.fold_left(false, |found, element| found || predicate(element))
    }

    /// Returns `true` if every element satisfies the predicate.
    ///
    /// Vacuously `true` for an empty collection.
    fn for_all<'a, P>(&'a self, mut predicate: P) -> bool
    where
        P: FnMut(Self::Item<'a>) -> bool,
    {
        self.fold_left(true, |holds, element| holds && predicate(element))
    }
}

impl<T> Foldable for Vec<T> {
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
