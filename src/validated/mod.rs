//! Collections that carry a checked invariant.
//!
//! [`Validated<C, I>`] wraps any collection `C` together with an
//! [`Invariant`] token `I`. A value of the wrapper exists only if the
//! invariant held when it was built: construction and every mutation
//! re-evaluate the predicate and fail with
//! [`CollectionError::InvariantViolated`] instead of producing a value.
//!
//! The check is not incremental. Each mutation pays the full cost of the
//! predicate: O(1) for the built-in length invariants, O(n) for predicates
//! that scan the elements.
//!
//! # Examples
//!
//! ```rust
//! use lambars_collections::persistent::PersistentList;
//! use lambars_collections::validated::{NonEmpty, Validated};
//!
//! let names: Validated<PersistentList<&str>, NonEmpty> =
//!     Validated::from_items(["alice"]).unwrap();
//!
//! let more = names.mutate("cons", |list| list.cons("bob")).unwrap();
//! assert_eq!(more.len(), 2);
//!
//! let emptied = names.try_mutate("tail", |list| list.tail().map(|tail| (tail, ())));
//! assert!(emptied.is_err());
//! assert_eq!(names.len(), 1);
//! ```

mod invariant;

pub use invariant::{
    AllItems, Both, Invariant, ItemPredicate, MaxLength, MinLength, NonEmpty, Unconstrained,
};

use crate::error::CollectionError;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::Deref;

/// A collection whose invariant `I` held when this value was built.
pub struct Validated<C, I> {
    inner: C,
    invariant: PhantomData<fn() -> I>,
}

impl<C, I: Invariant<C>> Validated<C, I> {
    fn check(inner: C, operation: &'static str) -> Result<Self, CollectionError> {
        match I::violation(&inner) {
            None => Ok(Self {
                inner,
                invariant: PhantomData,
            }),
            Some(invariant) => {
                tracing::debug!(invariant, operation, "rejected collection");
                Err(CollectionError::InvariantViolated {
                    invariant,
                    operation,
                })
            }
        }
    }

    /// Wraps `inner` if it satisfies the invariant.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::InvariantViolated`] if it does not.
    pub fn new(inner: C) -> Result<Self, CollectionError> {
        Self::check(inner, "Validated::new")
    }

    /// Collects `items` into `C` and wraps the result.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::InvariantViolated`] if the collected value
    /// breaks the invariant.
    pub fn from_items<T, Items>(items: Items) -> Result<Self, CollectionError>
    where
        Items: IntoIterator<Item = T>,
        C: FromIterator<T>,
    {
        Self::check(items.into_iter().collect(), "Validated::from_items")
    }

    /// Applies `function` to the wrapped collection and re-checks the result.
    ///
    /// `self` is left untouched whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::InvariantViolated`] naming `operation` if
    /// the new collection breaks the invariant.
    pub fn mutate<F>(&self, operation: &'static str, function: F) -> Result<Self, CollectionError>
    where
        F: FnOnce(&C) -> C,
    {
        Self::check(function(&self.inner), operation)
    }

    /// Like [`mutate`](Self::mutate) for operations that can fail or that
    /// return a value alongside the new collection.
    ///
    /// # Errors
    ///
    /// Propagates the error of `function`, or returns
    /// [`CollectionError::InvariantViolated`] if its result breaks the invariant.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentVector;
    /// use lambars_collections::validated::{MinLength, Validated};
    ///
    /// let pair: Validated<PersistentVector<i32>, MinLength<2>> =
    ///     Validated::from_items([1, 2, 3]).unwrap();
    /// let (shorter, last) = pair.try_mutate("pop_back", |vector| vector.pop_back()).unwrap();
    /// assert_eq!(last, 3);
    /// assert!(shorter.try_mutate("pop_back", |vector| vector.pop_back()).is_err());
    /// ```
    pub fn try_mutate<R, F>(
        &self,
        operation: &'static str,
        function: F,
    ) -> Result<(Self, R), CollectionError>
    where
        F: FnOnce(&C) -> Result<(C, R), CollectionError>,
    {
        let (inner, result) = function(&self.inner)?;
        Ok((Self::check(inner, operation)?, result))
    }
}

impl<C, I> Validated<C, I> {
    /// Returns the wrapped collection.
    #[inline]
    #[must_use]
    pub const fn inner(&self) -> &C {
        &self.inner
    }

    /// Unwraps the collection, giving up the invariant guarantee.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C, I> Deref for Validated<C, I> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.inner
    }
}

impl<C, I> AsRef<C> for Validated<C, I> {
    fn as_ref(&self) -> &C {
        &self.inner
    }
}

impl<C: Clone, I> Clone for Validated<C, I> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            invariant: PhantomData,
        }
    }
}

impl<C: PartialEq, I> PartialEq for Validated<C, I> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<C: Eq, I> Eq for Validated<C, I> {}

impl<C: Hash, I> Hash for Validated<C, I> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl<C: fmt::Debug, I: Invariant<C>> fmt::Debug for Validated<C, I> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Validated")
            .field("invariant", &I::NAME)
            .field("inner", &self.inner)
            .finish()
    }
}
