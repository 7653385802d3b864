//! Invariants checked by [`Validated`](super::Validated).
//!
//! An invariant is a zero-sized token implementing [`Invariant`] for the
//! collection types it understands. The length invariants are phrased in
//! terms of [`Foldable`], so they apply to every collection in this crate.
//! [`AllItems`] lifts an [`ItemPredicate`] over single elements to a whole
//! collection.

use crate::typeclass::Foldable;
use std::marker::PhantomData;

/// A predicate over a collection, named for error reporting.
///
/// # Examples
///
/// ```rust
/// use lambars_collections::persistent::PersistentVector;
/// use lambars_collections::validated::{Invariant, Validated};
///
/// struct Sorted;
///
/// impl Invariant<PersistentVector<i32>> for Sorted {
///     const NAME: &'static str = "Sorted";
///
///     fn holds(collection: &PersistentVector<i32>) -> bool {
///         collection
///             .iter()
///             .zip(collection.iter().skip(1))
///             .all(|(left, right)| left <= right)
///     }
/// }
///
/// let sorted: Result<Validated<PersistentVector<i32>, Sorted>, _> =
///     Validated::from_items([1, 2, 3]);
/// assert!(sorted.is_ok());
/// let unsorted: Result<Validated<PersistentVector<i32>, Sorted>, _> =
///     Validated::from_items([3, 1]);
/// assert!(unsorted.is_err());
/// ```
pub trait Invariant<C: ?Sized> {
    /// Name reported in [`CollectionError::InvariantViolated`](crate::error::CollectionError::InvariantViolated).
    const NAME: &'static str;

    /// Returns `true` if `collection` satisfies the invariant.
    fn holds(collection: &C) -> bool;

    /// Returns the name of the first failing invariant, if any.
    ///
    /// Composite invariants override this to report the component that failed.
    fn violation(collection: &C) -> Option<&'static str> {
        (!Self::holds(collection)).then_some(Self::NAME)
    }
}

/// Accepts every collection.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconstrained;

impl<C: ?Sized> Invariant<C> for Unconstrained {
    const NAME: &'static str = "Unconstrained";

    #[inline]
    fn holds(_collection: &C) -> bool {
        true
    }
}

/// Requires at least one element.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonEmpty;

impl<C: Foldable> Invariant<C> for NonEmpty {
    const NAME: &'static str = "NonEmpty";

    #[inline]
    fn holds(collection: &C) -> bool {
        !Foldable::is_empty(collection)
    }
}

/// Requires at least `N` elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinLength<const N: usize>;

impl<C: Foldable, const N: usize> Invariant<C> for MinLength<N> {
    const NAME: &'static str = "MinLength";

    #[inline]
    fn holds(collection: &C) -> bool {
        collection.length() >= N
    }
}

/// Requires at most `N` elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxLength<const N: usize>;

impl<C: Foldable, const N: usize> Invariant<C> for MaxLength<N> {
    const NAME: &'static str = "MaxLength";

    #[inline]
    fn holds(collection: &C) -> bool {
        collection.length() <= N
    }
}

/// Conjunction of two invariants, checked left first.
///
/// # Examples
///
/// ```rust
/// use lambars_collections::persistent::PersistentList;
/// use lambars_collections::validated::{Both, Invariant, MaxLength, NonEmpty};
///
/// type Bounded = Both<NonEmpty, MaxLength<2>>;
///
/// let empty: PersistentList<i32> = PersistentList::new();
/// let long: PersistentList<i32> = (0..3).collect();
/// assert_eq!(Bounded::violation(&empty), Some("NonEmpty"));
/// assert_eq!(Bounded::violation(&long), Some("MaxLength"));
/// ```
pub struct Both<A, B>(PhantomData<fn() -> (A, B)>);

impl<C: ?Sized, A: Invariant<C>, B: Invariant<C>> Invariant<C> for Both<A, B> {
    const NAME: &'static str = "Both";

    fn holds(collection: &C) -> bool {
        A::holds(collection) && B::holds(collection)
    }

    fn violation(collection: &C) -> Option<&'static str> {
        A::violation(collection).or_else(|| B::violation(collection))
    }
}

/// A predicate over single elements, used by [`AllItems`].
///
/// # Examples
///
/// ```rust
/// use lambars_collections::persistent::PersistentVector;
/// use lambars_collections::validated::{AllItems, Both, ItemPredicate, NonEmpty, Validated};
///
/// struct Positive;
///
/// impl ItemPredicate for Positive {
///     type Item = i32;
///     const NAME: &'static str = "Positive";
///
///     fn holds(item: &i32) -> bool {
///         *item > 0
///     }
/// }
///
/// type Amounts = Validated<PersistentVector<i32>, Both<NonEmpty, AllItems<Positive>>>;
///
/// let amounts = Amounts::from_items([3, 5]).unwrap();
/// assert!(amounts.mutate("push_back", |vector| vector.push_back(-1)).is_err());
/// assert!(Amounts::from_items(Vec::<i32>::new()).is_err());
/// ```
pub trait ItemPredicate {
    /// The element type the predicate inspects.
    type Item: ?Sized;

    /// Name reported when an element fails the predicate.
    const NAME: &'static str;

    /// Returns `true` if `item` is acceptable.
    fn holds(item: &Self::Item) -> bool;
}

/// Requires every element to satisfy `P`.
///
/// Applies to any collection that iterates by reference over `P::Item`,
/// which covers the sequences and sets of this crate. A violation reports
/// `P::NAME`.
pub struct AllItems<P>(PhantomData<fn() -> P>);

impl<C, P> Invariant<C> for AllItems<P>
where
    C: ?Sized,
    P: ItemPredicate,
    for<'a> &'a C: IntoIterator<Item = &'a P::Item>,
{
    const NAME: &'static str = P::NAME;

    fn holds(collection: &C) -> bool {
        IntoIterator::into_iter(collection).all(P::holds)
    }
}
