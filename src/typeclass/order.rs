//! Order type class - compile-time total orders over a fixed element type.
//!
//! An `Order<A>` implementation is a *strategy token*: a zero-sized type whose
//! only purpose is to name a comparison function. Ordered collections take the
//! token as a type parameter, so the comparison is resolved by
//! monomorphization and no comparator value is stored anywhere.
//!
//! # Laws
//!
//! For all `a`, `b`, `c` of type `A`:
//!
//! ## Totality and Antisymmetry
//!
//! ```text
//! compare(a, b) == compare(b, a).reverse()
//! ```
//!
//! ## Transitivity
//!
//! ```text
//! compare(a, b) == Less && compare(b, c) == Less  =>  compare(a, c) == Less
//! ```
//!
//! The tree engine does not check these laws. An order that breaks them
//! makes lookups return wrong answers; it never causes memory unsafety.
//!
//! # Examples
//!
//! ```rust
//! use lambars_collections::typeclass::{NaturalOrder, Order, ReverseOrder};
//! use std::cmp::Ordering;
//!
//! assert_eq!(NaturalOrder::compare(&1, &2), Ordering::Less);
//! assert_eq!(<ReverseOrder as Order<i32>>::compare(&1, &2), Ordering::Greater);
//! ```

use std::cmp::Ordering;
use std::marker::PhantomData;

/// A type class for strict total orders over `A`.
///
/// Implementors are stateless: every method is an associated function.
///
/// # Examples
///
/// ```rust
/// use lambars_collections::typeclass::Order;
/// use std::cmp::Ordering;
///
/// /// Orders integers by their absolute value, then by sign.
/// struct ByMagnitude;
///
/// impl Order<i64> for ByMagnitude {
///     fn compare(left: &i64, right: &i64) -> Ordering {
///         left.unsigned_abs()
///             .cmp(&right.unsigned_abs())
///             .then(left.cmp(right))
///     }
/// }
///
/// assert_eq!(ByMagnitude::compare(&-1, &2), Ordering::Less);
/// assert!(ByMagnitude::equals(&3, &3));
/// ```
pub trait Order<A: ?Sized> {
    /// Compares two values.
    fn compare(left: &A, right: &A) -> Ordering;

    /// Returns `true` when the two values compare as `Equal`.
    #[inline]
    fn equals(left: &A, right: &A) -> bool {
        Self::compare(left, right) == Ordering::Equal
    }
}

/// The order given by the element type's own [`Ord`] implementation.
///
/// This is the default strategy of every ordered collection.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalOrder;

impl<A: Ord + ?Sized> Order<A> for NaturalOrder {
    #[inline]
    fn compare(left: &A, right: &A) -> Ordering {
        left.cmp(right)
    }
}

/// The reverse of another order.
///
/// `ReverseOrder` on its own reverses [`NaturalOrder`].
///
/// # Examples
///
/// ```rust
/// use lambars_collections::typeclass::{Order, ReverseOrder};
/// use std::cmp::Ordering;
///
/// assert_eq!(<ReverseOrder as Order<str>>::compare("a", "b"), Ordering::Greater);
/// ```
pub struct ReverseOrder<O = NaturalOrder>(PhantomData<fn() -> O>);

impl<A: ?Sized, O: Order<A>> Order<A> for ReverseOrder<O> {
    #[inline]
    fn compare(left: &A, right: &A) -> Ordering {
        O::compare(right, left)
    }
}

/// ASCII case-insensitive order over anything that views as a `str`.
///
/// Also implements [`Equivalence`](super::Equivalence), so the same token can
/// drive both ordered and hashed collections.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseInsensitive;

impl<A: AsRef<str> + ?Sized> Order<A> for CaseInsensitive {
    fn compare(left: &A, right: &A) -> Ordering {
        let left = left.as_ref().bytes().map(|byte| byte.to_ascii_lowercase());
        let right = right.as_ref().bytes().map(|byte| byte.to_ascii_lowercase());
        left.cmp(right)
    }
}

static_assertions::const_assert_eq!(std::mem::size_of::<NaturalOrder>(), 0);
static_assertions::const_assert_eq!(std::mem::size_of::<ReverseOrder>(), 0);
static_assertions::const_assert_eq!(std::mem::size_of::<CaseInsensitive>(), 0);
