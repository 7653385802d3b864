//! Monoid type class - semigroups with an identity element.
//!
//! Every persistent collection is a monoid whose identity is the empty
//! collection.
//!
//! # Laws
//!
//! ## Left Identity
//!
//! ```text
//! Monoid::empty().combine(a) == a
//! ```
//!
//! ## Right Identity
//!
//! ```text
//! a.combine(Monoid::empty()) == a
//! ```

use super::Semigroup;

/// A type class for semigroups with an identity element.
///
/// # Examples
///
/// ```rust
/// use lambars_collections::typeclass::{Monoid, Semigroup};
///
/// let value = String::from("hello");
/// assert_eq!(String::empty().combine(value.clone()), value);
/// ```
pub trait Monoid: Semigroup {
    /// Returns the identity element.
    fn empty() -> Self;

    /// Combines every element of an iterator, starting from `empty()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::typeclass::Monoid;
    ///
    /// let joined = String::combine_all(vec!["a".to_string(), "b".to_string()]);
    /// assert_eq!(joined, "ab");
    /// assert_eq!(String::combine_all(Vec::<String>::new()), "");
    /// ```
    fn combine_all<I>(iterator: I) -> Self
    where
        I: IntoIterator<Item = Self>,
        Self: Sized,
    {
        iterator.into_iter().fold(Self::empty(), Self::combine)
    }
}

impl Monoid for String {
    #[inline]
    fn empty() -> Self {
        Self::new()
    }
}

impl<T> Monoid for Vec<T> {
    #[inline]
    fn empty() -> Self {
        Self::new()
    }
}

impl<T: Semigroup> Monoid for Option<T> {
    #[inline]
    fn empty() -> Self {
        None
    }
}

impl Monoid for () {
    #[inline]
    fn empty() -> Self {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_string_identity() {
        let value = String::from("abc");
        assert_eq!(String::empty().combine(value.clone()), value);
        assert_eq!(value.clone().combine(String::empty()), value);
    }

    #[rstest]
    fn test_vec_combine_all() {
        let result = Vec::combine_all(vec![vec![1], vec![2], vec![3, 4]]);
        assert_eq!(result, vec![1, 2, 3, 4]);
    }

    #[rstest]
    fn test_option_empty_is_none() {
        assert_eq!(<Option<String> as Monoid>::empty(), None);
    }
}
