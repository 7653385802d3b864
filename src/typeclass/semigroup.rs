//! Semigroup type class - types with an associative binary operation.
//!
//! Every persistent collection in this crate is a semigroup: maps and sets
//! combine by union (the right-hand operand wins on duplicate keys), sequences
//! combine by concatenation. Value-level conflict resolution in
//! `union_with` is usually expressed through a semigroup as well:
//!
//! ```rust
//! use lambars_collections::persistent::PersistentTreeMap;
//! use lambars_collections::typeclass::Semigroup;
//!
//! let left: PersistentTreeMap<&str, String> =
//!     [("greeting", "Hello, ".to_string())].into_iter().collect();
//! let right: PersistentTreeMap<&str, String> =
//!     [("greeting", "World!".to_string())].into_iter().collect();
//!
//! let merged = left.union_with(&right, |_, mine, theirs| mine.combine_ref(theirs));
//! assert_eq!(merged.get("greeting").map(String::as_str), Some("Hello, World!"));
//! ```
//!
//! # Laws
//!
//! ## Associativity
//!
//! ```text
//! (a.combine(b)).combine(c) == a.combine(b.combine(c))
//! ```

/// A type class for types with an associative binary operation.
///
/// # Examples
///
/// ```rust
/// use lambars_collections::typeclass::Semigroup;
///
/// let a = String::from("foo");
/// let b = String::from("bar");
/// assert_eq!(a.combine(b), "foobar");
/// ```
pub trait Semigroup {
    /// Combines two values into one.
    ///
    /// This operation must be associative.
    #[must_use]
    fn combine(self, other: Self) -> Self;

    /// Combines two values by reference, returning a new value.
    ///
    /// The default implementation clones both values and calls `combine`.
    /// Persistent collections override it because cloning them is O(1).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::typeclass::Semigroup;
    ///
    /// let a = String::from("Hello, ");
    /// let b = String::from("World!");
    /// let result = a.combine_ref(&b);
    /// assert_eq!(a, "Hello, ");
    /// assert_eq!(result, "Hello, World!");
    /// ```
    #[must_use]
    fn combine_ref(&self, other: &Self) -> Self
    where
        Self: Clone,
    {
        self.clone().combine(other.clone())
    }

    /// Reduces all elements in an iterator using the semigroup operation.
    ///
    /// Returns `None` if the iterator is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::typeclass::Semigroup;
    ///
    /// let words = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    /// assert_eq!(String::reduce_left(words), Some("abc".to_string()));
    /// assert_eq!(String::reduce_left(Vec::<String>::new()), None);
    /// ```
    fn reduce_left<I>(iterator: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
        Self: Sized,
    {
        iterator.into_iter().reduce(Self::combine)
    }
}

impl Semigroup for String {
    #[inline]
    fn combine(mut self, other: Self) -> Self {
        self.push_str(&other);
        self
    }
}

impl<T> Semigroup for Vec<T> {
    #[inline]
    fn combine(mut self, mut other: Self) -> Self {
        self.append(&mut other);
        self
    }
}

/// `None` is an identity: `Some(a).combine(None) == Some(a)`.
impl<T: Semigroup> Semigroup for Option<T> {
    fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Some(left), Some(right)) => Some(left.combine(right)),
            (Some(value), None) | (None, Some(value)) => Some(value),
            (None, None) => None,
        }
    }
}

impl Semigroup for () {
    #[inline]
    fn combine(self, (): Self) -> Self {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_string_combine() {
        assert_eq!(
            String::from("Hello, ").combine(String::from("World!")),
            "Hello, World!"
        );
    }

    #[rstest]
    fn test_vec_combine() {
        assert_eq!(vec![1, 2].combine(vec![3]), vec![1, 2, 3]);
    }

    #[rstest]
    #[case(Some("a".to_string()), Some("b".to_string()), Some("ab".to_string()))]
    #[case(Some("a".to_string()), None, Some("a".to_string()))]
    #[case(None, Some("b".to_string()), Some("b".to_string()))]
    #[case(None, None, None)]
    fn test_option_combine(
        #[case] left: Option<String>,
        #[case] right: Option<String>,
        #[case] expected: Option<String>,
    ) {
        assert_eq!(left.combine(right), expected);
    }

    #[rstest]
    fn test_associativity_for_strings() {
        let a = String::from("x");
        let b = String::from("y");
        let c = String::from("z");
        assert_eq!(
            a.clone().combine(b.clone()).combine(c.clone()),
            a.combine(b.combine(c))
        );
    }

    #[rstest]
    fn test_reduce_left() {
        let parts = vec![vec![1], vec![2, 3], vec![]];
        assert_eq!(Vec::reduce_left(parts), Some(vec![1, 2, 3]));
    }
}
