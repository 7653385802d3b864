//! Equivalence type class - compile-time equality plus a consistent hash.
//!
//! Hashed collections route entries by [`Equivalence::hash`] and disambiguate
//! entries that share a hash with [`Equivalence::equals`].
//!
//! # Laws
//!
//! `equals` must be reflexive, symmetric and transitive, and
//!
//! ```text
//! equals(a, b)  =>  hash(a) == hash(b)
//! ```
//!
//! A hash that breaks this law makes equal keys land in different places of
//! the trie, so lookups miss. It never causes a panic.

use std::hash::{Hash, Hasher};

/// A type class for equivalence relations with a compatible hash.
///
/// # Examples
///
/// ```rust
/// use lambars_collections::typeclass::Equivalence;
///
/// /// Treats integers as equal modulo 10.
/// struct LastDigit;
///
/// impl Equivalence<u32> for LastDigit {
///     fn equals(left: &u32, right: &u32) -> bool {
///         left % 10 == right % 10
///     }
///
///     fn hash(value: &u32) -> u64 {
///         u64::from(value % 10)
///     }
/// }
///
/// assert!(LastDigit::equals(&13, &23));
/// assert_eq!(LastDigit::hash(&13), LastDigit::hash(&23));
/// ```
pub trait Equivalence<A: ?Sized> {
    /// Returns `true` when the two values are equivalent.
    fn equals(left: &A, right: &A) -> bool;

    /// Hashes a value. Equivalent values must hash identically.
    fn hash(value: &A) -> u64;
}

/// Equality and hashing given by the element type's [`Eq`] and [`Hash`].
///
/// This is the default strategy of every hashed collection. The hasher is
/// selected by Cargo features: `fxhash` uses `rustc_hash::FxHasher`, `ahash`
/// uses `ahash::AHasher`, otherwise `std`'s `DefaultHasher` is used. All three
/// are deterministic for the lifetime of the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalEquivalence;

impl<A: Hash + Eq + ?Sized> Equivalence<A> for NaturalEquivalence {
    #[inline]
    fn equals(left: &A, right: &A) -> bool {
        left == right
    }

    #[inline]
    fn hash(value: &A) -> u64 {
        let mut hasher = new_hasher();
        value.hash(&mut hasher);
        hasher.finish()
    }
}

impl<A: AsRef<str> + ?Sized> Equivalence<A> for super::CaseInsensitive {
    fn equals(left: &A, right: &A) -> bool {
        left.as_ref().eq_ignore_ascii_case(right.as_ref())
    }

    fn hash(value: &A) -> u64 {
        let mut hasher = new_hasher();
        for byte in value.as_ref().bytes() {
            hasher.write_u8(byte.to_ascii_lowercase());
        }
        hasher.finish()
    }
}

#[cfg(feature = "fxhash")]
#[inline]
fn new_hasher() -> rustc_hash::FxHasher {
    rustc_hash::FxHasher::default()
}

#[cfg(all(feature = "ahash", not(feature = "fxhash")))]
#[inline]
fn new_hasher() -> ahash::AHasher {
    ahash::AHasher::default()
}

#[cfg(not(any(feature = "fxhash", feature = "ahash")))]
#[inline]
fn new_hasher() -> std::hash::DefaultHasher {
    std::hash::DefaultHasher::new()
}

static_assertions::const_assert_eq!(std::mem::size_of::<NaturalEquivalence>(), 0);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typeclass::CaseInsensitive;
    use rstest::rstest;

    #[rstest]
    fn test_natural_equivalence_equals() {
        assert!(NaturalEquivalence::equals(&1, &1));
        assert!(!NaturalEquivalence::equals(&1, &2));
    }

    #[rstest]
    fn test_natural_equivalence_hash_is_deterministic() {
        let first = NaturalEquivalence::hash("key");
        let second = NaturalEquivalence::hash("key");
        assert_eq!(first, second);
    }

    #[rstest]
    fn test_natural_equivalence_string_and_str_agree() {
        let owned = "key".to_string();
        assert_eq!(
            NaturalEquivalence::hash(&owned),
            NaturalEquivalence::hash("key")
        );
    }

    #[rstest]
    #[case("Hello", "hello")]
    #[case("WORLD", "world")]
    #[case("", "")]
    fn test_case_insensitive_equivalence(#[case] left: &str, #[case] right: &str) {
        assert!(CaseInsensitive::equals(left, right));
        assert_eq!(CaseInsensitive::hash(left), CaseInsensitive::hash(right));
    }

    #[rstest]
    fn test_case_insensitive_distinguishes_letters() {
        assert!(!CaseInsensitive::equals("a", "b"));
    }
}
