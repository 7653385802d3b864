//! Error types shared by every collection in this crate.
//!
//! Looking up a missing key is not an error: lookups return `Option`.
//! [`CollectionError`] covers the conditions where an operation cannot
//! produce a meaningful result at all.

use thiserror::Error;

/// Errors raised by collection operations.
///
/// Every variant records the name of the operation that failed so that a
/// caller can tell which step of a pipeline produced it.
///
/// # Examples
///
/// ```rust
/// use lambars_collections::error::CollectionError;
///
/// let error = CollectionError::Empty { operation: "PersistentList::head" };
/// assert_eq!(format!("{error}"), "PersistentList::head: collection is empty");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    /// An element was requested from an empty collection
    /// (head, tail, peek, pop, min, max...).
    #[error("{operation}: collection is empty")]
    Empty {
        /// The operation that was attempted.
        operation: &'static str,
    },

    /// A positional operation addressed an index past the end.
    #[error("{operation}: index {index} is out of bounds for length {length}")]
    IndexOutOfBounds {
        /// The operation that was attempted.
        operation: &'static str,
        /// The requested index.
        index: usize,
        /// The length of the collection at the time of the call.
        length: usize,
    },

    /// A validated collection rejected a value that breaks its invariant.
    #[error("{operation}: invariant `{invariant}` violated")]
    InvariantViolated {
        /// The name of the invariant that failed.
        invariant: &'static str,
        /// The operation that produced the invalid value.
        operation: &'static str,
    },
}

impl CollectionError {
    /// Creates an [`CollectionError::Empty`] for the given operation.
    #[inline]
    #[must_use]
    pub const fn empty(operation: &'static str) -> Self {
        Self::Empty { operation }
    }

    /// Returns the name of the operation that raised this error.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Empty { operation }
            | Self::IndexOutOfBounds { operation, .. }
            | Self::InvariantViolated { operation, .. } => operation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_empty_display() {
        let error = CollectionError::empty("PersistentStack::pop");
        assert_eq!(format!("{error}"), "PersistentStack::pop: collection is empty");
    }

    #[rstest]
    fn test_index_out_of_bounds_display() {
        let error = CollectionError::IndexOutOfBounds {
            operation: "PersistentVector::update",
            index: 7,
            length: 3,
        };
        assert_eq!(
            format!("{error}"),
            "PersistentVector::update: index 7 is out of bounds for length 3"
        );
    }

    #[rstest]
    fn test_invariant_violated_display() {
        let error = CollectionError::InvariantViolated {
            invariant: "NonEmpty",
            operation: "Validated::mutate(remove)",
        };
        assert_eq!(
            format!("{error}"),
            "Validated::mutate(remove): invariant `NonEmpty` violated"
        );
    }

    #[rstest]
    #[case(CollectionError::empty("a"), "a")]
    #[case(CollectionError::IndexOutOfBounds { operation: "b", index: 0, length: 0 }, "b")]
    #[case(CollectionError::InvariantViolated { invariant: "x", operation: "c" }, "c")]
    fn test_operation_accessor(#[case] error: CollectionError, #[case] expected: &str) {
        assert_eq!(error.operation(), expected);
    }

    #[rstest]
    fn test_is_std_error() {
        fn assert_error<E: std::error::Error + Send + Sync + 'static>(_: &E) {}
        assert_error(&CollectionError::empty("x"));
    }
}
