//! Type class traits shared by every collection in the crate.
//!
//! Two groups live here:
//!
//! ## Strategy Contracts
//!
//! - [`Order`]: A strict total order, used by the tree-based collections
//! - [`Equivalence`]: An equality with a compatible hash, used by the
//!   trie-based collections
//!
//! Strategies are zero-sized *tokens*. Their methods are associated functions,
//! so a collection only carries the token in its type, never as a value.
//! Provided tokens:
//!
//! - [`NaturalOrder`]: The element's own [`Ord`]
//! - [`ReverseOrder`]: Any order, reversed
//! - [`CaseInsensitive`]: ASCII case-insensitive order *and* equivalence for
//!   string-like elements
//! - [`NaturalEquivalence`]: The element's own [`Eq`] and [`Hash`](std::hash::Hash)
//!
//! ## Algebraic Structures
//!
//! - [`Semigroup`]: Types with an associative binary operation (`combine`)
//! - [`Monoid`]: Semigroups with an identity element (`empty`)
//! - [`Foldable`]: Structures that can be reduced to a summary value
//!
//! # Examples
//!
//! ## Using a strategy token
//!
//! ```rust
//! use lambars_collections::typeclass::{CaseInsensitive, Order};
//! use std::cmp::Ordering;
//!
//! assert_eq!(
//!     <CaseInsensitive as Order<str>>::compare("Rust", "rust"),
//!     Ordering::Equal
//! );
//! ```
//!
//! ## Using Monoid
//!
//! ```rust
//! use lambars_collections::typeclass::{Monoid, Semigroup};
//!
//! let value = String::from("hello");
//! assert_eq!(String::empty().combine(value.clone()), value);
//!
//! let parts = vec![vec![1], vec![2, 3]];
//! assert_eq!(Vec::combine_all(parts), vec![1, 2, 3]);
//! ```

mod equivalence;
mod foldable;
mod monoid;
mod order;
mod semigroup;

pub use equivalence::{Equivalence, NaturalEquivalence};
pub use foldable::Foldable;
pub use monoid::Monoid;
pub use order::{CaseInsensitive, NaturalOrder, Order, ReverseOrder};
pub use semigroup::Semigroup;
