//! # lambars-collections
//!
//! Persistent (immutable, structurally shared) collections whose ordering or
//! equality is chosen at compile time through a zero-sized strategy type.
//!
//! ## Overview
//!
//! - **Strategies**: [`Order`](typeclass::Order) and
//!   [`Equivalence`](typeclass::Equivalence) capabilities, with
//!   `NaturalOrder`, `ReverseOrder`, `CaseInsensitive` and `NaturalEquivalence`
//!   provided out of the box
//! - **Ordered collections**: `PersistentTreeMap`, `PersistentTreeSet` (AVL tree)
//! - **Hash collections**: `PersistentHashMap`, `PersistentHashSet` (HAMT)
//! - **Sequences**: `PersistentList`, `PersistentVector`, `PersistentQueue`,
//!   `PersistentStack`
//! - **Validation**: `Validated`, a wrapper that re-checks an invariant on every
//!   construction and mutation
//!
//! Two collections built with different strategy types are different Rust types,
//! so combining them (for example with `union`) does not compile.
//!
//! ## Feature Flags
//!
//! - `typeclass`: Strategy contracts and algebraic type classes
//! - `persistent`: Persistent data structures
//! - `validated`: The invariant-checking wrapper
//! - `arc`: Use `Arc` instead of `Rc` so collections are `Send + Sync`
//! - `fxhash` / `ahash`: Faster hashers behind `NaturalEquivalence`
//! - `full`: Enable all of the above except the hasher selection
//!
//! ## Example
//!
//! ```rust
//! use lambars_collections::prelude::*;
//!
//! let ascending: PersistentTreeMap<i32, &str> =
//!     [(2, "two"), (1, "one")].into_iter().collect();
//! let descending: PersistentTreeMap<i32, &str, ReverseOrder> =
//!     [(2, "two"), (1, "one")].into_iter().collect();
//!
//! assert_eq!(ascending.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
//! assert_eq!(descending.keys().copied().collect::<Vec<_>>(), vec![2, 1]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: Disabling redundant_closure_for_method_calls due to clippy 0.1.92 panic bug
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use lambars_collections::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::CollectionError;

    #[cfg(feature = "typeclass")]
    pub use crate::typeclass::*;

    #[cfg(feature = "persistent")]
    pub use crate::persistent::*;

    #[cfg(feature = "validated")]
    pub use crate::validated::*;
}

pub mod error;

#[cfg(feature = "typeclass")]
pub mod typeclass;

#[cfg(feature = "persistent")]
pub mod persistent;

#[cfg(feature = "validated")]
pub mod validated;
