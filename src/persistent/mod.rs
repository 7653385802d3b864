//! Persistent (immutable) data structures.
//!
//! Every structure in this module shares unmodified substructure between
//! versions, so an "update" returns a new handle in O(log n) or better while
//! the old handle stays valid and unchanged:
//!
//! - [`PersistentTreeMap`] / [`PersistentTreeSet`]: Ordered map and set
//!   (AVL tree) parameterized by an [`Order`](crate::typeclass::Order) strategy
//! - [`PersistentHashMap`] / [`PersistentHashSet`]: Hash map and set (HAMT)
//!   parameterized by an [`Equivalence`](crate::typeclass::Equivalence) strategy
//! - [`PersistentList`]: Singly-linked cons list
//! - [`PersistentVector`]: 32-ary radix tree with a tail buffer
//! - [`PersistentQueue`]: FIFO queue built from two lists
//! - [`PersistentStack`]: LIFO stack built on the list
//!
//! # Examples
//!
//! ## `PersistentTreeMap`
//!
//! ```rust
//! use lambars_collections::persistent::PersistentTreeMap;
//!
//! let map = PersistentTreeMap::new()
//!     .insert(3, "three")
//!     .insert(1, "one")
//!     .insert(2, "two");
//!
//! let keys: Vec<&i32> = map.keys().collect();
//! assert_eq!(keys, vec![&1, &2, &3]);
//!
//! let updated = map.insert(1, "ONE");
//! assert_eq!(map.get(&1), Some(&"one"));
//! assert_eq!(updated.get(&1), Some(&"ONE"));
//! ```
//!
//! ## `PersistentHashSet` with a custom strategy
//!
//! ```rust
//! use lambars_collections::persistent::PersistentHashSet;
//! use lambars_collections::typeclass::CaseInsensitive;
//!
//! let tags: PersistentHashSet<&str, CaseInsensitive> =
//!     ["Rust", "rust", "RUST", "Go"].into_iter().collect();
//! assert_eq!(tags.len(), 2);
//! assert!(tags.contains("GO"));
//! ```
//!
//! ## `PersistentVector`
//!
//! ```rust
//! use lambars_collections::persistent::PersistentVector;
//!
//! let vector: PersistentVector<i32> = (0..100).collect();
//! let updated = vector.update(50, 999).unwrap();
//! assert_eq!(vector.get(50), Some(&50));
//! assert_eq!(updated.get(50), Some(&999));
//! ```

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`,
/// which is thread-safe but has slightly higher overhead.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

mod hashmap;
mod hashset;
mod list;
mod queue;
mod stack;
mod treemap;
mod treeset;
mod vector;

pub use hashmap::PersistentHashMap;
pub use hashmap::PersistentHashMapIntoIterator;
pub use hashmap::PersistentHashMapIterator;
pub use hashset::PersistentHashSet;
pub use hashset::PersistentHashSetIntoIterator;
pub use hashset::PersistentHashSetIterator;
pub use list::PersistentList;
pub use list::PersistentListIntoIterator;
pub use list::PersistentListIterator;
pub use queue::PersistentQueue;
pub use queue::PersistentQueueIterator;
pub use stack::PersistentStack;
pub use treemap::PersistentTreeMap;
pub use treemap::PersistentTreeMapIntoIterator;
pub use treemap::PersistentTreeMapIterator;
pub use treemap::PersistentTreeMapRangeIterator;
pub use treeset::PersistentTreeSet;
pub use treeset::PersistentTreeSetIntoIterator;
pub use treeset::PersistentTreeSetIterator;
pub use vector::PersistentVector;
pub use vector::PersistentVectorChunks;
pub use vector::PersistentVectorIntoIterator;
pub use vector::PersistentVectorIterator;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod reference_counter_tests {
    use super::ReferenceCounter;
    use rstest::rstest;

    #[rstest]
    fn test_reference_counter_clone() {
        let reference_counter: ReferenceCounter<i32> = ReferenceCounter::new(42);
        let reference_counter_clone = reference_counter.clone();
        assert_eq!(*reference_counter, *reference_counter_clone);
    }

    #[rstest]
    fn test_reference_counter_strong_count() {
        let reference_counter: ReferenceCounter<i32> = ReferenceCounter::new(42);
        assert_eq!(ReferenceCounter::strong_count(&reference_counter), 1);
        let shared = ReferenceCounter::clone(&reference_counter);
        assert_eq!(ReferenceCounter::strong_count(&reference_counter), 2);
        drop(shared);
        assert_eq!(ReferenceCounter::strong_count(&reference_counter), 1);
    }
}

#[cfg(all(test, feature = "arc"))]
mod send_sync_tests {
    use super::*;
    use crate::typeclass::{CaseInsensitive, ReverseOrder};

    static_assertions::assert_impl_all!(PersistentTreeMap<i32, String>: Send, Sync);
    static_assertions::assert_impl_all!(PersistentTreeMap<i32, String, ReverseOrder>: Send, Sync);
    static_assertions::assert_impl_all!(PersistentTreeSet<String, CaseInsensitive>: Send, Sync);
    static_assertions::assert_impl_all!(PersistentHashMap<String, i32>: Send, Sync);
    static_assertions::assert_impl_all!(PersistentHashSet<String, CaseInsensitive>: Send, Sync);
    static_assertions::assert_impl_all!(PersistentList<i32>: Send, Sync);
    static_assertions::assert_impl_all!(PersistentVector<i32>: Send, Sync);
    static_assertions::assert_impl_all!(PersistentQueue<i32>: Send, Sync);
    static_assertions::assert_impl_all!(PersistentStack<i32>: Send, Sync);
}
