//! Persistent (immutable) ordered map based on an AVL tree.
//!
//! This module provides [`PersistentTreeMap`], an immutable ordered map whose
//! key order is chosen at compile time by an [`Order`] strategy token.
//!
//! # Overview
//!
//! Every node caches its subtree height and size:
//!
//! - O(log N) get, insert, remove
//! - O(log N) min/max, positional access (`get_index`) and `rank`
//! - O(log N + k) range queries where k is the number of results
//! - O(1) len, `is_empty` and height
//!
//! Updates copy only the root-to-node path. All other nodes are shared with
//! the previous version.
//!
//! # Examples
//!
//! ```rust
//! use lambars_collections::persistent::PersistentTreeMap;
//! use lambars_collections::typeclass::ReverseOrder;
//!
//! let map = PersistentTreeMap::new()
//!     .insert(3, "three")
//!     .insert(1, "one")
//!     .insert(2, "two");
//!
//! let keys: Vec<&i32> = map.keys().collect();
//! assert_eq!(keys, vec![&1, &2, &3]);
//!
//! let reversed: PersistentTreeMap<i32, &str, ReverseOrder> = map.into_iter().collect();
//! let keys: Vec<&i32> = reversed.keys().collect();
//! assert_eq!(keys, vec![&3, &2, &1]);
//! ```
//!
//! # Internal Structure
//!
//! The tree maintains the AVL invariants:
//! 1. In-order traversal is strictly increasing under `O::compare`
//! 2. At every node, the heights of the two subtrees differ by at most one
//! 3. `size = 1 + size(left) + size(right)`
//!
//! Invariant 2 bounds the height by roughly `1.44 * log2(N + 2)`.

use super::ReferenceCounter;
use crate::error::CollectionError;
use crate::typeclass::{Foldable, Monoid, NaturalOrder, Order, Semigroup};
use smallvec::SmallVec;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::{FromIterator, Peekable};
use std::marker::PhantomData;
use std::ops::{Bound, RangeBounds};

// =============================================================================
// Node Definition
// =============================================================================

type Link<K, V> = Option<ReferenceCounter<Node<K, V>>>;

/// Internal node structure for the AVL tree.
struct Node<K, V> {
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
    size: usize,
    height: u8,
}

#[inline]
fn height_of<K, V>(link: &Link<K, V>) -> u8 {
    link.as_ref().map_or(0, |node| node.height)
}

#[inline]
fn size_of<K, V>(link: &Link<K, V>) -> usize {
    link.as_ref().map_or(0, |node| node.size)
}

impl<K, V> Node<K, V> {
    /// Creates a node from its parts, computing the cached height and size.
    ///
    /// The caller guarantees the children are already balanced relative to
    /// each other.
    fn join(key: K, value: V, left: Link<K, V>, right: Link<K, V>) -> ReferenceCounter<Self> {
        let height = 1 + height_of(&left).max(height_of(&right));
        let size = 1 + size_of(&left) + size_of(&right);
        ReferenceCounter::new(Self {
            key,
            value,
            left,
            right,
            size,
            height,
        })
    }

    fn leaf(key: K, value: V) -> ReferenceCounter<Self> {
        Self::join(key, value, None, None)
    }

    #[inline]
    fn balance_factor(&self) -> i16 {
        i16::from(height_of(&self.left)) - i16::from(height_of(&self.right))
    }
}

impl<K: Clone, V: Clone> Node<K, V> {
    /// Copies this node's entry onto new children without rebalancing.
    fn with_children(&self, left: Link<K, V>, right: Link<K, V>) -> ReferenceCounter<Self> {
        Self::join(self.key.clone(), self.value.clone(), left, right)
    }

    /// Copies this node's entry onto new children, rebalancing if needed.
    fn rebalanced(&self, left: Link<K, V>, right: Link<K, V>) -> ReferenceCounter<Self> {
        Self::balance(self.key.clone(), self.value.clone(), left, right)
    }

    /// Builds a node whose children's heights differ by at most two and
    /// restores the AVL invariant with one single or double rotation.
    fn balance(key: K, value: V, left: Link<K, V>, right: Link<K, V>) -> ReferenceCounter<Self> {
        let left_height = i16::from(height_of(&left));
        let right_height = i16::from(height_of(&right));

        match left {
            Some(heavy) if left_height - right_height > 1 => {
                Self::rotate_right(key, value, &heavy, right)
            }
            left => match right {
                Some(heavy) if right_height - left_height > 1 => {
                    Self::rotate_left(key, value, left, &heavy)
                }
                right => Self::join(key, value, left, right),
            },
        }
    }

    /// Lifts the left child `pivot` above the node `(key, value)`.
    fn rotate_right(
        key: K,
        value: V,
        pivot: &ReferenceCounter<Self>,
        right: Link<K, V>,
    ) -> ReferenceCounter<Self> {
        match &pivot.right {
            // left-right case
            Some(inner) if pivot.balance_factor() < 0 => {
                let new_left = pivot.with_children(pivot.left.clone(), inner.left.clone());
                let new_right = Self::join(key, value, inner.right.clone(), right);
                inner.with_children(Some(new_left), Some(new_right))
            }
            _ => {
                let new_right = Self::join(key, value, pivot.right.clone(), right);
                pivot.with_children(pivot.left.clone(), Some(new_right))
            }
        }
    }

    /// Lifts the right child `pivot` above the node `(key, value)`.
    fn rotate_left(
        key: K,
        value: V,
        left: Link<K, V>,
        pivot: &ReferenceCounter<Self>,
    ) -> ReferenceCounter<Self> {
        match &pivot.left {
            // right-left case
            Some(inner) if pivot.balance_factor() > 0 => {
                let new_left = Self::join(key, value, left, inner.left.clone());
                let new_right = pivot.with_children(inner.right.clone(), pivot.right.clone());
                inner.with_children(Some(new_left), Some(new_right))
            }
            _ => {
                let new_left = Self::join(key, value, left, pivot.left.clone());
                pivot.with_children(Some(new_left), pivot.right.clone())
            }
        }
    }

    /// Detaches the minimum entry of a subtree, returning it with the
    /// rebalanced remainder.
    fn take_min(node: &ReferenceCounter<Self>) -> (K, V, Link<K, V>) {
        match &node.left {
            None => (node.key.clone(), node.value.clone(), node.right.clone()),
            Some(left) => {
                let (key, value, rest) = Self::take_min(left);
                (key, value, Some(node.rebalanced(rest, node.right.clone())))
            }
        }
    }
}

/// Builds a perfectly balanced subtree from `count` entries already in
/// strictly increasing order.
fn build_balanced<K, V, I>(entries: &mut I, count: usize) -> Link<K, V>
where
    I: Iterator<Item = (K, V)>,
{
    if count == 0 {
        return None;
    }
    let left_count = count / 2;
    let left = build_balanced(entries, left_count);
    let (key, value) = entries.next()?;
    let right = build_balanced(entries, count - left_count - 1);
    Some(Node::join(key, value, left, right))
}

/// Result of inserting into a subtree.
enum Insertion<K, V> {
    /// A new key was added; the subtree may have grown.
    Added(ReferenceCounter<Node<K, V>>),
    /// An existing entry was overwritten; the shape is unchanged.
    Replaced(ReferenceCounter<Node<K, V>>),
    /// The key was present and the existing entry was kept.
    Kept,
}

// =============================================================================
// PersistentTreeMap Definition
// =============================================================================

/// A persistent (immutable) ordered map based on an AVL tree.
///
/// The key order is given by the strategy token `O`, which defaults to
/// [`NaturalOrder`]. Maps with different strategies are different types, so
/// set operations between them are rejected at compile time.
///
/// # Time Complexity
///
/// | Operation           | Complexity        |
/// |---------------------|-------------------|
/// | `new`               | O(1)              |
/// | `get`               | O(log N)          |
/// | `insert`            | O(log N)          |
/// | `remove`            | O(log N)          |
/// | `contains_key`      | O(log N)          |
/// | `find_min`/`find_max`| O(log N)          |
/// | `get_index`/`rank`  | O(log N)          |
/// | `range`             | O(log N + k)      |
/// | `union`             | O(M log(N + M))   |
/// | `len`/`is_empty`    | O(1)              |
///
/// # Examples
///
/// ```rust
/// use lambars_collections::persistent::PersistentTreeMap;
///
/// let map = PersistentTreeMap::singleton(42, "answer");
/// assert_eq!(map.get(&42), Some(&"answer"));
///
/// let map = PersistentTreeMap::new()
///     .insert(3, "three")
///     .insert(1, "one")
///     .insert(2, "two");
///
/// let keys: Vec<&i32> = map.keys().collect();
/// assert_eq!(keys, vec![&1, &2, &3]);
/// ```
pub struct PersistentTreeMap<K, V, O = NaturalOrder> {
    root: Link<K, V>,
    order: PhantomData<fn() -> O>,
}

impl<K, V> PersistentTreeMap<K, V> {
    /// Creates a new empty map under the natural order.
    ///
    /// Use [`with_strategy`](Self::with_strategy) or a type annotation with
    /// [`Default`] for other strategies.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentTreeMap;
    ///
    /// let map: PersistentTreeMap<i32, String> = PersistentTreeMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::with_strategy()
    }
}

impl<K: Clone + Ord, V: Clone> PersistentTreeMap<K, V> {
    /// Creates a map containing a single key-value pair.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentTreeMap;
    ///
    /// let map = PersistentTreeMap::singleton(42, "answer");
    /// assert_eq!(map.len(), 1);
    /// assert_eq!(map.get(&42), Some(&"answer"));
    /// ```
    #[inline]
    #[must_use]
    pub fn singleton(key: K, value: V) -> Self {
        Self::new().insert(key, value)
    }
}

impl<K, V, O> PersistentTreeMap<K, V, O> {
    /// Creates a new empty map for an explicitly chosen strategy.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentTreeMap;
    /// use lambars_collections::typeclass::ReverseOrder;
    ///
    /// let map = PersistentTreeMap::<i32, &str, ReverseOrder>::with_strategy()
    ///     .insert(1, "one")
    ///     .insert(2, "two");
    /// assert_eq!(map.find_min().unwrap(), (&2, &"two"));
    /// ```
    #[inline]
    #[must_use]
    pub const fn with_strategy() -> Self {
        Self {
            root: None,
            order: PhantomData,
        }
    }

    const fn from_root(root: Link<K, V>) -> Self {
        Self {
            root,
            order: PhantomData,
        }
    }

    /// Returns the number of entries in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        size_of(&self.root)
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the height of the underlying tree (0 for an empty map).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentTreeMap;
    ///
    /// let map: PersistentTreeMap<i32, ()> = (0..7).map(|key| (key, ())).collect();
    /// assert_eq!(map.height(), 3);
    /// ```
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        usize::from(height_of(&self.root))
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, provided the
    /// strategy is also implemented for the borrowed form and orders it the
    /// same way.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentTreeMap;
    ///
    /// let map = PersistentTreeMap::new().insert("hello".to_string(), 42);
    ///
    /// assert_eq!(map.get("hello"), Some(&42));
    /// assert_eq!(map.get("world"), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        O: Order<Q>,
        Q: ?Sized,
    {
        self.find(key).map(|node| &node.value)
    }

    /// Returns the stored key and value for a key.
    ///
    /// Under a non-natural strategy the stored key may differ from the
    /// argument while still comparing equal to it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentTreeMap;
    /// use lambars_collections::typeclass::CaseInsensitive;
    ///
    /// let map = PersistentTreeMap::<&str, i32, CaseInsensitive>::with_strategy()
    ///     .insert("Rust", 1);
    /// assert_eq!(map.get_key_value("RUST"), Some((&"Rust", &1)));
    /// ```
    #[must_use]
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        O: Order<Q>,
        Q: ?Sized,
    {
        self.find(key).map(|node| (&node.key, &node.value))
    }

    /// Returns `true` if the map contains the key.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        O: Order<Q>,
        Q: ?Sized,
    {
        self.find(key).is_some()
    }

    fn find<Q>(&self, key: &Q) -> Option<&Node<K, V>>
    where
        K: Borrow<Q>,
        O: Order<Q>,
        Q: ?Sized,
    {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            let node_key: &Q = node.key.borrow();
            current = match O::compare(key, node_key) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(node),
            };
        }
        None
    }

    /// Returns the entry with the minimum key.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::Empty`] if the map is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentTreeMap;
    ///
    /// let map = PersistentTreeMap::new().insert(3, "c").insert(1, "a");
    /// assert_eq!(map.find_min(), Ok((&1, &"a")));
    ///
    /// let empty: PersistentTreeMap<i32, &str> = PersistentTreeMap::new();
    /// assert!(empty.find_min().is_err());
    /// ```
    pub fn find_min(&self) -> Result<(&K, &V), CollectionError> {
        let mut node = self
            .root
            .as_deref()
            .ok_or(CollectionError::empty("PersistentTreeMap::find_min"))?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Ok((&node.key, &node.value))
    }

    /// Returns the entry with the maximum key.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::Empty`] if the map is empty.
    pub fn find_max(&self) -> Result<(&K, &V), CollectionError> {
        let mut node = self
            .root
            .as_deref()
            .ok_or(CollectionError::empty("PersistentTreeMap::find_max"))?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Ok((&node.key, &node.value))
    }

    /// Returns the entry at a position of the in-order sequence.
    ///
    /// # Complexity
    ///
    /// O(log N), using the cached subtree sizes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentTreeMap;
    ///
    /// let map: PersistentTreeMap<i32, char> = [(30, 'c'), (10, 'a'), (20, 'b')].into_iter().collect();
    /// assert_eq!(map.get_index(1), Some((&20, &'b')));
    /// assert_eq!(map.get_index(3), None);
    /// ```
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        let mut remaining = index;
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            let left_size = size_of(&node.left);
            current = match remaining.cmp(&left_size) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Equal => return Some((&node.key, &node.value)),
                Ordering::Greater => {
                    remaining -= left_size + 1;
                    node.right.as_deref()
                }
            };
        }
        None
    }

    /// Returns the number of keys strictly less than `key`.
    ///
    /// When the key is present this is its position in iteration order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentTreeMap;
    ///
    /// let map: PersistentTreeMap<i32, ()> = [10, 20, 30].into_iter().map(|key| (key, ())).collect();
    /// assert_eq!(map.rank(&20), 1);
    /// assert_eq!(map.rank(&25), 2);
    /// assert_eq!(map.rank(&5), 0);
    /// ```
    #[must_use]
    pub fn rank<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        O: Order<Q>,
        Q: ?Sized,
    {
        let mut rank = 0;
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            let node_key: &Q = node.key.borrow();
            current = match O::compare(key, node_key) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Equal => return rank + size_of(&node.left),
                Ordering::Greater => {
                    rank += size_of(&node.left) + 1;
                    node.right.as_deref()
                }
            };
        }
        rank
    }

    /// Returns an iterator over the entries in key order.
    ///
    /// The iterator walks the tree lazily with an explicit stack; calling
    /// `iter` again restarts the traversal.
    #[must_use]
    pub fn iter(&self) -> PersistentTreeMapIterator<'_, K, V> {
        let mut iterator = PersistentTreeMapIterator {
            stack: SmallVec::new(),
            remaining: self.len(),
        };
        iterator.push_left_spine(self.root.as_deref());
        iterator
    }

    /// Returns an iterator over the keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over the values in key order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }

    /// Folds the entries in key order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentTreeMap;
    ///
    /// let map = PersistentTreeMap::new().insert("b", 2).insert("a", 1);
    /// let rendered = map.fold(String::new(), |mut accumulator, key, value| {
    ///     accumulator.push_str(&format!("{key}{value}"));
    ///     accumulator
    /// });
    /// assert_eq!(rendered, "a1b2");
    /// ```
    pub fn fold<B, F>(&self, init: B, mut function: F) -> B
    where
        F: FnMut(B, &K, &V) -> B,
    {
        self.iter()
            .fold(init, |accumulator, (key, value)| function(accumulator, key, value))
    }

    /// Returns a lazy iterator over the entries whose keys fall within `range`.
    ///
    /// The bounds are compared with the map's strategy.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentTreeMap;
    ///
    /// let map: PersistentTreeMap<i32, i32> = (1..=5).map(|key| (key, key * 10)).collect();
    ///
    /// let range: Vec<(&i32, &i32)> = map.range(2..=4).collect();
    /// assert_eq!(range, vec![(&2, &20), (&3, &30), (&4, &40)]);
    /// ```
    pub fn range<R>(&self, range: R) -> PersistentTreeMapRangeIterator<'_, K, V, O>
    where
        R: RangeBounds<K>,
        K: Clone,
        O: Order<K>,
    {
        let mut stack = SmallVec::new();
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            if Self::above_start(&node.key, range.start_bound()) {
                stack.push(node);
                current = node.left.as_deref();
            } else {
                current = node.right.as_deref();
            }
        }
        PersistentTreeMapRangeIterator {
            stack,
            end: range.end_bound().cloned(),
            order: PhantomData,
        }
    }

    fn above_start(key: &K, start: Bound<&K>) -> bool
    where
        O: Order<K>,
    {
        match start {
            Bound::Included(bound) => O::compare(key, bound) != Ordering::Less,
            Bound::Excluded(bound) => O::compare(key, bound) == Ordering::Greater,
            Bound::Unbounded => true,
        }
    }

    fn merge<'a>(&'a self, other: &'a Self) -> MergeIterator<'a, K, V, O> {
        MergeIterator {
            left: self.iter().peekable(),
            right: other.iter().peekable(),
            order: PhantomData,
        }
    }
}

impl<K: Clone, V: Clone, O: Order<K>> PersistentTreeMap<K, V, O> {
    /// Builds a map from entries that are already strictly increasing under
    /// the strategy. The result is perfectly balanced.
    fn from_sorted(entries: Vec<(K, V)>) -> Self {
        let count = entries.len();
        Self::from_root(build_balanced(&mut entries.into_iter(), count))
    }

    /// Inserts a key-value pair, returning a new map.
    ///
    /// If the key already exists (under the strategy), both the stored key
    /// and the value are replaced and the tree shape is unchanged.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentTreeMap;
    ///
    /// let map1 = PersistentTreeMap::new().insert(1, "one");
    /// let map2 = map1.insert(1, "ONE");
    ///
    /// assert_eq!(map1.get(&1), Some(&"one"));
    /// assert_eq!(map2.get(&1), Some(&"ONE"));
    /// ```
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        match Self::insert_into(&self.root, key, value, true) {
            Insertion::Added(root) | Insertion::Replaced(root) => Self::from_root(Some(root)),
            Insertion::Kept => self.clone(),
        }
    }

    /// Inserts a key-value pair only if the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentTreeMap;
    ///
    /// let map = PersistentTreeMap::new().insert(1, "one");
    /// assert_eq!(map.insert_if_absent(1, "uno").get(&1), Some(&"one"));
    /// assert_eq!(map.insert_if_absent(2, "two").get(&2), Some(&"two"));
    /// ```
    #[must_use]
    pub fn insert_if_absent(&self, key: K, value: V) -> Self {
        match Self::insert_into(&self.root, key, value, false) {
            Insertion::Added(root) | Insertion::Replaced(root) => Self::from_root(Some(root)),
            Insertion::Kept => self.clone(),
        }
    }

    fn insert_into(link: &Link<K, V>, key: K, value: V, overwrite: bool) -> Insertion<K, V> {
        let Some(node) = link else {
            return Insertion::Added(Node::leaf(key, value));
        };
        match O::compare(&key, &node.key) {
            Ordering::Less => match Self::insert_into(&node.left, key, value, overwrite) {
                Insertion::Added(child) => {
                    Insertion::Added(node.rebalanced(Some(child), node.right.clone()))
                }
                Insertion::Replaced(child) => {
                    Insertion::Replaced(node.with_children(Some(child), node.right.clone()))
                }
                Insertion::Kept => Insertion::Kept,
            },
            Ordering::Greater => match Self::insert_into(&node.right, key, value, overwrite) {
                Insertion::Added(child) => {
                    Insertion::Added(node.rebalanced(node.left.clone(), Some(child)))
                }
                Insertion::Replaced(child) => {
                    Insertion::Replaced(node.with_children(node.left.clone(), Some(child)))
                }
                Insertion::Kept => Insertion::Kept,
            },
            Ordering::Equal if overwrite => Insertion::Replaced(Node::join(
                key,
                value,
                node.left.clone(),
                node.right.clone(),
            )),
            Ordering::Equal => Insertion::Kept,
        }
    }

    /// Removes a key, returning a new map.
    ///
    /// A node with two children is replaced by its in-order successor.
    /// Removing an absent key returns a map equal to (and sharing all nodes
    /// with) the original.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentTreeMap;
    ///
    /// let map = PersistentTreeMap::new().insert(1, "one").insert(2, "two");
    /// let removed = map.remove(&1);
    ///
    /// assert_eq!(removed.len(), 1);
    /// assert_eq!(removed.get(&1), None);
    /// assert_eq!(map.len(), 2);
    /// ```
    #[must_use]
    pub fn remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        O: Order<Q>,
        Q: ?Sized,
    {
        Self::remove_from(&self.root, key).map_or_else(|| self.clone(), Self::from_root)
    }

    /// Returns `None` when the key is absent.
    fn remove_from<Q>(link: &Link<K, V>, key: &Q) -> Option<Link<K, V>>
    where
        K: Borrow<Q>,
        O: Order<Q>,
        Q: ?Sized,
    {
        let node = link.as_ref()?;
        let node_key: &Q = node.key.borrow();
        match O::compare(key, node_key) {
            Ordering::Less => {
                let left = Self::remove_from(&node.left, key)?;
                Some(Some(node.rebalanced(left, node.right.clone())))
            }
            Ordering::Greater => {
                let right = Self::remove_from(&node.right, key)?;
                Some(Some(node.rebalanced(node.left.clone(), right)))
            }
            Ordering::Equal => Some(match (&node.left, &node.right) {
                (None, right) => right.clone(),
                (left, None) => left.clone(),
                (left, Some(right)) => {
                    let (successor_key, successor_value, rest) = Node::take_min(right);
                    Some(Node::balance(
                        successor_key,
                        successor_value,
                        left.clone(),
                        rest,
                    ))
                }
            }),
        }
    }

    /// Applies a function to the value at `key`, returning the updated map,
    /// or `None` if the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentTreeMap;
    ///
    /// let map = PersistentTreeMap::new().insert("count", 1);
    /// let updated = map.update("count", |count| count + 1).unwrap();
    ///
    /// assert_eq!(updated.get("count"), Some(&2));
    /// assert_eq!(map.get("count"), Some(&1));
    /// assert!(map.update("missing", |count| count + 1).is_none());
    /// ```
    #[must_use]
    pub fn update<Q, F>(&self, key: &Q, function: F) -> Option<Self>
    where
        K: Borrow<Q>,
        O: Order<Q>,
        Q: ?Sized,
        F: FnOnce(&V) -> V,
    {
        let root = self.root.as_ref()?;
        Self::update_node(root, key, function).map(|root| Self::from_root(Some(root)))
    }

    fn update_node<Q, F>(
        node: &ReferenceCounter<Node<K, V>>,
        key: &Q,
        function: F,
    ) -> Option<ReferenceCounter<Node<K, V>>>
    where
        K: Borrow<Q>,
        O: Order<Q>,
        Q: ?Sized,
        F: FnOnce(&V) -> V,
    {
        let node_key: &Q = node.key.borrow();
        match O::compare(key, node_key) {
            Ordering::Less => {
                let child = Self::update_node(node.left.as_ref()?, key, function)?;
                Some(node.with_children(Some(child), node.right.clone()))
            }
            Ordering::Greater => {
                let child = Self::update_node(node.right.as_ref()?, key, function)?;
                Some(node.with_children(node.left.clone(), Some(child)))
            }
            Ordering::Equal => Some(Node::join(
                node.key.clone(),
                function(&node.value),
                node.left.clone(),
                node.right.clone(),
            )),
        }
    }

    /// Returns the union of two maps.
    ///
    /// The union is **right-biased**: for keys present in both maps, the entry
    /// from `other` wins. The smaller map is folded into the larger one, so
    /// most of the larger tree is shared with the result.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentTreeMap;
    ///
    /// let left = PersistentTreeMap::new().insert(1, "left").insert(2, "left");
    /// let right = PersistentTreeMap::new().insert(2, "right").insert(3, "right");
    /// let union = left.union(&right);
    ///
    /// assert_eq!(union.len(), 3);
    /// assert_eq!(union.get(&2), Some(&"right"));
    /// ```
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if self.len() >= other.len() {
            other
                .iter()
                .fold(self.clone(), |accumulator, (key, value)| {
                    accumulator.insert(key.clone(), value.clone())
                })
        } else {
            self.iter()
                .fold(other.clone(), |accumulator, (key, value)| {
                    accumulator.insert_if_absent(key.clone(), value.clone())
                })
        }
    }

    /// Returns the union of two maps, resolving duplicate keys with
    /// `resolver(key, self_value, other_value)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentTreeMap;
    ///
    /// let left = PersistentTreeMap::new().insert("a", 1).insert("b", 2);
    /// let right = PersistentTreeMap::new().insert("b", 20).insert("c", 30);
    /// let merged = left.union_with(&right, |_, mine, theirs| mine + theirs);
    ///
    /// assert_eq!(merged.get("b"), Some(&22));
    /// assert_eq!(merged.len(), 3);
    /// ```
    #[must_use]
    pub fn union_with<F>(&self, other: &Self, mut resolver: F) -> Self
    where
        F: FnMut(&K, &V, &V) -> V,
    {
        other
            .iter()
            .fold(self.clone(), |accumulator, (key, value)| {
                match self.get(key) {
                    Some(mine) => {
                        let resolved = resolver(key, mine, value);
                        accumulator.insert(key.clone(), resolved)
                    }
                    None => accumulator.insert(key.clone(), value.clone()),
                }
            })
    }

    /// Returns the entries of `self` whose keys are also in `other`.
    ///
    /// Values (and stored keys) come from `self`.
    ///
    /// # Complexity
    ///
    /// O(N + M)
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        self.intersection_with(other, |_, mine, _| mine.clone())
    }

    /// Returns the keys present in both maps, combining their values with
    /// `combiner(key, self_value, other_value)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentTreeMap;
    ///
    /// let left = PersistentTreeMap::new().insert(1, 10).insert(2, 20);
    /// let right = PersistentTreeMap::new().insert(2, 2).insert(3, 3);
    /// let product = left.intersection_with(&right, |_, mine, theirs| mine * theirs);
    ///
    /// assert_eq!(product.len(), 1);
    /// assert_eq!(product.get(&2), Some(&40));
    /// ```
    #[must_use]
    pub fn intersection_with<F>(&self, other: &Self, mut combiner: F) -> Self
    where
        F: FnMut(&K, &V, &V) -> V,
    {
        let entries = self
            .merge(other)
            .filter_map(|step| match step {
                Merged::Both((key, mine), (_, theirs)) => {
                    Some((key.clone(), combiner(key, mine, theirs)))
                }
                Merged::Left(..) | Merged::Right(..) => None,
            })
            .collect();
        Self::from_sorted(entries)
    }

    /// Returns the entries of `self` whose keys are not in `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentTreeMap;
    ///
    /// let left: PersistentTreeMap<i32, ()> = (1..=4).map(|key| (key, ())).collect();
    /// let right: PersistentTreeMap<i32, ()> = (3..=6).map(|key| (key, ())).collect();
    /// let keys: Vec<i32> = left.difference(&right).keys().copied().collect();
    /// assert_eq!(keys, vec![1, 2]);
    /// ```
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        let entries = self
            .merge(other)
            .filter_map(|step| match step {
                Merged::Left((key, value)) => Some((key.clone(), value.clone())),
                Merged::Both(..) | Merged::Right(..) => None,
            })
            .collect();
        Self::from_sorted(entries)
    }

    /// Returns the entries whose keys are in exactly one of the two maps.
    #[must_use]
    pub fn symmetric_difference(&self, other: &Self) -> Self {
        let entries = self
            .merge(other)
            .filter_map(|step| match step {
                Merged::Left((key, value)) | Merged::Right((key, value)) => {
                    Some((key.clone(), value.clone()))
                }
                Merged::Both(..) => None,
            })
            .collect();
        Self::from_sorted(entries)
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over key-value pairs of a [`PersistentTreeMap`] in key order.
pub struct PersistentTreeMapIterator<'a, K, V> {
    stack: SmallVec<[&'a Node<K, V>; 32]>,
    remaining: usize,
}

impl<'a, K, V> PersistentTreeMapIterator<'a, K, V> {
    fn push_left_spine(&mut self, mut current: Option<&'a Node<K, V>>) {
        while let Some(node) = current {
            self.stack.push(node);
            current = node.left.as_deref();
        }
    }
}

impl<'a, K, V> Iterator for PersistentTreeMapIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for PersistentTreeMapIterator<'_, K, V> {}

/// A lazy iterator over a key range of a [`PersistentTreeMap`].
pub struct PersistentTreeMapRangeIterator<'a, K, V, O = NaturalOrder> {
    stack: SmallVec<[&'a Node<K, V>; 32]>,
    end: Bound<K>,
    order: PhantomData<fn() -> O>,
}

impl<'a, K, V, O: Order<K>> Iterator for PersistentTreeMapRangeIterator<'a, K, V, O> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let within = match &self.end {
            Bound::Included(bound) => O::compare(&node.key, bound) != Ordering::Greater,
            Bound::Excluded(bound) => O::compare(&node.key, bound) == Ordering::Less,
            Bound::Unbounded => true,
        };
        if !within {
            self.stack.clear();
            return None;
        }
        let mut current = node.right.as_deref();
        while let Some(child) = current {
            self.stack.push(child);
            current = child.left.as_deref();
        }
        Some((&node.key, &node.value))
    }
}

/// An owning iterator over key-value pairs of a [`PersistentTreeMap`].
///
/// Entries are cloned out of the shared tree.
pub struct PersistentTreeMapIntoIterator<K, V> {
    entries: std::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for PersistentTreeMapIntoIterator<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> ExactSizeIterator for PersistentTreeMapIntoIterator<K, V> {}

/// One step of a sorted merge of two maps.
enum Merged<'a, K, V> {
    Left((&'a K, &'a V)),
    Right((&'a K, &'a V)),
    Both((&'a K, &'a V), (&'a K, &'a V)),
}

/// Walks two maps of the same strategy in lockstep.
struct MergeIterator<'a, K, V, O> {
    left: Peekable<PersistentTreeMapIterator<'a, K, V>>,
    right: Peekable<PersistentTreeMapIterator<'a, K, V>>,
    order: PhantomData<fn() -> O>,
}

impl<'a, K, V, O: Order<K>> Iterator for MergeIterator<'a, K, V, O> {
    type Item = Merged<'a, K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let ordering = match (self.left.peek(), self.right.peek()) {
            (None, None) => return None,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some((left_key, _)), Some((right_key, _))) => O::compare(left_key, right_key),
        };
        match ordering {
            Ordering::Less => self.left.next().map(Merged::Left),
            Ordering::Greater => self.right.next().map(Merged::Right),
            Ordering::Equal => {
                let left = self.left.next()?;
                let right = self.right.next()?;
                Some(Merged::Both(left, right))
            }
        }
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V, O> Clone for PersistentTreeMap<K, V, O> {
    fn clone(&self) -> Self {
        Self::from_root(self.root.clone())
    }
}

impl<K, V, O> Default for PersistentTreeMap<K, V, O> {
    #[inline]
    fn default() -> Self {
        Self::with_strategy()
    }
}

impl<K: Clone, V: Clone, O: Order<K>> FromIterator<(K, V)> for PersistentTreeMap<K, V, O> {
    /// Later duplicates overwrite earlier ones.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::with_strategy(), |map, (key, value)| {
                map.insert(key, value)
            })
    }
}

impl<K: Clone, V: Clone, O> IntoIterator for PersistentTreeMap<K, V, O> {
    type Item = (K, V);
    type IntoIter = PersistentTreeMapIntoIterator<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let entries: Vec<(K, V)> = self
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        PersistentTreeMapIntoIterator {
            entries: entries.into_iter(),
        }
    }
}

impl<'a, K, V, O> IntoIterator for &'a PersistentTreeMap<K, V, O> {
    type Item = (&'a K, &'a V);
    type IntoIter = PersistentTreeMapIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Structural equality: the same keys (under the strategy) mapped to equal
/// values, regardless of tree shape.
impl<K, V: PartialEq, O: Order<K>> PartialEq for PersistentTreeMap<K, V, O> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|((left_key, left_value), (right_key, right_value))| {
                    O::equals(left_key, right_key) && left_value == right_value
                })
    }
}

impl<K, V: Eq, O: Order<K>> Eq for PersistentTreeMap<K, V, O> {}

/// Lexicographic over the in-order entry sequence.
impl<K, V: PartialOrd, O: Order<K>> PartialOrd for PersistentTreeMap<K, V, O> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let mut left = self.iter();
        let mut right = other.iter();
        loop {
            match (left.next(), right.next()) {
                (None, None) => return Some(Ordering::Equal),
                (None, Some(_)) => return Some(Ordering::Less),
                (Some(_), None) => return Some(Ordering::Greater),
                (Some((left_key, left_value)), Some((right_key, right_value))) => {
                    let ordering = match O::compare(left_key, right_key) {
                        Ordering::Equal => left_value.partial_cmp(right_value)?,
                        ordering => ordering,
                    };
                    if ordering.is_ne() {
                        return Some(ordering);
                    }
                }
            }
        }
    }
}

impl<K, V: Ord, O: Order<K>> Ord for PersistentTreeMap<K, V, O> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter()
            .zip(other.iter())
            .map(|((left_key, left_value), (right_key, right_value))| {
                O::compare(left_key, right_key).then_with(|| left_value.cmp(right_value))
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| self.len().cmp(&other.len()))
    }
}

/// Hashes the length followed by each entry in key order.
///
/// Only the natural order is hashable: a custom order may treat keys as equal
/// whose [`Hash`] output differs, which would break `Hash`/`Eq` consistency.
///
/// # Examples
///
/// ```rust
/// use lambars_collections::persistent::PersistentTreeMap;
/// use std::collections::HashMap;
///
/// let mut outer: HashMap<PersistentTreeMap<i32, String>, &str> = HashMap::new();
/// let key = PersistentTreeMap::new()
///     .insert(1, "one".to_string())
///     .insert(2, "two".to_string());
/// outer.insert(key.clone(), "value");
/// assert_eq!(outer.get(&key), Some(&"value"));
/// ```
impl<K: Hash, V: Hash> Hash for PersistentTreeMap<K, V, NaturalOrder> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (key, value) in self {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, O> fmt::Debug for PersistentTreeMap<K, V, O> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

// =============================================================================
// Type Class Implementations
// =============================================================================

/// `combine` is the right-biased [`union`](PersistentTreeMap::union).
impl<K: Clone, V: Clone, O: Order<K>> Semigroup for PersistentTreeMap<K, V, O> {
    fn combine(self, other: Self) -> Self {
        self.union(&other)
    }

    fn combine_ref(&self, other: &Self) -> Self {
        self.union(other)
    }
}

impl<K: Clone, V: Clone, O: Order<K>> Monoid for PersistentTreeMap<K, V, O> {
    fn empty() -> Self {
        Self::with_strategy()
    }
}

impl<K, V, O> Foldable for PersistentTreeMap<K, V, O> {
    type Item<'a>
        = (&'a K, &'a V)
    where
        Self: 'a;

    fn fold_left<'a, B, F>(&'a self, init: B, function: F) -> B
    where
        F: FnMut(B, (&'a K, &'a V)) -> B,
    {
        self.iter().fold(init, function)
    }

    #[inline]
    fn length(&self) -> usize {
        self.len()
    }
}

// =============================================================================
// Tests
// =============================================================================
