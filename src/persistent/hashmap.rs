//! Persistent (immutable) hash map based on HAMT.
//!
//! This module provides [`PersistentHashMap`], an immutable hash map whose key
//! equality and hash are chosen at compile time by an [`Equivalence`]
//! strategy token.
//!
//! # Overview
//!
//! `PersistentHashMap` is a Hash Array Mapped Trie (HAMT): a 32-way trie in
//! which each level consumes five bits of the key's 64-bit hash, most
//! significant bits first.
//!
//! - O(log32 N) get (effectively O(1) for practical sizes)
//! - O(log32 N) insert
//! - O(log32 N) remove
//! - O(1) len and `is_empty`
//!
//! # Examples
//!
//! ```rust
//! use lambars_collections::persistent::PersistentHashMap;
//!
//! let map = PersistentHashMap::new()
//!     .insert("one".to_string(), 1)
//!     .insert("two".to_string(), 2);
//!
//! assert_eq!(map.get("one"), Some(&1));
//!
//! let updated = map.insert("one".to_string(), 100);
//! assert_eq!(map.get("one"), Some(&1));
//! assert_eq!(updated.get("one"), Some(&100));
//! ```
//!
//! # Internal Structure
//!
//! - A branch holds a 32-bit bitmap and one child per set bit, stored densely
//!   in fragment order
//! - A bucket holds every entry sharing one full 64-bit hash; entries inside a
//!   bucket are told apart by [`Equivalence::equals`]
//! - Removal collapses a branch left with a single bucket into that bucket

use super::ReferenceCounter;
use crate::typeclass::{Equivalence, Foldable, Monoid, NaturalEquivalence, Semigroup};
use smallvec::{SmallVec, smallvec};
use std::borrow::Borrow;
use std::fmt;
use std::iter::FromIterator;
use std::marker::PhantomData;
use std::slice;

// =============================================================================
// Constants
// =============================================================================

/// Bits per level in the trie
const BITS_PER_LEVEL: usize = 5;

/// Bit mask for extracting a fragment
const MASK: u64 = (1 << BITS_PER_LEVEL) - 1;

/// Maximum depth of the trie (64 bits / 5 bits per level, rounded up)
const MAX_DEPTH: usize = 13;

/// Extracts the fragment used at `depth`, most significant bits first.
///
/// The last level only has four significant bits left; they are shifted into
/// the high end of the fragment.
#[inline]
#[allow(clippy::cast_possible_truncation)]
const fn fragment(hash: u64, depth: usize) -> u32 {
    let remaining = 64usize.saturating_sub(depth * BITS_PER_LEVEL);
    let bits = if remaining >= BITS_PER_LEVEL {
        hash >> (remaining - BITS_PER_LEVEL)
    } else {
        hash << (BITS_PER_LEVEL - remaining)
    };
    (bits & MASK) as u32
}

#[inline]
const fn bit_for(hash: u64, depth: usize) -> u32 {
    1 << fragment(hash, depth)
}

/// Position of the child for `bit` in the dense children array.
#[inline]
const fn slot(bitmap: u32, bit: u32) -> usize {
    (bitmap & (bit - 1)).count_ones() as usize
}

// =============================================================================
// Node Definition
// =============================================================================

type Child<K, V> = ReferenceCounter<Node<K, V>>;

/// Internal node structure for the HAMT.
enum Node<K, V> {
    /// Bitmap-indexed branch node
    Branch {
        bitmap: u32,
        children: Vec<Child<K, V>>,
    },
    /// Entries sharing one full hash
    Bucket {
        hash: u64,
        entries: SmallVec<[(K, V); 1]>,
    },
}

impl<K, V> Node<K, V> {
    fn bucket(hash: u64, key: K, value: V) -> Child<K, V> {
        ReferenceCounter::new(Self::Bucket {
            hash,
            entries: smallvec![(key, value)],
        })
    }

    /// Builds the smallest branch chain that separates two buckets with
    /// different hashes, starting at `depth`.
    fn split(
        depth: usize,
        first: Child<K, V>,
        first_hash: u64,
        second: Child<K, V>,
        second_hash: u64,
    ) -> Self {
        let first_fragment = fragment(first_hash, depth);
        let second_fragment = fragment(second_hash, depth);
        if first_fragment == second_fragment && depth + 1 < MAX_DEPTH {
            let inner = Self::split(depth + 1, first, first_hash, second, second_hash);
            Self::Branch {
                bitmap: 1 << first_fragment,
                children: vec![ReferenceCounter::new(inner)],
            }
        } else {
            let children = if first_fragment < second_fragment {
                vec![first, second]
            } else {
                vec![second, first]
            };
            Self::Branch {
                bitmap: (1 << first_fragment) | (1 << second_fragment),
                children,
            }
        }
    }
}

fn with_child_replaced<K, V>(
    children: &[Child<K, V>],
    index: usize,
    child: Child<K, V>,
) -> Vec<Child<K, V>> {
    let mut updated = children.to_vec();
    if let Some(slot) = updated.get_mut(index) {
        *slot = child;
    }
    updated
}

/// Result of inserting into a subtree.
enum Insertion<K, V> {
    Added(Node<K, V>),
    Replaced(Node<K, V>),
    Kept,
}

impl<K, V> Insertion<K, V> {
    fn map<F>(self, function: F) -> Self
    where
        F: FnOnce(Node<K, V>) -> Node<K, V>,
    {
        match self {
            Self::Added(node) => Self::Added(function(node)),
            Self::Replaced(node) => Self::Replaced(function(node)),
            Self::Kept => Self::Kept,
        }
    }
}

// =============================================================================
// PersistentHashMap Definition
// =============================================================================

/// A persistent (immutable) hash map based on HAMT.
///
/// Key equality and hashing come from the strategy token `E`, which defaults
/// to [`NaturalEquivalence`]. The strategy must satisfy
/// `equals(a, b) => hash(a) == hash(b)`; a strategy that breaks this makes
/// lookups miss but never panics.
///
/// # Time Complexity
///
/// | Operation      | Complexity         |
/// |----------------|--------------------|
/// | `new`          | O(1)               |
/// | `get`          | O(log32 N)         |
/// | `insert`       | O(log32 N)         |
/// | `remove`       | O(log32 N)         |
/// | `contains_key` | O(log32 N)         |
/// | `union`        | O(M log32 (N + M)) |
/// | `len`          | O(1)               |
///
/// Keys with identical hashes share a bucket, which is scanned linearly.
///
/// # Examples
///
/// ```rust
/// use lambars_collections::persistent::PersistentHashMap;
/// use lambars_collections::typeclass::CaseInsensitive;
///
/// let headers = PersistentHashMap::<&str, &str, CaseInsensitive>::with_strategy()
///     .insert("Content-Type", "text/plain");
/// assert_eq!(headers.get("content-type"), Some(&"text/plain"));
/// ```
pub struct PersistentHashMap<K, V, E = NaturalEquivalence> {
    /// Always a branch when present
    root: Option<Child<K, V>>,
    length: usize,
    equivalence: PhantomData<fn() -> E>,
}

impl<K, V> PersistentHashMap<K, V> {
    /// Creates a new empty map using the natural equivalence.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentHashMap;
    ///
    /// let map: PersistentHashMap<String, i32> = PersistentHashMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::with_strategy()
    }
}

impl<K: Clone + std::hash::Hash + Eq, V: Clone> PersistentHashMap<K, V> {
    /// Creates a map containing a single key-value pair.
    #[inline]
    #[must_use]
    pub fn singleton(key: K, value: V) -> Self {
        Self::new().insert(key, value)
    }
}

impl<K, V, E> PersistentHashMap<K, V, E> {
    /// Creates a new empty map for an explicitly chosen strategy.
    #[inline]
    #[must_use]
    pub const fn with_strategy() -> Self {
        Self {
            root: None,
            length: 0,
            equivalence: PhantomData,
        }
    }

    /// Returns the number of entries in the map.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, provided the
    /// strategy hashes and compares the borrowed form consistently with the
    /// owned one.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        E: Equivalence<Q>,
        Q: ?Sized,
    {
        self.get_key_value(key).map(|(_, value)| value)
    }

    /// Returns the stored key and value for a key.
    #[must_use]
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        E: Equivalence<Q>,
        Q: ?Sized,
    {
        let hash = E::hash(key);
        let mut node = self.root.as_deref()?;
        let mut depth = 0;
        loop {
            match node {
                Node::Branch { bitmap, children } => {
                    let bit = bit_for(hash, depth);
                    if bitmap & bit == 0 {
                        return None;
                    }
                    node = children.get(slot(*bitmap, bit))?.as_ref();
                    depth += 1;
                }
                Node::Bucket {
                    hash: bucket_hash,
                    entries,
                } => {
                    if *bucket_hash != hash {
                        return None;
                    }
                    return entries
                        .iter()
                        .find(|(stored, _)| E::equals(stored.borrow(), key))
                        .map(|(stored, value)| (stored, value));
                }
            }
        }
    }

    /// Returns `true` if the map contains the key.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        E: Equivalence<Q>,
        Q: ?Sized,
    {
        self.get_key_value(key).is_some()
    }

    /// Returns an iterator over the entries.
    ///
    /// The order follows the trie layout: it is unspecified, but identical
    /// for two maps holding the same set of hashes, except among entries whose
    /// full hashes collide. Those keep their insertion order.
    #[must_use]
    pub fn iter(&self) -> PersistentHashMapIterator<'_, K, V> {
        let mut iterator = PersistentHashMapIterator {
            stack: SmallVec::new(),
            bucket: slice::Iter::default(),
            remaining: self.length,
        };
        match self.root.as_deref() {
            Some(Node::Branch { children, .. }) => iterator.stack.push(children.iter()),
            Some(Node::Bucket { entries, .. }) => iterator.bucket = entries.iter(),
            None => {}
        }
        iterator
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over the values.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }

    /// Folds the entries in iteration order.
    pub fn fold<B, F>(&self, init: B, mut function: F) -> B
    where
        F: FnMut(B, &K, &V) -> B,
    {
        self.iter()
            .fold(init, |accumulator, (key, value)| function(accumulator, key, value))
    }
}

impl<K: Clone, V: Clone, E: Equivalence<K>> PersistentHashMap<K, V, E> {
    /// Inserts a key-value pair, returning a new map.
    ///
    /// If an equivalent key exists, both the stored key and its value are
    /// replaced.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentHashMap;
    ///
    /// let map1 = PersistentHashMap::new().insert("key", 1);
    /// let map2 = map1.insert("key", 2);
    ///
    /// assert_eq!(map1.get("key"), Some(&1));
    /// assert_eq!(map2.get("key"), Some(&2));
    /// ```
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        self.insert_with_policy(key, value, true)
    }

    /// Inserts a key-value pair only if no equivalent key is present.
    #[must_use]
    pub fn insert_if_absent(&self, key: K, value: V) -> Self {
        self.insert_with_policy(key, value, false)
    }

    fn insert_with_policy(&self, key: K, value: V, overwrite: bool) -> Self {
        let hash = E::hash(&key);
        let outcome = match self.root.as_deref() {
            None => Insertion::Added(Node::Branch {
                bitmap: bit_for(hash, 0),
                children: vec![Node::bucket(hash, key, value)],
            }),
            Some(Node::Branch { bitmap, children }) => {
                Self::insert_into_branch(*bitmap, children, hash, key, value, 0, overwrite)
            }
            Some(Node::Bucket { .. }) => Insertion::Kept,
        };
        match outcome {
            Insertion::Added(root) => {
                Self::from_parts(Some(ReferenceCounter::new(root)), self.length + 1)
            }
            Insertion::Replaced(root) => {
                Self::from_parts(Some(ReferenceCounter::new(root)), self.length)
            }
            Insertion::Kept => self.clone(),
        }
    }

    const fn from_parts(root: Option<Child<K, V>>, length: usize) -> Self {
        Self {
            root,
            length,
            equivalence: PhantomData,
        }
    }

    fn insert_into_branch(
        bitmap: u32,
        children: &[Child<K, V>],
        hash: u64,
        key: K,
        value: V,
        depth: usize,
        overwrite: bool,
    ) -> Insertion<K, V> {
        let bit = bit_for(hash, depth);
        let index = slot(bitmap, bit);

        if bitmap & bit == 0 {
            let mut expanded = Vec::with_capacity(children.len() + 1);
            expanded.extend_from_slice(&children[..index]);
            expanded.push(Node::bucket(hash, key, value));
            expanded.extend_from_slice(&children[index..]);
            return Insertion::Added(Node::Branch {
                bitmap: bitmap | bit,
                children: expanded,
            });
        }

        let child = &children[index];
        let outcome = match child.as_ref() {
            Node::Branch {
                bitmap: child_bitmap,
                children: grandchildren,
            } => Self::insert_into_branch(
                *child_bitmap,
                grandchildren,
                hash,
                key,
                value,
                depth + 1,
                overwrite,
            ),
            Node::Bucket {
                hash: bucket_hash,
                entries,
            } => Self::insert_into_bucket(
                child,
                *bucket_hash,
                entries,
                hash,
                key,
                value,
                depth + 1,
                overwrite,
            ),
        };
        outcome.map(|updated| Node::Branch {
            bitmap,
            children: with_child_replaced(children, index, ReferenceCounter::new(updated)),
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn insert_into_bucket(
        bucket: &Child<K, V>,
        bucket_hash: u64,
        entries: &[(K, V)],
        hash: u64,
        key: K,
        value: V,
        depth: usize,
        overwrite: bool,
    ) -> Insertion<K, V> {
        if bucket_hash != hash {
            return Insertion::Added(Node::split(
                depth,
                ReferenceCounter::clone(bucket),
                bucket_hash,
                Node::bucket(hash, key, value),
                hash,
            ));
        }

        match entries.iter().position(|(stored, _)| E::equals(stored, &key)) {
            Some(_) if !overwrite => Insertion::Kept,
            Some(position) => {
                let mut updated: SmallVec<[(K, V); 1]> = entries.iter().cloned().collect();
                if let Some(entry) = updated.get_mut(position) {
                    *entry = (key, value);
                }
                Insertion::Replaced(Node::Bucket {
                    hash,
                    entries: updated,
                })
            }
            None => {
                let mut grown: SmallVec<[(K, V); 1]> = entries.iter().cloned().collect();
                grown.push((key, value));
                tracing::trace!(hash, bucket_size = grown.len(), "hash collision bucket grew");
                Insertion::Added(Node::Bucket {
                    hash,
                    entries: grown,
                })
            }
        }
    }

    /// Removes a key, returning a new map.
    ///
    /// Removing an absent key returns a map sharing all nodes with the
    /// original.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert(1, "one").insert(2, "two");
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
        E: Equivalence<Q>,
        Q: ?Sized,
    {
        let Some(root) = self.root.as_ref() else {
            return self.clone();
        };
        match Self::remove_from(root, E::hash(key), key, 0) {
            Some(root) => Self::from_parts(root, self.length - 1),
            None => self.clone(),
        }
    }

    /// Returns `None` when the key is absent, otherwise the replacement for
    /// `node` (`Some(None)` when the subtree became empty).
    fn remove_from<Q>(
        node: &Child<K, V>,
        hash: u64,
        key: &Q,
        depth: usize,
    ) -> Option<Option<Child<K, V>>>
    where
        K: Borrow<Q>,
        E: Equivalence<Q>,
        Q: ?Sized,
    {
        match node.as_ref() {
            Node::Bucket {
                hash: bucket_hash,
                entries,
            } => {
                if *bucket_hash != hash {
                    return None;
                }
                let position = entries
                    .iter()
                    .position(|(stored, _)| E::equals(stored.borrow(), key))?;
                if entries.len() == 1 {
                    return Some(None);
                }
                let remaining: SmallVec<[(K, V); 1]> = entries
                    .iter()
                    .enumerate()
                    .filter(|(index, _)| *index != position)
                    .map(|(_, entry)| entry.clone())
                    .collect();
                Some(Some(ReferenceCounter::new(Node::Bucket {
                    hash,
                    entries: remaining,
                })))
            }
            Node::Branch { bitmap, children } => {
                let bit = bit_for(hash, depth);
                if bitmap & bit == 0 {
                    return None;
                }
                let index = slot(*bitmap, bit);
                let replacement = Self::remove_from(children.get(index)?, hash, key, depth + 1)?;
                let (bitmap, children) = match replacement {
                    Some(child) => (*bitmap, with_child_replaced(children, index, child)),
                    None => {
                        let mut shrunk = children.clone();
                        shrunk.remove(index);
                        (bitmap & !bit, shrunk)
                    }
                };
                Some(Self::compact(bitmap, children, depth))
            }
        }
    }

    /// Drops an empty branch and, below the root, collapses a branch whose
    /// only child is a bucket into that bucket.
    fn compact(bitmap: u32, children: Vec<Child<K, V>>, depth: usize) -> Option<Child<K, V>> {
        if children.is_empty() {
            return None;
        }
        let single_bucket = children.len() == 1
            && children
                .first()
                .is_some_and(|only| matches!(only.as_ref(), Node::Bucket { .. }));
        if depth > 0 && single_bucket {
            return children.into_iter().next();
        }
        Some(ReferenceCounter::new(Node::Branch { bitmap, children }))
    }

    /// Applies a function to the value at `key`, returning the updated map,
    /// or `None` if the key is absent.
    #[must_use]
    pub fn update<Q, F>(&self, key: &Q, function: F) -> Option<Self>
    where
        K: Borrow<Q>,
        E: Equivalence<Q>,
        Q: ?Sized,
        F: FnOnce(&V) -> V,
    {
        let (stored, value) = self.get_key_value(key)?;
        Some(self.insert(stored.clone(), function(value)))
    }

    /// Returns the union of two maps.
    ///
    /// The union is **right-biased**: for keys present in both maps, the entry
    /// from `other` wins.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentHashMap;
    ///
    /// let left = PersistentHashMap::new().insert("a", 1).insert("b", 2);
    /// let right = PersistentHashMap::new().insert("b", 20);
    /// let union = left.union(&right);
    ///
    /// assert_eq!(union.get("b"), Some(&20));
    /// assert_eq!(union.len(), 2);
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
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        self.intersection_with(other, |_, mine, _| mine.clone())
    }

    /// Returns the keys present in both maps, combining their values with
    /// `combiner(key, self_value, other_value)`.
    #[must_use]
    pub fn intersection_with<F>(&self, other: &Self, mut combiner: F) -> Self
    where
        F: FnMut(&K, &V, &V) -> V,
    {
        self.iter()
            .fold(Self::with_strategy(), |accumulator, (key, mine)| {
                match other.get(key) {
                    Some(theirs) => accumulator.insert(key.clone(), combiner(key, mine, theirs)),
                    None => accumulator,
                }
            })
    }

    /// Returns the entries of `self` whose keys are not in `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentHashMap;
    ///
    /// let left: PersistentHashMap<i32, ()> = (1..=4).map(|key| (key, ())).collect();
    /// let right: PersistentHashMap<i32, ()> = (3..=6).map(|key| (key, ())).collect();
    /// let difference = left.difference(&right);
    ///
    /// assert_eq!(difference.len(), 2);
    /// assert!(difference.contains_key(&1) && difference.contains_key(&2));
    /// ```
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        if other.len() < self.len() {
            other
                .keys()
                .fold(self.clone(), |accumulator, key| accumulator.remove(key))
        } else {
            self.iter()
                .filter(|(key, _)| !other.contains_key(*key))
                .fold(Self::with_strategy(), |accumulator, (key, value)| {
                    accumulator.insert(key.clone(), value.clone())
                })
        }
    }

    /// Returns the entries whose keys are in exactly one of the two maps.
    #[must_use]
    pub fn symmetric_difference(&self, other: &Self) -> Self {
        self.difference(other).union(&other.difference(self))
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over key-value pairs of a [`PersistentHashMap`].
///
/// Walks the trie lazily with one slice iterator per level.
pub struct PersistentHashMapIterator<'a, K, V> {
    stack: SmallVec<[slice::Iter<'a, Child<K, V>>; MAX_DEPTH]>,
    bucket: slice::Iter<'a, (K, V)>,
    remaining: usize,
}

impl<'a, K, V> Iterator for PersistentHashMapIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((key, value)) = self.bucket.next() {
                self.remaining -= 1;
                return Some((key, value));
            }
            let level = self.stack.last_mut()?;
            match level.next().map(AsRef::as_ref) {
                None => {
                    self.stack.pop();
                }
                Some(Node::Branch { children, .. }) => self.stack.push(children.iter()),
                Some(Node::Bucket { entries, .. }) => self.bucket = entries.iter(),
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for PersistentHashMapIterator<'_, K, V> {}

/// An owning iterator over key-value pairs of a [`PersistentHashMap`].
pub struct PersistentHashMapIntoIterator<K, V> {
    entries: std::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for PersistentHashMapIntoIterator<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> ExactSizeIterator for PersistentHashMapIntoIterator<K, V> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V, E> Clone for PersistentHashMap<K, V, E> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            length: self.length,
            equivalence: PhantomData,
        }
    }
}

impl<K, V, E> Default for PersistentHashMap<K, V, E> {
    #[inline]
    fn default() -> Self {
        Self::with_strategy()
    }
}

impl<K: Clone, V: Clone, E: Equivalence<K>> FromIterator<(K, V)> for PersistentHashMap<K, V, E> {
    /// Later duplicates overwrite earlier ones.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::with_strategy(), |map, (key, value)| map.insert(key, value))
    }
}

impl<K: Clone, V: Clone, E> IntoIterator for PersistentHashMap<K, V, E> {
    type Item = (K, V);
    type IntoIter = PersistentHashMapIntoIterator<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let entries: Vec<(K, V)> = self
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        PersistentHashMapIntoIterator {
            entries: entries.into_iter(),
        }
    }
}

impl<'a, K, V, E> IntoIterator for &'a PersistentHashMap<K, V, E> {
    type Item = (&'a K, &'a V);
    type IntoIter = PersistentHashMapIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Structural equality: the same length, and every entry of `self` has an
/// equivalent key in `other` mapped to an equal value.
impl<K, V: PartialEq, E: Equivalence<K>> PartialEq for PersistentHashMap<K, V, E> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K, V: Eq, E: Equivalence<K>> Eq for PersistentHashMap<K, V, E> {}

impl<K: fmt::Debug, V: fmt::Debug, E> fmt::Debug for PersistentHashMap<K, V, E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

// =============================================================================
// Type Class Implementations
// =============================================================================

/// `combine` is the right-biased [`union`](PersistentHashMap::union).
impl<K: Clone, V: Clone, E: Equivalence<K>> Semigroup for PersistentHashMap<K, V, E> {
    fn combine(self, other: Self) -> Self {
        self.union(&other)
    }

    fn combine_ref(&self, other: &Self) -> Self {
        self.union(other)
    }
}

impl<K: Clone, V: Clone, E: Equivalence<K>> Monoid for PersistentHashMap<K, V, E> {
    fn empty() -> Self {
        Self::with_strategy()
    }
}

impl<K, V, E> Foldable for PersistentHashMap<K, V, E> {
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
        self.length
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typeclass::CaseInsensitive;
    use rstest::rstest;

    /// Sends every key to one of four hashes so buckets fill up.
    struct Crowded;

    impl Equivalence<u32> for Crowded {
        fn equals(left: &u32, right: &u32) -> bool {
            left == right
        }

        fn hash(value: &u32) -> u64 {
            u64::from(value % 4) << 60
        }
    }

    fn depth_of<K, V>(node: &Node<K, V>) -> usize {
        match node {
            Node::Bucket { .. } => 0,
            Node::Branch { children, .. } => {
                1 + children.iter().map(|child| depth_of(child.as_ref())).max().unwrap_or(0)
            }
        }
    }

    #[rstest]
    #[case(0, 0)]
    #[case(u64::MAX, 31)]
    #[case(0b11111 << 59, 31)]
    #[case(1 << 59, 1)]
    fn test_fragment_reads_most_significant_bits_first(#[case] hash: u64, #[case] expected: u32) {
        assert_eq!(fragment(hash, 0), expected);
    }

    #[rstest]
    fn test_fragment_last_level_uses_remaining_four_bits() {
        assert_eq!(fragment(0b1111, 12), 0b11110);
        assert_eq!(fragment(0b0001, 12), 0b00010);
    }

    #[rstest]
    fn test_new_creates_empty() {
        let map: PersistentHashMap<String, i32> = PersistentHashMap::new();
        assert!(map.is_empty());
        assert_eq!(map.iter().count(), 0);
    }

    #[rstest]
    fn test_insert_get_and_overwrite() {
        let map = PersistentHashMap::new().insert("a", 1).insert("b", 2);
        let overwritten = map.insert("a", 10);

        assert_eq!(map.get("a"), Some(&1));
        assert_eq!(overwritten.get("a"), Some(&10));
        assert_eq!(overwritten.len(), 2);
        assert_eq!(map.get("c"), None);
    }

    #[rstest]
    fn test_many_entries_round_trip() {
        let map: PersistentHashMap<u32, u32> = (0..5000).map(|key| (key, key * 2)).collect();
        assert_eq!(map.len(), 5000);
        assert!((0..5000).all(|key| map.get(&key) == Some(&(key * 2))));
        assert_eq!(map.iter().count(), 5000);
        assert_eq!(map.iter().len(), 5000);
    }

    #[rstest]
    fn test_remove_everything() {
        let mut map: PersistentHashMap<u32, ()> = (0..1000).map(|key| (key, ())).collect();
        for key in 0..1000 {
            map = map.remove(&key);
            assert!(!map.contains_key(&key));
        }
        assert!(map.is_empty());
        assert!(map.root.is_none());
    }

    #[rstest]
    fn test_remove_absent_key_is_noop() {
        let map = PersistentHashMap::new().insert(1, 'a');
        let same = map.remove(&2);
        assert_eq!(same, map);
        assert_eq!(same.len(), 1);
    }

    #[rstest]
    fn test_colliding_keys_share_a_bucket() {
        let map: PersistentHashMap<u32, u32, Crowded> = (0..40).map(|key| (key, key)).collect();
        assert_eq!(map.len(), 40);
        assert!((0..40).all(|key| map.get(&key) == Some(&key)));

        let removed = map.remove(&4).remove(&8);
        assert_eq!(removed.len(), 38);
        assert_eq!(removed.get(&4), None);
        assert_eq!(removed.get(&12), Some(&12));
        assert_eq!(map.get(&4), Some(&4));
    }

    #[rstest]
    fn test_distinct_hashes_with_shared_prefix_split_deeply() {
        // Hashes 0 and 1 share every fragment except the last.
        struct Identity;
        impl Equivalence<u64> for Identity {
            fn equals(left: &u64, right: &u64) -> bool {
                left == right
            }
            fn hash(value: &u64) -> u64 {
                *value
            }
        }

        let map: PersistentHashMap<u64, (), Identity> = [(0, ()), (1, ())].into_iter().collect();
        assert!(map.contains_key(&0) && map.contains_key(&1));
        let root = map.root.as_deref().unwrap();
        assert_eq!(depth_of(root), MAX_DEPTH);

        let collapsed = map.remove(&1);
        assert_eq!(depth_of(collapsed.root.as_deref().unwrap()), 1);
        assert!(collapsed.contains_key(&0));
    }

    #[rstest]
    fn test_case_insensitive_strategy() {
        let map: PersistentHashMap<String, i32, CaseInsensitive> =
            [("Key".to_string(), 1), ("KEY".to_string(), 2)].into_iter().collect();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("key"), Some(&2));
        assert_eq!(map.get_key_value("key").map(|(key, _)| key.as_str()), Some("KEY"));
    }

    #[rstest]
    fn test_insert_if_absent_and_update() {
        let map = PersistentHashMap::new().insert("count", 1);
        assert_eq!(map.insert_if_absent("count", 5).get("count"), Some(&1));
        assert_eq!(map.update("count", |count| count + 1).unwrap().get("count"), Some(&2));
        assert!(map.update("missing", |count| count + 1).is_none());
    }

    #[rstest]
    fn test_set_algebra() {
        let left: PersistentHashMap<i32, char> = [(1, 'a'), (2, 'b'), (3, 'c')].into_iter().collect();
        let right: PersistentHashMap<i32, char> = [(3, 'x'), (4, 'y')].into_iter().collect();

        let union = left.union(&right);
        assert_eq!(union.len(), 4);
        assert_eq!(union.get(&3), Some(&'x'));

        let intersection = left.intersection(&right);
        assert_eq!(intersection.len(), 1);
        assert_eq!(intersection.get(&3), Some(&'c'));

        let merged = left.union_with(&right, |_, mine, _| *mine);
        assert_eq!(merged.get(&3), Some(&'c'));

        assert_eq!(left.difference(&right).len(), 2);
        assert_eq!(right.difference(&left).len(), 1);

        let symmetric = left.symmetric_difference(&right);
        let mut keys: Vec<i32> = symmetric.keys().copied().collect();
        keys.sort_unstable();
        assert_eq!(keys, vec![1, 2, 4]);
    }

    #[rstest]
    fn test_equality_ignores_insertion_order() {
        let forward: PersistentHashMap<u32, u32, Crowded> = (0..30).map(|key| (key, key)).collect();
        let backward: PersistentHashMap<u32, u32, Crowded> = (0..30).rev().map(|key| (key, key)).collect();
        assert_eq!(forward, backward);
        assert_ne!(forward, backward.insert(0, 99));
    }

    #[rstest]
    fn test_colliding_entries_iterate_in_insertion_order() {
        let forward: PersistentHashMap<u32, u32, Crowded> = (0..8).map(|key| (key, key)).collect();
        let backward: PersistentHashMap<u32, u32, Crowded> =
            (0..8).rev().map(|key| (key, key)).collect();
        let residue_zero = |map: &PersistentHashMap<u32, u32, Crowded>| {
            map.keys().copied().filter(|key| key % 4 == 0).collect::<Vec<_>>()
        };
        assert_eq!(residue_zero(&forward), vec![0, 4]);
        assert_eq!(residue_zero(&backward), vec![4, 0]);
        assert_eq!(forward, backward);
    }

    #[rstest]
    fn test_monoid_and_fold() {
        let combined = PersistentHashMap::combine_all(vec![
            PersistentHashMap::new().insert(1, 10),
            PersistentHashMap::new().insert(2, 20),
        ]);
        assert_eq!(combined.fold_left(0, |sum, (_, value)| sum + value), 30);
        assert_eq!(combined.fold(0, |sum, key, _| sum + key), 3);
    }
}
