//! Persistent (immutable) vector based on a 32-way radix trie.
//!
//! This module provides [`PersistentVector`], an immutable indexed sequence
//! that shares unmodified leaves and branches between versions.
//!
//! # Internal Structure
//!
//! The vector consists of:
//! - A trie of full 32-element leaves, 32 children per branch
//! - A tail buffer (1 to 32 elements) holding the last elements
//!
//! `push_back` only copies the tail until it is full; the full tail then
//! moves into the trie as a new leaf without copying its elements. `update`
//! rebuilds the single root-to-leaf path that holds the index.
//!
//! # Examples
//!
//! ```rust
//! use lambars_collections::persistent::PersistentVector;
//!
//! let vector = PersistentVector::new()
//!     .push_back(1)
//!     .push_back(2)
//!     .push_back(3);
//!
//! assert_eq!(vector.get(0), Some(&1));
//! assert_eq!(vector.get(2), Some(&3));
//!
//! let extended = vector.push_back(4);
//! assert_eq!(vector.len(), 3);
//! assert_eq!(extended.len(), 4);
//! ```

use super::ReferenceCounter;
use crate::error::CollectionError;
use crate::typeclass::{Foldable, Monoid, Semigroup};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

// =============================================================================
// Constants
// =============================================================================

/// Branching factor (2^5 = 32)
const BRANCHING_FACTOR: usize = 32;

/// Bits of the index consumed per trie level
const BITS_PER_LEVEL: usize = 5;

const MASK: usize = BRANCHING_FACTOR - 1;

// =============================================================================
// Node Definition
// =============================================================================

type Link<T> = ReferenceCounter<Node<T>>;

/// Branch children are packed to the left; every leaf in the trie is full.
enum Node<T> {
    Branch(Vec<Link<T>>),
    Leaf(ReferenceCounter<[T]>),
}

impl<T> Node<T> {
    fn new_path(level: usize, leaf: Link<T>) -> Link<T> {
        if level == 0 {
            leaf
        } else {
            ReferenceCounter::new(Self::Branch(vec![Self::new_path(
                level - BITS_PER_LEVEL,
                leaf,
            )]))
        }
    }

    /// Appends `leaf` after the last leaf under `node`, copying one path.
    fn push_leaf(node: &Link<T>, level: usize, trie_length: usize, leaf: Link<T>) -> Link<T> {
        match node.as_ref() {
            Self::Branch(children) => {
                let slot = (trie_length >> level) & MASK;
                let mut children = children.clone();
                if level == BITS_PER_LEVEL {
                    children.push(leaf);
                } else if let Some(child) = children.get_mut(slot) {
                    *child = Self::push_leaf(child, level - BITS_PER_LEVEL, trie_length, leaf);
                } else {
                    children.push(Self::new_path(level - BITS_PER_LEVEL, leaf));
                }
                ReferenceCounter::new(Self::Branch(children))
            }
            // A leaf root is always full and is handled by growing the trie.
            Self::Leaf(_) => node.clone(),
        }
    }

    /// Removes the last leaf under `node`, returning what remains and the leaf.
    fn pop_leaf(node: &Link<T>) -> (Option<Link<T>>, ReferenceCounter<[T]>) {
        match node.as_ref() {
            Self::Leaf(elements) => (None, elements.clone()),
            Self::Branch(children) => {
                let mut children = children.clone();
                let Some(last) = children.pop() else {
                    return (None, ReferenceCounter::from(Vec::new()));
                };
                let (rest, leaf) = Self::pop_leaf(&last);
                children.extend(rest);
                let remaining =
                    (!children.is_empty()).then(|| ReferenceCounter::new(Self::Branch(children)));
                (remaining, leaf)
            }
        }
    }
}

impl<T: Clone> Node<T> {
    fn update_path(node: &Link<T>, level: usize, index: usize, element: T) -> Link<T> {
        match node.as_ref() {
            Self::Branch(children) => {
                let mut children = children.clone();
                if let Some(child) = children.get_mut((index >> level) & MASK) {
                    *child = Self::update_path(
                        child,
                        level.saturating_sub(BITS_PER_LEVEL),
                        index,
                        element,
                    );
                }
                ReferenceCounter::new(Self::Branch(children))
            }
            Self::Leaf(elements) => {
                let mut elements = elements.to_vec();
                if let Some(slot) = elements.get_mut(index & MASK) {
                    *slot = element;
                }
                ReferenceCounter::new(Self::Leaf(ReferenceCounter::from(elements)))
            }
        }
    }
}

// =============================================================================
// PersistentVector Definition
// =============================================================================

/// A persistent (immutable) vector based on a 32-way radix trie.
///
/// # Time Complexity
///
/// | Operation   | Complexity                 |
/// |-------------|----------------------------|
/// | `get`       | O(log32 N)                 |
/// | `push_back` | O(log32 N), amortized O(1) |
/// | `pop_back`  | O(log32 N)                 |
/// | `update`    | O(log32 N)                 |
/// | `append`    | O(M) for M = `other.len()` |
/// | `len`       | O(1)                       |
///
/// # Examples
///
/// ```rust
/// use lambars_collections::persistent::PersistentVector;
///
/// let vector: PersistentVector<i32> = (0..100).collect();
/// assert_eq!(vector.len(), 100);
/// assert_eq!(vector.get(50), Some(&50));
/// ```
pub struct PersistentVector<T> {
    length: usize,
    /// Index bits consumed above the leaves: (depth - 1) * `BITS_PER_LEVEL`.
    shift: usize,
    root: Option<Link<T>>,
    tail: ReferenceCounter<[T]>,
}

impl<T> PersistentVector<T> {
    /// Creates a new empty vector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            length: 0,
            shift: 0,
            root: None,
            tail: ReferenceCounter::from(Vec::new()),
        }
    }

    /// Creates a vector containing a single element.
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self {
            length: 1,
            shift: 0,
            root: None,
            tail: ReferenceCounter::from(vec![element]),
        }
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the vector has no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    #[inline]
    fn tail_offset(&self) -> usize {
        self.length - self.tail.len()
    }

    /// Returns the element at `index`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// assert_eq!(vector.get(4), Some(&5));
    /// assert_eq!(vector.get(10), None);
    /// ```
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.length {
            return None;
        }
        self.leaf_for(index)?.get(index & MASK)
    }

    // Leaves and the tail start at multiples of 32, so `index & MASK`
    // addresses within whichever one is returned.
    fn leaf_for(&self, index: usize) -> Option<&[T]> {
        if index >= self.tail_offset() {
            return Some(&*self.tail);
        }
        let mut node = self.root.as_ref()?;
        let mut level = self.shift;
        loop {
            match node.as_ref() {
                Node::Branch(children) => {
                    node = children.get((index >> level) & MASK)?;
                    level = level.checked_sub(BITS_PER_LEVEL)?;
                }
                Node::Leaf(elements) => return Some(&**elements),
            }
        }
    }

    /// Returns the first element, or `None` if empty.
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    /// Returns the last element, or `None` if empty.
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.tail.last()
    }

    /// Returns an iterator over the elements in index order.
    #[must_use]
    pub fn iter(&self) -> PersistentVectorIterator<'_, T> {
        PersistentVectorIterator {
            chunks: self.chunks(),
            current: Default::default(),
            remaining: self.length,
        }
    }

    /// Returns an iterator over the leaf slices, ending with the tail.
    ///
    /// Every chunk but the last holds exactly 32 elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (0..70).collect();
    /// let sizes: Vec<usize> = vector.chunks().map(<[i32]>::len).collect();
    /// assert_eq!(sizes, vec![32, 32, 6]);
    /// ```
    #[must_use]
    pub fn chunks(&self) -> PersistentVectorChunks<'_, T> {
        let mut stack = SmallVec::new();
        stack.push(self.root.as_slice().iter());
        PersistentVectorChunks {
            stack,
            tail: (!self.tail.is_empty()).then_some(&*self.tail),
        }
    }

    /// Returns a new vector with `leaf` appended to the trie and `tail` as the tail.
    fn with_leaf(&self, leaf: ReferenceCounter<[T]>, tail: ReferenceCounter<[T]>) -> Self {
        let (root, shift) = grow(self.root.as_ref(), self.shift, self.tail_offset(), leaf);
        Self {
            length: self.tail_offset() + BRANCHING_FACTOR + tail.len(),
            shift,
            root: Some(root),
            tail,
        }
    }
}

fn grow<T>(
    root: Option<&Link<T>>,
    shift: usize,
    trie_length: usize,
    leaf: ReferenceCounter<[T]>,
) -> (Link<T>, usize) {
    let leaf = ReferenceCounter::new(Node::Leaf(leaf));
    match root {
        None => (leaf, 0),
        Some(root) if trie_length == 1 << (shift + BITS_PER_LEVEL) => {
            let branch = Node::Branch(vec![root.clone(), Node::new_path(shift, leaf)]);
            (ReferenceCounter::new(branch), shift + BITS_PER_LEVEL)
        }
        Some(root) => (Node::push_leaf(root, shift, trie_length, leaf), shift),
    }
}

impl<T: Clone> PersistentVector<T> {
    /// Appends an element to the back.
    ///
    /// Copies at most the 32-element tail; a full tail moves into the trie.
    #[must_use]
    pub fn push_back(&self, element: T) -> Self {
        if self.tail.len() < BRANCHING_FACTOR {
            let mut tail = self.tail.to_vec();
            tail.push(element);
            Self {
                length: self.length + 1,
                shift: self.shift,
                root: self.root.clone(),
                tail: ReferenceCounter::from(tail),
            }
        } else {
            self.with_leaf(self.tail.clone(), ReferenceCounter::from(vec![element]))
        }
    }

    /// Removes the last element, returning the shorter vector and the element.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::Empty`] if the vector is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// let (remaining, element) = vector.pop_back().unwrap();
    /// assert_eq!(element, 5);
    /// assert_eq!(remaining.len(), 4);
    /// assert_eq!(vector.len(), 5);
    /// ```
    pub fn pop_back(&self) -> Result<(Self, T), CollectionError> {
        let element = self
            .tail
            .last()
            .cloned()
            .ok_or(CollectionError::empty("PersistentVector::pop_back"))?;

        if self.tail.len() > 1 {
            let remaining = Self {
                length: self.length - 1,
                shift: self.shift,
                root: self.root.clone(),
                tail: ReferenceCounter::from(&self.tail[..self.tail.len() - 1]),
            };
            return Ok((remaining, element));
        }

        let Some(root) = self.root.as_ref() else {
            return Ok((Self::new(), element));
        };
        let (mut root, tail) = Node::pop_leaf(root);
        let mut shift = self.shift;
        while let Some(Node::Branch(children)) = root.as_deref()
            && children.len() == 1
            && shift > 0
        {
            root = children.first().cloned();
            shift -= BITS_PER_LEVEL;
        }
        if root.is_none() {
            shift = 0;
        }
        let remaining = Self {
            length: self.length - 1,
            shift,
            root,
            tail,
        };
        Ok((remaining, element))
    }

    /// Replaces the element at `index`, rebuilding one root-to-leaf path.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::IndexOutOfBounds`] if `index >= len()`.
    pub fn update(&self, index: usize, element: T) -> Result<Self, CollectionError> {
        if index >= self.length {
            return Err(CollectionError::IndexOutOfBounds {
                operation: "PersistentVector::update",
                index,
                length: self.length,
            });
        }

        if index >= self.tail_offset() {
            let mut tail = self.tail.to_vec();
            if let Some(slot) = tail.get_mut(index & MASK) {
                *slot = element;
            }
            return Ok(Self {
                length: self.length,
                shift: self.shift,
                root: self.root.clone(),
                tail: ReferenceCounter::from(tail),
            });
        }

        let root = self
            .root
            .as_ref()
            .map(|root| Node::update_path(root, self.shift, index, element));
        Ok(Self {
            length: self.length,
            shift: self.shift,
            root,
            tail: self.tail.clone(),
        })
    }

    /// Returns the elements of `self` followed by those of `other`.
    ///
    /// Pushes each element of `other`, so it costs O(`other.len()`).
    #[must_use]
    pub fn append(&self, other: &Self) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        other
            .iter()
            .fold(self.clone(), |vector, element| vector.push_back(element.clone()))
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over the leaf slices of a [`PersistentVector`].
pub struct PersistentVectorChunks<'a, T> {
    stack: SmallVec<[std::slice::Iter<'a, Link<T>>; 8]>,
    tail: Option<&'a [T]>,
}

impl<'a, T> Iterator for PersistentVectorChunks<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(top) = self.stack.last_mut() {
            match top.next().map(|child| &**child) {
                Some(Node::Branch(children)) => self.stack.push(children.iter()),
                Some(Node::Leaf(elements)) => return Some(&**elements),
                None => {
                    self.stack.pop();
                }
            }
        }
        self.tail.take()
    }
}

/// An iterator over references to the elements of a [`PersistentVector`].
pub struct PersistentVectorIterator<'a, T> {
    chunks: PersistentVectorChunks<'a, T>,
    current: std::slice::Iter<'a, T>,
    remaining: usize,
}

impl<'a, T> Iterator for PersistentVectorIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(element) = self.current.next() {
                self.remaining -= 1;
                return Some(element);
            }
            self.current = self.chunks.next()?.iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for PersistentVectorIterator<'_, T> {}

/// An owning iterator over the elements of a [`PersistentVector`].
///
/// Elements are cloned because leaves may be shared with other vectors.
pub struct PersistentVectorIntoIterator<T> {
    vector: PersistentVector<T>,
    index: usize,
}

impl<T: Clone> Iterator for PersistentVectorIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.vector.get(self.index).cloned()?;
        self.index += 1;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.vector.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl<T: Clone> ExactSizeIterator for PersistentVectorIntoIterator<T> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Clone for PersistentVector<T> {
    fn clone(&self) -> Self {
        Self {
            length: self.length,
            shift: self.shift,
            root: self.root.clone(),
            tail: self.tail.clone(),
        }
    }
}

impl<T> Default for PersistentVector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for PersistentVector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut leaves: Vec<Vec<T>> = Vec::new();
        let mut current = Vec::with_capacity(BRANCHING_FACTOR);
        for element in iter {
            current.push(element);
            if current.len() == BRANCHING_FACTOR {
                leaves.push(std::mem::replace(
                    &mut current,
                    Vec::with_capacity(BRANCHING_FACTOR),
                ));
            }
        }
        if current.is_empty()
            && let Some(last) = leaves.pop()
        {
            current = last;
        }

        let tail_length = current.len();
        let (root, shift, trie_length) = leaves.into_iter().fold(
            (None, 0, 0),
            |(root, shift, trie_length): (Option<Link<T>>, usize, usize), leaf| {
                let (root, shift) =
                    grow(root.as_ref(), shift, trie_length, ReferenceCounter::from(leaf));
                (Some(root), shift, trie_length + BRANCHING_FACTOR)
            },
        );
        Self {
            length: trie_length + tail_length,
            shift,
            root,
            tail: ReferenceCounter::from(current),
        }
    }
}

impl<T: Clone> IntoIterator for PersistentVector<T> {
    type Item = T;
    type IntoIter = PersistentVectorIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        PersistentVectorIntoIterator {
            vector: self,
            index: 0,
        }
    }
}

impl<'a, T> IntoIterator for &'a PersistentVector<T> {
    type Item = &'a T;
    type IntoIter = PersistentVectorIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq> PartialEq for PersistentVector<T> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for PersistentVector<T> {}

impl<T: PartialOrd> PartialOrd for PersistentVector<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord> Ord for PersistentVector<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Hash> Hash for PersistentVector<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for element in self {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentVector<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

// =============================================================================
// Type Class Implementations
// =============================================================================

impl<T: Clone> Semigroup for PersistentVector<T> {
    fn combine(self, other: Self) -> Self {
        self.append(&other)
    }

    fn combine_ref(&self, other: &Self) -> Self {
        self.append(other)
    }
}

impl<T: Clone> Monoid for PersistentVector<T> {
    fn empty() -> Self {
        Self::new()
    }
}

impl<T> Foldable for PersistentVector<T> {
    type Item<'a>
        = &'a T
    where
        Self: 'a;

    fn fold_left<'a, B, F>(&'a self, init: B, function: F) -> B
    where
        F: FnMut(B, &'a T) -> B,
    {
        self.iter().fold(init, function)
    }

    #[inline]
    fn length(&self) -> usize {
        self.length
    }
}
