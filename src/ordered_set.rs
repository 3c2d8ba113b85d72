//! Insertion-ordered hash set.
//!
//! [`OrderedSet`] runs on the same slot-log engine as
//! [`OrderedMap`](crate::OrderedMap), with bare elements as entries. The
//! extractor parameter `X` picks how an element becomes a lookup key:
//! [`Identity`] (the element itself) or [`ByHashKey`](crate::ByHashKey)
//! (the element's [`HashKey::hash_key`](crate::HashKey::hash_key)).

use std::borrow::Borrow;
use std::fmt::{self, Debug};
use std::hash::{BuildHasher, Hash};
use std::iter::{FromIterator, FusedIterator};

use fnv::FnvBuildHasher;

use crate::compaction::CompactionPolicy;
use crate::engine::OrderedCore;
use crate::extract::{Identity, KeyExtractor};
use crate::slot_log::{IntoLive, Scan};
use crate::traits::AnySet;

/// A hash set that iterates in insertion order.
///
/// # Generic parameters
/// | Parameter | Meaning |
/// |-----------|--------|
/// | `T` | Element type |
/// | `X` | Key extractor: [`Identity`] (`T: Hash + Eq`) or [`ByHashKey`](crate::ByHashKey) (`T: HashKey`) |
/// | `S` | Hasher builder for the key index |
///
/// Inserting an element whose key is already present replaces the stored
/// element in place. Removing and re-inserting moves it to the end.
///
/// # Set algebra
/// `union`, `intersection`, `difference` and `symmetric_difference` are lazy
/// and compare by key. Their output order is unspecified; collect into an
/// unordered set when the result needs lookups.
///
/// ```rust
/// use ordered_collections::OrderedSet;
///
/// let mut set = OrderedSet::new();
/// set.insert("b");
/// set.insert("a");
/// set.insert("b");
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), ["b", "a"]);
/// ```
pub struct OrderedSet<T, X = Identity, S = FnvBuildHasher> {
    core: OrderedCore<T, X, S>,
}

impl<T> OrderedSet<T> {
    /// Creates an empty set. No allocation occurs until the first insert.
    ///
    /// Sets with another extractor start from `OrderedSet::default()` or the
    /// builder.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty set with room for `capacity` elements. The hint is
    /// advisory.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, FnvBuildHasher::default())
    }

    /// Starts a [`OrderedSetBuilder`](crate::OrderedSetBuilder).
    pub fn builder() -> crate::OrderedSetBuilder<T> {
        crate::OrderedSetBuilder::new()
    }
}

impl<T, X, S> OrderedSet<T, X, S> {
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            core: OrderedCore::with_capacity_and_hasher(capacity, hash_builder),
        }
    }

    /// Returns the number of elements in the set. O(1).
    #[inline]
    pub fn len(&self) -> usize {
        self.core.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.core.clear();
    }

    pub fn hasher(&self) -> &S {
        self.core.hasher()
    }

    pub fn policy(&self) -> CompactionPolicy {
        self.core.policy()
    }

    pub fn set_policy(&mut self, policy: CompactionPolicy) {
        self.core.set_policy(policy);
    }

    /// Number of removed elements still occupying a slot.
    pub fn tombstones(&self) -> usize {
        self.core.tombstones()
    }

    pub fn compact(&mut self) {
        self.core.compact();
    }

    pub fn shrink_to_fit(&mut self) {
        self.core.shrink_to_fit();
    }

    /// Returns an iterator visiting all elements in insertion order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.core.iter(),
        }
    }

    pub fn first(&self) -> Option<&T> {
        self.core.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.core.last()
    }

    pub fn pop_first(&mut self) -> Option<T> {
        self.core.pop_first()
    }

    pub fn pop_last(&mut self) -> Option<T> {
        self.core.pop_last()
    }

    /// Retains only the elements specified by the predicate, in order.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.core.retain(|elem| f(elem));
    }
}

impl<T, X, S> OrderedSet<T, X, S>
where
    X: KeyExtractor<T>,
    S: BuildHasher,
{
    pub fn reserve(&mut self, additional: usize) {
        self.core.reserve(additional);
    }

    /// Adds a value to the set.
    ///
    /// Returns `true` if the value's key was new. Otherwise the stored element
    /// is replaced by `value` without moving, and `false` is returned.
    pub fn insert(&mut self, value: T) -> bool {
        self.replace(value).is_none()
    }

    /// Adds a value, returning the element it replaced, if any.
    pub fn replace(&mut self, value: T) -> Option<T> {
        self.core.insert_full(value).1
    }

    /// Returns `true` if an element with this key is present.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        X::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.core.find(key).is_some()
    }

    /// Returns `true` if an element with the same key as `value` is present.
    pub fn contains_element(&self, value: &T) -> bool {
        X::with_key(value, |key| self.core.find(key).is_some())
    }

    /// Returns the stored element with this key.
    pub fn get<Q>(&self, key: &Q) -> Option<&T>
    where
        X::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.core.get(key)
    }

    /// Removes the element with this key. Returns `true` if it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        X::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.take(key).is_some()
    }

    /// Removes and returns the element with this key.
    ///
    /// May rebuild the storage inline (see [`CompactionPolicy`]).
    pub fn take<Q>(&mut self, key: &Q) -> Option<T>
    where
        X::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.core.remove(key)
    }

    // --- Set Operations ---

    /// Elements of `self` whose keys are not in `other`.
    pub fn difference<'a, A>(&'a self, other: &'a A) -> impl Iterator<Item = &'a T>
    where
        A: AnySet<T>,
    {
        self.iter().filter(move |v| !other.contains(v))
    }

    /// Elements of `self` whose keys are also in `other`.
    pub fn intersection<'a, A>(&'a self, other: &'a A) -> impl Iterator<Item = &'a T>
    where
        A: AnySet<T>,
    {
        self.iter().filter(move |v| other.contains(v))
    }

    /// Every element of either set, once per key. On shared keys the element
    /// of `self` is yielded.
    pub fn union<'a, S2>(
        &'a self,
        other: &'a OrderedSet<T, X, S2>,
    ) -> impl Iterator<Item = &'a T>
    where
        S2: BuildHasher,
    {
        self.iter()
            .chain(other.iter().filter(move |v| !self.contains_element(v)))
    }

    /// Elements whose keys are in exactly one of the two sets.
    pub fn symmetric_difference<'a, S2>(
        &'a self,
        other: &'a OrderedSet<T, X, S2>,
    ) -> impl Iterator<Item = &'a T>
    where
        S2: BuildHasher,
    {
        self.difference(other).chain(other.difference(self))
    }

    /// Returns `true` if `self` has no keys in common with `other`.
    pub fn is_disjoint<A>(&self, other: &A) -> bool
    where
        A: AnySet<T>,
    {
        self.iter().all(|v| !other.contains(v))
    }

    /// Returns `true` if every key of `self` is in `other`.
    pub fn is_subset_of<A>(&self, other: &A) -> bool
    where
        A: AnySet<T>,
    {
        self.len() <= other.len() && self.iter().all(|v| other.contains(v))
    }

    /// Returns `true` if every element of `other` has its key in `self`.
    pub fn is_superset_of<A>(&self, other: &A) -> bool
    where
        A: AnySet<T>,
        for<'b> &'b A: IntoIterator<Item = &'b T>,
    {
        other.into_iter().all(|v| self.contains_element(v))
    }

    /// Hands the elements to an unordered `hashbrown::HashSet`, dropping the
    /// insertion order.
    pub fn into_unordered(self) -> hashbrown::HashSet<T, S>
    where
        T: Hash + Eq,
        S: Clone,
    {
        let mut set =
            hashbrown::HashSet::with_capacity_and_hasher(self.len(), self.hasher().clone());
        set.extend(self);
        set
    }
}

// --- Traits ---

impl<T, X, S> AnySet<T> for OrderedSet<T, X, S>
where
    X: KeyExtractor<T>,
    S: BuildHasher,
{
    fn contains(&self, value: &T) -> bool {
        self.contains_element(value)
    }

    fn len(&self) -> usize {
        self.len()
    }
}

impl<T, X, S: Default> Default for OrderedSet<T, X, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<T: Clone, X, S: Clone> Clone for OrderedSet<T, X, S> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<T: Debug, X, S> Debug for OrderedSet<T, X, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Equality compares key membership and ignores order.
impl<T, X, S1, S2> PartialEq<OrderedSet<T, X, S2>> for OrderedSet<T, X, S1>
where
    X: KeyExtractor<T>,
    S1: BuildHasher,
    S2: BuildHasher,
{
    fn eq(&self, other: &OrderedSet<T, X, S2>) -> bool {
        self.len() == other.len() && self.is_subset_of(other)
    }
}

impl<T, X, S> Eq for OrderedSet<T, X, S>
where
    X: KeyExtractor<T>,
    S: BuildHasher,
{
}

impl<T, X, S> FromIterator<T> for OrderedSet<T, X, S>
where
    X: KeyExtractor<T>,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut set = Self::with_capacity_and_hasher(iter.size_hint().0, S::default());
        set.extend(iter);
        set
    }
}

impl<T, X, S> Extend<T> for OrderedSet<T, X, S>
where
    X: KeyExtractor<T>,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T, X, S> Extend<&'a T> for OrderedSet<T, X, S>
where
    T: Copy + 'a,
    X: KeyExtractor<T>,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        for &value in iter {
            self.insert(value);
        }
    }
}

impl<T, const N: usize> From<[T; N]> for OrderedSet<T>
where
    T: Hash + Eq,
{
    fn from(values: [T; N]) -> Self {
        let mut set = Self::with_capacity(N);
        set.extend(values);
        set
    }
}

impl<T, X, S> IntoIterator for OrderedSet<T, X, S> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.core.into_entries(),
        }
    }
}

impl<'a, T, X, S> IntoIterator for &'a OrderedSet<T, X, S> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// --- Iterators ---

/// An iterator over references to the elements of an [`OrderedSet`].
pub struct Iter<'a, T> {
    inner: Scan<'a, T>,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, bucket)| &bucket.entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, bucket)| &bucket.entry)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// A consuming iterator for [`OrderedSet`].
pub struct IntoIter<T> {
    inner: IntoLive<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|bucket| bucket.entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|bucket| bucket.entry)
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}
