//! Insertion-ordered hash map.
//!
//! Provides [`OrderedMap`]: O(1) average insert / lookup / remove, iteration in
//! insertion order, removal without shifting. Built on the shared slot-log
//! engine with `(K, V)` pairs as entries and the key as lookup key.

use std::borrow::Borrow;
use std::fmt::{self, Debug};
use std::hash::{BuildHasher, Hash};
use std::iter::{FromIterator, FusedIterator};
use std::ops::{Index, IndexMut};

use fnv::FnvBuildHasher;

use crate::compaction::CompactionPolicy;
use crate::engine::OrderedCore;
use crate::extract::PairKey;
use crate::slot_log::{IntoLive, Scan, ScanMut};
use crate::traits::AnyMap;

/// A hash map that iterates in insertion order.
///
/// # Ordering rules
/// | Operation | Effect on order |
/// |-----------|-----------------|
/// | insert of a new key | appended at the end |
/// | insert of an existing key | value replaced, position unchanged |
/// | remove, then insert again | appended at the end as a new entry |
///
/// # Storage
/// Entries live in an append-only slot log. Removal tombstones the slot instead
/// of shifting later entries, and the log is rebuilt once dead slots outnumber
/// live ones (see [`CompactionPolicy`]). `first()` and `last()` skip over at
/// most the tombstones accumulated since the last rebuild.
///
/// # Iteration
/// Iterators borrow the map, so it cannot be mutated while one is alive.
///
/// ```rust
/// use ordered_collections::OrderedMap;
///
/// let mut map = OrderedMap::new();
/// map.insert("a", 1);
/// map.insert("b", 2);
/// map.insert("c", 3);
/// map.remove("b");
/// map.insert("b", 20);
///
/// let keys: Vec<_> = map.keys().copied().collect();
/// assert_eq!(keys, ["a", "c", "b"]);
/// assert_eq!(map.first(), Some((&"a", &1)));
/// assert_eq!(map.last(), Some((&"b", &20)));
/// ```
pub struct OrderedMap<K, V, S = FnvBuildHasher> {
    core: OrderedCore<(K, V), PairKey, S>,
}

impl<K, V> OrderedMap<K, V> {
    /// Creates an empty map. No allocation occurs until the first insert.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty map with room for `capacity` entries. The hint is
    /// advisory.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, FnvBuildHasher::default())
    }

    /// Starts a [`OrderedMapBuilder`](crate::OrderedMapBuilder).
    pub fn builder() -> crate::OrderedMapBuilder<K, V> {
        crate::OrderedMapBuilder::new()
    }
}

impl<K, V, S> OrderedMap<K, V, S> {
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            core: OrderedCore::with_capacity_and_hasher(capacity, hash_builder),
        }
    }

    /// Returns the number of live entries. O(1).
    #[inline]
    pub fn len(&self) -> usize {
        self.core.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry.
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

    /// Number of removed entries still occupying a slot.
    pub fn tombstones(&self) -> usize {
        self.core.tombstones()
    }

    /// Rebuilds the storage without tombstones. Iteration order is unchanged.
    pub fn compact(&mut self) {
        self.core.compact();
    }

    /// Compacts, then releases spare capacity.
    pub fn shrink_to_fit(&mut self) {
        self.core.shrink_to_fit();
    }

    /// Returns an iterator over `(&K, &V)` in insertion order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.core.iter(),
        }
    }

    /// Returns an iterator over `(&K, &mut V)` in insertion order.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.core.iter_mut(),
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// The oldest live entry, or `None` if the map is empty.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.core.first().map(|(k, v)| (k, v))
    }

    /// The newest live entry, or `None` if the map is empty.
    pub fn last(&self) -> Option<(&K, &V)> {
        self.core.last().map(|(k, v)| (k, v))
    }

    /// Removes and returns the oldest entry.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.core.pop_first()
    }

    /// Removes and returns the newest entry.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.core.pop_last()
    }

    /// Retains only the entries for which `f` returns `true`, keeping their
    /// relative order.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.core.retain(|(k, v)| f(k, v));
    }
}

impl<K, V, S> OrderedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn reserve(&mut self, additional: usize) {
        self.core.reserve(additional);
    }

    /// Inserts a key-value pair.
    ///
    /// - New key: appended at the end; returns `None`.
    /// - Existing key: the value is replaced in place and the old one returned.
    ///   The stored key is kept.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.core
            .upsert((key, value), |cur, (_, value)| {
                std::mem::replace(&mut cur.1, value)
            })
            .1
    }

    /// Inserts a key-value pair and reports whether a new entry was created.
    ///
    /// Returns `false` when the key already existed; its value is overwritten
    /// and its position kept.
    pub fn put(&mut self, key: K, value: V) -> bool {
        self.insert(key, value).is_none()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.core.get(key).map(|(_, v)| v)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.core.get(key).map(|(k, v)| (k, v))
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.core.get_mut(key).map(|(_, v)| v)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.core.find(key).is_some()
    }

    /// Removes a key, returning its value if it was present.
    ///
    /// May rebuild the storage inline (see [`CompactionPolicy`]).
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.core.remove(key)
    }

    /// Builds a new map holding `self`'s entries followed by `other`'s new
    /// keys.
    ///
    /// Keys present in both keep `self`'s position and get the value
    /// `conflict(key, current, incoming)`. `conflict` runs at most once per
    /// shared key. Neither input is modified.
    ///
    /// ```rust
    /// use ordered_collections::OrderedMap;
    ///
    /// let a = OrderedMap::from([("a", 1), ("b", 2)]);
    /// let b = OrderedMap::from([("b", 20), ("c", 3)]);
    /// let merged = a.merge(&b, |_, cur, inc| cur + inc);
    ///
    /// let pairs: Vec<_> = merged.into_iter().collect();
    /// assert_eq!(pairs, [("a", 1), ("b", 22), ("c", 3)]);
    /// ```
    pub fn merge<S2, F>(&self, other: &OrderedMap<K, V, S2>, mut conflict: F) -> Self
    where
        K: Clone,
        V: Clone,
        S: Clone,
        F: FnMut(&K, &V, &V) -> V,
    {
        let mut merged =
            Self::with_capacity_and_hasher(self.len() + other.len(), self.hasher().clone());
        merged.set_policy(self.policy());
        merged.extend(self.iter().map(|(k, v)| (k.clone(), v.clone())));

        for (key, incoming) in other.iter() {
            match merged.get_mut(key) {
                Some(current) => {
                    let resolved = conflict(key, current, incoming);
                    *current = resolved;
                }
                None => {
                    merged.insert(key.clone(), incoming.clone());
                }
            }
        }
        merged
    }
}

// --- Index Traits ---

/// # Panics
/// Panics if the key is not present in the map.
impl<K, V, Q, S> Index<&Q> for OrderedMap<K, V, S>
where
    K: Eq + Hash + Borrow<Q>,
    Q: Eq + Hash + ?Sized,
    S: BuildHasher,
{
    type Output = V;

    fn index(&self, key: &Q) -> &Self::Output {
        self.get(key).expect("no entry found for key")
    }
}

/// # Panics
/// Panics if the key is not present in the map.
impl<K, V, Q, S> IndexMut<&Q> for OrderedMap<K, V, S>
where
    K: Eq + Hash + Borrow<Q>,
    Q: Eq + Hash + ?Sized,
    S: BuildHasher,
{
    fn index_mut(&mut self, key: &Q) -> &mut Self::Output {
        self.get_mut(key).expect("no entry found for key")
    }
}

// --- Traits ---

impl<K, V, S> AnyMap<K, V> for OrderedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn len(&self) -> usize {
        self.len()
    }
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.insert(key, value)
    }
    fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key)
    }
    fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_mut(key)
    }
    fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove(key)
    }
    fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.contains_key(key)
    }
    fn clear(&mut self) {
        self.clear();
    }
}

impl<K, V, S: Default> Default for OrderedMap<K, V, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K: Clone, V: Clone, S: Clone> Clone for OrderedMap<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<K: Debug, V: Debug, S> Debug for OrderedMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Equality ignores order, like the standard maps. Compare `iter()`s to
/// include it.
impl<K, V, S1, S2> PartialEq<OrderedMap<K, V, S2>> for OrderedMap<K, V, S1>
where
    K: Eq + Hash,
    V: PartialEq,
    S1: BuildHasher,
    S2: BuildHasher,
{
    fn eq(&self, other: &OrderedMap<K, V, S2>) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|ov| v == ov))
    }
}

impl<K: Eq + Hash, V: Eq, S: BuildHasher> Eq for OrderedMap<K, V, S> {}

impl<K, V, S> FromIterator<(K, V)> for OrderedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let mut map = Self::with_capacity_and_hasher(iter.size_hint().0, S::default());
        map.extend(iter);
        map
    }
}

impl<K, V, S> Extend<(K, V)> for OrderedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K, V, S> Extend<(&'a K, &'a V)> for OrderedMap<K, V, S>
where
    K: Eq + Hash + Copy,
    V: Copy,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: I) {
        for (&k, &v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for OrderedMap<K, V>
where
    K: Eq + Hash,
{
    fn from(entries: [(K, V); N]) -> Self {
        let mut map = Self::with_capacity(N);
        map.extend(entries);
        map
    }
}

impl<K, V, S> IntoIterator for OrderedMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.core.into_entries(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a OrderedMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut OrderedMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

// --- Iterators ---

/// Borrowing iterator over an [`OrderedMap`], in insertion order.
pub struct Iter<'a, K, V> {
    inner: Scan<'a, (K, V)>,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(_, bucket)| (&bucket.entry.0, &bucket.entry.1))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner
            .next_back()
            .map(|(_, bucket)| (&bucket.entry.0, &bucket.entry.1))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

pub struct IterMut<'a, K, V> {
    inner: ScanMut<'a, (K, V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|bucket| {
            let (k, v) = &mut bucket.entry;
            (&*k, v)
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|bucket| {
            let (k, v) = &mut bucket.entry;
            (&*k, v)
        })
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}

pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for ValuesMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}
impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

/// Owning iterator over an [`OrderedMap`], in insertion order.
pub struct IntoIter<K, V> {
    inner: IntoLive<(K, V)>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|bucket| bucket.entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|bucket| bucket.entry)
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}
