//! Fluent construction of ordered maps and sets.
//!
//! Builders collect a capacity hint, a compaction policy, a hasher and seed
//! items, then insert the seeds in order on [`build`](OrderedMapBuilder::build).
//! Capacity hints are advisory: a hint smaller than the seed is ignored.

use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;

use fnv::FnvBuildHasher;

use crate::compaction::CompactionPolicy;
use crate::extract::{Identity, KeyExtractor};
use crate::ordered_map::OrderedMap;
use crate::ordered_set::OrderedSet;

/// Builder for [`OrderedMap`].
///
/// ```rust
/// use ordered_collections::{CompactionPolicy, OrderedMap};
///
/// let map = OrderedMap::builder()
///     .capacity(16)
///     .policy(CompactionPolicy::Manual)
///     .seed([("a", 1), ("b", 2)])
///     .build();
///
/// assert_eq!(map.len(), 2);
/// assert_eq!(map.policy(), CompactionPolicy::Manual);
/// ```
#[derive(Debug, Clone)]
pub struct OrderedMapBuilder<K, V, S = FnvBuildHasher> {
    capacity: usize,
    policy: CompactionPolicy,
    hash_builder: S,
    seed: Vec<(K, V)>,
}

impl<K, V> OrderedMapBuilder<K, V> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K, V, S: Default> Default for OrderedMapBuilder<K, V, S> {
    fn default() -> Self {
        Self {
            capacity: 0,
            policy: CompactionPolicy::default(),
            hash_builder: S::default(),
            seed: Vec::new(),
        }
    }
}

impl<K, V, S> OrderedMapBuilder<K, V, S> {
    /// Expected number of entries.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn policy(mut self, policy: CompactionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Swaps the hasher, keeping every other setting.
    pub fn hasher<S2>(self, hash_builder: S2) -> OrderedMapBuilder<K, V, S2> {
        OrderedMapBuilder {
            capacity: self.capacity,
            policy: self.policy,
            hash_builder,
            seed: self.seed,
        }
    }

    /// Queues entries to insert, after any queued earlier.
    pub fn seed<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.seed.extend(entries);
        self
    }
}

impl<K, V, S> OrderedMapBuilder<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn build(self) -> OrderedMap<K, V, S> {
        let capacity = self.capacity.max(self.seed.len());
        let mut map = OrderedMap::with_capacity_and_hasher(capacity, self.hash_builder);
        map.set_policy(self.policy);
        map.extend(self.seed);
        map
    }
}

/// Builder for [`OrderedSet`].
///
/// ```rust
/// use ordered_collections::{ByHashKey, HashKey, OrderedSet, OrderedSetBuilder};
///
/// struct Job(u32, &'static str);
///
/// impl HashKey for Job {
///     type Key = u32;
///     fn hash_key(&self) -> u32 {
///         self.0
///     }
/// }
///
/// let jobs: OrderedSet<Job, ByHashKey> = OrderedSetBuilder::default()
///     .seed([Job(1, "build"), Job(2, "test"), Job(1, "rebuild")])
///     .build();
///
/// assert_eq!(jobs.len(), 2);
/// assert_eq!(jobs.first().map(|j| j.1), Some("rebuild"));
/// ```
#[derive(Debug, Clone)]
pub struct OrderedSetBuilder<T, X = Identity, S = FnvBuildHasher> {
    capacity: usize,
    policy: CompactionPolicy,
    hash_builder: S,
    seed: Vec<T>,
    extractor: PhantomData<fn() -> X>,
}

impl<T> OrderedSetBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T, X, S: Default> Default for OrderedSetBuilder<T, X, S> {
    fn default() -> Self {
        Self {
            capacity: 0,
            policy: CompactionPolicy::default(),
            hash_builder: S::default(),
            seed: Vec::new(),
            extractor: PhantomData,
        }
    }
}

impl<T, X, S> OrderedSetBuilder<T, X, S> {
    /// Expected number of elements.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn policy(mut self, policy: CompactionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Swaps the hasher, keeping every other setting.
    pub fn hasher<S2>(self, hash_builder: S2) -> OrderedSetBuilder<T, X, S2> {
        OrderedSetBuilder {
            capacity: self.capacity,
            policy: self.policy,
            hash_builder,
            seed: self.seed,
            extractor: PhantomData,
        }
    }

    /// Queues elements to insert, after any queued earlier.
    pub fn seed<I>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        self.seed.extend(values);
        self
    }
}

impl<T, X, S> OrderedSetBuilder<T, X, S>
where
    X: KeyExtractor<T>,
    S: BuildHasher,
{
    pub fn build(self) -> OrderedSet<T, X, S> {
        let capacity = self.capacity.max(self.seed.len());
        let mut set = OrderedSet::with_capacity_and_hasher(capacity, self.hash_builder);
        set.set_policy(self.policy);
        set.extend(self.seed);
        set
    }
}
