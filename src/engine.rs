//! The engine shared by [`OrderedMap`](crate::OrderedMap) and
//! [`OrderedSet`](crate::OrderedSet).
//!
//! # Architecture
//! ```text
//!            key index (hashbrown::HashTable<usize>)
//!            ┌──────────────┐
//!  hash(k) ─►│ slot  slot ..│
//!            └──┬─────┬─────┘
//!               │     │
//!               ▼     ▼
//!  slot log:  [ B0 | B1 | -- | B3 ]   append-only, tombstoned on delete
//! ```
//!
//! The index stores nothing but slot positions; it hashes through the hash
//! cached in each bucket and compares keys through the [`KeyExtractor`].
//!
//! # Invariants
//! After every public operation:
//! 1. Every slot in the index is live and its bucket carries the key that
//!    hashed there.
//! 2. `len == log.live() == index.len()`.
//! 3. Scanning the log forward yields entries in the order they last became
//!    live; an overwrite never moves an entry.
//! 4. New slots are appended at `log.len()`; only a rebuild renumbers them,
//!    densely and in scan order.

use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;

use hashbrown::HashTable;

use crate::compaction::CompactionPolicy;
use crate::extract::KeyExtractor;
use crate::slot_log::{IntoLive, Scan, ScanMut, SlotLog};

pub(crate) struct OrderedCore<E, X, S> {
    log: SlotLog<E>,
    index: HashTable<usize>,
    hash_builder: S,
    policy: CompactionPolicy,
    len: usize,
    marker: PhantomData<fn() -> X>,
}

/// Index hasher: slots hash to the hash cached in their bucket.
#[inline]
fn slot_hash<E>(log: &SlotLog<E>, slot: usize) -> u64 {
    log.get(slot).map_or(0, |bucket| bucket.hash)
}

impl<E, X, S> OrderedCore<E, X, S> {
    /// `capacity` is a best-effort hint: a reservation the allocator refuses
    /// is skipped and the container starts empty.
    pub(crate) fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        let log = SlotLog::with_capacity(capacity);
        let mut index = HashTable::new();
        if index
            .try_reserve(capacity, |&slot| slot_hash(&log, slot))
            .is_err()
        {
            tracing::trace!(capacity, "capacity hint not reserved");
        }
        Self {
            log,
            index,
            hash_builder,
            policy: CompactionPolicy::default(),
            len: 0,
            marker: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Physical log length, tombstones included.
    #[cfg(test)]
    pub(crate) fn log_len(&self) -> usize {
        self.log.len()
    }

    #[inline]
    pub(crate) fn tombstones(&self) -> usize {
        self.log.dead()
    }

    #[inline]
    pub(crate) fn policy(&self) -> CompactionPolicy {
        self.policy
    }

    pub(crate) fn set_policy(&mut self, policy: CompactionPolicy) {
        self.policy = policy;
    }

    #[inline]
    pub(crate) fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Resets the index and size before dropping entries, so a panicking
    /// `Drop` still leaves an empty, consistent container.
    pub(crate) fn clear(&mut self) {
        self.index.clear();
        self.len = 0;
        self.log.clear();
    }

    pub(crate) fn iter(&self) -> Scan<'_, E> {
        self.log.scan()
    }

    pub(crate) fn iter_mut(&mut self) -> ScanMut<'_, E> {
        self.log.scan_mut()
    }

    pub(crate) fn into_entries(self) -> IntoLive<E> {
        self.log.into_live()
    }

    pub(crate) fn first(&self) -> Option<&E> {
        self.log.first_live().map(|(_, bucket)| &bucket.entry)
    }

    pub(crate) fn last(&self) -> Option<&E> {
        self.log.last_live().map(|(_, bucket)| &bucket.entry)
    }

    /// Rebuilds the log without tombstones, if it has any.
    pub(crate) fn compact(&mut self) {
        if self.log.dead() > 0 {
            self.rebuild();
        }
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        self.compact();
        let Self { log, index, .. } = self;
        log.shrink_to_fit();
        index.shrink_to_fit(|&slot| slot_hash(log, slot));
        tracing::trace!(capacity = index.capacity(), "shrunk ordered container");
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        let Self { log, index, .. } = self;
        log.reserve(additional);
        index.reserve(additional, |&slot| slot_hash(log, slot));
    }

    /// Keeps only the entries for which `keep` returns `true`, in order.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&mut E) -> bool) {
        for slot in 0..self.log.len() {
            let retained = match self.log.get_mut(slot) {
                Some(bucket) => keep(&mut bucket.entry),
                None => continue,
            };
            if !retained {
                self.remove_slot(slot);
            }
        }
        self.maybe_compact();
    }

    pub(crate) fn pop_first(&mut self) -> Option<E> {
        let (slot, _) = self.log.first_live()?;
        let entry = self.remove_slot(slot);
        self.maybe_compact();
        entry
    }

    pub(crate) fn pop_last(&mut self) -> Option<E> {
        let (slot, _) = self.log.last_live()?;
        let entry = self.remove_slot(slot);
        self.maybe_compact();
        entry
    }

    /// Unlinks a live slot from the index and tombstones it. Does not consult
    /// the compaction policy.
    fn remove_slot(&mut self, slot: usize) -> Option<E> {
        let hash = self.log.get(slot)?.hash;
        if let Ok(occupied) = self.index.find_entry(hash, |&s| s == slot) {
            occupied.remove();
        }
        let bucket = self.log.mark_deleted(slot)?;
        self.len -= 1;
        Some(bucket.entry)
    }

    fn maybe_compact(&mut self) {
        if self.policy.should_compact(self.log.live(), self.log.dead()) {
            self.rebuild();
        }
        self.debug_check();
    }

    /// Swaps in a dense log and re-points every index slot at its new
    /// position.
    fn rebuild(&mut self) {
        let before = self.log.len();
        let Self { log, index, .. } = self;
        log.compact();
        index.clear();
        for (slot, bucket) in log.scan() {
            index.insert_unique(bucket.hash, slot, |&s| slot_hash(log, s));
        }
        tracing::debug!(before, after = log.len(), "compacted slot log");
    }

    #[inline]
    fn debug_check(&self) {
        debug_assert_eq!(self.len, self.log.live());
        debug_assert_eq!(self.len, self.index.len());
    }
}

impl<E, X, S> OrderedCore<E, X, S>
where
    X: KeyExtractor<E>,
    S: BuildHasher,
{
    #[inline]
    fn hash<Q: ?Sized + Hash>(&self, key: &Q) -> u64 {
        self.hash_builder.hash_one(key)
    }

    /// Whether the live entry at `slot` has hash `hash` and key `key`.
    #[inline]
    fn matches<Q>(log: &SlotLog<E>, slot: usize, hash: u64, key: &Q) -> bool
    where
        X::Key: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        log.get(slot).is_some_and(|bucket| {
            bucket.hash == hash && X::with_key(&bucket.entry, |k| k.borrow() == key)
        })
    }

    /// Looks up the live slot holding `key`.
    pub(crate) fn find<Q>(&self, key: &Q) -> Option<usize>
    where
        X::Key: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash(key);
        self.index
            .find(hash, |&slot| Self::matches(&self.log, slot, hash, key))
            .copied()
    }

    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&E>
    where
        X::Key: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let slot = self.find(key)?;
        self.log.get(slot).map(|bucket| &bucket.entry)
    }

    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut E>
    where
        X::Key: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let slot = self.find(key)?;
        self.log.get_mut(slot).map(|bucket| &mut bucket.entry)
    }

    /// Hashes `entry`'s key and returns the hash and, if present, the live
    /// slot that already holds that key.
    fn probe(&self, entry: &E) -> (u64, Option<usize>) {
        X::with_key(entry, |key| {
            let hash = self.hash(key);
            let found = self
                .index
                .find(hash, |&slot| Self::matches(&self.log, slot, hash, key))
                .copied();
            (hash, found)
        })
    }

    fn append(&mut self, hash: u64, entry: E) -> usize {
        let Self { log, index, .. } = self;
        let slot = log.append(hash, entry);
        index.insert_unique(hash, slot, |&s| slot_hash(log, s));
        self.len += 1;
        slot
    }

    /// Inserts `entry`, replacing the whole entry stored under the same key.
    ///
    /// Returns the entry's slot and the replaced entry, if any. A replaced
    /// entry keeps its position.
    pub(crate) fn insert_full(&mut self, entry: E) -> (usize, Option<E>) {
        match self.probe(&entry) {
            (_, Some(slot)) => (slot, self.log.overwrite(slot, entry)),
            (hash, None) => (self.append(hash, entry), None),
        }
    }

    /// Inserts `entry`, or folds it into the entry already stored under the
    /// same key with `update`. The existing entry keeps its position.
    pub(crate) fn upsert<R>(
        &mut self,
        entry: E,
        update: impl FnOnce(&mut E, E) -> R,
    ) -> (usize, Option<R>) {
        match self.probe(&entry) {
            (_, Some(slot)) => {
                let updated = self
                    .log
                    .get_mut(slot)
                    .map(|bucket| update(&mut bucket.entry, entry));
                (slot, updated)
            }
            (hash, None) => (self.append(hash, entry), None),
        }
    }

    /// Removes the entry stored under `key`, then lets the compaction policy
    /// decide whether to rebuild.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<E>
    where
        X::Key: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash(key);
        let Self { log, index, .. } = self;
        let occupied = index
            .find_entry(hash, |&slot| Self::matches(log, slot, hash, key))
            .ok()?;
        let (slot, _) = occupied.remove();
        let bucket = log.mark_deleted(slot)?;
        self.len -= 1;
        self.maybe_compact();
        Some(bucket.entry)
    }
}

impl<E: Clone, X, S: Clone> Clone for OrderedCore<E, X, S> {
    fn clone(&self) -> Self {
        Self {
            log: self.log.clone(),
            index: self.index.clone(),
            hash_builder: self.hash_builder.clone(),
            policy: self.policy,
            len: self.len,
            marker: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ByHashKey, HashKey, Identity};
    use fnv::FnvBuildHasher;

    type Core<T> = OrderedCore<T, Identity, FnvBuildHasher>;

    fn core<T>() -> Core<T> {
        OrderedCore::with_capacity_and_hasher(0, FnvBuildHasher::default())
    }

    fn assert_consistent<E, X: KeyExtractor<E>>(core: &OrderedCore<E, X, FnvBuildHasher>) {
        assert_eq!(core.len, core.log.live());
        assert_eq!(core.len, core.index.len());
        for &slot in core.index.iter() {
            let bucket = core.log.get(slot).expect("index points at a dead slot");
            let rehash = X::with_key(&bucket.entry, |k| core.hash(k));
            assert_eq!(bucket.hash, rehash);
        }
    }

    fn items<T: Copy>(core: &Core<T>) -> Vec<T> {
        core.iter().map(|(_, b)| b.entry).collect()
    }

    #[test]
    fn test_insert_full_appends_and_overwrites() {
        let mut c = core();
        assert_eq!(c.insert_full(10), (0, None));
        assert_eq!(c.insert_full(20), (1, None));
        assert_eq!(c.insert_full(10), (0, Some(10)));
        assert_eq!(c.len(), 2);
        assert_eq!(items(&c), vec![10, 20]);
        assert_consistent(&c);
    }

    #[test]
    fn test_remove_then_reinsert_goes_last() {
        let mut c = core();
        for i in [1, 2, 3] {
            c.insert_full(i);
        }
        assert_eq!(c.remove(&2), Some(2));
        assert_eq!(c.remove(&2), None);
        c.insert_full(2);
        assert_eq!(items(&c), vec![1, 3, 2]);
        assert_consistent(&c);
    }

    #[test]
    fn test_compaction_triggers_when_dead_exceed_live() {
        let mut c = core();
        for i in 0..8 {
            c.insert_full(i);
        }
        for i in 0..4 {
            c.remove(&i);
        }
        // 4 dead, 4 live: not yet.
        assert_eq!(c.tombstones(), 4);
        assert_eq!(c.log_len(), 8);

        c.remove(&4);
        // 5 dead > 3 live: rebuilt.
        assert_eq!(c.tombstones(), 0);
        assert_eq!(c.log_len(), 3);
        assert_eq!(items(&c), vec![5, 6, 7]);
        assert_eq!(c.find(&5), Some(0));
        assert_eq!(c.find(&7), Some(2));
        assert_consistent(&c);
    }

    #[test]
    fn test_manual_policy_and_explicit_compact() {
        let mut c = core();
        c.set_policy(CompactionPolicy::Manual);
        for i in 0..10 {
            c.insert_full(i);
        }
        for i in 0..9 {
            c.remove(&i);
        }
        assert_eq!(c.log_len(), 10);
        assert_eq!(c.first(), Some(&9));

        c.compact();
        assert_eq!(c.log_len(), 1);
        assert_eq!(c.find(&9), Some(0));
        assert_consistent(&c);
    }

    #[test]
    fn test_retain_and_pops() {
        let mut c = core();
        for i in 0..10 {
            c.insert_full(i);
        }
        c.retain(|v| *v % 3 != 0);
        assert_eq!(items(&c), vec![1, 2, 4, 5, 7, 8]);
        assert_consistent(&c);

        assert_eq!(c.pop_first(), Some(1));
        assert_eq!(c.pop_last(), Some(8));
        assert_eq!(items(&c), vec![2, 4, 5, 7]);
        assert_eq!(c.first(), Some(&2));
        assert_eq!(c.last(), Some(&7));
        assert_consistent(&c);
    }

    #[test]
    fn test_upsert_keeps_position() {
        let mut c: OrderedCore<(&str, i32), crate::extract::PairKey, FnvBuildHasher> =
            OrderedCore::with_capacity_and_hasher(4, FnvBuildHasher::default());
        c.upsert(("a", 1), |_, _| ());
        c.upsert(("b", 2), |_, _| ());
        let (slot, old) = c.upsert(("a", 5), |cur, new| std::mem::replace(&mut cur.1, new.1));
        assert_eq!(slot, 0);
        assert_eq!(old, Some(1));
        assert_eq!(c.get("a"), Some(&("a", 5)));
        assert_consistent(&c);
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Tagged {
        id: u32,
        tag: char,
    }

    impl HashKey for Tagged {
        type Key = u32;
        fn hash_key(&self) -> u32 {
            self.id
        }
    }

    #[test]
    fn test_hash_key_collision_replaces_element() {
        let mut c: OrderedCore<Tagged, ByHashKey, FnvBuildHasher> =
            OrderedCore::with_capacity_and_hasher(0, FnvBuildHasher::default());
        c.insert_full(Tagged { id: 1, tag: 'a' });
        c.insert_full(Tagged { id: 2, tag: 'b' });
        let (slot, old) = c.insert_full(Tagged { id: 1, tag: 'z' });
        assert_eq!(slot, 0);
        assert_eq!(old.map(|t| t.tag), Some('a'));
        assert_eq!(c.get(&1u32).map(|t| t.tag), Some('z'));
        assert_consistent(&c);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut c = core();
        for i in 0..5 {
            c.insert_full(i);
        }
        c.remove(&1);
        let mut d = c.clone();
        d.remove(&3);
        assert_eq!(items(&c), vec![0, 2, 3, 4]);
        assert_eq!(items(&d), vec![0, 2, 4]);
        assert_consistent(&c);
        assert_consistent(&d);
    }

    #[test]
    fn test_oversized_capacity_hint() {
        let mut c: Core<u64> =
            OrderedCore::with_capacity_and_hasher(usize::MAX, FnvBuildHasher::default());
        assert_eq!(c.insert_full(7), (0, None));
        assert_eq!(c.get(&7), Some(&7));
        assert_consistent(&c);
    }

    #[test]
    fn test_clear_and_reuse() {
        let mut c = core();
        for i in 0..5 {
            c.insert_full(i);
        }
        c.clear();
        assert_eq!(c.len(), 0);
        assert!(c.first().is_none());
        assert_eq!(c.insert_full(42), (0, None));
        assert_consistent(&c);
    }
}
