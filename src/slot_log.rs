//! Append-only entry log with a parallel tombstone bit table.
//!
//! Every entry an ordered container ever stored lives at a *slot position* in
//! this log. Deleting an entry moves it out and sets its tombstone bit; the slot
//! itself stays put so that the positions of all later entries are unchanged.
//! Dead slots are only reclaimed by [`SlotLog::compact`], which builds a fresh
//! dense log and swaps it in.
//!
//! # Layout
//! ```text
//! buckets:    [ B0 | B1 | -- | B3 | -- | B5 ]     (-- = moved out, uninit)
//! tombstones: [  0 |  0 |  1 |  0 |  1 |  0 ]
//! ```
//!
//! # Safety
//! `buckets[i]` is initialized **iff** `tombstones[i] == false`. Every method
//! that touches a bucket checks the bit first; nothing else reads the storage.

use core::iter::FusedIterator;
use core::mem::{self, MaybeUninit};
use core::slice;

use bitvec::slice::BitSlice;
use bitvec::vec::BitVec;

/// One stored entry together with the hash of its key.
///
/// The hash is kept so that rebuilding the key index after compaction never
/// calls back into user `Hash` impls.
#[derive(Debug, Clone)]
pub(crate) struct Bucket<E> {
    pub(crate) hash: u64,
    pub(crate) entry: E,
}

pub(crate) struct SlotLog<E> {
    buckets: Vec<MaybeUninit<Bucket<E>>>,
    tombstones: BitVec,
    dead: usize,
}

impl<E> SlotLog<E> {
    /// Creates an empty log, reserving room for `capacity` slots if the
    /// allocator allows it. The hint is never rejected.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let mut log = Self {
            buckets: Vec::new(),
            tombstones: BitVec::new(),
            dead: 0,
        };
        // The bit table is only sized once the buckets fit in memory, which
        // keeps `capacity` within `BitSlice::MAX_BITS`.
        if log.buckets.try_reserve_exact(capacity).is_ok() {
            log.tombstones.reserve(capacity);
        }
        log
    }

    /// Physical length, dead slots included.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Number of tombstoned slots.
    #[inline]
    pub(crate) fn dead(&self) -> usize {
        self.dead
    }

    /// Number of live slots.
    #[inline]
    pub(crate) fn live(&self) -> usize {
        self.buckets.len() - self.dead
    }

    #[inline]
    pub(crate) fn is_live(&self, slot: usize) -> bool {
        slot < self.buckets.len() && !self.tombstones[slot]
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.buckets.reserve(additional);
        self.tombstones.reserve(additional);
    }

    /// Appends a live entry and returns its slot. O(1) amortized.
    pub(crate) fn append(&mut self, hash: u64, entry: E) -> usize {
        let slot = self.buckets.len();
        self.buckets.push(MaybeUninit::new(Bucket { hash, entry }));
        self.tombstones.push(false);
        slot
    }

    pub(crate) fn get(&self, slot: usize) -> Option<&Bucket<E>> {
        if self.is_live(slot) {
            // Safety: live slots are initialized.
            Some(unsafe { self.buckets[slot].assume_init_ref() })
        } else {
            None
        }
    }

    pub(crate) fn get_mut(&mut self, slot: usize) -> Option<&mut Bucket<E>> {
        if self.is_live(slot) {
            // Safety: live slots are initialized.
            Some(unsafe { self.buckets[slot].assume_init_mut() })
        } else {
            None
        }
    }

    /// Replaces the entry at a live slot, returning the old one. The slot keeps
    /// its position.
    pub(crate) fn overwrite(&mut self, slot: usize, entry: E) -> Option<E> {
        self.get_mut(slot)
            .map(|bucket| mem::replace(&mut bucket.entry, entry))
    }

    /// Tombstones a live slot and moves its bucket out. The log does not shrink.
    pub(crate) fn mark_deleted(&mut self, slot: usize) -> Option<Bucket<E>> {
        if !self.is_live(slot) {
            return None;
        }
        self.tombstones.set(slot, true);
        self.dead += 1;
        // Safety: the slot was live, and flipping its bit above means it will
        // never be read again.
        Some(unsafe { self.buckets[slot].assume_init_read() })
    }

    /// Empties the log, then drops every entry it held.
    ///
    /// The storage is detached before any entry is dropped, so a panicking
    /// `Drop` leaves `self` empty and every entry dropped at most once.
    pub(crate) fn clear(&mut self) {
        let detached = mem::replace(self, Self::with_capacity(0));
        drop(detached.into_live());
    }

    /// Rebuilds the log densely, keeping live entries in their relative order.
    ///
    /// Builds a new buffer and swaps it in; afterwards slot `i` holds the
    /// `i`-th live entry of the old log.
    pub(crate) fn compact(&mut self) {
        let live = self.live();
        let mut fresh: Vec<MaybeUninit<Bucket<E>>> = Vec::with_capacity(live);
        for (slot, bucket) in self.buckets.iter().enumerate() {
            if !self.tombstones[slot] {
                // Safety: live slot; the old buffer is discarded below without
                // dropping its contents, so each bucket is moved exactly once.
                fresh.push(MaybeUninit::new(unsafe { bucket.assume_init_read() }));
            }
        }
        // `Vec<MaybeUninit<_>>` never drops its elements.
        self.buckets = fresh;
        self.tombstones = BitVec::repeat(false, live);
        self.dead = 0;
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        self.buckets.shrink_to_fit();
        self.tombstones.shrink_to_fit();
    }

    /// Live buckets in slot order. Double-ended: reverse scanning starts from
    /// the end of the log.
    pub(crate) fn scan(&self) -> Scan<'_, E> {
        Scan {
            buckets: &self.buckets,
            tombstones: &self.tombstones,
            front: 0,
            back: self.buckets.len(),
            remaining: self.live(),
        }
    }

    pub(crate) fn scan_mut(&mut self) -> ScanMut<'_, E> {
        let remaining = self.live();
        let back = self.buckets.len();
        ScanMut {
            buckets: self.buckets.iter_mut(),
            tombstones: &self.tombstones,
            front: 0,
            back,
            remaining,
        }
    }

    pub(crate) fn first_live(&self) -> Option<(usize, &Bucket<E>)> {
        self.scan().next()
    }

    pub(crate) fn last_live(&self) -> Option<(usize, &Bucket<E>)> {
        self.scan().next_back()
    }

    /// Consumes the log, yielding live entries in slot order.
    pub(crate) fn into_live(mut self) -> IntoLive<E> {
        let buckets = mem::take(&mut self.buckets);
        let tombstones = mem::take(&mut self.tombstones);
        let remaining = buckets.len() - self.dead;
        self.dead = 0;
        IntoLive {
            back: buckets.len(),
            buckets: buckets.into_iter(),
            tombstones,
            front: 0,
            remaining,
        }
    }

}

impl<E> Drop for SlotLog<E> {
    fn drop(&mut self) {
        for (slot, bucket) in self.buckets.iter_mut().enumerate() {
            if !self.tombstones[slot] {
                // Safety: live slot, and the log is never touched again.
                unsafe { bucket.assume_init_drop() };
            }
        }
    }
}

// Clones slot-for-slot so that the key index can be cloned as-is.
impl<E: Clone> Clone for SlotLog<E> {
    fn clone(&self) -> Self {
        let mut buckets = Vec::with_capacity(self.buckets.len());
        for (slot, bucket) in self.buckets.iter().enumerate() {
            if self.tombstones[slot] {
                buckets.push(MaybeUninit::uninit());
            } else {
                // Safety: live slot.
                buckets.push(MaybeUninit::new(unsafe { bucket.assume_init_ref() }.clone()));
            }
        }
        Self {
            buckets,
            tombstones: self.tombstones.clone(),
            dead: self.dead,
        }
    }
}

// --- Iterators ---

pub(crate) struct Scan<'a, E> {
    buckets: &'a [MaybeUninit<Bucket<E>>],
    tombstones: &'a BitSlice,
    front: usize,
    back: usize,
    remaining: usize,
}

impl<E> Clone for Scan<'_, E> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<'a, E> Iterator for Scan<'a, E> {
    type Item = (usize, &'a Bucket<E>);

    fn next(&mut self) -> Option<Self::Item> {
        while self.front < self.back {
            let slot = self.front;
            self.front += 1;
            if !self.tombstones[slot] {
                self.remaining -= 1;
                // Safety: live slot.
                return Some((slot, unsafe { self.buckets[slot].assume_init_ref() }));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<E> DoubleEndedIterator for Scan<'_, E> {
    fn next_back(&mut self) -> Option<Self::Item> {
        while self.front < self.back {
            self.back -= 1;
            let slot = self.back;
            if !self.tombstones[slot] {
                self.remaining -= 1;
                // Safety: live slot.
                return Some((slot, unsafe { self.buckets[slot].assume_init_ref() }));
            }
        }
        None
    }
}

impl<E> ExactSizeIterator for Scan<'_, E> {}
impl<E> FusedIterator for Scan<'_, E> {}

pub(crate) struct ScanMut<'a, E> {
    buckets: slice::IterMut<'a, MaybeUninit<Bucket<E>>>,
    tombstones: &'a BitSlice,
    front: usize,
    back: usize,
    remaining: usize,
}

impl<'a, E> Iterator for ScanMut<'a, E> {
    type Item = &'a mut Bucket<E>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(bucket) = self.buckets.next() {
            let slot = self.front;
            self.front += 1;
            if !self.tombstones[slot] {
                self.remaining -= 1;
                // Safety: live slot.
                return Some(unsafe { bucket.assume_init_mut() });
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<E> DoubleEndedIterator for ScanMut<'_, E> {
    fn next_back(&mut self) -> Option<Self::Item> {
        while let Some(bucket) = self.buckets.next_back() {
            self.back -= 1;
            if !self.tombstones[self.back] {
                self.remaining -= 1;
                // Safety: live slot.
                return Some(unsafe { bucket.assume_init_mut() });
            }
        }
        None
    }
}

impl<E> ExactSizeIterator for ScanMut<'_, E> {}
impl<E> FusedIterator for ScanMut<'_, E> {}

pub(crate) struct IntoLive<E> {
    buckets: std::vec::IntoIter<MaybeUninit<Bucket<E>>>,
    tombstones: BitVec,
    front: usize,
    back: usize,
    remaining: usize,
}

impl<E> Iterator for IntoLive<E> {
    type Item = Bucket<E>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(bucket) = self.buckets.next() {
            let slot = self.front;
            self.front += 1;
            if !self.tombstones[slot] {
                self.remaining -= 1;
                // Safety: live slot, moved out exactly once.
                return Some(unsafe { bucket.assume_init() });
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<E> DoubleEndedIterator for IntoLive<E> {
    fn next_back(&mut self) -> Option<Self::Item> {
        while let Some(bucket) = self.buckets.next_back() {
            self.back -= 1;
            if !self.tombstones[self.back] {
                self.remaining -= 1;
                // Safety: live slot, moved out exactly once.
                return Some(unsafe { bucket.assume_init() });
            }
        }
        None
    }
}

impl<E> ExactSizeIterator for IntoLive<E> {}
impl<E> FusedIterator for IntoLive<E> {}

impl<E> Drop for IntoLive<E> {
    fn drop(&mut self) {
        for _ in self.by_ref() {}
    }
}
