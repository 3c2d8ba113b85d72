//! # Ordered Collections
//!
//! Hash maps and hash sets that remember insertion order.
//!
//! This crate provides [`OrderedMap`] and [`OrderedSet`]. Both give O(1)
//! average insert, lookup and removal, and iterate in the order keys were
//! inserted, without a balanced tree or a linked list.
//!
//! ## Key Features
//!
//! * **Append-only log:** Entries are appended to a slot log; removal sets a
//!   tombstone bit instead of shifting later entries.
//! * **Hash index:** A `hashbrown::HashTable` maps each key to its slot. Hashes
//!   are cached per entry, so rebuilding the index never re-hashes keys.
//! * **Deferred compaction:** Once dead slots outnumber live ones, the log is
//!   rebuilt densely in one pass. Rebuild work is O(1) amortized per removal.
//!   See [`CompactionPolicy`].
//! * **Pluggable keys:** Sets either use the element as its key ([`Identity`])
//!   or ask the element for one ([`ByHashKey`] + [`HashKey`]).
//!
//! ## Ordering Rules
//!
//! * Updating an existing key keeps its position.
//! * Removing a key and inserting it again moves it to the end.
//! * `first()` / `last()` return the oldest / newest live entry.
//!
//! Iterators borrow the container, so mutation during iteration is rejected by
//! the borrow checker.
//!
//! ## Examples
//!
//! ### OrderedMap
//!
//! ```rust
//! use ordered_collections::OrderedMap;
//!
//! let mut map = OrderedMap::new();
//! map.insert("A", 1);
//! map.insert("B", 2);
//! map.insert("C", 3);
//!
//! map.remove("B");
//! map.insert("B", 20);
//!
//! let order: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
//! assert_eq!(order, [("A", 1), ("C", 3), ("B", 20)]);
//! ```
//!
//! ### Merging
//!
//! ```rust
//! use ordered_collections::OrderedMap;
//!
//! let left = OrderedMap::from([("a", 1), ("b", 2)]);
//! let right = OrderedMap::from([("b", 20), ("c", 3)]);
//!
//! let merged = left.merge(&right, |_key, current, incoming| current + incoming);
//! assert_eq!(merged.get("b"), Some(&22));
//! assert_eq!(merged.keys().copied().collect::<Vec<_>>(), ["a", "b", "c"]);
//! ```
//!
//! ### OrderedSet
//!
//! ```rust
//! use ordered_collections::OrderedSet;
//!
//! let mut set = OrderedSet::new();
//! set.insert(3);
//! set.insert(1);
//! set.insert(2);
//! set.remove(&3);
//!
//! assert_eq!(set.first(), Some(&1));
//! assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 2]);
//! ```

// --- Module Declarations ---

pub mod builder;
pub mod compaction;
mod engine;
pub mod extract;
pub mod ordered_map;
pub mod ordered_set;
mod slot_log;
pub mod traits;

// --- Re-exports ---

pub use builder::{OrderedMapBuilder, OrderedSetBuilder};
pub use compaction::CompactionPolicy;
pub use extract::{ByHashKey, HashKey, Identity, KeyExtractor};
pub use ordered_map::OrderedMap;
pub use ordered_set::OrderedSet;
pub use traits::{AnyMap, AnySet};
