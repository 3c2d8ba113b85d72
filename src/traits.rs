//! Interoperability traits shared by the ordered containers and the standard
//! collections.

use std::borrow::Borrow;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::hash::{BuildHasher, Hash};

/// A trait for abstraction over keyed maps (ordered or not).
pub trait AnyMap<K, V> {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&mut self, key: K, value: V) -> Option<V>;

    fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;

    fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;

    fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;

    fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;

    fn clear(&mut self);
}

macro_rules! impl_any_map_for_hash_map {
    ($map:ident) => {
        impl<K: Eq + Hash, V, S: BuildHasher> AnyMap<K, V> for $map<K, V, S> {
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
    };
}

impl_any_map_for_hash_map!(HashMap);

mod hb {
    use super::*;
    use hashbrown::HashMap;

    impl_any_map_for_hash_map!(HashMap);
}

/// A trait for any collection that supports efficient membership checks.
///
/// Lets the ordered sets test subset / disjointness against standard library
/// sets (`HashSet`, `BTreeSet`) without converting them first.
pub trait AnySet<T> {
    /// Returns `true` if the collection contains the value.
    fn contains(&self, value: &T) -> bool;

    fn len(&self) -> usize;
}

impl<T: Eq + Hash, S: BuildHasher> AnySet<T> for HashSet<T, S> {
    fn contains(&self, value: &T) -> bool {
        self.contains(value)
    }

    fn len(&self) -> usize {
        self.len()
    }
}

impl<T: Eq + Hash, S: BuildHasher> AnySet<T> for hashbrown::HashSet<T, S> {
    fn contains(&self, value: &T) -> bool {
        self.contains(value)
    }

    fn len(&self) -> usize {
        self.len()
    }
}

impl<T: Ord> AnySet<T> for BTreeSet<T> {
    fn contains(&self, value: &T) -> bool {
        self.contains(value)
    }

    fn len(&self) -> usize {
        self.len()
    }
}
