//! Key extraction: how a stored element is turned into the key the index hashes.
//!
//! An ordered container never hashes an element directly. It asks its
//! [`KeyExtractor`] for the element's key and hashes that. Two extractors ship
//! with the crate:
//!
//! * [`Identity`]: the element *is* its own key (`T: Hash + Eq`).
//! * [`ByHashKey`]: the element exposes a [`HashKey::hash_key`] method that
//!   produces a small, hashable key.
//!
//! Both are zero-sized marker types selected through a generic parameter, so a
//! lookup is fully monomorphized and never allocates.

use std::hash::Hash;

/// Derives the lookup key of a stored element.
///
/// The key is handed to a closure instead of being returned, because
/// [`Identity`] lends a reference into the element while [`ByHashKey`]
/// produces an owned temporary.
pub trait KeyExtractor<T> {
    /// The key type lookups are performed with.
    type Key: ?Sized + Hash + Eq;

    /// Calls `f` with the key of `elem`.
    fn with_key<R>(elem: &T, f: impl FnOnce(&Self::Key) -> R) -> R;
}

/// Elements that produce their own primitive lookup key.
///
/// # Collisions
/// Two elements returning equal keys are treated as **the same element** by
/// every container using [`ByHashKey`]: adding the second one replaces the
/// first in place.
///
/// ```rust
/// use ordered_collections::{ByHashKey, HashKey, OrderedSet};
///
/// #[derive(Debug)]
/// struct User {
///     id: u64,
///     name: &'static str,
/// }
///
/// impl HashKey for User {
///     type Key = u64;
///     fn hash_key(&self) -> u64 {
///         self.id
///     }
/// }
///
/// let mut users: OrderedSet<User, ByHashKey> = OrderedSet::default();
/// assert!(users.insert(User { id: 7, name: "ada" }));
/// assert!(!users.insert(User { id: 7, name: "grace" }));
/// assert_eq!(users.get(&7u64).map(|u| u.name), Some("grace"));
/// ```
pub trait HashKey {
    type Key: Hash + Eq;

    fn hash_key(&self) -> Self::Key;
}

/// The element is used as its own key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Identity;

/// The key is whatever [`HashKey::hash_key`] returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ByHashKey;

/// Map entries: the key is the first half of the pair.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PairKey;

impl<T: Hash + Eq> KeyExtractor<T> for Identity {
    type Key = T;

    #[inline]
    fn with_key<R>(elem: &T, f: impl FnOnce(&Self::Key) -> R) -> R {
        f(elem)
    }
}

impl<T: HashKey> KeyExtractor<T> for ByHashKey {
    type Key = T::Key;

    #[inline]
    fn with_key<R>(elem: &T, f: impl FnOnce(&Self::Key) -> R) -> R {
        f(&elem.hash_key())
    }
}

impl<K: Hash + Eq, V> KeyExtractor<(K, V)> for PairKey {
    type Key = K;

    #[inline]
    fn with_key<R>(elem: &(K, V), f: impl FnOnce(&Self::Key) -> R) -> R {
        f(&elem.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Point {
        x: i32,
        y: i32,
    }

    impl HashKey for Point {
        type Key = (i32, i32);
        fn hash_key(&self) -> (i32, i32) {
            (self.x, self.y)
        }
    }

    #[test]
    fn test_identity_lends_the_element() {
        let s = String::from("abc");
        let len = <Identity as KeyExtractor<String>>::with_key(&s, |k| k.len());
        assert_eq!(len, 3);
    }

    #[test]
    fn test_by_hash_key_uses_hash_key() {
        let p = Point { x: 1, y: 2 };
        let key = <ByHashKey as KeyExtractor<Point>>::with_key(&p, |k| *k);
        assert_eq!(key, (1, 2));
    }

    #[test]
    fn test_pair_key_takes_first() {
        let pair = ("k", 10);
        let same = <PairKey as KeyExtractor<(&str, i32)>>::with_key(&pair, |k| *k == "k");
        assert!(same);
    }
}
