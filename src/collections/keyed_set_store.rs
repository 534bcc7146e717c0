//! `KeyedSetStore` — a map from keys to insertion-ordered sets of values.
//!
//! The store behaves like a map at the key level and like a set at the value level:
//!
//! - `set(k, values)` adds values to `k`'s bucket, creating the bucket on first use.
//! - `delete(Some(k), values)` removes values; when that empties the bucket the key is
//!   dropped and the removal handler is called with it.
//! - `delete(Some(k), [])` and `clear(Some(k))` drop the whole bucket without calling
//!   the handler.
//!
//! A key is never observable with an empty bucket.
//!
//! # Example
//!
//! ```
//! use mapset::KeyedSetStore;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let removed = Rc::new(RefCell::new(Vec::new()));
//! let log = Rc::clone(&removed);
//!
//! let mut sessions: KeyedSetStore<&str, u32> = KeyedSetStore::new();
//! sessions.register_removal_handler(move |user| log.borrow_mut().push(*user));
//!
//! sessions.set("ada", [1, 2]).set("bob", [3]);
//! assert_eq!(sessions.size(None), 2);
//! assert_eq!(sessions.size(Some(&"ada")), 2);
//!
//! sessions.delete(Some(&"ada"), [1, 2]);
//! assert!(!sessions.has(&"ada", None));
//! assert_eq!(*removed.borrow(), vec!["ada"]);
//! ```
//!
//! # Re-entrancy
//!
//! The removal handler runs inline, after the key has been removed. It only receives
//! the key, so it cannot reach the store through the call that invoked it. Reaching
//! the store through shared ownership (for example an `Rc<RefCell<KeyedSetStore>>`
//! captured by the handler) is not supported: the outer mutable borrow is still held
//! and the inner one panics.

use super::hash::{linked_hash_map, LinkedHashMap, LinkedHashSet};
use crate::logging::{debug, trace};
use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::Hash;

/// The set of values held under one key.
pub type Bucket<V> = LinkedHashSet<V>;

/// Handler invoked with a key whose bucket was emptied by value deletion.
pub type RemovalHandler<K> = Box<dyn FnMut(&K)>;

/// A map from keys to sets of values with automatic removal of empty buckets.
pub struct KeyedSetStore<K, V> {
    buckets: LinkedHashMap<K, Bucket<V>>,
    on_remove_key: Option<RemovalHandler<K>>,
}

impl<K, V> KeyedSetStore<K, V> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            buckets: LinkedHashMap::new(),
            on_remove_key: None,
        }
    }

    /// Registers the handler called when value deletion empties a bucket.
    ///
    /// There is a single slot; registering again replaces the previous handler.
    pub fn register_removal_handler<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(&K) + 'static,
    {
        self.on_remove_key = Some(Box::new(handler));
        self
    }

    /// Removes and returns the registered removal handler.
    pub fn take_removal_handler(&mut self) -> Option<RemovalHandler<K>> {
        self.on_remove_key.take()
    }

    /// Returns `true` if a removal handler is registered.
    pub fn has_removal_handler(&self) -> bool {
        self.on_remove_key.is_some()
    }

    /// Number of keys in the store.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `true` if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Iterates `(key, bucket)` pairs in key insertion order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.buckets.iter(),
        }
    }

    /// Iterates keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.buckets.keys()
    }

    /// Iterates buckets in key insertion order.
    pub fn buckets(&self) -> impl Iterator<Item = &Bucket<V>> + '_ {
        self.buckets.values()
    }

    /// Calls `f` with every key and its bucket, in key insertion order.
    pub fn for_each_in_store<'a, F>(&'a self, mut f: F)
    where
        F: FnMut(&'a K, &'a Bucket<V>),
    {
        for (key, bucket) in &self.buckets {
            f(key, bucket);
        }
    }
}

impl<K, V> KeyedSetStore<K, V>
where
    K: Eq + Hash,
    V: Eq + Hash,
{
    /// Creates a store holding `key` with `values`.
    ///
    /// An empty `values` yields an empty store.
    pub fn with_entry<I>(key: K, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
    {
        let mut store = Self::new();
        store.set(key, values);
        store
    }

    /// Returns the bucket stored under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&Bucket<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.buckets.get(key)
    }

    /// Size of `key`'s bucket, or `0` if the key is absent.
    pub fn bucket_len<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.buckets.get(key).map_or(0, LinkedHashSet::len)
    }

    /// With no key, the number of keys; with a key, the size of its bucket (`0` if absent).
    pub fn size(&self, key: Option<&K>) -> usize {
        match key {
            Some(key) => self.bucket_len(key),
            None => self.len(),
        }
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.buckets.contains_key(key)
    }

    /// Returns `true` if `key`'s bucket holds `value`.
    pub fn contains<Q, R>(&self, key: &Q, value: &R) -> bool
    where
        K: Borrow<Q>,
        V: Borrow<R>,
        Q: Hash + Eq + ?Sized,
        R: Hash + Eq + ?Sized,
    {
        self.buckets
            .get(key)
            .is_some_and(|bucket| bucket.contains(value))
    }

    /// With a value, whether `key`'s bucket holds it; without, whether `key` is present.
    pub fn has(&self, key: &K, value: Option<&V>) -> bool {
        match value {
            Some(value) => self.contains(key, value),
            None => self.contains_key(key),
        }
    }

    /// Adds `values` to `key`'s bucket, creating the bucket if needed.
    ///
    /// Values already present are left where they are. With no values this is a no-op,
    /// so no empty bucket is ever created.
    pub fn set<I>(&mut self, key: K, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
    {
        let mut values = values.into_iter().peekable();
        if values.peek().is_none() {
            return self;
        }

        if let Some(bucket) = self.buckets.get_mut(&key) {
            bucket.extend(values);
        } else {
            let bucket: Bucket<V> = values.collect();
            trace!(values = bucket.len(), "bucket created");
            self.buckets.insert(key, bucket);
        }
        self
    }

    /// Removes values from `key`'s bucket, or the whole bucket when `values` is empty.
    ///
    /// - `None` key: no-op.
    /// - Absent key: no-op.
    /// - No values: the key and its bucket are removed; the handler is not called.
    /// - Values: each is removed. If that empties the bucket, the key is removed and the
    ///   handler is called once with it.
    pub fn delete<I>(&mut self, key: Option<&K>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
    {
        let Some(key) = key else {
            return self;
        };

        let mut values = values.into_iter().peekable();
        if values.peek().is_none() {
            if self.buckets.remove(key).is_some() {
                debug!(keys = self.buckets.len(), "key deleted");
            }
            return self;
        }

        let Some(bucket) = self.buckets.get_mut(key) else {
            return self;
        };
        for value in values {
            bucket.remove(&value);
        }
        if bucket.is_empty() {
            self.remove_drained(key);
        }
        self
    }

    /// Removes one value from `key`'s bucket. Returns `true` if it was present.
    ///
    /// Emptying the bucket removes the key and calls the handler, as `delete` does.
    pub fn remove_value<Q, R>(&mut self, key: &Q, value: &R) -> bool
    where
        K: Borrow<Q>,
        V: Borrow<R>,
        Q: Hash + Eq + ?Sized,
        R: Hash + Eq + ?Sized,
    {
        let Some(bucket) = self.buckets.get_mut(key) else {
            return false;
        };
        if !bucket.remove(value) {
            return false;
        }
        if bucket.is_empty() {
            self.remove_drained(key);
        }
        true
    }

    /// Removes every key, or only `key`'s bucket. Never calls the removal handler.
    pub fn clear(&mut self, key: Option<&K>) -> &mut Self {
        match key {
            Some(key) => {
                if self.buckets.remove(key).is_some() {
                    debug!(keys = self.buckets.len(), "key cleared");
                }
            }
            None => {
                debug!(keys = self.buckets.len(), "store cleared");
                self.buckets.clear();
            }
        }
        self
    }

    /// Calls `f` with every value in `key`'s bucket, in value insertion order.
    ///
    /// Does nothing if the key is absent.
    pub fn for_each_in_bucket<'a, Q, F>(&'a self, key: &Q, f: F)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnMut(&'a V),
    {
        if let Some(bucket) = self.buckets.get(key) {
            bucket.iter().for_each(f);
        }
    }

    fn remove_drained<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some((key, _)) = self.buckets.remove_entry(key) else {
            return;
        };
        debug!(
            keys = self.buckets.len(),
            notify = self.on_remove_key.is_some(),
            "bucket drained, key removed"
        );
        if let Some(handler) = self.on_remove_key.as_mut() {
            handler(&key);
        }
    }
}

impl<K, V> Default for KeyedSetStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for KeyedSetStore<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedSetStore")
            .field("buckets", &self.buckets)
            .field("has_removal_handler", &self.on_remove_key.is_some())
            .finish()
    }
}

impl<K, V> Extend<(K, V)> for KeyedSetStore<K, V>
where
    K: Eq + Hash,
    V: Eq + Hash,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, [value]);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for KeyedSetStore<K, V>
where
    K: Eq + Hash,
    V: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = Self::new();
        store.extend(iter);
        store
    }
}

impl<'a, K, V> IntoIterator for &'a KeyedSetStore<K, V> {
    type Item = (&'a K, &'a Bucket<V>);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the `(key, bucket)` pairs of a [`KeyedSetStore`].
pub struct Iter<'a, K, V> {
    inner: linked_hash_map::Iter<'a, K, Bucket<V>, RandomState>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a Bucket<V>);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
