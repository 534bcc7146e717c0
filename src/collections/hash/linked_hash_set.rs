//! `LinkedHashSet` — an insertion-ordered hash set.
//!
//! Implemented as a thin wrapper over `LinkedHashMap<T, ()>`. Inserting an element
//! that is already present neither replaces it nor moves it.

use super::linked_hash_map::{self, LinkedHashMap};
use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::{BuildHasher, Hash};

/// An insertion-ordered set.
#[derive(Clone)]
#[repr(transparent)]
pub struct LinkedHashSet<T, S = RandomState> {
    inner: LinkedHashMap<T, (), S>,
}

impl<T> LinkedHashSet<T, RandomState> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self {
            inner: LinkedHashMap::new(),
        }
    }

    /// Creates an empty set with at least the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: LinkedHashMap::with_capacity(capacity),
        }
    }
}

impl<T, S> LinkedHashSet<T, S> {
    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Iterates elements in insertion order.
    pub fn iter(&self) -> Iter<'_, T, S> {
        self.into_iter()
    }
}

impl<T, S> LinkedHashSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    /// Inserts a value. Returns `true` if it was not already present.
    pub fn insert(&mut self, value: T) -> bool {
        if self.inner.contains_key(&value) {
            return false;
        }
        self.inner.insert(value, ());
        true
    }

    /// Removes a value from the set. Returns `true` if it was present.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.remove(value).is_some()
    }

    /// Returns `true` if the set contains the value.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.contains_key(value)
    }
}

impl<T, S> Default for LinkedHashSet<T, S>
where
    S: Default,
{
    fn default() -> Self {
        Self {
            inner: LinkedHashMap::default(),
        }
    }
}

impl<T, S> PartialEq for LinkedHashSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    /// Set equality; insertion order is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|value| other.contains(value))
    }
}

impl<T, S> Eq for LinkedHashSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
}

impl<T: fmt::Debug, S> fmt::Debug for LinkedHashSet<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, S> Extend<T> for LinkedHashSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T, S> FromIterator<T> for LinkedHashSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<'a, T, S> IntoIterator for &'a LinkedHashSet<T, S> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, S>;

    fn into_iter(self) -> Self::IntoIter {
        Iter {
            inner: self.inner.iter(),
        }
    }
}

/// Insertion-order iterator over a [`LinkedHashSet`].
pub struct Iter<'a, T, S> {
    inner: linked_hash_map::Iter<'a, T, (), S>,
}

impl<'a, T, S> Iterator for Iter<'a, T, S> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(value, _)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, S> ExactSizeIterator for Iter<'_, T, S> {}
