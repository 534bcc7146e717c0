//! `LinkedHashMap` — an insertion-ordered hash map.
//!
//! This implementation combines a **SwissTable-inspired** hash table for lookups with
//! a **doubly-linked list** embedded in SoA (Structure of Arrays) layout.
//!
//! Features:
//! - **Order Preservation**: Iteration order matches insertion order. Replacing the
//!   value of an existing key keeps its position.
//! - **Order-stable Removal**: Removing an entry unlinks it; the remaining entries keep
//!   their relative order (unlike `swap_remove` based maps).
//! - **Stable Indices**: Uses a free list for storage, so removed slots are reused.
//! - **SoA Layout**: Separate arrays for keys, values, prev, next.

use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

// Control byte constants
const EMPTY: u8 = 0xFF;
const DELETED: u8 = 0xFE;
const GROUP_WIDTH: usize = 8;
const END_OF_LIST: usize = usize::MAX;

/// Returns a mask where each byte is 0x80 if the corresponding byte in `x` is zero, else 0x00.
#[inline(always)]
fn has_zero_byte(x: u64) -> u64 {
    (x.wrapping_sub(0x0101_0101_0101_0101)) & (!x) & 0x8080_8080_8080_8080
}

/// Returns a mask where each byte is 0x80 if the corresponding byte in `x` matches `y`, else 0x00.
#[inline(always)]
fn match_byte(x: u64, y: u8) -> u64 {
    let pattern = u64::from(y) * 0x0101_0101_0101_0101;
    has_zero_byte(x ^ pattern)
}

/// Loads the group of control bytes starting at `idx` (little-endian, so byte `i`
/// of the group lands in bits `8i..8i+8`).
#[inline(always)]
fn load_group(ctrl: &[u8], idx: usize) -> u64 {
    let mut word = [0u8; GROUP_WIDTH];
    word.copy_from_slice(&ctrl[idx..idx + GROUP_WIDTH]);
    u64::from_le_bytes(word)
}

fn vacant_slots<T>(len: usize) -> Box<[Option<T>]> {
    std::iter::repeat_with(|| None).take(len).collect()
}

/// An insertion-ordered hash map.
///
/// ```
/// use mapset::collections::LinkedHashMap;
///
/// let mut map = LinkedHashMap::new();
/// map.insert("b", 2);
/// map.insert("a", 1);
/// map.insert("b", 20);
///
/// let entries: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
/// assert_eq!(entries, vec![("b", 20), ("a", 1)]);
/// ```
#[derive(Clone)]
pub struct LinkedHashMap<K, V, S = RandomState> {
    ctrl: Box<[u8]>,
    slots: Box<[usize]>, // Hash table: maps hash slot -> storage index

    // Storage arrays (SoA)
    keys: Box<[Option<K>]>,
    values: Box<[Option<V>]>,
    prev: Box<[usize]>,
    next: Box<[usize]>,

    head: usize,
    tail: usize,
    free_head: usize, // Head of the free list (using `next` array)

    capacity: usize,
    items_count: usize, // occupied + deleted in hash table
    len: usize,         // actual elements

    hash_builder: S,
}

impl<K, V, S> LinkedHashMap<K, V, S> {
    /// Creates an empty map with at least the specified capacity, using `hash_builder`.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        let capacity = if capacity == 0 {
            0
        } else {
            (capacity * 8 / 7).next_power_of_two().max(8)
        };

        let mut map = Self {
            ctrl: Box::new([]),
            slots: Box::new([]),
            keys: Box::new([]),
            values: Box::new([]),
            prev: Box::new([]),
            next: Box::new([]),
            head: END_OF_LIST,
            tail: END_OF_LIST,
            free_head: END_OF_LIST,
            capacity: 0,
            items_count: 0,
            len: 0,
            hash_builder,
        };
        if capacity > 0 {
            map.reset_storage(capacity);
        }
        map
    }

    /// Replaces every table and storage array with fresh ones of `capacity` slots.
    fn reset_storage(&mut self, capacity: usize) {
        self.ctrl = vec![EMPTY; capacity + GROUP_WIDTH].into_boxed_slice();
        self.slots = vec![0; capacity].into_boxed_slice(); // 0 is valid index, but we check ctrl
        self.keys = vacant_slots(capacity);
        self.values = vacant_slots(capacity);
        self.prev = vec![END_OF_LIST; capacity].into_boxed_slice();
        self.next = (1..=capacity)
            .map(|i| if i == capacity { END_OF_LIST } else { i })
            .collect();

        self.free_head = if capacity == 0 { END_OF_LIST } else { 0 };
        self.head = END_OF_LIST;
        self.tail = END_OF_LIST;
        self.items_count = 0;
        self.len = 0;
        self.capacity = capacity;
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the map holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every entry. Keeps the allocated capacity.
    pub fn clear(&mut self) {
        let capacity = self.capacity;
        self.reset_storage(capacity);
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> Iter<'_, K, V, S> {
        Iter {
            map: self,
            curr: self.head,
            remaining: self.len,
        }
    }

    /// Iterates keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    /// Iterates values in key insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    fn link_to_tail(&mut self, idx: usize) {
        if self.tail == END_OF_LIST {
            self.head = idx;
            self.tail = idx;
            self.prev[idx] = END_OF_LIST;
            self.next[idx] = END_OF_LIST;
        } else {
            self.next[self.tail] = idx;
            self.prev[idx] = self.tail;
            self.next[idx] = END_OF_LIST;
            self.tail = idx;
        }
    }

    fn unlink(&mut self, idx: usize) {
        let prev = self.prev[idx];
        let next = self.next[idx];

        if prev == END_OF_LIST {
            self.head = next;
        } else {
            self.next[prev] = next;
        }

        if next == END_OF_LIST {
            self.tail = prev;
        } else {
            self.prev[next] = prev;
        }
    }

    fn set_ctrl(&mut self, slot_idx: usize, byte: u8) {
        self.ctrl[slot_idx] = byte;
        if slot_idx < GROUP_WIDTH {
            self.ctrl[self.capacity + slot_idx] = byte;
        }
    }
}

impl<K, V> LinkedHashMap<K, V, RandomState> {
    /// Creates an empty map. Does not allocate until the first insert.
    pub fn new() -> Self {
        Self::with_capacity_and_hasher(0, RandomState::new())
    }

    /// Creates an empty map with at least the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }
}

impl<K, V, S> LinkedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    #[inline]
    fn hash<Q>(&self, key: &Q) -> (usize, u8)
    where
        Q: Hash + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        #[allow(clippy::cast_possible_truncation)]
        let h1 = (hash as usize) & (self.capacity - 1);
        #[allow(clippy::cast_possible_truncation)]
        let h2 = (hash >> 57) as u8;
        (h1, h2 & 0x7F)
    }

    /// Probes for `key`. Returns the matching slot, or the slot an insert should use.
    fn find_slot<Q>(&self, key: &Q, h1: usize, h2: u8) -> (usize, bool)
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        if self.capacity == 0 {
            return (0, false);
        }

        let mut idx = h1;
        let mut step = GROUP_WIDTH;
        let mask = self.capacity - 1;
        let mut first_deleted = None;
        let mut probes = 0;

        loop {
            let group_word = load_group(&self.ctrl, idx);

            let mut m = match_byte(group_word, h2);
            while m != 0 {
                let trailing = m.trailing_zeros() / 8;
                let slot_idx = (idx + trailing as usize) & mask;
                let storage_idx = self.slots[slot_idx];
                if let Some(k) = &self.keys[storage_idx] {
                    if k.borrow() == key {
                        return (slot_idx, true);
                    }
                }
                m &= m - 1;
            }

            let empty_mask = match_byte(group_word, EMPTY);
            if empty_mask != 0 {
                let trailing = empty_mask.trailing_zeros() / 8;
                let empty_idx = (idx + trailing as usize) & mask;
                return (first_deleted.unwrap_or(empty_idx), false);
            }

            if first_deleted.is_none() {
                let deleted_mask = match_byte(group_word, DELETED);
                if deleted_mask != 0 {
                    let trailing = deleted_mask.trailing_zeros() / 8;
                    first_deleted = Some((idx + trailing as usize) & mask);
                }
            }

            idx = (idx + step) & mask;
            step += GROUP_WIDTH;
            probes += 1;

            if probes > self.capacity {
                return (first_deleted.unwrap_or(0), false);
            }
        }
    }

    fn storage_index<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if self.len == 0 {
            return None;
        }
        let (h1, h2) = self.hash(key);
        match self.find_slot(key, h1, h2) {
            (slot_idx, true) => Some(self.slots[slot_idx]),
            _ => None,
        }
    }

    /// Inserts `value` under `key`, returning the previous value if the key was present.
    ///
    /// An existing key keeps both its stored key and its position in the order.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if self.capacity == 0
            || self.items_count >= self.capacity * 7 / 8
            || self.len == self.capacity
        {
            // Tombstone-heavy tables are rebuilt in place rather than doubled.
            let new_cap = if self.len < self.capacity / 2 {
                self.capacity
            } else {
                (self.capacity * 2).max(8)
            };
            self.grow(new_cap);
        }

        let (h1, h2) = self.hash(&key);
        let (slot_idx, found) = self.find_slot(&key, h1, h2);

        if found {
            let storage_idx = self.slots[slot_idx];
            return self.values[storage_idx].replace(value);
        }

        // Allocate new slot from free list
        let storage_idx = self.free_head;
        debug_assert!(storage_idx != END_OF_LIST, "No free slots despite check");
        self.free_head = self.next[storage_idx];

        self.keys[storage_idx] = Some(key);
        self.values[storage_idx] = Some(value);

        let was_deleted = self.ctrl[slot_idx] == DELETED;
        self.slots[slot_idx] = storage_idx;
        self.set_ctrl(slot_idx, h2);
        if !was_deleted {
            self.items_count += 1;
        }

        self.link_to_tail(storage_idx);
        self.len += 1;
        None
    }

    /// Returns a reference to the value under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.storage_index(key)?;
        self.values[idx].as_ref()
    }

    /// Returns a mutable reference to the value under `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.storage_index(key)?;
        self.values[idx].as_mut()
    }

    /// Returns `true` if the map holds `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.storage_index(key).is_some()
    }

    /// Removes `key`, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes `key`, returning the stored key and its value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if self.len == 0 {
            return None;
        }
        let (h1, h2) = self.hash(key);
        let (slot_idx, found) = self.find_slot(key, h1, h2);
        if !found {
            return None;
        }

        let storage_idx = self.slots[slot_idx];

        // Mark hash table slot as deleted
        self.set_ctrl(slot_idx, DELETED);
        self.unlink(storage_idx);

        // Return to free list
        self.next[storage_idx] = self.free_head;
        self.free_head = storage_idx;
        self.len -= 1;

        let key = self.keys[storage_idx].take()?;
        let value = self.values[storage_idx].take()?;
        Some((key, value))
    }

    fn grow(&mut self, new_cap: usize) {
        let mut old_keys = std::mem::take(&mut self.keys);
        let mut old_values = std::mem::take(&mut self.values);
        let old_next = std::mem::take(&mut self.next);
        let old_head = self.head;

        self.reset_storage(new_cap);

        // Walking the old list re-inserts in insertion order.
        let mut curr = old_head;
        while curr != END_OF_LIST {
            if let (Some(key), Some(value)) = (old_keys[curr].take(), old_values[curr].take()) {
                self.insert(key, value);
            }
            curr = old_next[curr];
        }
    }
}

impl<K, V, S> Default for LinkedHashMap<K, V, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_capacity_and_hasher(0, S::default())
    }
}

impl<K, V, S> fmt::Debug for LinkedHashMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> Extend<(K, V)> for LinkedHashMap<K, V, S>
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

impl<K, V, S> FromIterator<(K, V)> for LinkedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<'a, K, V, S> IntoIterator for &'a LinkedHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Insertion-order iterator over a [`LinkedHashMap`].
pub struct Iter<'a, K, V, S> {
    map: &'a LinkedHashMap<K, V, S>,
    curr: usize,
    remaining: usize,
}

impl<'a, K, V, S> Iterator for Iter<'a, K, V, S> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.curr == END_OF_LIST {
            return None;
        }
        let idx = self.curr;
        self.curr = self.map.next[idx];
        self.remaining = self.remaining.saturating_sub(1);
        match (&self.map.keys[idx], &self.map.values[idx]) {
            (Some(k), Some(v)) => Some((k, v)),
            _ => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, S> ExactSizeIterator for Iter<'_, K, V, S> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linked_map_basic() {
        let mut map = LinkedHashMap::new();
        map.insert("a", 1);
        map.insert("b", 2);

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some(&1));
        assert_eq!(map.get("b"), Some(&2));
        assert_eq!(map.get("c"), None);
    }

    #[test]
    fn test_linked_map_order() {
        let mut map = LinkedHashMap::new();
        map.insert(1, "one");
        map.insert(2, "two");
        map.insert(3, "three");

        let vec: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(vec, vec![(1, "one"), (2, "two"), (3, "three")]);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut map = LinkedHashMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        assert_eq!(map.insert("a", 10), Some(1));

        let vec: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(vec, vec![("a", 10), ("b", 2)]);
    }

    #[test]
    fn test_remove_keeps_relative_order() {
        let mut map = LinkedHashMap::new();
        for i in 0..5 {
            map.insert(i, i * 10);
        }
        assert_eq!(map.remove(&2), Some(20));
        assert_eq!(map.remove(&2), None);
        assert_eq!(map.remove_entry(&0), Some((0, 0)));

        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, vec![1, 3, 4]);

        // Re-inserted keys go to the back.
        map.insert(2, 200);
        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, vec![1, 3, 4, 2]);
    }

    #[test]
    fn test_growth_preserves_order() {
        let mut map = LinkedHashMap::new();
        for i in 0..100 {
            map.insert(i, i);
        }
        assert_eq!(map.len(), 100);
        assert!(map.keys().copied().eq(0..100));
        for i in 0..100 {
            assert_eq!(map.get(&i), Some(&i));
        }
    }

    #[test]
    fn test_churn_does_not_lose_entries() {
        let mut map = LinkedHashMap::with_capacity(8);
        for round in 0..1_000 {
            map.insert(round, round);
            if round >= 4 {
                assert_eq!(map.remove(&(round - 4)), Some(round - 4));
            }
        }
        assert_eq!(map.len(), 4);
        assert!(map.keys().copied().eq(996..1_000));
    }

    #[test]
    fn test_get_mut_and_borrowed_lookup() {
        let mut map: LinkedHashMap<String, Vec<u32>> = LinkedHashMap::new();
        map.insert("tags".to_string(), vec![1]);
        map.get_mut("tags").unwrap().push(2);

        assert!(map.contains_key("tags"));
        assert_eq!(map.get("tags"), Some(&vec![1, 2]));
    }

    #[test]
    fn test_clear() {
        let mut map: LinkedHashMap<_, _> = (0..10).map(|i| (i, i)).collect();
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.iter().count(), 0);
        assert_eq!(map.get(&3), None);

        map.insert(3, 3);
        assert_eq!(map.get(&3), Some(&3));
    }

    #[test]
    fn test_debug_lists_in_order() {
        let mut map = LinkedHashMap::new();
        map.insert("z", 1);
        map.insert("a", 2);
        assert_eq!(format!("{map:?}"), r#"{"z": 1, "a": 2}"#);
    }
}
