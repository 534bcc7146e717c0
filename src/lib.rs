//! # `mapset` - Keyed Sets with Automatic Cleanup
//!
//! A small composite container: a mapping from keys to sets of values. At the key
//! level it behaves like an associative map, at the value level like a set. Typical
//! uses are in-memory indexes such as "tag -> items" or "user -> sessions".
//!
//! ## Guarantees
//!
//! - **No empty buckets**: a key present in the store always maps to a non-empty set.
//!   When deleting values empties a set, the key goes with it.
//! - **Unique values**: a bucket never holds two equal values.
//! - **Removal notification**: an optional handler is called exactly once each time a
//!   bucket is drained by value deletion. Explicit key removal (`clear(Some(k))`,
//!   `delete(Some(k), [])`) and whole-store clears are not drain events.
//! - **Insertion order**: keys iterate in the order they were first inserted, values in
//!   the order they were first added to their bucket. Re-adding a present value does
//!   not move it.
//!
//! ## Architecture
//!
//! 1. **Ordered primitives** (`LinkedHashMap`, `LinkedHashSet`):
//!    - SwissTable-style control bytes for lookup
//!    - Doubly-linked list over SoA storage for order
//!    - Free list for slot reuse, tombstones for deletion
//!
//! 2. **Keyed store** (`KeyedSetStore<K, V>`):
//!    - Owns a `LinkedHashMap<K, LinkedHashSet<V>>`
//!    - Optional arguments are explicit `Option`s; `""` and `0` are ordinary keys
//!    - Mutating operations return `&mut Self` for chaining
//!
//! The store is single-threaded and performs no locking. Wrap it in a mutex to share it.
//!
//! ## Feature Flags
//!
//! - `tracing` - emit `trace`/`debug` events for bucket lifecycle (consumers provide the subscriber)
//!
//! ## Example
//!
//! ```rust
//! use mapset::KeyedSetStore;
//!
//! let mut tags = KeyedSetStore::with_entry("rust", ["serde", "tokio"]);
//! tags.set("rust", ["serde", "rayon"]).set("go", ["cobra"]);
//!
//! assert_eq!(tags.size(None), 2);
//! assert_eq!(tags.size(Some(&"rust")), 3);
//! assert!(tags.has(&"go", Some(&"cobra")));
//!
//! let mut items = Vec::new();
//! tags.for_each_in_bucket("rust", |item| items.push(*item));
//! assert_eq!(items, ["serde", "tokio", "rayon"]);
//!
//! tags.delete(Some(&"go"), ["cobra"]);
//! assert!(!tags.has(&"go", None));
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod collections;
mod logging;

pub use collections::{Bucket, KeyedSetStore, LinkedHashMap, LinkedHashSet, RemovalHandler};

// Compile-time assertions for memory layout
const _: () = {
    use core::mem;

    // `LinkedHashSet` is `repr(transparent)` over `LinkedHashMap<T, ()>`.
    assert!(
        mem::size_of::<LinkedHashSet<u64>>() == mem::size_of::<LinkedHashMap<u64, ()>>()
    );
    assert!(
        mem::align_of::<LinkedHashSet<u64>>() == mem::align_of::<LinkedHashMap<u64, ()>>()
    );
};
