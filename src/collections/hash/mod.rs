//! Insertion-ordered hash collections.
//!
//! These are the ordered map and set primitives the keyed store is built from.

pub mod linked_hash_map;
pub mod linked_hash_set;

pub use linked_hash_map::LinkedHashMap;
pub use linked_hash_set::LinkedHashSet;
