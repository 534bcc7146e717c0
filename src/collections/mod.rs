//! Collections.
//!
//! Collections are organized by data structure type:
//! - `hash`: Insertion-ordered hash map and hash set
//! - `keyed_set_store`: Keys mapped to sets of values, with automatic bucket cleanup

pub mod hash;
pub mod keyed_set_store;

// Re-export commonly used types from submodules
pub use hash::{LinkedHashMap, LinkedHashSet};
pub use keyed_set_store::{Bucket, KeyedSetStore, RemovalHandler};
