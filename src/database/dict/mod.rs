//! Chained hash table with incremental, non-blocking rehashing (§3,
//! §4.2). Grounded directly on the reference `dict.c`: two live tables
//! (`ht[0]`/`ht[1]`), a `rehashidx` cursor, a live-safe-iterator count
//! that suspends automatic stepwise rehash, and a forced-resize ratio
//! that still fires when opportunistic resizing is globally disabled.

mod dict_impl;
mod hash;
mod iter;
mod table;

pub use dict_impl::{Dict, ReplaceOutcome};
pub use hash::{
    case_insensitive_hash, generic_hash, hash_seed, integer_hash, set_hash_seed, DjbBuildHasher,
    DjbHasher,
};
pub use iter::{SafeIter, UnsafeIter};
