//! Core database data structures: the chained hash table (`dict`) and
//! the small-string-optimized byte string (`sds`) it's keyed and valued
//! with.

pub mod dict;
pub mod sds;

pub use dict::{Dict, ReplaceOutcome};
pub use sds::Sds;
