//! One side of the `Dict`'s two-sided hash table (§3 "HT"): a
//! power-of-two bucket array with chained entries. Each bucket is a
//! `Vec<Entry<K, V>>` rather than a linked list of boxed nodes — an
//! equivalent chain without the pointer-chasing and unsafe aliasing a
//! literal forward-linked-list would need to support safe in-place
//! delete-during-iteration.

pub(crate) struct Entry<K, V> {
    pub key: K,
    pub value: V,
}

pub(crate) struct HashTable<K, V> {
    pub buckets: Vec<Vec<Entry<K, V>>>,
    pub size: usize,
    pub sizemask: usize,
    pub used: usize,
}

impl<K, V> HashTable<K, V> {
    /// The unallocated table: `ht[1]` outside of a rehash, per the §3
    /// invariant "when `rehashidx == -1`, `ht[1].size == 0`".
    pub fn empty() -> Self {
        HashTable {
            buckets: Vec::new(),
            size: 0,
            sizemask: 0,
            used: 0,
        }
    }

    /// `size` MUST already be a power of two (or zero); callers compute
    /// that via [`next_power_of_two`].
    pub fn with_size(size: usize) -> Self {
        if size == 0 {
            return Self::empty();
        }
        debug_assert!(size.is_power_of_two());
        HashTable {
            buckets: (0..size).map(|_| Vec::new()).collect(),
            size,
            sizemask: size - 1,
            used: 0,
        }
    }
}

pub(crate) fn next_power_of_two(n: usize) -> usize {
    if n <= 1 {
        return 1;
    }
    n.next_power_of_two()
}
