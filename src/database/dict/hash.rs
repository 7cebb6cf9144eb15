//! Hash primitives (§4.1): a generic bytewise hash, its case-insensitive
//! variant, and a Thomas-Wang integer finalizer. All three are seeded
//! from a single process-wide seed (default `5381`), settable once at
//! startup via [`set_hash_seed`].

use std::hash::{BuildHasher, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};

static HASH_SEED: AtomicU32 = AtomicU32::new(5381);

/// Overrides the process-wide hash seed. Must be called before any
/// `Dict` is populated — changing it afterwards invalidates existing
/// dicts, since entries would hash to different buckets than the ones
/// they were inserted under.
pub fn set_hash_seed(seed: u32) {
    HASH_SEED.store(seed, Ordering::Relaxed);
}

pub fn hash_seed() -> u32 {
    HASH_SEED.load(Ordering::Relaxed)
}

/// `hash = hash * 33 + byte`, seeded. The reference's `djb2`-family
/// string hash.
pub fn generic_hash(seed: u32, bytes: &[u8]) -> u64 {
    let mut hash = seed as u64;
    for &b in bytes {
        hash = hash.wrapping_mul(33).wrapping_add(b as u64);
    }
    hash
}

/// As [`generic_hash`], but each byte is ASCII-lower-cased first.
pub fn case_insensitive_hash(seed: u32, bytes: &[u8]) -> u64 {
    let mut hash = seed as u64;
    for &b in bytes {
        hash = hash.wrapping_mul(33).wrapping_add(b.to_ascii_lowercase() as u64);
    }
    hash
}

/// Thomas Wang's 32-bit integer finalizer: five shift/xor/add rounds.
/// `!(key << 15)` is the reference's bitwise complement of the shifted
/// value (equivalent to `-(key << 15) - 1` under wrapping arithmetic).
pub fn integer_hash(key: u32) -> u32 {
    let mut key = key;
    key = key.wrapping_add(!(key << 15));
    key ^= key >> 10;
    key = key.wrapping_add(key << 3);
    key ^= key >> 6;
    key = key.wrapping_add(!(key << 11));
    key ^= key >> 16;
    key
}

/// [`Hasher`] built on [`generic_hash`] — the `Dict`'s default
/// `BuildHasher`. Keys hash via `std::hash::Hash`, which for byte
/// strings (`Sds`, `[u8]`, `str`) feeds bytes straight into
/// [`Hasher::write`], reproducing the reference's bytewise hash.
pub struct DjbHasher {
    seed: u32,
    buf: Vec<u8>,
}

impl Hasher for DjbHasher {
    fn write(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn finish(&self) -> u64 {
        generic_hash(self.seed, &self.buf)
    }
}

/// `BuildHasher` counterpart of [`DjbHasher`], seeded from the
/// process-wide hash seed at construction time.
#[derive(Clone, Copy, Default)]
pub struct DjbBuildHasher;

impl BuildHasher for DjbBuildHasher {
    type Hasher = DjbHasher;

    fn build_hasher(&self) -> DjbHasher {
        DjbHasher {
            seed: hash_seed(),
            buf: Vec::new(),
        }
    }
}
