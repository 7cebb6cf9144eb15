use std::hash::{BuildHasher, Hash};
use std::time::Instant;

use rand::Rng;

use crate::config::Settings;
use crate::error::{DictError, DictResult};

use super::hash::DjbBuildHasher;
use super::iter::{SafeIter, UnsafeIter};
use super::table::{next_power_of_two, Entry, HashTable};

/// Outcome of [`Dict::replace`] (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    New,
    Updated,
}

/// The associative container of §3/§4.2. `S` is the `BuildHasher` that
/// plays the role of the C reference's type-descriptor `hash` slot;
/// `DjbBuildHasher` (the default) reproduces the reference's seeded
/// bytewise hash. The other type-descriptor slots (`key_dup`,
/// `value_dup`, `key_compare`, destructors) have no counterpart here:
/// Rust's `Clone`/`PartialEq`/`Drop` already supply them generically,
/// so the descriptor collapses to just the hash function.
pub struct Dict<K, V, S = DjbBuildHasher> {
    pub(crate) ht: [HashTable<K, V>; 2],
    pub(crate) rehashidx: isize,
    pub(crate) iterators: usize,
    hash_builder: S,
    initial_size: usize,
    forced_resize_ratio: usize,
    resize_enabled: bool,
}

impl<K, V> Dict<K, V, DjbBuildHasher>
where
    K: Hash + Eq + Clone,
{
    pub fn new() -> Self {
        Self::with_hasher(DjbBuildHasher)
    }

    /// Builds a `Dict` whose tunables (initial size, forced-resize
    /// ratio, the opportunistic-resize switch) come from loaded
    /// configuration (§10) instead of the spec's bare defaults.
    pub fn with_settings(settings: &Settings) -> Self {
        let mut d = Self::with_hasher(DjbBuildHasher);
        d.initial_size = next_power_of_two(settings.initial_size.max(1));
        d.forced_resize_ratio = settings.forced_resize_ratio;
        d.resize_enabled = settings.resize_enabled;
        d
    }
}

impl<K, V> Default for Dict<K, V, DjbBuildHasher>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> Dict<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    pub fn with_hasher(hash_builder: S) -> Self {
        Dict {
            ht: [HashTable::empty(), HashTable::empty()],
            rehashidx: -1,
            iterators: 0,
            hash_builder,
            initial_size: 4,
            forced_resize_ratio: 5,
            resize_enabled: true,
        }
    }

    pub fn is_rehashing(&self) -> bool {
        self.rehashidx != -1
    }

    pub fn len(&self) -> usize {
        self.ht[0].used + self.ht[1].used
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.ht[0].size
    }

    pub fn set_resize_enabled(&mut self, enabled: bool) {
        self.resize_enabled = enabled;
    }

    pub fn resize_enabled(&self) -> bool {
        self.resize_enabled
    }

    fn hash_key(&self, key: &K) -> u64 {
        self.hash_builder.hash_one(key)
    }

    /// Locates `key`, returning `(table, bucket)` if present.
    fn locate(&self, key: &K) -> Option<(usize, usize)> {
        let h = self.hash_key(key);
        if self.ht[0].size > 0 {
            let idx = (h as usize) & self.ht[0].sizemask;
            if self.ht[0].buckets[idx].iter().any(|e| &e.key == key) {
                return Some((0, idx));
            }
        }
        if self.is_rehashing() && self.ht[1].size > 0 {
            let idx = (h as usize) & self.ht[1].sizemask;
            if self.ht[1].buckets[idx].iter().any(|e| &e.key == key) {
                return Some((1, idx));
            }
        }
        None
    }

    /// One step of incremental rehash (§4.2 "Incremental rehash"), run
    /// before every mutating/lookup op unless a safe iterator is live.
    fn rehash_step_if_needed(&mut self) {
        if self.iterators == 0 {
            self.rehash(1);
        }
    }

    /// Migrates up to `n` non-empty buckets from `ht[0]` to `ht[1]`.
    /// Returns `true` once rehashing has completed (or was already
    /// inactive).
    pub fn rehash(&mut self, n: usize) -> bool {
        if self.rehashidx < 0 {
            return true;
        }
        let mut empty_visits = n.saturating_mul(10).max(1);
        for _ in 0..n {
            if self.ht[0].used == 0 {
                self.finish_rehash();
                return true;
            }
            while self.ht[0].buckets[self.rehashidx as usize].is_empty() {
                self.rehashidx += 1;
                empty_visits -= 1;
                if empty_visits == 0 {
                    return false;
                }
            }
            let bucket_idx = self.rehashidx as usize;
            let chain = std::mem::take(&mut self.ht[0].buckets[bucket_idx]);
            let moved = chain.len();
            for entry in chain {
                let target_idx = (self.hash_key(&entry.key) as usize) & self.ht[1].sizemask;
                self.ht[1].buckets[target_idx].push(entry);
            }
            self.ht[1].used += moved;
            self.ht[0].used -= moved;
            self.rehashidx += 1;
            if self.ht[0].used == 0 {
                self.finish_rehash();
                return true;
            }
        }
        false
    }

    /// Timed variant (§4.2): batches of `batch` buckets, stopping once
    /// `budget_ms` has elapsed (checked once per batch, not per bucket).
    pub fn rehash_milliseconds(&mut self, budget_ms: u64, batch: usize) -> usize {
        let start = Instant::now();
        let mut steps = 0;
        loop {
            if self.rehash(batch) {
                break;
            }
            steps += batch;
            if start.elapsed().as_millis() as u64 >= budget_ms {
                break;
            }
        }
        steps
    }

    fn finish_rehash(&mut self) {
        self.ht[0] = std::mem::replace(&mut self.ht[1], HashTable::empty());
        self.rehashidx = -1;
        tracing::debug!(new_size = self.ht[0].size, "rehash complete");
    }

    fn expand_if_needed(&mut self) -> DictResult<()> {
        if self.is_rehashing() {
            return Ok(());
        }
        if self.ht[0].size == 0 {
            return self.expand(self.initial_size);
        }
        if self.ht[0].used >= self.ht[0].size
            && (self.resize_enabled || self.ht[0].used / self.ht[0].size > self.forced_resize_ratio)
        {
            return self.expand(self.ht[0].size.max(self.ht[0].used) * 2);
        }
        Ok(())
    }

    /// Explicit grow (§4.2 `expand`). Mirrors `dictExpand`'s check order:
    /// the caller's raw `size_hint` is validated against `used` BEFORE
    /// rounding up to a power of two, so e.g. `expand(5)` with 6 entries
    /// stored fails even though `next_power_of_two(5) == 8 >= 6`.
    pub fn expand(&mut self, size_hint: usize) -> DictResult<()> {
        if self.is_rehashing() {
            return Err(DictError::Invalid("already rehashing".into()));
        }
        if size_hint < self.ht[0].used {
            return Err(DictError::Invalid(
                "requested size smaller than used entries".into(),
            ));
        }
        let real_size = next_power_of_two(size_hint.max(self.initial_size));
        if self.ht[0].size == 0 {
            self.ht[0] = HashTable::with_size(real_size);
            return Ok(());
        }
        if real_size == self.ht[0].size {
            return Ok(());
        }
        tracing::debug!(from = self.ht[0].size, to = real_size, "rehash start");
        self.ht[1] = HashTable::with_size(real_size);
        self.rehashidx = 0;
        Ok(())
    }

    /// §4.2 `resize`: shrink to the smallest power of two ≥ `used`, no
    /// smaller than the initial size; no-op if globally disabled or
    /// already rehashing.
    pub fn resize(&mut self) -> DictResult<()> {
        if !self.resize_enabled || self.is_rehashing() {
            return Ok(());
        }
        let target = self.initial_size.max(self.ht[0].used);
        self.expand(target)
    }

    pub fn add(&mut self, key: K, value: V) -> DictResult<()> {
        self.rehash_step_if_needed();
        if self.locate(&key).is_some() {
            return Err(DictError::KeyExists);
        }
        self.insert_new(key, value)
    }

    /// §4.2 `add_raw`: inserts a blank entry, returning it for the
    /// caller to fill. Requires `V: Default` to stand in for the
    /// reference's "entry allocated, value unset" state.
    pub fn add_raw(&mut self, key: K) -> DictResult<&mut V>
    where
        V: Default,
    {
        self.rehash_step_if_needed();
        if self.locate(&key).is_some() {
            return Err(DictError::KeyExists);
        }
        self.insert_new(key.clone(), V::default())?;
        let (t, b) = self.locate(&key).expect("just inserted");
        Ok(self.ht[t].buckets[b]
            .iter_mut()
            .find(|e| e.key == key)
            .map(|e| &mut e.value)
            .expect("just inserted"))
    }

    fn insert_new(&mut self, key: K, value: V) -> DictResult<()> {
        self.expand_if_needed()?;
        let target = if self.is_rehashing() { 1 } else { 0 };
        let idx = (self.hash_key(&key) as usize) & self.ht[target].sizemask;
        self.ht[target].buckets[idx].push(Entry { key, value });
        self.ht[target].used += 1;
        Ok(())
    }

    /// §4.2 `replace`: insert if absent, else overwrite in place. In
    /// Rust the "new value installed before old destroyed" ordering the
    /// reference calls out (needed for refcounted value equality) has
    /// no counterpart — assignment always moves the new value in only
    /// after the old one has nowhere left to be observed from.
    pub fn replace(&mut self, key: K, value: V) -> DictResult<ReplaceOutcome> {
        self.rehash_step_if_needed();
        if let Some((t, b)) = self.locate(&key) {
            let pos = self.ht[t].buckets[b]
                .iter()
                .position(|e| e.key == key)
                .expect("locate found it");
            self.ht[t].buckets[b][pos].value = value;
            return Ok(ReplaceOutcome::Updated);
        }
        self.insert_new(key, value)?;
        Ok(ReplaceOutcome::New)
    }

    pub fn find(&mut self, key: &K) -> Option<&V> {
        self.rehash_step_if_needed();
        self.peek(key)
    }

    pub fn find_mut(&mut self, key: &K) -> Option<&mut V> {
        self.rehash_step_if_needed();
        let (t, b) = self.locate(key)?;
        self.ht[t].buckets[b]
            .iter_mut()
            .find(|e| &e.key == key)
            .map(|e| &mut e.value)
    }

    /// Read-only lookup that does NOT drive a rehash step. Used by
    /// iterators (which must not mutate the dict between yields) and
    /// by anything else that wants a value without nudging rehash.
    pub(crate) fn peek(&self, key: &K) -> Option<&V> {
        let (t, b) = self.locate(key)?;
        self.ht[t].buckets[b]
            .iter()
            .find(|e| &e.key == key)
            .map(|e| &e.value)
    }

    pub fn fetch_value(&mut self, key: &K) -> Option<&V> {
        self.find(key)
    }

    pub fn contains_key(&mut self, key: &K) -> bool {
        self.find(key).is_some()
    }

    pub fn delete(&mut self, key: &K) -> DictResult<()> {
        self.delete_no_free(key).map(|_| ())
    }

    pub fn delete_no_free(&mut self, key: &K) -> DictResult<(K, V)> {
        self.rehash_step_if_needed();
        let (t, b) = self.locate(key).ok_or(DictError::NotFound)?;
        let pos = self.ht[t].buckets[b]
            .iter()
            .position(|e| &e.key == key)
            .expect("locate found it");
        let entry = self.ht[t].buckets[b].remove(pos);
        self.ht[t].used -= 1;
        Ok((entry.key, entry.value))
    }

    /// §4.2 `random_entry`: uniform over non-empty buckets across both
    /// tables during rehash, then uniform within the chosen chain.
    pub fn random_entry(&mut self) -> Option<(&K, &V)> {
        if self.is_empty() {
            return None;
        }
        self.rehash_step_if_needed();
        let mut rng = rand::thread_rng();
        let (t, b) = if self.is_rehashing() {
            loop {
                let span = self.ht[0].size + self.ht[1].size - self.rehashidx as usize;
                let h = self.rehashidx as usize + rng.gen_range(0..span);
                let (t, idx) = if h >= self.ht[0].size {
                    (1, h - self.ht[0].size)
                } else {
                    (0, h)
                };
                if !self.ht[t].buckets[idx].is_empty() {
                    break (t, idx);
                }
            }
        } else {
            loop {
                let idx = rng.gen_range(0..self.ht[0].size);
                if !self.ht[0].buckets[idx].is_empty() {
                    break (0, idx);
                }
            }
        };
        let chain = &self.ht[t].buckets[b];
        let pick = rng.gen_range(0..chain.len());
        let entry = &chain[pick];
        Some((&entry.key, &entry.value))
    }

    /// §4.2 `empty`: clear both tables, reset the rehash cursor and
    /// iterator count.
    pub fn empty(&mut self) {
        self.ht = [HashTable::empty(), HashTable::empty()];
        self.rehashidx = -1;
        self.iterators = 0;
    }

    /// Forward-only walk; the caller must not mutate the dict while it
    /// lives (enforced here by borrowing `&self` immutably for its
    /// whole lifetime rather than by a runtime flag).
    pub fn iter(&self) -> UnsafeIter<'_, K, V> {
        UnsafeIter::new(&self.ht[0], &self.ht[1], self.is_rehashing())
    }

    /// Tolerates deleting the entry just yielded via
    /// [`SafeIter::delete_current`]. Suspends automatic stepwise rehash
    /// for its lifetime.
    pub fn safe_iter(&mut self) -> SafeIter<'_, K, V, S> {
        SafeIter::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> Dict<String, i64> {
        Dict::new()
    }

    #[test]
    fn basic_add_find_delete() {
        let mut d = fresh();
        d.add("a".into(), 1).unwrap();
        assert_eq!(d.find(&"a".to_string()), Some(&1));
        assert_eq!(d.len(), 1);
        d.delete(&"a".to_string()).unwrap();
        assert_eq!(d.find(&"a".to_string()), None);
        assert_eq!(d.len(), 0);
    }

    #[test]
    fn add_fails_on_existing_key() {
        let mut d = fresh();
        d.add("a".into(), 1).unwrap();
        assert_eq!(d.add("a".into(), 2), Err(DictError::KeyExists));
    }

    #[test]
    fn delete_fails_on_missing_key() {
        let mut d: Dict<String, i64> = fresh();
        assert_eq!(d.delete(&"missing".to_string()), Err(DictError::NotFound));
    }

    #[test]
    fn replace_inserts_then_updates() {
        let mut d = fresh();
        assert_eq!(d.replace("a".into(), 1).unwrap(), ReplaceOutcome::New);
        assert_eq!(d.replace("a".into(), 2).unwrap(), ReplaceOutcome::Updated);
        assert_eq!(d.find(&"a".to_string()), Some(&2));
    }

    #[test]
    fn delete_no_free_returns_ownership() {
        let mut d = fresh();
        d.add("a".into(), 1).unwrap();
        let (k, v) = d.delete_no_free(&"a".to_string()).unwrap();
        assert_eq!(k, "a");
        assert_eq!(v, 1);
    }

    // §8 scenario 1: grow and shrink.
    #[test]
    fn grow_and_shrink() {
        let mut d = fresh();
        for i in 0..16 {
            d.add(format!("k{i}"), i).unwrap();
            // drive rehash to completion after each insert so the
            // capacity check below sees a settled table.
            while d.is_rehashing() {
                d.rehash(1);
            }
        }
        assert_eq!(d.capacity(), 16);
        for i in 0..16 {
            d.delete(&format!("k{i}")).unwrap();
        }
        d.resize().unwrap();
        while d.is_rehashing() {
            d.rehash(1);
        }
        assert_eq!(d.capacity(), 4);
    }

    // §8 scenario 2: lookup during rehash.
    #[test]
    fn lookup_survives_rehash() {
        let mut d = fresh();
        for i in 0..64 {
            d.add(format!("k{i}"), i).unwrap();
            assert_eq!(d.find(&"k0".to_string()), Some(&0));
        }
        for _ in 0..10 {
            d.rehash(1);
        }
        assert_eq!(d.find(&"k0".to_string()), Some(&0));
        assert_eq!(d.len(), 64);
    }

    #[test]
    fn resize_disabled_blocks_opportunistic_growth_but_not_forced_ratio() {
        let mut d = fresh();
        d.set_resize_enabled(false);
        // first insert still allocates the initial table
        d.add("a".into(), 1).unwrap();
        assert_eq!(d.capacity(), 4);
        // fill past the forced ratio (used/size > 5) to trip the safety valve
        for i in 0..40 {
            d.add(format!("k{i}"), i).unwrap();
        }
        assert!(d.capacity() > 4, "forced ratio must still resize");
    }

    #[test]
    fn expand_rejects_raw_size_below_used_even_after_rounding_up() {
        let mut d = fresh();
        for i in 0..6 {
            d.add(format!("k{i}"), i).unwrap();
            while d.is_rehashing() {
                d.rehash(1);
            }
        }
        // next_power_of_two(5) == 8, which is >= used(6) — but the raw
        // hint 5 is itself below used(6), so this must still fail.
        assert_eq!(
            d.expand(5),
            Err(DictError::Invalid(
                "requested size smaller than used entries".into()
            ))
        );
    }

    #[test]
    fn random_entry_returns_none_when_empty() {
        let mut d: Dict<String, i64> = fresh();
        assert!(d.random_entry().is_none());
    }

    #[test]
    fn random_entry_touches_every_live_entry() {
        let mut d = fresh();
        for i in 0..20 {
            d.add(format!("k{i}"), i).unwrap();
        }
        let mut seen = std::collections::HashSet::new();
        for _ in 0..2000 {
            if let Some((k, _)) = d.random_entry() {
                seen.insert(k.clone());
            }
        }
        assert_eq!(seen.len(), 20);
    }

    #[test]
    fn empty_resets_state() {
        let mut d = fresh();
        for i in 0..20 {
            d.add(format!("k{i}"), i).unwrap();
        }
        d.empty();
        assert_eq!(d.len(), 0);
        assert!(!d.is_rehashing());
        assert_eq!(d.find(&"k0".to_string()), None);
    }
}
