//! Watch index (§4.5): the per-database half of the two-way
//! `key ↔ client` mapping `WATCH`/`touch` need. The per-client half
//! (which keys a given client watches) lives on [`crate::transaction::ClientState`].

use crate::database::{Dict, Sds};

pub type ClientId = u64;

/// `watched_keys: key → list<client handle>` (§3, §4.5). Backed by the
/// same chained `Dict` the keyspace itself uses — the watch index is,
/// after all, just another dictionary.
pub struct WatchIndex {
    watchers: Dict<Sds, Vec<ClientId>>,
}

impl Default for WatchIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchIndex {
    pub fn new() -> Self {
        WatchIndex {
            watchers: Dict::new(),
        }
    }

    /// Registers `client` as watching `key`. Idempotent: a client
    /// appears at most once per key.
    pub fn watch(&mut self, key: &Sds, client: ClientId) {
        if let Some(list) = self.watchers.find_mut(key) {
            if !list.contains(&client) {
                list.push(client);
            }
            return;
        }
        self.watchers.add(key.clone(), vec![client]).ok();
    }

    /// §4.5 `touch`: returns the clients watching `key` without
    /// modifying list membership — `touch` only raises `DIRTY_CAS` on
    /// them, it never unwatches.
    pub fn touch(&mut self, key: &Sds) -> Vec<ClientId> {
        self.watchers.find(key).cloned().unwrap_or_default()
    }

    /// Removes `client` from `key`'s watcher list; drops the entry
    /// entirely once the list empties (§4.5 invariant: a watch-index
    /// entry is never an empty list).
    pub fn unwatch(&mut self, key: &Sds, client: ClientId) {
        let Some(list) = self.watchers.find_mut(key) else {
            return;
        };
        list.retain(|&c| c != client);
        if list.is_empty() {
            self.watchers.delete(key).ok();
        }
    }

    /// Keys currently watched by at least one client, for flush-time
    /// existence checks (§4.5 "flush-all / flush-db").
    pub fn watched_keys(&self) -> impl Iterator<Item = &Sds> {
        self.watchers.iter().map(|(k, _)| k)
    }

    pub fn clients_watching(&mut self, key: &Sds) -> Vec<ClientId> {
        self.watchers.fetch_value(key).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_is_idempotent_per_client() {
        let mut idx = WatchIndex::new();
        let key = Sds::from_str("a");
        idx.watch(&key, 1);
        idx.watch(&key, 1);
        idx.watch(&key, 2);
        assert_eq!(idx.clients_watching(&key), vec![1, 2]);
    }

    #[test]
    fn touch_does_not_remove_watchers() {
        let mut idx = WatchIndex::new();
        let key = Sds::from_str("a");
        idx.watch(&key, 1);
        let touched = idx.touch(&key);
        assert_eq!(touched, vec![1]);
        assert_eq!(idx.clients_watching(&key), vec![1]);
    }

    #[test]
    fn unwatch_removes_empty_entry() {
        let mut idx = WatchIndex::new();
        let key = Sds::from_str("a");
        idx.watch(&key, 1);
        idx.unwatch(&key, 1);
        assert!(idx.clients_watching(&key).is_empty());
        assert_eq!(idx.watched_keys().count(), 0);
    }
}
