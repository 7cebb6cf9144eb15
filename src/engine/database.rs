use std::collections::HashMap;

use crate::database::{Dict, Sds};
use crate::watch::{ClientId, WatchIndex};

use super::Value;

/// The main key space for one database (§3 "Dict", §6 "per-db `dict`
/// (main key space) and `watched_keys`"), plus the server-global
/// `dirty` counter and the per-client `DIRTY_CAS` latch the write path
/// raises through the watch index.
///
/// The reference keeps `DIRTY_CAS` as a bit on the client struct,
/// reachable from the write path through a global client list. This
/// crate has no such global; the flag lives here instead, keyed by
/// `ClientId`, and `ClientState` reads/clears it through `Database`.
pub struct Database {
    id: usize,
    keyspace: Dict<Sds, Value>,
    pub(crate) watched_keys: WatchIndex,
    dirty: u64,
    dirty_cas: HashMap<ClientId, bool>,
}

impl Database {
    pub fn new(id: usize) -> Self {
        Database {
            id,
            keyspace: Dict::new(),
            watched_keys: WatchIndex::new(),
            dirty: 0,
            dirty_cas: HashMap::new(),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn dirty(&self) -> u64 {
        self.dirty
    }

    pub fn bump_dirty(&mut self) {
        self.dirty += 1;
    }

    pub fn is_dirty_cas(&self, client: ClientId) -> bool {
        self.dirty_cas.get(&client).copied().unwrap_or(false)
    }

    pub fn clear_dirty_cas(&mut self, client: ClientId) {
        self.dirty_cas.insert(client, false);
    }

    /// §4.5 `touch`: raises `DIRTY_CAS` on every client watching `key`.
    fn touch(&mut self, key: &Sds) {
        for client in self.watched_keys.touch(key) {
            tracing::trace!(client, key = %key, "touch: raising DIRTY_CAS");
            self.dirty_cas.insert(client, true);
        }
    }

    pub fn get(&mut self, key: &Sds) -> Option<&Value> {
        self.keyspace.find(key)
    }

    pub fn set(&mut self, key: Sds, value: Value) {
        self.touch(&key);
        self.keyspace.replace(key, value).ok();
        self.bump_dirty();
    }

    pub fn del(&mut self, key: &Sds) -> bool {
        self.touch(key);
        let existed = self.keyspace.delete(key).is_ok();
        if existed {
            self.bump_dirty();
        }
        existed
    }

    /// `INCR`: parses the existing value as an integer (absent ⇒ 0),
    /// adds one, stores it back.
    pub fn incr(&mut self, key: &Sds) -> Result<i64, crate::error::EngineError> {
        let current = self
            .keyspace
            .find(key)
            .map(|v| v.as_int().ok_or(crate::error::EngineError::NotAnInteger))
            .transpose()?
            .unwrap_or(0);
        let next = current + 1;
        self.set(key.clone(), Value::Int(next));
        Ok(next)
    }

    /// §4.5 "flush-all / flush-db": existence is checked BEFORE the
    /// flush removes the keys. `db` being `None` models a global flush
    /// (reference uses dbid `-1`); `Some` scopes it to this database.
    pub fn flush(&mut self) {
        let watched: Vec<Sds> = self.watched_keys.watched_keys().cloned().collect();
        for key in watched {
            if self.keyspace.contains_key(&key) {
                self.touch(&key);
            }
        }
        self.keyspace.empty();
        self.bump_dirty();
    }

    pub fn len(&self) -> usize {
        self.keyspace.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyspace.is_empty()
    }
}
