//! Per-client transaction state and the `MULTI`/`EXEC`/`DISCARD`/
//! `WATCH`/`UNWATCH` state machine (§4.4), grounded in the reference
//! `multi.c`.

use crate::database::Sds;
use crate::engine::{Command, CommandExecutor, Database};
use crate::error::{TxnError, TxnResult};
use crate::watch::ClientId;

/// A queued command record (§4.4 "queue"): the command plus an owned
/// copy of its arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedCommand {
    pub cmd: Command,
}

/// Outcome of `EXEC` (§4.4, §7): either the block ran (with one reply
/// per queued command) or it was aborted. `DirtyCas` is modeled here,
/// not as a `TxnError` variant — §7 is explicit that it's a
/// transaction-level abort signal, not a protocol error.
#[derive(Debug, PartialEq)]
pub enum ExecOutcome {
    Aborted,
    Executed(Vec<crate::engine::CommandReply>),
}

/// Per-client transaction state (§4.4 "Per-client transaction state").
#[derive(Debug, Default)]
pub struct ClientState {
    pub id: ClientId,
    multi: bool,
    /// Supplemental taint flag (§4.4 "Queueing failures"): distinct
    /// from `DIRTY_CAS`, raised by [`Self::queue_from_argv`] when a
    /// command could not even be queued (unknown name, wrong arity).
    dirty_exec: bool,
    queue: Vec<QueuedCommand>,
    watched: Vec<Sds>,
}

impl ClientState {
    pub fn new(id: ClientId) -> Self {
        ClientState {
            id,
            ..Default::default()
        }
    }

    pub fn in_multi(&self) -> bool {
        self.multi
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn watched_keys(&self) -> &[Sds] {
        &self.watched
    }

    pub fn multi(&mut self) -> TxnResult<()> {
        if self.multi {
            return Err(TxnError::NestedMulti);
        }
        self.multi = true;
        Ok(())
    }

    pub fn discard(&mut self, db: &mut Database) -> TxnResult<()> {
        if !self.multi {
            return Err(TxnError::DiscardWithoutMulti);
        }
        self.queue.clear();
        self.multi = false;
        self.dirty_exec = false;
        db.clear_dirty_cas(self.id);
        self.unwatch_all(db);
        Ok(())
    }

    pub fn watch(&mut self, db: &mut Database, keys: &[Sds]) -> TxnResult<()> {
        if self.multi {
            return Err(TxnError::WatchInsideMulti);
        }
        for key in keys {
            if !self.watched.contains(key) {
                self.watched.push(key.clone());
                db.watched_keys.watch(key, self.id);
            }
        }
        Ok(())
    }

    pub fn unwatch(&mut self, db: &mut Database) {
        db.clear_dirty_cas(self.id);
        self.unwatch_all(db);
    }

    fn unwatch_all(&mut self, db: &mut Database) {
        for key in self.watched.drain(..) {
            db.watched_keys.unwatch(&key, self.id);
        }
    }

    /// Queues `cmd` (the "any other command while MULTI set" row of
    /// §4.4's table). The caller is responsible for having already
    /// excluded `MULTI`/`EXEC`/`DISCARD`/`WATCH`/`UNWATCH`.
    pub fn queue(&mut self, cmd: Command) {
        self.queue.push(QueuedCommand { cmd });
    }

    /// Parses `argv` and queues the result (§4.4 "Queueing failures").
    /// An unknown command name or wrong arity never reaches the queue:
    /// it replies with an error immediately AND taints the whole
    /// transaction with `dirty_exec`, distinct from `DIRTY_CAS`.
    pub fn queue_from_argv(&mut self, argv: &[Sds]) -> Result<(), String> {
        match Command::parse(argv) {
            Ok(cmd) => {
                self.queue(cmd);
                Ok(())
            }
            Err(reason) => {
                self.dirty_exec = true;
                Err(reason)
            }
        }
    }

    /// §4.4 `EXEC` semantics, steps 1-6.
    pub fn exec(
        &mut self,
        db: &mut Database,
        executor: &impl CommandExecutor,
        replication: &mut impl ReplicationSink,
    ) -> TxnResult<ExecOutcome> {
        if !self.multi {
            return Err(TxnError::ExecWithoutMulti);
        }

        // Step 1a: a queueing failure aborts with an error reply, distinct
        // from DIRTY_CAS's null-multi-bulk (§4.4 "Queueing failures").
        if self.dirty_exec {
            tracing::debug!(client = self.id, "EXEC aborted: dirty EXEC");
            self.queue.clear();
            self.multi = false;
            self.dirty_exec = false;
            db.clear_dirty_cas(self.id);
            self.unwatch_all(db);
            return Err(TxnError::DirtyExec);
        }

        // Step 1b: dirty-CAS short-circuit.
        if db.is_dirty_cas(self.id) {
            tracing::debug!(client = self.id, "EXEC aborted: dirty CAS");
            self.queue.clear();
            self.multi = false;
            db.clear_dirty_cas(self.id);
            self.unwatch_all(db);
            return Ok(ExecOutcome::Aborted);
        }

        // Step 2: synthetic MULTI marker, only now that the block will
        // actually run.
        replication.feed(db.id(), &[Sds::from_str("MULTI")]);

        // Step 3: watched state is irrelevant once EXEC commits.
        self.unwatch_all(db);

        // Step 4: execute queued commands in order, replicating each.
        let queued = std::mem::take(&mut self.queue);
        let mut replies = Vec::with_capacity(queued.len());
        for entry in &queued {
            let reply = executor.call(db, &entry.cmd);
            replication.feed(db.id(), &entry.cmd.to_argv());
            replies.push(reply);
        }

        // Step 5/6: EXEC itself always round-trips through replication.
        replication.feed(db.id(), &[Sds::from_str("EXEC")]);
        db.bump_dirty();
        self.multi = false;
        db.clear_dirty_cas(self.id);

        Ok(ExecOutcome::Executed(replies))
    }
}

/// §6 "AOF sink and replication fanout": `feed(target, dbid, argv,
/// argc)`. Modeled as one trait since both sinks observe the same
/// stream of `MULTI`/command/`EXEC` records; a real deployment would
/// implement it twice (once writing an AOF file, once fanning out to
/// replicas).
pub trait ReplicationSink {
    fn feed(&mut self, dbid: usize, argv: &[Sds]);
}

/// In-memory sink recording fed records for test assertions — the
/// "internals out of scope" stand-in for a real AOF/replication
/// transport (§6).
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub records: Vec<(usize, Vec<Sds>)>,
}

impl ReplicationSink for RecordingSink {
    fn feed(&mut self, dbid: usize, argv: &[Sds]) {
        self.records.push((dbid, argv.to_vec()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Command, DefaultExecutor};

    fn set(key: &str, val: i64) -> Command {
        Command::Set(Sds::from_str(key), val)
    }

    // §8 scenario 4: MULTI/EXEC happy path.
    #[test]
    fn multi_exec_happy_path() {
        let mut db = Database::new(0);
        let mut client = ClientState::new(1);
        let mut sink = RecordingSink::default();
        let executor = DefaultExecutor;

        client.multi().unwrap();
        assert!(client.in_multi());
        client.queue(set("a", 1));
        client.queue(set("b", 2));
        assert_eq!(client.queue_len(), 2);

        let outcome = client.exec(&mut db, &executor, &mut sink).unwrap();
        assert!(matches!(outcome, ExecOutcome::Executed(ref r) if r.len() == 2));
        assert!(!client.in_multi());
        assert_eq!(client.queue_len(), 0);

        assert_eq!(
            db.get(&Sds::from_str("a")).unwrap().as_int(),
            Some(1)
        );
        assert_eq!(
            db.get(&Sds::from_str("b")).unwrap().as_int(),
            Some(2)
        );

        let recorded: Vec<String> = sink
            .records
            .iter()
            .map(|(_, argv)| argv[0].to_string())
            .collect();
        assert_eq!(recorded, vec!["MULTI", "SET", "SET", "EXEC"]);
    }

    // §8 scenario 5: WATCH / touched.
    #[test]
    fn watch_touched_aborts_exec() {
        let mut db = Database::new(0);
        db.set(Sds::from_str("a"), crate::engine::Value::Int(1));

        let mut a = ClientState::new(1);
        a.watch(&mut db, &[Sds::from_str("a")]).unwrap();
        a.multi().unwrap();
        a.queue(Command::Get(Sds::from_str("a")));

        // client B writes the watched key
        db.set(Sds::from_str("a"), crate::engine::Value::Int(99));

        let mut sink = RecordingSink::default();
        let executor = DefaultExecutor;
        let outcome = a.exec(&mut db, &executor, &mut sink).unwrap();
        assert_eq!(outcome, ExecOutcome::Aborted);
        assert!(sink.records.is_empty());
        assert!(a.watched_keys().is_empty());
    }

    // §8 scenario 6: WATCH / untouched.
    #[test]
    fn watch_untouched_executes_and_clears_watch_list() {
        let mut db = Database::new(0);
        db.set(Sds::from_str("a"), crate::engine::Value::Int(0));

        let mut a = ClientState::new(1);
        a.watch(&mut db, &[Sds::from_str("a")]).unwrap();
        a.multi().unwrap();
        a.queue(Command::Incr(Sds::from_str("a")));

        let mut sink = RecordingSink::default();
        let executor = DefaultExecutor;
        let outcome = a.exec(&mut db, &executor, &mut sink).unwrap();
        assert!(matches!(outcome, ExecOutcome::Executed(ref r) if r.len() == 1));
        assert!(a.watched_keys().is_empty());
        assert_eq!(db.get(&Sds::from_str("a")).unwrap().as_int(), Some(1));
    }

    #[test]
    fn nested_multi_is_rejected() {
        let mut client = ClientState::new(1);
        client.multi().unwrap();
        assert_eq!(client.multi(), Err(TxnError::NestedMulti));
    }

    #[test]
    fn exec_without_multi_is_rejected() {
        let mut db = Database::new(0);
        let mut client = ClientState::new(1);
        let mut sink = RecordingSink::default();
        let executor = DefaultExecutor;
        assert_eq!(
            client.exec(&mut db, &executor, &mut sink),
            Err(TxnError::ExecWithoutMulti)
        );
    }

    #[test]
    fn discard_clears_queue_and_unwatches() {
        let mut db = Database::new(0);
        let mut client = ClientState::new(1);
        client.watch(&mut db, &[Sds::from_str("a")]).unwrap();
        client.multi().unwrap();
        client.queue(set("a", 1));
        client.discard(&mut db).unwrap();
        assert!(!client.in_multi());
        assert_eq!(client.queue_len(), 0);
        assert!(client.watched_keys().is_empty());
    }

    // §4.4 "Queueing failures": an unqueueable command taints the
    // transaction distinctly from DIRTY_CAS.
    #[test]
    fn queueing_failure_taints_transaction_and_aborts_exec_with_error() {
        let mut db = Database::new(0);
        let mut client = ClientState::new(1);
        let executor = DefaultExecutor;
        let mut sink = RecordingSink::default();

        client.multi().unwrap();
        client.queue(set("a", 1));
        assert!(client
            .queue_from_argv(&[Sds::from_str("FROB"), Sds::from_str("a")])
            .is_err());

        let outcome = client.exec(&mut db, &executor, &mut sink);
        assert_eq!(outcome, Err(TxnError::DirtyExec));
        assert!(sink.records.is_empty());
        assert!(!client.in_multi());
        assert_eq!(db.get(&Sds::from_str("a")), None);
    }

    #[test]
    fn well_formed_argv_queues_normally() {
        let mut client = ClientState::new(1);
        client.multi().unwrap();
        client
            .queue_from_argv(&[Sds::from_str("SET"), Sds::from_str("a"), Sds::from_str("1")])
            .unwrap();
        assert_eq!(client.queue_len(), 1);
    }

    #[test]
    fn watch_inside_multi_is_rejected() {
        let mut db = Database::new(0);
        let mut client = ClientState::new(1);
        client.multi().unwrap();
        assert_eq!(
            client.watch(&mut db, &[Sds::from_str("a")]),
            Err(TxnError::WatchInsideMulti)
        );
    }
}
