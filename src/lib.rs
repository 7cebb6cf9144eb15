//! chainkv - an in-memory key-value core: a chained hash table with
//! incremental, non-blocking rehashing, plus an optimistic-concurrency
//! `MULTI`/`EXEC`/`WATCH` transaction mechanism.
//!
//! Main modules:
//! - `config` — settings loading (dict tunables, logging level)
//! - `database` — the chained `Dict` and the `Sds` byte string it keys on
//! - `engine` — the keyspace (`Database`), its command surface, and the
//!   command-executor collaborator contract
//! - `error` — per-domain error types (dict, transaction, engine/config)
//! - `logging` — structured logging setup
//! - `transaction` — per-client `MULTI`/`EXEC`/`WATCH` state machine
//! - `watch` — the watch index shared between the keyspace and clients

/// Settings loading (dict tunables, logging level).
pub mod config;
/// The chained `Dict` and the `Sds` byte string it keys on.
pub mod database;
/// The keyspace, its command surface, and the executor collaborator contract.
pub mod engine;
/// Per-domain error types.
pub mod error;
/// Structured logging setup.
pub mod logging;
/// Per-client `MULTI`/`EXEC`/`WATCH` state machine.
pub mod transaction;
/// The watch index shared between the keyspace and clients.
pub mod watch;

pub use config::Settings;
pub use database::{Dict, ReplaceOutcome, Sds};
pub use engine::{Command, CommandExecutor, CommandReply, Database, DefaultExecutor, Value};
pub use error::{DictError, DictResult, EngineError, EngineResult, TxnError, TxnResult};
pub use logging::{init_logging, LoggingHandle};
pub use transaction::{ClientState, ExecOutcome, RecordingSink, ReplicationSink};
pub use watch::{ClientId, WatchIndex};
