//! The keyspace and its command surface: a `Database` wrapping the
//! chained `Dict` (§3) as the main key space plus the watch index
//! (§4.5), and a minimal command set (`SET`/`GET`/`INCR`/`DEL`) wide
//! enough to exercise §8's end-to-end scenarios end to end. The
//! command executor, AOF sink and replication fanout are external
//! collaborators per §6 — only their contract (the traits here) is in
//! scope, not a production implementation.

mod collaborators;
mod command;
mod database;
mod value;

pub use collaborators::{CommandExecutor, DefaultExecutor};
pub use command::{Command, CommandReply};
pub use database::Database;
pub use value::Value;
