//! §6 "External collaborators": the command executor is the one piece
//! of the surrounding server this crate takes as a fixed contract
//! rather than owning. `DefaultExecutor` is the minimal dispatcher
//! needed to drive §8's scenarios, not a production command table.

use super::{Command, CommandReply, Database, Value};

/// Executes a single already-parsed command against a database.
pub trait CommandExecutor {
    fn call(&self, db: &mut Database, cmd: &Command) -> CommandReply;
}

/// Dispatches the four commands this crate knows about.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultExecutor;

impl CommandExecutor for DefaultExecutor {
    fn call(&self, db: &mut Database, cmd: &Command) -> CommandReply {
        match cmd {
            Command::Set(key, val) => {
                db.set(key.clone(), Value::Int(*val));
                CommandReply::Ok
            }
            Command::Get(key) => match db.get(key) {
                Some(value) => CommandReply::Bulk(value.as_sds()),
                None => CommandReply::Nil,
            },
            Command::Incr(key) => match db.incr(key) {
                Ok(n) => CommandReply::Integer(n),
                Err(e) => CommandReply::Error(e.to_string()),
            },
            Command::Del(key) => {
                let existed = db.del(key);
                CommandReply::Integer(existed as i64)
            }
        }
    }
}
