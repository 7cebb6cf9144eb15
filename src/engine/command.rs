use crate::database::Sds;

/// The minimal command surface needed to drive §8's scenarios. The
/// transaction/`MULTI` control commands (`MULTI`/`EXEC`/`DISCARD`/
/// `WATCH`/`UNWATCH`) are NOT variants here — per §4.4's table they
/// never reach the queue or the executor, they're intercepted by
/// `ClientState` itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set(Sds, i64),
    Get(Sds),
    Incr(Sds),
    Del(Sds),
}

impl Command {
    /// The wire-level argument vector, for feeding to the replication
    /// sink (§6 `feed(target, dbid, argv, argc)`).
    pub fn to_argv(&self) -> Vec<Sds> {
        match self {
            Command::Set(k, v) => vec![
                Sds::from_str("SET"),
                k.clone(),
                Sds::from_str(&v.to_string()),
            ],
            Command::Get(k) => vec![Sds::from_str("GET"), k.clone()],
            Command::Incr(k) => vec![Sds::from_str("INCR"), k.clone()],
            Command::Del(k) => vec![Sds::from_str("DEL"), k.clone()],
        }
    }

    /// Parses a wire-level argument vector the way a command table
    /// would before queueing it (§4.4 "Queueing failures"): unknown
    /// names and wrong arity are rejected here, distinct from errors
    /// that only surface once the command actually runs.
    pub fn parse(argv: &[Sds]) -> Result<Command, String> {
        let Some(name) = argv.first() else {
            return Err("empty command".into());
        };
        let name = name.as_slice().to_ascii_uppercase();
        let args = &argv[1..];
        match name.as_slice() {
            b"SET" => match args {
                [key, value] => {
                    let value = std::str::from_utf8(value.as_bytes())
                        .ok()
                        .and_then(|s| s.parse::<i64>().ok())
                        .ok_or_else(|| "SET value must be an integer".to_string())?;
                    Ok(Command::Set(key.clone(), value))
                }
                _ => Err(format!("wrong number of arguments for 'SET' ({})", args.len())),
            },
            b"GET" => match args {
                [key] => Ok(Command::Get(key.clone())),
                _ => Err(format!("wrong number of arguments for 'GET' ({})", args.len())),
            },
            b"INCR" => match args {
                [key] => Ok(Command::Incr(key.clone())),
                _ => Err(format!("wrong number of arguments for 'INCR' ({})", args.len())),
            },
            b"DEL" => match args {
                [key] => Ok(Command::Del(key.clone())),
                _ => Err(format!("wrong number of arguments for 'DEL' ({})", args.len())),
            },
            _ => Err(format!(
                "unknown command '{}'",
                String::from_utf8_lossy(&name)
            )),
        }
    }
}

/// Reply produced by executing a single (possibly queued) command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandReply {
    Ok,
    Integer(i64),
    Bulk(Sds),
    Nil,
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<Sds> {
        parts.iter().map(|p| Sds::from_str(p)).collect()
    }

    #[test]
    fn parses_known_commands_case_insensitively() {
        assert_eq!(
            Command::parse(&argv(&["set", "a", "1"])),
            Ok(Command::Set(Sds::from_str("a"), 1))
        );
        assert_eq!(
            Command::parse(&argv(&["Get", "a"])),
            Ok(Command::Get(Sds::from_str("a")))
        );
    }

    #[test]
    fn rejects_unknown_command() {
        assert!(Command::parse(&argv(&["FROB", "a"])).is_err());
    }

    #[test]
    fn rejects_wrong_arity() {
        assert!(Command::parse(&argv(&["GET", "a", "b"])).is_err());
        assert!(Command::parse(&argv(&["SET", "a"])).is_err());
    }

    #[test]
    fn rejects_non_integer_set_value() {
        assert!(Command::parse(&argv(&["SET", "a", "not-a-number"])).is_err());
    }
}
