use crate::database::Sds;

/// A stored value. Just enough variants to exercise `SET`/`GET`/`INCR`
/// (§8's scenarios use only these) — the Dict itself is opaque to
/// value shape, so widening this enum never touches the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(Sds),
    Int(i64),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Str(s) => std::str::from_utf8(s.as_bytes()).ok()?.parse().ok(),
        }
    }

    pub fn as_sds(&self) -> Sds {
        match self {
            Value::Str(s) => s.clone(),
            Value::Int(i) => Sds::from_str(&i.to_string()),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{s}"),
            Value::Int(i) => write!(f, "{i}"),
        }
    }
}
