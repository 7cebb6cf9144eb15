use thiserror::Error;

use super::{DictError, TxnError};

pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by configuration loading and logging initialization
/// — the ambient layers around the dict/transaction core.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Façade error for the `Database`/engine layer, composing the
/// lower-level domain errors via `#[from]`.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Dict(#[from] DictError),

    #[error(transparent)]
    Txn(#[from] TxnError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("unknown key: {0}")]
    UnknownKey(String),

    #[error("value is not an integer")]
    NotAnInteger,
}
