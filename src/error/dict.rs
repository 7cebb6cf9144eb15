use thiserror::Error;

pub type DictResult<T> = Result<T, DictError>;

/// §7 taxonomy for `Dict` operations. `AllocFailure` is a regular
/// variant here rather than a process abort — Rust's allocator already
/// aborts on OOM for infallible growth, so this only fires on the one
/// explicitly fallible path (`expand`/`try_reserve`-style requests).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DictError {
    #[error("key already exists")]
    KeyExists,

    #[error("key not found")]
    NotFound,

    #[error("invalid resize request: {0}")]
    Invalid(String),

    #[error("allocation failure: {0}")]
    AllocFailure(String),
}
