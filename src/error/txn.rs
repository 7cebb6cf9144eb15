use thiserror::Error;

pub type TxnResult<T> = Result<T, TxnError>;

/// `ProtocolMisuse` cases from §7: nesting, unbalanced state-machine
/// calls. `DirtyCas` is deliberately NOT a variant here — §7 is explicit
/// that it is a transaction-level abort signal, not a protocol error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TxnError {
    #[error("MULTI calls can not be nested")]
    NestedMulti,

    #[error("EXEC without MULTI")]
    ExecWithoutMulti,

    #[error("DISCARD without MULTI")]
    DiscardWithoutMulti,

    #[error("WATCH inside MULTI is not allowed")]
    WatchInsideMulti,

    #[error("EXEC aborted, transaction contains errors")]
    DirtyExec,
}
