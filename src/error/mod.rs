//! Crate-wide error taxonomy.
//!
//! Each failure domain gets its own `thiserror` enum rather than one
//! catch-all type, mirroring how the dict and the transaction executor
//! are different layers with different recovery policies: `DictError`
//! is recovered locally by callers (`replace` swallows `KeyExists` from
//! `add`), `TxnError` surfaces as a protocol-level reply.

mod dict;
mod engine;
mod txn;

pub use dict::{DictError, DictResult};
pub use engine::{ConfigError, EngineError, EngineResult};
pub use txn::{TxnError, TxnResult};
