//! Per-account execution of decoded programs.
//!
//! - `amount`: evaluating balance selectors
//! - `resolver`: late binding of Call payloads
//! - `owners`: the self-managed owner set
//! - `host`: callees and asset lookup provided by the deployment
//! - `dispatch`: origins, derived addresses and Spawn dispatch records
//! - `exec`: the interpreter itself

pub mod amount;
pub mod dispatch;
pub mod errors;
pub mod exec;
pub mod host;
pub mod owners;
pub mod resolver;

pub use dispatch::{Origin, SpawnRecord, escrow_address};
pub use errors::ExecutionError;
pub use exec::{ExecContext, ExecutionResult, Interpreter};
pub use host::{Contract, Host, TokenCall};
pub use owners::OwnerCall;
