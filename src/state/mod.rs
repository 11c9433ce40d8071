//! Storage the interpreter executes against.
//!
//! - `state`: the key-value [`State`] trait, transactional overlays and the in-memory store
//! - `ledger`: token balances kept in any `State`

pub mod ledger;
#[allow(clippy::module_inception)]
pub mod state;

pub use ledger::{Ledger, LedgerError};
pub use state::{MemoryState, OverlayState, State};
