//! Cross-network program interpreter.
//!
//! Provides the program wire format, late-bound call payloads, per-account
//! interpreters over a transactional ledger, the router that bridges deliver
//! programs to, and an in-process relayer for Spawn records.

pub mod interpreter;
pub mod program;
pub mod relayer;
pub mod router;
pub mod state;
pub mod types;
pub mod utils;
