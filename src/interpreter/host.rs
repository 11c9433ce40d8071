//! What a deployment exposes to the interpreters it runs.

use crate::interpreter::errors::ExecutionError;
use crate::program::AssetId;
use crate::state::State;
use crate::types::address::Address;
use xcvm_derive::BinaryCodec;

/// An on-network callee reachable from a Call instruction.
///
/// Runs against the same transactional state as the calling program, so a
/// failure after a contract call also discards the contract's writes.
pub trait Contract: Send + Sync {
    fn call(
        &self,
        state: &mut dyn State,
        caller: &Address,
        calldata: &[u8],
    ) -> Result<Vec<u8>, ExecutionError>;
}

/// Lookup of assets and callees.
pub trait Host {
    /// Ledger token registered for `asset`.
    fn asset_handle(&self, asset: AssetId) -> Option<Address>;
    /// Whether `address` is a registered ledger token.
    fn is_token(&self, address: &Address) -> bool;
    fn contract(&self, address: &Address) -> Option<&dyn Contract>;
}

/// Calldata understood by ledger tokens.
#[derive(Clone, Debug, PartialEq, Eq, BinaryCodec)]
pub enum TokenCall {
    /// Moves `amount` from the caller to `to`.
    Transfer { to: Address, amount: u128 },
}
