use crate::program::{AssetId, ProgramError};
use crate::state::LedgerError;
use crate::types::address::Address;
use crate::types::encoding::DecodeError;
use crate::types::hash::Hash;
use xcvm_derive::Error;

/// Errors that abort a program. Any of them discards every state change the
/// program made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// The computed amount exceeds the interpreter's holding. `required`
    /// saturates at `u128::MAX` when the amount does not fit in a `u128`.
    #[error("insufficient balance of asset {asset}: {required} required, {available} available")]
    InsufficientBalance {
        asset: AssetId,
        required: u128,
        available: u128,
    },
    /// The asset id has no ledger token on this network.
    #[error("unknown asset {0}")]
    UnknownAsset(AssetId),
    /// An amount does not fit in 128 bits.
    #[error("amount of asset {0} overflows")]
    AmountOverflow(AssetId),
    /// Owner management attempted outside the self-call path.
    #[error("{caller} may not manage the owners of {interpreter}")]
    Unauthorized { caller: Address, interpreter: Address },
    /// A resolved payload addresses nothing this network knows.
    #[error("unknown callee {0}")]
    UnknownCallee(Address),
    /// A resolved payload is too short to hold a callee address.
    #[error("payload of {0} bytes has no callee")]
    MissingCallee(usize),
    /// The calldata could not be decoded by its callee.
    #[error("invalid calldata for {callee}: {reason}")]
    InvalidCall { callee: Address, reason: DecodeError },
    /// A contract refused the call.
    #[error("call to {callee} reverted: {reason}")]
    Reverted { callee: Address, reason: String },
    /// A stored entry could not be decoded.
    #[error("corrupt state entry {0}")]
    CorruptState(Hash),
    #[error("{0}")]
    Program(#[from] ProgramError),
    #[error("{0}")]
    Ledger(#[from] LedgerError),
}
