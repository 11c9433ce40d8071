use crate::interpreter::ExecutionError;
use crate::program::{AssetId, NetworkId, ProgramError};
use crate::types::address::Address;
use xcvm_derive::Error;

/// Errors returned by router entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// The caller is neither the admin nor the bridge the action requires.
    #[error("{caller} is not authorized to {action}")]
    Unauthorized {
        caller: Address,
        action: &'static str,
    },
    /// The asset id or the ledger handle is already mapped.
    #[error("asset {asset} or handle {handle} is already registered")]
    AssetAlreadyRegistered { asset: AssetId, handle: Address },
    /// The address already names a contract or a ledger token.
    #[error("address {0} is already registered")]
    ContractAlreadyRegistered(Address),
    #[error("unknown asset {0}")]
    UnknownAsset(AssetId),
    /// `assetIds` and `amounts` differ in length.
    #[error("{assets} asset ids but {amounts} amounts")]
    MismatchedAssets { assets: usize, amounts: usize },
    /// No router is known for the network.
    #[error("unknown network {0}")]
    UnknownNetwork(NetworkId),
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("program rejected: {0}")]
    Program(#[from] ProgramError),
    #[error("execution failed: {0}")]
    Execution(#[from] ExecutionError),
}
