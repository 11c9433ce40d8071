use crate::interpreter::{Origin, SpawnRecord};
use crate::program::{AssetId, NetworkId};
use crate::types::address::Address;
use crate::types::hash::Hash;

/// Observable effects of router calls, in the order they happened.
///
/// Read-model layers consume these; the router never reads them back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouterEvent {
    BridgeRegistered {
        network: NetworkId,
        bridge: Address,
    },
    AssetRegistered {
        asset: AssetId,
        handle: Address,
    },
    ContractRegistered {
        address: Address,
    },
    InterpreterCreated {
        origin: Origin,
        interpreter: Address,
    },
    ProgramExecuted {
        origin: Origin,
        program: Hash,
    },
    /// A program escrowed assets for delivery to another network.
    Spawn(SpawnRecord),
}
