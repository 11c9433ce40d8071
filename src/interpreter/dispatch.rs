//! Identities and the cross-network dispatch record emitted by Spawn.

use crate::program::{AssetId, NetworkId};
use crate::types::address::Address;
use crate::types::bytes::Bytes;
use crate::types::hash::Hash;
use std::fmt;
use xcvm_derive::BinaryCodec;

/// The `(network, account)` pair an interpreter acts for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, BinaryCodec)]
pub struct Origin {
    pub network: NetworkId,
    pub account: Address,
}

impl Origin {
    pub const fn new(network: NetworkId, account: Address) -> Self {
        Self { network, account }
    }

    /// Deterministic address of the interpreter serving this origin.
    pub fn interpreter_address(&self) -> Address {
        Address::from_hash(
            Hash::sha3()
                .chain(b"INTERPRETER")
                .chain(self.network.0.to_le_bytes())
                .chain(self.account.as_slice())
                .finalize(),
        )
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.account, self.network)
    }
}

/// Address holding assets escrowed by Spawn on `network`.
pub fn escrow_address(network: NetworkId) -> Address {
    Address::from_hash(
        Hash::sha3()
            .chain(b"ESCROW")
            .chain(network.0.to_le_bytes())
            .finalize(),
    )
}

/// Everything a relayer needs to deliver a spawned program.
///
/// `program` is the enveloped encoding of the sub-program; `assets[i]` was
/// escrowed for `amounts[i]`.
#[derive(Clone, Debug, PartialEq, Eq, BinaryCodec)]
pub struct SpawnRecord {
    pub origin: Origin,
    pub target_network: NetworkId,
    pub salt: Bytes,
    pub version: u32,
    pub program: Bytes,
    pub assets: Vec<AssetId>,
    pub amounts: Vec<u128>,
}

impl SpawnRecord {
    /// Idempotency key relayers de-duplicate deliveries on.
    pub fn dispatch_key(&self) -> Hash {
        Hash::sha3()
            .chain(b"SPAWN")
            .chain(self.origin.network.0.to_le_bytes())
            .chain(self.origin.account.as_slice())
            .chain(self.target_network.0.to_le_bytes())
            .chain(self.salt.as_slice())
            .finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(salt: &[u8]) -> SpawnRecord {
        SpawnRecord {
            origin: Origin::new(NetworkId(1), Address([1; 20])),
            target_network: NetworkId(2),
            salt: Bytes::from(salt),
            version: 1,
            program: Bytes::from(&b"XCVM"[..]),
            assets: vec![AssetId(1)],
            amounts: vec![200],
        }
    }

    #[test]
    fn interpreter_address_is_per_origin() {
        let a = Origin::new(NetworkId(1), Address([1; 20]));
        let b = Origin::new(NetworkId(2), Address([1; 20]));
        assert_eq!(a.interpreter_address(), a.interpreter_address());
        assert_ne!(a.interpreter_address(), b.interpreter_address());
    }

    #[test]
    fn escrow_differs_from_interpreters() {
        let origin = Origin::new(NetworkId(1), Address::zero());
        assert_ne!(escrow_address(NetworkId(1)), origin.interpreter_address());
        assert_ne!(escrow_address(NetworkId(1)), escrow_address(NetworkId(2)));
    }

    #[test]
    fn dispatch_key_ignores_payload() {
        let mut other = record(b"\x11");
        other.amounts = vec![1];
        other.program = Bytes::default();
        assert_eq!(record(b"\x11").dispatch_key(), other.dispatch_key());
        assert_ne!(record(b"\x11").dispatch_key(), record(b"\x12").dispatch_key());
    }
}
