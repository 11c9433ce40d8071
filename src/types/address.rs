//! 20-byte addresses identifying ledger holders, interpreters and contracts.

use crate::types::hash::Hash;
use std::fmt;
use xcvm_derive::BinaryCodec;

/// Size of an address in bytes.
pub const ADDRESS_SIZE: usize = 20;

/// Fixed-size 20-byte address.
///
/// Derived addresses (interpreters, escrow) take the last 20 bytes of a
/// domain-separated SHA3-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, BinaryCodec)]
pub struct Address(pub [u8; ADDRESS_SIZE]);

impl Address {
    pub const fn zero() -> Self {
        Address([0u8; ADDRESS_SIZE])
    }

    /// Takes the trailing 20 bytes of a hash.
    pub fn from_hash(hash: Hash) -> Self {
        let mut addr = [0u8; ADDRESS_SIZE];
        addr.copy_from_slice(&hash.0[hash.0.len() - ADDRESS_SIZE..]);
        Address(addr)
    }

    /// Reads an address from the first 20 bytes of `bytes`.
    pub fn from_prefix(bytes: &[u8]) -> Option<Self> {
        let mut addr = [0u8; ADDRESS_SIZE];
        addr.copy_from_slice(bytes.get(..ADDRESS_SIZE)?);
        Some(Address(addr))
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl From<[u8; ADDRESS_SIZE]> for Address {
    fn from(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Address(bytes)
    }
}
