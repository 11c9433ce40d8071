//! Asset identifiers and balance selectors.

use std::fmt;
use xcvm_derive::BinaryCodec;

/// Network-independent asset identifier.
///
/// Opaque to the interpreter; each router maps it to a concrete ledger token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, BinaryCodec)]
pub struct AssetId(pub u128);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for AssetId {
    fn from(id: u128) -> Self {
        AssetId(id)
    }
}

/// Identifier of a participating network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, BinaryCodec)]
pub struct NetworkId(pub u32);

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NetworkId {
    fn from(id: u32) -> Self {
        NetworkId(id)
    }
}

/// Fraction `numerator / denominator`.
///
/// Kept exactly as authored: evaluation multiplies by the raw numerator
/// before dividing, so `1000/2000` and `1/2` yield the same amounts but
/// encode differently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, BinaryCodec)]
pub struct Ratio {
    pub numerator: u128,
    pub denominator: u128,
}

impl Ratio {
    pub const fn new(numerator: u128, denominator: u128) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// The whole amount.
    pub const fn one() -> Self {
        Self::new(1, 1)
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// How much of an asset an instruction moves.
///
/// Resolved at execution time against the interpreter's holdings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, BinaryCodec)]
pub enum Balance {
    /// Exact quantity.
    Absolute(u128),
    /// Share of the current holding: `floor(balance * n / d)`.
    Ratio(Ratio),
    /// `integer * unit_scale + floor(unit_scale * n / d)`.
    ///
    /// The fractional part is taken of the deployment's unit scale, never of
    /// the live balance.
    Unit { integer: u128, fraction: Ratio },
}

impl Balance {
    /// The ratio carried by this balance, if any.
    pub fn ratio(&self) -> Option<&Ratio> {
        match self {
            Balance::Absolute(_) => None,
            Balance::Ratio(ratio) => Some(ratio),
            Balance::Unit { fraction, .. } => Some(fraction),
        }
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Balance::Absolute(amount) => write!(f, "absolute {amount}"),
            Balance::Ratio(ratio) => write!(f, "ratio {ratio}"),
            Balance::Unit { integer, fraction } => write!(f, "unit {integer} + {fraction}"),
        }
    }
}

/// An asset together with the amount selector to apply to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, BinaryCodec)]
pub struct Asset {
    pub asset_id: AssetId,
    pub balance: Balance,
}

impl Asset {
    pub fn new(asset_id: AssetId, balance: Balance) -> Self {
        Self {
            asset_id,
            balance,
        }
    }

    pub fn absolute(asset_id: AssetId, amount: u128) -> Self {
        Self::new(asset_id, Balance::Absolute(amount))
    }

    pub fn ratio(asset_id: AssetId, numerator: u128, denominator: u128) -> Self {
        Self::new(asset_id, Balance::Ratio(Ratio::new(numerator, denominator)))
    }

    pub fn unit(asset_id: AssetId, integer: u128, fraction: Ratio) -> Self {
        Self::new(asset_id, Balance::Unit { integer, fraction })
    }
}
