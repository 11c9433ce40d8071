//! Enveloped wire format and pre-execution validation.
//!
//! A program travelling between networks is prefixed with the magic bytes
//! `XCVM` and the format version. Spawn sub-programs are nested as bare bodies
//! inside their parent and re-enveloped when they are dispatched.

use crate::program::asset::Asset;
use crate::program::binding::{BindingValue, check_layout};
use crate::program::errors::ProgramError;
use crate::program::instruction::{Instruction, Program};
use crate::types::bytes::Bytes;
use crate::types::encoding::{Decode, DecodeError, Encode};
use crate::types::hash::Hash;
use xcvm_derive::BinaryCodec;

/// Magic bytes identifying an encoded program.
pub const MAGIC: &[u8; 4] = b"XCVM";

/// Current wire format version.
pub const CURRENT_VERSION: Version = Version::new(1, 0, 0);

/// Semantic version of the wire format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, BinaryCodec)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl Version {
    pub const fn new(major: u8, minor: u8, patch: u8) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Whether a program written with `self` can be read by this build.
    fn is_readable(&self) -> bool {
        self.major == CURRENT_VERSION.major && *self <= CURRENT_VERSION
    }
}

/// Serializes a program with its envelope.
pub fn encode(program: &Program) -> Bytes {
    program.to_wire()
}

/// Decodes an enveloped program and validates it for execution.
///
/// Every failure happens before any instruction could run.
pub fn decode(bytes: &[u8]) -> Result<Program, ProgramError> {
    let program = Program::from_wire(bytes)?;
    program.validate()?;
    Ok(program)
}

impl Program {
    /// Serializes the program with magic and version.
    pub fn to_wire(&self) -> Bytes {
        let mut out = Vec::with_capacity(MAGIC.len() + 3 + self.encoded_len());
        MAGIC.encode(&mut out);
        CURRENT_VERSION.encode(&mut out);
        self.encode(&mut out);
        Bytes::from_vec(out)
    }

    /// Structural decoding of an enveloped program, without validation.
    pub fn from_wire(mut input: &[u8]) -> Result<Self, DecodeError> {
        if &<[u8; 4]>::decode(&mut input)? != MAGIC {
            return Err(DecodeError::BadMagic);
        }

        let version = Version::decode(&mut input)?;
        if !version.is_readable() {
            return Err(DecodeError::UnsupportedVersion {
                major: version.major,
                minor: version.minor,
                patch: version.patch,
            });
        }

        let program = Program::decode(&mut input)?;
        if !input.is_empty() {
            return Err(DecodeError::TrailingBytes(input.len()));
        }
        Ok(program)
    }

    /// Identity used in events and logs: SHA3 over the enveloped encoding.
    pub fn hash(&self) -> Hash {
        let mut h = Hash::sha3();
        h.update(b"PROGRAM");
        h.update(self.to_wire().as_slice());
        h.finalize()
    }

    /// Checks ratios and binding layouts, recursing into Spawn sub-programs.
    pub fn validate(&self) -> Result<(), ProgramError> {
        for instruction in &self.instructions {
            match instruction {
                Instruction::Transfer { assets, .. } => validate_assets(assets)?,
                Instruction::Call { payload, bindings } => {
                    for binding in bindings {
                        if let BindingValue::AssetAmount(_, ratio) = &binding.value {
                            if ratio.denominator == 0 {
                                return Err(ProgramError::ZeroDenominator);
                            }
                        }
                    }
                    check_layout(payload.len(), bindings)?;
                }
                Instruction::Spawn {
                    program, assets, ..
                } => {
                    validate_assets(assets)?;
                    program.validate()?;
                }
            }
        }
        Ok(())
    }
}

fn validate_assets(assets: &[Asset]) -> Result<(), ProgramError> {
    for asset in assets {
        if asset.balance.ratio().is_some_and(|ratio| ratio.denominator == 0) {
            return Err(ProgramError::ZeroDenominator);
        }
    }
    Ok(())
}
