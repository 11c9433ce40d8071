//! Programs and the instructions they are made of.
//!
//! `Program` and `Instruction` are encoded by hand rather than derived:
//! a Spawn embeds a whole sub-program, and decoding tracks the nesting depth
//! so hostile input cannot recurse without bound.

use crate::program::asset::{Asset, NetworkId};
use crate::program::binding::Binding;
use crate::types::address::Address;
use crate::types::bytes::Bytes;
use crate::types::encoding::{Decode, DecodeError, Encode, EncodeSink, read_len};
use xcvm_derive::BinaryCodec;

/// Deepest chain of Spawn sub-programs accepted by the decoder.
pub const MAX_NESTING: usize = 16;

/// Where a Transfer sends its assets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, BinaryCodec)]
pub enum Destination {
    /// A concrete address on the executing network.
    Account(Address),
    /// The bridge that delivered the program.
    Relayer,
    /// The executing interpreter.
    Interpreter,
}

/// A single step of a program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// Moves assets out of the interpreter.
    Transfer {
        destination: Destination,
        assets: Vec<Asset>,
    },
    /// Invokes a callee with a payload patched by late bindings.
    Call {
        payload: Bytes,
        bindings: Vec<Binding>,
    },
    /// Escrows assets and relocates a sub-program to another network.
    Spawn {
        network: NetworkId,
        salt: Bytes,
        version: u32,
        program: Program,
        assets: Vec<Asset>,
    },
}

impl Instruction {
    pub const TRANSFER: u8 = 0;
    pub const CALL: u8 = 1;
    pub const SPAWN: u8 = 2;

    /// Short lower-case mnemonic.
    pub fn name(&self) -> &'static str {
        match self {
            Instruction::Transfer { .. } => "transfer",
            Instruction::Call { .. } => "call",
            Instruction::Spawn { .. } => "spawn",
        }
    }

    fn decode_nested(input: &mut &[u8], depth: usize) -> Result<Self, DecodeError> {
        match u8::decode(input)? {
            Self::TRANSFER => Ok(Instruction::Transfer {
                destination: Destination::decode(input)?,
                assets: Vec::decode(input)?,
            }),
            Self::CALL => Ok(Instruction::Call {
                payload: Bytes::decode(input)?,
                bindings: Vec::decode(input)?,
            }),
            Self::SPAWN => Ok(Instruction::Spawn {
                network: NetworkId::decode(input)?,
                salt: Bytes::decode(input)?,
                version: u32::decode(input)?,
                program: Program::decode_nested(input, depth + 1)?,
                assets: Vec::decode(input)?,
            }),
            tag => Err(DecodeError::UnknownTag {
                ty: "Instruction",
                tag,
            }),
        }
    }
}

impl Encode for Instruction {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        match self {
            Instruction::Transfer {
                destination,
                assets,
            } => {
                Self::TRANSFER.encode(out);
                destination.encode(out);
                assets.encode(out);
            }
            Instruction::Call { payload, bindings } => {
                Self::CALL.encode(out);
                payload.encode(out);
                bindings.encode(out);
            }
            Instruction::Spawn {
                network,
                salt,
                version,
                program,
                assets,
            } => {
                Self::SPAWN.encode(out);
                network.encode(out);
                salt.encode(out);
                version.encode(out);
                program.encode(out);
                assets.encode(out);
            }
        }
    }
}

impl Decode for Instruction {
    fn decode(input: &mut &[u8]) -> Result<Self, DecodeError> {
        Self::decode_nested(input, 0)
    }
}

/// An ordered list of instructions plus an opaque tag.
///
/// The tag is carried through encoding untouched and never interpreted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    pub tag: Bytes,
    pub instructions: Vec<Instruction>,
}

impl Program {
    pub fn new(tag: impl Into<Bytes>, instructions: Vec<Instruction>) -> Self {
        Self {
            tag: tag.into(),
            instructions,
        }
    }

    /// Depth of the deepest Spawn chain; a program without Spawn has depth 0.
    pub fn depth(&self) -> usize {
        self.instructions
            .iter()
            .filter_map(|instruction| match instruction {
                Instruction::Spawn { program, .. } => Some(program.depth() + 1),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    pub(crate) fn decode_nested(input: &mut &[u8], depth: usize) -> Result<Self, DecodeError> {
        if depth > MAX_NESTING {
            return Err(DecodeError::NestingTooDeep(MAX_NESTING));
        }
        let tag = Bytes::decode(input)?;
        let len = read_len(input, 1)?;
        let mut instructions = Vec::with_capacity(len);
        for _ in 0..len {
            instructions.push(Instruction::decode_nested(input, depth)?);
        }
        Ok(Self { tag, instructions })
    }
}

impl Encode for Program {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.tag.encode(out);
        self.instructions.encode(out);
    }
}

impl Decode for Program {
    fn decode(input: &mut &[u8]) -> Result<Self, DecodeError> {
        Self::decode_nested(input, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::asset::{AssetId, Ratio};
    use crate::program::binding::BindingValue;

    fn spawn_chain(levels: usize) -> Program {
        let mut program = Program::new(b"leaf", vec![]);
        for level in 0..levels {
            program = Program::new(
                b"node",
                vec![Instruction::Spawn {
                    network: NetworkId(level as u32),
                    salt: Bytes::from(&[level as u8]),
                    version: 1,
                    program,
                    assets: vec![],
                }],
            );
        }
        program
    }

    #[test]
    fn instruction_tags_follow_declaration_order() {
        let transfer = Instruction::Transfer {
            destination: Destination::Relayer,
            assets: vec![],
        };
        let call = Instruction::Call {
            payload: Bytes::default(),
            bindings: vec![],
        };
        assert_eq!(transfer.encode_to_vec()[0], 0);
        assert_eq!(call.encode_to_vec()[0], 1);
        assert_eq!(spawn_chain(1).instructions[0].encode_to_vec()[0], 2);
    }

    #[test]
    fn destination_tags() {
        assert_eq!(Destination::Account(Address::zero()).encode_to_vec()[0], 0);
        assert_eq!(Destination::Relayer.encode_to_vec(), vec![1]);
        assert_eq!(Destination::Interpreter.encode_to_vec(), vec![2]);
    }

    #[test]
    fn program_preserves_order_and_tag() {
        let program = Program::new(
            b"\x00tag\xff",
            vec![
                Instruction::Call {
                    payload: Bytes::from(vec![0u8; 40]),
                    bindings: vec![
                        Binding::new(20, BindingValue::AssetAmount(AssetId(2), Ratio::new(1, 2))),
                        Binding::new(0, BindingValue::Interpreter),
                    ],
                },
                Instruction::Transfer {
                    destination: Destination::Account(Address([7; 20])),
                    assets: vec![Asset::absolute(AssetId(2), 10), Asset::ratio(AssetId(1), 1, 3)],
                },
            ],
        );
        let bytes = program.encode_to_vec();
        let decoded = Program::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, program);
        assert_eq!(decoded.encode_to_vec(), bytes);
    }

    #[test]
    fn nesting_limit_is_inclusive() {
        let deepest = spawn_chain(MAX_NESTING);
        assert_eq!(deepest.depth(), MAX_NESTING);
        let bytes = deepest.encode_to_vec();
        assert_eq!(Program::from_bytes(&bytes).unwrap(), deepest);

        let too_deep = spawn_chain(MAX_NESTING + 1).encode_to_vec();
        assert_eq!(
            Program::from_bytes(&too_deep),
            Err(DecodeError::NestingTooDeep(MAX_NESTING))
        );
    }

    #[test]
    fn unknown_instruction_tag() {
        let mut bytes = Vec::new();
        Bytes::default().encode(&mut bytes);
        1u64.encode(&mut bytes);
        bytes.push(3);
        assert_eq!(
            Program::from_bytes(&bytes),
            Err(DecodeError::UnknownTag {
                ty: "Instruction",
                tag: 3
            })
        );
    }

    #[test]
    fn truncated_asset_is_eof() {
        let transfer = Instruction::Transfer {
            destination: Destination::Interpreter,
            assets: vec![Asset::absolute(AssetId(1), 5)],
        };
        let bytes = transfer.encode_to_vec();
        assert_eq!(
            Instruction::from_bytes(&bytes[..bytes.len() - 1]),
            Err(DecodeError::UnexpectedEof)
        );
    }
}
