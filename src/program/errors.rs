use crate::types::encoding::DecodeError;
use xcvm_derive::Error;

/// Reasons a program is rejected before any instruction runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramError {
    /// The bytes are not a valid encoded program.
    #[error("malformed encoding: {0}")]
    MalformedEncoding(#[from] DecodeError),
    /// Two bindings of one Call write to the same payload bytes.
    #[error("binding at offset {second} overlaps binding at offset {first}")]
    OverlappingBinding { first: u16, second: u16 },
    /// A binding would write past the end of its payload.
    #[error("binding at offset {position} needs {width} bytes but payload is {payload_len} bytes")]
    InvalidBinding {
        position: u16,
        width: usize,
        payload_len: usize,
    },
    /// A ratio with denominator zero.
    #[error("ratio denominator is zero")]
    ZeroDenominator,
}
