//! Late-binding placeholders inside Call payloads.

use crate::program::asset::{AssetId, Ratio};
use crate::program::errors::ProgramError;
use crate::types::address::ADDRESS_SIZE;
use std::fmt;
use xcvm_derive::BinaryCodec;

/// Width of a resolved asset identifier or amount (u128, little-endian).
pub const AMOUNT_WIDTH: usize = 16;

/// Value spliced into a Call payload at execution time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, BinaryCodec)]
pub enum BindingValue {
    /// The asset identifier itself.
    AssetId(AssetId),
    /// `floor(balance * n / d)` of the interpreter's holding, read just before the call.
    AssetAmount(AssetId, Ratio),
    /// Address of the executing interpreter.
    Interpreter,
}

impl BindingValue {
    /// Number of payload bytes the resolved value overwrites.
    pub const fn width(&self) -> usize {
        match self {
            BindingValue::AssetId(_) | BindingValue::AssetAmount(..) => AMOUNT_WIDTH,
            BindingValue::Interpreter => ADDRESS_SIZE,
        }
    }
}

impl fmt::Display for BindingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingValue::AssetId(id) => write!(f, "asset-id {id}"),
            BindingValue::AssetAmount(id, ratio) => write!(f, "asset-amount {id} x {ratio}"),
            BindingValue::Interpreter => write!(f, "self"),
        }
    }
}

/// A `(payload offset, value)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, BinaryCodec)]
pub struct Binding {
    pub position: u16,
    pub value: BindingValue,
}

impl Binding {
    pub const fn new(position: u16, value: BindingValue) -> Self {
        Self { position, value }
    }

    /// Byte range this binding overwrites.
    pub fn span(&self) -> std::ops::Range<usize> {
        let start = self.position as usize;
        start..start + self.value.width()
    }
}

/// Checks that every binding fits inside the payload and that no two overlap.
pub fn check_layout(payload_len: usize, bindings: &[Binding]) -> Result<(), ProgramError> {
    let mut spans = Vec::with_capacity(bindings.len());
    for binding in bindings {
        let span = binding.span();
        if span.end > payload_len {
            return Err(ProgramError::InvalidBinding {
                position: binding.position,
                width: binding.value.width(),
                payload_len,
            });
        }
        spans.push((span, binding.position));
    }

    spans.sort_unstable_by_key(|(span, _)| (span.start, span.end));
    for pair in spans.windows(2) {
        let (earlier, earlier_pos) = &pair[0];
        let (later, later_pos) = &pair[1];
        if later.start < earlier.end {
            return Err(ProgramError::OverlappingBinding {
                first: *earlier_pos,
                second: *later_pos,
            });
        }
    }
    Ok(())
}
