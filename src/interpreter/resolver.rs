//! Late binding: splicing live values into Call payloads.
//!
//! Every value is computed before the first byte is written, so a failing
//! binding leaves nothing half-patched.

use crate::interpreter::errors::ExecutionError;
use crate::program::binding::{Binding, BindingValue, check_layout};
use crate::program::AssetId;
use crate::types::address::Address;
use crate::types::bytes::Bytes;

/// Runtime values a binding can refer to.
pub trait LiveValues {
    /// Address of the executing interpreter.
    fn self_address(&self) -> Address;
    /// The interpreter's current holding of `asset`.
    fn balance(&self, asset: AssetId) -> Result<u128, ExecutionError>;
}

/// Canonical bytes for one binding, read from live state now.
pub fn resolve_value(
    value: &BindingValue,
    live: &impl LiveValues,
) -> Result<Vec<u8>, ExecutionError> {
    match value {
        BindingValue::AssetId(asset) => Ok(asset.0.to_le_bytes().to_vec()),
        BindingValue::AssetAmount(asset, ratio) => {
            let amount = ratio.of(*asset, live.balance(*asset)?)?;
            Ok(amount.to_le_bytes().to_vec())
        }
        BindingValue::Interpreter => Ok(live.self_address().0.to_vec()),
    }
}

/// Returns `payload` with every binding's range overwritten by its resolved value.
pub fn resolve_payload(
    payload: &[u8],
    bindings: &[Binding],
    live: &impl LiveValues,
) -> Result<Bytes, ExecutionError> {
    check_layout(payload.len(), bindings)?;

    let splices = bindings
        .iter()
        .map(|binding| Ok((binding.span(), resolve_value(&binding.value, live)?)))
        .collect::<Result<Vec<_>, ExecutionError>>()?;

    let mut resolved = payload.to_vec();
    for (span, bytes) in splices {
        resolved[span].copy_from_slice(&bytes);
    }
    Ok(Bytes::from_vec(resolved))
}
