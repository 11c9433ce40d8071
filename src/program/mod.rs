//! Program representation and its binary wire format.
//!
//! - `asset`: asset identifiers and balance selectors
//! - `binding`: late-binding placeholders for Call payloads
//! - `instruction`: `Program`, `Instruction` and `Destination`
//! - `codec`: the enveloped wire format, hashing and validation

pub mod asset;
pub mod binding;
pub mod codec;
mod display;
pub mod errors;
pub mod instruction;

pub use asset::{Asset, AssetId, Balance, NetworkId, Ratio};
pub use binding::{Binding, BindingValue};
pub use codec::{decode, encode};
pub use errors::ProgramError;
pub use instruction::{Destination, Instruction, Program};
