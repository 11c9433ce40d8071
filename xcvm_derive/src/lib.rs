//! Derive macros for the xcvm crate.
//!
//! Provides:
//! - `#[derive(BinaryCodec)]` - deterministic wire encoding for program types
//! - `#[derive(Error)]` - `Display`/`Error` boilerplate with `#[from]` conversions

mod binary_codec;
mod error;

use proc_macro::TokenStream;

/// Implements `Encode` and `Decode` using the crate's wire format.
#[proc_macro_derive(BinaryCodec)]
pub fn derive_binary_codec(input: TokenStream) -> TokenStream {
    binary_codec::derive_binary_codec(input)
}

/// Implements `Display`, `Error` and optional `From` conversions for error types.
#[proc_macro_derive(Error, attributes(error, from))]
pub fn derive_error(input: TokenStream) -> TokenStream {
    error::derive_error(input)
}
