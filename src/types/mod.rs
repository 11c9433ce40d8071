//! Core value types shared by the codec, interpreter and router.
//!
//! - `encoding`: deterministic `Encode`/`Decode` traits used for the wire format
//! - `bytes`: cheap-to-clone byte buffers for payloads, salts and tags
//! - `hash`: SHA3-256 digests used for state keys and identities
//! - `address`: 20-byte addresses of holders, interpreters and contracts

pub mod address;
pub mod bytes;
pub mod encoding;
pub mod hash;
