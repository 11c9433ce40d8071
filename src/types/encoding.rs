//! Binary encoding and decoding traits for the program wire format.
//!
//! Encoded programs travel between networks running independent copies of the
//! interpreter and are hashed for Spawn de-duplication, so the encoding is
//! canonical: one in-memory value has exactly one byte representation.
//!
//! # Binary Format
//!
//! - Integers: little-endian, fixed-width
//! - `usize`: encoded as `u64`
//! - `bool`: single byte (0 = false, 1 = true)
//! - `Vec<T>`: 8-byte length prefix followed by elements
//! - Arrays `[T; N]`: elements serialized sequentially without length prefix
//! - Enums (derived): 1-byte tag followed by the variant fields

use crate::types::bytes::Bytes;
use xcvm_derive::Error;

/// Sink for writing encoded bytes.
///
/// Implemented by byte buffers and hashers so values can be encoded straight
/// into their destination.
pub trait EncodeSink {
    /// Writes the given bytes to the sink.
    fn write(&mut self, bytes: &[u8]);
}

/// Counts encoded bytes without storing them.
pub struct SizeCounter {
    len: usize,
}

impl SizeCounter {
    pub fn new() -> Self {
        Self { len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }
}

impl EncodeSink for SizeCounter {
    fn write(&mut self, bytes: &[u8]) {
        self.len += bytes.len();
    }
}

impl EncodeSink for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// Trait for types that can be serialized to binary format.
pub trait Encode {
    /// Writes the binary representation to the given sink.
    fn encode<S: EncodeSink>(&self, out: &mut S);

    /// Returns the number of bytes `encode` would write.
    fn encoded_len(&self) -> usize {
        let mut counter = SizeCounter::new();
        self.encode(&mut counter);
        counter.len()
    }

    /// Serializes to a new buffer with exact capacity.
    fn encode_to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.encode(&mut out);
        out
    }

    /// Serializes to a shared [`Bytes`] buffer.
    fn to_bytes(&self) -> Bytes {
        Bytes::from_vec(self.encode_to_vec())
    }
}

/// Errors that can occur during decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Input ended before expected data was read.
    #[error("unexpected end of input")]
    UnexpectedEof,
    /// Data does not represent a valid value for the target type.
    #[error("invalid value")]
    InvalidValue,
    /// Length prefix does not fit in `usize` on this platform.
    #[error("length prefix {0} exceeds limit")]
    LengthOverflow(u64),
    /// Enum tag outside the known set of variants.
    #[error("unknown {ty} tag {tag}")]
    UnknownTag { ty: &'static str, tag: u8 },
    /// Bytes remained after the value was fully decoded.
    #[error("{0} trailing bytes")]
    TrailingBytes(usize),
    /// Recursive structure nested deeper than allowed.
    #[error("nesting deeper than {0} levels")]
    NestingTooDeep(usize),
    /// Envelope does not start with the expected magic bytes.
    #[error("bad magic")]
    BadMagic,
    /// Envelope carries a format version this build cannot read.
    #[error("unsupported format version {major}.{minor}.{patch}")]
    UnsupportedVersion { major: u8, minor: u8, patch: u8 },
}

/// Trait for types that can be deserialized from binary format.
pub trait Decode: Sized {
    /// Reads and decodes a value from the input buffer.
    ///
    /// Advances the input slice past the consumed bytes.
    fn decode(input: &mut &[u8]) -> Result<Self, DecodeError>;

    /// Decodes a value from a byte slice, requiring all bytes to be consumed.
    fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        let mut input = data;
        let value = Self::decode(&mut input)?;

        if !input.is_empty() {
            return Err(DecodeError::TrailingBytes(input.len()));
        }

        Ok(value)
    }
}

/// Reads exactly `n` bytes from the input, advancing the slice.
pub(crate) fn read_bytes<'a>(input: &mut &'a [u8], n: usize) -> Result<&'a [u8], DecodeError> {
    if input.len() < n {
        return Err(DecodeError::UnexpectedEof);
    }
    let (bytes, rest) = input.split_at(n);
    *input = rest;
    Ok(bytes)
}

/// Reads a u64 length prefix and checks it against what can still be read.
///
/// `min_item_len` is the smallest encoding of one element; a prefix that
/// promises more elements than the remaining input could hold is rejected
/// before anything is allocated. There is no other cap, so anything `encode`
/// writes decodes again.
pub(crate) fn read_len(input: &mut &[u8], min_item_len: usize) -> Result<usize, DecodeError> {
    let len = u64::decode(input)?;
    let len = usize::try_from(len).map_err(|_| DecodeError::LengthOverflow(len))?;
    if len.saturating_mul(min_item_len) > input.len() {
        return Err(DecodeError::UnexpectedEof);
    }
    Ok(len)
}

impl Encode for u8 {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        out.write(&[*self]);
    }
}

impl Decode for u8 {
    fn decode(input: &mut &[u8]) -> Result<Self, DecodeError> {
        Ok(read_bytes(input, 1)?[0])
    }
}

macro_rules! impl_int {
    ($($t:ty),*) => {
        $(
            impl Encode for $t {
                fn encode<S: EncodeSink>(&self, out: &mut S) {
                    out.write(&self.to_le_bytes());
                }
            }

            impl Decode for $t {
                fn decode(input: &mut &[u8]) -> Result<Self, DecodeError> {
                    const WIDTH: usize = std::mem::size_of::<$t>();
                    let mut buf = [0u8; WIDTH];
                    buf.copy_from_slice(read_bytes(input, WIDTH)?);
                    Ok(<$t>::from_le_bytes(buf))
                }
            }
        )*
    };
}

impl_int!(u16, u32, u64, u128);

impl Encode for usize {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        (*self as u64).encode(out);
    }
}

impl Decode for usize {
    fn decode(input: &mut &[u8]) -> Result<Self, DecodeError> {
        let v = u64::decode(input)?;
        usize::try_from(v).map_err(|_| DecodeError::LengthOverflow(v))
    }
}

impl Encode for bool {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        out.write(&[*self as u8]);
    }
}

impl Decode for bool {
    fn decode(input: &mut &[u8]) -> Result<Self, DecodeError> {
        match u8::decode(input)? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(DecodeError::InvalidValue),
        }
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.len().encode(out);
        for item in self {
            item.encode(out);
        }
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(input: &mut &[u8]) -> Result<Self, DecodeError> {
        let len = read_len(input, 1)?;
        let mut vec = Vec::with_capacity(len);
        for _ in 0..len {
            vec.push(T::decode(input)?);
        }
        Ok(vec)
    }
}

impl<const N: usize> Encode for [u8; N] {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        out.write(self);
    }
}

impl<const N: usize> Decode for [u8; N] {
    fn decode(input: &mut &[u8]) -> Result<Self, DecodeError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(read_bytes(input, N)?);
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_counter_accumulates() {
        let mut counter = SizeCounter::new();
        assert_eq!(counter.len(), 0);

        counter.write(&[1, 2, 3]);
        counter.write(&[4, 5]);
        assert_eq!(counter.len(), 5);
    }

    #[test]
    fn encode_to_vec_preallocates_exact_capacity() {
        let data: Vec<u8> = vec![1, 2, 3, 4, 5];
        let bytes = data.encode_to_vec();
        assert_eq!(bytes.len(), 8 + 5);
        assert_eq!(bytes.capacity(), bytes.len());
        assert_eq!(data.encoded_len(), 13);
    }

    #[test]
    fn u32_little_endian() {
        let val: u32 = 0x12345678;
        let bytes = val.encode_to_vec();
        assert_eq!(bytes, vec![0x78, 0x56, 0x34, 0x12]);
        assert_eq!(u32::from_bytes(&bytes).unwrap(), val);
    }

    #[test]
    fn u128_is_sixteen_bytes() {
        let val: u128 = 0x0123456789ABCDEF_FEDCBA9876543210;
        let bytes = val.encode_to_vec();
        assert_eq!(bytes.len(), 16);
        assert_eq!(bytes[0], 0x10);
        assert_eq!(u128::from_bytes(&bytes).unwrap(), val);
    }

    #[test]
    fn bool_rejects_values_above_one() {
        assert!(!bool::from_bytes(&[0]).unwrap());
        assert!(bool::from_bytes(&[1]).unwrap());
        assert_eq!(bool::from_bytes(&[2]), Err(DecodeError::InvalidValue));
    }

    #[test]
    fn vec_encoding_format() {
        let vec: Vec<u8> = vec![0xAA, 0xBB, 0xCC];
        let bytes = vec.encode_to_vec();
        assert_eq!(&bytes[0..8], &3u64.to_le_bytes());
        assert_eq!(&bytes[8..], &[0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn vec_length_beyond_input_is_rejected() {
        let mut bytes = Vec::new();
        10u64.encode(&mut bytes);
        bytes.extend_from_slice(&[1, 2, 3]);
        assert_eq!(Vec::<u8>::from_bytes(&bytes), Err(DecodeError::UnexpectedEof));
    }

    #[test]
    fn huge_length_prefix_is_eof_not_allocation() {
        let bytes = u64::MAX.encode_to_vec();
        assert_eq!(Vec::<u8>::from_bytes(&bytes), Err(DecodeError::UnexpectedEof));
    }

    #[test]
    fn long_sequence_decodes() {
        let data = vec![7u8; (1 << 20) + 1];
        assert_eq!(Vec::<u8>::from_bytes(&data.encode_to_vec()), Ok(data));
    }

    #[test]
    fn every_integer_width_roundtrips() {
        assert_eq!(u16::from_bytes(&0xBEEFu16.encode_to_vec()), Ok(0xBEEF));
        assert_eq!(u64::from_bytes(&u64::MAX.encode_to_vec()), Ok(u64::MAX));
        assert_eq!(u128::from_bytes(&(u128::MAX - 1).encode_to_vec()), Ok(u128::MAX - 1));
    }

    #[test]
    fn array_has_no_length_prefix() {
        let arr: [u8; 4] = [1, 2, 3, 4];
        assert_eq!(arr.encode_to_vec(), vec![1, 2, 3, 4]);
        assert_eq!(<[u8; 4]>::from_bytes(&[1, 2, 3, 4]).unwrap(), arr);
    }

    #[test]
    fn truncated_integer_is_eof() {
        assert_eq!(u32::from_bytes(&[0x12, 0x34]), Err(DecodeError::UnexpectedEof));
        assert_eq!(u128::from_bytes(&[0; 15]), Err(DecodeError::UnexpectedEof));
    }

    #[test]
    fn trailing_bytes_error() {
        assert_eq!(u8::from_bytes(&[42u8, 0xFF, 0xFF]), Err(DecodeError::TrailingBytes(2)));
    }

    #[test]
    fn decode_advances_input() {
        let mut input: &[u8] = &[0x01, 0x02, 0x03, 0x04, 0x05];

        assert_eq!(u8::decode(&mut input).unwrap(), 0x01);
        assert_eq!(input.len(), 4);

        assert_eq!(u16::decode(&mut input).unwrap(), 0x0302);
        assert_eq!(input.len(), 2);
    }

    #[test]
    fn decode_error_messages() {
        let err = DecodeError::UnknownTag {
            ty: "Instruction",
            tag: 9,
        };
        assert_eq!(err.to_string(), "unknown Instruction tag 9");
        assert_eq!(DecodeError::TrailingBytes(3).to_string(), "3 trailing bytes");
    }
}
