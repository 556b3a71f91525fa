//! Base-128 little-endian variable-length integers.
//!
//! Each byte carries seven value bits, least significant group first; the high
//! bit is set on every byte except the last. A `u64` needs at most ten bytes.

use crate::codec::{CodecError, Result};

/// Widest encoding of a `u64`.
pub const MAX_VARINT_LEN: usize = 10;

/// Encode a value with the minimal number of bytes.
pub fn encode(value: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(MAX_VARINT_LEN);
    write(&mut buf, value);
    buf
}

/// Append the encoding of `value` to `buf`.
pub fn write(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Decode a varint from the front of `bytes`, returning the value and the
/// unconsumed tail.
///
/// # Errors
///
/// - [`CodecError::TruncatedInput`] if the input ends before a terminating byte.
/// - [`CodecError::VarintOverflow`] if the value needs more than 64 bits.
/// - [`CodecError::NonCanonicalVarint`] if the encoding is padded with a
///   trailing zero group.
pub fn decode(bytes: &[u8]) -> Result<(u64, &[u8])> {
    let mut value = 0u64;

    for (i, &byte) in bytes.iter().enumerate() {
        // The tenth byte holds bit 63 only and must terminate.
        if i == MAX_VARINT_LEN - 1 && byte > 1 {
            return Err(CodecError::VarintOverflow);
        }

        value |= u64::from(byte & 0x7f) << (7 * i);

        if byte & 0x80 == 0 {
            if byte == 0 && i > 0 {
                return Err(CodecError::NonCanonicalVarint);
            }
            return Ok((value, &bytes[i + 1..]));
        }
    }

    Err(CodecError::TruncatedInput)
}

/// Number of bytes `value` occupies once encoded.
pub fn encoded_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}
