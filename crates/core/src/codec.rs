//! Error taxonomy and the bounds-checked reader shared by the blob decoders.

use crate::hash::Hash;
use crate::varint;
use std::fmt;
use thiserror::Error;
use tracing::trace;

/// Which tagged union a variant tag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantKind {
    Input,
    Output,
    RingCt,
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantKind::Input => f.write_str("input"),
            VariantKind::Output => f.write_str("output"),
            VariantKind::RingCt => f.write_str("ringct"),
        }
    }
}

/// Errors raised while decoding blocks and transactions.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodecError {
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("varint ended before its terminating byte")]
    TruncatedInput,

    #[error("blob truncated at offset {offset}: need {needed} bytes, {remaining} remaining")]
    TruncatedBlob {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("varint does not fit in 64 bits")]
    VarintOverflow,

    #[error("varint is not minimally encoded")]
    NonCanonicalVarint,

    #[error("unsupported {kind} variant tag 0x{tag:02x}")]
    UnsupportedVariant { kind: VariantKind, tag: u8 },

    #[error("{field} value {value} is out of range")]
    FieldOverflow { field: &'static str, value: u64 },

    #[error("unsupported transaction version {0}")]
    UnsupportedVersion(u64),

    #[error("miner transaction must have exactly one gen input")]
    InvalidMinerInput,

    #[error("{0} unexpected trailing bytes")]
    TrailingBytes(usize),
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

/// A cursor over a byte blob. Every read is bounds-checked and reports
/// [`CodecError::TruncatedBlob`] instead of reading past the end.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn truncated(&self, needed: usize) -> CodecError {
        CodecError::TruncatedBlob {
            offset: self.pos,
            needed,
            remaining: self.remaining(),
        }
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(self.truncated(len));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut arr = [0u8; N];
        arr.copy_from_slice(self.read_bytes(N)?);
        Ok(arr)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let [byte] = self.read_array::<1>()?;
        Ok(byte)
    }

    pub fn read_u32_be(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_hash(&mut self) -> Result<Hash> {
        Ok(Hash(self.read_array()?))
    }

    /// Read a varint. Running out of input mid-varint is reported as a
    /// truncated blob.
    pub fn read_varint(&mut self) -> Result<u64> {
        let rest = &self.data[self.pos..];
        match varint::decode(rest) {
            Ok((value, tail)) => {
                self.pos += rest.len() - tail.len();
                Ok(value)
            }
            Err(CodecError::TruncatedInput) => Err(self.truncated(rest.len() + 1)),
            Err(e) => Err(e),
        }
    }

    /// Read a varint that must fit in a `u8`.
    pub fn read_varint_u8(&mut self, field: &'static str) -> Result<u8> {
        let value = self.read_varint()?;
        u8::try_from(value).map_err(|_| CodecError::FieldOverflow { field, value })
    }

    /// Read an element count, rejecting counts whose elements (each at least
    /// `min_item_len` bytes) cannot fit in the remaining input.
    ///
    /// On rejection `needed` is the size of the smallest count that no longer
    /// fits, not the size of the claimed count.
    pub fn read_count(&mut self, min_item_len: usize) -> Result<usize> {
        let min_item_len = min_item_len.max(1);
        let count = self.read_varint()?;
        let max = self.remaining() / min_item_len;
        if count > max as u64 {
            trace!(count, max, "element count exceeds input");
            return Err(self.truncated((max + 1) * min_item_len));
        }
        Ok(count as usize)
    }

    /// Consume the reader, failing if any input is left over.
    pub fn finish(self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(CodecError::TrailingBytes(n)),
        }
    }
}
