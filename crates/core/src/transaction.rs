//! Transaction prefixes, tagged inputs/outputs and transaction hashing.
//!
//! The prefix layout is the one the transaction hash is defined over:
//!
//! ```text
//! version:varint unlock_time:varint
//! vin_count:varint  { tag:u8 payload }*
//! vout_count:varint { amount:varint tag:u8 payload }*
//! extra_len:varint extra:[u8]
//! ```
//!
//! Version 1 transactions are followed by one ring of signatures per input.
//! Version 2 and later are followed by a RingCT type byte; only type 0 (no
//! RingCT payload) is supported.

use crate::codec::{CodecError, Reader, Result, VariantKind};
use crate::crypto::{KeyImage, PublicKey, Signature};
use crate::hash::{hash, hash_concat, Hash};
use crate::varint;
use serde::{Deserialize, Serialize};
use tracing::trace;

// Input variant tags. The coinbase tag is 0xff on the wire, not 0; the
// Monero genesis block id only reproduces with 0xff.
const TXIN_GEN: u8 = 0xff;
const TXIN_TO_KEY: u8 = 0x02;

// Output variant tags.
const TXOUT_TO_KEY: u8 = 0x02;
const TXOUT_TO_TAGGED_KEY: u8 = 0x03;

// Smallest encodings, used to bound element counts before allocating.
const MIN_INPUT_LEN: usize = 2;
const MIN_OUTPUT_LEN: usize = 34;

/// A transaction input. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxIn {
    /// Coinbase input, identified by the height of the block it mints.
    Gen { height: u64 },
    /// Spend of a ring of previous outputs.
    ToKey {
        amount: u64,
        key_offsets: Vec<u64>,
        key_image: KeyImage,
    },
}

impl TxIn {
    /// Wire tag of this variant.
    pub fn tag(&self) -> u8 {
        match self {
            TxIn::Gen { .. } => TXIN_GEN,
            TxIn::ToKey { .. } => TXIN_TO_KEY,
        }
    }

    /// Number of ring signatures a version 1 transaction carries for this input.
    pub fn ring_size(&self) -> usize {
        match self {
            TxIn::Gen { .. } => 0,
            TxIn::ToKey { key_offsets, .. } => key_offsets.len(),
        }
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        let tag = reader.read_u8()?;
        match tag {
            TXIN_GEN => Ok(TxIn::Gen {
                height: reader.read_varint()?,
            }),
            TXIN_TO_KEY => {
                let amount = reader.read_varint()?;
                let count = reader.read_count(1)?;
                let mut key_offsets = Vec::with_capacity(count);
                for _ in 0..count {
                    key_offsets.push(reader.read_varint()?);
                }
                let key_image = KeyImage(reader.read_array()?);
                Ok(TxIn::ToKey {
                    amount,
                    key_offsets,
                    key_image,
                })
            }
            _ => Err(CodecError::UnsupportedVariant {
                kind: VariantKind::Input,
                tag,
            }),
        }
    }

    fn write(&self, buf: &mut Vec<u8>) {
        buf.push(self.tag());
        match self {
            TxIn::Gen { height } => varint::write(buf, *height),
            TxIn::ToKey {
                amount,
                key_offsets,
                key_image,
            } => {
                varint::write(buf, *amount);
                varint::write(buf, key_offsets.len() as u64);
                for offset in key_offsets {
                    varint::write(buf, *offset);
                }
                buf.extend_from_slice(&key_image.0);
            }
        }
    }
}

/// Destination of a transaction output. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxOutTarget {
    ToKey { key: PublicKey },
    /// Output key with a one-byte view tag for faster wallet scanning.
    ToTaggedKey { key: PublicKey, view_tag: u8 },
}

impl TxOutTarget {
    /// Wire tag of this variant.
    pub fn tag(&self) -> u8 {
        match self {
            TxOutTarget::ToKey { .. } => TXOUT_TO_KEY,
            TxOutTarget::ToTaggedKey { .. } => TXOUT_TO_TAGGED_KEY,
        }
    }

    /// The one-time output key.
    pub fn key(&self) -> &PublicKey {
        match self {
            TxOutTarget::ToKey { key } | TxOutTarget::ToTaggedKey { key, .. } => key,
        }
    }
}

/// A transaction output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOut {
    /// Amount in atomic units (zero for RingCT outputs).
    pub amount: u64,
    pub target: TxOutTarget,
}

impl TxOut {
    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        let amount = reader.read_varint()?;
        let tag = reader.read_u8()?;
        let target = match tag {
            TXOUT_TO_KEY => TxOutTarget::ToKey {
                key: PublicKey(reader.read_array()?),
            },
            TXOUT_TO_TAGGED_KEY => TxOutTarget::ToTaggedKey {
                key: PublicKey(reader.read_array()?),
                view_tag: reader.read_u8()?,
            },
            _ => {
                return Err(CodecError::UnsupportedVariant {
                    kind: VariantKind::Output,
                    tag,
                })
            }
        };
        Ok(TxOut { amount, target })
    }

    fn write(&self, buf: &mut Vec<u8>) {
        varint::write(buf, self.amount);
        buf.push(self.target.tag());
        buf.extend_from_slice(&self.target.key().0);
        if let TxOutTarget::ToTaggedKey { view_tag, .. } = &self.target {
            buf.push(*view_tag);
        }
    }
}

/// The signed part of a transaction. Input and output order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionPrefix {
    pub version: u64,
    /// Height or timestamp before which the outputs cannot be spent.
    pub unlock_time: u64,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    /// Opaque extra field (transaction public key, extra nonce, ...).
    #[serde(with = "hex::serde")]
    pub extra: Vec<u8>,
}

impl TransactionPrefix {
    pub fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        let version = reader.read_varint()?;
        let unlock_time = reader.read_varint()?;

        let input_count = reader.read_count(MIN_INPUT_LEN)?;
        let mut inputs = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            inputs.push(TxIn::decode(reader)?);
        }

        let output_count = reader.read_count(MIN_OUTPUT_LEN)?;
        let mut outputs = Vec::with_capacity(output_count);
        for _ in 0..output_count {
            outputs.push(TxOut::decode(reader)?);
        }

        let extra_len = reader.read_count(1)?;
        let extra = reader.read_bytes(extra_len)?.to_vec();

        Ok(Self {
            version,
            unlock_time,
            inputs,
            outputs,
            extra,
        })
    }

    /// Append the hashed prefix layout to `buf`.
    pub fn write(&self, buf: &mut Vec<u8>) {
        varint::write(buf, self.version);
        varint::write(buf, self.unlock_time);

        varint::write(buf, self.inputs.len() as u64);
        for input in &self.inputs {
            input.write(buf);
        }

        varint::write(buf, self.outputs.len() as u64);
        for output in &self.outputs {
            output.write(buf);
        }

        varint::write(buf, self.extra.len() as u64);
        buf.extend_from_slice(&self.extra);
    }

    /// Serialize the prefix exactly as it is hashed.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.write(&mut buf);
        buf
    }

    /// Hash of the serialized prefix.
    pub fn hash(&self) -> Hash {
        hash(&self.serialize())
    }
}

/// RingCT signature type. Only the empty type is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RctType {
    /// No RingCT payload (type 0), as carried by miner transactions.
    Null,
}

impl RctType {
    pub fn tag(self) -> u8 {
        match self {
            RctType::Null => 0,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(RctType::Null),
            _ => Err(CodecError::UnsupportedVariant {
                kind: VariantKind::RingCt,
                tag,
            }),
        }
    }
}

/// A full transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub prefix: TransactionPrefix,
    /// Version 1 ring signatures, one ring per input. Empty for version 2+.
    pub signatures: Vec<Vec<Signature>>,
    /// RingCT type for version 2+, `None` for version 1.
    pub rct_type: Option<RctType>,
}

impl Transaction {
    /// Decode a transaction from the reader's current position.
    pub fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        let prefix = TransactionPrefix::decode(reader)?;

        let (signatures, rct_type) = if prefix.version == 0 {
            return Err(CodecError::UnsupportedVersion(0));
        } else if prefix.version == 1 {
            let mut signatures = Vec::with_capacity(prefix.inputs.len());
            for input in &prefix.inputs {
                let mut ring = Vec::with_capacity(input.ring_size());
                for _ in 0..input.ring_size() {
                    ring.push(Signature(reader.read_array()?));
                }
                signatures.push(ring);
            }
            (signatures, None)
        } else {
            (Vec::new(), Some(RctType::from_tag(reader.read_u8()?)?))
        };

        trace!(
            version = prefix.version,
            inputs = prefix.inputs.len(),
            outputs = prefix.outputs.len(),
            extra_len = prefix.extra.len(),
            "decoded transaction"
        );

        Ok(Self {
            prefix,
            signatures,
            rct_type,
        })
    }

    /// Decode a standalone transaction blob.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let tx = Self::decode(&mut reader)?;
        reader.finish()?;
        Ok(tx)
    }

    /// Decode a hex-encoded transaction blob.
    pub fn from_hex(s: &str) -> Result<Self> {
        Self::from_bytes(&hex::decode(s)?)
    }

    /// Append the full transaction blob to `buf`.
    pub fn write(&self, buf: &mut Vec<u8>) {
        self.prefix.write(buf);
        for ring in &self.signatures {
            for signature in ring {
                buf.extend_from_slice(&signature.0);
            }
        }
        if let Some(rct_type) = self.rct_type {
            buf.push(rct_type.tag());
        }
    }

    /// Serialize the full transaction blob.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.write(&mut buf);
        buf
    }

    /// Hash of the transaction prefix.
    pub fn prefix_hash(&self) -> Hash {
        self.prefix.hash()
    }

    /// Transaction id.
    ///
    /// Version 2+ hashes three 32-byte parts: the prefix hash, the hash of
    /// the RingCT base (just the type byte for type 0), and the hash of the
    /// prunable RingCT data, which is the zero hash when there is none.
    /// Version 1 hashes the whole blob.
    pub fn hash(&self) -> Hash {
        match self.rct_type {
            Some(rct_type) => {
                let base = hash(&[rct_type.tag()]);
                hash_concat(&[
                    self.prefix_hash().as_ref(),
                    base.as_ref(),
                    Hash::ZERO.as_ref(),
                ])
            }
            None => hash(&self.to_bytes()),
        }
    }

    /// Whether this is a coinbase (miner) transaction.
    pub fn is_coinbase(&self) -> bool {
        matches!(self.prefix.inputs.as_slice(), [TxIn::Gen { .. }])
    }

    /// Block height claimed by a coinbase input.
    pub fn coinbase_height(&self) -> Option<u64> {
        match self.prefix.inputs.as_slice() {
            [TxIn::Gen { height }] => Some(*height),
            _ => None,
        }
    }

    /// Sum of the explicit output amounts.
    pub fn total_output(&self) -> u64 {
        self.prefix
            .outputs
            .iter()
            .fold(0u64, |acc, out| acc.saturating_add(out.amount))
    }
}
