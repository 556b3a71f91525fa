//! Block templates, block headers and hashing blob assembly.

use crate::codec::{CodecError, Reader, Result};
use crate::hash::{hash_concat, Hash};
use crate::merkle::tree_hash;
use crate::transaction::Transaction;
use crate::varint;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The header of a block.
///
/// Every field is a varint on the wire except `prev_id` (32 raw bytes) and
/// `nonce`, which is four raw bytes read as a big-endian `u32`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub major_version: u8,
    pub minor_version: u8,
    /// Unix timestamp in seconds.
    pub timestamp: u64,
    /// Id of the previous block.
    pub prev_id: Hash,
    pub nonce: u32,
}

impl BlockHeader {
    pub fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            major_version: reader.read_varint_u8("major_version")?,
            minor_version: reader.read_varint_u8("minor_version")?,
            timestamp: reader.read_varint()?,
            prev_id: reader.read_hash()?,
            nonce: reader.read_u32_be()?,
        })
    }

    /// Append the header encoding to `buf`.
    pub fn write(&self, buf: &mut Vec<u8>) {
        varint::write(buf, u64::from(self.major_version));
        varint::write(buf, u64::from(self.minor_version));
        varint::write(buf, self.timestamp);
        buf.extend_from_slice(self.prev_id.as_ref());
        buf.extend_from_slice(&self.nonce.to_be_bytes());
    }

    /// Serialize the header with the same layout it is decoded from.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(3 + 2 * varint::MAX_VARINT_LEN + 36);
        self.write(&mut buf);
        buf
    }
}

/// A block: header, miner transaction and the hashes of every other
/// transaction it includes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub miner_tx: Transaction,
    pub tx_hashes: Vec<Hash>,
}

impl Block {
    /// Parse a hex-encoded block template blob as returned by a node.
    pub fn parse_template(blob: &str) -> Result<Self> {
        let bytes = hex::decode(blob)?;
        Self::from_bytes(&bytes)
    }

    /// Parse a raw block blob. The whole input must be consumed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);

        let header = BlockHeader::decode(&mut reader)?;
        let miner_tx = Transaction::decode(&mut reader)?;
        if !miner_tx.is_coinbase() {
            return Err(CodecError::InvalidMinerInput);
        }

        let count = reader.read_count(32)?;
        let mut tx_hashes = Vec::with_capacity(count);
        for _ in 0..count {
            tx_hashes.push(reader.read_hash()?);
        }
        reader.finish()?;

        let block = Self {
            header,
            miner_tx,
            tx_hashes,
        };
        debug!(
            major_version = block.header.major_version,
            minor_version = block.header.minor_version,
            height = ?block.height(),
            txs = block.tx_count(),
            "parsed block"
        );
        Ok(block)
    }

    /// Serialize the full block blob.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.header.write(&mut buf);
        self.miner_tx.write(&mut buf);
        varint::write(&mut buf, self.tx_hashes.len() as u64);
        for tx_hash in &self.tx_hashes {
            buf.extend_from_slice(tx_hash.as_ref());
        }
        buf
    }

    /// Serialize the full block blob as hex, ready for submission.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Replace the header nonce.
    pub fn set_nonce(&mut self, nonce: u32) {
        self.header.nonce = nonce;
    }

    /// Create a copy of this block with a different nonce.
    pub fn with_nonce(mut self, nonce: u32) -> Self {
        self.set_nonce(nonce);
        self
    }

    /// Height claimed by the miner transaction.
    pub fn height(&self) -> Option<u64> {
        self.miner_tx.coinbase_height()
    }

    /// Number of transactions, including the miner transaction.
    pub fn tx_count(&self) -> usize {
        self.tx_hashes.len() + 1
    }

    /// Tree hash of the miner transaction hash followed by `tx_hashes`.
    pub fn merkle_root(&self) -> Hash {
        let mut leaves = Vec::with_capacity(self.tx_count());
        leaves.push(self.miner_tx.hash());
        leaves.extend_from_slice(&self.tx_hashes);
        tree_hash(&leaves)
    }

    /// The blob consumed by the proof-of-work hash:
    /// `header ++ merkle_root ++ varint(tx_count)`.
    pub fn hashing_blob(&self) -> Vec<u8> {
        let root = self.merkle_root();
        let mut blob = self.header.serialize();
        blob.extend_from_slice(root.as_ref());
        varint::write(&mut blob, self.tx_count() as u64);
        debug!(root = %root, len = blob.len(), "assembled hashing blob");
        blob
    }

    /// The block id: hash of the length-prefixed hashing blob.
    pub fn id(&self) -> Hash {
        let blob = self.hashing_blob();
        let len = varint::encode(blob.len() as u64);
        hash_concat(&[len.as_slice(), blob.as_slice()])
    }
}

/// Parse a hex-encoded block template blob.
pub fn parse_template(blob: &str) -> Result<Block> {
    Block::parse_template(blob)
}

/// Serialize a block header.
pub fn serialize_header(header: &BlockHeader) -> Vec<u8> {
    header.serialize()
}

/// Assemble the proof-of-work hashing blob of a block.
pub fn hashing_blob(block: &Block) -> Vec<u8> {
    block.hashing_blob()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::PublicKey;
    use crate::hash::hash;
    use crate::transaction::{RctType, TransactionPrefix, TxIn, TxOut, TxOutTarget};

    fn sample_block(tx_hashes: Vec<Hash>) -> Block {
        Block {
            header: BlockHeader {
                major_version: 16,
                minor_version: 16,
                timestamp: 1_700_000_000,
                prev_id: hash(b"parent"),
                nonce: 0,
            },
            miner_tx: Transaction {
                prefix: TransactionPrefix {
                    version: 2,
                    unlock_time: 3_000_060,
                    inputs: vec![TxIn::Gen { height: 3_000_000 }],
                    outputs: vec![TxOut {
                        amount: 600_000_000_000,
                        target: TxOutTarget::ToTaggedKey {
                            key: PublicKey::from_bytes([0x42; 32]),
                            view_tag: 0x5c,
                        },
                    }],
                    extra: vec![0x02, 0x02, 0xaa, 0xbb],
                },
                signatures: vec![],
                rct_type: Some(RctType::Null),
            },
            tx_hashes,
        }
    }

    #[test]
    fn test_serialize_header_layout() {
        let header = BlockHeader {
            major_version: 1,
            minor_version: 0,
            timestamp: 300,
            prev_id: Hash::ZERO,
            nonce: 0x01020304,
        };
        let bytes = header.serialize();

        assert_eq!(&bytes[..4], &[0x01, 0x00, 0xac, 0x02]);
        assert_eq!(&bytes[4..36], &[0u8; 32]);
        assert_eq!(&bytes[36..], &[0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_header_roundtrip() {
        let header = sample_block(vec![]).header;
        let bytes = header.serialize();
        let mut reader = Reader::new(&bytes);
        assert_eq!(BlockHeader::decode(&mut reader).unwrap(), header);
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn test_block_bytes_roundtrip() {
        let block = sample_block(vec![hash(b"a"), hash(b"b")]);
        let parsed = Block::parse_template(&block.to_hex()).unwrap();
        assert_eq!(parsed, block);
        assert_eq!(parsed.height(), Some(3_000_000));
        assert_eq!(parsed.tx_count(), 3);
    }

    #[test]
    fn test_hashing_blob_layout() {
        let block = sample_block(vec![hash(b"a"), hash(b"b"), hash(b"c")]);
        let header = block.header.serialize();
        let blob = block.hashing_blob();

        assert_eq!(blob.len(), header.len() + 32 + 1);
        assert_eq!(&blob[..header.len()], header.as_slice());
        assert_eq!(
            &blob[header.len()..header.len() + 32],
            block.merkle_root().as_ref()
        );
        assert_eq!(*blob.last().unwrap(), 4);
    }

    #[test]
    fn test_merkle_root_single_tx_is_miner_hash() {
        let block = sample_block(vec![]);
        assert_eq!(block.merkle_root(), block.miner_tx.hash());
    }

    #[test]
    fn test_nonce_changes_id_not_root() {
        let block = sample_block(vec![hash(b"a")]);
        let mutated = block.clone().with_nonce(0xdeadbeef);

        assert_eq!(block.merkle_root(), mutated.merkle_root());
        assert_ne!(block.id(), mutated.id());

        let mut expected = block.header.serialize();
        let len = expected.len();
        expected[len - 4..].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(mutated.header.serialize(), expected);
    }

    #[test]
    fn test_id_is_hash_of_length_prefixed_blob() {
        let block = sample_block(vec![]);
        let blob = block.hashing_blob();
        let mut prefixed = varint::encode(blob.len() as u64);
        prefixed.extend_from_slice(&blob);
        assert_eq!(block.id(), hash(&prefixed));
    }

    #[test]
    fn test_invalid_hex() {
        assert!(matches!(
            Block::parse_template("0g"),
            Err(CodecError::InvalidHex(_))
        ));
        assert!(matches!(
            Block::parse_template("abc"),
            Err(CodecError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_major_version_overflow() {
        let mut bytes = vec![0x80, 0x02];
        bytes.extend_from_slice(&sample_block(vec![]).to_bytes()[1..]);
        assert_eq!(
            Block::from_bytes(&bytes),
            Err(CodecError::FieldOverflow {
                field: "major_version",
                value: 256
            })
        );
    }

    #[test]
    fn test_miner_tx_without_gen_input() {
        let mut block = sample_block(vec![]);
        block.miner_tx.prefix.inputs.push(TxIn::Gen { height: 1 });
        assert_eq!(
            Block::from_bytes(&block.to_bytes()),
            Err(CodecError::InvalidMinerInput)
        );
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = sample_block(vec![]).to_bytes();
        bytes.push(0x00);
        assert_eq!(Block::from_bytes(&bytes), Err(CodecError::TrailingBytes(1)));
    }

    #[test]
    fn test_free_functions_match_methods() {
        let block = sample_block(vec![hash(b"a")]);
        let parsed = parse_template(&block.to_hex()).unwrap();
        assert_eq!(serialize_header(&parsed.header), parsed.header.serialize());
        assert_eq!(hashing_blob(&parsed), parsed.hashing_blob());
    }
}
