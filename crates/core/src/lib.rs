//! CryptoNote block template codec.
//!
//! This crate decodes and re-encodes the block templates handed out by a
//! Monero-style node and assembles the blob that a miner hashes:
//! - Varints and a bounds-checked byte reader
//! - Transactions (prefix, miner input, outputs)
//! - Blocks and block headers
//! - The CryptoNote tree hash
//! - Base58 addresses

pub mod address;
pub mod block;
pub mod codec;
pub mod crypto;
pub mod hash;
pub mod merkle;
pub mod transaction;
pub mod varint;

// Re-export commonly used types at the crate root
pub use address::{Address, AddressConfig, AddressError, AddressKind, Network};
pub use block::{hashing_blob, parse_template, serialize_header, Block, BlockHeader};
pub use codec::{CodecError, Reader, Result, VariantKind};
pub use crypto::{KeyImage, PublicKey, Signature};
pub use hash::{hash, hash_concat, Hash, H256};
pub use merkle::tree_hash;
pub use transaction::{RctType, Transaction, TransactionPrefix, TxIn, TxOut, TxOutTarget};
