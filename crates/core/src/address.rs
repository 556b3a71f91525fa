//! Monero base58 addresses.
//!
//! An address is `varint(tag) ++ spend_key ++ view_key [++ payment_id]`
//! followed by the first four bytes of its Keccak-256 hash, rendered in
//! Monero's block-wise base58. The tag encodes both the network and the
//! address kind; which tag a caller expects is passed in explicitly through
//! [`AddressConfig`].

use crate::crypto::PublicKey;
use crate::hash::hash;
use crate::varint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of checksum bytes appended to the payload.
pub const CHECKSUM_SIZE: usize = 4;

/// Length of the payment id carried by integrated addresses.
pub const PAYMENT_ID_SIZE: usize = 8;

/// Errors that can occur while decoding an address.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid base58 encoding")]
    InvalidBase58,

    #[error("address has an invalid checksum")]
    InvalidChecksum,

    #[error("unknown address tag {0}")]
    UnknownTag(u64),

    #[error("address tag {found} does not match expected tag {expected}")]
    InvalidTag { expected: u8, found: u64 },

    #[error("invalid address length: {0} bytes")]
    InvalidLength(usize),
}

pub type Result<T> = std::result::Result<T, AddressError>;

/// Network an address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
    Stagenet,
}

/// Kind of address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressKind {
    #[default]
    Standard,
    /// Standard keys plus an 8-byte payment id.
    Integrated,
    Subaddress,
}

impl Network {
    pub const ALL: [Network; 3] = [Network::Mainnet, Network::Testnet, Network::Stagenet];

    /// Address tags for standard, integrated and subaddress, in that order.
    fn tags(self) -> [u8; 3] {
        match self {
            Network::Mainnet => [18, 19, 42],
            Network::Testnet => [53, 54, 63],
            Network::Stagenet => [24, 25, 36],
        }
    }

    /// The tag for an address of `kind` on this network.
    pub fn tag(self, kind: AddressKind) -> u8 {
        let tags = self.tags();
        match kind {
            AddressKind::Standard => tags[0],
            AddressKind::Integrated => tags[1],
            AddressKind::Subaddress => tags[2],
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => f.write_str("mainnet"),
            Network::Testnet => f.write_str("testnet"),
            Network::Stagenet => f.write_str("stagenet"),
        }
    }
}

impl AddressKind {
    pub const ALL: [AddressKind; 3] = [
        AddressKind::Standard,
        AddressKind::Integrated,
        AddressKind::Subaddress,
    ];

    /// Length of the keys (and payment id) section of the payload.
    fn body_len(self) -> usize {
        match self {
            AddressKind::Integrated => 64 + PAYMENT_ID_SIZE,
            AddressKind::Standard | AddressKind::Subaddress => 64,
        }
    }
}

impl fmt::Display for AddressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressKind::Standard => f.write_str("standard"),
            AddressKind::Integrated => f.write_str("integrated"),
            AddressKind::Subaddress => f.write_str("subaddress"),
        }
    }
}

/// Which address tag a decoder accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddressConfig {
    pub network: Network,
    pub kind: AddressKind,
}

impl AddressConfig {
    pub fn new(network: Network, kind: AddressKind) -> Self {
        Self { network, kind }
    }

    /// The tag selected by this configuration.
    pub fn tag(&self) -> u8 {
        self.network.tag(self.kind)
    }

    /// Find the configuration a tag belongs to.
    pub fn from_tag(tag: u64) -> Option<Self> {
        Network::ALL.into_iter().find_map(|network| {
            AddressKind::ALL
                .into_iter()
                .find(|kind| u64::from(network.tag(*kind)) == tag)
                .map(|kind| Self::new(network, kind))
        })
    }
}

/// A decoded address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub network: Network,
    pub kind: AddressKind,
    pub spend_key: PublicKey,
    pub view_key: PublicKey,
    /// Present only for integrated addresses.
    #[serde(with = "payment_id_hex")]
    pub payment_id: Option<[u8; PAYMENT_ID_SIZE]>,
}

impl Address {
    /// Create a standard address.
    pub fn standard(network: Network, spend_key: PublicKey, view_key: PublicKey) -> Self {
        Self {
            network,
            kind: AddressKind::Standard,
            spend_key,
            view_key,
            payment_id: None,
        }
    }

    /// Create an integrated address.
    pub fn integrated(
        network: Network,
        spend_key: PublicKey,
        view_key: PublicKey,
        payment_id: [u8; PAYMENT_ID_SIZE],
    ) -> Self {
        Self {
            network,
            kind: AddressKind::Integrated,
            spend_key,
            view_key,
            payment_id: Some(payment_id),
        }
    }

    /// Create a subaddress.
    pub fn subaddress(network: Network, spend_key: PublicKey, view_key: PublicKey) -> Self {
        Self {
            network,
            kind: AddressKind::Subaddress,
            spend_key,
            view_key,
            payment_id: None,
        }
    }

    /// The network and kind of this address.
    pub fn config(&self) -> AddressConfig {
        AddressConfig::new(self.network, self.kind)
    }

    /// Decode an address, requiring the tag selected by `config`.
    pub fn decode(text: &str, config: &AddressConfig) -> Result<Self> {
        let payload = Self::checked_payload(text)?;
        let (tag, body) = split_tag(&payload)?;
        let expected = config.tag();
        if tag != u64::from(expected) {
            return Err(AddressError::InvalidTag {
                expected,
                found: tag,
            });
        }
        Self::from_body(*config, body)
    }

    /// Decode an address, inferring network and kind from its tag.
    pub fn parse(text: &str) -> Result<Self> {
        let payload = Self::checked_payload(text)?;
        let (tag, body) = split_tag(&payload)?;
        let config = AddressConfig::from_tag(tag).ok_or(AddressError::UnknownTag(tag))?;
        Self::from_body(config, body)
    }

    /// Base58-decode `text` and strip a verified checksum.
    fn checked_payload(text: &str) -> Result<Vec<u8>> {
        let mut data = base58_monero::decode(text).map_err(|_| AddressError::InvalidBase58)?;
        if data.len() <= CHECKSUM_SIZE {
            return Err(AddressError::InvalidLength(data.len()));
        }
        let split = data.len() - CHECKSUM_SIZE;
        let digest = hash(&data[..split]);
        if digest.as_bytes()[..CHECKSUM_SIZE] != data[split..] {
            return Err(AddressError::InvalidChecksum);
        }
        data.truncate(split);
        Ok(data)
    }

    fn from_body(config: AddressConfig, body: &[u8]) -> Result<Self> {
        if body.len() != config.kind.body_len() {
            return Err(AddressError::InvalidLength(body.len()));
        }

        let mut spend = [0u8; 32];
        let mut view = [0u8; 32];
        spend.copy_from_slice(&body[..32]);
        view.copy_from_slice(&body[32..64]);

        let payment_id = if config.kind == AddressKind::Integrated {
            let mut id = [0u8; PAYMENT_ID_SIZE];
            id.copy_from_slice(&body[64..]);
            Some(id)
        } else {
            None
        };

        Ok(Self {
            network: config.network,
            kind: config.kind,
            spend_key: PublicKey(spend),
            view_key: PublicKey(view),
            payment_id,
        })
    }

    /// The binary payload including the checksum.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = varint::encode(u64::from(self.config().tag()));
        data.extend_from_slice(self.spend_key.as_ref());
        data.extend_from_slice(self.view_key.as_ref());
        if let Some(payment_id) = &self.payment_id {
            data.extend_from_slice(payment_id);
        }
        let checksum = hash(&data);
        data.extend_from_slice(&checksum.as_bytes()[..CHECKSUM_SIZE]);
        data
    }

    /// Encode to the textual base58 form.
    pub fn to_base58(&self) -> Result<String> {
        base58_monero::encode(&self.to_bytes()).map_err(|_| AddressError::InvalidBase58)
    }
}

/// Split the leading tag varint off a checksum-verified payload.
fn split_tag(payload: &[u8]) -> Result<(u64, &[u8])> {
    varint::decode(payload).map_err(|_| AddressError::InvalidLength(payload.len()))
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.to_base58().map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

mod payment_id_hex {
    use super::PAYMENT_ID_SIZE;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(id: &Option<[u8; PAYMENT_ID_SIZE]>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match id {
            Some(bytes) => serializer.serialize_some(&hex::encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<[u8; PAYMENT_ID_SIZE]>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(s) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        let id: [u8; PAYMENT_ID_SIZE] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("payment id must be 8 bytes"))?;
        Ok(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STANDARD: &str = "4AMGENEQLdPGSqhGSgTdzH8dWxWoVwiTfgf2oTjPjxsgbUJS7kkK7euAhm94snzXVhHtZLwAXLiZQ6nDaWmqWHeSTafpXVw";
    const INTEGRATED: &str = "4L3wFB3twtuGSqhGSgTdzH8dWxWoVwiTfgf2oTjPjxsgbUJS7kkK7euAhm94snzXVhHtZLwAXLiZQ6nDaWmqWHeSgTmh7tVYUx65eb5iE7";
    const SUBADDRESS: &str = "8AiHrLaxEACUgytKhaVVEN4JELJ8m9uc5DbXWxTvavKqFYPbMGmPE75N7RFUVHhgxABW7y7tqih6r8CVUWzcc42DBTMihBd";

    #[test]
    fn test_decode_encode_standard() {
        let config = AddressConfig::new(Network::Mainnet, AddressKind::Standard);
        let addr = Address::decode(STANDARD, &config).unwrap();

        assert_eq!(addr.kind, AddressKind::Standard);
        assert_eq!(
            addr.spend_key.to_hex(),
            "e64937643f64325c57b91ca5ed7fea2d9d472dff634d7eed160331db7ad2e7ce"
        );
        assert!(addr.payment_id.is_none());
        assert_eq!(addr.to_string(), STANDARD);
    }

    #[test]
    fn test_decode_encode_integrated() {
        let config = AddressConfig::new(Network::Mainnet, AddressKind::Integrated);
        let addr = Address::decode(INTEGRATED, &config).unwrap();

        assert_eq!(addr.kind, AddressKind::Integrated);
        assert_eq!(addr.payment_id.map(hex::encode).as_deref(), Some("ecddca1865ec3f29"));
        assert_eq!(addr.to_string(), INTEGRATED);
    }

    #[test]
    fn test_decode_encode_subaddress() {
        let config = AddressConfig::new(Network::Mainnet, AddressKind::Subaddress);
        let addr = Address::decode(SUBADDRESS, &config).unwrap();

        assert_eq!(addr.kind, AddressKind::Subaddress);
        assert_eq!(addr.to_string(), SUBADDRESS);
    }

    #[test]
    fn test_parse_infers_config() {
        assert_eq!(
            Address::parse(STANDARD).unwrap().config(),
            AddressConfig::new(Network::Mainnet, AddressKind::Standard)
        );
        assert_eq!(
            STANDARD.parse::<Address>().unwrap().kind,
            AddressKind::Standard
        );
        assert_eq!(
            Address::parse(SUBADDRESS).unwrap().kind,
            AddressKind::Subaddress
        );
    }

    #[test]
    fn test_decode_wrong_config() {
        let config = AddressConfig::new(Network::Stagenet, AddressKind::Standard);
        assert_eq!(
            Address::decode(STANDARD, &config),
            Err(AddressError::InvalidTag {
                expected: 24,
                found: 18
            })
        );
    }

    #[test]
    fn test_corrupted_checksum() {
        let addr = Address::parse(STANDARD).unwrap();
        let mut bytes = addr.to_bytes();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let text = base58_monero::encode(&bytes).unwrap();

        assert_eq!(Address::parse(&text), Err(AddressError::InvalidChecksum));
    }

    #[test]
    fn test_malformed_tag_after_valid_checksum() {
        // Eleven continuation bytes never terminate the tag varint.
        let mut data = vec![0x80; 11];
        data.extend_from_slice(&[0u8; 64]);
        let checksum = hash(&data);
        data.extend_from_slice(&checksum.as_bytes()[..CHECKSUM_SIZE]);
        let text = base58_monero::encode(&data).unwrap();

        assert_eq!(Address::parse(&text), Err(AddressError::InvalidLength(75)));
        assert_eq!(
            Address::decode(&text, &AddressConfig::default()),
            Err(AddressError::InvalidLength(75))
        );
    }

    #[test]
    fn test_invalid_base58() {
        // '0' is not in the alphabet.
        assert_eq!(Address::parse("0000"), Err(AddressError::InvalidBase58));
    }

    #[test]
    fn test_network_change_changes_text() {
        let addr = Address::parse(STANDARD).unwrap();
        let testnet = Address::standard(Network::Testnet, addr.spend_key, addr.view_key);
        let text = testnet.to_string();

        assert_ne!(text, STANDARD);
        assert_eq!(Address::parse(&text).unwrap().network, Network::Testnet);
    }

    #[test]
    fn test_tags_are_unique() {
        let mut tags: Vec<u8> = Network::ALL
            .iter()
            .flat_map(|n| AddressKind::ALL.iter().map(move |k| n.tag(*k)))
            .collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), 9);
    }

    #[test]
    fn test_config_from_tag() {
        assert_eq!(
            AddressConfig::from_tag(63),
            Some(AddressConfig::new(Network::Testnet, AddressKind::Subaddress))
        );
        assert_eq!(AddressConfig::from_tag(0), None);
    }
}
