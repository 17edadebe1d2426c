use crate::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const BTC_KEY_LEN: usize = 32;

/// A BIP-340 (x-only) public key as stored in the staking registries.
///
/// Only the length is checked on decoding, curve membership is the concern of
/// whoever registered the key. Keys order by their raw bytes, which is also
/// the order of the persisted keyspace.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BtcKey([u8; BTC_KEY_LEN]);

pub type ValidatorKey = BtcKey;
pub type DelegatorKey = BtcKey;

impl BtcKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        <[u8; BTC_KEY_LEN]>::try_from(bytes)
            .map(Self)
            .map_err(|_| Error::InvalidKeyLength {
                expected: BTC_KEY_LEN,
                actual: bytes.len(),
            })
    }

    pub fn from_hex(hex: &str) -> Result<Self, Error> {
        let bytes = hex::decode(hex.trim_start_matches("0x"))?;
        Self::from_bytes(&bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; BTC_KEY_LEN] {
        &self.0
    }
}

impl From<[u8; BTC_KEY_LEN]> for BtcKey {
    fn from(bytes: [u8; BTC_KEY_LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for BtcKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for BtcKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for BtcKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for BtcKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BtcKey({})", self.to_hex())
    }
}

impl Serialize for BtcKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for BtcKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            deserializer.deserialize_str(deser::BtcKeyVisitor)
        } else {
            deserializer.deserialize_bytes(deser::BtcKeyVisitor)
        }
    }
}

mod deser {
    use super::*;
    use serde::de::{self, Visitor};

    pub(super) struct BtcKeyVisitor;

    impl<'de> Visitor<'de> for BtcKeyVisitor {
        type Value = BtcKey;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a 32 bytes BIP-340 public key")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            BtcKey::from_hex(v).map_err(|e| E::custom(format!("invalid BTC key: {}", e)))
        }

        fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
            BtcKey::from_bytes(v).map_err(|e| E::custom(format!("invalid BTC key: {}", e)))
        }
    }
}
