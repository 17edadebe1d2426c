use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// Raw key bytes as written in a block script, hex encoded with an optional
/// `0x` prefix. The length is not checked here so that a script can describe
/// a store holding malformed keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HexBytes(pub Vec<u8>);

impl AsRef<[u8]> for HexBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_hex_bytes(deserializer).map(HexBytes)
    }
}

pub fn deserialize_hex_bytes<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let hex_value: String = String::deserialize(deserializer)?;
    hex::decode(hex_value.trim_start_matches("0x"))
        .map_err(|e| D::Error::custom(format!("invalid hex key {:?}: {}", hex_value, e)))
}
