//! Serde helpers for token amounts
//!
//! `u128` amounts go over the wire as decimal strings: JSON numbers above
//! 2^53 lose precision in most clients.

use serde::{
    de::{Deserialize, Deserializer},
    ser::Serializer,
};

/// Serialize a `u128` as a decimal string
pub mod amount {
    use super::*;

    pub fn serialize<S>(amount: &u128, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&amount.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u128, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse::<u128>().map_err(serde::de::Error::custom)
    }
}
