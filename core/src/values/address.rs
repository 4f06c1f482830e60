use core::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A 20-byte account or contract address, stored as lowercase `0x` hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(String);

impl Address {
    /// Parse `0x` followed by exactly 40 hex digits, any case.
    pub fn parse(text: &str) -> Option<Self> {
        let hex = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))?;
        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }

    /// Deterministic address derived from a counter, used by the in-memory
    /// chain for accounts and deployments.
    pub fn from_index(prefix: u8, index: u64) -> Self {
        Self(format!("0x{:02x}{:038x}", prefix, index))
    }

    pub fn zero() -> Self {
        Self(format!("0x{}", "0".repeat(40)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Address::parse(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid address `{}`", text)))
    }
}
