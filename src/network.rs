//! Network identifiers
//!
//! Providers report the network as a decimal `net_version` string, a numeric
//! JSON value, or a hex `chainId` on `chainChanged`. Everything is
//! normalized to the decimal form used as deployment-table keys.

use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(String);

impl NetworkId {
    /// Parse a decimal or `0x`-prefixed hex identifier
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let value = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => raw.parse::<u64>(),
        };

        value
            .map(Self::from)
            .map_err(|_| SyncError::TransportError(format!("invalid network id {:?}", raw)))
    }

    /// Normalize a JSON value returned by the provider
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::String(s) => Self::parse(s),
            serde_json::Value::Number(n) => n
                .as_u64()
                .map(Self::from)
                .ok_or_else(|| SyncError::TransportError(format!("invalid network id {}", n))),
            other => Err(SyncError::TransportError(format!(
                "unexpected network id payload: {}",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for NetworkId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for NetworkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
