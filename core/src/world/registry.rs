//! Contract registry and its per-network JSON file.
//!
//! The file maps contract kind to instance name to a record:
//!
//! ```json
//! { "Erc20": { "ZRX": { "address": "0x…", "contract": "StandardToken", "decimals": 18 } } }
//! ```
//!
//! Unknown record fields are kept as metadata and written back unchanged.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::values::Address;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("cannot access network file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed network file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value `{value}` for setting `{key}`")]
    InvalidSetting { key: String, value: String },

    #[error("no network file configured")]
    NoNetworkFile,
}

impl RegistryError {
    pub(crate) fn invalid(key: &str, value: &str) -> Self {
        RegistryError::InvalidSetting {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

/// One deployed contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractRecord {
    pub address: Address,
    /// Artifact the contract was deployed from.
    pub contract: String,
    #[serde(flatten)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl ContractRecord {
    pub fn new(address: Address, contract: impl Into<String>) -> Self {
        Self {
            address,
            contract: contract.into(),
            metadata: BTreeMap::new(),
        }
    }
}

/// Contracts by kind, then by instance name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry(BTreeMap<String, BTreeMap<String, ContractRecord>>);

impl Registry {
    pub fn from_json(text: &str) -> Result<Self, RegistryError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, RegistryError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a network file. A missing file is an empty registry.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_json(&text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(RegistryError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), RegistryError> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Case-insensitive lookup of `kind` / `name`.
    pub fn get(&self, kind: &str, name: &str) -> Option<&ContractRecord> {
        let instances = self
            .0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(kind))
            .map(|(_, instances)| instances)?;
        instances
            .get(name)
            .or_else(|| {
                instances
                    .iter()
                    .find(|(n, _)| n.eq_ignore_ascii_case(name))
                    .map(|(_, record)| record)
            })
    }

    /// Any contract called `name`, whatever its kind.
    pub fn find(&self, name: &str) -> Option<(&str, &ContractRecord)> {
        self.0.iter().find_map(|(kind, instances)| {
            instances
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, record)| (kind.as_str(), record))
        })
    }

    /// Insert or overwrite; the last write wins.
    pub fn insert(&mut self, kind: &str, name: &str, record: ContractRecord) {
        self.0
            .entry(kind.to_string())
            .or_default()
            .insert(name.to_string(), record);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &ContractRecord)> {
        self.0.iter().flat_map(|(kind, instances)| {
            instances
                .iter()
                .map(move |(name, record)| (kind.as_str(), name.as_str(), record))
        })
    }

    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
