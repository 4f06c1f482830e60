use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::RegistryError;
use crate::values::Address;

/// Interpreter settings carried by the [`World`](super::World).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// User and contract names that resolve to addresses.
    pub aliases: BTreeMap<String, Address>,
    /// Sender used when no `From` is in effect.
    pub default_from: Option<Address>,
    pub verbose: bool,
    /// Free-form settings set by scripts.
    pub extra: BTreeMap<String, String>,
}

impl Settings {
    pub fn from_json(text: &str) -> Result<Self, RegistryError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let text = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Alias lookup, exact first and then ignoring case.
    pub fn lookup_alias(&self, name: &str) -> Option<&Address> {
        self.aliases.get(name).or_else(|| {
            self.aliases
                .iter()
                .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
                .map(|(_, address)| address)
        })
    }

    /// First alias pointing at `address`.
    pub fn alias_of(&self, address: &Address) -> Option<&str> {
        self.aliases
            .iter()
            .find(|(_, target)| *target == address)
            .map(|(alias, _)| alias.as_str())
    }

    /// Set a setting by name. `verbose` takes a boolean and `from` an
    /// address or alias; any other key is stored verbatim.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), RegistryError> {
        match key.to_ascii_lowercase().as_str() {
            "verbose" => {
                self.verbose = match value.to_ascii_lowercase().as_str() {
                    "true" | "on" | "1" => true,
                    "false" | "off" | "0" => false,
                    _ => return Err(RegistryError::invalid(key, value)),
                };
            }
            "from" => {
                let address = Address::parse(value)
                    .or_else(|| self.lookup_alias(value).cloned())
                    .ok_or_else(|| RegistryError::invalid(key, value))?;
                self.default_from = Some(address);
            }
            _ => {
                self.extra.insert(key.to_string(), value.to_string());
            }
        }
        Ok(())
    }
}
