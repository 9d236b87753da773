//! Deployed contract addresses per network
//!
//! The reconciler only needs to look up and record a contract set for a
//! network; the storage behind it is a [`DeploymentRegistry`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use eyre::{eyre, Result, WrapErr};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    Localnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Localnet => "localnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "localnet" => Ok(Network::Localnet),
            other => Err(eyre!(
                "Unknown network '{}': expected mainnet, testnet or localnet",
                other
            )),
        }
    }
}

/// Addresses of one deployed stack; a missing entry has not been deployed yet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedContracts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ntt_manager: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transceiver_manager: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transceiver: Option<String>,
}

/// A complete stack, as the reconciler needs it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub token: String,
    pub ntt_manager: String,
    pub transceiver_manager: String,
    pub transceiver: String,
}

impl DeployedContracts {
    /// Names of the contracts that have no recorded address
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = vec![];
        if self.token.is_none() {
            missing.push("token");
        }
        if self.ntt_manager.is_none() {
            missing.push("ntt_manager");
        }
        if self.transceiver_manager.is_none() {
            missing.push("transceiver_manager");
        }
        if self.transceiver.is_none() {
            missing.push("transceiver");
        }
        missing
    }

    pub fn complete(&self) -> Option<Deployment> {
        Some(Deployment {
            token: self.token.clone()?,
            ntt_manager: self.ntt_manager.clone()?,
            transceiver_manager: self.transceiver_manager.clone()?,
            transceiver: self.transceiver.clone()?,
        })
    }

    /// Overwrite the entries `other` sets, keep the rest
    pub fn merge(&mut self, other: DeployedContracts) {
        if other.token.is_some() {
            self.token = other.token;
        }
        if other.ntt_manager.is_some() {
            self.ntt_manager = other.ntt_manager;
        }
        if other.transceiver_manager.is_some() {
            self.transceiver_manager = other.transceiver_manager;
        }
        if other.transceiver.is_some() {
            self.transceiver = other.transceiver;
        }
    }
}

/// Key-value store of network -> deployed contracts
pub trait DeploymentRegistry {
    fn get(&self, network: Network) -> Result<Option<DeployedContracts>>;

    fn put(&mut self, network: Network, contracts: DeployedContracts) -> Result<()>;

    /// Merge `contracts` into whatever is already recorded
    fn record(&mut self, network: Network, contracts: DeployedContracts) -> Result<()> {
        let mut current = self.get(network)?.unwrap_or_default();
        current.merge(contracts);
        self.put(network, current)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    entries: HashMap<Network, DeployedContracts>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeploymentRegistry for InMemoryRegistry {
    fn get(&self, network: Network) -> Result<Option<DeployedContracts>> {
        Ok(self.entries.get(&network).cloned())
    }

    fn put(&mut self, network: Network, contracts: DeployedContracts) -> Result<()> {
        self.entries.insert(network, contracts);
        Ok(())
    }
}

/// Registry persisted as one JSON object keyed by network name
#[derive(Debug, Clone)]
pub struct JsonFileRegistry {
    path: PathBuf,
}

impl JsonFileRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<Network, DeployedContracts>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = std::fs::read_to_string(&self.path)
            .wrap_err_with(|| format!("Failed to read registry {}", self.path.display()))?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw)
            .wrap_err_with(|| format!("Failed to parse registry {}", self.path.display()))
    }
}

impl DeploymentRegistry for JsonFileRegistry {
    fn get(&self, network: Network) -> Result<Option<DeployedContracts>> {
        Ok(self.read_all()?.remove(&network))
    }

    fn put(&mut self, network: Network, contracts: DeployedContracts) -> Result<()> {
        let mut all = self.read_all()?;
        all.insert(network, contracts);
        let raw = serde_json::to_string_pretty(&all)?;
        std::fs::write(&self.path, raw + "\n")
            .wrap_err_with(|| format!("Failed to write registry {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contracts() -> DeployedContracts {
        DeployedContracts {
            token: Some("terra1token".to_string()),
            ntt_manager: Some("terra1manager".to_string()),
            transceiver_manager: None,
            transceiver: None,
        }
    }

    #[test]
    fn test_network_parse() {
        assert_eq!("Testnet".parse::<Network>().unwrap(), Network::Testnet);
        assert_eq!(Network::Localnet.to_string(), "localnet");
        assert!("devnet".parse::<Network>().is_err());
    }

    #[test]
    fn test_missing_and_complete() {
        let mut c = contracts();
        assert_eq!(c.missing(), vec!["transceiver_manager", "transceiver"]);
        assert!(c.complete().is_none());

        c.merge(DeployedContracts {
            transceiver_manager: Some("terra1tm".to_string()),
            transceiver: Some("terra1wh".to_string()),
            ..Default::default()
        });
        assert!(c.missing().is_empty());
        let deployment = c.complete().unwrap();
        assert_eq!(deployment.token, "terra1token");
        assert_eq!(deployment.transceiver, "terra1wh");
    }

    #[test]
    fn test_in_memory_record_merges() {
        let mut registry = InMemoryRegistry::new();
        assert_eq!(registry.get(Network::Testnet).unwrap(), None);

        registry.record(Network::Testnet, contracts()).unwrap();
        registry
            .record(
                Network::Testnet,
                DeployedContracts {
                    transceiver: Some("terra1wh".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        let entry = registry.get(Network::Testnet).unwrap().unwrap();
        assert_eq!(entry.token.as_deref(), Some("terra1token"));
        assert_eq!(entry.transceiver.as_deref(), Some("terra1wh"));
        assert_eq!(registry.get(Network::Mainnet).unwrap(), None);
    }

    #[test]
    fn test_json_file_persists() {
        let path = std::env::temp_dir().join(format!(
            "ntt-deployer-registry-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let mut registry = JsonFileRegistry::new(&path);
        assert_eq!(registry.get(Network::Localnet).unwrap(), None);
        registry.put(Network::Localnet, contracts()).unwrap();

        let reopened = JsonFileRegistry::new(&path);
        assert_eq!(reopened.get(Network::Localnet).unwrap(), Some(contracts()));

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"localnet\""));
        assert!(!raw.contains("transceiver_manager"));

        std::fs::remove_file(&path).unwrap();
    }
}
