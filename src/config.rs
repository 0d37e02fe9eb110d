//! Configuration store for the orchestrator
//!
//! A TOML document keyed by network section (`solana`, `solana-test`), each
//! holding contract addresses and an optional endpoint override. The core
//! treats the store as read-only; mutation happens only through the
//! `config set` subcommand.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::error::{OrbitError, Result};

/// Full configuration document: one section per network
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Network sections keyed by name (e.g. "solana", "solana-test")
    #[serde(flatten)]
    pub networks: BTreeMap<String, ChainConfig>,
}

/// Per-network configuration: contract addresses plus endpoint override
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Network identifier used for URL selection and chain-qualified addresses
    #[serde(rename = "network-id", default)]
    pub network_id: Option<String>,

    /// RPC endpoint override; when absent the network id picks a cluster URL
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Contract addresses keyed by contract name
    #[serde(flatten)]
    pub contracts: BTreeMap<String, ContractConfig>,
}

/// Address entry for a single deployed contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractConfig {
    /// Base58 program address
    #[serde(rename = "contract-address")]
    pub contract_address: String,
}

impl Config {
    /// Default config location: `~/.orbit/config.toml`
    pub fn default_path() -> PathBuf {
        let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_default();
        home.join(".orbit").join("config.toml")
    }

    /// Load configuration from a TOML file; a missing file yields an empty
    /// document so that `config set` can bootstrap it
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            OrbitError::configuration(format!("failed to read config {}: {e}", path.display()))
        })?;
        toml::from_str(&content).map_err(|e| {
            OrbitError::configuration(format!("failed to parse config {}: {e}", path.display()))
        })
    }

    /// Select the network section for the given environment
    ///
    /// `mainnet` maps to the `solana` section, anything else to
    /// `solana-test`, matching the deployed section names.
    pub fn network(&self, env: &str) -> Result<&ChainConfig> {
        let section = if env == "mainnet" { "solana" } else { "solana-test" };
        self.networks.get(section).ok_or_else(|| {
            OrbitError::configuration(format!(
                "network section '{section}' not found. Set it using the 'config' command"
            ))
        })
    }

    /// Set a dotted-path key (`solana.xcall.contract-address=...`) and
    /// persist the document
    pub fn set_key(path: &Path, key: &str, value: &str) -> Result<()> {
        let mut doc: toml::Table = if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| OrbitError::configuration(format!("failed to read config: {e}")))?;
            content
                .parse()
                .map_err(|e| OrbitError::configuration(format!("failed to parse config: {e}")))?
        } else {
            toml::Table::new()
        };

        let mut segments: Vec<&str> = key.split('.').collect();
        let last = segments
            .pop()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| OrbitError::configuration("invalid key; use section.key=value"))?;

        let mut current = &mut doc;
        for segment in segments {
            current = current
                .entry(segment.to_string())
                .or_insert_with(|| toml::Value::Table(toml::Table::new()))
                .as_table_mut()
                .ok_or_else(|| {
                    OrbitError::configuration(format!("'{segment}' is not a table in the config"))
                })?;
        }
        current.insert(last.to_string(), toml::Value::String(value.to_string()));

        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| {
                OrbitError::configuration(format!("failed to create config dir: {e}"))
            })?;
        }
        let rendered = toml::to_string_pretty(&doc)
            .map_err(|e| OrbitError::configuration(format!("failed to render config: {e}")))?;
        std::fs::write(path, rendered)
            .map_err(|e| OrbitError::configuration(format!("failed to write config: {e}")))?;
        Ok(())
    }
}

impl ChainConfig {
    /// Look up a contract address, failing fast when it is absent
    pub fn contract(&self, name: &str) -> Result<Pubkey> {
        let entry = self.contracts.get(name).ok_or_else(|| {
            OrbitError::configuration(format!(
                "contract '{name}' configuration not found for this network"
            ))
        })?;
        Pubkey::from_str(&entry.contract_address).map_err(|_| {
            OrbitError::configuration(format!(
                "contract address for '{name}' is not a valid base58 pubkey: {}",
                entry.contract_address
            ))
        })
    }

    /// Resolve the RPC endpoint: explicit override first, then the cluster
    /// URL matching the network id
    pub fn endpoint_url(&self, url_override: Option<&str>) -> Result<String> {
        if let Some(url) = url_override {
            return Ok(url.to_string());
        }
        if let Some(url) = &self.endpoint {
            return Ok(url.clone());
        }
        match self.network_id.as_deref() {
            Some("solana") | Some("mainnet-beta") => {
                Ok("https://api.mainnet-beta.solana.com".to_string())
            }
            Some("solana-test") | Some("devnet") => {
                Ok("https://api.devnet.solana.com".to_string())
            }
            Some("testnet") => Ok("https://api.testnet.solana.com".to_string()),
            Some(other) => Err(OrbitError::configuration(format!(
                "unknown network id '{other}' and no endpoint override set"
            ))),
            None => Err(OrbitError::configuration(
                "network-id not set and no endpoint override given",
            )),
        }
    }

    /// Network identifier, required for chain-qualified address handling
    pub fn network_id(&self) -> Result<&str> {
        self.network_id
            .as_deref()
            .ok_or_else(|| OrbitError::configuration("network-id not set for this network"))
    }
}
