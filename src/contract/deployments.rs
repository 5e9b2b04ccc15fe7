//! Static deployment table
//!
//! Maps network ids to the address the contract was deployed at. Loaded once
//! from a Truffle-style build artifact and read-only afterwards.

use crate::error::{Result, SyncError};
use crate::network::NetworkId;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default interface name when the artifact does not carry one
pub const DEFAULT_CONTRACT_NAME: &str = "DominionDAO";

/// One network's deployment record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub address: Address,
    #[serde(default, rename = "transactionHash", skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Artifact {
    #[serde(rename = "contractName")]
    contract_name: Option<String>,
    #[serde(default)]
    networks: HashMap<String, Deployment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTable {
    contract_name: String,
    networks: HashMap<NetworkId, Deployment>,
}

impl Default for DeploymentTable {
    fn default() -> Self {
        Self::new(DEFAULT_CONTRACT_NAME)
    }
}

impl DeploymentTable {
    pub fn new(contract_name: impl Into<String>) -> Self {
        Self {
            contract_name: contract_name.into(),
            networks: HashMap::new(),
        }
    }

    /// Parse a build artifact (`{"contractName", "abi", "networks": {...}}`).
    ///
    /// Network keys may be decimal or hex; the ABI section is not read, the
    /// interface is fixed by [`IDominionDao`](super::IDominionDao).
    pub fn from_artifact_json(json: &str) -> Result<Self> {
        let artifact: Artifact = serde_json::from_str(json)
            .map_err(|e| SyncError::Config(format!("invalid deployment artifact: {}", e)))?;

        let mut table = Self::new(
            artifact
                .contract_name
                .unwrap_or_else(|| DEFAULT_CONTRACT_NAME.to_string()),
        );
        for (network, deployment) in artifact.networks {
            let network = NetworkId::parse(&network)
                .map_err(|_| SyncError::Config(format!("invalid network key {:?}", network)))?;
            table.networks.insert(network, deployment);
        }

        Ok(table)
    }

    /// Builder-style insert
    pub fn with_deployment(mut self, network: NetworkId, address: Address) -> Self {
        self.networks.insert(
            network,
            Deployment {
                address,
                transaction_hash: None,
            },
        );
        self
    }

    pub fn get(&self, network: &NetworkId) -> Option<&Deployment> {
        self.networks.get(network)
    }

    pub fn contract_name(&self) -> &str {
        &self.contract_name
    }

    pub fn networks(&self) -> impl Iterator<Item = &NetworkId> {
        self.networks.keys()
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}
