//! Deployment resolution for the current network
//!
//! ```text
//! resolve()
//!   ├─ account connected → net_version → deployment table
//!   │                        ├─ hit  → handle (cached under `contract`)
//!   │                        └─ miss → absent (cache cleared)
//!   └─ no account        → cached `contract` handle, if any (best-effort)
//! ```
//!
//! A miss is the normal "wrong network" state, never a transport error.

use super::{ContractHandle, DeploymentTable};
use crate::error::Result;
use crate::session::AccountSession;
use crate::store::{StateStore, StoreKey, StoreValue};
use std::sync::Arc;
use tracing::{debug, info};

pub struct ContractResolver {
    session: Arc<AccountSession>,
    deployments: Arc<DeploymentTable>,
    store: Arc<StateStore>,
}

impl ContractResolver {
    pub fn new(
        session: Arc<AccountSession>,
        deployments: Arc<DeploymentTable>,
        store: Arc<StateStore>,
    ) -> Self {
        Self {
            session,
            deployments,
            store,
        }
    }

    pub fn deployments(&self) -> &DeploymentTable {
        &self.deployments
    }

    /// Bind a handle for the wallet's current network.
    ///
    /// `Ok(None)` means the contract is not deployed there. The network id is
    /// read from the provider on every call.
    pub async fn resolve(&self) -> Result<Option<ContractHandle>> {
        if self.session.current_account().is_none() {
            let cached = self.store.contract();
            debug!(cached = cached.is_some(), "No active account, using cached contract handle");
            return Ok(cached);
        }

        let wallet = self.session.wallet()?;
        let network = wallet.network_id().await?;

        match self.deployments.get(&network) {
            Some(deployment) => {
                let handle = ContractHandle::new(
                    network.clone(),
                    deployment.address,
                    self.deployments.contract_name(),
                );
                if self.store.contract().as_ref() != Some(&handle) {
                    debug!(network = %network, address = %deployment.address, "Contract resolved");
                    self.store
                        .set(StoreKey::Contract, StoreValue::Contract(handle.clone()));
                }
                Ok(Some(handle))
            }
            None => {
                info!(network = %network, "Contract not deployed on current network");
                self.invalidate();
                Ok(None)
            }
        }
    }

    /// Drop the cached handle
    pub fn invalidate(&self) {
        if self.store.contract().is_some() {
            self.store.set(StoreKey::Contract, StoreValue::Absent);
        }
    }
}
