//! DominionDAO operations over the session, resolver and store

use super::RefreshReport;
use crate::config::ClientConfig;
use crate::contract::{ContractHandle, ContractResolver, DeploymentTable};
use crate::error::{Result, SyncError};
use crate::session::AccountSession;
use crate::store::{StateStore, StoreKey, StoreValue};
use crate::units;
use alloy_primitives::{TxHash, U256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Keys backed by contract reads on the current network
pub const CHAIN_KEYS: [StoreKey; 3] = [
    StoreKey::Balance,
    StoreKey::MyBalance,
    StoreKey::IsStakeholder,
];

/// Result of an accepted contribution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributionReceipt {
    /// Hash reported by the wallet on acceptance (not a mined receipt)
    pub tx_hash: TxHash,
    /// Base units sent
    pub value: U256,
    /// The follow-up refresh; the transaction stands even when this failed
    pub refresh: Result<RefreshReport>,
}

/// Facade the UI calls into.
///
/// Every operation needs the injected provider (`ProviderUnavailable`) and
/// a resolvable deployment (`ContractUnavailable`).
pub struct DaoClient {
    session: Arc<AccountSession>,
    resolver: ContractResolver,
    store: Arc<StateStore>,
    config: ClientConfig,
    tickets: AtomicU64,
}

impl DaoClient {
    pub fn new(
        session: Arc<AccountSession>,
        deployments: Arc<DeploymentTable>,
        store: Arc<StateStore>,
        config: ClientConfig,
    ) -> Self {
        let resolver = ContractResolver::new(session.clone(), deployments, store.clone());
        Self {
            session,
            resolver,
            store,
            config,
            tickets: AtomicU64::new(0),
        }
    }

    pub fn session(&self) -> &Arc<AccountSession> {
        &self.session
    }

    pub fn resolver(&self) -> &ContractResolver {
        &self.resolver
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn contract(&self) -> Result<ContractHandle> {
        self.resolver
            .resolve()
            .await?
            .ok_or(SyncError::ContractUnavailable)
    }

    /// Authorize a wallet account, then load its state when configured to
    pub async fn connect(&self) -> Result<String> {
        let account = self.session.connect().await?;

        if self.config.refresh_on_connect {
            match self.refresh().await {
                Ok(report) if !report.is_complete() => {
                    debug!(failed = report.errors().len(), "Post-connect refresh was partial");
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Post-connect refresh failed"),
            }
        }

        Ok(account)
    }

    /// Send `amount` (display units) to the DAO from the active account.
    ///
    /// Returns once the wallet accepts the transaction, after refreshing the
    /// store. A rejected transaction leaves the store untouched.
    pub async fn contribute(&self, amount: &str) -> Result<ContributionReceipt> {
        let wallet = self.session.wallet()?;
        let value = units::to_base_units(amount)?;
        let from = self
            .session
            .current_address()
            .ok_or(SyncError::NoActiveAccount)?;
        let contract = self.contract().await?;

        info!(from = %from, amount, "Submitting contribution");
        let tx_hash = match contract.contribute(wallet, from, value).await {
            Ok(hash) => hash,
            Err(e) => {
                warn!(from = %from, error = %e, "Contribution rejected");
                return Err(e);
            }
        };
        info!(tx = %tx_hash, "Contribution accepted");

        let refresh = self.refresh().await;
        Ok(ContributionReceipt {
            tx_hash,
            value,
            refresh,
        })
    }

    /// Alias of [`refresh`](Self::refresh)
    pub async fn get_info(&self) -> Result<RefreshReport> {
        self.refresh().await
    }

    /// Re-read stakeholder flag, DAO balance and caller balance.
    ///
    /// The reads run concurrently and independently; each success is written
    /// to its key even if the others fail. The three values may come from
    /// different blocks.
    pub async fn refresh(&self) -> Result<RefreshReport> {
        let wallet = self.session.wallet()?;
        let contract = self.contract().await?;
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;
        let caller = self.session.current_address();

        let (is_stakeholder, dao_balance, my_balance) = tokio::join!(
            async {
                match caller {
                    Some(caller) => contract.is_stakeholder(wallet, caller).await,
                    None => Err(SyncError::NoActiveAccount),
                }
            },
            contract.dao_balance(wallet),
            async {
                match caller {
                    Some(caller) => contract.get_balance(wallet, caller).await,
                    None => Err(SyncError::NoActiveAccount),
                }
            },
        );

        let report = RefreshReport {
            ticket,
            is_stakeholder,
            dao_balance: dao_balance.map(units::to_display_units),
            my_balance: my_balance.map(units::to_display_units),
        };

        if let Ok(flag) = &report.is_stakeholder {
            self.write(StoreKey::IsStakeholder, StoreValue::Flag(*flag), ticket);
        }
        if let Ok(amount) = &report.dao_balance {
            self.write(StoreKey::Balance, StoreValue::Amount(amount.clone()), ticket);
        }
        if let Ok(amount) = &report.my_balance {
            self.write(StoreKey::MyBalance, StoreValue::Amount(amount.clone()), ticket);
        }
        for (key, e) in report.errors() {
            warn!(key = %key, ticket, error = %e, "Refresh read failed");
        }

        Ok(report)
    }

    /// Network switch: drop the bound handle, re-resolve and refresh.
    ///
    /// Chain-backed keys the new network could not re-read are cleared, so
    /// no value from the previous network survives the switch.
    pub async fn handle_network_change(&self) -> Result<RefreshReport> {
        self.resolver.invalidate();
        let outcome = self.refresh().await;

        match &outcome {
            Ok(report) => {
                let stale: Vec<StoreKey> =
                    report.errors().into_iter().map(|(key, _)| key).collect();
                self.clear(&stale);
            }
            Err(e) => {
                debug!(error = %e, "No state for the new network, clearing chain values");
                self.clear(&CHAIN_KEYS);
            }
        }
        outcome
    }

    /// Reset `keys` to absent
    pub fn clear(&self, keys: &[StoreKey]) {
        for key in keys {
            self.store.set(*key, StoreValue::Absent);
        }
    }

    fn write(&self, key: StoreKey, value: StoreValue, ticket: u64) {
        if self.config.sequence_guard {
            self.store.set_versioned(key, value, ticket);
        } else {
            self.store.set(key, value);
        }
    }
}
