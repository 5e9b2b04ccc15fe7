//! Application root
//!
//! Owns the store, session and facade, and runs the mount-time sequence:
//! restore an existing authorization, subscribe to provider events, start
//! the dispatcher, and load the initial state.

use crate::client::{ContributionReceipt, DaoClient, RefreshReport};
use crate::config::ClientConfig;
use crate::contract::DeploymentTable;
use crate::error::{Result, SyncError};
use crate::events::{self, EventDispatcher};
use crate::provider::{Wallet, WalletProvider};
use crate::session::AccountSession;
use crate::store::StateStore;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// What `start()` found
#[derive(Debug)]
pub struct StartupReport {
    /// Account restored from an earlier authorization
    pub account: Option<String>,
    /// Initial state load
    pub refresh: Result<RefreshReport>,
}

pub struct DominionApp {
    store: Arc<StateStore>,
    client: Arc<DaoClient>,
    dispatcher: Option<JoinHandle<()>>,
}

impl DominionApp {
    /// Wire the components; `provider` is whatever the host injected, if anything
    pub fn new(
        provider: Option<Arc<dyn WalletProvider>>,
        deployments: DeploymentTable,
        config: ClientConfig,
    ) -> Self {
        let store = Arc::new(StateStore::new());
        let session = Arc::new(AccountSession::new(provider.map(Wallet::new), store.clone()));
        let client = Arc::new(DaoClient::new(
            session,
            Arc::new(deployments),
            store.clone(),
            config,
        ));

        Self {
            store,
            client,
            dispatcher: None,
        }
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    pub fn client(&self) -> &Arc<DaoClient> {
        &self.client
    }

    pub fn session(&self) -> &Arc<AccountSession> {
        self.client.session()
    }

    /// Mount-time sequence.
    ///
    /// Fails with `Config` for an invalid [`ClientConfig`], otherwise only
    /// with `ProviderUnavailable`; the UI should then prompt the user to
    /// install a wallet.
    pub async fn start(&mut self) -> Result<StartupReport> {
        self.client.config().validate()?;

        let session = self.client.session().clone();
        if !session.is_provider_present() {
            return Err(SyncError::ProviderUnavailable);
        }

        let account = session.restore().await?;

        if self.dispatcher.is_none() {
            let (sink, stream) = events::channel(self.client.config().event_buffer);
            session.observe_account_changes(sink.clone())?;
            session.observe_network_changes(sink)?;
            self.dispatcher = Some(EventDispatcher::new(self.client.clone(), stream).spawn());
            info!("Provider event dispatcher started");
        }

        let refresh = self.client.get_info().await;
        Ok(StartupReport { account, refresh })
    }

    pub async fn connect(&self) -> Result<String> {
        self.client.connect().await
    }

    pub async fn contribute(&self, amount: &str) -> Result<ContributionReceipt> {
        self.client.contribute(amount).await
    }

    pub async fn get_info(&self) -> Result<RefreshReport> {
        self.client.get_info().await
    }

    /// Logical reset, the equivalent of a page reload
    pub fn reset(&self) {
        self.session().disconnect();
        self.client.resolver().invalidate();
        self.store.reset();
    }
}

impl Drop for DominionApp {
    fn drop(&mut self) {
        if let Some(handle) = self.dispatcher.take() {
            handle.abort();
        }
    }
}
