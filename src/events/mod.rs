//! Provider event dispatcher
//!
//! Provider notifications arrive on one mpsc channel and are applied here,
//! one at a time, so account and network switches never race each other
//! into the store.

use crate::client::{DaoClient, RefreshReport};
use crate::error::{Result, SyncError};
use crate::network::NetworkId;
use crate::provider::{EventSink, EventStream, ProviderEvent};
use crate::store::StoreKey;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Create the channel providers publish onto (capacity at least 1)
pub fn channel(capacity: usize) -> (EventSink, EventStream) {
    mpsc::channel(capacity.max(1))
}

/// Single consumer of provider events
pub struct EventDispatcher {
    client: Arc<DaoClient>,
    events: EventStream,
}

impl EventDispatcher {
    pub fn new(client: Arc<DaoClient>, events: EventStream) -> Self {
        Self { client, events }
    }

    /// Apply events until every sink is dropped
    pub async fn run(mut self) {
        while self.process_next().await {}
        debug!("Provider event stream closed");
    }

    /// Run on the tokio runtime
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Wait for and apply one event; `false` once the stream is closed
    pub async fn process_next(&mut self) -> bool {
        match self.events.recv().await {
            Some(event) => {
                let kind = event.kind();
                if let Some(Ok(report)) = self.handle(event).await {
                    debug!(
                        event = %kind,
                        ticket = report.ticket,
                        complete = report.is_complete(),
                        "Provider event applied"
                    );
                }
                true
            }
            None => false,
        }
    }

    /// Apply one event, returning the refresh it triggered (if any)
    pub async fn handle(&self, event: ProviderEvent) -> Option<Result<RefreshReport>> {
        let outcome = match event {
            ProviderEvent::AccountsChanged(accounts) => {
                let session = self.client.session();
                if session.handle_accounts_changed(&accounts).is_none() {
                    self.clear_account_state();
                }
                Some(self.client.refresh().await)
            }
            ProviderEvent::ChainChanged(raw) => {
                match NetworkId::parse(&raw) {
                    Ok(network) => {
                        info!(network = %network, "Network changed, re-resolving contract")
                    }
                    Err(_) => info!(network = %raw, "Network changed, re-resolving contract"),
                }
                Some(self.client.handle_network_change().await)
            }
            ProviderEvent::Disconnect => {
                self.client.session().disconnect();
                self.clear_account_state();
                None
            }
        };

        if let Some(Err(e)) = &outcome {
            match e {
                SyncError::ContractUnavailable => {
                    debug!("Contract unavailable after provider event")
                }
                other => warn!(error = %other, "Refresh after provider event failed"),
            }
        }
        outcome
    }

    fn clear_account_state(&self) {
        self.client.clear(&[StoreKey::IsStakeholder, StoreKey::MyBalance]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::contract::{DeploymentTable, IDominionDao};
    use crate::provider::mock::MockWallet;
    use crate::provider::Wallet;
    use crate::session::AccountSession;
    use crate::store::StateStore;
    use alloy_primitives::{Address, U256};
    use alloy_sol_types::{SolCall, SolValue};

    const ALICE: &str = "0x00000000000000000000000000000000000a11ce";
    const BOB: &str = "0x0000000000000000000000000000000000000b0b";

    async fn dispatcher() -> (Arc<MockWallet>, Arc<DaoClient>, EventSink, EventDispatcher) {
        let mock = Arc::new(MockWallet::new());
        mock.approve(&[ALICE])
            .reply(IDominionDao::isStakeholderCall::SELECTOR, Ok(true.abi_encode()))
            .reply(IDominionDao::daoBalanceCall::SELECTOR, Ok(U256::from(9u64).abi_encode()))
            .reply(IDominionDao::getBalanceCall::SELECTOR, Ok(U256::from(1u64).abi_encode()));

        let store = Arc::new(StateStore::new());
        let session = Arc::new(AccountSession::new(Some(Wallet::new(mock.clone())), store.clone()));
        let deployments = Arc::new(
            DeploymentTable::default()
                .with_deployment(NetworkId::from(5777), Address::repeat_byte(0x42)),
        );
        let client = Arc::new(DaoClient::new(session, deployments, store, ClientConfig::default()));
        client.connect().await.unwrap();

        let (sink, stream) = channel(4);
        let dispatcher = EventDispatcher::new(client.clone(), stream);
        (mock, client, sink, dispatcher)
    }

    #[tokio::test]
    async fn test_account_switch_refreshes() {
        let (_mock, client, sink, mut dispatcher) = dispatcher().await;

        sink.send(ProviderEvent::AccountsChanged(vec![BOB.into()]))
            .await
            .unwrap();
        assert!(dispatcher.process_next().await);

        assert_eq!(client.store().connected_account(), Some(BOB.to_string()));
        assert_eq!(client.store().my_balance(), Some("0.000000000000000001".into()));
    }

    #[tokio::test]
    async fn test_lock_clears_per_account_keys() {
        let (_mock, client, _sink, dispatcher) = dispatcher().await;
        assert_eq!(client.store().is_stakeholder(), Some(true));

        let outcome = dispatcher
            .handle(ProviderEvent::AccountsChanged(vec![]))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(outcome.is_stakeholder, Err(SyncError::NoActiveAccount));
        assert_eq!(client.store().connected_account(), None);
        assert_eq!(client.store().is_stakeholder(), None);
        assert_eq!(client.store().my_balance(), None);
        assert!(client.store().balance().is_some());
    }

    #[tokio::test]
    async fn test_unknown_network_unbinds_contract() {
        let (mock, client, _sink, dispatcher) = dispatcher().await;

        mock.set_network("1");
        let outcome = dispatcher
            .handle(ProviderEvent::ChainChanged("0x1".into()))
            .await
            .unwrap();

        assert_eq!(outcome.unwrap_err(), SyncError::ContractUnavailable);
        assert!(client.store().contract().is_none());
    }

    #[tokio::test]
    async fn test_disconnect_does_not_refresh() {
        let (mock, client, _sink, dispatcher) = dispatcher().await;
        let calls = mock.request_log().len();

        assert!(dispatcher.handle(ProviderEvent::Disconnect).await.is_none());
        assert_eq!(mock.request_log().len(), calls);
        assert_eq!(client.store().connected_account(), None);
    }

    #[tokio::test]
    async fn test_unknown_network_clears_previous_values() {
        let (mock, client, _sink, dispatcher) = dispatcher().await;
        assert_eq!(client.store().balance(), Some("0.000000000000000009".into()));

        mock.set_network("1");
        dispatcher
            .handle(ProviderEvent::ChainChanged("0x1".into()))
            .await;

        assert_eq!(client.store().balance(), None);
        assert_eq!(client.store().my_balance(), None);
        assert_eq!(client.store().is_stakeholder(), None);
    }

    #[test]
    fn test_zero_capacity_channel_is_usable() {
        let (sink, mut stream) = channel(0);
        sink.try_send(ProviderEvent::Disconnect).unwrap();
        assert_eq!(stream.try_recv().unwrap(), ProviderEvent::Disconnect);
    }

    #[tokio::test]
    async fn test_run_stops_when_sinks_drop() {
        let (_mock, _client, sink, mut dispatcher) = dispatcher().await;
        drop(sink);
        assert!(!dispatcher.process_next().await);
    }
}
