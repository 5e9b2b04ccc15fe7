//! Typed JSON-RPC helpers over a [`WalletProvider`]
//!
//! Maps each RPC method onto the SDK error taxonomy: user-gated methods
//! report provider failures as `AuthorizationDenied` / `TransactionRejected`,
//! everything else as `TransportError`.

use super::{EventSink, ProviderEventKind, WalletProvider};
use crate::error::{Result, SyncError};
use crate::network::NetworkId;
use alloy_primitives::{Address, Bytes, TxHash, U256};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// Call / transaction object for `eth_call` and `eth_sendTransaction`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    pub to: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    pub data: Bytes,
}

impl CallRequest {
    pub fn new(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            from: None,
            to,
            value: None,
            data: data.into(),
        }
    }

    pub fn with_from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }
}

/// Shared handle to the injected provider
#[derive(Clone)]
pub struct Wallet {
    provider: Arc<dyn WalletProvider>,
}

impl Wallet {
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        Self { provider }
    }

    /// Prompt the user to authorize accounts (`eth_requestAccounts`)
    pub async fn request_accounts(&self) -> Result<Vec<Address>> {
        let value = self
            .provider
            .request("eth_requestAccounts", json!([]))
            .await
            .map_err(|e| SyncError::AuthorizationDenied(e.message))?;
        Ok(serde_json::from_value(value)?)
    }

    /// Accounts already authorized for this origin (`eth_accounts`), no prompt
    pub async fn get_accounts(&self) -> Result<Vec<Address>> {
        let value = self.provider.request("eth_accounts", json!([])).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Current network (`net_version`), read fresh on every call
    pub async fn network_id(&self) -> Result<NetworkId> {
        let value = self.provider.request("net_version", json!([])).await?;
        NetworkId::from_json(&value)
    }

    /// Read-only contract call against the latest block (`eth_call`)
    pub async fn call(&self, request: &CallRequest) -> Result<Bytes> {
        debug!(to = %request.to, "eth_call");
        let value = self
            .provider
            .request("eth_call", json!([request, "latest"]))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Submit a signed transaction (`eth_sendTransaction`).
    ///
    /// Resolves once the wallet accepts and broadcasts it; no receipt is
    /// awaited.
    pub async fn send_transaction(&self, request: &CallRequest) -> Result<TxHash> {
        debug!(to = %request.to, value = ?request.value, "eth_sendTransaction");
        let value = self
            .provider
            .request("eth_sendTransaction", json!([request]))
            .await
            .map_err(|e| SyncError::TransactionRejected(e.message))?;
        Ok(serde_json::from_value(value)?)
    }

    /// Forward a subscription to the provider
    pub fn on(&self, kind: ProviderEventKind, sink: EventSink) {
        self.provider.on(kind, sink);
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet").finish_non_exhaustive()
    }
}
