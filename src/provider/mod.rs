//! Wallet provider seam
//!
//! The host injects an EIP-1193 style provider: a single `request` entry
//! point plus event registration. Everything the SDK needs from the chain
//! goes through it; the SDK never opens its own transport.
//!
//! Provider events are not delivered as callbacks into SDK state. `on`
//! receives an [`EventSink`] and the provider publishes onto it; a single
//! [`EventDispatcher`](crate::events::EventDispatcher) drains the channel.

mod wallet;
pub mod mock;

pub use wallet::{CallRequest, Wallet};

use crate::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Provider event names the SDK subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderEventKind {
    #[serde(rename = "accountsChanged")]
    AccountsChanged,
    #[serde(rename = "chainChanged")]
    ChainChanged,
    #[serde(rename = "disconnect")]
    Disconnect,
}

impl ProviderEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccountsChanged => "accountsChanged",
            Self::ChainChanged => "chainChanged",
            Self::Disconnect => "disconnect",
        }
    }
}

impl std::fmt::Display for ProviderEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Notification originated by the provider, outside any SDK request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The set of authorized accounts changed; empty means the wallet locked or revoked access
    AccountsChanged(Vec<String>),
    /// The wallet switched networks (payload as sent by the provider, often hex)
    ChainChanged(String),
    /// The provider lost its connection to every chain
    Disconnect,
}

impl ProviderEvent {
    pub fn kind(&self) -> ProviderEventKind {
        match self {
            Self::AccountsChanged(_) => ProviderEventKind::AccountsChanged,
            Self::ChainChanged(_) => ProviderEventKind::ChainChanged,
            Self::Disconnect => ProviderEventKind::Disconnect,
        }
    }
}

/// Sending half handed to the provider on subscription
pub type EventSink = mpsc::Sender<ProviderEvent>;

/// Receiving half consumed by the dispatcher
pub type EventStream = mpsc::Receiver<ProviderEvent>;

/// Injected wallet capability.
///
/// Implementations wrap whatever the host exposes (`window.ethereum` through
/// wasm bindings, a native wallet bridge, or [`mock::MockWallet`] in tests).
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Issue a JSON-RPC request through the provider's transport.
    ///
    /// Requests that need the user (authorization, signing) suspend until the
    /// user decides; there is no timeout.
    async fn request(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> std::result::Result<serde_json::Value, ProviderError>;

    /// Register a persistent subscription for `kind`.
    ///
    /// The provider publishes matching events onto `sink` for as long as the
    /// receiver is alive.
    fn on(&self, kind: ProviderEventKind, sink: EventSink);
}
