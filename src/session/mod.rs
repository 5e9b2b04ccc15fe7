//! Account session
//!
//! Tracks the connection lifecycle with the wallet provider:
//!
//! ```text
//! Disconnected ─connect()─▶ Connecting ─approved─▶ Connected ◀─┐
//!      ▲                        │                     │        │ accountsChanged,
//!      └───────denied───────────┘                     └────────┘ re-prompt
//!      ▲                                              │
//!      └────────── empty accounts / disconnect ───────┘
//! ```
//!
//! The active account is mirrored into the `connectedAccount` store key.

use crate::error::{Result, SyncError};
use crate::provider::{EventSink, ProviderEventKind, Wallet};
use crate::store::{StateStore, StoreKey, StoreValue};
use alloy_primitives::Address;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Connection state with the wallet provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    /// Holds the lowercase-normalized active account
    Connected(String),
}

/// Lowercase `0x`-prefixed rendering of an address
pub fn normalize_account(address: &Address) -> String {
    address.to_string().to_lowercase()
}

/// Connection to the injected wallet, if any.
///
/// Provider presence is fixed at construction; a session built without one
/// fails every operation with `ProviderUnavailable`.
pub struct AccountSession {
    wallet: Option<Wallet>,
    state: RwLock<SessionState>,
    store: Arc<StateStore>,
}

impl AccountSession {
    pub fn new(wallet: Option<Wallet>, store: Arc<StateStore>) -> Self {
        if wallet.is_none() {
            warn!("No wallet provider detected");
        }
        Self {
            wallet,
            state: RwLock::new(SessionState::Disconnected),
            store,
        }
    }

    /// Whether a provider was injected at startup
    pub fn is_provider_present(&self) -> bool {
        self.wallet.is_some()
    }

    /// The injected provider
    pub fn wallet(&self) -> Result<&Wallet> {
        self.wallet.as_ref().ok_or(SyncError::ProviderUnavailable)
    }

    pub fn state(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_state(&self, state: SessionState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Active account, never suspends
    pub fn current_account(&self) -> Option<String> {
        match self.state() {
            SessionState::Connected(account) => Some(account),
            _ => None,
        }
    }

    /// Active account as a typed address
    pub fn current_address(&self) -> Option<Address> {
        self.current_account()
            .and_then(|account| account.parse::<Address>().ok())
    }

    /// Ask the user to authorize an account.
    ///
    /// Suspends for as long as the wallet prompt stays open. A connected
    /// account stays active during a re-prompt. If the prompt fails, the
    /// previous state is restored only when nothing else (an
    /// `accountsChanged`, a disconnect) moved the session meanwhile.
    pub async fn connect(&self) -> Result<String> {
        let wallet = self.wallet()?;

        let previous = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let previous = state.clone();
            if !matches!(previous, SessionState::Connected(_)) {
                *state = SessionState::Connecting;
            }
            previous
        };
        debug!("Requesting wallet authorization");

        let accounts = match wallet.request_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                self.abandon_connecting(previous);
                warn!(error = %e, "Wallet authorization failed");
                return Err(match e {
                    SyncError::AuthorizationDenied(_) => e,
                    other => SyncError::AuthorizationDenied(other.to_string()),
                });
            }
        };

        match accounts.first() {
            Some(address) => {
                let account = normalize_account(address);
                self.adopt(account.clone());
                info!(account = %account, "Wallet connected");
                Ok(account)
            }
            None => {
                self.abandon_connecting(previous);
                Err(SyncError::AuthorizationDenied(
                    "provider returned no accounts".into(),
                ))
            }
        }
    }

    fn abandon_connecting(&self, previous: SessionState) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if *state == SessionState::Connecting {
            *state = previous;
        }
    }

    /// Pick up an existing authorization without prompting.
    ///
    /// Returns the restored account, or `None` when the wallet has not
    /// authorized this origin yet.
    pub async fn restore(&self) -> Result<Option<String>> {
        let wallet = self.wallet()?;
        let accounts = wallet.get_accounts().await?;

        match accounts.first() {
            Some(address) => {
                let account = normalize_account(address);
                self.adopt(account.clone());
                info!(account = %account, "Wallet session restored");
                Ok(Some(account))
            }
            None => {
                info!("No authorized accounts found, wallet must be connected");
                Ok(None)
            }
        }
    }

    /// Apply an `accountsChanged` payload; empty means the wallet locked or revoked access
    pub fn handle_accounts_changed(&self, accounts: &[String]) -> Option<String> {
        let next = accounts
            .first()
            .and_then(|raw| match raw.parse::<Address>() {
                Ok(address) => Some(normalize_account(&address)),
                Err(e) => {
                    warn!(account = %raw, error = %e, "Ignoring malformed account from provider");
                    None
                }
            });

        match next {
            Some(account) => {
                info!(account = %account, "Active account changed");
                self.adopt(account.clone());
                Some(account)
            }
            None => {
                self.disconnect();
                None
            }
        }
    }

    /// Forget the active account
    pub fn disconnect(&self) {
        if self.current_account().is_some() {
            info!("Wallet disconnected");
        }
        self.set_state(SessionState::Disconnected);
        self.store.set(StoreKey::ConnectedAccount, StoreValue::Absent);
    }

    fn adopt(&self, account: String) {
        self.set_state(SessionState::Connected(account.clone()));
        self.store
            .set(StoreKey::ConnectedAccount, StoreValue::Account(account));
    }

    /// Subscribe `sink` to account switches (and provider disconnects)
    pub fn observe_account_changes(&self, sink: EventSink) -> Result<()> {
        let wallet = self.wallet()?;
        wallet.on(ProviderEventKind::AccountsChanged, sink.clone());
        wallet.on(ProviderEventKind::Disconnect, sink);
        Ok(())
    }

    /// Subscribe `sink` to network switches
    pub fn observe_network_changes(&self, sink: EventSink) -> Result<()> {
        let wallet = self.wallet()?;
        wallet.on(ProviderEventKind::ChainChanged, sink);
        Ok(())
    }
}
