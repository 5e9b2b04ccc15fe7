//! Dominion SDK - wallet, contract and state synchronization for DominionDAO
//!
//! Connects a host-injected wallet provider, the deployed DominionDAO
//! contract and a reactive state store the UI renders from.
//!
//! # Architecture
//!
//! ```text
//! UI intent ─▶ DaoClient ─▶ AccountSession (signer) + ContractResolver (target)
//!                 │                      └──────── Wallet (provider transport) ─▶ chain
//!                 ▼
//!            StateStore ─▶ subscribed UI
//!
//! provider events ─▶ mpsc ─▶ EventDispatcher ─▶ AccountSession / DaoClient ─▶ StateStore
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use dominion_sdk::{ClientConfig, DeploymentTable, DominionApp, StoreKey};
//!
//! let deployments = DeploymentTable::from_artifact_json(include_str!("DominionDAO.json"))?;
//! let mut app = DominionApp::new(injected_provider, deployments, ClientConfig::default());
//!
//! let _sub = app.store().subscribe(StoreKey::Balance, |value| render_balance(value));
//!
//! app.start().await?;
//! app.connect().await?;
//! app.contribute("1.5").await?;
//! ```

// Display / base unit conversion
pub mod units;

// Network identifiers
pub mod network;

// Wallet provider seam and typed RPC helpers
pub mod provider;

// Connection lifecycle
pub mod session;

// Deployment table, resolver and contract handle
pub mod contract;

// Reactive state store
pub mod store;

// Contract operations facade
pub mod client;

// Provider event dispatch
pub mod events;

// Application root
pub mod app;

// Configuration
pub mod config;

// Error types
pub mod error;

pub use app::{DominionApp, StartupReport};
pub use client::{ContributionReceipt, DaoClient, RefreshReport};
pub use config::ClientConfig;
pub use contract::{ContractHandle, ContractResolver, Deployment, DeploymentTable, IDominionDao};
pub use error::{ProviderError, Result, SyncError};
pub use events::EventDispatcher;
pub use network::NetworkId;
pub use provider::{ProviderEvent, ProviderEventKind, Wallet, WalletProvider};
pub use session::{AccountSession, SessionState};
pub use store::{StateStore, StoreKey, StoreValue, Subscription};
pub use units::{to_base_units, to_display_units, BASE_UNIT_EXPONENT};

// Re-export chain primitives used in the public API
pub use alloy_primitives::{Address, TxHash, U256};
