//! Error types for the Dominion SDK

use thiserror::Error;

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// EIP-1193 code for "user rejected the request"
pub const USER_REJECTED_CODE: i64 = 4001;

/// EIP-1193 code for "the requested account is not authorized"
pub const UNAUTHORIZED_CODE: i64 = 4100;

/// Error reported by the wallet provider for a single request.
///
/// `code` follows EIP-1193 / JSON-RPC conventions; `message` is whatever the
/// provider attached.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("provider error {code}: {message}")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The user dismissed the wallet prompt
    pub fn user_rejected() -> Self {
        Self::new(USER_REJECTED_CODE, "User rejected the request.")
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == USER_REJECTED_CODE
    }
}

/// SDK error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// No wallet provider was injected into the host
    #[error("No wallet provider available, install a wallet")]
    ProviderUnavailable,

    /// The user rejected the authorization prompt, or the provider failed it
    #[error("Wallet authorization denied: {0}")]
    AuthorizationDenied(String),

    /// The operation needs a connected account
    #[error("No active account, connect a wallet first")]
    NoActiveAccount,

    /// No deployment of the contract is known for the current network
    #[error("Contract not available on the current network")]
    ContractUnavailable,

    /// Input was not a non-negative decimal numeral
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Signing was cancelled or the chain refused the transaction
    #[error("Transaction rejected: {0}")]
    TransactionRejected(String),

    /// Unexpected provider or chain response
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Configuration or deployment artifact error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SyncError {
    /// Conditions the user can resolve from the UI (install, approve, connect, switch network)
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            SyncError::ProviderUnavailable
                | SyncError::AuthorizationDenied(_)
                | SyncError::NoActiveAccount
                | SyncError::ContractUnavailable
        )
    }
}

impl From<ProviderError> for SyncError {
    fn from(err: ProviderError) -> Self {
        SyncError::TransportError(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::TransportError(format!("malformed provider response: {}", err))
    }
}

impl From<alloy_sol_types::Error> for SyncError {
    fn from(err: alloy_sol_types::Error) -> Self {
        SyncError::TransportError(format!("undecodable contract response: {}", err))
    }
}
