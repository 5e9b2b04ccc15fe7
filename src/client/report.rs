//! Per-read outcome of a refresh

use crate::error::{Result, SyncError};
use crate::store::StoreKey;

/// Outcome of the three independent reads behind a refresh.
///
/// Each successful read has already been written to its store key; failed
/// reads left their key untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    /// Monotonic refresh ticket, used by the sequence guard
    pub ticket: u64,
    pub is_stakeholder: Result<bool>,
    /// DAO aggregate balance, display units
    pub dao_balance: Result<String>,
    /// Caller balance, display units
    pub my_balance: Result<String>,
}

impl RefreshReport {
    /// Whether all three reads succeeded
    pub fn is_complete(&self) -> bool {
        self.errors().is_empty()
    }

    /// Failed reads keyed by the store entry they would have written
    pub fn errors(&self) -> Vec<(StoreKey, &SyncError)> {
        let mut errors = Vec::new();
        if let Err(e) = &self.is_stakeholder {
            errors.push((StoreKey::IsStakeholder, e));
        }
        if let Err(e) = &self.dao_balance {
            errors.push((StoreKey::Balance, e));
        }
        if let Err(e) = &self.my_balance {
            errors.push((StoreKey::MyBalance, e));
        }
        errors
    }

    /// Collapse to the first failure, for callers that treat partial success as failure
    pub fn into_result(self) -> Result<Self> {
        let first = self.errors().first().map(|(_, e)| (*e).clone());
        match first {
            Some(e) => Err(e),
            None => Ok(self),
        }
    }
}
