//! Network-bound contract handle

use crate::error::Result;
use crate::network::NetworkId;
use crate::provider::{CallRequest, Wallet};
use alloy_primitives::{Address, TxHash, U256};
use alloy_sol_types::{sol, SolCall};
use serde::Serialize;

sol! {
    /// Client-facing surface of the DominionDAO contract
    #[derive(Debug)]
    interface IDominionDao {
        function contribute() external payable;
        function isStakeholder() external view returns (bool);
        function daoBalance() external view returns (uint256);
        function getBalance() external view returns (uint256);
    }
}

/// Capability to call the contract deployed at `address` on `network`.
///
/// Only valid while the wallet stays on `network`; the resolver drops it on
/// a network switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractHandle {
    network: NetworkId,
    address: Address,
    interface: String,
}

impl ContractHandle {
    pub fn new(network: NetworkId, address: Address, interface: impl Into<String>) -> Self {
        Self {
            network,
            address,
            interface: interface.into(),
        }
    }

    pub fn network(&self) -> &NetworkId {
        &self.network
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Name of the bound interface (the artifact's contract name)
    pub fn interface(&self) -> &str {
        &self.interface
    }

    async fn read<C: SolCall>(
        &self,
        wallet: &Wallet,
        call: C,
        from: Option<Address>,
    ) -> Result<C::Return> {
        let mut request = CallRequest::new(self.address, call.abi_encode());
        if let Some(from) = from {
            request = request.with_from(from);
        }
        let output = wallet.call(&request).await?;
        Ok(C::abi_decode_returns(&output, true)?)
    }

    /// `isStakeholder()` evaluated for `caller`
    pub async fn is_stakeholder(&self, wallet: &Wallet, caller: Address) -> Result<bool> {
        let ret = self
            .read(wallet, IDominionDao::isStakeholderCall {}, Some(caller))
            .await?;
        Ok(ret._0)
    }

    /// `daoBalance()`, the contract's aggregate balance in base units
    pub async fn dao_balance(&self, wallet: &Wallet) -> Result<U256> {
        let ret = self
            .read(wallet, IDominionDao::daoBalanceCall {}, None)
            .await?;
        Ok(ret._0)
    }

    /// `getBalance()` evaluated for `caller`, in base units
    pub async fn get_balance(&self, wallet: &Wallet, caller: Address) -> Result<U256> {
        let ret = self
            .read(wallet, IDominionDao::getBalanceCall {}, Some(caller))
            .await?;
        Ok(ret._0)
    }

    /// Payable `contribute()` from `from` carrying `value` base units.
    ///
    /// Returns the hash once the wallet accepts the transaction.
    pub async fn contribute(&self, wallet: &Wallet, from: Address, value: U256) -> Result<TxHash> {
        let request = CallRequest::new(self.address, IDominionDao::contributeCall {}.abi_encode())
            .with_from(from)
            .with_value(value);
        wallet.send_transaction(&request).await
    }
}
