//! Shared fixtures for integration tests

#![allow(dead_code)]

use dominion_sdk::provider::mock::MockWallet;
use dominion_sdk::{Address, DeploymentTable, IDominionDao, NetworkId, U256};
use alloy_sol_types::{SolCall, SolValue};
use std::sync::Arc;
use std::time::Duration;

pub const ALICE: &str = "0x00000000000000000000000000000000000a11ce";
pub const BOB: &str = "0x0000000000000000000000000000000000000b0b";

pub const STAKEHOLDER: [u8; 4] = IDominionDao::isStakeholderCall::SELECTOR;
pub const DAO_BALANCE: [u8; 4] = IDominionDao::daoBalanceCall::SELECTOR;
pub const MY_BALANCE: [u8; 4] = IDominionDao::getBalanceCall::SELECTOR;

/// ABI-encoded `n` ether, as a contract read returns it
pub fn ether(n: u64) -> Vec<u8> {
    (U256::from(n) * U256::from(10u64).pow(U256::from(18u64))).abi_encode()
}

pub fn contract_address() -> Address {
    Address::repeat_byte(0x42)
}

/// DominionDAO deployed on the local dev network (5777) only
pub fn deployments() -> DeploymentTable {
    DeploymentTable::default().with_deployment(NetworkId::from(5777), contract_address())
}

/// Wallet that approves ALICE and answers every read
pub fn scripted_wallet() -> Arc<MockWallet> {
    let mock = Arc::new(MockWallet::new());
    mock.approve(&[ALICE])
        .reply(STAKEHOLDER, Ok(true.abi_encode()))
        .reply(DAO_BALANCE, Ok(ether(12)))
        .reply(MY_BALANCE, Ok(ether(2)));
    mock
}

/// Replace the sticky reply for `selector`
pub fn answer(mock: &MockWallet, selector: [u8; 4], bytes: Vec<u8>) {
    mock.clear_replies(selector).reply(selector, Ok(bytes));
}

/// Poll until `cond` holds, giving the dispatcher task time to run
pub async fn wait_for<F: Fn() -> bool>(cond: F) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
