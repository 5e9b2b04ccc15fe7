//! Scripted in-memory provider
//!
//! Stands in for an injected wallet in tests and UI previews. Contract reads
//! are answered per 4-byte selector from a reply queue; the last queued reply
//! is sticky so a single `reply` covers any number of calls.

use super::{EventSink, ProviderEvent, ProviderEventKind, WalletProvider};
use crate::error::ProviderError;
use alloy_primitives::{Bytes, TxHash};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone)]
struct MockReply {
    result: Result<Bytes, ProviderError>,
    delay: Duration,
}

#[derive(Debug)]
struct MockState {
    /// Accounts `eth_accounts` reports (already authorized)
    authorized: Vec<String>,
    /// Outcome of the next `eth_requestAccounts` prompt
    authorization: Result<Vec<String>, ProviderError>,
    /// How long the prompt stays open before deciding
    authorization_delay: Duration,
    network: Value,
    replies: HashMap<[u8; 4], VecDeque<MockReply>>,
    send_result: Result<TxHash, ProviderError>,
    sent: Vec<Value>,
    sinks: HashMap<ProviderEventKind, Vec<EventSink>>,
    requests: Vec<String>,
}

/// In-memory [`WalletProvider`]
#[derive(Debug)]
pub struct MockWallet {
    state: Mutex<MockState>,
}

impl Default for MockWallet {
    fn default() -> Self {
        Self::new()
    }
}

impl MockWallet {
    /// Locked wallet on network 5777 with no scripted replies
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                authorized: Vec::new(),
                authorization: Err(ProviderError::user_rejected()),
                authorization_delay: Duration::ZERO,
                network: json!("5777"),
                replies: HashMap::new(),
                send_result: Ok(TxHash::repeat_byte(0xab)),
                sent: Vec::new(),
                sinks: HashMap::new(),
                requests: Vec::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Approve the next authorization prompt with `accounts`
    pub fn approve(&self, accounts: &[&str]) -> &Self {
        self.state().authorization = Ok(accounts.iter().map(|a| a.to_string()).collect());
        self
    }

    /// Reject the next authorization prompt
    pub fn reject(&self, error: ProviderError) -> &Self {
        self.state().authorization = Err(error);
        self
    }

    /// Keep authorization prompts open for `delay` before answering
    pub fn delay_authorization(&self, delay: Duration) -> &Self {
        self.state().authorization_delay = delay;
        self
    }

    /// Mark accounts as already authorized (visible to `eth_accounts`)
    pub fn authorize(&self, accounts: &[&str]) -> &Self {
        self.state().authorized = accounts.iter().map(|a| a.to_string()).collect();
        self
    }

    /// Network id reported by `net_version`
    pub fn set_network(&self, network: impl Into<Value>) -> &Self {
        self.state().network = network.into();
        self
    }

    /// Queue an immediate reply for calls with `selector`
    pub fn reply(&self, selector: [u8; 4], result: Result<Vec<u8>, ProviderError>) -> &Self {
        self.reply_after(selector, result, Duration::ZERO)
    }

    /// Queue a reply delivered after `delay`
    pub fn reply_after(
        &self,
        selector: [u8; 4],
        result: Result<Vec<u8>, ProviderError>,
        delay: Duration,
    ) -> &Self {
        self.state()
            .replies
            .entry(selector)
            .or_default()
            .push_back(MockReply {
                result: result.map(Bytes::from),
                delay,
            });
        self
    }

    /// Drop every queued reply for `selector`
    pub fn clear_replies(&self, selector: [u8; 4]) -> &Self {
        self.state().replies.remove(&selector);
        self
    }

    /// Outcome of every subsequent `eth_sendTransaction`
    pub fn set_send_result(&self, result: Result<TxHash, ProviderError>) -> &Self {
        self.state().send_result = result;
        self
    }

    /// Transaction objects submitted so far
    pub fn sent_transactions(&self) -> Vec<Value> {
        self.state().sent.clone()
    }

    /// RPC methods received so far, in order
    pub fn request_log(&self) -> Vec<String> {
        self.state().requests.clone()
    }

    /// Number of live subscriptions for `kind`
    pub fn subscriber_count(&self, kind: ProviderEventKind) -> usize {
        self.state()
            .sinks
            .get(&kind)
            .map(|sinks| sinks.iter().filter(|s| !s.is_closed()).count())
            .unwrap_or(0)
    }

    /// Publish an event to every subscriber of its kind
    pub async fn emit(&self, event: ProviderEvent) {
        let sinks = self
            .state()
            .sinks
            .get(&event.kind())
            .cloned()
            .unwrap_or_default();

        for sink in sinks {
            let _ = sink.send(event.clone()).await;
        }
    }

    fn next_reply(&self, params: &Value) -> Result<MockReply, ProviderError> {
        let data: Bytes = params
            .get(0)
            .and_then(|call| call.get("data"))
            .cloned()
            .and_then(|data| serde_json::from_value(data).ok())
            .ok_or_else(|| ProviderError::new(-32602, "missing call data"))?;

        let selector: [u8; 4] = data
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| ProviderError::new(-32602, "call data shorter than a selector"))?;

        let mut state = self.state();
        let queue = state
            .replies
            .get_mut(&selector)
            .ok_or_else(|| ProviderError::new(-32000, "execution reverted"))?;

        let reply = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        reply.ok_or_else(|| ProviderError::new(-32000, "execution reverted"))
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.state().requests.push(method.to_string());

        match method {
            "eth_requestAccounts" => {
                let delay = self.state().authorization_delay;
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                let mut state = self.state();
                let accounts = state.authorization.clone()?;
                state.authorized = accounts.clone();
                Ok(json!(accounts))
            }
            "eth_accounts" => Ok(json!(self.state().authorized)),
            "net_version" => Ok(self.state().network.clone()),
            "eth_call" => {
                let reply = self.next_reply(&params)?;
                if !reply.delay.is_zero() {
                    tokio::time::sleep(reply.delay).await;
                }
                reply.result.map(|bytes| json!(bytes))
            }
            "eth_sendTransaction" => {
                let mut state = self.state();
                let hash = state.send_result.clone()?;
                if let Some(tx) = params.get(0) {
                    state.sent.push(tx.clone());
                }
                Ok(json!(hash))
            }
            other => Err(ProviderError::new(
                -32601,
                format!("method {} not supported", other),
            )),
        }
    }

    fn on(&self, kind: ProviderEventKind, sink: EventSink) {
        self.state().sinks.entry(kind).or_default().push(sink);
    }
}
