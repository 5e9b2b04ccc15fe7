//! Reactive state store
//!
//! Keyed latest-value cache read by the UI. Writers go through
//! [`StateStore::set`]; readers either poll with [`StateStore::get`] or
//! [`StateStore::subscribe`].
//!
//! Notifications are queued, then drained by whichever `set` call is not
//! already inside a dispatch. A subscriber that writes back into the store
//! therefore never recurses or deadlocks: its write lands immediately and its
//! notification is delivered after the current one finishes.

use crate::contract::ContractHandle;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::debug;

/// Keys exposed to the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum StoreKey {
    #[serde(rename = "connectedAccount")]
    ConnectedAccount,
    #[serde(rename = "balance")]
    Balance,
    #[serde(rename = "mybalance")]
    MyBalance,
    #[serde(rename = "isStakeholder")]
    IsStakeholder,
    #[serde(rename = "contract")]
    Contract,
}

impl StoreKey {
    pub const ALL: [StoreKey; 5] = [
        StoreKey::ConnectedAccount,
        StoreKey::Balance,
        StoreKey::MyBalance,
        StoreKey::IsStakeholder,
        StoreKey::Contract,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectedAccount => "connectedAccount",
            Self::Balance => "balance",
            Self::MyBalance => "mybalance",
            Self::IsStakeholder => "isStakeholder",
            Self::Contract => "contract",
        }
    }
}

impl FromStr for StoreKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("unknown store key {:?}", s))
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Value held under a key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(untagged)]
pub enum StoreValue {
    /// Never set, or cleared
    #[default]
    Absent,
    /// Lowercased address
    Account(String),
    /// Display-unit amount
    Amount(String),
    Flag(bool),
    Contract(ContractHandle),
}

impl StoreValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, StoreValue::Absent)
    }
}

type Callback = Arc<dyn Fn(&StoreValue) + Send + Sync>;

struct Subscriber {
    id: u64,
    callback: Callback,
}

#[derive(Default)]
struct Entry {
    value: StoreValue,
    /// Ticket of the newest guarded write applied to this key
    version: u64,
    subscribers: Vec<Subscriber>,
}

#[derive(Default)]
struct StoreInner {
    entries: HashMap<StoreKey, Entry>,
    pending: VecDeque<(StoreKey, StoreValue)>,
    dispatching: bool,
    next_subscriber: u64,
}

/// Process-wide state container owned by the application root
#[derive(Default)]
pub struct StateStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current value, `Absent` when never set
    pub fn get(&self, key: StoreKey) -> StoreValue {
        self.lock()
            .entries
            .get(&key)
            .map(|entry| entry.value.clone())
            .unwrap_or_default()
    }

    /// Overwrite `key` and notify its subscribers in subscription order
    pub fn set(&self, key: StoreKey, value: StoreValue) {
        {
            let mut inner = self.lock();
            inner.entries.entry(key).or_default().value = value.clone();
            inner.pending.push_back((key, value));
        }
        self.drain();
    }

    /// Write only if `version` is at least the newest guarded write on `key`.
    ///
    /// Returns whether the write was applied. Unguarded [`set`](Self::set)
    /// calls do not move the version.
    pub fn set_versioned(&self, key: StoreKey, value: StoreValue, version: u64) -> bool {
        {
            let mut inner = self.lock();
            let entry = inner.entries.entry(key).or_default();
            if version < entry.version {
                debug!(
                    key = %key,
                    version,
                    newest = entry.version,
                    "Dropping stale store write"
                );
                return false;
            }
            entry.version = version;
            entry.value = value.clone();
            inner.pending.push_back((key, value));
        }
        self.drain();
        true
    }

    /// Register `callback` for `key`.
    ///
    /// The callback runs once right away with the current value, then after
    /// every write to the key until the returned handle is unsubscribed.
    pub fn subscribe<F>(&self, key: StoreKey, callback: F) -> Subscription
    where
        F: Fn(&StoreValue) + Send + Sync + 'static,
    {
        let callback: Callback = Arc::new(callback);
        let (id, current) = {
            let mut inner = self.lock();
            let id = inner.next_subscriber;
            inner.next_subscriber += 1;
            let entry = inner.entries.entry(key).or_default();
            entry.subscribers.push(Subscriber {
                id,
                callback: callback.clone(),
            });
            (id, entry.value.clone())
        };

        callback(&current);

        Subscription {
            store: Arc::downgrade(&self.inner),
            key,
            id,
        }
    }

    /// Logical reset: every key back to `Absent`, subscribers kept and notified
    pub fn reset(&self) {
        {
            let mut inner = self.lock();
            let keys: Vec<StoreKey> = inner.entries.keys().copied().collect();
            for key in keys {
                if let Some(entry) = inner.entries.get_mut(&key) {
                    entry.value = StoreValue::Absent;
                    entry.version = 0;
                }
                inner.pending.push_back((key, StoreValue::Absent));
            }
        }
        self.drain();
    }

    fn drain(&self) {
        {
            let mut inner = self.lock();
            if inner.dispatching {
                return;
            }
            inner.dispatching = true;
        }
        let mut guard = DispatchGuard {
            store: self,
            finished: false,
        };

        loop {
            let next = {
                let mut inner = self.lock();
                match inner.pending.pop_front() {
                    Some((key, value)) => {
                        let callbacks: Vec<Callback> = inner
                            .entries
                            .get(&key)
                            .map(|entry| {
                                entry
                                    .subscribers
                                    .iter()
                                    .map(|s| s.callback.clone())
                                    .collect()
                            })
                            .unwrap_or_default();
                        Some((value, callbacks))
                    }
                    None => {
                        // Cleared under the same lock as the empty pop so a
                        // concurrent writer either sees the flag or drains itself
                        inner.dispatching = false;
                        guard.finished = true;
                        None
                    }
                }
            };

            let Some((value, callbacks)) = next else {
                break;
            };
            for callback in callbacks {
                callback(&value);
            }
        }
    }

    // === Typed readers ===

    pub fn connected_account(&self) -> Option<String> {
        match self.get(StoreKey::ConnectedAccount) {
            StoreValue::Account(account) => Some(account),
            _ => None,
        }
    }

    /// DAO aggregate balance in display units
    pub fn balance(&self) -> Option<String> {
        match self.get(StoreKey::Balance) {
            StoreValue::Amount(amount) => Some(amount),
            _ => None,
        }
    }

    /// Caller contribution balance in display units
    pub fn my_balance(&self) -> Option<String> {
        match self.get(StoreKey::MyBalance) {
            StoreValue::Amount(amount) => Some(amount),
            _ => None,
        }
    }

    pub fn is_stakeholder(&self) -> Option<bool> {
        match self.get(StoreKey::IsStakeholder) {
            StoreValue::Flag(flag) => Some(flag),
            _ => None,
        }
    }

    pub fn contract(&self) -> Option<ContractHandle> {
        match self.get(StoreKey::Contract) {
            StoreValue::Contract(handle) => Some(handle),
            _ => None,
        }
    }

    /// All keys and values, for debugging and snapshots
    pub fn snapshot(&self) -> HashMap<StoreKey, StoreValue> {
        StoreKey::ALL
            .into_iter()
            .map(|key| (key, self.get(key)))
            .collect()
    }
}

/// Releases the dispatch flag when a subscriber panics mid-drain.
///
/// Notifications still queued stay pending and go out with the next write.
struct DispatchGuard<'a> {
    store: &'a StateStore,
    finished: bool,
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.store.lock().dispatching = false;
        }
    }
}

/// Handle returned by [`StateStore::subscribe`]
#[must_use = "dropping the handle keeps the subscription alive; call unsubscribe() to remove it"]
pub struct Subscription {
    store: Weak<Mutex<StoreInner>>,
    key: StoreKey,
    id: u64,
}

impl Subscription {
    pub fn key(&self) -> StoreKey {
        self.key
    }

    /// Stop receiving notifications
    pub fn unsubscribe(self) {
        if let Some(inner) = self.store.upgrade() {
            let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = inner.entries.get_mut(&self.key) {
                entry.subscribers.retain(|s| s.id != self.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn recorder() -> (
        Arc<Mutex<Vec<StoreValue>>>,
        impl Fn(&StoreValue) + Send + Sync + 'static,
    ) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |v: &StoreValue| sink.lock().unwrap().push(v.clone()))
    }

    #[test]
    fn test_get_defaults_to_absent() {
        let store = StateStore::new();
        for key in StoreKey::ALL {
            assert!(store.get(key).is_absent());
        }
        assert_eq!(store.balance(), None);
    }

    #[test]
    fn test_subscribe_receives_current_value_immediately() {
        let store = StateStore::new();
        store.set(StoreKey::Balance, StoreValue::Amount("3.5".into()));

        let (seen, callback) = recorder();
        let _sub = store.subscribe(StoreKey::Balance, callback);

        assert_eq!(*seen.lock().unwrap(), vec![StoreValue::Amount("3.5".into())]);
    }

    #[test]
    fn test_set_notifies_in_subscription_order() {
        let store = StateStore::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = order.clone();
        let _a = store.subscribe(StoreKey::MyBalance, move |v| {
            if !v.is_absent() {
                first.lock().unwrap().push("first");
            }
        });
        let second = order.clone();
        let _b = store.subscribe(StoreKey::MyBalance, move |v| {
            if !v.is_absent() {
                second.lock().unwrap().push("second");
            }
        });

        store.set(StoreKey::MyBalance, StoreValue::Amount("1".into()));
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_other_keys_not_notified() {
        let store = StateStore::new();
        let (seen, callback) = recorder();
        let _sub = store.subscribe(StoreKey::IsStakeholder, callback);

        store.set(StoreKey::Balance, StoreValue::Amount("9".into()));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let store = StateStore::new();
        let (seen, callback) = recorder();
        let sub = store.subscribe(StoreKey::Balance, callback);

        store.set(StoreKey::Balance, StoreValue::Amount("1".into()));
        sub.unsubscribe();
        store.set(StoreKey::Balance, StoreValue::Amount("2".into()));

        assert_eq!(seen.lock().unwrap().len(), 2);
        assert_eq!(store.balance(), Some("2".into()));
    }

    #[test]
    fn test_reentrant_set_is_queued() {
        let store = Arc::new(StateStore::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let (seen, record) = recorder();

        let writer = store.clone();
        let counter = calls.clone();
        let _sub = store.subscribe(StoreKey::Balance, move |v| {
            record(v);
            // Write back into the same key from inside the callback
            if *v == StoreValue::Amount("reset-me".into()) {
                counter.fetch_add(1, Ordering::SeqCst);
                writer.set(StoreKey::Balance, StoreValue::Amount("0".into()));
            }
        });

        store.set(StoreKey::Balance, StoreValue::Amount("reset-me".into()));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.balance(), Some("0".into()));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                StoreValue::Absent,
                StoreValue::Amount("reset-me".into()),
                StoreValue::Amount("0".into()),
            ]
        );
    }

    #[test]
    fn test_versioned_writes_drop_stale_tickets() {
        let store = StateStore::new();
        assert!(store.set_versioned(StoreKey::Balance, StoreValue::Amount("2".into()), 2));
        assert!(!store.set_versioned(StoreKey::Balance, StoreValue::Amount("1".into()), 1));
        assert_eq!(store.balance(), Some("2".into()));

        // Unguarded writes always land
        store.set(StoreKey::Balance, StoreValue::Amount("5".into()));
        assert_eq!(store.balance(), Some("5".into()));
    }

    #[test]
    fn test_reset_clears_and_notifies() {
        let store = StateStore::new();
        store.set(StoreKey::IsStakeholder, StoreValue::Flag(true));
        let (seen, callback) = recorder();
        let _sub = store.subscribe(StoreKey::IsStakeholder, callback);

        store.reset();

        assert_eq!(store.is_stakeholder(), None);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![StoreValue::Flag(true), StoreValue::Absent]
        );
    }

    #[test]
    fn test_panicking_subscriber_does_not_stall_dispatch() {
        let store = StateStore::new();
        let _faulty = store.subscribe(StoreKey::Balance, |v| {
            if *v == StoreValue::Amount("boom".into()) {
                panic!("subscriber failed");
            }
        });
        let (seen, callback) = recorder();
        let _sub = store.subscribe(StoreKey::MyBalance, callback);

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            store.set(StoreKey::Balance, StoreValue::Amount("boom".into()));
        }));
        assert!(outcome.is_err());
        assert_eq!(store.balance(), Some("boom".into()));

        store.set(StoreKey::MyBalance, StoreValue::Amount("1".into()));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![StoreValue::Absent, StoreValue::Amount("1".into())]
        );
    }

    #[test]
    fn test_pending_after_panic_delivered_on_next_write() {
        let store = Arc::new(StateStore::new());
        let (seen, record) = recorder();
        let _sub = store.subscribe(StoreKey::IsStakeholder, record);

        let writer = store.clone();
        let _faulty = store.subscribe(StoreKey::Balance, move |v| {
            if *v == StoreValue::Amount("boom".into()) {
                writer.set(StoreKey::IsStakeholder, StoreValue::Flag(true));
                panic!("subscriber failed");
            }
        });

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            store.set(StoreKey::Balance, StoreValue::Amount("boom".into()));
        }));
        assert!(outcome.is_err());
        assert_eq!(seen.lock().unwrap().len(), 1);

        store.set(StoreKey::IsStakeholder, StoreValue::Flag(false));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                StoreValue::Absent,
                StoreValue::Flag(true),
                StoreValue::Flag(false),
            ]
        );
    }

    #[test]
    fn test_key_names() {
        assert_eq!("mybalance".parse::<StoreKey>().unwrap(), StoreKey::MyBalance);
        assert_eq!(StoreKey::IsStakeholder.to_string(), "isStakeholder");
        assert!("balances".parse::<StoreKey>().is_err());
    }
}
