use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::RwLock;
use tracing::info;

use crate::models::{AccountKey, AccountSnapshot, AccountState};

/// Shared handle to one account's state
pub type AccountHandle = Arc<RwLock<AccountState>>;

/// Every tracked account, keyed by wallet address.
///
/// Entries are created on first touch and never removed.
pub struct AccountRegistry {
    accounts: DashMap<AccountKey, AccountHandle>,
    min_pnl_value: f64,
}

impl AccountRegistry {
    pub fn new(min_pnl_value: f64) -> Self {
        Self {
            accounts: DashMap::new(),
            min_pnl_value,
        }
    }

    /// Existing state for `key`, or a fresh empty one inserted atomically
    pub fn ensure(&self, key: &AccountKey) -> AccountHandle {
        if let Some(existing) = self.accounts.get(key) {
            return existing.value().clone();
        }

        self.accounts
            .entry(key.clone())
            .or_insert_with(|| {
                info!("Tracking new wallet: {}", key);
                Arc::new(RwLock::new(AccountState::new(self.min_pnl_value)))
            })
            .value()
            .clone()
    }

    /// Keys tracked at the time of the call
    pub fn list_keys(&self) -> Vec<AccountKey> {
        self.accounts.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Current snapshot of `key`, `None` if it was never registered
    pub async fn read(&self, key: &AccountKey) -> Option<AccountSnapshot> {
        let handle = self.accounts.get(key).map(|entry| entry.value().clone())?;
        let state = handle.read().await;
        Some(state.snapshot())
    }

    pub fn contains(&self, key: &AccountKey) -> bool {
        self.accounts.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
