use async_trait::async_trait;

use crate::models::{AccountKey, AccountSnapshot};
use crate::traits::balance_source::SourceError;

/// Receives what the refresh loop did for each account
#[async_trait]
pub trait RefreshEventHandler: Send + Sync {
    /// A balance was applied; `prior` is the state just before it
    async fn on_observation(
        &self,
        account: &AccountKey,
        prior: &AccountSnapshot,
        current: &AccountSnapshot,
    );

    /// A fetch failed; the account's state was left as it was
    async fn on_fetch_error(
        &self,
        account: &AccountKey,
        error: &SourceError,
        consecutive_failures: u32,
    );
}
