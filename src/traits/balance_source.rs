use async_trait::async_trait;
use thiserror::Error;

use crate::models::AccountKey;

/// Why a balance could not be fetched this tick
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    /// Transport failure or timeout; the ledger may answer next time
    #[error("balance source unreachable: {0}")]
    Unreachable(String),

    /// The ledger answered with something that is not a balance
    #[error("malformed balance response: {0}")]
    MalformedResponse(String),

    /// The source cannot address this account at all
    #[error("invalid account {0}")]
    InvalidAccount(String),
}

/// Answers "what is this account's balance right now", in SOL
#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn fetch_balance(&self, account: &AccountKey) -> Result<f64, SourceError>;
}
