use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_request::RpcError;
use solana_commitment_config::{CommitmentConfig, CommitmentLevel};
use tracing::debug;

use crate::models::AccountKey;
use crate::traits::balance_source::{BalanceSource, SourceError};
use crate::utils::helper::{lamports_to_sol, parse_pubkey};

/// Balance source backed by the Solana JSON-RPC `getBalance` call
pub struct RpcBalanceSource {
    rpc_client: Arc<RpcClient>,
}

impl RpcBalanceSource {
    /// Create a new RPC balance source; `timeout` bounds each HTTP request
    pub fn new(rpc_url: String, timeout: Duration) -> Self {
        let client = RpcClient::new_with_timeout_and_commitment(
            rpc_url,
            timeout,
            CommitmentConfig { commitment: CommitmentLevel::Confirmed },
        );

        Self {
            rpc_client: Arc::new(client),
        }
    }
}

#[async_trait]
impl BalanceSource for RpcBalanceSource {
    async fn fetch_balance(&self, account: &AccountKey) -> Result<f64, SourceError> {
        let wallet = parse_pubkey(account.as_str())
            .map_err(|e| SourceError::InvalidAccount(e.to_string()))?;

        let lamports = self
            .rpc_client
            .get_balance(&wallet)
            .await
            .map_err(classify_client_error)?;

        debug!("Fetched {} lamports for {}", lamports, account);
        Ok(lamports_to_sol(lamports))
    }
}

/// Split RPC client failures into "try again later" and "bad answer"
fn classify_client_error(err: ClientError) -> SourceError {
    match err.kind() {
        ClientErrorKind::SerdeJson(e) => SourceError::MalformedResponse(e.to_string()),
        ClientErrorKind::RpcError(RpcError::ParseError(msg)) => {
            SourceError::MalformedResponse(msg.clone())
        }
        ClientErrorKind::RpcError(RpcError::RpcResponseError { message, .. }) => {
            SourceError::MalformedResponse(message.clone())
        }
        _ => SourceError::Unreachable(err.to_string()),
    }
}
