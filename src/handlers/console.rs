use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::models::{AccountKey, AccountSnapshot, WindowKind};
use crate::traits::balance_source::SourceError;
use crate::traits::event_handler::RefreshEventHandler;
use crate::utils::helper::{format_account, format_signed_sol};

/// Console logging event handler
pub struct ConsoleEventHandler;

impl ConsoleEventHandler {
    /// Create a new console event handler
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RefreshEventHandler for ConsoleEventHandler {
    async fn on_observation(
        &self,
        account: &AccountKey,
        prior: &AccountSnapshot,
        current: &AccountSnapshot,
    ) {
        let wallet = format_account(account);

        for kind in prior.closed_windows(current) {
            info!(
                "{} {} closed at {} SOL (PnL {})",
                wallet,
                kind,
                prior.current_balance,
                format_signed_sol(prior.pnl(kind))
            );
        }

        if !prior.is_observed() {
            info!("{} first balance: ◎{:.2}", wallet, current.current_balance);
            return;
        }

        if prior.current_balance == current.current_balance
            && WindowKind::ALL
                .iter()
                .all(|&kind| prior.pnl(kind) == current.pnl(kind))
        {
            debug!("{} unchanged at ◎{:.2}", wallet, current.current_balance);
            return;
        }

        let indicator = if current.current_balance >= prior.current_balance {
            "↑"
        } else {
            "↓"
        };
        info!(
            "{} {} ◎{:.2} → ◎{:.2} | day {} | week {} | month {}",
            indicator,
            wallet,
            prior.current_balance,
            current.current_balance,
            format_signed_sol(current.day_pnl),
            format_signed_sol(current.week_pnl),
            format_signed_sol(current.month_pnl)
        );
    }

    async fn on_fetch_error(
        &self,
        account: &AccountKey,
        error: &SourceError,
        consecutive_failures: u32,
    ) {
        warn!(
            "Balance fetch for {} failed ({} in a row): {}",
            format_account(account),
            consecutive_failures,
            error
        );
    }
}
