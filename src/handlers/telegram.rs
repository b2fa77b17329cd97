// In src/handlers/telegram.rs

use async_trait::async_trait;
use tracing::info;

use crate::models::{AccountKey, AccountSnapshot, WindowKind};
use crate::telegram_notifier::TelegramNotifier;
use crate::traits::balance_source::SourceError;
use crate::traits::event_handler::RefreshEventHandler;
use crate::utils::helper::format_signed_sol;

/// Telegram notification event handler.
///
/// Posts when tracking starts, when a day/week/month closes, and once per
/// failure streak when fetches keep failing.
pub struct TelegramEventHandler {
    notifier: TelegramNotifier,
    failure_alert_threshold: u32,
}

impl TelegramEventHandler {
    /// Create a new Telegram event handler.
    /// The failure alert fires when a streak reaches exactly `failure_alert_threshold`.
    pub fn new(notifier: TelegramNotifier, failure_alert_threshold: u32) -> Self {
        Self {
            notifier,
            failure_alert_threshold,
        }
    }

    /// Check if Telegram is enabled
    pub fn is_enabled(&self) -> bool {
        self.notifier.is_enabled()
    }

    /// Message for the first balance seen for a wallet
    pub fn format_tracking_started(account: &AccountKey, current: &AccountSnapshot) -> String {
        format!(
            "🚀 <b>Wallet Tracking Started</b>\n\n\
             👛 <b>Wallet:</b> <code>{}</code>\n\
             🪙 <b>SOL Balance:</b> ◎{:.2}",
            account, current.current_balance
        )
    }

    /// Message summarizing the windows that closed with this observation.
    /// `prior` still holds the closed periods' figures.
    pub fn format_closed_windows(
        account: &AccountKey,
        prior: &AccountSnapshot,
        closed: &[WindowKind],
    ) -> String {
        let mut message = format!(
            "📅 <b>PnL Period Closed</b>\n\n👛 <b>Wallet:</b> <code>{}</code>\n",
            account
        );

        for &kind in closed {
            let pnl = prior.pnl(kind);
            let emoji = if pnl > 0.0 {
                "📈"
            } else if pnl < 0.0 {
                "📉"
            } else {
                "➖"
            };
            let started = prior
                .period(kind)
                .map(|p| p.to_string())
                .unwrap_or_default();
            message.push_str(&format!(
                "{} <b>{}</b> from {}: {} SOL\n",
                emoji,
                kind.title(),
                started,
                format_signed_sol(pnl)
            ));
        }

        message.push_str(&format!("🪙 <b>Balance:</b> ◎{:.2}", prior.current_balance));
        message
    }

    /// Message for a wallet whose fetches keep failing
    pub fn format_failure_alert(
        account: &AccountKey,
        error: &SourceError,
        consecutive_failures: u32,
    ) -> String {
        format!(
            "❌ <b>Balance Updates Failing</b>\n\n\
             👛 <b>Wallet:</b> <code>{}</code>\n\
             🔁 <b>Failed fetches in a row:</b> {}\n\
             ⚠️ <b>Error:</b> {}\n\n\
             <i>Showing last known balance until the RPC recovers.</i>",
            account, consecutive_failures, error
        )
    }
}

#[async_trait]
impl RefreshEventHandler for TelegramEventHandler {
    async fn on_observation(
        &self,
        account: &AccountKey,
        prior: &AccountSnapshot,
        current: &AccountSnapshot,
    ) {
        if !prior.is_observed() {
            let message = Self::format_tracking_started(account, current);
            self.notifier.send_notification(&message).await;
            info!("Sent Telegram notification: tracking started for {}", account);
            return;
        }

        let closed = prior.closed_windows(current);
        if closed.is_empty() {
            return;
        }

        let message = Self::format_closed_windows(account, prior, &closed);
        self.notifier.send_notification(&message).await;
        info!("Sent Telegram notification: {} closed window(s) for {}", closed.len(), account);
    }

    async fn on_fetch_error(
        &self,
        account: &AccountKey,
        error: &SourceError,
        consecutive_failures: u32,
    ) {
        if consecutive_failures != self.failure_alert_threshold {
            return;
        }

        let message = Self::format_failure_alert(account, error, consecutive_failures);
        self.notifier.send_notification(&message).await;
    }
}
