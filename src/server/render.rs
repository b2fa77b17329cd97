use std::time::Duration;

use crate::models::{AccountKey, AccountSnapshot, WindowKind};
use crate::utils::helper::format_signed_sol;

const SOL_ICON: &str = r#"<img src="https://cryptologos.cc/logos/solana-sol-logo.png" alt="SOL" class="solana-icon">"#;

const STYLE: &str = r#"
        body {
            font-family: monaco, Consolas, Lucida Console, monospace;
            background-color: rgba(33, 33, 33, 0.9);
            color: #ffffff;
            text-align: center;
        }
        .container { display: flex; justify-content: center; align-items: center; }
        .balance, .pnl { font-size: 3.6rem; margin: 0.8rem; padding: 2rem; }
        .balance-title, .pnl-title { font-size: 1.2rem; color: #b0b0b0; margin-bottom: 0.8rem; }
        .balance-value, .pnl-value {
            display: flex;
            justify-content: center;
            align-items: center;
            font-size: 2.4rem;
            font-weight: bold;
        }
        .balance-value > img, .pnl-value > img { margin-left: 0.8rem; }
        .pnl-positive { color: #00ff00; }
        .pnl-negative { color: #ff0000; }
        .pnl-neutral { color: #ffffff; }
        .stale { color: #b0b0b0; font-size: 0.9rem; }
        .solana-icon { width: 20px; height: 20px; vertical-align: middle; }
"#;

/// What the dashboard shows besides balance and today's PnL
#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub show_week_pnl: bool,
    pub show_month_pnl: bool,
    pub refresh_interval: Duration,
    pub stale: bool,
}

/// CSS class for a PnL value
pub fn pnl_class(pnl: f64) -> &'static str {
    if pnl > 0.0 {
        "pnl-positive"
    } else if pnl < 0.0 {
        "pnl-negative"
    } else {
        "pnl-neutral"
    }
}

fn pnl_block(kind: WindowKind, pnl: f64) -> String {
    format!(
        r#"        <div class="pnl {class}">
            <div class="pnl-title">{title}</div>
            <div class="pnl-value">{value} {icon}</div>
        </div>
"#,
        class = pnl_class(pnl),
        title = kind.title(),
        value = format_signed_sol(pnl),
        icon = SOL_ICON,
    )
}

/// Self-refreshing HTML page with the wallet's balance and PnL
pub fn render_dashboard(
    wallet: &AccountKey,
    snapshot: &AccountSnapshot,
    options: &DashboardOptions,
) -> String {
    let mut blocks = pnl_block(WindowKind::Day, snapshot.day_pnl);
    if options.show_week_pnl {
        blocks.push_str(&pnl_block(WindowKind::Week, snapshot.week_pnl));
    }
    if options.show_month_pnl {
        blocks.push_str(&pnl_block(WindowKind::Month, snapshot.month_pnl));
    }

    let stale_note = if options.stale {
        r#"    <div class="stale">waiting for a fresh balance…</div>
"#
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Solana Wallet Tracker</title>
    <script>
        setInterval(() => {{
            window.location.reload();
        }}, {refresh_ms});
    </script>
    <style>{style}</style>
</head>
<body data-wallet="{wallet}">
    <div class="container">
        <div class="balance">
            <div class="balance-title">BALANCE</div>
            <div class="balance-value">{balance:.2} {icon}</div>
        </div>
{blocks}    </div>
{stale_note}</body>
</html>
"#,
        refresh_ms = options.refresh_interval.as_millis(),
        style = STYLE,
        wallet = wallet,
        balance = snapshot.current_balance,
        icon = SOL_ICON,
        blocks = blocks,
        stale_note = stale_note,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::window::DEFAULT_MIN_PNL_VALUE;
    use crate::models::AccountState;
    use chrono::NaiveDate;

    fn options(week: bool, month: bool) -> DashboardOptions {
        DashboardOptions {
            show_week_pnl: week,
            show_month_pnl: month,
            refresh_interval: Duration::from_secs(5),
            stale: false,
        }
    }

    fn observed(first: f64, second: f64) -> AccountSnapshot {
        let day = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();
        let mut state = AccountState::new(DEFAULT_MIN_PNL_VALUE);
        state.apply_observation(first, day.and_hms_opt(9, 0, 0).unwrap());
        state.apply_observation(second, day.and_hms_opt(9, 5, 0).unwrap());
        state.snapshot()
    }

    #[test]
    fn shows_only_requested_windows() {
        let wallet = AccountKey::new("wallet-a");
        let snapshot = observed(5.0, 5.3);

        let page = render_dashboard(&wallet, &snapshot, &options(false, false));
        assert!(page.contains("TODAY PNL"));
        assert!(!page.contains("WEEKLY PNL"));
        assert!(!page.contains("MONTHLY PNL"));

        let page = render_dashboard(&wallet, &snapshot, &options(true, true));
        assert!(page.contains("WEEKLY PNL"));
        assert!(page.contains("MONTHLY PNL"));
    }

    #[test]
    fn colours_and_signs_follow_pnl() {
        let wallet = AccountKey::new("wallet-a");

        let gain = render_dashboard(&wallet, &observed(5.0, 5.3), &options(false, false));
        assert!(gain.contains(r#"class="pnl pnl-positive""#));
        assert!(gain.contains("+0.30"));
        assert!(gain.contains("5.30"));

        let loss = render_dashboard(&wallet, &observed(5.0, 4.5), &options(false, false));
        assert!(loss.contains(r#"class="pnl pnl-negative""#));
        assert!(loss.contains("-0.50"));

        let flat = render_dashboard(&wallet, &observed(5.0, 5.0), &options(false, false));
        assert!(flat.contains(r#"class="pnl pnl-neutral""#));
    }

    #[test]
    fn refresh_interval_drives_reload() {
        let wallet = AccountKey::new("wallet-a");
        let mut opts = options(false, false);
        opts.refresh_interval = Duration::from_millis(2500);
        let page = render_dashboard(&wallet, &observed(1.0, 1.0), &opts);
        assert!(page.contains("}, 2500);"));
        assert!(!page.contains("waiting for a fresh balance"));

        opts.stale = true;
        let page = render_dashboard(&wallet, &observed(1.0, 1.0), &opts);
        assert!(page.contains("waiting for a fresh balance"));
    }
}
