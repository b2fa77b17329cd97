use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::models::window::DEFAULT_MIN_PNL_VALUE;
use crate::models::{AccountKey, PeriodClock};
use crate::server::DisplayConfig;
use crate::telegram_notifier::TelegramCredentials;
use crate::tracker::refresh::{
    RefreshConfig, DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_CONCURRENT_FETCHES, DEFAULT_POLL_INTERVAL,
};
use crate::utils::helper::parse_account_key;

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_FAILURE_ALERT_THRESHOLD: u32 = 3;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, reason: impl Display) -> Self {
        ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Process configuration, read from the environment
#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub poll_interval: Duration,
    pub rpc_timeout: Duration,
    pub min_pnl_value: f64,
    pub max_concurrent_fetches: usize,
    pub bind_addr: SocketAddr,
    pub period_clock: PeriodClock,
    pub stale_after: Duration,
    pub failure_alert_threshold: u32,
    /// Wallets tracked from startup, before any page asks for them
    pub wallets: Vec<AccountKey>,
    pub telegram: Option<TelegramCredentials>,
}

impl Config {
    /// Load from process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let rpc_url = get("SOLANA_RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string());

        let poll_interval = parse_millis(&get, "POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL)?;
        let rpc_timeout = parse_millis(&get, "RPC_TIMEOUT_MS", DEFAULT_FETCH_TIMEOUT)?;
        let stale_after = parse_millis(&get, "STALE_AFTER_MS", poll_interval * 3)?;

        let min_pnl_value: f64 = parse_or(&get, "MIN_PNL_VALUE", DEFAULT_MIN_PNL_VALUE)?;
        if !min_pnl_value.is_finite() || min_pnl_value < 0.0 {
            return Err(ConfigError::invalid(
                "MIN_PNL_VALUE",
                &min_pnl_value.to_string(),
                "must be a non-negative number",
            ));
        }

        let max_concurrent_fetches: usize = parse_or(
            &get,
            "MAX_CONCURRENT_FETCHES",
            DEFAULT_MAX_CONCURRENT_FETCHES,
        )?;
        if max_concurrent_fetches == 0 {
            return Err(ConfigError::invalid(
                "MAX_CONCURRENT_FETCHES",
                "0",
                "must be at least 1",
            ));
        }

        let bind_addr: SocketAddr = match get("BIND_ADDR") {
            Some(raw) => raw
                .parse()
                .map_err(|e| ConfigError::invalid("BIND_ADDR", &raw, e))?,
            None => DEFAULT_BIND_ADDR
                .parse()
                .map_err(|e| ConfigError::invalid("BIND_ADDR", DEFAULT_BIND_ADDR, e))?,
        };

        let period_clock = parse_or(&get, "PERIOD_CLOCK", PeriodClock::default())?;
        let failure_alert_threshold: u32 = parse_or(
            &get,
            "FAILURE_ALERT_THRESHOLD",
            DEFAULT_FAILURE_ALERT_THRESHOLD,
        )?;
        if failure_alert_threshold == 0 {
            return Err(ConfigError::invalid(
                "FAILURE_ALERT_THRESHOLD",
                "0",
                "must be at least 1",
            ));
        }

        let wallets = match get("WALLET_ADDRESSES") {
            Some(raw) => parse_wallets(&raw)?,
            None => Vec::new(),
        };

        let telegram = match (get("TG_TOKEN"), get("CHAT_ID")) {
            (Some(token), Some(chat_id)) => Some(TelegramCredentials { token, chat_id }),
            _ => None,
        };

        Ok(Self {
            rpc_url,
            poll_interval,
            rpc_timeout,
            min_pnl_value,
            max_concurrent_fetches,
            bind_addr,
            period_clock,
            stale_after,
            failure_alert_threshold,
            wallets,
            telegram,
        })
    }

    pub fn refresh_config(&self) -> RefreshConfig {
        RefreshConfig {
            poll_interval: self.poll_interval,
            fetch_timeout: self.rpc_timeout,
            max_concurrent_fetches: self.max_concurrent_fetches,
            period_clock: self.period_clock,
        }
    }

    pub fn display_config(&self) -> DisplayConfig {
        DisplayConfig {
            refresh_interval: self.poll_interval,
            stale_after: self.stale_after,
            period_clock: self.period_clock,
        }
    }
}

fn parse_or<G, T>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match get(key) {
        Some(raw) => raw.parse().map_err(|e| ConfigError::invalid(key, &raw, e)),
        None => Ok(default),
    }
}

fn parse_millis<G>(get: &G, key: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => {
            let millis: u64 = raw.parse().map_err(|e| ConfigError::invalid(key, &raw, e))?;
            if millis == 0 {
                return Err(ConfigError::invalid(key, &raw, "must be greater than zero"));
            }
            Ok(Duration::from_millis(millis))
        }
        None => Ok(default),
    }
}

/// Comma-separated wallet addresses
fn parse_wallets(raw: &str) -> Result<Vec<AccountKey>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            parse_account_key(s)
                .ok_or_else(|| ConfigError::invalid("WALLET_ADDRESSES", s, "not a wallet address"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();

        assert_eq!(config.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.stale_after, Duration::from_secs(15));
        assert_eq!(config.min_pnl_value, 0.0001);
        assert_eq!(config.max_concurrent_fetches, 16);
        assert_eq!(config.bind_addr, "0.0.0.0:5000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.period_clock, PeriodClock::Local);
        assert!(config.wallets.is_empty());
        assert!(config.telegram.is_none());
        assert_eq!(config.failure_alert_threshold, DEFAULT_FAILURE_ALERT_THRESHOLD);
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            ("SOLANA_RPC_URL", "http://localhost:8899"),
            ("POLL_INTERVAL_MS", "2000"),
            ("MIN_PNL_VALUE", "0.01"),
            ("PERIOD_CLOCK", "utc"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            (
                "WALLET_ADDRESSES",
                "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v, Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB",
            ),
        ])
        .unwrap();

        assert_eq!(config.rpc_url, "http://localhost:8899");
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.stale_after, Duration::from_secs(6));
        assert_eq!(config.min_pnl_value, 0.01);
        assert_eq!(config.period_clock, PeriodClock::Utc);
        assert_eq!(config.wallets.len(), 2);
        assert_eq!(config.refresh_config().poll_interval, Duration::from_secs(2));
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(matches!(
            load(&[("POLL_INTERVAL_MS", "soon")]),
            Err(ConfigError::Invalid { key: "POLL_INTERVAL_MS", .. })
        ));
        assert!(load(&[("POLL_INTERVAL_MS", "0")]).is_err());
        assert!(load(&[("MIN_PNL_VALUE", "-1")]).is_err());
        assert!(load(&[("MAX_CONCURRENT_FETCHES", "0")]).is_err());
        assert!(load(&[("PERIOD_CLOCK", "mars")]).is_err());
        assert!(matches!(
            load(&[("FAILURE_ALERT_THRESHOLD", "0")]),
            Err(ConfigError::Invalid { key: "FAILURE_ALERT_THRESHOLD", .. })
        ));
        assert!(matches!(
            load(&[("WALLET_ADDRESSES", "abc")]),
            Err(ConfigError::Invalid { key: "WALLET_ADDRESSES", .. })
        ));
    }

    #[test]
    fn telegram_needs_token_and_chat() {
        assert!(load(&[("TG_TOKEN", "t")]).unwrap().telegram.is_none());

        let config = load(&[("TG_TOKEN", "t"), ("CHAT_ID", "42")]).unwrap();
        assert_eq!(
            config.telegram,
            Some(TelegramCredentials {
                token: "t".into(),
                chat_id: "42".into()
            })
        );
    }
}
