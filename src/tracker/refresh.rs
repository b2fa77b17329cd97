use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use dashmap::DashMap;
use futures_util::stream::{self, StreamExt};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::models::{AccountKey, PeriodClock};
use crate::traits::balance_source::{BalanceSource, SourceError};
use crate::traits::event_handler::RefreshEventHandler;
use crate::tracker::registry::AccountRegistry;

/// Default time between ticks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default bound on a single balance fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of balance fetches in flight per tick
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 16;

#[derive(Debug, Clone)]
pub struct RefreshConfig {
    pub poll_interval: Duration,
    pub fetch_timeout: Duration,
    pub max_concurrent_fetches: usize,
    pub period_clock: PeriodClock,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            period_clock: PeriodClock::default(),
        }
    }
}

/// Outcome of one pass over the registry
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub attempted: usize,
    pub updated: usize,
    pub failed: usize,
}

/// Polls the balance source for every registered account and feeds
/// the results into each account's window tracker
pub struct RefreshLoop {
    registry: Arc<AccountRegistry>,
    source: Arc<dyn BalanceSource>,
    events: Arc<dyn RefreshEventHandler>,
    failures: DashMap<AccountKey, u32>,
    config: RefreshConfig,
}

impl RefreshLoop {
    pub fn new(
        registry: Arc<AccountRegistry>,
        source: Arc<dyn BalanceSource>,
        events: Arc<dyn RefreshEventHandler>,
        config: RefreshConfig,
    ) -> Self {
        Self {
            registry,
            source,
            events,
            failures: DashMap::new(),
            config,
        }
    }

    /// Current failure streak for `account`
    pub fn consecutive_failures(&self, account: &AccountKey) -> u32 {
        self.failures.get(account).map(|n| *n).unwrap_or(0)
    }

    /// Run forever, one tick per poll interval
    pub async fn run(&self) {
        info!(
            "Starting balance polling with interval: {}ms",
            self.config.poll_interval.as_millis()
        );

        loop {
            let started = Instant::now();
            let report = self.tick().await;

            if report.attempted > 0 {
                debug!(
                    "Tick completed in {:?}: {} updated, {} failed",
                    started.elapsed(),
                    report.updated,
                    report.failed
                );
            }
            if report.failed > 0 && report.updated == 0 {
                warn!("All {} balance fetches failed this tick", report.failed);
            }

            let elapsed = started.elapsed();
            if let Some(remaining) = self.config.poll_interval.checked_sub(elapsed) {
                tokio::time::sleep(remaining).await;
            }
        }
    }

    /// One pass, stamping each observation with the configured wall clock
    pub async fn tick(&self) -> TickReport {
        let clock = self.config.period_clock;
        self.run_tick(move || clock.now()).await
    }

    /// One pass, stamping every observation with `now`
    pub async fn tick_at(&self, now: NaiveDateTime) -> TickReport {
        self.run_tick(move || now).await
    }

    async fn run_tick<F>(&self, now: F) -> TickReport
    where
        F: Fn() -> NaiveDateTime,
    {
        let keys = self.registry.list_keys();
        let mut report = TickReport {
            attempted: keys.len(),
            ..TickReport::default()
        };

        let mut fetches = stream::iter(keys)
            .map(|key| async move {
                let result = self.fetch_with_timeout(&key).await;
                (key, result)
            })
            .buffer_unordered(self.config.max_concurrent_fetches.max(1));

        while let Some((key, result)) = fetches.next().await {
            match result {
                Ok(balance) => {
                    self.record_observation(&key, balance, now()).await;
                    report.updated += 1;
                }
                Err(e) => {
                    self.record_failure(&key, e).await;
                    report.failed += 1;
                }
            }
        }

        report
    }

    async fn fetch_with_timeout(&self, key: &AccountKey) -> Result<f64, SourceError> {
        let timeout = self.config.fetch_timeout;
        match tokio::time::timeout(timeout, self.source.fetch_balance(key)).await {
            Ok(result) => result.and_then(|balance| {
                if balance.is_finite() {
                    Ok(balance)
                } else {
                    Err(SourceError::MalformedResponse(format!(
                        "non-finite balance {}",
                        balance
                    )))
                }
            }),
            Err(_) => Err(SourceError::Unreachable(format!(
                "no response within {}ms",
                timeout.as_millis()
            ))),
        }
    }

    async fn record_observation(&self, key: &AccountKey, balance: f64, now: NaiveDateTime) {
        let handle = self.registry.ensure(key);
        let (prior, current) = {
            let mut state = handle.write().await;
            let prior = state.snapshot();
            state.apply_observation(balance, now);
            (prior, state.snapshot())
        };

        if let Some((_, streak)) = self.failures.remove(key) {
            info!("Balance for {} recovered after {} failed fetches", key, streak);
        }

        self.events.on_observation(key, &prior, &current).await;
    }

    async fn record_failure(&self, key: &AccountKey, error: SourceError) {
        let streak = {
            let mut entry = self.failures.entry(key.clone()).or_insert(0);
            *entry += 1;
            *entry
        };

        warn!(
            "Failed to fetch balance for {} ({} in a row): {}",
            key, streak, error
        );
        self.events.on_fetch_error(key, &error, streak).await;
    }
}
