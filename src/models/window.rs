use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Decimal places PnL figures and displayed balances are rounded to
pub const PNL_DECIMALS: u32 = 2;

/// Default minimum PnL magnitude (skips fee-sized balance changes)
pub const DEFAULT_MIN_PNL_VALUE: f64 = 0.0001;

/// Calendar window a baseline is kept for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    Day,
    Week,
    Month,
}

impl WindowKind {
    pub const ALL: [WindowKind; 3] = [WindowKind::Day, WindowKind::Week, WindowKind::Month];

    /// Period containing `now` for this window.
    ///
    /// Weeks start on Monday, months on the first.
    pub fn period_of(self, now: NaiveDateTime) -> PeriodId {
        let date = now.date();
        let start = match self {
            WindowKind::Day => date,
            WindowKind::Week => {
                date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
            }
            WindowKind::Month => date - Duration::days(i64::from(date.day0())),
        };
        PeriodId(start)
    }

    /// Heading used on the dashboard
    pub fn title(self) -> &'static str {
        match self {
            WindowKind::Day => "TODAY PNL",
            WindowKind::Week => "WEEKLY PNL",
            WindowKind::Month => "MONTHLY PNL",
        }
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WindowKind::Day => "day",
            WindowKind::Week => "week",
            WindowKind::Month => "month",
        };
        f.write_str(name)
    }
}

/// Identifies one day, week or month by its first date.
/// Only compared for equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PeriodId(NaiveDate);

impl PeriodId {
    pub fn start_date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for PeriodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Baseline a window's PnL is measured against
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowSnapshot {
    pub baseline_balance: f64,
    pub baseline_period_id: PeriodId,
}

impl WindowSnapshot {
    pub fn new(baseline_balance: f64, baseline_period_id: PeriodId) -> Self {
        Self {
            baseline_balance,
            baseline_period_id,
        }
    }
}

/// Wall clock used to place observations into calendar periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeriodClock {
    #[default]
    Local,
    Utc,
}

impl PeriodClock {
    pub fn now(&self) -> NaiveDateTime {
        match self {
            PeriodClock::Local => Local::now().naive_local(),
            PeriodClock::Utc => Utc::now().naive_utc(),
        }
    }
}

impl FromStr for PeriodClock {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(PeriodClock::Local),
            "utc" => Ok(PeriodClock::Utc),
            other => Err(format!("expected 'local' or 'utc', got '{}'", other)),
        }
    }
}

/// Round the exact binary value of `value` to `decimals` places, ties to even.
///
/// `0.015` is stored just below the tie and rounds to `0.01`; `0.125` is an
/// exact tie and rounds to `0.12`. Values outside `Decimal`'s range pass through.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp_with_strategy(decimals, RoundingStrategy::MidpointNearestEven))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

/// Zero out anything smaller in magnitude than `min_delta`.
/// Also normalizes `-0.0` to `0.0`.
pub fn clamp_noise(value: f64, min_delta: f64) -> f64 {
    if value.abs() < min_delta || value == 0.0 {
        0.0
    } else {
        value
    }
}

/// PnL of `current` against `baseline`, rounded and noise-clamped
pub fn window_pnl(current: f64, baseline: f64, min_delta: f64) -> f64 {
    clamp_noise(round_to(current - baseline, PNL_DECIMALS), min_delta)
}
