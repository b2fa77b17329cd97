use std::fmt;

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use super::window::{round_to, window_pnl, PeriodId, WindowKind, WindowSnapshot, PNL_DECIMALS};

/// Identifier of a tracked wallet.
///
/// Opaque to the tracker: callers validate the format before handing one over.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AccountKey(String);

impl AccountKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AccountKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Rolling PnL state for one wallet
#[derive(Debug, Clone)]
pub struct AccountState {
    current_balance: f64,
    day: Option<WindowSnapshot>,
    week: Option<WindowSnapshot>,
    month: Option<WindowSnapshot>,
    day_pnl: f64,
    week_pnl: f64,
    month_pnl: f64,
    last_observed_at: Option<NaiveDateTime>,
    min_pnl_value: f64,
}

impl AccountState {
    /// Empty state: zero balance, no baselines
    pub fn new(min_pnl_value: f64) -> Self {
        Self {
            current_balance: 0.0,
            day: None,
            week: None,
            month: None,
            day_pnl: 0.0,
            week_pnl: 0.0,
            month_pnl: 0.0,
            last_observed_at: None,
            min_pnl_value,
        }
    }

    /// Feed a freshly fetched balance observed at wall-clock `now`.
    ///
    /// Each window whose baseline is unset or belongs to an older period is
    /// re-seeded with `balance`; PnL for all three windows is then recomputed.
    pub fn apply_observation(&mut self, balance: f64, now: NaiveDateTime) {
        for kind in WindowKind::ALL {
            let period = kind.period_of(now);
            let slot = self.window_slot(kind);
            let stale = slot
                .as_ref()
                .map_or(true, |window| window.baseline_period_id != period);
            if stale {
                *slot = Some(WindowSnapshot::new(balance, period));
            }
        }

        self.current_balance = balance;
        self.last_observed_at = Some(now);

        self.day_pnl = self.pnl_against(self.day);
        self.week_pnl = self.pnl_against(self.week);
        self.month_pnl = self.pnl_against(self.month);
    }

    pub fn current_balance(&self) -> f64 {
        self.current_balance
    }

    pub fn window(&self, kind: WindowKind) -> Option<&WindowSnapshot> {
        match kind {
            WindowKind::Day => self.day.as_ref(),
            WindowKind::Week => self.week.as_ref(),
            WindowKind::Month => self.month.as_ref(),
        }
    }

    pub fn pnl(&self, kind: WindowKind) -> f64 {
        match kind {
            WindowKind::Day => self.day_pnl,
            WindowKind::Week => self.week_pnl,
            WindowKind::Month => self.month_pnl,
        }
    }

    pub fn last_observed_at(&self) -> Option<NaiveDateTime> {
        self.last_observed_at
    }

    /// Immutable copy for display, balances rounded to cents
    pub fn snapshot(&self) -> AccountSnapshot {
        AccountSnapshot {
            current_balance: round_to(self.current_balance, PNL_DECIMALS),
            day_pnl: self.day_pnl,
            week_pnl: self.week_pnl,
            month_pnl: self.month_pnl,
            day: self.day,
            week: self.week,
            month: self.month,
            last_observed_at: self.last_observed_at,
        }
    }

    fn window_slot(&mut self, kind: WindowKind) -> &mut Option<WindowSnapshot> {
        match kind {
            WindowKind::Day => &mut self.day,
            WindowKind::Week => &mut self.week,
            WindowKind::Month => &mut self.month,
        }
    }

    fn pnl_against(&self, window: Option<WindowSnapshot>) -> f64 {
        window.map_or(0.0, |w| {
            window_pnl(self.current_balance, w.baseline_balance, self.min_pnl_value)
        })
    }
}

/// Point-in-time view of an [`AccountState`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSnapshot {
    pub current_balance: f64,
    pub day_pnl: f64,
    pub week_pnl: f64,
    pub month_pnl: f64,
    pub day: Option<WindowSnapshot>,
    pub week: Option<WindowSnapshot>,
    pub month: Option<WindowSnapshot>,
    pub last_observed_at: Option<NaiveDateTime>,
}

impl AccountSnapshot {
    pub fn pnl(&self, kind: WindowKind) -> f64 {
        match kind {
            WindowKind::Day => self.day_pnl,
            WindowKind::Week => self.week_pnl,
            WindowKind::Month => self.month_pnl,
        }
    }

    pub fn window(&self, kind: WindowKind) -> Option<&WindowSnapshot> {
        match kind {
            WindowKind::Day => self.day.as_ref(),
            WindowKind::Week => self.week.as_ref(),
            WindowKind::Month => self.month.as_ref(),
        }
    }

    pub fn period(&self, kind: WindowKind) -> Option<PeriodId> {
        self.window(kind).map(|w| w.baseline_period_id)
    }

    /// Whether a balance has ever been observed
    pub fn is_observed(&self) -> bool {
        self.last_observed_at.is_some()
    }

    /// Relative change against the window baseline, e.g. `0.06` for +6%.
    ///
    /// `None` while the baseline is unset or zero.
    pub fn change_ratio(&self, kind: WindowKind) -> Option<f64> {
        let baseline = self.window(kind)?.baseline_balance;
        if baseline == 0.0 {
            return None;
        }
        let ratio = (self.current_balance - baseline) / baseline.abs();
        Some(round_to(ratio, PNL_DECIMALS))
    }

    /// No observation, or the last one is older than `max_age`
    pub fn is_stale(&self, now: NaiveDateTime, max_age: Duration) -> bool {
        match self.last_observed_at {
            Some(observed) => now - observed > max_age,
            None => true,
        }
    }

    /// Windows whose period advanced between `self` and `next`
    pub fn closed_windows(&self, next: &AccountSnapshot) -> Vec<WindowKind> {
        WindowKind::ALL
            .into_iter()
            .filter(|&kind| match (self.period(kind), next.period(kind)) {
                (Some(before), Some(after)) => before != after,
                _ => false,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::window::DEFAULT_MIN_PNL_VALUE;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn fresh() -> AccountState {
        AccountState::new(DEFAULT_MIN_PNL_VALUE)
    }

    #[test]
    fn new_state_is_unseeded() {
        let state = fresh();
        let snapshot = state.snapshot();

        assert_eq!(snapshot.current_balance, 0.0);
        for kind in WindowKind::ALL {
            assert!(snapshot.window(kind).is_none());
            assert_eq!(snapshot.pnl(kind), 0.0);
        }
        assert!(!snapshot.is_observed());
    }

    #[test]
    fn first_observation_seeds_all_baselines() {
        let mut state = fresh();
        let now = at(2024, 3, 6, 14, 30);
        state.apply_observation(12.5, now);

        assert_eq!(state.window(WindowKind::Day).unwrap().baseline_balance, 12.5);
        assert_eq!(state.window(WindowKind::Week).unwrap().baseline_balance, 12.5);
        assert_eq!(state.window(WindowKind::Month).unwrap().baseline_balance, 12.5);
        assert_eq!(
            state.window(WindowKind::Week).unwrap().baseline_period_id,
            WindowKind::Week.period_of(now)
        );
        assert_eq!(state.last_observed_at(), Some(now));
    }

    #[test]
    fn snapshot_rounds_current_balance() {
        let mut state = fresh();
        state.apply_observation(3.14159, at(2024, 3, 6, 9, 0));
        assert_eq!(state.current_balance(), 3.14159);
        assert_eq!(state.snapshot().current_balance, 3.14);
    }

    #[test]
    fn same_balance_within_period_reports_zero() {
        let mut state = fresh();
        state.apply_observation(7.0, at(2024, 3, 6, 9, 0));
        assert_eq!(state.pnl(WindowKind::Day), 0.0);

        state.apply_observation(7.0, at(2024, 3, 6, 9, 5));
        for kind in WindowKind::ALL {
            assert_eq!(state.pnl(kind), 0.0);
        }
    }

    #[test]
    fn fee_sized_moves_are_ignored() {
        let mut state = fresh();
        state.apply_observation(2.0, at(2024, 3, 6, 9, 0));
        state.apply_observation(2.000005, at(2024, 3, 6, 9, 5));
        assert_eq!(state.pnl(WindowKind::Day), 0.0);
        assert!(state.pnl(WindowKind::Day).is_sign_positive());
    }

    #[test]
    fn losses_are_negative() {
        let mut state = fresh();
        state.apply_observation(10.0, at(2024, 3, 6, 9, 0));
        state.apply_observation(8.75, at(2024, 3, 6, 9, 5));
        assert_eq!(state.pnl(WindowKind::Day), -1.25);
        assert_eq!(state.snapshot().current_balance, 8.75);
    }

    #[test]
    fn monday_to_tuesday_scenario() {
        let mut state = fresh();

        // Monday 10:00
        state.apply_observation(5.0, at(2024, 3, 4, 10, 0));
        for kind in WindowKind::ALL {
            assert_eq!(state.window(kind).unwrap().baseline_balance, 5.0);
        }

        // Monday 10:05
        state.apply_observation(5.3, at(2024, 3, 4, 10, 5));
        assert_eq!(state.pnl(WindowKind::Day), 0.3);
        assert_eq!(state.pnl(WindowKind::Week), 0.3);
        assert_eq!(state.pnl(WindowKind::Month), 0.3);

        // Tuesday 00:00, balance unchanged
        state.apply_observation(5.3, at(2024, 3, 5, 0, 0));
        assert_eq!(state.window(WindowKind::Day).unwrap().baseline_balance, 5.3);
        assert_eq!(state.pnl(WindowKind::Day), 0.0);
        assert_eq!(state.pnl(WindowKind::Week), 0.3);
        assert_eq!(state.pnl(WindowKind::Month), 0.3);
    }

    #[test]
    fn rollover_uses_new_balance_not_history() {
        let mut state = fresh();
        state.apply_observation(1.0, at(2024, 3, 6, 23, 55));
        state.apply_observation(4.0, at(2024, 3, 7, 0, 5));

        let day = state.window(WindowKind::Day).unwrap();
        assert_eq!(day.baseline_balance, 4.0);
        assert_eq!(day.baseline_period_id, WindowKind::Day.period_of(at(2024, 3, 7, 0, 5)));
        assert_eq!(state.pnl(WindowKind::Day), 0.0);
        assert_eq!(state.pnl(WindowKind::Week), 3.0);
    }

    #[test]
    fn baseline_resets_once_per_transition() {
        let mut state = fresh();
        state.apply_observation(1.0, at(2024, 3, 31, 23, 0));
        state.apply_observation(2.0, at(2024, 4, 1, 0, 0));
        state.apply_observation(2.5, at(2024, 4, 1, 0, 5));

        // April 1st 2024 is a Monday: every window rolled at midnight, and only then
        for kind in WindowKind::ALL {
            assert_eq!(state.window(kind).unwrap().baseline_balance, 2.0);
            assert_eq!(state.pnl(kind), 0.5);
        }
    }

    #[test]
    fn change_ratio_follows_baseline() {
        let mut state = fresh();
        assert_eq!(state.snapshot().change_ratio(WindowKind::Day), None);

        state.apply_observation(0.0, at(2024, 3, 6, 9, 0));
        state.apply_observation(1.0, at(2024, 3, 6, 9, 5));
        assert_eq!(state.snapshot().change_ratio(WindowKind::Day), None);

        let mut state = fresh();
        state.apply_observation(4.0, at(2024, 3, 6, 9, 0));
        state.apply_observation(5.0, at(2024, 3, 6, 9, 5));
        assert_eq!(state.snapshot().change_ratio(WindowKind::Day), Some(0.25));
    }

    #[test]
    fn staleness_tracks_last_observation() {
        let mut state = fresh();
        let now = at(2024, 3, 6, 9, 0);
        assert!(state.snapshot().is_stale(now, Duration::seconds(15)));

        state.apply_observation(1.0, now);
        let snapshot = state.snapshot();
        assert!(!snapshot.is_stale(now + Duration::seconds(10), Duration::seconds(15)));
        assert!(snapshot.is_stale(now + Duration::seconds(16), Duration::seconds(15)));
    }

    #[test]
    fn closed_windows_lists_rolled_periods() {
        let mut state = fresh();
        let unseeded = state.snapshot();
        state.apply_observation(1.0, at(2024, 3, 10, 23, 59));
        let sunday = state.snapshot();
        assert!(unseeded.closed_windows(&sunday).is_empty());

        state.apply_observation(1.0, at(2024, 3, 11, 0, 0));
        let monday = state.snapshot();
        assert_eq!(
            sunday.closed_windows(&monday),
            vec![WindowKind::Day, WindowKind::Week]
        );
    }
}
