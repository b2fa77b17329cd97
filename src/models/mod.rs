//! Data models for the PnL tracker

pub mod account;
pub mod window;

// Re-export for convenience
pub use account::{AccountKey, AccountSnapshot, AccountState};
pub use window::{PeriodClock, PeriodId, WindowKind, WindowSnapshot};
