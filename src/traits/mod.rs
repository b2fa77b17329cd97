//! Core traits for the PnL tracker

pub mod balance_source;
pub mod event_handler;

// Re-export for convenience
pub use balance_source::{BalanceSource, SourceError};
pub use event_handler::RefreshEventHandler;
