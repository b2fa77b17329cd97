//! Solana PnL Tracker Library
//!
//! Polls SOL balances for a set of wallets and keeps rolling
//! day/week/month profit-and-loss figures for each of them.

// Public modules - these are the API surface
pub mod config;
pub mod handlers;
pub mod models;
pub mod notifications;
pub mod providers;
pub mod server;
pub mod telegram_notifier;
pub mod tracker;
pub mod traits;
pub mod utils;

// Re-export commonly used items for easier access
pub use config::{Config, ConfigError};
pub use handlers::{
    composite::CompositeEventHandler,
    console::ConsoleEventHandler,
    telegram::TelegramEventHandler,
};
pub use models::{
    account::{AccountKey, AccountSnapshot, AccountState},
    window::{PeriodClock, PeriodId, WindowKind, WindowSnapshot},
};
pub use notifications::NotificationQueue;
pub use providers::rpc_provider::RpcBalanceSource;
pub use server::{create_router, AppState, DisplayConfig};
pub use telegram_notifier::{TelegramCredentials, TelegramNotifier};
pub use tracker::{
    refresh::{RefreshConfig, RefreshLoop, TickReport},
    registry::AccountRegistry,
};
pub use traits::{
    balance_source::{BalanceSource, SourceError},
    event_handler::RefreshEventHandler,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type alias for library functions
pub type Result<T> = std::result::Result<T, anyhow::Error>;
