//! Balance sources

pub mod rpc_provider;

// Re-export for convenience
pub use rpc_provider::RpcBalanceSource;
