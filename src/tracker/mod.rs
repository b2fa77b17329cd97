//! Account registry and the polling loop that keeps it fresh

pub mod refresh;
pub mod registry;

pub use refresh::{RefreshConfig, RefreshLoop, TickReport};
pub use registry::{AccountHandle, AccountRegistry};
