use std::sync::Arc;
use async_trait::async_trait;

use crate::models::{AccountKey, AccountSnapshot};
use crate::traits::balance_source::SourceError;
use crate::traits::event_handler::RefreshEventHandler;

/// Composite event handler that can combine multiple handlers
pub struct CompositeEventHandler {
    handlers: Vec<Arc<dyn RefreshEventHandler>>,
}

impl CompositeEventHandler {
    /// Create a new composite event handler
    pub fn new() -> Self {
        Self { handlers: Vec::new() }
    }

    /// Add a handler to the composite
    pub fn add_handler(&mut self, handler: Arc<dyn RefreshEventHandler>) {
        self.handlers.push(handler);
    }

    /// Check if there are any handlers
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Number of handlers
    pub fn len(&self) -> usize {
        self.handlers.len()
    }
}

impl Default for CompositeEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RefreshEventHandler for CompositeEventHandler {
    async fn on_observation(
        &self,
        account: &AccountKey,
        prior: &AccountSnapshot,
        current: &AccountSnapshot,
    ) {
        for handler in &self.handlers {
            handler.on_observation(account, prior, current).await;
        }
    }

    async fn on_fetch_error(
        &self,
        account: &AccountKey,
        error: &SourceError,
        consecutive_failures: u32,
    ) {
        for handler in &self.handlers {
            handler.on_fetch_error(account, error, consecutive_failures).await;
        }
    }
}
