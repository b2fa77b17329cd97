// src/notifications/mod.rs
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{error, warn};

use crate::models::{AccountKey, AccountSnapshot};
use crate::traits::balance_source::SourceError;
use crate::traits::event_handler::RefreshEventHandler;

/// Notification types
#[derive(Debug, Clone)]
pub enum Notification {
    Observation {
        account: AccountKey,
        prior: AccountSnapshot,
        current: AccountSnapshot,
    },
    FetchFailed {
        account: AccountKey,
        error: SourceError,
        consecutive_failures: u32,
    },
    Shutdown,
}

/// Hands refresh events to a slower handler on its own task,
/// so the refresh loop never waits on Telegram
pub struct NotificationQueue {
    sender: UnboundedSender<Notification>,
}

impl NotificationQueue {
    /// Create a new notification queue
    pub fn new(handler: Arc<dyn RefreshEventHandler>) -> Self {
        let (sender, receiver) = unbounded_channel();

        // Spawn a dedicated task for processing notifications
        tokio::spawn(Self::process_notifications(receiver, handler));

        Self { sender }
    }

    async fn process_notifications(
        mut receiver: UnboundedReceiver<Notification>,
        handler: Arc<dyn RefreshEventHandler>,
    ) {
        while let Some(notification) = receiver.recv().await {
            match notification {
                Notification::Observation {
                    account,
                    prior,
                    current,
                } => {
                    handler.on_observation(&account, &prior, &current).await;
                }
                Notification::FetchFailed {
                    account,
                    error,
                    consecutive_failures,
                } => {
                    handler
                        .on_fetch_error(&account, &error, consecutive_failures)
                        .await;
                }
                Notification::Shutdown => {
                    warn!("Notification processor shutting down");
                    break;
                }
            }
        }
    }

    /// Stop the processing task after queued notifications drain
    pub fn shutdown(&self) {
        if let Err(e) = self.sender.send(Notification::Shutdown) {
            error!("Failed to queue shutdown notification: {}", e);
        }
    }

    fn enqueue(&self, notification: Notification) {
        if let Err(e) = self.sender.send(notification) {
            error!("Failed to queue refresh notification: {}", e);
        }
    }
}

impl Clone for NotificationQueue {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

#[async_trait]
impl RefreshEventHandler for NotificationQueue {
    async fn on_observation(
        &self,
        account: &AccountKey,
        prior: &AccountSnapshot,
        current: &AccountSnapshot,
    ) {
        self.enqueue(Notification::Observation {
            account: account.clone(),
            prior: prior.clone(),
            current: current.clone(),
        });
    }

    async fn on_fetch_error(
        &self,
        account: &AccountKey,
        error: &SourceError,
        consecutive_failures: u32,
    ) {
        self.enqueue(Notification::FetchFailed {
            account: account.clone(),
            error: error.clone(),
            consecutive_failures,
        });
    }
}
