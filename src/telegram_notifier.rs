use reqwest::Client;
use serde_json;
use tracing::{debug, warn};

/// Bot token and chat the notifier posts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramCredentials {
  pub token: String,
  pub chat_id: String,
}

#[derive(Clone)]
pub struct TelegramNotifier {
  client: Option<Client>,
  credentials: Option<TelegramCredentials>,
}

impl TelegramNotifier {
  /// Disabled when `credentials` is `None`
  pub fn new(credentials: Option<TelegramCredentials>) -> Self {
    let client = credentials.as_ref().map(|_| Client::new());
    Self { client, credentials }
  }

  pub fn is_enabled(&self) -> bool {
    self.client.is_some() && self.credentials.is_some()
  }

  /// Send Telegram notification
  pub async fn send_notification(&self, message: &str) {
    let (Some(client), Some(credentials)) = (&self.client, &self.credentials) else {
      return;
    };

    let url = format!(
      "https://api.telegram.org/bot{}/sendMessage",
      credentials.token
    );

    let payload = serde_json::json!({
        "chat_id": credentials.chat_id,
        "text": message,
        "parse_mode": "HTML",
        "disable_web_page_preview": true
    });

    match client.post(&url).json(&payload).send().await {
      Ok(response) => {
        let response_status = response.status();
        if !response_status.is_success() {
          warn!("Telegram API error: Status {}", response_status);
          if let Ok(text) = response.text().await {
            warn!("Telegram API response: {}", text);
          }
        } else {
          debug!("Telegram notification sent successfully");
        }
      }
      Err(e) => {
        warn!("Failed to send Telegram notification: {}", e);
      }
    }
  }
}

impl Default for TelegramNotifier {
  fn default() -> Self {
    Self::new(None)
  }
}
