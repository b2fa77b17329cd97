use anyhow::Context;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use solana_pnl_tracker::config::Config;
use solana_pnl_tracker::handlers::{
  CompositeEventHandler, ConsoleEventHandler, TelegramEventHandler,
};
use solana_pnl_tracker::notifications::NotificationQueue;
use solana_pnl_tracker::providers::RpcBalanceSource;
use solana_pnl_tracker::server::{self, AppState};
use solana_pnl_tracker::telegram_notifier::TelegramNotifier;
use solana_pnl_tracker::tracker::{AccountRegistry, RefreshLoop};
use solana_pnl_tracker::traits::{BalanceSource, RefreshEventHandler};

fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  // Initialize logging
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .with_level(true)
    .with_target(false)
    .with_file(true)
    .with_line_number(true)
    .init();

  let config = Config::from_env().context("Invalid configuration")?;

  tokio::runtime::Runtime::new()?.block_on(run(config))
}

async fn run(config: Config) -> anyhow::Result<()> {
  info!("Initializing PnL tracker...");
  info!("RPC URL: {}", config.rpc_url);
  info!("Polling interval: {}ms", config.poll_interval.as_millis());
  info!("Period clock: {:?}", config.period_clock);

  let registry = Arc::new(AccountRegistry::new(config.min_pnl_value));
  for wallet in &config.wallets {
    registry.ensure(wallet);
  }

  let source: Arc<dyn BalanceSource> = Arc::new(RpcBalanceSource::new(
    config.rpc_url.clone(),
    config.rpc_timeout,
  ));

  let notifier = TelegramNotifier::new(config.telegram.clone());
  let mut handlers = CompositeEventHandler::new();
  handlers.add_handler(Arc::new(ConsoleEventHandler::new()));
  if notifier.is_enabled() {
    info!("Telegram notifications enabled");
    handlers.add_handler(Arc::new(TelegramEventHandler::new(
      notifier.clone(),
      config.failure_alert_threshold,
    )));
  } else {
    warn!(
      "Telegram notifications disabled. Set TG_TOKEN and CHAT_ID in .env file to enable."
    );
  }

  info!("Registered {} refresh event handler(s)", handlers.len());

  let queue = NotificationQueue::new(Arc::new(handlers));
  let events: Arc<dyn RefreshEventHandler> = Arc::new(queue.clone());

  let refresh = Arc::new(RefreshLoop::new(
    registry.clone(),
    source,
    events,
    config.refresh_config(),
  ));
  let refresh_task = {
    let refresh = refresh.clone();
    tokio::spawn(async move { refresh.run().await })
  };

  let state = AppState::new(registry.clone(), config.display_config());
  let mut server_task = tokio::spawn(server::serve(config.bind_addr, state));

  if notifier.is_enabled() {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    let started_msg = format!(
      "💰 <b>PnL Tracker Started</b>\n\n\
                ⏰ <b>Time:</b> {}\n\
                👛 <b>Wallets:</b> {}\n\
                🌐 <b>Dashboard:</b> <code>{}</code>\n\n\
                🔄 <i>Tracking started successfully!</i>",
      timestamp,
      registry.len(),
      config.bind_addr
    );
    notifier.send_notification(&started_msg).await;
  }

  info!("PnL tracker is running. Press Ctrl+C to stop.");

  let outcome = tokio::select! {
    joined = &mut server_task => match joined {
      Ok(Ok(())) => Ok(()),
      Ok(Err(e)) => {
        error!("Server error: {:#}", e);
        Err(e)
      }
      Err(e) => {
        error!("Server task failed: {}", e);
        Err(e.into())
      }
    },
    signal = tokio::signal::ctrl_c() => {
      signal.context("Failed to listen for Ctrl+C")?;
      info!("Received Ctrl+C");
      server_task.abort();
      Ok(())
    }
  };

  refresh_task.abort();

  // Send shutdown notification
  if notifier.is_enabled() {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    let shutdown_msg = format!(
      "🛑 <b>PnL Tracker Stopped</b>\n\n\
                ⏰ <b>Time:</b> {}\n\
                👛 <b>Wallets tracked:</b> {}\n\n\
                <i>Tracker has been shut down.</i>",
      timestamp,
      registry.len()
    );
    notifier.send_notification(&shutdown_msg).await;
  }

  queue.shutdown();
  info!("Shutting down...");

  outcome
}
