use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use solana_pnl_tracker::models::window::DEFAULT_MIN_PNL_VALUE;
use solana_pnl_tracker::{create_router, AccountKey, AccountRegistry, AppState, DisplayConfig};

const WALLET: &str = "5Q544fKrFoe6tsEbD7S8EmxGTJYAKtTVhAW5Q5pge4j1";

fn app() -> (Router, Arc<AccountRegistry>, DisplayConfig) {
    let registry = Arc::new(AccountRegistry::new(DEFAULT_MIN_PNL_VALUE));
    let display = DisplayConfig::default();
    let router = create_router(AppState::new(registry.clone(), display.clone()));
    (router, registry, display)
}

async fn get(router: Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(router, uri).await;
    (status, serde_json::from_str(&body).unwrap())
}

#[tokio::test]
async fn health_reports_tracked_accounts() {
    let (router, registry, _) = app();
    registry.ensure(&AccountKey::new(WALLET));

    let (status, body) = get_json(router, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["tracked_accounts"], 1);
}

#[tokio::test]
async fn dashboard_without_wallet_prompts_for_one() {
    let (router, registry, _) = app();

    let (status, body) = get(router, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("provide a wallet address"));
    assert!(registry.is_empty());
}

#[tokio::test]
async fn invalid_wallet_is_rejected_and_not_tracked() {
    let (router, registry, _) = app();

    let (status, _) = get(router.clone(), "/?wallet=not-a-wallet").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get_json(router.clone(), "/api/wallet_data").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Valid wallet address is required");

    // Valid pubkey, but 43 characters long
    let (status, _) = get_json(
        router,
        "/api/wallet_data?wallet=So11111111111111111111111111111111111111112",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(registry.is_empty());
}

#[tokio::test]
async fn first_request_registers_an_empty_wallet() {
    let (router, registry, _) = app();

    let (status, body) = get_json(router, &format!("/api/wallet_data?wallet={}", WALLET)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(registry.contains(&AccountKey::new(WALLET)));
    assert_eq!(body["wallet"], WALLET);
    assert_eq!(body["current_balance"], 0.0);
    assert_eq!(body["pnl"], 0.0);
    assert!(body["starting_balance"].is_null());
    assert!(body["last_observed_at"].is_null());
    assert_eq!(body["stale"], true);
}

#[tokio::test]
async fn wallet_data_reflects_observations() {
    let (router, registry, display) = app();
    let wallet = AccountKey::new(WALLET);
    let handle = registry.ensure(&wallet);
    let now = display.period_clock.now();
    {
        let mut state = handle.write().await;
        state.apply_observation(4.0, now);
        state.apply_observation(5.0, now);
    }

    let (status, body) = get_json(router, &format!("/api/wallet_data?wallet={}", WALLET)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_balance"], 5.0);
    assert_eq!(body["pnl"], 1.0);
    assert_eq!(body["week_pnl"], 1.0);
    assert_eq!(body["month_pnl"], 1.0);
    assert_eq!(body["starting_balance"], 4.0);
    assert_eq!(body["starting_date"], now.date().format("%Y-%m-%d").to_string());
    assert_eq!(body["pnl_change_ratio"], 0.25);
    assert_eq!(body["stale"], false);
}

#[tokio::test]
async fn dashboard_renders_requested_windows() {
    let (router, registry, display) = app();
    let handle = registry.ensure(&AccountKey::new(WALLET));
    let now = display.period_clock.now();
    {
        let mut state = handle.write().await;
        state.apply_observation(2.0, now);
        state.apply_observation(1.5, now);
    }

    let (status, page) = get(
        router,
        &format!("/?wallet={}&show_week_pnl=true", WALLET),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("TODAY PNL"));
    assert!(page.contains("WEEKLY PNL"));
    assert!(!page.contains("MONTHLY PNL"));
    assert!(page.contains("-0.50"));
    assert!(page.contains("pnl-negative"));
}
