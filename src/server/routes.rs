use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::models::window::{round_to, PNL_DECIMALS};
use crate::models::{AccountKey, AccountSnapshot, WindowKind};
use crate::server::render::{render_dashboard, DashboardOptions};
use crate::server::AppState;
use crate::utils::helper::parse_account_key;

const MISSING_WALLET_PROMPT: &str =
    "Please provide a wallet address as a 'wallet' URL parameter...";

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/api/wallet_data", get(wallet_data))
        .route("/health", get(health_check))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub wallet: Option<String>,
    pub show_week_pnl: Option<String>,
    pub show_month_pnl: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WalletQuery {
    pub wallet: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub tracked_accounts: usize,
}

/// JSON view of one wallet
#[derive(Debug, Serialize)]
pub struct WalletData {
    pub wallet: AccountKey,
    pub current_balance: f64,
    pub pnl: f64,
    pub week_pnl: f64,
    pub month_pnl: f64,
    pub starting_balance: Option<f64>,
    pub starting_date: Option<NaiveDate>,
    pub week_start_balance: Option<f64>,
    pub week_start_date: Option<NaiveDate>,
    pub month_start_balance: Option<f64>,
    pub month_start_date: Option<NaiveDate>,
    pub pnl_change_ratio: Option<f64>,
    pub week_change_ratio: Option<f64>,
    pub month_change_ratio: Option<f64>,
    pub last_observed_at: Option<NaiveDateTime>,
    pub stale: bool,
}

impl WalletData {
    pub fn from_snapshot(wallet: AccountKey, snapshot: &AccountSnapshot, stale: bool) -> Self {
        let baseline = |kind: WindowKind| {
            snapshot
                .window(kind)
                .map(|w| round_to(w.baseline_balance, PNL_DECIMALS))
        };
        let started = |kind: WindowKind| snapshot.period(kind).map(|p| p.start_date());

        Self {
            wallet,
            current_balance: snapshot.current_balance,
            pnl: snapshot.day_pnl,
            week_pnl: snapshot.week_pnl,
            month_pnl: snapshot.month_pnl,
            starting_balance: baseline(WindowKind::Day),
            starting_date: started(WindowKind::Day),
            week_start_balance: baseline(WindowKind::Week),
            week_start_date: started(WindowKind::Week),
            month_start_balance: baseline(WindowKind::Month),
            month_start_date: started(WindowKind::Month),
            pnl_change_ratio: snapshot.change_ratio(WindowKind::Day),
            week_change_ratio: snapshot.change_ratio(WindowKind::Week),
            month_change_ratio: snapshot.change_ratio(WindowKind::Month),
            last_observed_at: snapshot.last_observed_at,
            stale,
        }
    }
}

// ===== Route Handlers =====

/// HTML dashboard for one wallet
async fn dashboard(
    State(state): State<AppState>,
    Query(params): Query<DashboardQuery>,
) -> Result<Response, ApiError> {
    let Some(raw) = params.wallet.filter(|w| !w.trim().is_empty()) else {
        return Ok(MISSING_WALLET_PROMPT.into_response());
    };
    let wallet = parse_account_key(&raw)
        .ok_or_else(|| ApiError::BadRequest("Valid wallet address is required".to_string()))?;

    let snapshot = track_and_read(&state, &wallet).await?;
    let options = DashboardOptions {
        show_week_pnl: flag(params.show_week_pnl.as_deref()),
        show_month_pnl: flag(params.show_month_pnl.as_deref()),
        refresh_interval: state.display.refresh_interval,
        stale: is_stale(&state, &snapshot),
    };

    Ok(Html(render_dashboard(&wallet, &snapshot, &options)).into_response())
}

/// JSON snapshot for one wallet
async fn wallet_data(
    State(state): State<AppState>,
    Query(params): Query<WalletQuery>,
) -> Result<Json<WalletData>, ApiError> {
    let wallet = params
        .wallet
        .as_deref()
        .and_then(parse_account_key)
        .ok_or_else(|| ApiError::BadRequest("Valid wallet address is required".to_string()))?;

    let snapshot = track_and_read(&state, &wallet).await?;
    let stale = is_stale(&state, &snapshot);
    Ok(Json(WalletData::from_snapshot(wallet, &snapshot, stale)))
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        tracked_accounts: state.registry.len(),
    })
}

/// Register the wallet on first sight, then read its snapshot
async fn track_and_read(state: &AppState, wallet: &AccountKey) -> Result<AccountSnapshot, ApiError> {
    state.registry.ensure(wallet);
    state
        .registry
        .read(wallet)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Wallet {} is not tracked", wallet)))
}

fn is_stale(state: &AppState, snapshot: &AccountSnapshot) -> bool {
    let max_age = Duration::from_std(state.display.stale_after).unwrap_or(Duration::MAX);
    snapshot.is_stale(state.display.period_clock.now(), max_age)
}

fn flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

// ===== Error Handling =====

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
