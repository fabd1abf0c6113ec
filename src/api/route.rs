use crate::{
    analytics::DEFAULT_ACTIVITY_LIMIT,
    api::{
        error::ApiError,
        response::{with_total_count, ApiResponse},
    },
    scanner::ScanRequest,
    state::AppState,
    validation::{validate_limit, validate_mode, validate_solana_address, validate_threshold},
};
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

// GET /transfers query parameters, all optional (defaults come from config)
#[derive(Deserialize, Default)]
pub struct TransfersQuery {
    mode: Option<String>,
    threshold: Option<String>,
    limit: Option<String>,
}

// GET /wallets/{address}/activity query parameters
#[derive(Deserialize, Default)]
pub struct ActivityQuery {
    limit: Option<String>,
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/transfers", get(get_transfers))
        .route("/transfers/latest", get(get_latest_transfers))
        .route("/wallets/{address}/summary", get(get_wallet_summary))
        .route("/wallets/{address}/activity", get(get_wallet_activity))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

// GET /transfers handler: runs a scan now
async fn get_transfers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TransfersQuery>,
) -> Result<Response, ApiError> {
    let config = &state.config;

    let mode = match params.mode.as_deref() {
        Some(raw) => validate_mode(raw)?,
        None => config.scan_mode,
    };
    let threshold = match params.threshold.as_deref() {
        Some(raw) => validate_threshold(raw)?,
        None => config.large_transfer_threshold,
    };
    let limit = match params.limit.as_deref() {
        Some(raw) => validate_limit(raw)?,
        None => config.scan_limit,
    };

    info!("Scan request: mode={}, threshold={}, limit={}", mode, threshold, limit);

    let request = ScanRequest::new(mode, threshold, limit).with_deadline(config.scan_deadline);
    let report = state.engine.scan(&request).await;
    let count = report.events.len();

    Ok(with_total_count(report, count))
}

// GET /transfers/latest handler: last report from the poller
async fn get_latest_transfers(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let latest = state.latest.borrow().clone();

    match latest {
        Some(report) => {
            let count = report.events.len();
            Ok(with_total_count(report, count))
        }
        None => Err(ApiError::NotFound("No scan has completed yet".to_string())),
    }
}

// GET /wallets/{address}/summary handler
async fn get_wallet_summary(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<Response, ApiError> {
    validate_solana_address(&address)?;

    match state.engine.summarize(&address).await {
        Some(summary) => Ok(ApiResponse { data: summary }.into_response()),
        None => Err(ApiError::Unavailable("Wallet stats unavailable".to_string())),
    }
}

// GET /wallets/{address}/activity handler
async fn get_wallet_activity(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
    Query(params): Query<ActivityQuery>,
) -> Result<Response, ApiError> {
    validate_solana_address(&address)?;

    let limit = match params.limit.as_deref() {
        Some(raw) => validate_limit(raw)?,
        None => DEFAULT_ACTIVITY_LIMIT,
    };

    match state.engine.recent_activity(&address, limit).await {
        Some(entries) => {
            let count = entries.len();
            Ok(with_total_count(entries, count))
        }
        None => Err(ApiError::Unavailable("Wallet activity unavailable".to_string())),
    }
}
