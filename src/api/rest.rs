// =============================================================================
// REST API Endpoints (Axum 0.7)
// =============================================================================
//
// Price data, company reference data and the two analysis engines over HTTP.
// Symbols are upper-cased before they reach a provider. Undefined indicator
// values serialize as `null`.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderValue, Method},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

use super::error::ApiError;
use crate::app_state::{AppState, SharedProvider};
use crate::fundamentals::{analyze_company_with, FinancialSnapshot};
use crate::indicators::calculate_all;

const SERVICE_NAME: &str = "Stock Analysis API";

// =============================================================================
// Router construction
// =============================================================================

pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    let trace_requests = state.config.log_api_requests;

    let router = Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .route("/api/stocks/search", get(search_stocks))
        .route("/api/stocks/all", get(all_stocks))
        .route("/api/stock/:symbol", get(stock_data))
        .route("/api/stock/:symbol/info", get(company_info))
        .route("/api/analysis/technical/:symbol", get(technical_analysis))
        .route("/api/analysis/fundamental/:symbol", get(fundamental_analysis))
        .layer(cors)
        .with_state(state);

    if trace_requests {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// `*` anywhere in the list allows any origin; otherwise only the listed
/// origins that parse as header values.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(allowed))
}

// =============================================================================
// Query parameters
// =============================================================================

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PriceParams {
    interval: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

/// Validated form of [`PriceParams`].
struct PriceRequest {
    interval: String,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

impl PriceParams {
    fn validate(self) -> Result<PriceRequest, ApiError> {
        let interval = self
            .interval
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .unwrap_or_else(|| "1d".to_string());
        Ok(PriceRequest {
            interval,
            start_date: parse_date("start_date", self.start_date.as_deref())?,
            end_date: parse_date("end_date", self.end_date.as_deref())?,
        })
    }
}

fn parse_date(field: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("{field} must be YYYY-MM-DD, got '{s}'"))),
    }
}

fn primary(state: &AppState) -> Result<&SharedProvider, ApiError> {
    state
        .primary_provider()
        .ok_or_else(|| ApiError::ServiceUnavailable("No data source configured".into()))
}

// =============================================================================
// Service info
// =============================================================================

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    }))
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "services": {
            "sectors_api": state.sectors.is_some(),
            "twelve_data_api": state.twelve_data.is_some(),
        },
        "analyses_served": state.analyses_served(),
    }))
}

// =============================================================================
// Listings
// =============================================================================

#[instrument(skip(state))]
async fn search_stocks(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let query = params.q.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err(ApiError::BadRequest("query parameter 'q' is required".into()));
    }
    let provider = primary(&state)?;
    let results = provider.search_stocks(query).await;
    Ok(Json(json!({ "results": results })))
}

async fn all_stocks(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let provider = primary(&state)?;
    let stocks = provider.get_all_stocks().await;
    Ok(Json(json!({ "stocks": stocks })))
}

// =============================================================================
// Price data & company info
// =============================================================================

#[instrument(skip(state, params))]
async fn stock_data(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(params): Query<PriceParams>,
) -> Result<impl IntoResponse, ApiError> {
    let request = params.validate()?;
    let provider = primary(&state)?;
    let symbol = symbol.to_uppercase();

    let series = provider
        .get_stock_data(&symbol, &request.interval, request.start_date, request.end_date)
        .await;
    if series.is_empty() {
        return Err(ApiError::NotFound("No data found for symbol".into()));
    }

    Ok(Json(json!({
        "symbol": symbol,
        "interval": request.interval,
        "data": series,
    })))
}

async fn company_info(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let provider = primary(&state)?;
    provider
        .get_company_info(&symbol.to_uppercase())
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Company info not found".into()))
}

// =============================================================================
// Analysis
// =============================================================================

#[instrument(skip(state, params))]
async fn technical_analysis(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(params): Query<PriceParams>,
) -> Result<impl IntoResponse, ApiError> {
    let request = params.validate()?;
    let provider = primary(&state)?;
    let symbol = symbol.to_uppercase();

    let series = provider
        .get_stock_data(&symbol, &request.interval, request.start_date, request.end_date)
        .await;
    if series.is_empty() {
        return Err(ApiError::NotFound("No data found".into()));
    }

    let frame = calculate_all(&series)?;
    let served = state.record_analysis();
    info!(bars = frame.len(), served, "technical analysis computed");

    Ok(Json(json!({
        "symbol": symbol,
        "summary": frame.summary(),
        "data": frame.records(),
    })))
}

#[instrument(skip(state))]
async fn fundamental_analysis(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let provider = state
        .sectors
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("Sectors API required for fundamentals".into()))?;
    let symbol = symbol.to_uppercase();

    let raw = provider
        .get_financials(&symbol)
        .await
        .ok_or_else(|| ApiError::NotFound("Financial data not found".into()))?;

    let snapshot = FinancialSnapshot::from_value(&raw);
    let analysis = analyze_company_with(&snapshot, state.config.zero_ratio_policy());
    let served = state.record_analysis();
    info!(ratios = analysis.ratios.len(), signals = analysis.signals.len(), served, "fundamental analysis computed");

    Ok(Json(json!({
        "symbol": symbol,
        "analysis": analysis,
        "raw_data": raw,
    })))
}
