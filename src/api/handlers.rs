//! REST API endpoint handlers

use crate::api::types::{HealthResponse, PricesParams};
use crate::error::ExecutionError;
use crate::series;
use crate::services::{PriceService, PricesResponse};
use crate::state::AppState;
use axum::{
    extract::{Query, State as AxumState},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::warn;

/// Health check endpoint - GET /health
pub async fn health_check(AxumState(state): AxumState<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        clusters: state.clusters.statuses(),
        symbols: series::symbols().into_iter().map(str::to_string).collect(),
    })
}

/// Plain-text liveness probe - GET /test
pub async fn test_route() -> &'static str {
    "Test route working"
}

/// Price series - GET /api/prices?symbol=&cluster=&window=&useRaw=
pub async fn get_prices(
    AxumState(state): AxumState<Arc<AppState>>,
    Query(params): Query<PricesParams>,
) -> Result<Json<PricesResponse>, ExecutionError> {
    let query = params.into_query();

    match PriceService::get_prices(&state, &query, Utc::now()).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            warn!("GET /api/prices failed ({}): {}", e.status(), e);
            Err(e)
        }
    }
}
