//! Health, live traffic and system status handlers.

use chrono::Utc;
use serde_json::json;

use hotspot_core::types::timestamp_millis;

use super::params::limit_param;
use super::{ApiError, HttpResponse, ok_json};
use crate::state::AppState;

/// `GET /api/health`
pub fn health(state: &AppState) -> Result<HttpResponse, ApiError> {
    ok_json(&json!({
        "ok": true,
        "timestamp": timestamp_millis::format(&Utc::now()),
        "logPipeline": state.pipeline_health().to_string(),
    }))
}

/// `GET /api/live-traffic?limit=N`
pub fn live_traffic(state: &AppState, query: Option<&str>) -> Result<HttpResponse, ApiError> {
    ok_json(&state.traffic.recent(limit_param(query)))
}

/// `GET /api/system`
pub async fn system(state: &AppState) -> Result<HttpResponse, ApiError> {
    let reader = state.stats.clone();
    let stats = tokio::task::spawn_blocking(move || reader.read())
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to read system stats: {e}")))?;
    ok_json(&stats)
}

/// `GET /api/system/service`
pub fn service(state: &AppState) -> Result<HttpResponse, ApiError> {
    ok_json(&state.traffic.status())
}
