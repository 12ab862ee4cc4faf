//! Daemon settings handlers (hotspot admin host).

use serde_json::{Value, json};

use hotspot_core::config::WpsdConfig;

use super::params::field;
use super::{ApiError, HttpResponse, ok_json};
use crate::hotspot_client::base_url;
use crate::state::AppState;

/// `GET /api/config`
pub async fn get_config(state: &AppState) -> Result<HttpResponse, ApiError> {
    let wpsd = state.wpsd();
    let reachable = state.client.is_reachable(&wpsd).await;
    ok_json(&json!({
        "wpsdHost": base_url(&wpsd),
        "reachable": reachable,
    }))
}

/// `PUT /api/config` with `{wpsdHost}`
pub async fn put_config(state: &AppState, body: &Value) -> Result<HttpResponse, ApiError> {
    let raw = field(body, "wpsdHost")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("wpsdHost required".to_owned()))?;

    let host = WpsdConfig::normalize_host(raw)
        .map_err(|reason| ApiError::BadRequest(format!("wpsdHost {reason}")))?;

    state
        .update_wpsd_host(host.clone())
        .await
        .map_err(|e| ApiError::HostConfig(e.to_string()))?;

    ok_json(&json!({ "ok": true, "wpsdHost": host }))
}
