//! Hotspot admin passthrough: last heard list and system actions.

use serde_json::Value;

use super::params::{field, limit_param};
use super::{ApiError, HttpResponse, ok_json};
use crate::hotspot_client::ACTION_TIMEOUT;
use crate::state::AppState;

/// Actions the admin `system_api.php` may be asked to run.
pub const ALLOWED_ACTIONS: [&str; 8] = [
    "reboot",
    "shutdown",
    "get_ip",
    "update_wpsd",
    "stop_wpsd_services",
    "restart_wpsd_services",
    "update_hostfiles",
    "reload_wifi",
];

/// `GET /api/wpsd/last-heard?limit=N`
///
/// Tries the dedicated last-heard endpoint first, then the generic API.
pub async fn last_heard(state: &AppState, query: Option<&str>) -> Result<HttpResponse, ApiError> {
    let limit = limit_param(query);
    let wpsd = state.wpsd();

    let primary = format!("/api/last_heard.php?num_transmissions={limit}");
    let data = match state.client.get_json(&wpsd, &primary, ACTION_TIMEOUT).await {
        Ok(data) => data,
        Err(e) => {
            tracing::debug!(error = %e, "last heard endpoint failed, trying fallback");
            let fallback = format!("/api/?limit={limit}");
            state.client.get_json(&wpsd, &fallback, ACTION_TIMEOUT).await?
        }
    };

    ok_json(&normalize_last_heard(data))
}

/// Keep array entries only and fill `ber` from `bit_error_rate`.
pub fn normalize_last_heard(data: Value) -> Vec<Value> {
    let Value::Array(entries) = data else {
        return Vec::new();
    };
    entries
        .into_iter()
        .map(|mut entry| {
            if let Value::Object(fields) = &mut entry {
                let missing = fields.get("ber").is_none_or(Value::is_null);
                if missing {
                    if let Some(rate) = fields.get("bit_error_rate").cloned() {
                        fields.insert("ber".to_owned(), rate);
                    }
                }
            }
            entry
        })
        .collect()
}

/// `POST /api/wpsd/action` with `{action}`
pub async fn action(state: &AppState, body: &Value) -> Result<HttpResponse, ApiError> {
    let action = field(body, "action")
        .and_then(Value::as_str)
        .filter(|a| ALLOWED_ACTIONS.contains(a))
        .ok_or_else(|| ApiError::BadRequest("Invalid action".to_owned()))?;

    tracing::info!(action, "running hotspot admin action");
    let path = format!("/admin/system_api.php?action={action}&format=json");
    let result = state
        .client
        .get_json(&state.wpsd(), &path, ACTION_TIMEOUT)
        .await?;
    ok_json(&result)
}
