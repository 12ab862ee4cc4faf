//! MMDVMHost INI configuration handlers.

use serde_json::{Value, json};

use super::{ApiError, HttpResponse, ok_json};
use crate::state::AppState;

/// `GET /api/mmdvm-config`
pub async fn get_config(state: &AppState) -> Result<HttpResponse, ApiError> {
    let doc = state.mmdvm_ini().read().await?;
    ok_json(&doc.to_json())
}

/// `PUT /api/mmdvm-config`
///
/// Body is `{section: {key: value}}`, merged into the existing file.
pub async fn put_config(state: &AppState, body: Value) -> Result<HttpResponse, ApiError> {
    let Value::Object(patch) = body else {
        return Err(ApiError::BadRequest("Invalid request body".to_owned()));
    };
    let ini = state.mmdvm_ini();
    ini.update(&patch).await?;
    tracing::info!(path = %ini.path().display(), sections = patch.len(), "MMDVMHost config updated");
    ok_json(&json!({ "ok": true }))
}
