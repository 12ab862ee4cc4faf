//! TGIF talkgroup handlers, proxied through the hotspot admin.

use hyper::StatusCode;
use serde_json::{Value, json};

use super::params::{field, json_int};
use super::{ApiError, HttpResponse, json_response, ok_json};
use crate::hotspot_client::{ACTION_TIMEOUT, SCRAPE_TIMEOUT, base_url};
use crate::state::AppState;
use crate::tgif::{
    LINKS_PATH, MANAGER_PATH, SlotLinks, link_form, proxy_error_message, slot_or_default,
    talkgroup_or_fallback, unlink_form, unreachable_message,
};

/// `GET /api/tgif/info`
pub fn info(state: &AppState) -> Result<HttpResponse, ApiError> {
    let base = base_url(&state.wpsd());
    ok_json(&json!({
        "dmrId": state.dmr_id(),
        "wpsdProxyUrl": format!("{base}{MANAGER_PATH}"),
        "statusUrl": format!("{base}{LINKS_PATH}"),
    }))
}

/// `GET /api/tgif/status`
///
/// Slots are `null` when the status page cannot be fetched.
pub async fn status(state: &AppState) -> Result<HttpResponse, ApiError> {
    let wpsd = state.wpsd();
    let slots = match state.client.get_text(&wpsd, LINKS_PATH, SCRAPE_TIMEOUT).await {
        Ok(html) => state.tgif_scraper.parse(&html),
        Err(e) => {
            tracing::debug!(error = %e, "TGIF link status unavailable");
            SlotLinks::default()
        }
    };
    let last = state.last_linked.get();

    ok_json(&json!({
        "dmrId": state.dmr_id(),
        "connected": true,
        "slot1": slots.slot1,
        "slot2": slots.slot2,
        "lastLinkedSlot1": last.slot1,
        "lastLinkedSlot2": last.slot2,
    }))
}

/// `POST /api/tgif/link` with `{tg, timeslot}`
pub async fn link(state: &AppState, body: &Value) -> Result<HttpResponse, ApiError> {
    let talkgroup = talkgroup_or_fallback(field(body, "tg").and_then(json_int));
    let slot = timeslot(body);

    if let Some(failed) = submit(state, link_form(slot, &talkgroup)).await {
        return Ok(failed);
    }
    tracing::info!(talkgroup = %talkgroup, slot, "TGIF talkgroup linked");
    state.last_linked.set(slot, Some(talkgroup.clone()));
    ok_json(&json!({ "ok": true, "tg": talkgroup, "slot": slot }))
}

/// `POST /api/tgif/unlink` with `{timeslot}`
pub async fn unlink(state: &AppState, body: &Value) -> Result<HttpResponse, ApiError> {
    let slot = timeslot(body);

    if let Some(failed) = submit(state, unlink_form(slot)).await {
        return Ok(failed);
    }
    tracing::info!(slot, "TGIF slot unlinked");
    state.last_linked.set(slot, None);
    ok_json(&json!({ "ok": true, "slot": slot }))
}

fn timeslot(body: &Value) -> u8 {
    slot_or_default(field(body, "timeslot").and_then(json_int))
}

/// Post a manager form. Returns the error response on failure.
async fn submit(state: &AppState, form: String) -> Option<HttpResponse> {
    let wpsd = state.wpsd();
    let base = base_url(&wpsd);
    let message = match state
        .client
        .post_form(&wpsd, MANAGER_PATH, form, ACTION_TIMEOUT)
        .await
    {
        Ok(response) if response.is_success() => return None,
        Ok(response) => proxy_error_message(response.status, &base),
        Err(e) => unreachable_message(&e.to_string(), &base),
    };
    Some(json_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        &json!({ "error": message }),
    ))
}
