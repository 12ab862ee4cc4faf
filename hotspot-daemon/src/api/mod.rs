//! Dashboard HTTP API.
//!
//! [`handle`] is the single hyper service entry point: it resolves the route,
//! reads and limits the JSON body, runs the handler and decorates the response
//! with permissive CORS headers. Handlers live in per-area submodules and
//! return `Result<HttpResponse, ApiError>`.

pub mod error;
pub mod mmdvm;
pub mod params;
pub mod settings;
pub mod tgif;
pub mod traffic;
pub mod wpsd;

pub use error::ApiError;

use std::sync::Arc;
use std::time::Instant;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{self, HeaderValue};
use hyper::{Method, Request, Response, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};

use hotspot_core::metrics as m;

use crate::state::AppState;

/// Response type produced by every handler.
pub type HttpResponse = Response<Full<Bytes>>;

/// Maximum accepted request body size.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

const ALLOWED_METHODS: &str = "GET,HEAD,PUT,PATCH,POST,DELETE";

/// API routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Health,
    LiveTraffic,
    System,
    Service,
    GetMmdvmConfig,
    PutMmdvmConfig,
    TgifInfo,
    TgifStatus,
    TgifLink,
    TgifUnlink,
    LastHeard,
    WpsdAction,
    GetConfig,
    PutConfig,
}

impl Route {
    /// Resolve a method and path. A single trailing slash is ignored.
    pub fn resolve(method: &Method, path: &str) -> Option<Self> {
        let path = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => path,
        };
        let route = match (method.as_str(), path) {
            ("GET", "/api/health") => Self::Health,
            ("GET", "/api/live-traffic") => Self::LiveTraffic,
            ("GET", "/api/system") => Self::System,
            ("GET", "/api/system/service") => Self::Service,
            ("GET", "/api/mmdvm-config") => Self::GetMmdvmConfig,
            ("PUT", "/api/mmdvm-config") => Self::PutMmdvmConfig,
            ("GET", "/api/tgif/info") => Self::TgifInfo,
            ("GET", "/api/tgif/status") => Self::TgifStatus,
            ("POST", "/api/tgif/link") => Self::TgifLink,
            ("POST", "/api/tgif/unlink") => Self::TgifUnlink,
            ("GET", "/api/wpsd/last-heard") => Self::LastHeard,
            ("POST", "/api/wpsd/action") => Self::WpsdAction,
            ("GET", "/api/config") => Self::GetConfig,
            ("PUT", "/api/config") => Self::PutConfig,
            _ => return None,
        };
        Some(route)
    }

    /// Metric label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Health => "/api/health",
            Self::LiveTraffic => "/api/live-traffic",
            Self::System => "/api/system",
            Self::Service => "/api/system/service",
            Self::GetMmdvmConfig | Self::PutMmdvmConfig => "/api/mmdvm-config",
            Self::TgifInfo => "/api/tgif/info",
            Self::TgifStatus => "/api/tgif/status",
            Self::TgifLink => "/api/tgif/link",
            Self::TgifUnlink => "/api/tgif/unlink",
            Self::LastHeard => "/api/wpsd/last-heard",
            Self::WpsdAction => "/api/wpsd/action",
            Self::GetConfig | Self::PutConfig => "/api/config",
        }
    }

    fn has_body(self) -> bool {
        matches!(
            self,
            Self::PutMmdvmConfig
                | Self::TgifLink
                | Self::TgifUnlink
                | Self::WpsdAction
                | Self::PutConfig
        )
    }
}

/// Serve one request.
pub async fn handle<B>(state: Arc<AppState>, req: Request<B>) -> HttpResponse
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let (parts, body) = req.into_parts();

    let (label, mut response) = if parts.method == Method::OPTIONS {
        ("preflight", preflight(&parts.headers))
    } else {
        match Route::resolve(&parts.method, parts.uri.path()) {
            Some(route) => {
                let result = dispatch(&state, route, parts.uri.query(), body).await;
                (route.label(), result.unwrap_or_else(ApiError::into_response))
            }
            None => ("unmatched", ApiError::NotFound.into_response()),
        }
    };

    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );

    let status = response.status().as_u16();
    let elapsed = started.elapsed();
    metrics::counter!(
        m::HTTP_REQUESTS_TOTAL,
        m::LABEL_ROUTE => label,
        m::LABEL_STATUS => status.to_string()
    )
    .increment(1);
    metrics::histogram!(m::HTTP_REQUEST_DURATION_SECONDS, m::LABEL_ROUTE => label)
        .record(elapsed.as_secs_f64());
    tracing::debug!(
        method = %parts.method,
        path = parts.uri.path(),
        status,
        elapsed_ms = elapsed.as_millis() as u64,
        "request served"
    );

    response
}

async fn dispatch<B>(
    state: &AppState,
    route: Route,
    query: Option<&str>,
    body: B,
) -> Result<HttpResponse, ApiError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let body = if route.has_body() {
        read_json(body).await?
    } else {
        Value::Object(Map::new())
    };

    match route {
        Route::Health => traffic::health(state),
        Route::LiveTraffic => traffic::live_traffic(state, query),
        Route::System => traffic::system(state).await,
        Route::Service => traffic::service(state),
        Route::GetMmdvmConfig => mmdvm::get_config(state).await,
        Route::PutMmdvmConfig => mmdvm::put_config(state, body).await,
        Route::TgifInfo => tgif::info(state),
        Route::TgifStatus => tgif::status(state).await,
        Route::TgifLink => tgif::link(state, &body).await,
        Route::TgifUnlink => tgif::unlink(state, &body).await,
        Route::LastHeard => wpsd::last_heard(state, query).await,
        Route::WpsdAction => wpsd::action(state, &body).await,
        Route::GetConfig => settings::get_config(state).await,
        Route::PutConfig => settings::put_config(state, &body).await,
    }
}

/// Read a JSON body up to [`MAX_BODY_BYTES`]. An empty body reads as `{}`.
async fn read_json<B>(body: B) -> Result<Value, ApiError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let collected = Limited::new(body, MAX_BODY_BYTES)
        .collect()
        .await
        .map_err(|e| {
            if e.downcast_ref::<LengthLimitError>().is_some() {
                ApiError::PayloadTooLarge
            } else {
                ApiError::BadRequest(format!("Failed to read request body: {e}"))
            }
        })?
        .to_bytes();

    if collected.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(&collected)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {e}")))
}

fn preflight(headers: &hyper::HeaderMap) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::NO_CONTENT;
    let out = response.headers_mut();
    out.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    if let Some(requested) = headers.get(header::ACCESS_CONTROL_REQUEST_HEADERS) {
        out.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
        out.insert(
            header::VARY,
            HeaderValue::from_static("Access-Control-Request-Headers"),
        );
    }
    out.insert(header::CONTENT_LENGTH, HeaderValue::from_static("0"));
    response
}

/// JSON response with the given status.
pub fn json_response<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> HttpResponse {
    let (status, body) = match serde_json::to_vec(value) {
        Ok(body) => (status, body),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize response");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                br#"{"error":"Failed to serialize response"}"#.to_vec(),
            )
        }
    };
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    response
}

/// `200 OK` JSON response.
pub fn ok_json<T: Serialize + ?Sized>(value: &T) -> Result<HttpResponse, ApiError> {
    Ok(json_response(StatusCode::OK, value))
}
