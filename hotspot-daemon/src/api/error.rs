//! API error type mapped to an HTTP status and `{"error": message}` body.

use hyper::StatusCode;
use serde_json::json;

use super::{HttpResponse, json_response};
use crate::hotspot_client::ClientError;
use crate::mmdvm_ini::IniError;

/// Request handler failures.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or rejected request input.
    #[error("{0}")]
    BadRequest(String),

    /// No route for the request.
    #[error("Not found")]
    NotFound,

    /// Request body over the size limit.
    #[error("Request body too large")]
    PayloadTooLarge,

    /// The hotspot admin failed or could not be reached.
    #[error("{0}")]
    Upstream(String),

    /// The daemon configuration could not be persisted.
    #[error("{0}")]
    HostConfig(String),

    /// Local failure (file access, task join).
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Upstream(_) | Self::HostConfig(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn into_response(self) -> HttpResponse {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %self, "request failed");
        }
        json_response(status, &json!({ "error": self.to_string() }))
    }
}

impl From<ClientError> for ApiError {
    fn from(e: ClientError) -> Self {
        Self::Upstream(e.to_string())
    }
}

impl From<IniError> for ApiError {
    fn from(e: IniError) -> Self {
        Self::Internal(e.to_string())
    }
}
