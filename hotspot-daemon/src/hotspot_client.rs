//! HTTP client for the hotspot's web admin (WPSD / Pi-Star).
//!
//! Every call takes the current [`WpsdConfig`] so that a host changed via
//! `PUT /api/config` applies to the next request without rebuilding the client.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde_json::{Value, json};

use hotspot_core::config::WpsdConfig;
use hotspot_core::metrics as m;

/// Timeout for admin actions and last-heard queries.
pub const ACTION_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout for scraping admin HTML pages.
pub const SCRAPE_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for reachability probes.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Delay before the single probe retry.
pub const PROBE_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Admin endpoint used for reachability checks.
pub const PROBE_PATH: &str = "/admin/system_api.php?action=get_ip&format=json";

/// Hotspot client failures.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Connection, timeout or body read failure.
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status from the hotspot.
    #[error("HTTP {0}")]
    Status(u16),
}

/// Raw response of a form post.
#[derive(Debug, Clone)]
pub struct FormResponse {
    pub status: u16,
    pub body: String,
}

impl FormResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Shared reqwest client for hotspot admin calls.
#[derive(Debug, Clone)]
pub struct HotspotClient {
    http: reqwest::Client,
}

/// Base URL without a trailing slash.
pub fn base_url(wpsd: &WpsdConfig) -> String {
    wpsd.host.strip_suffix('/').unwrap_or(&wpsd.host).to_owned()
}

impl HotspotClient {
    /// Build the client.
    pub fn new() -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("hotspot-daemon/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    fn get(&self, wpsd: &WpsdConfig, path: &str, timeout: Duration) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}{path}", base_url(wpsd)))
            .basic_auth(&wpsd.username, Some(&wpsd.password))
            .timeout(timeout)
    }

    /// GET a JSON document. Non-JSON bodies are returned as `{"raw": text}`.
    pub async fn get_json(
        &self,
        wpsd: &WpsdConfig,
        path: &str,
        timeout: Duration,
    ) -> Result<Value, ClientError> {
        let result: Result<Value, ClientError> = async {
            let response = self.get(wpsd, path, timeout).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(ClientError::Status(status.as_u16()));
            }
            let text = response.text().await?;
            Ok(serde_json::from_str(&text).unwrap_or_else(|_| json!({ "raw": text })))
        }
        .await;

        if let Err(e) = &result {
            record_failure(path, e);
        }
        result
    }

    /// GET a page body. Non-success statuses are errors.
    pub async fn get_text(
        &self,
        wpsd: &WpsdConfig,
        path: &str,
        timeout: Duration,
    ) -> Result<String, ClientError> {
        let result: Result<String, ClientError> = async {
            let response = self.get(wpsd, path, timeout).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(ClientError::Status(status.as_u16()));
            }
            Ok(response.text().await?)
        }
        .await;

        if let Err(e) = &result {
            record_failure(path, e);
        }
        result
    }

    /// POST an `application/x-www-form-urlencoded` body.
    ///
    /// Non-success statuses are returned, not raised; only transport
    /// failures are errors.
    pub async fn post_form(
        &self,
        wpsd: &WpsdConfig,
        path: &str,
        body: String,
        timeout: Duration,
    ) -> Result<FormResponse, ClientError> {
        let result: Result<FormResponse, ClientError> = async {
            let response = self
                .http
                .post(format!("{}{path}", base_url(wpsd)))
                .basic_auth(&wpsd.username, Some(&wpsd.password))
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(body)
                .timeout(timeout)
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(FormResponse { status, body })
        }
        .await;

        match &result {
            Err(e) => record_failure(path, e),
            Ok(response) if !response.is_success() => {
                record_failure(path, &ClientError::Status(response.status));
            }
            Ok(_) => {}
        }
        result
    }

    /// Whether the admin answers the probe endpoint with a success status.
    ///
    /// A transport failure is retried once after [`PROBE_RETRY_DELAY`];
    /// an HTTP error status is not.
    pub async fn is_reachable(&self, wpsd: &WpsdConfig) -> bool {
        self.is_reachable_with_delay(wpsd, PROBE_RETRY_DELAY).await
    }

    async fn is_reachable_with_delay(&self, wpsd: &WpsdConfig, retry_delay: Duration) -> bool {
        let attempt = || self.get(wpsd, PROBE_PATH, PROBE_TIMEOUT).send();
        let response = match attempt().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(error = %e, "hotspot probe failed, retrying");
                tokio::time::sleep(retry_delay).await;
                match attempt().await {
                    Ok(response) => response,
                    Err(e) => {
                        tracing::debug!(error = %e, "hotspot probe retry failed");
                        return false;
                    }
                }
            }
        };
        response.status().is_success()
    }

    /// Single probe without retry, reporting the status for startup logs.
    pub async fn probe_status(&self, wpsd: &WpsdConfig) -> Result<u16, ClientError> {
        let response = self.get(wpsd, PROBE_PATH, PROBE_TIMEOUT).send().await?;
        Ok(response.status().as_u16())
    }
}

fn record_failure(path: &str, error: &ClientError) {
    // 쿼리 문자열은 레이블 카디널리티에서 제외
    let route = path.split('?').next().unwrap_or(path).to_owned();
    tracing::warn!(path = %route, error = %error, "hotspot admin request failed");
    metrics::counter!(m::WPSD_UPSTREAM_FAILURES_TOTAL, m::LABEL_ROUTE => route).increment(1);
}
