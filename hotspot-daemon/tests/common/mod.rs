#![allow(dead_code)]

pub mod mock_hotspot;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{HeaderMap, Method, Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::watch;

use hotspot_core::config::HotspotConfig;
use hotspot_core::pipeline::HealthStatus;
use hotspot_daemon::api;
use hotspot_daemon::hotspot_client::HotspotClient;
use hotspot_daemon::state::AppState;
use hotspot_daemon::tgif::TgifScraper;
use hotspot_log_pipeline::{LiveTraffic, PipelineConfig};

/// Config rooted in `dir` and pointing at `wpsd_host`.
pub fn test_config(dir: &Path, wpsd_host: &str) -> HotspotConfig {
    let log_dir = dir.join("logs");
    std::fs::create_dir_all(&log_dir).unwrap();

    let mut config = HotspotConfig::default();
    config.server.host = "127.0.0.1".to_owned();
    config.paths.log_dir = log_dir.display().to_string();
    config.paths.mmdvm_ini = dir.join("MMDVM.ini").display().to_string();
    config.wpsd.host = wpsd_host.to_owned();
    config.wpsd.username = "pi-star".to_owned();
    config.wpsd.password = "raspberry".to_owned();
    config.tgif.dmr_id = "3221205".to_owned();
    config
}

pub struct TestApp {
    pub state: Arc<AppState>,
    pub traffic: LiveTraffic,
    pub config_path: PathBuf,
    pub dir: TempDir,
}

impl TestApp {
    pub fn new(wpsd_host: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), wpsd_host);
        Self::from_config(dir, config)
    }

    pub fn from_config(dir: TempDir, config: HotspotConfig) -> Self {
        let config_path = dir.path().join("hotspot.toml");
        let traffic = LiveTraffic::new(&PipelineConfig::from_core(&config));
        let (_tx, rx) = watch::channel(HealthStatus::Healthy);
        let state = AppState::new(
            config,
            &config_path,
            traffic.clone(),
            HotspotClient::new().unwrap(),
            TgifScraper::new().unwrap(),
            rx,
        );
        Self {
            state: Arc::new(state),
            traffic,
            config_path,
            dir,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let (status, _, body) = self.call(Method::GET, uri, None).await;
        (status, body)
    }

    pub async fn send(&self, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
        let (status, _, body) = self.call(method, uri, Some(body)).await;
        (status, body)
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        body: Option<&str>,
    ) -> (StatusCode, HeaderMap, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let req = builder
            .body(Full::new(Bytes::from(body.unwrap_or("").to_owned())))
            .unwrap();

        let response = api::handle(Arc::clone(&self.state), req).await;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, json)
    }
}

/// `http://127.0.0.1:<port>` with nothing listening.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
