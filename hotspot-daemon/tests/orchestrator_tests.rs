//! Orchestrator and server integration tests.
//!
//! Tests the full flow: config -> pipeline start -> HTTP API -> shutdown.

mod common;

use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use hotspot_core::config::HotspotConfig;
use hotspot_daemon::orchestrator::Orchestrator;
use hotspot_daemon::server;
use hotspot_log_pipeline::collector::log_file_name;

use common::mock_hotspot::MockHotspot;
use common::{TestApp, test_config};

const RF_END: &str = "M: 2024-01-01 12:00:07.600 DMR Slot 2, received RF end of voice transmission from K6JM to 9990, 7.6 seconds, BER: 0.0%, RSSI: -43/-45/-47 dBm";

async fn free_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

async fn get_json(url: &str) -> (u16, Value) {
    let response = reqwest::get(url).await.unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn server_serves_until_cancelled() {
    let app = TestApp::new("http://127.0.0.1:9");
    let listener = server::bind("127.0.0.1", 0).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();
    let task = tokio::spawn(server::serve(
        listener,
        Arc::clone(&app.state),
        cancel.clone(),
    ));

    let response = reqwest::get(format!("http://{addr}/api/health"))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["ok"], Value::Bool(true));

    let (status, body) = get_json(&format!("http://{addr}/api/unknown")).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Not found");

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("server did not stop")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn orchestrator_tails_logs_and_serves_until_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let mock = MockHotspot::start().await;
    mock.respond("/admin/system_api.php", 200, r#"{"ip":"10.0.0.2"}"#);

    let mut config = test_config(dir.path(), &mock.url());
    config.server.port = free_port().await;
    let log_path = dir
        .path()
        .join("logs")
        .join(log_file_name("MMDVM", Utc::now().date_naive()));
    let mut file = std::fs::File::create(&log_path).unwrap();
    writeln!(file, "{RF_END}").unwrap();
    file.sync_all().unwrap();

    let mut orchestrator =
        Orchestrator::build_from_config(config, dir.path().join("hotspot.toml")).unwrap();
    let mut addr_rx = orchestrator.local_addr();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let client = async move {
        let addr: SocketAddr = (*addr_rx.wait_for(Option::is_some).await.unwrap()).unwrap();
        let url = format!("http://{addr}/api/live-traffic");

        let mut events = Vec::new();
        for _ in 0..250 {
            let (_, body) = get_json(&url).await;
            events = body.as_array().cloned().unwrap_or_default();
            if !events.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        let (_, service) = get_json(&format!("http://{addr}/api/system/service")).await;
        shutdown_tx.send(()).unwrap();
        (events, service)
    };
    let shutdown = async {
        let _ = shutdown_rx.await;
    };

    let (result, (events, service)) = tokio::join!(orchestrator.run_until(shutdown), client);
    result.unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["callsign"], "K6JM");
    assert_eq!(events[0]["timeslot"], 2);
    assert_eq!(service["mmdvmHost"], "running");
    assert!(orchestrator.local_addr().borrow().is_none());
}

#[tokio::test]
async fn orchestrator_fails_when_port_is_taken() {
    let dir = tempfile::tempdir().unwrap();
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let mut config = test_config(dir.path(), "http://127.0.0.1:9");
    config.server.port = taken.local_addr().unwrap().port();

    let mut orchestrator =
        Orchestrator::build_from_config(config, dir.path().join("hotspot.toml")).unwrap();
    let err = orchestrator
        .run_until(std::future::pending())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("failed to bind"));
}

#[tokio::test]
async fn build_rejects_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path(), "http://127.0.0.1:9");
    config.general.log_level = "loud".to_owned();

    let err = Orchestrator::build_from_config(config, dir.path().join("hotspot.toml"))
        .err()
        .expect("invalid config accepted");
    assert!(err.to_string().contains("config validation failed"));
}

#[tokio::test]
async fn build_writes_default_config_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hotspot.toml");

    let orchestrator = Orchestrator::build(&path).await.unwrap();
    assert!(path.exists());
    let saved = HotspotConfig::from_file(&path).await.unwrap();
    assert_eq!(saved.server.port, orchestrator.config().server.port);
}
