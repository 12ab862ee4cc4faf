//! Periodic log pipeline health monitoring.
//!
//! The monitor polls [`Pipeline::health_check`] and publishes the result on
//! a `watch` channel read by `GET /api/health`. Transitions are logged once.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use hotspot_core::pipeline::{HealthStatus, Pipeline};
use hotspot_log_pipeline::LogPipeline;

/// Seconds between health checks.
pub const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// Status published before the first check.
pub fn initial_status() -> HealthStatus {
    HealthStatus::Unhealthy("not started".to_owned())
}

/// Spawn the monitor task. It exits when `cancel` fires.
pub fn spawn_health_monitor(
    pipeline: Arc<Mutex<LogPipeline>>,
    tx: watch::Sender<HealthStatus>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::debug!("health monitor shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let status = pipeline.lock().await.health_check().await;
                    publish(&tx, status);
                }
            }
        }
    })
}

/// Publish `status`, logging when it differs from the previous one.
pub fn publish(tx: &watch::Sender<HealthStatus>, status: HealthStatus) -> bool {
    tx.send_if_modified(|current| {
        if *current == status {
            return false;
        }
        match &status {
            HealthStatus::Healthy => tracing::info!("log pipeline healthy"),
            HealthStatus::Degraded(reason) => {
                tracing::warn!(reason = %reason, "log pipeline degraded");
            }
            HealthStatus::Unhealthy(reason) => {
                tracing::error!(reason = %reason, "log pipeline unhealthy");
            }
        }
        *current = status;
        true
    })
}
