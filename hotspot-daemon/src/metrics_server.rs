//! Prometheus metrics HTTP listener.
//!
//! Uses the built-in HTTP listener from `metrics-exporter-prometheus`;
//! it is separate from the dashboard API port.

use std::net::SocketAddr;

use anyhow::Result;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};

use hotspot_core::config::MetricsConfig;
use hotspot_core::metrics as m;

/// Install the global metrics recorder and start the HTTP listener.
///
/// Call once per process, only when `[metrics] enabled = true`.
///
/// # Errors
///
/// - The listen address cannot be parsed
/// - The global recorder is already installed
pub fn install_metrics_recorder(config: &MetricsConfig) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.listen_addr, config.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid metrics listen address: {}", e))?;

    if addr.ip().is_unspecified() {
        tracing::warn!(
            listen_addr = %addr,
            "metrics endpoint is exposed on all interfaces"
        );
    }

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(
            Matcher::Full(m::HTTP_REQUEST_DURATION_SECONDS.to_owned()),
            &m::HTTP_DURATION_BUCKETS,
        )
        .map_err(|e| anyhow::anyhow!("invalid histogram buckets: {}", e))?
        .install()
        .map_err(|e| anyhow::anyhow!("failed to install metrics recorder: {}", e))?;

    m::describe_all();
    metrics::gauge!(m::DAEMON_BUILD_INFO, "version" => env!("CARGO_PKG_VERSION")).set(1.0);

    tracing::info!(listen_addr = %addr, "Prometheus metrics endpoint active");
    Ok(())
}
