//! Daemon assembly and lifecycle management.
//!
//! The [`Orchestrator`] loads configuration, builds the log pipeline and the
//! shared API state, then runs the HTTP server next to the pipeline until a
//! shutdown signal arrives.
//!
//! # Startup Order
//!
//! 1. Log Pipeline (fills the live traffic buffer)
//! 2. HTTP API (reads the buffer)
//! 3. Health monitor and hotspot reachability check
//!
//! # Shutdown Order
//!
//! 1. HTTP API and background tasks (cancelled together)
//! 2. Log Pipeline (offsets kept for a restart)

use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;

use hotspot_core::config::HotspotConfig;
use hotspot_core::pipeline::{HealthStatus, Pipeline};
use hotspot_log_pipeline::{LogPipeline, LogPipelineBuilder, PipelineConfig};

use crate::health::{self, HEALTH_CHECK_INTERVAL};
use crate::hotspot_client::{HotspotClient, base_url};
use crate::metrics_server;
use crate::server;
use crate::state::AppState;
use crate::tgif::TgifScraper;

/// The main daemon orchestrator.
pub struct Orchestrator {
    /// Loaded and validated configuration.
    config: HotspotConfig,
    pipeline: Arc<Mutex<LogPipeline>>,
    state: Arc<AppState>,
    health_tx: watch::Sender<HealthStatus>,
    /// Address the API is bound to while running.
    local_addr: watch::Sender<Option<SocketAddr>>,
    start_time: Instant,
}

impl Orchestrator {
    /// Load configuration from `config_path` and build the orchestrator.
    ///
    /// A missing file is created with default values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read or parsed
    /// - Configuration validation fails
    /// - The log pipeline or HTTP client fails to initialize
    pub async fn build(config_path: &Path) -> Result<Self> {
        let config = HotspotConfig::load(config_path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?;
        Self::build_from_config(config, config_path)
    }

    /// Build from an already-loaded configuration.
    ///
    /// `config_path` is where `PUT /api/config` persists changes.
    pub fn build_from_config(
        config: HotspotConfig,
        config_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

        if config.metrics.enabled {
            metrics_server::install_metrics_recorder(&config.metrics)?;
        }

        tracing::info!(log_dir = %config.paths.log_dir, "initializing log pipeline");
        let pipeline = LogPipelineBuilder::new()
            .config(PipelineConfig::from_core(&config))
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build log pipeline: {}", e))?;

        let client = HotspotClient::new()
            .map_err(|e| anyhow::anyhow!("failed to build hotspot client: {}", e))?;
        let scraper = TgifScraper::new()?;

        let (health_tx, health_rx) = watch::channel(health::initial_status());
        let state = AppState::new(
            config.clone(),
            config_path,
            pipeline.traffic(),
            client,
            scraper,
            health_rx,
        );

        tracing::info!("orchestrator initialized");

        Ok(Self {
            config,
            pipeline: Arc::new(Mutex::new(pipeline)),
            state: Arc::new(state),
            health_tx,
            local_addr: watch::Sender::new(None),
            start_time: Instant::now(),
        })
    }

    /// Shared API state.
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Watch the bound API address. `None` until the listener is bound.
    pub fn local_addr(&self) -> watch::Receiver<Option<SocketAddr>> {
        self.local_addr.subscribe()
    }

    /// Run until `SIGTERM` or `SIGINT`.
    pub async fn run(&mut self) -> Result<()> {
        let shutdown = shutdown_signal()?;
        self.run_until(shutdown).await
    }

    /// Start all components and run until `shutdown` completes.
    ///
    /// Returns an error if startup fails or the HTTP server stops on its own.
    pub async fn run_until(&mut self, shutdown: impl Future<Output = ()>) -> Result<()> {
        tracing::info!("starting log pipeline");
        self.pipeline
            .lock()
            .await
            .start()
            .await
            .map_err(|e| anyhow::anyhow!("failed to start log pipeline: {}", e))?;

        let listener = match server::bind(&self.config.server.host, self.config.server.port).await
        {
            Ok(listener) => listener,
            Err(e) => {
                tracing::warn!("API bind failed, stopping log pipeline");
                self.stop_pipeline().await;
                return Err(e);
            }
        };
        self.local_addr.send_replace(listener.local_addr().ok());

        let cancel = CancellationToken::new();
        let mut server_task = tokio::spawn(server::serve(
            listener,
            Arc::clone(&self.state),
            cancel.clone(),
        ));
        let monitor = health::spawn_health_monitor(
            Arc::clone(&self.pipeline),
            self.health_tx.clone(),
            HEALTH_CHECK_INTERVAL,
            cancel.clone(),
        );
        let probe = tokio::spawn(check_hotspot_reachable(Arc::clone(&self.state)));

        tracing::info!("hotspot-daemon running");
        let early_exit = tokio::select! {
            () = shutdown => None,
            result = &mut server_task => Some(result),
        };

        cancel.cancel();
        probe.abort();
        let stopped_early = early_exit.is_some();
        let server_result = match early_exit {
            Some(result) => result,
            None => server_task.await,
        };
        if let Err(e) = monitor.await {
            tracing::warn!(error = %e, "health monitor task failed");
        }

        self.stop_pipeline().await;
        self.local_addr.send_replace(None);
        tracing::info!(
            uptime_secs = self.start_time.elapsed().as_secs(),
            "hotspot-daemon shut down"
        );

        server_result.map_err(|e| anyhow::anyhow!("API task failed: {}", e))??;
        if stopped_early {
            anyhow::bail!("dashboard API stopped unexpectedly");
        }
        Ok(())
    }

    async fn stop_pipeline(&self) {
        let mut pipeline = self.pipeline.lock().await;
        if let Err(e) = pipeline.stop().await {
            tracing::error!(error = %e, "failed to stop log pipeline");
        }
    }

    /// The loaded configuration.
    pub fn config(&self) -> &HotspotConfig {
        &self.config
    }
}

/// Install `SIGTERM`/`SIGINT` handlers and return a future that completes
/// on the first signal.
///
/// # Errors
///
/// Returns an error if signal handlers cannot be installed.
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("failed to install SIGINT handler: {}", e))?;

    Ok(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        tracing::info!(signal = name, "shutdown signal received");
    })
}

/// Log whether the hotspot admin answers with the configured credentials.
async fn check_hotspot_reachable(state: Arc<AppState>) {
    let wpsd = state.wpsd();
    let host = base_url(&wpsd);
    match state.client.probe_status(&wpsd).await {
        Ok(status) if (200..300).contains(&status) => {
            tracing::info!(wpsd_host = %host, "hotspot admin reachable");
        }
        Ok(status) => {
            tracing::warn!(
                wpsd_host = %host,
                status,
                "hotspot admin answered with an error; check wpsd.username and wpsd.password"
            );
        }
        Err(e) => {
            tracing::warn!(
                wpsd_host = %host,
                error = %e,
                "hotspot admin not reachable; check wpsd.host"
            );
        }
    }
}
