//! Shared state injected into every API request.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tokio::sync::{Mutex, watch};

use hotspot_core::config::{HotspotConfig, WpsdConfig};
use hotspot_core::error::{ConfigError, HotspotError};
use hotspot_core::pipeline::HealthStatus;
use hotspot_log_pipeline::LiveTraffic;

use crate::hotspot_client::HotspotClient;
use crate::mmdvm_ini::MmdvmIni;
use crate::stats::StatsReader;
use crate::tgif::{LastLinked, TgifScraper};

/// State shared by all request handlers.
pub struct AppState {
    /// Live traffic handle (read-only for handlers).
    pub traffic: LiveTraffic,
    pub client: HotspotClient,
    pub stats: StatsReader,
    pub tgif_scraper: TgifScraper,
    pub last_linked: LastLinked,
    config: RwLock<HotspotConfig>,
    config_path: PathBuf,
    /// Serializes config file writes.
    save_lock: Mutex<()>,
    health: watch::Receiver<HealthStatus>,
}

impl AppState {
    pub fn new(
        config: HotspotConfig,
        config_path: impl Into<PathBuf>,
        traffic: LiveTraffic,
        client: HotspotClient,
        tgif_scraper: TgifScraper,
        health: watch::Receiver<HealthStatus>,
    ) -> Self {
        Self {
            traffic,
            client,
            stats: StatsReader::default(),
            tgif_scraper,
            last_linked: LastLinked::default(),
            config: RwLock::new(config),
            config_path: config_path.into(),
            save_lock: Mutex::new(()),
            health,
        }
    }

    /// Replace the system stats reader.
    pub fn with_stats(mut self, stats: StatsReader) -> Self {
        self.stats = stats;
        self
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> HotspotConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current hotspot admin settings.
    pub fn wpsd(&self) -> WpsdConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .wpsd
            .clone()
    }

    pub fn dmr_id(&self) -> String {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .tgif
            .dmr_id
            .clone()
    }

    pub fn mmdvm_ini(&self) -> MmdvmIni {
        let path = self
            .config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .paths
            .mmdvm_ini
            .clone();
        MmdvmIni::new(path)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Latest log pipeline health published by the monitor.
    pub fn pipeline_health(&self) -> HealthStatus {
        self.health.borrow().clone()
    }

    /// Persist a new hotspot admin host, then apply it.
    ///
    /// Only `wpsd.host` is written into the file as it is on disk; env and
    /// CLI overrides stay in memory. The in-memory value changes only after
    /// the file was written.
    pub async fn update_wpsd_host(&self, host: String) -> Result<(), HotspotError> {
        let _guard = self.save_lock.lock().await;

        let mut on_disk = match HotspotConfig::from_file(&self.config_path).await {
            Ok(config) => config,
            Err(HotspotError::Config(ConfigError::FileNotFound { .. })) => {
                HotspotConfig::default()
            }
            Err(e) => return Err(e),
        };
        on_disk.wpsd.host.clone_from(&host);
        on_disk.save(&self.config_path).await?;

        self.config
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .wpsd
            .host
            .clone_from(&host);
        tracing::info!(wpsd_host = %host, path = %self.config_path.display(), "hotspot admin host updated");
        Ok(())
    }
}
