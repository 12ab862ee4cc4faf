use anyhow::Result;
use clap::Parser;

use hotspot_core::config::HotspotConfig;
use hotspot_daemon::cli::DaemonCli;
use hotspot_daemon::logging;
use hotspot_daemon::orchestrator::Orchestrator;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    // 설정 로드 (파일 → 환경변수 → CLI 플래그)
    let mut config = HotspotConfig::load(&cli.config)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load config {}: {}", cli.config.display(), e))?;
    if let Some(level) = &cli.log_level {
        config.general.log_level.clone_from(level);
    }
    if let Some(format) = &cli.log_format {
        config.general.log_format.clone_from(format);
    }

    if cli.validate {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;
        println!("{}: configuration is valid", cli.config.display());
        return Ok(());
    }

    logging::init_tracing(&config.general)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "hotspot-daemon starting"
    );

    let mut orchestrator = Orchestrator::build_from_config(config, cli.config)?;
    orchestrator.run().await
}
