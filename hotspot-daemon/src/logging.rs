//! Logging initialization for hotspot-daemon.
//!
//! Configures `tracing-subscriber` from the `[general]` section of
//! `HotspotConfig`. `RUST_LOG` wins over the configured level; without it the
//! configured level applies to the daemon and pipeline crates while the HTTP
//! and file-watch dependencies are held at `warn`.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use hotspot_core::config::GeneralConfig;

/// Dependencies that log every connection or file event at `debug`.
const NOISY_TARGETS: [&str; 5] = ["hyper", "hyper_util", "reqwest", "h2", "notify"];

/// Filter directives for `level` when `RUST_LOG` is not set.
///
/// `debug` on the hotspot crates would otherwise pull in per-connection hyper
/// logs for every dashboard poll.
pub fn default_directives(level: &str) -> String {
    NOISY_TARGETS
        .iter()
        .fold(level.to_owned(), |mut directives, target| {
            directives.push(',');
            directives.push_str(target);
            directives.push_str("=warn");
            directives
        })
}

fn env_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(default_directives(level))
        .map_err(|e| anyhow::anyhow!("invalid log level '{}': {}", level, e))
}

/// Initialize the global tracing subscriber.
///
/// Must be called exactly once, before any tracing macros are used.
///
/// # Formats
///
/// * `"json"` - JSON lines for journald / log shippers
/// * `"pretty"` - Human-readable output (default)
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let filter = env_filter(&config.log_level)?;
    let registry = tracing_subscriber::registry().with(filter);

    let initialized = match config.log_format.as_str() {
        "json" => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false),
            )
            .try_init(),
        "pretty" => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
        other => {
            return Err(anyhow::anyhow!(
                "unknown log format '{}', expected 'json' or 'pretty'",
                other
            ));
        }
    };
    initialized.map_err(|e| anyhow::anyhow!("failed to initialize tracing subscriber: {}", e))
}
