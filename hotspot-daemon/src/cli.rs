//! CLI argument definitions for hotspot-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// MMDVM hotspot dashboard daemon.
///
/// Tails MMDVMHost logs, serves the dashboard JSON API and proxies
/// administrative calls to the hotspot's web admin.
#[derive(Parser, Debug)]
#[command(name = "hotspot-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to hotspot.toml configuration file.
    ///
    /// Written with default values if it does not exist.
    #[arg(short, long, default_value = "/etc/hotspot/hotspot.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Validate configuration file and exit without starting the daemon.
    #[arg(long)]
    pub validate: bool,
}
