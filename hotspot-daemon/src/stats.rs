//! Host system statistics for the dashboard.
//!
//! Every reader falls back to `0` when its source is unavailable, so the
//! endpoint keeps working on hosts without a thermal zone or `/proc`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use hotspot_core::types::timestamp_millis;

/// Snapshot returned by `GET /api/system`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStats {
    /// Percent of CPU time not idle since boot.
    pub cpu_load: u32,
    /// SoC temperature in whole degrees Celsius.
    pub cpu_temp: i64,
    pub disk_used_percent: u32,
    pub memory_used_percent: u32,
    pub uptime_seconds: u64,
    #[serde(with = "timestamp_millis")]
    pub timestamp: DateTime<Utc>,
}

/// Reads [`SystemStats`] from configurable locations.
#[derive(Debug, Clone)]
pub struct StatsReader {
    proc_root: PathBuf,
    thermal_zone: PathBuf,
    disk_root: PathBuf,
}

impl Default for StatsReader {
    fn default() -> Self {
        Self {
            proc_root: PathBuf::from("/proc"),
            thermal_zone: PathBuf::from("/sys/class/thermal/thermal_zone0/temp"),
            disk_root: PathBuf::from("/"),
        }
    }
}

impl StatsReader {
    /// Reader rooted at custom paths.
    pub fn with_paths(
        proc_root: impl Into<PathBuf>,
        thermal_zone: impl Into<PathBuf>,
        disk_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            proc_root: proc_root.into(),
            thermal_zone: thermal_zone.into(),
            disk_root: disk_root.into(),
        }
    }

    /// Collect a snapshot. Blocking; call from `spawn_blocking`.
    pub fn read(&self) -> SystemStats {
        SystemStats {
            cpu_load: read_to_string(&self.proc_root.join("stat"))
                .and_then(|s| parse_cpu_load(&s))
                .unwrap_or(0),
            cpu_temp: read_to_string(&self.thermal_zone)
                .and_then(|s| parse_millidegrees(&s))
                .unwrap_or(0),
            disk_used_percent: disk_used_percent(&self.disk_root).unwrap_or(0),
            memory_used_percent: read_to_string(&self.proc_root.join("meminfo"))
                .and_then(|s| parse_memory_used(&s))
                .unwrap_or(0),
            uptime_seconds: read_to_string(&self.proc_root.join("uptime"))
                .and_then(|s| parse_uptime(&s))
                .unwrap_or(0),
            timestamp: Utc::now(),
        }
    }
}

fn read_to_string(path: &Path) -> Option<String> {
    std::fs::read_to_string(path).ok()
}

fn percent(used: f64, total: f64) -> Option<u32> {
    if total <= 0.0 {
        return None;
    }
    Some((used / total * 100.0).round().clamp(0.0, 100.0) as u32)
}

/// Aggregate `cpu` line of `/proc/stat`: user nice system idle iowait irq ...
///
/// Busy share is computed over user + nice + system + idle + irq.
fn parse_cpu_load(stat: &str) -> Option<u32> {
    let line = stat.lines().find(|l| l.starts_with("cpu "))?;
    let fields: Vec<f64> = line
        .split_whitespace()
        .skip(1)
        .map(|f| f.parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;
    let [user, nice, system, idle, _iowait, irq, ..] = fields.as_slice() else {
        return None;
    };
    let total = user + nice + system + idle + irq;
    percent(total - idle, total)
}

fn parse_millidegrees(raw: &str) -> Option<i64> {
    let millideg: f64 = raw.trim().parse::<i64>().ok()? as f64;
    Some((millideg / 1000.0).round() as i64)
}

/// `MemTotal` against `MemAvailable` (or `MemFree` on old kernels).
fn parse_memory_used(meminfo: &str) -> Option<u32> {
    let field = |name: &str| -> Option<f64> {
        meminfo
            .lines()
            .find_map(|l| l.strip_prefix(name)?.strip_prefix(':'))
            .and_then(|rest| rest.split_whitespace().next()?.parse().ok())
    };
    let total = field("MemTotal")?;
    let free = field("MemAvailable").or_else(|| field("MemFree"))?;
    percent(total - free, total)
}

fn parse_uptime(raw: &str) -> Option<u64> {
    let secs: f64 = raw.split_whitespace().next()?.parse().ok()?;
    Some(secs.max(0.0).floor() as u64)
}

fn disk_used_percent(root: &Path) -> Option<u32> {
    let stat = nix::sys::statvfs::statvfs(root).ok()?;
    let total = stat.blocks() as f64;
    let free = stat.blocks_free() as f64;
    percent(total - free, total)
}
