//! Hotspot dashboard daemon library.
//!
//! This library exposes internal modules for integration testing.
//! In production, `hotspot-daemon` is used as a binary (main.rs).

pub mod api;
pub mod cli;
pub mod health;
pub mod hotspot_client;
pub mod logging;
pub mod metrics_server;
pub mod mmdvm_ini;
pub mod orchestrator;
pub mod server;
pub mod state;
pub mod stats;
pub mod tgif;
