//! smbmetrics-core — process sampling and Prometheus collectors for Samba.
//!
//! Provides:
//! - `collector` — OS access seams (`/proc`, external commands), worker
//!   discovery and per-process resource reading
//! - `model` — per-process samples and the scrape-wide aggregate
//! - `status` — `smbstatus` and version information
//! - `exporter` — the four `smb_*` Prometheus collectors
//! - `config` — exporter configuration shared with the daemon

pub mod collector;
pub mod config;
pub mod exporter;
pub mod model;
pub mod status;

/// Exporter version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commit the exporter was built from (git short SHA or `SMBMETRICS_COMMIT_ID`).
pub const COMMIT_ID: &str = env!("SMBMETRICS_COMMIT_ID");
