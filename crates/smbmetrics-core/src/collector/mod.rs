//! Process discovery and resource sampling for Samba workers.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        WorkerScanner                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌────────────┐  │
//! │  │ ProcessDiscovery │  │ ProcessStatReader│  │ Aggregator │  │
//! │  │  - pgrep <name>  │  │  - /proc/[pid]/* │  │  - sums    │  │
//! │  └────────┬─────────┘  │  - SystemContext │  └────────────┘  │
//! │           │            └────────┬─────────┘                  │
//! │    ┌──────▼────────┐     ┌──────▼──────┐                     │
//! │    │ CommandRunner │     │ FileSystem  │ (traits)            │
//! │    └──────┬────────┘     └──────┬──────┘                     │
//! └───────────┼─────────────────────┼────────────────────────────┘
//!             │                     │
//!     ┌───────┴───────┐     ┌───────┴──────┐
//!     │ SystemCommand │     │    RealFs    │   production
//!     │  MockCommand  │     │    MockFs    │   tests
//!     └───────────────┘     └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use smbmetrics_core::collector::mock::{MockCommand, MockFs};
//! use smbmetrics_core::collector::WorkerScanner;
//! use smbmetrics_core::config::ExporterConfig;
//!
//! let scanner = WorkerScanner::from_config(
//!     MockFs::smbd_host(),
//!     MockCommand::samba_server(),
//!     &ExporterConfig::default(),
//! );
//! let scan = scanner.scan();
//! assert_eq!(scan.snapshot.up, 1);
//! ```

pub mod mock;
pub mod procfs;
mod scanner;
pub mod traits;

pub use procfs::{DiscoveryError, ProcessDiscovery, ProcessStatReader, ReadError};
pub use scanner::{Scan, ScanTiming, WorkerScanner};
pub use traits::{CommandOutput, CommandRunner, FileSystem, RealFs, SystemCommand};
