//! Discovery → read → aggregate pipeline behind the process collector.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::collector::procfs::{ProcessDiscovery, ProcessStatReader};
use crate::collector::traits::{CommandRunner, FileSystem};
use crate::config::{ExporterConfig, NetAttribution};
use crate::model::{AggregateSnapshot, Aggregator};

/// Timing of one scan, for debug logging.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanTiming {
    pub total: Duration,
    pub discovery: Duration,
    pub read: Duration,
}

/// Result of one scan.
#[derive(Debug, Clone, Default)]
pub struct Scan {
    pub snapshot: AggregateSnapshot,
    /// PIDs returned by discovery (before any were skipped).
    pub discovered: usize,
    pub timing: ScanTiming,
}

/// Scans the worker processes once per call.
///
/// Holds no state between calls; each scan runs a fresh discovery and reads
/// `/proc` again, so concurrent calls are independent.
pub struct WorkerScanner<F: FileSystem, R: CommandRunner> {
    discovery: ProcessDiscovery<R>,
    reader: ProcessStatReader<F>,
    aggregator: Aggregator,
}

impl<F: FileSystem, R: CommandRunner> WorkerScanner<F, R> {
    pub fn new(
        discovery: ProcessDiscovery<R>,
        reader: ProcessStatReader<F>,
        net_attribution: NetAttribution,
    ) -> Self {
        Self {
            discovery,
            reader,
            aggregator: Aggregator::new(net_attribution),
        }
    }

    /// Builds a scanner from the exporter configuration.
    pub fn from_config(fs: F, runner: R, config: &ExporterConfig) -> Self {
        let discovery = ProcessDiscovery::new(runner, &config.process_name)
            .with_pgrep(&config.pgrep_path);
        let reader = ProcessStatReader::new(fs, &config.proc_path);
        Self::new(discovery, reader, config.net_attribution)
    }

    /// Discovers workers, reads each one and sums the results.
    ///
    /// A discovery failure yields [`AggregateSnapshot::down`]; unreadable
    /// workers are skipped.
    pub fn scan(&self) -> Scan {
        let start = Instant::now();

        let pids = match self.discovery.list_worker_pids() {
            Ok(pids) => pids,
            Err(e) => {
                warn!(
                    process = self.discovery.process_name(),
                    error = %e,
                    "worker discovery failed"
                );
                let elapsed = start.elapsed();
                return Scan {
                    snapshot: AggregateSnapshot::down(),
                    discovered: 0,
                    timing: ScanTiming {
                        total: elapsed,
                        discovery: elapsed,
                        read: Duration::ZERO,
                    },
                };
            }
        };
        let discovery = start.elapsed();

        let read_start = Instant::now();
        let samples = self.reader.read_samples(&pids);
        let read = read_start.elapsed();

        let snapshot = self.aggregator.aggregate(&samples);
        let timing = ScanTiming {
            total: start.elapsed(),
            discovery,
            read,
        };

        debug!(
            discovered = pids.len(),
            read = samples.len(),
            up = snapshot.up,
            total_ms = timing.total.as_millis() as u64,
            "worker scan complete"
        );

        Scan {
            snapshot,
            discovered: pids.len(),
            timing,
        }
    }
}
