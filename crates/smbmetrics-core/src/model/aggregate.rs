//! Scrape-wide rollup of per-process samples.

use super::sample::{NetCounters, ProcessSample};
use crate::config::NetAttribution;

/// Totals over every worker read in one scrape.
///
/// All fields are plain sums; nothing is averaged or weighted. With no
/// readable worker every field is zero and `up` is 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateSnapshot {
    /// 1 when discovery succeeded and at least one worker was read.
    pub up: u8,
    pub processes: u64,
    pub cpu_percent: f64,
    pub vm_bytes: u64,
    pub mem_percent: f64,
    pub io_read_count: u64,
    pub io_read_bytes: u64,
    pub io_write_count: u64,
    pub io_write_bytes: u64,
    pub net_bytes_sent: u64,
    pub net_bytes_recv: u64,
    pub open_files: u64,
    pub threads: u64,
}

impl AggregateSnapshot {
    /// Snapshot reported when discovery failed.
    pub fn down() -> Self {
        Self::default()
    }
}

/// Folds samples into an [`AggregateSnapshot`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    net_attribution: NetAttribution,
}

impl Aggregator {
    pub fn new(net_attribution: NetAttribution) -> Self {
        Self { net_attribution }
    }

    /// Sums `samples`, which are assumed to come from a successful discovery.
    pub fn aggregate(&self, samples: &[ProcessSample]) -> AggregateSnapshot {
        let mut snap = AggregateSnapshot {
            up: u8::from(!samples.is_empty()),
            processes: samples.len() as u64,
            ..Default::default()
        };

        for s in samples {
            snap.cpu_percent += s.cpu_percent;
            snap.vm_bytes += s.vm_bytes;
            snap.mem_percent += s.mem_percent;
            snap.io_read_count += s.io.read_count;
            snap.io_read_bytes += s.io.read_bytes;
            snap.io_write_count += s.io.write_count;
            snap.io_write_bytes += s.io.write_bytes;
            snap.open_files += s.open_files;
            snap.threads += s.threads;
        }

        let net = match self.net_attribution {
            // Every sample carries the same host-wide snapshot.
            NetAttribution::PerScrape => samples
                .iter()
                .find_map(|s| s.network)
                .unwrap_or_default(),
            NetAttribution::PerProcess => samples.iter().filter_map(|s| s.network).fold(
                NetCounters::default(),
                |acc, n| NetCounters {
                    bytes_sent: acc.bytes_sent + n.bytes_sent,
                    bytes_recv: acc.bytes_recv + n.bytes_recv,
                },
            ),
        };
        snap.net_bytes_sent = net.bytes_sent;
        snap.net_bytes_recv = net.bytes_recv;

        snap
    }
}
