//! Per-process resource snapshot for one `smbd` worker.
//!
//! Samples are built fresh on every scrape and dropped once folded into an
//! [`AggregateSnapshot`](super::AggregateSnapshot).

/// Cumulative I/O counters since process start. Source: `/proc/[pid]/io`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoCounters {
    /// Read syscalls (`syscr`).
    pub read_count: u64,
    /// Bytes read from storage (`read_bytes`).
    pub read_bytes: u64,
    /// Write syscalls (`syscw`).
    pub write_count: u64,
    /// Bytes written to storage (`write_bytes`).
    pub write_bytes: u64,
}

/// System-wide network byte totals across all interfaces.
/// Source: `/proc/net/dev`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetCounters {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
}

/// One worker's resource usage at scrape time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessSample {
    pub pid: u32,
    /// Average CPU usage since process start, in percent of one CPU.
    ///
    /// Derived from cumulative CPU ticks over process lifetime, so it is an
    /// approximation rather than a rate over the scrape interval.
    pub cpu_percent: f64,
    /// Virtual memory size in bytes.
    pub vm_bytes: u64,
    /// Resident memory as a percentage of `MemTotal`.
    pub mem_percent: f64,
    /// Zero when `/proc/[pid]/io` could not be read.
    pub io: IoCounters,
    /// Host-wide network snapshot, identical for every sample of a scrape.
    /// `None` when `/proc/net/dev` was unreadable.
    pub network: Option<NetCounters>,
    pub open_files: u64,
    pub threads: u64,
}

impl ProcessSample {
    pub fn has_network_counters(&self) -> bool {
        self.network.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sample_has_no_network_counters() {
        let sample = ProcessSample::default();
        assert!(!sample.has_network_counters());
        assert_eq!(sample.io, IoCounters::default());
    }

    #[test]
    fn test_sample_with_network_counters() {
        let sample = ProcessSample {
            pid: 10,
            network: Some(NetCounters {
                bytes_sent: 1,
                bytes_recv: 2,
            }),
            ..Default::default()
        };
        assert!(sample.has_network_counters());
    }
}
