//! Host-wide values read once per scrape.

use crate::collector::procfs::parser::{parse_meminfo, parse_net_dev, parse_uptime};
use crate::collector::traits::FileSystem;
use crate::model::NetCounters;
use std::path::Path;
use tracing::debug;

/// Host state shared by every sample of one scrape.
///
/// A value that could not be read is `None`; the derived per-process
/// figures then fall back to zero instead of failing the sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemContext {
    /// Seconds since boot.
    pub uptime_secs: Option<f64>,
    /// Total physical memory in bytes.
    pub mem_total_bytes: Option<u64>,
    pub network: Option<NetCounters>,
}

impl SystemContext {
    /// Reads `uptime`, `meminfo` and `net/dev` under `proc_path`.
    pub fn read<F: FileSystem>(fs: &F, proc_path: &str) -> Self {
        let uptime_secs = read_with(fs, proc_path, "uptime", parse_uptime);
        let mem_total_bytes = read_with(fs, proc_path, "meminfo", |c| {
            parse_meminfo(c).map(|m| m.mem_total * 1024)
        });
        let network = read_with(fs, proc_path, "net/dev", |c| {
            parse_net_dev(c).map(|devices| NetCounters {
                bytes_sent: devices.iter().map(|d| d.tx_bytes).sum(),
                bytes_recv: devices.iter().map(|d| d.rx_bytes).sum(),
            })
        });

        Self {
            uptime_secs,
            mem_total_bytes,
            network,
        }
    }
}

fn read_with<F, T, P>(fs: &F, proc_path: &str, file: &str, parse: P) -> Option<T>
where
    F: FileSystem,
    P: FnOnce(&str) -> Result<T, super::parser::ParseError>,
{
    let path = format!("{}/{}", proc_path, file);
    match fs.read_to_string(Path::new(&path)) {
        Ok(content) => match parse(&content) {
            Ok(v) => Some(v),
            Err(e) => {
                debug!(path = %path, error = %e, "ignoring malformed file");
                None
            }
        },
        Err(e) => {
            debug!(path = %path, error = %e, "cannot read");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    #[test]
    fn test_read_system_context() {
        let fs = MockFs::smbd_host();
        let ctx = SystemContext::read(&fs, "/proc");

        assert_eq!(ctx.uptime_secs, Some(10000.0));
        assert_eq!(ctx.mem_total_bytes, Some(8_192_000_000));
        assert_eq!(
            ctx.network,
            Some(NetCounters {
                bytes_sent: 21000,
                bytes_recv: 51000,
            })
        );
    }

    #[test]
    fn test_missing_files_yield_none() {
        let fs = MockFs::new();
        let ctx = SystemContext::read(&fs, "/proc");
        assert_eq!(ctx, SystemContext::default());
    }

    #[test]
    fn test_malformed_net_dev_yields_none() {
        let mut fs = MockFs::smbd_host();
        fs.add_file("/proc/net/dev", "  eth0 garbage\n");
        let ctx = SystemContext::read(&fs, "/proc");
        assert!(ctx.network.is_none());
        assert!(ctx.uptime_secs.is_some());
    }
}
