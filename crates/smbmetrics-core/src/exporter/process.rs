use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;

use super::{DescTable, GaugeDesc, push_family};
use crate::collector::WorkerScanner;
use crate::collector::traits::{CommandRunner, FileSystem};
use crate::model::AggregateSnapshot;

/// Liveness and resource totals of the `smbd` workers.
///
/// One scan per collect; a failed discovery reports `smb_smbd_up_status` 0
/// with every other gauge at 0.
pub struct ProcessCollector<F: FileSystem, R: CommandRunner> {
    table: DescTable,
    scanner: WorkerScanner<F, R>,
}

impl<F: FileSystem, R: CommandRunner> ProcessCollector<F, R> {
    pub fn new(scanner: WorkerScanner<F, R>) -> prometheus::Result<Self> {
        let table = DescTable::new(vec![
            GaugeDesc::new("smbd_up", "status", "SMBD Status", &[])?,
            GaugeDesc::new(
                "netbytes",
                "sent",
                "Bytes sent over all network interfaces",
                &[],
            )?,
            GaugeDesc::new(
                "vmusagebytes",
                "total",
                "Virtual memory used by smbd workers in bytes",
                &[],
            )?,
            GaugeDesc::new(
                "netbytes",
                "recv",
                "Bytes received over all network interfaces",
                &[],
            )?,
            GaugeDesc::new(
                "ioreadcount",
                "total",
                "Read syscalls issued by smbd workers",
                &[],
            )?,
            GaugeDesc::new(
                "ioreadbytes",
                "total",
                "Bytes read from storage by smbd workers",
                &[],
            )?,
            GaugeDesc::new(
                "iowritecount",
                "total",
                "Write syscalls issued by smbd workers",
                &[],
            )?,
            GaugeDesc::new(
                "iowritebytes",
                "total",
                "Bytes written to storage by smbd workers",
                &[],
            )?,
        ]);
        Ok(Self { table, scanner })
    }
}

/// Gauge values in descriptor order.
fn values(snap: &AggregateSnapshot) -> [f64; 8] {
    [
        f64::from(snap.up),
        snap.net_bytes_sent as f64,
        snap.vm_bytes as f64,
        snap.net_bytes_recv as f64,
        snap.io_read_count as f64,
        snap.io_read_bytes as f64,
        snap.io_write_count as f64,
        snap.io_write_bytes as f64,
    ]
}

impl<F: FileSystem, R: CommandRunner> Collector for ProcessCollector<F, R> {
    fn desc(&self) -> Vec<&Desc> {
        self.table.descs()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let scan = self.scanner.scan();

        let mut families = Vec::with_capacity(self.table.len());
        for (gauge, value) in self.table.iter().zip(values(&scan.snapshot)) {
            push_family(&mut families, gauge, gauge.single(value));
        }
        families
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{MockCommand, MockFs};
    use crate::config::ExporterConfig;
    use crate::exporter::testutil::{sample_count, value_of};

    fn collector(fs: MockFs, runner: MockCommand) -> ProcessCollector<MockFs, MockCommand> {
        let scanner = WorkerScanner::from_config(fs, runner, &ExporterConfig::default());
        ProcessCollector::new(scanner).unwrap()
    }

    #[test]
    fn test_process_totals() {
        let collector = collector(MockFs::smbd_host(), MockCommand::samba_server());
        let families = collector.collect();

        assert_eq!(sample_count(&families), collector.desc().len());
        assert_eq!(value_of(&families, "smb_smbd_up_status"), 1.0);
        assert_eq!(value_of(&families, "smb_netbytes_sent"), 21000.0);
        assert_eq!(value_of(&families, "smb_netbytes_recv"), 51000.0);
        assert_eq!(value_of(&families, "smb_vmusagebytes_total"), 314_572_800.0);
        assert_eq!(value_of(&families, "smb_ioreadcount_total"), 150.0);
        assert_eq!(value_of(&families, "smb_ioreadbytes_total"), 4096.0);
        assert_eq!(value_of(&families, "smb_iowritecount_total"), 50.0);
        assert_eq!(value_of(&families, "smb_iowritebytes_total"), 12288.0);
    }

    #[test]
    fn test_family_order_matches_desc() {
        let collector = collector(MockFs::smbd_host(), MockCommand::samba_server());
        let families = collector.collect();
        let family_names: Vec<&str> = families.iter().map(|f| f.get_name()).collect();
        let descs = collector.desc();
        let desc_names: Vec<&str> = descs.iter().map(|d| d.fq_name.as_str()).collect();
        assert_eq!(family_names, desc_names);
        assert_eq!(desc_names[0], "smb_smbd_up_status");
        assert_eq!(desc_names[1], "smb_netbytes_sent");
        assert_eq!(desc_names[3], "smb_netbytes_recv");
    }

    #[test]
    fn test_discovery_failure_reports_down() {
        let collector = collector(MockFs::smbd_host(), MockCommand::new());
        let families = collector.collect();

        assert_eq!(sample_count(&families), 8);
        assert_eq!(value_of(&families, "smb_smbd_up_status"), 0.0);
        assert_eq!(value_of(&families, "smb_vmusagebytes_total"), 0.0);
        assert_eq!(value_of(&families, "smb_netbytes_sent"), 0.0);
    }

    #[test]
    fn test_empty_host_reports_down() {
        let collector = collector(MockFs::new(), MockCommand::samba_server());
        let families = collector.collect();
        assert_eq!(sample_count(&families), 8);
        assert_eq!(value_of(&families, "smb_smbd_up_status"), 0.0);
    }
}
