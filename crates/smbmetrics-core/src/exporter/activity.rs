use std::sync::Arc;

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use tracing::warn;

use super::{DescTable, GaugeDesc, push_family};
use crate::status::{SmbStatus, SmbStatusSource};

/// Session, tree-connection, user and open-file totals.
///
/// When `smbstatus` fails every gauge is reported as 0.
pub struct ActivityCollector {
    table: DescTable,
    source: Arc<dyn SmbStatusSource>,
}

impl ActivityCollector {
    pub fn new(source: Arc<dyn SmbStatusSource>) -> prometheus::Result<Self> {
        let table = DescTable::new(vec![
            GaugeDesc::new("sessions", "total", "Number of currently active SMB sessions", &[])?,
            GaugeDesc::new("tcon", "total", "Number of currently active SMB tree-connections", &[])?,
            GaugeDesc::new("users", "total", "Number of currently active SMB users", &[])?,
            GaugeDesc::new("openfiles", "total", "Number of currently open files", &[])?,
            GaugeDesc::new(
                "openfiles",
                "access_rw",
                "Number of open files with read-write access mode",
                &[],
            )?,
        ]);
        Ok(Self { table, source })
    }
}

fn totals(status: &SmbStatus) -> [usize; 5] {
    [
        status.total_sessions(),
        status.total_tree_connections(),
        status.total_connected_users(),
        status.total_open_files(),
        status.total_open_files_access_rw(),
    ]
}

impl Collector for ActivityCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.table.descs()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let values = match self.source.status() {
            Ok(status) => totals(&status),
            Err(e) => {
                warn!(error = %e, "smbstatus failed, reporting zero activity");
                [0; 5]
            }
        };

        let mut families = Vec::with_capacity(self.table.len());
        for (gauge, value) in self.table.iter().zip(values) {
            push_family(&mut families, gauge, gauge.single(value as f64));
        }
        families
    }
}
