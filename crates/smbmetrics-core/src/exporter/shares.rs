use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use tracing::warn;

use super::{DescTable, GaugeDesc, push_family};
use crate::status::SmbStatusSource;

/// Per-share and per-client connection counts.
///
/// `smb_share_activity{service}` counts distinct remote machines connected to
/// each share; `smb_share_byremote{machine}` counts distinct shares each
/// machine is connected to. Nothing is emitted when `smbstatus` fails.
pub struct SharesCollector {
    table: DescTable,
    source: Arc<dyn SmbStatusSource>,
}

impl SharesCollector {
    pub fn new(source: Arc<dyn SmbStatusSource>) -> prometheus::Result<Self> {
        let table = DescTable::new(vec![
            GaugeDesc::new(
                "share",
                "activity",
                "Number of remote machines currently using a share",
                &["service"],
            )?,
            GaugeDesc::new(
                "share",
                "byremote",
                "Number of shares served for remote machine",
                &["machine"],
            )?,
        ]);
        Ok(Self { table, source })
    }
}

fn counts(map: &BTreeMap<String, BTreeSet<String>>) -> Vec<(Vec<&str>, f64)> {
    map.iter()
        .map(|(key, set)| (vec![key.as_str()], set.len() as f64))
        .collect()
}

impl Collector for SharesCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.table.descs()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let status = match self.source.status() {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "smbstatus failed, skipping share metrics");
                return Vec::new();
            }
        };

        let by_service = status.service_to_machines();
        let by_machine = status.machine_to_services();

        let mut families = Vec::with_capacity(2);
        let activity = self.table.get(0);
        push_family(&mut families, activity, activity.family(counts(&by_service)));
        let byremote = self.table.get(1);
        push_family(&mut families, byremote, byremote.family(counts(&by_machine)));
        families
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockCommand;
    use crate::exporter::testutil::{labeled_values, sample_count};
    use crate::status::SmbstatusCommand;

    fn collector(runner: MockCommand) -> SharesCollector {
        SharesCollector::new(Arc::new(SmbstatusCommand::new(runner, "smbstatus"))).unwrap()
    }

    #[test]
    fn test_one_sample_per_share_and_machine() {
        let families = collector(MockCommand::samba_server()).collect();

        assert_eq!(sample_count(&families), 4);
        assert_eq!(
            labeled_values(&families, "smb_share_activity"),
            vec![("home".to_string(), 1.0), ("public".to_string(), 2.0)]
        );
        assert_eq!(
            labeled_values(&families, "smb_share_byremote"),
            vec![("10.0.0.5".to_string(), 2.0), ("10.0.0.6".to_string(), 1.0)]
        );
    }

    #[test]
    fn test_label_names() {
        let families = collector(MockCommand::samba_server()).collect();
        let activity = families
            .iter()
            .find(|f| f.get_name() == "smb_share_activity")
            .unwrap();
        assert_eq!(activity.get_metric()[0].get_label()[0].get_name(), "service");
        let byremote = families
            .iter()
            .find(|f| f.get_name() == "smb_share_byremote")
            .unwrap();
        assert_eq!(byremote.get_metric()[0].get_label()[0].get_name(), "machine");
    }

    #[test]
    fn test_idle_server_emits_nothing() {
        let runner = MockCommand::new().with_stdout("smbstatus", r#"{"version": "4.20.2"}"#);
        assert!(collector(runner).collect().is_empty());
    }

    #[test]
    fn test_smbstatus_failure_emits_nothing() {
        let c = collector(MockCommand::new());
        assert!(c.collect().is_empty());
        assert_eq!(c.desc().len(), 2);
    }
}
