use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;

use super::{DescTable, GaugeDesc, push_family};
use crate::collector::traits::CommandRunner;
use crate::status::VersionResolver;

const LABELS: [&str; 5] = ["version", "commitid", "sambaimage", "sambavers", "ctdbvers"];

/// Exposes `smb_metrics_status` with the exporter, image and Samba versions
/// as labels.
///
/// The value is 0 when every version resolved and 1 when any is unknown.
pub struct VersionsCollector<R: CommandRunner> {
    table: DescTable,
    resolver: VersionResolver<R>,
}

impl<R: CommandRunner> VersionsCollector<R> {
    pub fn new(resolver: VersionResolver<R>) -> prometheus::Result<Self> {
        let table = DescTable::new(vec![GaugeDesc::new(
            "metrics",
            "status",
            "Current metrics-exporter status versions",
            &LABELS,
        )?]);
        Ok(Self { table, resolver })
    }
}

impl<R: CommandRunner> Collector for VersionsCollector<R> {
    fn desc(&self) -> Vec<&Desc> {
        self.table.descs()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let versions = self.resolver.resolve();
        let status = if versions.is_complete() { 0.0 } else { 1.0 };
        let labels = vec![
            versions.version.as_str(),
            versions.commit_id.as_str(),
            versions.samba_image.as_str(),
            versions.samba_version.as_str(),
            versions.ctdb_version.as_str(),
        ];

        let gauge = self.table.get(0);
        let mut families = Vec::with_capacity(1);
        push_family(&mut families, gauge, gauge.family([(labels, status)]));
        families
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockCommand;
    use crate::exporter::testutil::{sample_count, value_of};

    fn label<'a>(family: &'a MetricFamily, name: &str) -> &'a str {
        family.get_metric()[0]
            .get_label()
            .iter()
            .find(|l| l.get_name() == name)
            .map(|l| l.get_value())
            .unwrap()
    }

    #[test]
    fn test_all_versions_known() {
        let resolver = VersionResolver::new(MockCommand::samba_server(), "smbd", "ctdb")
            .with_samba_image(Some("samba-server:v0.5".to_string()));
        let collector = VersionsCollector::new(resolver).unwrap();
        let families = collector.collect();

        assert_eq!(sample_count(&families), collector.desc().len());
        assert_eq!(value_of(&families, "smb_metrics_status"), 0.0);
        let family = &families[0];
        assert_eq!(label(family, "version"), crate::VERSION);
        assert_eq!(label(family, "sambaimage"), "samba-server:v0.5");
        assert_eq!(label(family, "sambavers"), "4.20.2");
        assert_eq!(label(family, "ctdbvers"), "4.20.2");
    }

    #[test]
    fn test_unknown_version_reports_one() {
        let resolver = VersionResolver::new(MockCommand::new(), "smbd", "ctdb");
        let collector = VersionsCollector::new(resolver).unwrap();
        let families = collector.collect();

        assert_eq!(sample_count(&families), 1);
        assert_eq!(value_of(&families, "smb_metrics_status"), 1.0);
        assert_eq!(label(&families[0], "sambavers"), "");
        assert_eq!(label(&families[0], "ctdbvers"), "");
    }

    #[test]
    fn test_desc_labels() {
        let resolver = VersionResolver::new(MockCommand::new(), "smbd", "ctdb");
        let collector = VersionsCollector::new(resolver).unwrap();
        let descs = collector.desc();
        assert_eq!(descs.len(), 1);
        assert_eq!(descs[0].fq_name, "smb_metrics_status");
        assert_eq!(descs[0].variable_labels, LABELS.to_vec());
    }
}
