//! Prometheus collectors for the `smb_*` metrics.
//!
//! Each collector owns a [`DescTable`] built once in its constructor and
//! never modified. `desc()` returns it as-is; `collect()` builds fresh gauges
//! from it on every scrape, so collectors keep no state between scrapes and
//! can be collected concurrently without locking.
//!
//! | collector            | metrics                                               |
//! |----------------------|-------------------------------------------------------|
//! | [`VersionsCollector`] | `smb_metrics_status`                                 |
//! | [`ActivityCollector`] | `smb_sessions_total`, `smb_tcon_total`, `smb_users_total`, `smb_openfiles_total`, `smb_openfiles_access_rw` |
//! | [`SharesCollector`]   | `smb_share_activity`, `smb_share_byremote`           |
//! | [`ProcessCollector`]  | `smb_smbd_up_status`, `smb_netbytes_*`, `smb_vmusagebytes_total`, `smb_io*_total` |

mod activity;
mod process;
mod shares;
mod versions;

pub use activity::ActivityCollector;
pub use process::ProcessCollector;
pub use shares::SharesCollector;
pub use versions::VersionsCollector;

use std::collections::HashMap;
use std::sync::Arc;

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{GaugeVec, Opts, Registry};
use tracing::{error, info};

use crate::collector::WorkerScanner;
use crate::collector::traits::{CommandRunner, FileSystem};
use crate::config::ExporterConfig;
use crate::status::{SmbStatusSource, SmbstatusCommand, VersionResolver};

/// Metric namespace shared by every collector.
pub const NAMESPACE: &str = "smb";

/// Immutable description of one gauge.
#[derive(Debug, Clone)]
pub struct GaugeDesc {
    opts: Opts,
    label_names: Vec<&'static str>,
    desc: Desc,
}

impl GaugeDesc {
    /// Describes `smb_<subsystem>_<name>` with the given variable labels.
    pub fn new(
        subsystem: &str,
        name: &str,
        help: &str,
        label_names: &[&'static str],
    ) -> prometheus::Result<Self> {
        let opts = Opts::new(name, help)
            .namespace(NAMESPACE)
            .subsystem(subsystem);
        let desc = Desc::new(
            opts.fq_name(),
            help.to_string(),
            label_names.iter().map(|l| l.to_string()).collect(),
            HashMap::new(),
        )?;
        Ok(Self {
            opts,
            label_names: label_names.to_vec(),
            desc,
        })
    }

    pub fn fq_name(&self) -> &str {
        &self.desc.fq_name
    }

    pub fn desc(&self) -> &Desc {
        &self.desc
    }

    /// Builds a metric family with one gauge per `(label values, value)`.
    ///
    /// Returns `None` when `samples` is empty.
    pub fn family<'a, I>(&self, samples: I) -> prometheus::Result<Option<MetricFamily>>
    where
        I: IntoIterator<Item = (Vec<&'a str>, f64)>,
    {
        let vec = GaugeVec::new(self.opts.clone(), &self.label_names)?;
        let mut empty = true;
        for (values, value) in samples {
            vec.get_metric_with_label_values(&values)?.set(value);
            empty = false;
        }
        if empty {
            return Ok(None);
        }
        Ok(vec.collect().pop())
    }

    /// Builds a family holding a single unlabeled gauge.
    pub fn single(&self, value: f64) -> prometheus::Result<Option<MetricFamily>> {
        self.family([(Vec::<&str>::new(), value)])
    }
}

/// Fixed list of descriptors owned by one collector.
#[derive(Debug, Clone)]
pub struct DescTable {
    gauges: Vec<GaugeDesc>,
}

impl DescTable {
    pub fn new(gauges: Vec<GaugeDesc>) -> Self {
        Self { gauges }
    }

    pub fn descs(&self) -> Vec<&Desc> {
        self.gauges.iter().map(GaugeDesc::desc).collect()
    }

    pub fn len(&self) -> usize {
        self.gauges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gauges.is_empty()
    }

    pub fn get(&self, idx: usize) -> &GaugeDesc {
        &self.gauges[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &GaugeDesc> {
        self.gauges.iter()
    }
}

/// Appends a built family, logging instead of failing the whole collect.
pub(crate) fn push_family(
    families: &mut Vec<MetricFamily>,
    gauge: &GaugeDesc,
    built: prometheus::Result<Option<MetricFamily>>,
) {
    match built {
        Ok(Some(family)) => families.push(family),
        Ok(None) => {}
        Err(e) => error!(metric = gauge.fq_name(), error = %e, "failed to build metric"),
    }
}

/// Registers the versions, activity, shares and process collectors.
pub fn register_collectors<F, R>(
    registry: &Registry,
    fs: F,
    runner: R,
    config: &ExporterConfig,
) -> prometheus::Result<()>
where
    F: FileSystem + 'static,
    R: CommandRunner + Clone + 'static,
{
    let status: Arc<dyn SmbStatusSource> = Arc::new(SmbstatusCommand::new(
        runner.clone(),
        &config.smbstatus_path,
    ));
    let resolver = VersionResolver::new(runner.clone(), &config.smbd_path, &config.ctdb_path)
        .with_samba_image(config.samba_image.clone());

    let collectors: Vec<Box<dyn Collector>> = vec![
        Box::new(VersionsCollector::new(resolver)?),
        Box::new(ActivityCollector::new(status.clone())?),
        Box::new(SharesCollector::new(status)?),
        Box::new(ProcessCollector::new(WorkerScanner::from_config(
            fs, runner, config,
        ))?),
    ];

    let count = collectors.len();
    for collector in collectors {
        if let Err(e) = registry.register(collector) {
            error!(error = %e, "failed to register collector");
            return Err(e);
        }
    }
    info!(count, "registered collectors");
    Ok(())
}

#[cfg(test)]
pub(crate) mod testutil {
    use prometheus::proto::MetricFamily;

    /// Total number of samples across families.
    pub fn sample_count(families: &[MetricFamily]) -> usize {
        families.iter().map(|f| f.get_metric().len()).sum()
    }

    /// Value of the single sample of family `name`.
    pub fn value_of(families: &[MetricFamily], name: &str) -> f64 {
        let family = families
            .iter()
            .find(|f| f.get_name() == name)
            .unwrap_or_else(|| panic!("no family {}", name));
        assert_eq!(family.get_metric().len(), 1, "{} has several samples", name);
        family.get_metric()[0].get_gauge().get_value()
    }

    /// `(label value, gauge value)` pairs of a family with one label.
    pub fn labeled_values(families: &[MetricFamily], name: &str) -> Vec<(String, f64)> {
        let mut values: Vec<(String, f64)> = families
            .iter()
            .filter(|f| f.get_name() == name)
            .flat_map(|f| f.get_metric())
            .map(|m| {
                (
                    m.get_label()[0].get_value().to_string(),
                    m.get_gauge().get_value(),
                )
            })
            .collect();
        values.sort_by(|a, b| a.0.cmp(&b.0));
        values
    }
}
