//! Exporter configuration.
//!
//! The daemon fills [`ExporterConfig`] from command-line flags and
//! environment variables; tests use [`ExporterConfig::default`].

use std::fmt;
use std::str::FromStr;

/// How the host-wide network snapshot enters the process aggregate.
///
/// `/proc/net/dev` is not per-process, so every sample of a scrape carries
/// the same numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NetAttribution {
    /// Count the snapshot once per scrape, whatever the worker count.
    #[default]
    PerScrape,
    /// Sum the snapshot over every sample. Reproduces the values of older
    /// exporters, which scale with the number of workers.
    PerProcess,
}

impl FromStr for NetAttribution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per-scrape" => Ok(Self::PerScrape),
            "per-process" => Ok(Self::PerProcess),
            other => Err(format!(
                "unknown network attribution '{}' (expected per-scrape or per-process)",
                other
            )),
        }
    }
}

impl fmt::Display for NetAttribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PerScrape => "per-scrape",
            Self::PerProcess => "per-process",
        })
    }
}

/// Settings shared by all collectors.
#[derive(Debug, Clone, PartialEq)]
pub struct ExporterConfig {
    /// Worker process name passed to `pgrep`.
    pub process_name: String,
    /// Mount point of the proc filesystem.
    pub proc_path: String,
    pub pgrep_path: String,
    pub smbstatus_path: String,
    pub smbd_path: String,
    pub ctdb_path: String,
    /// Container image running Samba, reported as the `sambaimage` label.
    pub samba_image: Option<String>,
    pub net_attribution: NetAttribution,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            process_name: "smbd".to_string(),
            proc_path: "/proc".to_string(),
            pgrep_path: "pgrep".to_string(),
            smbstatus_path: "smbstatus".to_string(),
            smbd_path: "smbd".to_string(),
            ctdb_path: "ctdb".to_string(),
            samba_image: None,
            net_attribution: NetAttribution::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_net_attribution_round_trip_names() {
        for mode in [NetAttribution::PerScrape, NetAttribution::PerProcess] {
            assert_eq!(mode.to_string().parse::<NetAttribution>().unwrap(), mode);
        }
        assert_eq!(
            " Per-Process ".parse::<NetAttribution>().unwrap(),
            NetAttribution::PerProcess
        );
    }

    #[test]
    fn test_net_attribution_rejects_unknown() {
        let err = "per-host".parse::<NetAttribution>().unwrap_err();
        assert!(err.contains("per-host"));
    }

    #[test]
    fn test_default_config_targets_smbd() {
        let config = ExporterConfig::default();
        assert_eq!(config.process_name, "smbd");
        assert_eq!(config.proc_path, "/proc");
        assert_eq!(config.net_attribution, NetAttribution::PerScrape);
    }
}
