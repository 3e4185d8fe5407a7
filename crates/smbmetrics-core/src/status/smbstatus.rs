//! `smbstatus --json` decoding and derived session/share counts.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Deserialize;

use super::{SmbStatusSource, StatusError};
use crate::collector::traits::CommandRunner;

/// Output of `smbstatus --json`, reduced to the fields the exporter uses.
///
/// Sections Samba omits when empty decode as empty maps.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SmbStatus {
    /// Samba version reported by `smbstatus`.
    #[serde(default)]
    pub version: String,
    /// Sessions keyed by session id.
    #[serde(default)]
    pub sessions: BTreeMap<String, Session>,
    /// Tree connections keyed by tcon id.
    #[serde(default)]
    pub tcons: BTreeMap<String, TreeConnection>,
    /// Open files keyed by path.
    #[serde(default)]
    pub open_files: BTreeMap<String, OpenFile>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Session {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub remote_machine: String,
    #[serde(default)]
    pub session_dialect: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TreeConnection {
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub machine: String,
    #[serde(default)]
    pub session_id: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct OpenFile {
    #[serde(default)]
    pub service_path: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub opens: BTreeMap<String, FileOpen>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct FileOpen {
    #[serde(default)]
    pub access_mask: AccessMask,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
pub struct AccessMask {
    #[serde(rename = "READ_DATA", default)]
    pub read_data: bool,
    #[serde(rename = "WRITE_DATA", default)]
    pub write_data: bool,
}

impl AccessMask {
    pub fn is_read_write(&self) -> bool {
        self.read_data && self.write_data
    }
}

impl SmbStatus {
    /// Decodes `smbstatus --json` output.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn total_sessions(&self) -> usize {
        self.sessions.len()
    }

    pub fn total_tree_connections(&self) -> usize {
        self.tcons.len()
    }

    /// Distinct user names across all sessions.
    pub fn total_connected_users(&self) -> usize {
        self.sessions
            .values()
            .map(|s| s.username.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn total_open_files(&self) -> usize {
        self.open_files.len()
    }

    /// Open files with at least one open holding both read and write access.
    pub fn total_open_files_access_rw(&self) -> usize {
        self.open_files
            .values()
            .filter(|f| f.opens.values().any(|o| o.access_mask.is_read_write()))
            .count()
    }

    /// Each share to the distinct remote machines connected to it.
    pub fn service_to_machines(&self) -> BTreeMap<String, BTreeSet<String>> {
        let mut map: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for tcon in self.tcons.values() {
            map.entry(tcon.service.clone())
                .or_default()
                .insert(tcon.machine.clone());
        }
        map
    }

    /// Each remote machine to the distinct shares it is connected to.
    pub fn machine_to_services(&self) -> BTreeMap<String, BTreeSet<String>> {
        let mut map: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for tcon in self.tcons.values() {
            map.entry(tcon.machine.clone())
                .or_default()
                .insert(tcon.service.clone());
        }
        map
    }
}

/// Status source that runs `smbstatus --json` on every call.
pub struct SmbstatusCommand<R: CommandRunner> {
    runner: R,
    program: String,
}

impl<R: CommandRunner> SmbstatusCommand<R> {
    pub fn new(runner: R, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }
}

impl<R: CommandRunner> SmbStatusSource for SmbstatusCommand<R> {
    fn status(&self) -> Result<SmbStatus, StatusError> {
        let out = self
            .runner
            .run(&self.program, &["--json"])
            .map_err(|source| StatusError::Unavailable {
                program: self.program.clone(),
                source,
            })?;

        if !out.is_success() {
            return Err(StatusError::Failed {
                program: self.program.clone(),
                code: out.code,
                stderr: out.stderr,
            });
        }

        Ok(SmbStatus::from_json(&out.stdout)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockCommand;
    use crate::collector::mock::scenarios::SMBSTATUS_JSON;
    use crate::collector::traits::CommandOutput;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_decode_totals() {
        let status = SmbStatus::from_json(SMBSTATUS_JSON).unwrap();

        assert_eq!(status.version, "4.20.2");
        assert_eq!(status.total_sessions(), 2);
        assert_eq!(status.total_tree_connections(), 3);
        assert_eq!(status.total_connected_users(), 2);
        assert_eq!(status.total_open_files(), 2);
        assert_eq!(status.total_open_files_access_rw(), 1);
    }

    #[test]
    fn test_service_and_machine_maps() {
        let status = SmbStatus::from_json(SMBSTATUS_JSON).unwrap();

        let by_service = status.service_to_machines();
        assert_eq!(by_service.len(), 2);
        assert_eq!(by_service["public"], set(&["10.0.0.5", "10.0.0.6"]));
        assert_eq!(by_service["home"], set(&["10.0.0.5"]));

        let by_machine = status.machine_to_services();
        assert_eq!(by_machine.len(), 2);
        assert_eq!(by_machine["10.0.0.5"], set(&["home", "public"]));
        assert_eq!(by_machine["10.0.0.6"], set(&["public"]));
    }

    #[test]
    fn test_same_user_twice_counts_once() {
        let json = r#"{
            "sessions": {
                "1": { "username": "alice", "remote_machine": "a" },
                "2": { "username": "alice", "remote_machine": "b" }
            }
        }"#;
        let status = SmbStatus::from_json(json).unwrap();
        assert_eq!(status.total_sessions(), 2);
        assert_eq!(status.total_connected_users(), 1);
    }

    #[test]
    fn test_idle_server_has_empty_sections() {
        let status = SmbStatus::from_json(r#"{"timestamp": "x", "version": "4.19.5"}"#).unwrap();
        assert_eq!(status.total_sessions(), 0);
        assert!(status.service_to_machines().is_empty());
    }

    #[test]
    fn test_command_source() {
        let source = SmbstatusCommand::new(MockCommand::samba_server(), "smbstatus");
        assert_eq!(source.status().unwrap().total_tree_connections(), 3);
    }

    #[test]
    fn test_command_source_failure() {
        let runner = MockCommand::new().with_output(
            "smbstatus",
            CommandOutput::failure(255, "Failed to open connections.tdb"),
        );
        let err = SmbstatusCommand::new(runner, "smbstatus").status().unwrap_err();
        assert!(matches!(err, StatusError::Failed { code: Some(255), .. }));
    }

    #[test]
    fn test_command_source_bad_json() {
        let runner = MockCommand::new().with_stdout("smbstatus", "Samba version 4.20.2\n");
        let err = SmbstatusCommand::new(runner, "smbstatus").status().unwrap_err();
        assert!(matches!(err, StatusError::Json(_)));
    }

    #[test]
    fn test_command_source_missing_tool() {
        let err = SmbstatusCommand::new(MockCommand::new(), "smbstatus")
            .status()
            .unwrap_err();
        assert!(matches!(err, StatusError::Unavailable { .. }));
    }
}
