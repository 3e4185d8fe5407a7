//! Build and runtime version identity for the `smb_metrics_status` gauge.

use tracing::debug;

use crate::collector::traits::CommandRunner;

/// Version labels reported by the exporter. Unknown values are empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Versions {
    pub version: String,
    pub commit_id: String,
    pub samba_image: String,
    pub samba_version: String,
    pub ctdb_version: String,
}

impl Versions {
    /// True when every label has a value.
    pub fn is_complete(&self) -> bool {
        [
            &self.version,
            &self.commit_id,
            &self.samba_image,
            &self.samba_version,
            &self.ctdb_version,
        ]
        .iter()
        .all(|v| !v.is_empty())
    }
}

/// Collects version identity on demand.
pub struct VersionResolver<R: CommandRunner> {
    runner: R,
    smbd: String,
    ctdb: String,
    samba_image: Option<String>,
}

impl<R: CommandRunner> VersionResolver<R> {
    pub fn new(runner: R, smbd: impl Into<String>, ctdb: impl Into<String>) -> Self {
        Self {
            runner,
            smbd: smbd.into(),
            ctdb: ctdb.into(),
            samba_image: None,
        }
    }

    pub fn with_samba_image(mut self, image: Option<String>) -> Self {
        self.samba_image = image.filter(|i| !i.trim().is_empty());
        self
    }

    /// Resolves all versions. Tools that fail leave their label empty.
    pub fn resolve(&self) -> Versions {
        Versions {
            version: crate::VERSION.to_string(),
            commit_id: crate::COMMIT_ID.to_string(),
            samba_image: self.samba_image.clone().unwrap_or_default(),
            samba_version: self
                .tool_output(&self.smbd, &["--version"])
                .map(|out| parse_smbd_version(&out))
                .unwrap_or_default(),
            ctdb_version: self
                .tool_output(&self.ctdb, &["version"])
                .map(|out| out.trim().to_string())
                .unwrap_or_default(),
        }
    }

    fn tool_output(&self, program: &str, args: &[&str]) -> Option<String> {
        match self.runner.run(program, args) {
            Ok(out) if out.is_success() => Some(out.stdout),
            Ok(out) => {
                debug!(program, code = ?out.code, stderr = out.stderr.trim(), "version query failed");
                None
            }
            Err(error) => {
                debug!(program, %error, "version query failed");
                None
            }
        }
    }
}

/// Extracts `4.20.2` from `smbd --version` output (`Version 4.20.2`).
fn parse_smbd_version(output: &str) -> String {
    let line = output.lines().next().unwrap_or("").trim();
    line.strip_prefix("Version")
        .unwrap_or(line)
        .trim()
        .to_string()
}
