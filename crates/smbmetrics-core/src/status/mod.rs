//! Samba status information: sessions, shares, open files and versions.

mod smbstatus;
mod versions;

pub use smbstatus::{
    AccessMask, FileOpen, OpenFile, Session, SmbStatus, SmbstatusCommand, TreeConnection,
};
pub use versions::{VersionResolver, Versions};

use std::io;

/// Error type for status collection failures.
#[derive(Debug)]
pub enum StatusError {
    /// The status tool could not be started.
    Unavailable { program: String, source: io::Error },
    /// The status tool ran but reported an error.
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
    /// The status tool printed something that is not the expected JSON.
    Json(serde_json::Error),
}

impl std::fmt::Display for StatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusError::Unavailable { program, source } => {
                write!(f, "cannot run {}: {}", program, source)
            }
            StatusError::Failed {
                program,
                code,
                stderr,
            } => write!(f, "{} failed ({:?}): {}", program, code, stderr.trim()),
            StatusError::Json(e) => write!(f, "invalid status JSON: {}", e),
        }
    }
}

impl std::error::Error for StatusError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StatusError::Unavailable { source, .. } => Some(source),
            StatusError::Json(e) => Some(e),
            StatusError::Failed { .. } => None,
        }
    }
}

impl From<serde_json::Error> for StatusError {
    fn from(e: serde_json::Error) -> Self {
        StatusError::Json(e)
    }
}

/// Source of live session/share information.
///
/// Called once per collect by each collector that needs it; implementations
/// must not cache between calls.
pub trait SmbStatusSource: Send + Sync {
    fn status(&self) -> Result<SmbStatus, StatusError>;
}
