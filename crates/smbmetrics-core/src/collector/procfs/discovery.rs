//! Worker discovery through `pgrep`.

use crate::collector::procfs::parser::{ParseError, parse_pid_list};
use crate::collector::traits::CommandRunner;
use std::io;

/// `pgrep` exit status when nothing matched.
const PGREP_NO_MATCH: i32 = 1;

/// Error type for discovery failures. Any variant makes the scrape report
/// the worker service as down.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The lookup tool could not be started.
    Unavailable { program: String, source: io::Error },
    /// The lookup tool ran but reported an error.
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
    /// The lookup output contained a token that is not a PID.
    Parse(ParseError),
}

impl std::fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscoveryError::Unavailable { program, source } => {
                write!(f, "cannot run {}: {}", program, source)
            }
            DiscoveryError::Failed {
                program,
                code: Some(code),
                stderr,
            } => write!(f, "{} exited with {}: {}", program, code, stderr.trim()),
            DiscoveryError::Failed { program, .. } => {
                write!(f, "{} was terminated by a signal", program)
            }
            DiscoveryError::Parse(e) => write!(f, "bad process list: {}", e),
        }
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DiscoveryError::Unavailable { source, .. } => Some(source),
            DiscoveryError::Parse(e) => Some(e),
            DiscoveryError::Failed { .. } => None,
        }
    }
}

impl From<ParseError> for DiscoveryError {
    fn from(e: ParseError) -> Self {
        DiscoveryError::Parse(e)
    }
}

/// Finds the PIDs of running worker processes by name.
pub struct ProcessDiscovery<R: CommandRunner> {
    runner: R,
    pgrep: String,
    process_name: String,
}

impl<R: CommandRunner> ProcessDiscovery<R> {
    /// Creates a discovery for processes called `process_name`, using the
    /// `pgrep` found on `PATH`.
    pub fn new(runner: R, process_name: impl Into<String>) -> Self {
        Self {
            runner,
            pgrep: "pgrep".to_string(),
            process_name: process_name.into(),
        }
    }

    /// Uses a specific `pgrep` binary.
    pub fn with_pgrep(mut self, pgrep: impl Into<String>) -> Self {
        self.pgrep = pgrep.into();
        self
    }

    pub fn process_name(&self) -> &str {
        &self.process_name
    }

    /// Lists the PIDs of all matching processes, in `pgrep` order.
    ///
    /// Runs a fresh lookup on every call. No matches is an empty list, not
    /// an error.
    pub fn list_worker_pids(&self) -> Result<Vec<u32>, DiscoveryError> {
        let out = self
            .runner
            .run(&self.pgrep, &[&self.process_name])
            .map_err(|source| DiscoveryError::Unavailable {
                program: self.pgrep.clone(),
                source,
            })?;

        match out.code {
            Some(0) => Ok(parse_pid_list(&out.stdout)?),
            Some(PGREP_NO_MATCH) if out.stdout.trim().is_empty() => Ok(Vec::new()),
            code => Err(DiscoveryError::Failed {
                program: self.pgrep.clone(),
                code,
                stderr: out.stderr,
            }),
        }
    }
}
