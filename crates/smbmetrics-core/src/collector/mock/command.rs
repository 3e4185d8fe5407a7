//! Scripted command runner for testing discovery and `smbstatus` parsing.

use crate::collector::traits::{CommandOutput, CommandRunner};
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
enum Scripted {
    Output(CommandOutput),
    SpawnError(io::ErrorKind),
}

/// Command runner that answers from a table keyed by program name.
///
/// Programs without an entry fail to spawn with `NotFound`, like a missing
/// binary would. Every invocation is recorded for later assertions.
#[derive(Debug, Clone, Default)]
pub struct MockCommand {
    scripts: HashMap<String, Scripted>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockCommand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts `program` to exit with `output`.
    pub fn with_output(mut self, program: &str, output: CommandOutput) -> Self {
        self.scripts
            .insert(program.to_string(), Scripted::Output(output));
        self
    }

    /// Scripts `program` to exit 0 with `stdout`.
    pub fn with_stdout(self, program: &str, stdout: &str) -> Self {
        self.with_output(program, CommandOutput::success(stdout))
    }

    /// Scripts `program` to fail before it runs.
    pub fn with_spawn_error(mut self, program: &str, kind: io::ErrorKind) -> Self {
        self.scripts
            .insert(program.to_string(), Scripted::SpawnError(kind));
        self
    }

    /// Command lines run so far, formatted as `program arg1 arg2`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl CommandRunner for MockCommand {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            let mut line = program.to_string();
            for arg in args {
                line.push(' ');
                line.push_str(arg);
            }
            calls.push(line);
        }

        match self.scripts.get(program) {
            Some(Scripted::Output(out)) => Ok(out.clone()),
            Some(Scripted::SpawnError(kind)) => {
                Err(io::Error::new(*kind, format!("cannot run {program}")))
            }
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{program}: command not found"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_command_scripted_output() {
        let runner = MockCommand::new().with_stdout("pgrep", "1\n2\n");
        let out = runner.run("pgrep", &["smbd"]).unwrap();
        assert!(out.is_success());
        assert_eq!(out.stdout, "1\n2\n");
        assert_eq!(runner.calls(), vec!["pgrep smbd".to_string()]);
    }

    #[test]
    fn test_mock_command_unknown_program() {
        let runner = MockCommand::new();
        let err = runner.run("ctdb", &["version"]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_mock_command_spawn_error() {
        let runner =
            MockCommand::new().with_spawn_error("smbstatus", io::ErrorKind::PermissionDenied);
        let err = runner.run("smbstatus", &["--json"]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }
}
