//! Per-process resource reader for `/proc/[pid]/`.

use crate::collector::procfs::parser::{parse_proc_io, parse_proc_stat};
use crate::collector::procfs::system::SystemContext;
use crate::collector::traits::FileSystem;
use crate::model::{IoCounters, ProcessSample};
use std::path::Path;
use tracing::{debug, warn};

/// Clock ticks per second (USER_HZ). Standard value for Linux.
const CLK_TCK: u64 = 100;

/// Error type for a single process that could not be read.
#[derive(Debug)]
pub enum ReadError {
    /// Process disappeared during collection.
    ProcessGone(u32),
    /// I/O error reading a required process file.
    Io { pid: u32, source: std::io::Error },
    /// Parse error in a required process file.
    Parse { pid: u32, message: String },
}

impl ReadError {
    pub fn pid(&self) -> u32 {
        match self {
            ReadError::ProcessGone(pid) => *pid,
            ReadError::Io { pid, .. } | ReadError::Parse { pid, .. } => *pid,
        }
    }
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadError::ProcessGone(pid) => write!(f, "process {} disappeared", pid),
            ReadError::Io { pid, source } => write!(f, "process {}: I/O error: {}", pid, source),
            ReadError::Parse { pid, message } => {
                write!(f, "process {}: parse error: {}", pid, message)
            }
        }
    }
}

impl std::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReadError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Reads CPU, memory, I/O, open-file and thread figures for one process.
pub struct ProcessStatReader<F: FileSystem> {
    fs: F,
    proc_path: String,
    page_size: u64,
}

impl<F: FileSystem> ProcessStatReader<F> {
    /// Creates a new reader.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
            page_size: 4096,
        }
    }

    /// Reads the host-wide values shared by all samples of one scrape.
    pub fn system_context(&self) -> SystemContext {
        SystemContext::read(&self.fs, &self.proc_path)
    }

    /// Reads one process.
    ///
    /// `stat` and the `fd` directory are required; a missing or unreadable
    /// `io` file (typically a permission problem) yields zero I/O counters.
    pub fn read_sample(&self, pid: u32, ctx: &SystemContext) -> Result<ProcessSample, ReadError> {
        let proc_dir = format!("{}/{}", self.proc_path, pid);

        let stat_path = format!("{}/stat", proc_dir);
        let stat_content = self
            .fs
            .read_to_string(Path::new(&stat_path))
            .map_err(|_| ReadError::ProcessGone(pid))?;
        let stat = parse_proc_stat(&stat_content).map_err(|e| ReadError::Parse {
            pid,
            message: e.message,
        })?;

        let fd_path = format!("{}/fd", proc_dir);
        let open_files = match self.fs.read_dir(Path::new(&fd_path)) {
            Ok(entries) => entries.len() as u64,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ReadError::ProcessGone(pid));
            }
            Err(source) => return Err(ReadError::Io { pid, source }),
        };

        let io_path = format!("{}/io", proc_dir);
        let io = match self
            .fs
            .read_to_string(Path::new(&io_path))
            .map_err(|e| e.to_string())
            .and_then(|content| parse_proc_io(&content).map_err(|e| e.message))
        {
            Ok(io) => IoCounters {
                read_count: io.syscr,
                read_bytes: io.read_bytes,
                write_count: io.syscw,
                write_bytes: io.write_bytes,
            },
            Err(error) => {
                debug!(pid, %error, "io counters unavailable, using zero");
                IoCounters::default()
            }
        };

        let rss_bytes = (stat.rss.max(0) as u64) * self.page_size;

        Ok(ProcessSample {
            pid,
            cpu_percent: cpu_percent(stat.utime + stat.stime, stat.starttime, ctx.uptime_secs),
            vm_bytes: stat.vsize,
            mem_percent: ctx
                .mem_total_bytes
                .filter(|total| *total > 0)
                .map(|total| rss_bytes as f64 * 100.0 / total as f64)
                .unwrap_or(0.0),
            io,
            network: ctx.network,
            open_files,
            threads: u64::from(stat.num_threads),
        })
    }

    /// Reads every PID in `pids`, skipping processes that cannot be read.
    ///
    /// Workers come and go between discovery and reading, so a failure here
    /// only drops that PID from the scrape.
    pub fn read_samples(&self, pids: &[u32]) -> Vec<ProcessSample> {
        let ctx = self.system_context();
        let mut samples = Vec::with_capacity(pids.len());

        for &pid in pids {
            match self.read_sample(pid, &ctx) {
                Ok(sample) => samples.push(sample),
                Err(ReadError::ProcessGone(pid)) => {
                    debug!(pid, "process exited before it could be read");
                }
                Err(e) => {
                    warn!(pid = e.pid(), error = %e, "skipping process");
                }
            }
        }

        samples
    }
}

/// Average CPU usage since process start, in percent of one CPU.
///
/// Total CPU time over wall time since the process started. Returns 0 when
/// uptime is unknown or the process started in the current tick.
fn cpu_percent(cpu_ticks: u64, starttime_ticks: u64, uptime_secs: Option<f64>) -> f64 {
    let Some(uptime) = uptime_secs else {
        return 0.0;
    };
    let elapsed = uptime - starttime_ticks as f64 / CLK_TCK as f64;
    if elapsed <= 0.0 {
        return 0.0;
    }
    let cpu_secs = cpu_ticks as f64 / CLK_TCK as f64;
    cpu_secs * 100.0 / elapsed
}
