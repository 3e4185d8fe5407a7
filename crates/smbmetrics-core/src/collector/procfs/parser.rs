//! Parsers for `/proc` files and process-lookup output.
//!
//! These are pure functions that parse the content of various `/proc` files
//! into structured data. They are designed to be easily testable with string inputs.

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parses process-lookup output (`pgrep`) into PIDs.
///
/// One PID per line; surrounding whitespace is trimmed and blank lines are
/// skipped. Any other line that is not a positive decimal integer fails the
/// whole parse, so a partial list is never returned.
pub fn parse_pid_list(content: &str) -> Result<Vec<u32>, ParseError> {
    let mut pids = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.parse::<u32>() {
            Ok(pid) if pid > 0 => pids.push(pid),
            _ => return Err(ParseError::new(format!("invalid pid {:?}", line))),
        }
    }

    Ok(pids)
}

/// Fields of `/proc/[pid]/stat` used for resource sampling.
#[derive(Debug, Clone, Default)]
pub struct ProcStat {
    pub pid: u32,
    pub comm: String,
    pub state: char,
    pub ppid: u32,
    /// User-mode CPU time in clock ticks.
    pub utime: u64,
    /// Kernel-mode CPU time in clock ticks.
    pub stime: u64,
    pub num_threads: u32,
    /// Start time after boot in clock ticks.
    pub starttime: u64,
    /// Virtual memory size in bytes.
    pub vsize: u64,
    /// Resident set size in pages.
    pub rss: i64,
}

/// Number of fields after `(comm)` needed to reach `rss`.
const STAT_MIN_FIELDS: usize = 22;

/// Parses `/proc/[pid]/stat` content.
///
/// The format is tricky because the comm field can contain spaces and parentheses.
/// Format: pid (comm) state ppid pgrp session tty_nr ...
pub fn parse_proc_stat(content: &str) -> Result<ProcStat, ParseError> {
    let content = content.trim();

    // comm is enclosed in the first '(' and the last ')'
    let open_paren = content
        .find('(')
        .ok_or_else(|| ParseError::new("missing '(' in stat"))?;
    let close_paren = content
        .rfind(')')
        .ok_or_else(|| ParseError::new("missing ')' in stat"))?;

    if close_paren <= open_paren {
        return Err(ParseError::new("invalid parentheses in stat"));
    }

    let pid: u32 = content[..open_paren]
        .trim()
        .parse()
        .map_err(|_| ParseError::new("invalid pid"))?;

    let comm = content[open_paren + 1..close_paren].to_string();

    let fields: Vec<&str> = content[close_paren + 1..].split_whitespace().collect();

    if fields.len() < STAT_MIN_FIELDS {
        return Err(ParseError::new(format!(
            "not enough fields in stat: expected {}+, got {}",
            STAT_MIN_FIELDS,
            fields.len()
        )));
    }

    let parse_field = |idx: usize, name: &str| -> Result<i64, ParseError> {
        fields[idx]
            .parse()
            .map_err(|_| ParseError::new(format!("invalid {}", name)))
    };

    let parse_field_u64 = |idx: usize, name: &str| -> Result<u64, ParseError> {
        fields[idx]
            .parse()
            .map_err(|_| ParseError::new(format!("invalid {}", name)))
    };

    Ok(ProcStat {
        pid,
        comm,
        state: fields[0].chars().next().unwrap_or('?'),
        ppid: parse_field(1, "ppid")? as u32,
        utime: parse_field_u64(11, "utime")?,
        stime: parse_field_u64(12, "stime")?,
        num_threads: parse_field(17, "num_threads")?.max(0) as u32,
        starttime: parse_field_u64(19, "starttime")?,
        vsize: parse_field_u64(20, "vsize")?,
        rss: parse_field(21, "rss")?,
    })
}

/// Parsed data from `/proc/[pid]/io`.
#[derive(Debug, Clone, Default)]
pub struct ProcIo {
    pub rchar: u64,
    pub wchar: u64,
    /// Read syscalls.
    pub syscr: u64,
    /// Write syscalls.
    pub syscw: u64,
    /// Bytes fetched from the storage layer.
    pub read_bytes: u64,
    /// Bytes sent to the storage layer.
    pub write_bytes: u64,
}

/// Parses `/proc/[pid]/io` content.
///
/// Format is key: value pairs, one per line. A file with none of the
/// known keys is rejected.
pub fn parse_proc_io(content: &str) -> Result<ProcIo, ParseError> {
    let mut io = ProcIo::default();
    let mut seen = false;

    for line in content.lines() {
        if let Some((key, value)) = line.split_once(':') {
            let value: u64 = value.trim().parse().unwrap_or(0);
            seen |= match key.trim() {
                "rchar" => {
                    io.rchar = value;
                    true
                }
                "wchar" => {
                    io.wchar = value;
                    true
                }
                "syscr" => {
                    io.syscr = value;
                    true
                }
                "syscw" => {
                    io.syscw = value;
                    true
                }
                "read_bytes" => {
                    io.read_bytes = value;
                    true
                }
                "write_bytes" => {
                    io.write_bytes = value;
                    true
                }
                _ => false,
            };
        }
    }

    if !seen {
        return Err(ParseError::new("no io counters found"));
    }
    Ok(io)
}

/// Parsed data from `/proc/meminfo` (kB).
#[derive(Debug, Clone, Default)]
pub struct MemInfo {
    pub mem_total: u64,
    pub mem_available: u64,
}

/// Parses `/proc/meminfo` content. `MemTotal` is required.
pub fn parse_meminfo(content: &str) -> Result<MemInfo, ParseError> {
    let mut info = MemInfo::default();

    let parse_kb = |line: &str| -> u64 {
        line.split_whitespace()
            .nth(1)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    };

    for line in content.lines() {
        if line.starts_with("MemTotal:") {
            info.mem_total = parse_kb(line);
        } else if line.starts_with("MemAvailable:") {
            info.mem_available = parse_kb(line);
        }
    }

    if info.mem_total == 0 {
        return Err(ParseError::new("MemTotal missing from meminfo"));
    }
    Ok(info)
}

/// Parses `/proc/uptime` and returns seconds since boot.
///
/// Format: `<uptime> <idle>`, both in seconds with fractional part.
pub fn parse_uptime(content: &str) -> Result<f64, ParseError> {
    content
        .split_whitespace()
        .next()
        .ok_or_else(|| ParseError::new("empty uptime"))?
        .parse()
        .map_err(|_| ParseError::new("invalid uptime"))
}

/// Per-interface counters from `/proc/net/dev`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetDevStats {
    pub interface: String,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

/// Parses `/proc/net/dev` content.
///
/// Format:
/// Inter-|   Receive                                                |  Transmit
///  face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
///    lo: 1234567     1234    0    0    0     0          0         0  1234567     1234    0    0    0     0       0          0
pub fn parse_net_dev(content: &str) -> Result<Vec<NetDevStats>, ParseError> {
    let mut devices = Vec::new();

    for line in content.lines() {
        if line.contains('|') || line.trim().is_empty() {
            continue;
        }

        let Some((interface, counters)) = line.split_once(':') else {
            return Err(ParseError::new(format!("malformed net/dev line {:?}", line)));
        };

        let values: Vec<&str> = counters.split_whitespace().collect();
        if values.len() < 16 {
            return Err(ParseError::new(format!(
                "not enough fields for interface {}",
                interface.trim()
            )));
        }

        let get_val = |idx: usize| -> Result<u64, ParseError> {
            values[idx]
                .parse()
                .map_err(|_| ParseError::new(format!("invalid counter {:?}", values[idx])))
        };

        devices.push(NetDevStats {
            interface: interface.trim().to_string(),
            rx_bytes: get_val(0)?,
            tx_bytes: get_val(8)?,
        });
    }

    Ok(devices)
}
