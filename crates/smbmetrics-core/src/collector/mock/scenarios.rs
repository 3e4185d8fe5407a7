//! Pre-built mock scenarios for testing.
//!
//! `MockFs::smbd_host()` and `MockCommand::samba_server()` describe the same
//! host: two `smbd` workers (PIDs 1001 and 1002) serving two shares.

use super::command::MockCommand;
use super::filesystem::MockFs;

/// Builds a `/proc/[pid]/stat` line for an `smbd` process.
///
/// `utime`, `stime` and `starttime` are in clock ticks, `vsize` in bytes and
/// `rss` in pages.
#[allow(clippy::too_many_arguments)]
pub fn smbd_stat(
    pid: u32,
    ppid: u32,
    utime: u64,
    stime: u64,
    threads: u32,
    starttime: u64,
    vsize: u64,
    rss: u64,
) -> String {
    format!(
        "{pid} (smbd) S {ppid} {pid} {pid} 0 -1 4194560 2000 0 5 0 {utime} {stime} 0 0 20 0 \
         {threads} 0 {starttime} {vsize} {rss} 18446744073709551615 1 1 0 0 0 0 0 4096 0 0 0 0 \
         17 1 0 0 0 0 0 0 0 0 0 0 0 0 0"
    )
}

/// Builds a `/proc/[pid]/io` file.
pub fn proc_io(syscr: u64, syscw: u64, read_bytes: u64, write_bytes: u64) -> String {
    format!(
        "rchar: {}\nwchar: {}\nsyscr: {syscr}\nsyscw: {syscw}\nread_bytes: {read_bytes}\n\
         write_bytes: {write_bytes}\ncancelled_write_bytes: 0\n",
        read_bytes + 1000,
        write_bytes + 500,
    )
}

/// `smbstatus --json` output for the `samba_server` scenario.
///
/// Sessions: alice@10.0.0.5, bob@10.0.0.6. Tree connections: `public` from
/// both machines, `home` from 10.0.0.5. Open files: one opened read-write,
/// one read-only.
pub const SMBSTATUS_JSON: &str = r#"{
  "timestamp": "2026-10-16T09:15:02.113746+0000",
  "version": "4.20.2",
  "smb_conf": "/etc/samba/smb.conf",
  "sessions": {
    "3266454163": {
      "session_id": "3266454163",
      "server_id": { "pid": "1002", "task_id": "0", "vnn": "4294967295", "unique_id": "1" },
      "uid": 1000,
      "gid": 1000,
      "username": "alice",
      "groupname": "alice",
      "remote_machine": "10.0.0.5",
      "hostname": "ipv4:10.0.0.5:50412",
      "session_dialect": "SMB3_11",
      "encryption": { "cipher": "", "degree": "none" },
      "signing": { "cipher": "AES-128-GMAC", "degree": "partial" }
    },
    "1792382119": {
      "session_id": "1792382119",
      "server_id": { "pid": "1003", "task_id": "0", "vnn": "4294967295", "unique_id": "2" },
      "uid": 1001,
      "gid": 1001,
      "username": "bob",
      "groupname": "bob",
      "remote_machine": "10.0.0.6",
      "hostname": "ipv4:10.0.0.6:50988",
      "session_dialect": "SMB3_11",
      "encryption": { "cipher": "", "degree": "none" },
      "signing": { "cipher": "AES-128-GMAC", "degree": "partial" }
    }
  },
  "tcons": {
    "1": {
      "service": "public",
      "server_id": { "pid": "1002", "task_id": "0", "vnn": "4294967295", "unique_id": "1" },
      "tcon_id": "1",
      "session_id": "3266454163",
      "machine": "10.0.0.5",
      "connected_at": "2026-10-16T09:10:00+0000"
    },
    "2": {
      "service": "home",
      "server_id": { "pid": "1002", "task_id": "0", "vnn": "4294967295", "unique_id": "1" },
      "tcon_id": "2",
      "session_id": "3266454163",
      "machine": "10.0.0.5",
      "connected_at": "2026-10-16T09:11:00+0000"
    },
    "3": {
      "service": "public",
      "server_id": { "pid": "1003", "task_id": "0", "vnn": "4294967295", "unique_id": "2" },
      "tcon_id": "3",
      "session_id": "1792382119",
      "machine": "10.0.0.6",
      "connected_at": "2026-10-16T09:12:00+0000"
    }
  },
  "open_files": {
    "/srv/public/report.odt": {
      "service_path": "/srv/public",
      "filename": "report.odt",
      "num_pending_deletes": 0,
      "opens": {
        "1002/12": {
          "uid": 1000,
          "share_file_id": "12",
          "access_mask": { "READ_DATA": true, "WRITE_DATA": true, "APPEND_DATA": true, "hex": "0x0012019f", "text": "RW" },
          "opened_at": "2026-10-16T09:13:00+0000"
        }
      }
    },
    "/srv/public/readme.txt": {
      "service_path": "/srv/public",
      "filename": "readme.txt",
      "num_pending_deletes": 0,
      "opens": {
        "1003/7": {
          "uid": 1001,
          "share_file_id": "7",
          "access_mask": { "READ_DATA": true, "WRITE_DATA": false, "APPEND_DATA": false, "hex": "0x00120089", "text": "R" },
          "opened_at": "2026-10-16T09:14:00+0000"
        }
      }
    }
  }
}"#;

impl MockFs {
    /// A host running two `smbd` workers.
    ///
    /// | pid  | cpu ticks | started (ticks) | vsize     | rss pages | io (cr/cw/rb/wb)  | fds |
    /// |------|-----------|-----------------|-----------|-----------|-------------------|-----|
    /// | 1001 | 3000+1000 | 200000          | 100 MiB   | 2500      | 120/40/4096/8192  | 5   |
    /// | 1002 | 500+300   | 800000          | 200 MiB   | 5000      | 30/10/0/4096      | 8   |
    ///
    /// Uptime is 10000 s, MemTotal 8000000 kB and `/proc/net/dev` totals
    /// 51000 bytes received and 21000 sent.
    pub fn smbd_host() -> Self {
        let mut fs = Self::new();

        fs.add_file("/proc/uptime", "10000.00 38000.00\n");
        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:        8000000 kB
MemFree:         6000000 kB
MemAvailable:    7000000 kB
Buffers:          100000 kB
Cached:           500000 kB
",
        );
        fs.add_file(
            "/proc/net/dev",
            "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo:    1000      10    0    0    0     0          0         0     1000      10    0    0    0     0       0          0
  eth0:   50000     400    0    0    0     0          0         0    20000     300    0    0    0     0       0          0
",
        );

        fs.add_process(
            1001,
            &smbd_stat(1001, 1, 3000, 1000, 1, 200_000, 104_857_600, 2500),
            &proc_io(120, 40, 4096, 8192),
            5,
        );
        fs.add_process(
            1002,
            &smbd_stat(1002, 1001, 500, 300, 2, 800_000, 209_715_200, 5000),
            &proc_io(30, 10, 0, 4096),
            8,
        );

        fs
    }
}

impl MockCommand {
    /// Commands answering for the `smbd_host` scenario: `pgrep` finds both
    /// workers, `smbstatus --json` returns [`SMBSTATUS_JSON`], and `smbd`
    /// and `ctdb` report version 4.20.2.
    pub fn samba_server() -> Self {
        Self::new()
            .with_stdout("pgrep", "1001\n1002\n")
            .with_stdout("smbstatus", SMBSTATUS_JSON)
            .with_stdout("smbd", "Version 4.20.2\n")
            .with_stdout("ctdb", "4.20.2\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::traits::FileSystem;
    use std::path::Path;

    #[test]
    fn test_smbd_host_has_required_files() {
        let fs = MockFs::smbd_host();
        assert!(fs.exists(Path::new("/proc/uptime")));
        assert!(fs.exists(Path::new("/proc/meminfo")));
        assert!(fs.exists(Path::new("/proc/net/dev")));
        assert!(fs.exists(Path::new("/proc/1001/stat")));
        assert!(fs.exists(Path::new("/proc/1002/io")));
    }

    #[test]
    fn test_smbd_stat_has_full_field_count() {
        let line = smbd_stat(1, 0, 0, 0, 1, 0, 0, 0);
        let after_comm = line.rsplit_once(')').unwrap().1;
        assert_eq!(after_comm.split_whitespace().count(), 50);
    }

    #[test]
    fn test_smbstatus_json_is_valid() {
        let value: serde_json::Value = serde_json::from_str(SMBSTATUS_JSON).unwrap();
        assert_eq!(value["sessions"].as_object().unwrap().len(), 2);
        assert_eq!(value["tcons"].as_object().unwrap().len(), 3);
    }
}
