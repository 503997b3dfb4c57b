use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::debug;
use sysinfo::{ProcessesToUpdate, System};

/// Resident memory of one process, in KiB
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessMemorySample {
    pub pid: u32,
    pub resident_kib: u64,
}

/// Resolves a program name to the PIDs currently running it
pub trait ProcessLookup {
    fn pids_of(&self, name: &str) -> Vec<u32>;
}

/// Process table lookup backed by `sysinfo`
pub struct SysinfoLookup;

impl ProcessLookup for SysinfoLookup {
    /// Matches the process name or the executable's file name, skipping
    /// threads. PIDs come back highest first, as `pidof` lists them.
    fn pids_of(&self, name: &str) -> Vec<u32> {
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::All, true);

        let wanted = OsStr::new(name);
        let mut pids: Vec<u32> = sys
            .processes()
            .iter()
            .filter(|(_, p)| p.thread_kind().is_none())
            .filter(|(_, p)| {
                p.name() == wanted
                    || p.exe().and_then(Path::file_name) == Some(wanted)
            })
            .map(|(pid, _)| pid.as_u32())
            .collect();

        pids.sort_unstable_by(|a, b| b.cmp(a));
        debug!("{} resolved to pids {:?}", name, pids);
        pids
    }
}

/// Per-process memory-map reader rooted at a proc filesystem
#[derive(Debug, Clone)]
pub struct SmapsReader {
    proc_root: PathBuf,
}

impl SmapsReader {
    pub fn new(proc_root: &Path) -> Self {
        Self {
            proc_root: proc_root.to_path_buf(),
        }
    }

    /// Sum of `Rss` over every mapping of `pid`.
    ///
    /// A process that exited or whose smaps we may not read counts as 0;
    /// both happen routinely and are not errors.
    pub fn resident_memory_of(&self, pid: u32) -> u64 {
        let path = self.proc_root.join(pid.to_string()).join("smaps");
        match sum_rss(&path) {
            Ok(rss) => rss,
            Err(e) => {
                debug!("no smaps for pid {} ({}), counting 0", pid, e);
                0
            }
        }
    }

    pub fn sample(&self, pid: u32) -> ProcessMemorySample {
        ProcessMemorySample {
            pid,
            resident_kib: self.resident_memory_of(pid),
        }
    }
}

fn sum_rss(path: &Path) -> io::Result<u64> {
    let file = File::open(path)?;
    let mut rss = 0u64;
    for line in BufReader::new(file).lines() {
        let line = line?;
        if let Some(rest) = line.strip_prefix("Rss:") {
            if let Some(kib) = rest.split_whitespace().next().and_then(|v| v.parse::<u64>().ok()) {
                rss += kib;
            }
        }
    }
    Ok(rss)
}
