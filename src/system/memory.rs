use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use log::debug;

/// Size units, smallest first. Every raw reading is in KiB.
const UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];

/// System memory totals from the memory-info source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemorySnapshot {
    pub total_kib: u64,
    pub available_kib: u64,
}

impl MemorySnapshot {
    /// Memory in use: total minus available
    pub fn used_kib(&self) -> u64 {
        self.total_kib.saturating_sub(self.available_kib)
    }
}

/// Reader for `<proc_root>/meminfo`
#[derive(Debug, Clone)]
pub struct MemInfo {
    path: PathBuf,
}

impl MemInfo {
    pub fn new(proc_root: &Path) -> Self {
        Self {
            path: proc_root.join("meminfo"),
        }
    }

    /// Total system memory in KiB (`MemTotal`)
    pub fn read_total_memory(&self) -> Result<u64> {
        self.read_field("MemTotal")
    }

    /// Available system memory in KiB (`MemAvailable`)
    pub fn read_available_memory(&self) -> Result<u64> {
        self.read_field("MemAvailable")
    }

    /// Read both totals. A zero `MemTotal`, or more available than total,
    /// means the source is unusable.
    pub fn snapshot(&self) -> Result<MemorySnapshot> {
        let total_kib = self.read_total_memory()?;
        if total_kib == 0 {
            bail!("memory unavailable: MemTotal is 0 in {}", self.path.display());
        }
        let available_kib = self.read_available_memory()?;
        if available_kib > total_kib {
            bail!(
                "memory unavailable: MemAvailable {} kB exceeds MemTotal {} kB in {}",
                available_kib,
                total_kib,
                self.path.display()
            );
        }
        Ok(MemorySnapshot {
            total_kib,
            available_kib,
        })
    }

    /// Scan for the first `Key:` line and parse its numeric field
    fn read_field(&self, key: &str) -> Result<u64> {
        debug!("reading {} from {}", key, self.path.display());
        let file = File::open(&self.path)
            .with_context(|| format!("memory unavailable: cannot open {}", self.path.display()))?;

        for line in BufReader::new(file).lines() {
            let line = line
                .with_context(|| format!("memory unavailable: cannot read {}", self.path.display()))?;
            let Some(rest) = line.strip_prefix(key).and_then(|r| r.strip_prefix(':')) else {
                continue;
            };
            let value = rest
                .split_whitespace()
                .next()
                .ok_or_else(|| anyhow!("memory unavailable: {} has no value", key))?;
            return value
                .parse::<u64>()
                .with_context(|| format!("memory unavailable: bad {} value {:?}", key, value));
        }

        bail!("memory unavailable: {} not found in {}", key, self.path.display())
    }
}

/// Format a KiB count with the largest unit that keeps the value under 1024
pub fn format_size(kib: u64, decimals: usize) -> String {
    let mut size = kib as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.*} {}", decimals, size, UNITS[unit])
}

/// Format a KiB count as-is
pub fn format_kib(kib: u64) -> String {
    format!("{} KiB", kib)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn meminfo_in(contents: &str) -> (tempfile::TempDir, MemInfo) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("meminfo"), contents).unwrap();
        let info = MemInfo::new(dir.path());
        (dir, info)
    }

    #[test]
    fn human_readable_sizes() {
        assert_eq!(format_size(1023, 2), "1023.00 KiB");
        assert_eq!(format_size(1024, 2), "1.00 MiB");
        assert_eq!(format_size(1024 * 1024, 2), "1.00 GiB");
        assert_eq!(format_size(1536, 2), "1.50 MiB");
        assert_eq!(format_size(0, 2), "0.00 KiB");
        assert_eq!(format_size(1536, 0), "2 MiB");
    }

    #[test]
    fn human_readable_caps_at_pib() {
        let one_pib = 1024u64.pow(4);
        assert_eq!(format_size(one_pib, 2), "1.00 PiB");
        assert_eq!(format_size(one_pib * 2048, 2), "2048.00 PiB");
    }

    #[test]
    fn raw_sizes() {
        assert_eq!(format_kib(600), "600 KiB");
    }

    #[test]
    fn reads_total_and_available() {
        let (_dir, info) = meminfo_in(
            "MemTotal:           1000 kB\n\
             MemFree:             100 kB\n\
             MemAvailable:        400 kB\n\
             Buffers:              10 kB\n",
        );
        assert_eq!(info.read_total_memory().unwrap(), 1000);
        assert_eq!(info.read_available_memory().unwrap(), 400);

        let snap = info.snapshot().unwrap();
        assert_eq!(snap.used_kib(), 600);
    }

    #[test]
    fn key_prefix_does_not_match_longer_key() {
        let (_dir, info) = meminfo_in("MemTotalish: 5 kB\nMemTotal: 7 kB\n");
        assert_eq!(info.read_total_memory().unwrap(), 7);
    }

    #[test]
    fn missing_key_is_an_error() {
        let (_dir, info) = meminfo_in("MemFree: 100 kB\nMemAvailable: 400 kB\n");
        let err = info.read_total_memory().unwrap_err();
        assert!(err.to_string().contains("memory unavailable"));
        assert!(info.snapshot().is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let info = MemInfo::new(dir.path());
        let err = info.read_available_memory().unwrap_err();
        assert!(err.to_string().contains("memory unavailable"));
    }

    #[test]
    fn available_above_total_is_an_error() {
        let (_dir, info) = meminfo_in("MemTotal: 1000 kB\nMemAvailable: 1200 kB\n");
        let err = info.snapshot().unwrap_err();
        assert!(err.to_string().contains("memory unavailable"));
    }

    #[test]
    fn zero_total_is_an_error() {
        let (_dir, info) = meminfo_in("MemTotal: 0 kB\nMemAvailable: 0 kB\n");
        assert!(info.snapshot().is_err());
    }
}
