//! Text report: one bar line per subject.
//!
//! ```text
//! Memory          [############         | 60%] 600 KiB/1000 KiB
//! 2231            [#                    | 5%] 412.61 MiB/7.63 GiB
//! firefox         [###                  | 17%] 1.33 GiB/7.63 GiB
//! ```

use std::fmt;
use std::io::Write;

use anyhow::Result;
use log::debug;

use crate::config::Config;
use crate::system::memory::{format_kib, format_size, MemInfo, MemorySnapshot};
use crate::system::process::{ProcessLookup, SmapsReader};
use crate::ui::meter::{bar_graph, percent_label, percent_of};

/// Character width of the label column
pub const LABEL_WIDTH: usize = 15;

/// Label of the system-wide line
pub const SYSTEM_LABEL: &str = "Memory";

/// One rendered subject
#[derive(Debug, Clone, PartialEq)]
pub struct UsageLine {
    pub label: String,
    pub percent: f64,
    pub bar: String,
    pub display_used: String,
    pub display_total: String,
}

impl UsageLine {
    pub fn new(label: impl Into<String>, used_kib: u64, total_kib: u64, config: &Config) -> Result<Self> {
        let percent = percent_of(used_kib, total_kib);
        Ok(Self {
            label: label.into(),
            percent,
            bar: bar_graph(percent, config.length)?,
            display_used: display_size(used_kib, config.human_readable),
            display_total: display_size(total_kib, config.human_readable),
        })
    }
}

impl fmt::Display for UsageLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{} | {}%] {}/{}",
            pad_label(&self.label),
            self.bar,
            percent_label(self.percent),
            self.display_used,
            self.display_total
        )
    }
}

/// What a program lookup produced
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessReport {
    NotFound(String),
    Found {
        per_pid: Vec<UsageLine>,
        aggregate: UsageLine,
    },
}

impl ProcessReport {
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::NotFound(name) => vec![format!("{} not found.", name)],
            Self::Found { per_pid, aggregate } => per_pid
                .iter()
                .chain(std::iter::once(aggregate))
                .map(ToString::to_string)
                .collect(),
        }
    }
}

fn display_size(kib: u64, human_readable: bool) -> String {
    if human_readable {
        format_size(kib, 2)
    } else {
        format_kib(kib)
    }
}

/// Left-justify to `LABEL_WIDTH` characters; longer labels stay whole
fn pad_label(label: &str) -> String {
    format!("{:<width$}", label, width = LABEL_WIDTH)
}

/// The single system-wide line
pub fn system_report(snapshot: &MemorySnapshot, config: &Config) -> Result<UsageLine> {
    UsageLine::new(SYSTEM_LABEL, snapshot.used_kib(), snapshot.total_kib, config)
}

/// One line per matching PID plus an aggregate line for the program
pub fn process_report(
    program: &str,
    snapshot: &MemorySnapshot,
    lookup: &dyn ProcessLookup,
    smaps: &SmapsReader,
    config: &Config,
) -> Result<ProcessReport> {
    let pids = lookup.pids_of(program);
    if pids.is_empty() {
        return Ok(ProcessReport::NotFound(program.to_string()));
    }

    let mut per_pid = Vec::with_capacity(pids.len());
    let mut total_rss = 0u64;
    for pid in pids {
        let sample = smaps.sample(pid);
        total_rss += sample.resident_kib;
        per_pid.push(UsageLine::new(
            sample.pid.to_string(),
            sample.resident_kib,
            snapshot.total_kib,
            config,
        )?);
    }
    debug!("{} uses {} KiB across {} processes", program, total_rss, per_pid.len());

    let aggregate = UsageLine::new(program, total_rss, snapshot.total_kib, config)?;
    Ok(ProcessReport::Found { per_pid, aggregate })
}

/// Read the sources once and write the report for `config` to `out`
pub fn write_report<W: Write>(config: &Config, lookup: &dyn ProcessLookup, out: &mut W) -> Result<()> {
    let snapshot = MemInfo::new(&config.proc_root).snapshot()?;
    debug!("memory snapshot {:?}", snapshot);

    let lines = match &config.program {
        None => vec![system_report(&snapshot, config)?.to_string()],
        Some(program) => {
            let smaps = SmapsReader::new(&config.proc_root);
            process_report(program, &snapshot, lookup, &smaps, config)?.lines()
        }
    };

    for line in lines {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}
