//! Command-line configuration.
//!
//! Parsed once in `main` and handed down by reference; nothing reads
//! arguments after this point.

use std::path::PathBuf;

use clap::builder::RangedU64ValueParser;
use clap::Parser;

/// Default bar graph width in characters
pub const DEFAULT_LENGTH: usize = 20;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "memviz",
    version,
    about = "Memory Visualiser -- See Memory Usage Report with bar charts",
    after_help = "Copyright 2024"
)]
pub struct Config {
    /// Print sizes in human-readable format (e.g., MiB, GiB).
    #[arg(short = 'H', long)]
    pub human_readable: bool,

    /// Specify the length of the graph.
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_LENGTH,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub length: usize,

    /// If a program is specified, show memory use of all associated processes. Show only total use if not.
    pub program: Option<String>,

    /// Root of the proc filesystem to read from.
    #[arg(long, env = "MEMVIZ_PROC_ROOT", default_value = "/proc", hide = true)]
    pub proc_root: PathBuf,
}
