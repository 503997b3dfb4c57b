//! memviz — Memory Visualiser, a one-shot memory usage report for Linux.
//!
//! Without arguments prints a single bar for system memory (MemTotal minus
//! MemAvailable). Given a program name, prints one bar per matching process
//! (summed Rss from its smaps) followed by a total for the program.
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

mod config;
mod system;
mod ui;

use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;
use env_logger::Env;

use config::Config;
use system::process::SysinfoLookup;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    // Exits with status 2 and a usage message on bad arguments
    let config = Config::parse();

    if let Err(e) = run(&config) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    ui::report::write_report(config, &SysinfoLookup, &mut out)?;
    out.flush()?;
    Ok(())
}
