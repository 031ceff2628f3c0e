//! Command-line surface (SPEC_FULL §A.4). Not a server: HTTP CRUD on
//! targets is out of scope (spec.md §1), so `run` seeds an in-memory
//! repository set from a local JSON file instead of exposing an API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ccmonitor")]
#[command(version = concat!("Ver:", env!("CARGO_PKG_VERSION")))]
#[command(about = "Distributed uptime and latency monitoring engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the scheduler in-process, seeded from a JSON targets file.
    Run {
        /// Path to a JSON array of targets to seed the in-memory repository with.
        #[arg(long)]
        targets: PathBuf,

        /// Optional TOML config file overriding engine defaults.
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run a single stability-checked session against an ad-hoc URL and
    /// print the classified result. A debugging aid, not part of the pipeline.
    ProbeOnce {
        url: String,

        #[arg(long, default_value_t = 10)]
        timeout_seconds: u32,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
