//! # Configuration
//!
//! Command-line arguments with environment fallbacks.
//!
//! | Flag           | Env              | Default          |
//! |----------------|------------------|------------------|
//! | `--db`         | `KPM_DB`         | `kpm.redb`       |
//! | `--log-format` | `KPM_LOG_FORMAT` | `auto`           |
//! | `--bind`       | `KPM_BIND`       | `127.0.0.1:8080` |
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use clap::{Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default database location.
pub const DEFAULT_DB_PATH: &str = "kpm.redb";

/// Default HTTP bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// JSON when stderr is not a terminal, text otherwise.
    #[default]
    Auto,
    /// Human-readable text.
    Text,
    /// One JSON object per event.
    Json,
}

/// KPM roster allocation service.
#[derive(Debug, Parser)]
#[command(name = "kpm", version, about)]
pub struct Args {
    /// Path to the roster database.
    #[arg(long, env = "KPM_DB", default_value = DEFAULT_DB_PATH, global = true)]
    pub db: PathBuf,

    /// Log output format.
    #[arg(long, env = "KPM_LOG_FORMAT", value_enum, default_value_t = LogFormat::Auto, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an empty roster database.
    Init {
        /// Overwrite an existing database.
        #[arg(long)]
        force: bool,
    },
    /// Replace the roster with a submission file (`{"data": [...]}`).
    Save {
        /// Submission JSON file.
        file: PathBuf,
    },
    /// Show pool capacity.
    Status {
        /// Print JSON.
        #[arg(long)]
        json: bool,
    },
    /// List stored players grouped by year.
    Players {
        /// Only this year.
        #[arg(long)]
        year: Option<i32>,
        /// Print JSON.
        #[arg(long)]
        json: bool,
    },
    /// Allocate codes for a JSON array of candidate records without storing them.
    Allocate {
        /// Candidate records JSON file.
        file: PathBuf,
        /// Write the result here instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Run the HTTP API.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "KPM_BIND", default_value = DEFAULT_BIND)]
        bind: SocketAddr,
    },
}
