//! # CLI Commands
//!
//! Each `cmd_*` function implements one subcommand. They print results to
//! stdout and log through `tracing`; errors propagate to `main`.

use crate::api::YearGroups;
use kpm_core::roster::{self, PlayerView};
use kpm_core::{
    allocate_with_stats, derive_snapshot, CandidateInput, CandidateRecord, KpmError,
    PoolSnapshot, RedbStore, RosterSubmission,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Kpm(#[from] KpmError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database already exists at {0} (use --force to overwrite)")]
    AlreadyExists(PathBuf),
}

/// Result alias for CLI commands.
pub type CliResult<T> = std::result::Result<T, CliError>;

/// Output of the `allocate` dry run.
#[derive(Debug, Serialize)]
pub struct AllocationReport {
    pub roster: Vec<CandidateRecord>,
    pub pool: PoolSnapshot,
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Create an empty database.
pub fn cmd_init(db_path: &Path, force: bool) -> CliResult<()> {
    if db_path.exists() {
        if !force {
            return Err(CliError::AlreadyExists(db_path.to_path_buf()));
        }
        std::fs::remove_file(db_path)?;
        tracing::info!(path = %db_path.display(), "removed existing database");
    }

    RedbStore::open(db_path)?;
    println!("Initialized KPM database at {}", db_path.display());
    Ok(())
}

/// Replace the stored roster with a submission file.
pub fn cmd_save(db_path: &Path, file: &Path) -> CliResult<()> {
    let submission: RosterSubmission = serde_json::from_str(&std::fs::read_to_string(file)?)?;
    let mut store = RedbStore::open(db_path)?;

    let outcome = match roster::save_roster(&mut store, &submission) {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::warn!(error = %err, file = %file.display(), "roster not saved");
            return Err(err.into());
        }
    };

    tracing::info!(
        players = outcome.players.len(),
        retained = outcome.stats.retained,
        assigned = outcome.stats.assigned,
        inactive = outcome.stats.inactive,
        "roster saved"
    );
    println!(
        "Saved {} players ({} sequences allocated, {} available)",
        outcome.players.len(),
        outcome.snapshot.allocated_count(),
        outcome.snapshot.available_count()
    );
    Ok(())
}

/// Print pool capacity.
pub fn cmd_status(db_path: &Path, json: bool) -> CliResult<()> {
    let store = RedbStore::open(db_path)?;
    let status = roster::pool_status(&store)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("KPM pool");
        println!("  total:     {}", status.total);
        println!("  allocated: {}", status.allocated);
        println!("  available: {}", status.available);
        println!("  usage:     {}%", status.usage_percent);
    }
    Ok(())
}

/// Print stored players, optionally for one year.
pub fn cmd_players(db_path: &Path, year: Option<i32>, json: bool) -> CliResult<()> {
    let store = RedbStore::open(db_path)?;

    match (year, json) {
        (Some(year), true) => {
            let students = roster::participation(&store, year)?;
            let body = serde_json::json!({ "year": year, "students": students });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        (Some(year), false) => {
            print_year(year, &roster::participation(&store, year)?);
        }
        (None, true) => {
            let grouped = YearGroups(roster::players_by_year(&store)?);
            println!("{}", serde_json::to_string_pretty(&grouped)?);
        }
        (None, false) => {
            for (std::cmp::Reverse(year), players) in roster::players_by_year(&store)? {
                print_year(year, &players);
            }
        }
    }
    Ok(())
}

/// Allocate codes for a candidate file without touching the database.
pub fn cmd_allocate(file: &Path, output: Option<&Path>) -> CliResult<()> {
    let inputs: Vec<CandidateInput> = serde_json::from_str(&std::fs::read_to_string(file)?)?;
    let candidates = inputs.iter().map(CandidateRecord::from).collect();
    let (roster, stats) = allocate_with_stats(candidates)?;
    let pool = derive_snapshot(&roster);

    tracing::debug!(
        retained = stats.retained,
        assigned = stats.assigned,
        inactive = stats.inactive,
        "dry-run allocation"
    );

    let report = serde_json::to_string_pretty(&AllocationReport { roster, pool })?;
    match output {
        Some(path) => {
            std::fs::write(path, report)?;
            println!("Wrote allocation to {}", path.display());
        }
        None => println!("{report}"),
    }
    Ok(())
}

fn print_year(year: i32, players: &[PlayerView]) {
    println!("{year}:");
    for p in players {
        let kpm = if p.kpm_no.is_empty() { "-" } else { p.kpm_no.as_str() };
        println!(
            "  {:<8} {:<12} {} ({}) year {} sem {} {}",
            kpm, p.id, p.name, p.branch, p.diploma_year, p.semester, p.status
        );
    }
}
