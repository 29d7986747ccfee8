//! # Roster Service
//!
//! Save and read operations over a [`RosterStore`].
//!
//! A save is intake, allocation, snapshot derivation, then one store write.
//! Nothing is written when any step fails.

use crate::allocator::{allocate_with_stats, AllocationStats};
use crate::error::Result;
use crate::intake::{parse_submission, PlayerRecord, RosterSubmission};
use crate::pool::{derive_snapshot, PoolSnapshot, PoolStatus};
use crate::primitives::Status;
use crate::storage::RosterStore;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;

// =============================================================================
// VIEWS
// =============================================================================

/// A player as presented to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: String,
    pub master_id: String,
    pub name: String,
    pub branch: String,
    pub diploma_year: u8,
    pub semester: String,
    pub status: Status,
    pub kpm_no: String,
}

impl From<&PlayerRecord> for PlayerView {
    fn from(player: &PlayerRecord) -> Self {
        Self {
            id: player.player_id().to_string(),
            master_id: player.master_id().to_string(),
            name: player.name.clone(),
            branch: player.branch.clone(),
            diploma_year: player.candidate.diploma_year,
            semester: player.candidate.semester.clone(),
            status: player.candidate.status,
            kpm_no: player.candidate.code.clone(),
        }
    }
}

/// Players keyed by year, newest year first.
pub type GroupedPlayers = BTreeMap<Reverse<i32>, Vec<PlayerView>>;

/// Result of a successful save.
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    /// The roster as stored, with codes assigned.
    pub players: Vec<PlayerRecord>,
    /// The snapshot stored alongside it.
    pub snapshot: PoolSnapshot,
    /// What the allocator did.
    pub stats: AllocationStats,
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Allocate codes for a list of players, keeping their descriptive fields.
pub fn allocate_players(players: Vec<PlayerRecord>) -> Result<(Vec<PlayerRecord>, AllocationStats)> {
    let candidates = players.iter().map(|p| p.candidate.clone()).collect();
    let (candidates, stats) = allocate_with_stats(candidates)?;

    let players = players
        .into_iter()
        .zip(candidates)
        .map(|(player, candidate)| PlayerRecord { candidate, ..player })
        .collect();
    Ok((players, stats))
}

/// Derive the pool snapshot of a list of players.
#[must_use]
pub fn snapshot_of(players: &[PlayerRecord]) -> PoolSnapshot {
    let candidates: Vec<_> = players.iter().map(|p| p.candidate.clone()).collect();
    derive_snapshot(&candidates)
}

/// Replace the stored roster with a new submission.
pub fn save_roster<S: RosterStore + ?Sized>(
    store: &mut S,
    submission: &RosterSubmission,
) -> Result<SaveOutcome> {
    let players = parse_submission(submission)?;
    let (players, stats) = allocate_players(players)?;
    let snapshot = snapshot_of(&players);

    store.replace_roster(&players, &snapshot)?;

    Ok(SaveOutcome {
        players,
        snapshot,
        stats,
    })
}

/// Report pool capacity.
///
/// Uses the stored snapshot; when none exists the counts are derived from
/// the stored ACTIVE players.
pub fn pool_status<S: RosterStore + ?Sized>(store: &S) -> Result<PoolStatus> {
    let snapshot = match store.load_pool()? {
        Some(snapshot) => snapshot,
        None => snapshot_of(&store.load_roster()?),
    };
    Ok(PoolStatus::from(&snapshot))
}

/// Group players by year, newest year first, keeping stored order within a year.
#[must_use]
pub fn group_by_year(players: &[PlayerRecord]) -> GroupedPlayers {
    let mut grouped = GroupedPlayers::new();
    for player in players {
        grouped
            .entry(Reverse(player.candidate.year))
            .or_default()
            .push(PlayerView::from(player));
    }
    grouped
}

/// Load the stored roster grouped by year.
pub fn players_by_year<S: RosterStore + ?Sized>(store: &S) -> Result<GroupedPlayers> {
    Ok(group_by_year(&store.load_roster()?))
}

/// Load the players of one year, in stored (submission) order.
pub fn participation<S: RosterStore + ?Sized>(store: &S, year: i32) -> Result<Vec<PlayerView>> {
    Ok(store
        .load_roster()?
        .iter()
        .filter(|p| p.candidate.year == year)
        .map(PlayerView::from)
        .collect())
}

// =============================================================================
// TESTS
// =============================================================================
