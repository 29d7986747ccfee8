//! # Pool State
//!
//! Reduces an annotated roster into the allocated/available partition of the
//! sequence space. The snapshot is derived, never edited: every call
//! recomputes it from the roster, so a bad stored snapshot heals on the next
//! save.

use crate::code::parse_sequence;
use crate::primitives::{Sequence, POOL_CAPACITY};
use crate::record::CandidateRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Partition of [1, 99] into owned and free sequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    /// Sequences held by an ACTIVE record, ascending.
    pub allocated: Vec<u8>,
    /// The complement of `allocated` within [1, 99], ascending.
    pub available: Vec<u8>,
}

impl Default for PoolSnapshot {
    fn default() -> Self {
        Self::from_allocated(&BTreeSet::new())
    }
}

impl PoolSnapshot {
    /// Build a snapshot from the set of owned sequences.
    #[must_use]
    pub fn from_allocated(allocated: &BTreeSet<Sequence>) -> Self {
        let (owned, free): (Vec<Sequence>, Vec<Sequence>) =
            Sequence::all().partition(|seq| allocated.contains(seq));
        Self {
            allocated: owned.into_iter().map(Sequence::value).collect(),
            available: free.into_iter().map(Sequence::value).collect(),
        }
    }

    /// Number of owned sequences.
    #[must_use]
    pub fn allocated_count(&self) -> usize {
        self.allocated.len()
    }

    /// Number of free sequences.
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    /// Check whether no sequence is left.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.available.is_empty()
    }
}

/// Derive the pool snapshot from an annotated roster.
///
/// Only ACTIVE records whose code carries a valid sequence count.
#[must_use]
pub fn derive_snapshot(roster: &[CandidateRecord]) -> PoolSnapshot {
    let allocated: BTreeSet<Sequence> = roster
        .iter()
        .filter(|record| record.is_active())
        .filter_map(|record| parse_sequence(&record.code))
        .collect();
    PoolSnapshot::from_allocated(&allocated)
}

// =============================================================================
// STATUS REPORT
// =============================================================================

/// Capacity summary reported to administrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStatus {
    /// Total slots (always 99).
    pub total: usize,
    /// Owned slots.
    pub allocated: usize,
    /// Free slots.
    pub available: usize,
    /// `allocated / total` as a percentage, rounded half up.
    pub usage_percent: u8,
}

impl PoolStatus {
    /// Build a status report from an allocated count.
    #[must_use]
    pub fn from_allocated(allocated: usize) -> Self {
        let allocated = allocated.min(POOL_CAPACITY);
        Self {
            total: POOL_CAPACITY,
            allocated,
            available: POOL_CAPACITY - allocated,
            usage_percent: usage_percent(allocated),
        }
    }
}

impl From<&PoolSnapshot> for PoolStatus {
    fn from(snapshot: &PoolSnapshot) -> Self {
        Self::from_allocated(snapshot.allocated_count())
    }
}

/// Integer percentage of the pool in use, rounded half up.
fn usage_percent(allocated: usize) -> u8 {
    // round(a * 100 / 99) == (2 * a * 100 + 99) / (2 * 99)
    let doubled = allocated.saturating_mul(200);
    (doubled.saturating_add(POOL_CAPACITY) / (POOL_CAPACITY * 2)) as u8
}

// =============================================================================
// TESTS
// =============================================================================
