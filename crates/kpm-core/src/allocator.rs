//! # KPM Allocator
//!
//! Assigns a globally unique sequence to every ACTIVE roster record.
//!
//! The roster is a full replacement: every call sees the complete set of
//! records and recomputes all codes. Allocation runs in two passes over
//! explicit ownership tables:
//!
//! 1. Records whose identity (or own code) already points at a sequence
//!    keep it, unless a different identity claimed it first.
//! 2. Everything else takes the lowest free sequence.
//!
//! Given the same input in the same order the output is identical, and
//! re-running on the output changes nothing.

use crate::code::{compose, parse_sequence};
use crate::error::{KpmError, Result};
use crate::primitives::Sequence;
use crate::record::{normalize, CandidateRecord};
use std::collections::{BTreeMap, VecDeque};

// =============================================================================
// OWNERSHIP
// =============================================================================

/// Who a sequence belongs to during one run.
///
/// Records without a durable identity are islands keyed by their position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Owner {
    Identity(String),
    Row(usize),
}

impl Owner {
    fn of(index: usize, record: &CandidateRecord) -> Self {
        match &record.identity {
            Some(id) => Self::Identity(id.clone()),
            None => Self::Row(index),
        }
    }
}

/// Ownership tables for one allocation run.
#[derive(Debug, Default)]
struct OwnershipTable {
    /// sequence -> owning identity
    owners: BTreeMap<Sequence, Owner>,
    /// identity -> sequence bound in this run
    bindings: BTreeMap<Owner, Sequence>,
}

impl OwnershipTable {
    /// Try to claim a sequence. Fails only if a different owner holds it.
    fn claim(&mut self, sequence: Sequence, owner: &Owner) -> bool {
        match self.owners.get(&sequence) {
            Some(current) if current != owner => false,
            Some(_) => true,
            None => {
                self.owners.insert(sequence, owner.clone());
                true
            }
        }
    }

    /// Record the identity's sequence unless one is already bound.
    fn bind(&mut self, owner: &Owner, sequence: Sequence) {
        self.bindings.entry(owner.clone()).or_insert(sequence);
    }

    /// The owner's bound sequence, if it still belongs to them.
    fn bound(&self, owner: &Owner) -> Option<Sequence> {
        let sequence = *self.bindings.get(owner)?;
        (self.owners.get(&sequence) == Some(owner)).then_some(sequence)
    }

    /// Sequences nobody owns, ascending.
    fn available(&self) -> VecDeque<Sequence> {
        Sequence::all()
            .filter(|seq| !self.owners.contains_key(seq))
            .collect()
    }
}

// =============================================================================
// ALLOCATION
// =============================================================================

/// Counters describing what one allocation run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocationStats {
    /// ACTIVE records that kept their identity's or own sequence.
    pub retained: usize,
    /// ACTIVE records that received a sequence in the second pass.
    pub assigned: usize,
    /// Records that hold no code because they are not ACTIVE.
    pub inactive: usize,
}

/// Allocate KPM codes for a full roster.
///
/// Returns the same records in the same order with normalized
/// status/diploma year/semester and recomputed codes. Fails with
/// [`KpmError::CapacityExhausted`] when more than 99 identities are ACTIVE;
/// no partial roster is returned in that case.
pub fn allocate(roster: Vec<CandidateRecord>) -> Result<Vec<CandidateRecord>> {
    allocate_with_stats(roster).map(|(roster, _)| roster)
}

/// Same as [`allocate`], also reporting what the run did.
pub fn allocate_with_stats(
    mut roster: Vec<CandidateRecord>,
) -> Result<(Vec<CandidateRecord>, AllocationStats)> {
    let stats = assign(&mut roster)?;
    Ok((roster, stats))
}

fn assign(roster: &mut [CandidateRecord]) -> Result<AllocationStats> {
    roster.iter_mut().for_each(normalize);

    let owners: Vec<Owner> = roster
        .iter()
        .enumerate()
        .map(|(index, record)| Owner::of(index, record))
        .collect();
    let preferred = preferred_sequences(roster);

    let mut table = OwnershipTable::default();
    let mut stats = AllocationStats::default();
    let mut deferred = Vec::new();

    // First pass: keep what is already held.
    for (index, record) in roster.iter_mut().enumerate() {
        if !record.is_active() {
            record.code.clear();
            stats.inactive += 1;
            continue;
        }

        let owner = &owners[index];
        let candidate = record
            .identity
            .as_ref()
            .and_then(|id| preferred.get(id).copied())
            .or_else(|| parse_sequence(&record.code));

        match candidate {
            Some(sequence) if table.claim(sequence, owner) => {
                table.bind(owner, sequence);
                record.code = compose(record.year, record.diploma_year, &record.semester, sequence);
                stats.retained += 1;
            }
            _ => {
                record.code.clear();
                deferred.push(index);
            }
        }
    }

    // Second pass: hand out free sequences in ascending order.
    let mut available = table.available();
    for index in deferred {
        let owner = &owners[index];
        let sequence = match table.bound(owner) {
            Some(sequence) => sequence,
            None => {
                let sequence = available.pop_front().ok_or(KpmError::CapacityExhausted)?;
                table.claim(sequence, owner);
                table.bind(owner, sequence);
                sequence
            }
        };

        let record = &mut roster[index];
        record.code = compose(record.year, record.diploma_year, &record.semester, sequence);
        stats.assigned += 1;
    }

    Ok(stats)
}

/// Map each durable identity to the sequence it historically held.
///
/// Records are visited by ascending year, ties in submission order; the
/// first well-formed code seen for an identity wins. Status is ignored, so
/// a COMPLETED record from an earlier year still carries history.
fn preferred_sequences(roster: &[CandidateRecord]) -> BTreeMap<String, Sequence> {
    let mut order: Vec<usize> = (0..roster.len()).collect();
    order.sort_by_key(|&index| roster[index].year);

    let mut preferred = BTreeMap::new();
    for index in order {
        let record = &roster[index];
        let Some(identity) = &record.identity else {
            continue;
        };
        if preferred.contains_key(identity) {
            continue;
        }
        if let Some(sequence) = parse_sequence(&record.code) {
            preferred.insert(identity.clone(), sequence);
        }
    }
    preferred
}

// =============================================================================
// TESTS
// =============================================================================
