//! # Candidate Records
//!
//! One roster entry as seen by the allocator, plus the normalization pass
//! that runs before any code is computed.

use crate::primitives::Status;
use serde::{Deserialize, Serialize};

/// Valid semester codes.
pub const SEMESTERS: [&str; 6] = ["1", "2", "3", "4", "5", "6"];

/// Final diploma year.
pub const FINAL_DIPLOMA_YEAR: u8 = 3;

/// Final semester.
pub const FINAL_SEMESTER: &str = "6";

/// A roster entry for one reporting year.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Per-record key (player id).
    pub row_key: String,
    /// Durable identity shared by the same person across years.
    pub identity: Option<String>,
    /// Reporting/participation year.
    pub year: i32,
    /// Academic year at the time of this record (1..=3).
    pub diploma_year: u8,
    /// Semester code ("1".."6").
    pub semester: String,
    /// Participation status.
    pub status: Status,
    /// Previously assigned KPM code; empty when none.
    pub code: String,
}

impl CandidateRecord {
    /// Create an ACTIVE record with no prior code.
    #[must_use]
    pub fn new(row_key: impl Into<String>, year: i32, diploma_year: u8, semester: impl Into<String>) -> Self {
        Self {
            row_key: row_key.into(),
            identity: None,
            year,
            diploma_year,
            semester: semester.into(),
            status: Status::Active,
            code: String::new(),
        }
    }

    /// Set the durable identity.
    #[must_use]
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// Set the status.
    #[must_use]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Set the prior code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Check whether this record occupies a pool slot.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Clamp a diploma year into {1, 2, 3}; anything else becomes 1.
#[must_use]
pub fn normalize_diploma_year(value: i64) -> u8 {
    match value {
        1..=3 => value as u8,
        _ => 1,
    }
}

/// Clamp a semester into "1".."6"; anything else becomes "1".
#[must_use]
pub fn normalize_semester(raw: &str) -> String {
    let trimmed = raw.trim();
    if SEMESTERS.contains(&trimmed) {
        trimmed.to_string()
    } else {
        SEMESTERS[0].to_string()
    }
}

/// Normalize a record in place.
///
/// Applies domain defaults to diploma year and semester, trims the code and
/// identity (a blank identity is dropped), and infers the terminal state:
/// an ACTIVE record in diploma year 3, semester 6 becomes COMPLETED.
pub fn normalize(record: &mut CandidateRecord) {
    record.diploma_year = normalize_diploma_year(i64::from(record.diploma_year));
    record.semester = normalize_semester(&record.semester);
    record.code = record.code.trim().to_string();
    record.identity = record
        .identity
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string);

    if record.status == Status::Active
        && record.diploma_year == FINAL_DIPLOMA_YEAR
        && record.semester == FINAL_SEMESTER
    {
        record.status = Status::Completed;
    }
}

// =============================================================================
// TESTS
// =============================================================================
