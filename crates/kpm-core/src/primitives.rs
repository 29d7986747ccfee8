//! # Primitives
//!
//! Constants and small value types shared by every KPM module.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// SEQUENCE DOMAIN
// =============================================================================

/// Lowest assignable sequence number.
pub const MIN_SEQUENCE: u8 = 1;

/// Highest assignable sequence number.
pub const MAX_SEQUENCE: u8 = 99;

/// Total number of sequence slots in the global pool.
pub const POOL_CAPACITY: usize = 99;

/// Identifier of the single global pool document.
pub const GLOBAL_POOL_ID: &str = "GLOBAL";

/// A sequence number in the closed range [MIN_SEQUENCE, MAX_SEQUENCE].
///
/// The sequence is the scarce part of a KPM code; the prefix is recomputed
/// on every allocation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Sequence(u8);

impl Sequence {
    /// Create a sequence, returning `None` outside [1, 99].
    #[must_use]
    pub fn new(value: u8) -> Option<Self> {
        (MIN_SEQUENCE..=MAX_SEQUENCE)
            .contains(&value)
            .then_some(Self(value))
    }

    /// Get the raw value.
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Iterate the full sequence domain in ascending order.
    pub fn all() -> impl Iterator<Item = Sequence> {
        (MIN_SEQUENCE..=MAX_SEQUENCE).map(Sequence)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

// =============================================================================
// STATUS
// =============================================================================

/// Participation status of a roster record.
///
/// Only `Active` records hold a sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    #[default]
    Active,
    Completed,
    Dropped,
}

impl Status {
    /// Parse a status leniently.
    ///
    /// Input is trimmed and compared case-insensitively; anything that is not
    /// a known status becomes `Active`.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "COMPLETED" => Self::Completed,
            "DROPPED" => Self::Dropped,
            _ => Self::Active,
        }
    }

    /// Check whether this status occupies a pool slot.
    #[must_use]
    pub fn is_active(self) -> bool {
        self == Self::Active
    }

    /// The canonical upper-case label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
            Self::Dropped => "DROPPED",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// TESTS
// =============================================================================
