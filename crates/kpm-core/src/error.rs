//! # Errors
//!
//! The allocator itself fails in exactly one way: the active roster needs
//! more sequences than the pool holds. The remaining variants belong to
//! roster intake and the store.

use thiserror::Error;

/// Errors from KPM operations.
#[derive(Debug, Error)]
pub enum KpmError {
    /// Every sequence in [1, 99] is already owned by an active identity.
    #[error("KPM capacity exhausted: all sequence slots in [1,99] are already assigned")]
    CapacityExhausted,

    /// The submission contained no player with both a name and a branch.
    #[error("no valid players to save")]
    EmptySubmission,

    /// The embedded database failed.
    #[error("storage error: {0}")]
    Storage(#[from] redb::Error),

    /// A stored value could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] postcard::Error),
}

/// Result alias for KPM operations.
pub type Result<T> = std::result::Result<T, KpmError>;

impl KpmError {
    /// Check whether this error was caused by the submitted roster
    /// rather than by the store.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::CapacityExhausted | Self::EmptySubmission)
    }
}
