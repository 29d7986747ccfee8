//! # KPM Core
//!
//! Deterministic allocation of KPM codes for a club roster.
//!
//! A KPM code is `<yy><diplomaYear><semester><sequence>`. The two-digit
//! sequence is a global, scarce resource: at most 99 identities can be
//! ACTIVE at once, and each keeps its sequence across roster resubmissions.
//!
//! ```text
//! submission ──► intake ──► allocator ──► pool deriver ──► store
//!                  (normalize)  (two passes)   (snapshot)    (atomic replace)
//! ```
//!
//! The allocator and pool deriver are pure. Persistence lives behind
//! [`storage::RosterStore`]; the caller decides where the roster goes.

pub mod allocator;
pub mod code;
pub mod error;
pub mod intake;
pub mod pool;
pub mod primitives;
pub mod record;
pub mod roster;
pub mod storage;

pub use allocator::{allocate, allocate_with_stats, AllocationStats};
pub use error::{KpmError, Result};
pub use intake::{
    parse_submission, CandidateInput, PlayerInput, PlayerRecord, RosterSubmission, YearGroup,
};
pub use pool::{derive_snapshot, PoolSnapshot, PoolStatus};
pub use primitives::{Sequence, Status, MAX_SEQUENCE, MIN_SEQUENCE, POOL_CAPACITY};
pub use record::CandidateRecord;
pub use roster::{PlayerView, SaveOutcome};
pub use storage::{MemoryStore, RedbStore, RosterStore};
