//! # Storage Module
//!
//! Persistence of the roster and its pool snapshot.
//!
//! Saves are full replacements: the previous roster is dropped and the new
//! roster and snapshot are written together. Implementations must make the
//! pair visible atomically.

mod redb_store;

pub use redb_store::RedbStore;

use crate::error::Result;
use crate::intake::PlayerRecord;
use crate::pool::PoolSnapshot;

/// Roster persistence used by the roster service.
pub trait RosterStore {
    /// Replace the whole roster and the pool snapshot.
    fn replace_roster(&mut self, players: &[PlayerRecord], snapshot: &PoolSnapshot) -> Result<()>;

    /// Load the roster in the order it was saved.
    fn load_roster(&self) -> Result<Vec<PlayerRecord>>;

    /// Load the stored pool snapshot, if one was ever written.
    fn load_pool(&self) -> Result<Option<PoolSnapshot>>;
}

/// In-memory store for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    players: Vec<PlayerRecord>,
    pool: Option<PoolSnapshot>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding a roster but no snapshot, as found on
    /// deployments that predate the pool table.
    #[must_use]
    pub fn with_legacy_roster(players: Vec<PlayerRecord>) -> Self {
        Self {
            players,
            pool: None,
        }
    }
}

impl RosterStore for MemoryStore {
    fn replace_roster(&mut self, players: &[PlayerRecord], snapshot: &PoolSnapshot) -> Result<()> {
        self.players = players.to_vec();
        self.pool = Some(snapshot.clone());
        Ok(())
    }

    fn load_roster(&self) -> Result<Vec<PlayerRecord>> {
        Ok(self.players.clone())
    }

    fn load_pool(&self) -> Result<Option<PoolSnapshot>> {
        Ok(self.pool.clone())
    }
}
