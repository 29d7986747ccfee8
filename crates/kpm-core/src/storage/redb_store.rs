//! redb-backed roster store.
//!
//! Two tables:
//! - `players`: submission position (u64) -> postcard-encoded [`PlayerRecord`]
//! - `pool`: pool id -> postcard-encoded [`PoolSnapshot`]
//!
//! A save deletes the players table, reinserts the new roster and overwrites
//! the global snapshot inside one write transaction.

use super::RosterStore;
use crate::error::{KpmError, Result};
use crate::intake::PlayerRecord;
use crate::pool::PoolSnapshot;
use crate::primitives::GLOBAL_POOL_ID;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::{Path, PathBuf};

const PLAYERS: TableDefinition<u64, &[u8]> = TableDefinition::new("players");
const POOL: TableDefinition<&str, &[u8]> = TableDefinition::new("pool");

fn storage_err(err: impl Into<redb::Error>) -> KpmError {
    KpmError::Storage(err.into())
}

/// Roster store backed by an embedded redb database.
pub struct RedbStore {
    db: Database,
    path: PathBuf,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").field("path", &self.path).finish()
    }
}

impl RedbStore {
    /// Open the database at `path`, creating it and its tables if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let db = Database::create(&path).map_err(storage_err)?;

        let txn = db.begin_write().map_err(storage_err)?;
        txn.open_table(PLAYERS).map_err(storage_err)?;
        txn.open_table(POOL).map_err(storage_err)?;
        txn.commit().map_err(storage_err)?;

        Ok(Self { db, path })
    }

    /// Location of the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RosterStore for RedbStore {
    fn replace_roster(&mut self, players: &[PlayerRecord], snapshot: &PoolSnapshot) -> Result<()> {
        // Encode everything before touching the database.
        let encoded = players
            .iter()
            .map(postcard::to_allocvec)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let pool_bytes = postcard::to_allocvec(snapshot)?;

        let txn = self.db.begin_write().map_err(storage_err)?;
        {
            txn.delete_table(PLAYERS).map_err(storage_err)?;
            let mut table = txn.open_table(PLAYERS).map_err(storage_err)?;
            for (position, bytes) in (0u64..).zip(&encoded) {
                table.insert(position, bytes.as_slice()).map_err(storage_err)?;
            }

            let mut pool = txn.open_table(POOL).map_err(storage_err)?;
            pool.insert(GLOBAL_POOL_ID, pool_bytes.as_slice())
                .map_err(storage_err)?;
        }
        txn.commit().map_err(storage_err)?;
        Ok(())
    }

    fn load_roster(&self) -> Result<Vec<PlayerRecord>> {
        let txn = self.db.begin_read().map_err(storage_err)?;
        let table = txn.open_table(PLAYERS).map_err(storage_err)?;

        let mut players = Vec::new();
        for entry in table.iter().map_err(storage_err)? {
            let (_, value) = entry.map_err(storage_err)?;
            players.push(postcard::from_bytes(value.value())?);
        }
        Ok(players)
    }

    fn load_pool(&self) -> Result<Option<PoolSnapshot>> {
        let txn = self.db.begin_read().map_err(storage_err)?;
        let table = txn.open_table(POOL).map_err(storage_err)?;

        match table.get(GLOBAL_POOL_ID).map_err(storage_err)? {
            Some(value) => Ok(Some(postcard::from_bytes(value.value())?)),
            None => Ok(None),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pool::derive_snapshot;
    use crate::record::CandidateRecord;
    use tempfile::TempDir;

    fn player(id: &str, code: &str) -> PlayerRecord {
        PlayerRecord {
            name: format!("name-{id}"),
            branch: "CSE".to_string(),
            first_participation_year: 2024,
            base_diploma_year: 1,
            candidate: CandidateRecord::new(id, 2024, 1, "1")
                .with_identity(format!("m-{id}"))
                .with_code(code),
        }
    }

    fn snapshot_of(players: &[PlayerRecord]) -> PoolSnapshot {
        let candidates: Vec<_> = players.iter().map(|p| p.candidate.clone()).collect();
        derive_snapshot(&candidates)
    }

    #[test]
    fn fresh_database_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = RedbStore::open(dir.path().join("kpm.redb")).unwrap();

        assert!(store.load_roster().unwrap().is_empty());
        assert!(store.load_pool().unwrap().is_none());
    }

    #[test]
    fn roster_and_pool_round_trip_in_order() {
        let dir = TempDir::new().unwrap();
        let mut store = RedbStore::open(dir.path().join("kpm.redb")).unwrap();

        let players = vec![player("b", "241102"), player("a", "241101")];
        let snapshot = snapshot_of(&players);
        store.replace_roster(&players, &snapshot).unwrap();

        assert_eq!(store.load_roster().unwrap(), players);
        assert_eq!(store.load_pool().unwrap(), Some(snapshot));
    }

    #[test]
    fn replace_drops_previous_roster() {
        let dir = TempDir::new().unwrap();
        let mut store = RedbStore::open(dir.path().join("kpm.redb")).unwrap();

        let first = vec![player("a", "241101"), player("b", "241102"), player("c", "241103")];
        store.replace_roster(&first, &snapshot_of(&first)).unwrap();

        let second = vec![player("d", "241104")];
        store.replace_roster(&second, &snapshot_of(&second)).unwrap();

        assert_eq!(store.load_roster().unwrap(), second);
        assert_eq!(store.load_pool().unwrap().map(|p| p.allocated), Some(vec![4]));
    }

    #[test]
    fn data_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kpm.redb");

        let players = vec![player("a", "241101")];
        {
            let mut store = RedbStore::open(&path).unwrap();
            store.replace_roster(&players, &snapshot_of(&players)).unwrap();
        }

        let store = RedbStore::open(&path).unwrap();
        assert_eq!(store.load_roster().unwrap(), players);
        assert_eq!(store.path(), path.as_path());
    }
}
