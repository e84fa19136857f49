//! StateStore — redb-backed world state.
//!
//! One flat `world_state` table of `&str` keys and `&[u8]` values. Reads go
//! through `with_view` (a consistent snapshot); writes go through
//! `with_txn`, which commits only when the closure succeeds, so every
//! invocation is all-or-nothing. The store supports both on-disk and
//! in-memory backends (the latter for testing).

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadOnlyTable, ReadableDatabase, ReadableTable, Table, TableDefinition};
use tracing::debug;

use crate::backend::{StateView, WorldState};
use crate::error::{StateError, StateResult};

/// The single world-state table.
const WORLD_STATE: TableDefinition<&str, &[u8]> = TableDefinition::new("world_state");

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Thread-safe world-state store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) a persistent store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_table()?;
        debug!(?path, "world-state store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_table()?;
        debug!("in-memory world-state store opened");
        Ok(store)
    }

    /// Create the table if it doesn't exist yet.
    fn ensure_table(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(WORLD_STATE).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    /// Run `f` against a consistent snapshot of the world state.
    pub fn with_view<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&ViewState) -> Result<T, E>,
        E: From<StateError>,
    {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(WORLD_STATE).map_err(map_err!(Table))?;
        f(&ViewState { table })
    }

    /// Run `f` inside one write transaction.
    ///
    /// Commits when `f` returns `Ok`; any `Err` discards every write made
    /// through the transaction, so one invocation is all-or-nothing.
    pub fn with_txn<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut TxnState<'_>) -> Result<T, E>,
        E: From<StateError>,
    {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let result = {
            let table = txn.open_table(WORLD_STATE).map_err(map_err!(Table))?;
            f(&mut TxnState { table })
        };
        match result {
            Ok(value) => {
                txn.commit().map_err(map_err!(Transaction))?;
                Ok(value)
            }
            // Dropping the uncommitted transaction discards its writes.
            Err(e) => Err(e),
        }
    }
}

/// Snapshot of the world state inside one read transaction.
pub struct ViewState {
    table: ReadOnlyTable<&'static str, &'static [u8]>,
}

impl StateView for ViewState {
    fn get(&self, key: &str) -> StateResult<Option<Vec<u8>>> {
        let guard = self.table.get(key).map_err(map_err!(Read))?;
        Ok(guard.map(|value| value.value().to_vec()))
    }

    fn range_scan(&self, start: &str, end: &str) -> StateResult<Vec<(String, Vec<u8>)>> {
        scan_table(&self.table, start, end)
    }
}

/// Uncommitted world state inside one write transaction.
pub struct TxnState<'txn> {
    table: Table<'txn, &'static str, &'static [u8]>,
}

impl StateView for TxnState<'_> {
    fn get(&self, key: &str) -> StateResult<Option<Vec<u8>>> {
        let guard = self.table.get(key).map_err(map_err!(Read))?;
        Ok(guard.map(|value| value.value().to_vec()))
    }

    fn range_scan(&self, start: &str, end: &str) -> StateResult<Vec<(String, Vec<u8>)>> {
        scan_table(&self.table, start, end)
    }
}

impl WorldState for TxnState<'_> {
    fn put(&mut self, key: &str, value: &[u8]) -> StateResult<()> {
        self.table.insert(key, value).map_err(map_err!(Write))?;
        Ok(())
    }
}

fn scan_table<T>(table: &T, start: &str, end: &str) -> StateResult<Vec<(String, Vec<u8>)>>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    if !start.is_empty() && !end.is_empty() && start >= end {
        return Ok(Vec::new());
    }
    let range = match (start.is_empty(), end.is_empty()) {
        (true, true) => table.iter(),
        (false, true) => table.range(start..),
        (true, false) => table.range(..end),
        (false, false) => table.range(start..end),
    }
    .map_err(map_err!(Read))?;

    let mut entries = Vec::new();
    for item in range {
        let (key, value) = item.map_err(map_err!(Read))?;
        entries.push((key.value().to_string(), value.value().to_vec()));
    }
    Ok(entries)
}
