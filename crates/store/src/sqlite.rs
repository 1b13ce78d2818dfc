//! SQLite persistence for credential records.
//!
//! The connection is opened lazily on first use and cached for the life of
//! the store; open failures surface as [`StoreError::Unavailable`] from the
//! failing operation rather than at construction.

use crate::{CredentialEntry, Store, StoreError};
use compact_str::CompactString;
use rusqlite::{Connection, OptionalExtension, params};
use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

const SQL_SCHEMA: &str = include_str!("../sql/schema.sql");
const SQL_INSERT: &str = include_str!("../sql/insert.sql");
const SQL_UPSERT: &str = include_str!("../sql/upsert.sql");
const SQL_SELECT: &str = include_str!("../sql/select.sql");
const SQL_SELECT_ALL: &str = include_str!("../sql/select_all.sql");
const SQL_DELETE: &str = include_str!("../sql/delete.sql");
const SQL_CLEAR: &str = include_str!("../sql/clear.sql");
const SQL_ACTIVATE: &str = include_str!("../sql/activate.sql");
const SQL_DEACTIVATE_OTHERS: &str = include_str!("../sql/deactivate_others.sql");

/// Where the database lives.
enum Location {
    Disk(PathBuf),
    Memory,
}

/// SQLite-backed credential store.
///
/// Wraps a lazily opened `rusqlite::Connection` in a `Mutex`. Single-writer
/// access is assumed by construction; the mutex only guards against
/// accidental cross-thread use.
pub struct SqliteStore {
    location: Location,
    conn: Mutex<Option<Connection>>,
}

impl SqliteStore {
    /// Store backed by a database file at `path`, created on first access.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            location: Location::Disk(path.as_ref().to_owned()),
            conn: Mutex::new(None),
        }
    }

    /// In-memory store (useful for testing).
    pub fn in_memory() -> Self {
        Self {
            location: Location::Memory,
            conn: Mutex::new(None),
        }
    }

    /// Run `f` against the connection, opening it first if needed.
    fn with_conn<R>(
        &self,
        f: impl FnOnce(&mut Connection) -> rusqlite::Result<R>,
    ) -> Result<R, StoreError> {
        let mut slot = self.conn.lock().expect("store lock poisoned");
        if slot.is_none() {
            let conn = match &self.location {
                Location::Disk(path) => Connection::open(path)?,
                Location::Memory => Connection::open_in_memory()?,
            };
            conn.execute_batch(SQL_SCHEMA)?;
            *slot = Some(conn);
        }
        let conn = slot.as_mut().expect("opened above");
        f(conn).map_err(StoreError::from)
    }
}

/// Map a result row to a [`CredentialEntry`].
fn entry_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CredentialEntry> {
    Ok(CredentialEntry {
        id: Some(row.get(0)?),
        name: CompactString::new(row.get::<_, String>(1)?),
        secret: row.get(2)?,
        model: CompactString::new(row.get::<_, String>(3)?),
        active: row.get(4)?,
    })
}

impl Store for SqliteStore {
    fn put(
        &self,
        entry: CredentialEntry,
    ) -> impl Future<Output = Result<i64, StoreError>> + Send {
        let result = self.with_conn(|conn| match entry.id {
            Some(id) => {
                conn.execute(
                    SQL_UPSERT,
                    params![
                        id,
                        entry.name.as_str(),
                        entry.secret,
                        entry.model.as_str(),
                        entry.active
                    ],
                )?;
                Ok(id)
            }
            None => {
                conn.execute(
                    SQL_INSERT,
                    params![
                        entry.name.as_str(),
                        entry.secret,
                        entry.model.as_str(),
                        entry.active
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            }
        });
        async move { result }
    }

    fn get(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<CredentialEntry>, StoreError>> + Send {
        let result = self.with_conn(|conn| {
            conn.query_row(SQL_SELECT, [id], entry_from_row).optional()
        });
        async move { result }
    }

    fn delete(&self, id: i64) -> impl Future<Output = Result<(), StoreError>> + Send {
        let result = self.with_conn(|conn| {
            conn.execute(SQL_DELETE, [id])?;
            Ok(())
        });
        async move { result }
    }

    fn list(&self) -> impl Future<Output = Result<Vec<CredentialEntry>, StoreError>> + Send {
        let result = self.with_conn(|conn| {
            let mut stmt = conn.prepare(SQL_SELECT_ALL)?;
            let entries = stmt
                .query_map([], entry_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(entries)
        });
        async move { result }
    }

    fn clear_and_replace(
        &self,
        entries: Vec<CredentialEntry>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        let result = self.with_conn(|conn| {
            let tx = conn.transaction()?;
            tx.execute(SQL_CLEAR, [])?;
            for entry in &entries {
                match entry.id {
                    Some(id) => tx.execute(
                        SQL_UPSERT,
                        params![
                            id,
                            entry.name.as_str(),
                            entry.secret,
                            entry.model.as_str(),
                            entry.active
                        ],
                    )?,
                    None => tx.execute(
                        SQL_INSERT,
                        params![
                            entry.name.as_str(),
                            entry.secret,
                            entry.model.as_str(),
                            entry.active
                        ],
                    )?,
                };
            }
            tx.commit()?;
            Ok(())
        });
        async move { result }
    }

    fn set_active(&self, id: i64) -> impl Future<Output = Result<bool, StoreError>> + Send {
        let result = self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let updated = tx.execute(SQL_ACTIVATE, [id])?;
            if updated == 0 {
                tx.rollback()?;
                return Ok(false);
            }
            tx.execute(SQL_DEACTIVATE_OTHERS, [id])?;
            tx.commit()?;
            Ok(true)
        });
        async move { result }
    }
}
