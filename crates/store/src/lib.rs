//! SQLite-backed persistent store for keyrack credentials.
//!
//! Provides [`SqliteStore`], a durable table of [`CredentialEntry`] records
//! behind the asynchronous [`Store`] contract. All SQL lives in `sql/*.sql`
//! files, loaded via `include_str!`.

mod entry;
mod error;
mod sqlite;

pub use entry::{CredentialEntry, mask};
pub use error::StoreError;
pub use sqlite::SqliteStore;

use std::future::Future;

/// Asynchronous credential store contract.
///
/// Each single operation is atomic. Composite read-modify-write sequences
/// are the caller's responsibility, with one exception:
/// [`set_active`](Store::set_active) flips the active flag transactionally
/// so that readers never observe more than one active entry.
pub trait Store: Send + Sync {
    /// Insert a record, assigning an id, or overwrite the record at its
    /// existing id. Returns the id.
    fn put(
        &self,
        entry: CredentialEntry,
    ) -> impl Future<Output = Result<i64, StoreError>> + Send;

    /// Fetch a record by id.
    fn get(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<CredentialEntry>, StoreError>> + Send;

    /// Delete a record by id. Deleting an absent id is not an error.
    fn delete(&self, id: i64) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Full scan in store iteration order.
    fn list(&self) -> impl Future<Output = Result<Vec<CredentialEntry>, StoreError>> + Send;

    /// Atomically empty the store and insert the given records.
    ///
    /// Bulk import/restore only; the interactive add/edit flow never calls
    /// this.
    fn clear_and_replace(
        &self,
        entries: Vec<CredentialEntry>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Mark `id` active and clear every other active flag, all inside one
    /// transaction. Returns `false` when the id is absent, in which case
    /// nothing changed.
    fn set_active(&self, id: i64) -> impl Future<Output = Result<bool, StoreError>> + Send;
}
