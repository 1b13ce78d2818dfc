//! Store error taxonomy.

use thiserror::Error;

/// Errors surfaced by the persistent store.
///
/// Every underlying failure (medium cannot be opened, permissions denied,
/// corruption) collapses into `Unavailable`: the operation was not applied
/// and the store is unchanged.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage medium could not be opened or accessed.
    #[error("credential store unavailable: {0}")]
    Unavailable(#[from] rusqlite::Error),
}
