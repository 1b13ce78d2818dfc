//! Registry error taxonomy.

use store::StoreError;
use thiserror::Error;

/// Errors surfaced by registry operations.
///
/// Every failure leaves the store unchanged: a caller only ever observes
/// "not yet applied" or "fully applied".
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Input rejected before any store mutation.
    #[error("{0}")]
    Validation(&'static str),
    /// The referenced entry does not exist (stale or deleted id).
    #[error("credential entry {0} not found")]
    NotFound(i64),
    /// The persistence medium failed; the operation was not applied.
    #[error(transparent)]
    Store(#[from] StoreError),
}
