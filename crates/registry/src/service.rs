//! Registry service: CRUD over the credential store plus enforcement of
//! the single-active-entry invariant.

use crate::RegistryError;
use compact_str::CompactString;
use store::{CredentialEntry, Store};

/// CRUD operations over the credential store.
///
/// All mutations either apply fully or leave the store unchanged.
/// Activation runs as a single store transaction, so readers never observe
/// two active entries or a half-applied flip.
pub struct Registry<S: Store> {
    store: S,
}

impl<S: Store> Registry<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Validate and persist a new entry. Returns its id.
    ///
    /// The entry is stored inactive first; when `mark_active` is set the
    /// activation sub-protocol then runs on the new id, deactivating every
    /// other entry.
    pub async fn add_entry(
        &self,
        name: &str,
        secret: &str,
        model: &str,
        mark_active: bool,
    ) -> Result<i64, RegistryError> {
        validate(name, secret, model)?;
        let id = self.store.put(CredentialEntry::new(name, secret, model)).await?;
        tracing::debug!(id, name, model, "credential added");
        if mark_active {
            self.activate(id).await?;
        }
        Ok(id)
    }

    /// Overwrite the mutable fields of an existing entry.
    ///
    /// The `active` flag is preserved unless `mark_active` requests the
    /// activation sub-protocol.
    pub async fn update_entry(
        &self,
        id: i64,
        name: &str,
        secret: &str,
        model: &str,
        mark_active: bool,
    ) -> Result<(), RegistryError> {
        validate(name, secret, model)?;
        let mut entry = self.get_entry(id).await?;
        entry.name = CompactString::new(name);
        entry.secret = secret.to_owned();
        entry.model = CompactString::new(model);
        self.store.put(entry).await?;
        tracing::debug!(id, "credential updated");
        if mark_active {
            self.activate(id).await?;
        }
        Ok(())
    }

    /// Remove an entry. Removing an absent id is a no-op. Removing the
    /// active entry leaves the store with no active entry; nothing is
    /// auto-activated in its place.
    pub async fn delete_entry(&self, id: i64) -> Result<(), RegistryError> {
        self.store.delete(id).await?;
        tracing::debug!(id, "credential deleted");
        Ok(())
    }

    /// Fetch a single entry.
    pub async fn get_entry(&self, id: i64) -> Result<CredentialEntry, RegistryError> {
        self.store.get(id).await?.ok_or(RegistryError::NotFound(id))
    }

    /// Snapshot of all entries in store order.
    pub async fn list_entries(&self) -> Result<Vec<CredentialEntry>, RegistryError> {
        Ok(self.store.list().await?)
    }

    /// Make `id` the single active entry.
    pub async fn activate(&self, id: i64) -> Result<(), RegistryError> {
        if self.store.set_active(id).await? {
            tracing::debug!(id, "credential activated");
            Ok(())
        } else {
            Err(RegistryError::NotFound(id))
        }
    }

    /// Replace the whole store contents. Bulk import/restore only.
    ///
    /// Imported data is normalized to at most one active flag (the first
    /// wins) so the invariant holds for any input.
    pub async fn restore(&self, mut entries: Vec<CredentialEntry>) -> Result<(), RegistryError> {
        let mut seen_active = false;
        for entry in &mut entries {
            if entry.active {
                if seen_active {
                    entry.active = false;
                } else {
                    seen_active = true;
                }
            }
        }
        let count = entries.len();
        self.store.clear_and_replace(entries).await?;
        tracing::debug!(count, "store restored");
        Ok(())
    }
}

fn validate(name: &str, secret: &str, model: &str) -> Result<(), RegistryError> {
    if name.trim().is_empty() {
        return Err(RegistryError::Validation("name must not be empty"));
    }
    if secret.trim().is_empty() {
        return Err(RegistryError::Validation("secret must not be empty"));
    }
    if model.trim().is_empty() {
        return Err(RegistryError::Validation("model must not be empty"));
    }
    Ok(())
}
