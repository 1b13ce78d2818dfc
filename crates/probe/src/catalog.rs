//! Static model catalog: provider family name to ordered model list.
//!
//! Loaded once and treated as read-only external input; the registry does
//! not own or mutate it.

use compact_str::CompactString;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

const DEFAULT_CATALOG: &str = include_str!("../catalog.toml");

/// Failure to load a catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read model catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid model catalog: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Read-only mapping from provider family to its model identifiers.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelCatalog {
    /// Family name to ordered model list.
    pub models: BTreeMap<CompactString, Vec<CompactString>>,
}

impl ModelCatalog {
    /// The embedded default catalog.
    pub fn builtin() -> Self {
        toml::from_str(DEFAULT_CATALOG).expect("embedded catalog is valid")
    }

    /// Load a catalog from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Family names in catalog order.
    pub fn families(&self) -> impl Iterator<Item = &CompactString> {
        self.models.keys()
    }

    /// Whether `model` appears in any family's list.
    pub fn contains(&self, model: &str) -> bool {
        self.models.values().flatten().any(|m| m == model)
    }
}
