//! The credential record shared across the workspace.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// A single named credential: label, secret token, target model, and
/// whether it is the entry designated for downstream use.
///
/// At most one entry in a store has `active == true` at any time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialEntry {
    /// Store-assigned rowid. `None` until first persisted, immutable after.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Human-readable label.
    pub name: CompactString,
    /// Opaque secret token. Display only through
    /// [`masked_secret`](Self::masked_secret).
    pub secret: String,
    /// Target provider/model identifier.
    pub model: CompactString,
    /// Whether this is the active entry.
    #[serde(default)]
    pub active: bool,
}

impl CredentialEntry {
    /// Create a new, not-yet-persisted, inactive entry.
    pub fn new(
        name: impl Into<CompactString>,
        secret: impl Into<String>,
        model: impl Into<CompactString>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            secret: secret.into(),
            model: model.into(),
            active: false,
        }
    }

    /// Masked form of the secret for display.
    pub fn masked_secret(&self) -> String {
        mask(&self.secret)
    }
}

/// Mask a secret for display.
///
/// Secrets of up to 10 characters render as the same number of asterisks;
/// longer secrets render as five asterisks followed by their last five
/// characters.
pub fn mask(secret: &str) -> String {
    let len = secret.chars().count();
    if len <= 10 {
        "*".repeat(len)
    } else {
        let tail: String = secret.chars().skip(len - 5).collect();
        format!("*****{tail}")
    }
}
