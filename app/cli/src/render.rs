//! Plain-text table rendering with masked secrets.

use registry::View;
use store::CredentialEntry;

/// Renders the registry snapshot as an aligned text table.
///
/// Secrets always go through [`CredentialEntry::masked_secret`]; the full
/// token never reaches the terminal.
#[derive(Debug, Default)]
pub struct TableView;

impl View for TableView {
    fn render(&mut self, entries: &[CredentialEntry]) {
        if entries.is_empty() {
            println!("No credentials stored.");
            return;
        }
        println!(
            "{:>4}  {:6}  {:<20}  {:<15}  {}",
            "ID", "ACTIVE", "NAME", "SECRET", "MODEL"
        );
        for entry in entries {
            println!(
                "{:>4}  {:6}  {:<20}  {:<15}  {}",
                entry.id.unwrap_or_default(),
                if entry.active { "*" } else { "" },
                entry.name,
                entry.masked_secret(),
                entry.model
            );
        }
    }
}
