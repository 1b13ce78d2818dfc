//! Command line front end for the keyrack credential registry.
//!
//! Each subcommand drives the workflow controller the way the interactive
//! settings dialog would: open a form, fill the draft, optionally test,
//! then submit. The table renderer masks every secret.

mod render;

pub use render::TableView;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use probe::{HttpTransport, ModelCatalog, ProbeOutcome, Prober};
use registry::{Registry, Workflow};
use std::path::PathBuf;
use store::{CredentialEntry, SqliteStore};

/// Manage named API credentials with live validation.
#[derive(Parser, Debug)]
#[command(name = "keyrack", about = "Manage named API credentials with live validation")]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Database file override.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List stored credentials.
    List,
    /// Add a credential.
    Add {
        /// Human-readable label.
        #[arg(long)]
        name: String,
        /// Secret token.
        #[arg(long)]
        secret: String,
        /// Target model identifier (see `keyrack models`).
        #[arg(long)]
        model: String,
        /// Probe before saving; a passing probe makes the new entry active.
        #[arg(long)]
        test: bool,
    },
    /// Edit an existing credential.
    Edit {
        /// Entry id.
        id: i64,
        /// New label.
        #[arg(long)]
        name: Option<String>,
        /// New secret token.
        #[arg(long)]
        secret: Option<String>,
        /// New model identifier.
        #[arg(long)]
        model: Option<String>,
        /// Probe before saving; a passing probe makes the entry active.
        #[arg(long)]
        test: bool,
    },
    /// Delete a credential.
    Delete {
        /// Entry id.
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Probe a secret+model pair without saving anything.
    Test {
        /// Secret token.
        #[arg(long)]
        secret: String,
        /// Model identifier.
        #[arg(long)]
        model: String,
    },
    /// Make an entry the active credential.
    Activate {
        /// Entry id.
        id: i64,
    },
    /// Show the model catalog.
    Models,
    /// Write all entries to a JSON file.
    Export {
        /// Output path.
        path: PathBuf,
    },
    /// Replace all entries from a JSON file.
    Import {
        /// Input path.
        path: PathBuf,
    },
}

impl Cli {
    /// Dispatch the parsed command.
    pub async fn run(self) -> Result<()> {
        let db = match self.db {
            Some(path) => path,
            None => default_db_path()?,
        };
        tracing::debug!(db = %db.display(), "opening credential store");

        let registry = Registry::new(SqliteStore::open(&db));
        let mut flow = Workflow::new(registry, Prober::new(), TableView::default());
        let catalog = ModelCatalog::builtin();

        match self.command {
            Command::List => flow.refresh().await?,
            Command::Add {
                name,
                secret,
                model,
                test,
            } => {
                check_model(&catalog, &model)?;
                flow.open_add();
                flow.edit_draft(|d| {
                    d.name = name;
                    d.secret = secret;
                    d.model = model;
                });
                if test {
                    report_outcome(flow.test().await?);
                }
                if let Some(id) = flow.submit().await? {
                    println!("Added credential {id}.");
                }
            }
            Command::Edit {
                id,
                name,
                secret,
                model,
                test,
            } => {
                if let Some(model) = &model {
                    check_model(&catalog, model)?;
                }
                flow.open_edit(id).await?;
                flow.edit_draft(|d| {
                    if let Some(name) = name {
                        d.name = name;
                    }
                    if let Some(secret) = secret {
                        d.secret = secret;
                    }
                    if let Some(model) = model {
                        d.model = model;
                    }
                });
                if test {
                    report_outcome(flow.test().await?);
                }
                flow.submit().await?;
                println!("Updated credential {id}.");
            }
            Command::Delete { id, yes } => {
                flow.request_delete(id);
                let confirmed = yes
                    || dialoguer::Confirm::new()
                        .with_prompt(format!("Delete credential {id}?"))
                        .default(false)
                        .interact()?;
                if confirmed {
                    flow.confirm_delete().await?;
                    println!("Deleted credential {id}.");
                } else {
                    flow.cancel();
                    println!("Cancelled.");
                }
            }
            Command::Test { secret, model } => {
                let outcome = Prober::<HttpTransport>::new().probe(&secret, &model).await;
                report_outcome(outcome);
            }
            Command::Activate { id } => {
                flow.set_active(id).await?;
                println!("Credential {id} is now active.");
            }
            Command::Models => {
                for family in catalog.families() {
                    println!("{family}:");
                    for model in &catalog.models[family] {
                        println!("  {model}");
                    }
                }
            }
            Command::Export { path } => {
                let entries = flow.registry().list_entries().await?;
                let json = serde_json::to_string_pretty(&entries)?;
                std::fs::write(&path, json)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("Exported {} entries to {}.", entries.len(), path.display());
            }
            Command::Import { path } => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let entries: Vec<CredentialEntry> = serde_json::from_str(&text)
                    .with_context(|| format!("invalid credential file {}", path.display()))?;
                let count = entries.len();
                flow.registry().restore(entries).await?;
                flow.refresh().await?;
                println!("Imported {count} entries.");
            }
        }
        Ok(())
    }
}

/// Default database location under the platform data directory.
fn default_db_path() -> Result<PathBuf> {
    let dir = dirs::data_dir()
        .context("could not determine a data directory")?
        .join("keyrack");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    Ok(dir.join("credentials.db"))
}

/// Unknown models are rejected before any store mutation.
fn check_model(catalog: &ModelCatalog, model: &str) -> Result<()> {
    if !catalog.contains(model) {
        bail!("model '{model}' is not in the catalog; run `keyrack models` to see choices");
    }
    Ok(())
}

/// Report a probe outcome as a status line. Outcomes are never fatal.
fn report_outcome(outcome: ProbeOutcome) {
    match outcome {
        ProbeOutcome::Succeeded => {
            println!("Check: this credential is valid and ready to use.");
        }
        ProbeOutcome::Rejected => {
            println!("Invalid credential: check the secret and the selected model.");
        }
        ProbeOutcome::Unreachable => {
            println!("Could not reach the provider: check your network and try again.");
        }
        ProbeOutcome::Unsupported => {
            println!("Testing is not supported for this model family.");
        }
    }
}
